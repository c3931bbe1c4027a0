pub mod errors;
pub mod images;
pub mod products;

pub use errors::{ServiceError, ServiceResult};

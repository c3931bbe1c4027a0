//! Error conversion glue between the form and service layers.

use crate::forms::products::ProductFormError;
use crate::services::ServiceError;

impl From<ProductFormError> for ServiceError {
    fn from(val: ProductFormError) -> Self {
        match val {
            ProductFormError::Validation(errors) => ServiceError::Form(errors),
        }
    }
}

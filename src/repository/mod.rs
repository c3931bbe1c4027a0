use crate::db::{DbConnection, DbPool};
use crate::domain::product::{NewProduct, Product};
use crate::domain::product_image::{NewProductImage, ProductImage};
use crate::domain::types::{ProductId, ProductImageId};

pub mod errors;
pub mod product;
pub mod product_image;

pub use errors::{RepositoryError, RepositoryResult};

/// Repository implementation backed by Diesel and SQLite.
///
/// The underlying `r2d2::Pool` is cheap to clone, allowing the repository to
/// be passed around freely between handlers.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool, // r2d2::Pool is cheap to clone
}

impl DieselRepository {
    /// Create a new repository from an established database pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get a pooled database connection.
    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// Read-only operations for product entities.
///
/// Every returned [`Product`] carries its full image list.
pub trait ProductReader {
    /// List all products, newest first.
    fn list_products(&self) -> RepositoryResult<Vec<Product>>;
    /// Retrieve a product by its identifier.
    fn get_product_by_id(&self, id: ProductId) -> RepositoryResult<Option<Product>>;
}

/// Write operations for product entities.
pub trait ProductWriter {
    /// Persist a new product without images.
    fn create_product(&self, product: &NewProduct) -> RepositoryResult<Product>;
    /// Overwrite name, details and price. Returns the number of updated rows.
    fn update_product(&self, id: ProductId, product: &NewProduct) -> RepositoryResult<usize>;
    /// Delete a product and all its image rows in one transaction.
    ///
    /// Returns the removed image rows so their files can be cleaned up, or
    /// `None` when the product did not exist.
    fn delete_product(&self, id: ProductId) -> RepositoryResult<Option<Vec<ProductImage>>>;
}

/// Read-only operations for product images.
pub trait ProductImageReader {
    /// Retrieve an image only if it belongs to the given product.
    fn get_product_image(
        &self,
        product_id: ProductId,
        id: ProductImageId,
    ) -> RepositoryResult<Option<ProductImage>>;
}

/// Write operations for product images.
pub trait ProductImageWriter {
    /// Persist a new image row referencing an already stored file.
    fn create_product_image(&self, image: &NewProductImage) -> RepositoryResult<ProductImage>;
    /// Delete an image row by id.
    fn delete_product_image(&self, id: ProductImageId) -> RepositoryResult<usize>;
}

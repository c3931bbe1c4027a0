use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{ImagePath, ProductId, ProductImageId};

/// Image file attached to a product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductImage {
    pub id: ProductImageId,
    pub product_id: ProductId,
    /// Location of the file relative to the public root.
    pub image: ImagePath,
    pub created_at: NaiveDateTime,
}

/// Data required to attach a stored file to a product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewProductImage {
    pub product_id: ProductId,
    pub image: ImagePath,
}

impl NewProductImage {
    pub fn new(product_id: ProductId, image: ImagePath) -> Self {
        Self { product_id, image }
    }
}

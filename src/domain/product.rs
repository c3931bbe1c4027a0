use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::product_image::ProductImage;
use crate::domain::types::{ProductDetails, ProductId, ProductName, ProductPrice};

/// A catalog product together with the images it owns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: ProductName,
    pub details: ProductDetails,
    pub price: ProductPrice,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    /// Owned images in upload order.
    pub images: Vec<ProductImage>,
}

/// Editable fields of a [`Product`].
///
/// Used both to create a product and to overwrite the fields of an existing
/// one; images are never touched through this struct.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct NewProduct {
    pub name: ProductName,
    pub details: ProductDetails,
    pub price: ProductPrice,
}

impl NewProduct {
    pub fn new(name: ProductName, details: ProductDetails, price: ProductPrice) -> Self {
        Self {
            name,
            details,
            price,
        }
    }
}

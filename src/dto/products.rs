use serde::Serialize;

use crate::domain::product::Product;
use crate::domain::product_image::ProductImage;

/// Template-facing view of a product image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductImageDto {
    pub id: i32,
    /// Path relative to the public root, e.g. `products/<name>.jpg`.
    pub image: String,
}

/// Template-facing view of a product with its images.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductDto {
    pub id: i32,
    pub name: String,
    pub details: String,
    /// Price formatted with two decimals.
    pub price: String,
    pub created_at: String,
    pub images: Vec<ProductImageDto>,
}

impl From<ProductImage> for ProductImageDto {
    fn from(value: ProductImage) -> Self {
        Self {
            id: value.id.get(),
            image: value.image.into_inner(),
        }
    }
}

impl From<Product> for ProductDto {
    fn from(value: Product) -> Self {
        Self {
            id: value.id.get(),
            name: value.name.into_inner(),
            details: value.details.into_inner(),
            price: format!("{:.2}", value.price.get()),
            created_at: value.created_at.format("%d.%m.%Y %H:%M").to_string(),
            images: value.images.into_iter().map(Into::into).collect(),
        }
    }
}

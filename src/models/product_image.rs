use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::product_image::{
    NewProductImage as DomainNewProductImage, ProductImage as DomainProductImage,
};
use crate::domain::types::{ImagePath, TypeConstraintError};
use crate::models::product::Product;

/// Diesel model representing the `product_images` table.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(table_name = crate::schema::product_images)]
#[diesel(belongs_to(Product))]
pub struct ProductImage {
    pub id: i32,
    pub product_id: i32,
    pub image: String,
    pub created_at: NaiveDateTime,
}

/// Insertable form of [`ProductImage`].
#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::product_images)]
pub struct NewProductImage<'a> {
    pub product_id: i32,
    pub image: &'a str,
    pub created_at: NaiveDateTime,
}

impl<'a> NewProductImage<'a> {
    pub fn new(image: &'a DomainNewProductImage, now: NaiveDateTime) -> Self {
        Self {
            product_id: image.product_id.get(),
            image: image.image.as_str(),
            created_at: now,
        }
    }
}

impl TryFrom<ProductImage> for DomainProductImage {
    type Error = TypeConstraintError;

    fn try_from(image: ProductImage) -> Result<Self, Self::Error> {
        Ok(Self {
            id: image.id.try_into()?,
            product_id: image.product_id.try_into()?,
            image: ImagePath::new(image.image)?,
            created_at: image.created_at,
        })
    }
}

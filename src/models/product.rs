use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::product::{NewProduct as DomainNewProduct, Product as DomainProduct};
use crate::domain::product_image::ProductImage as DomainProductImage;
use crate::domain::types::{ProductDetails, ProductName, ProductPrice, TypeConstraintError};
use crate::models::product_image::ProductImage;

/// Diesel model representing a row in the `products` table.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::products)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub details: String,
    pub price: f64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Insertable form of [`Product`] used for creating new rows.
#[derive(Insertable)]
#[diesel(table_name = crate::schema::products)]
pub struct NewProduct<'a> {
    pub name: &'a str,
    pub details: &'a str,
    pub price: f64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Patch applied when the editable fields of a product change.
#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::products)]
pub struct ProductChangeset<'a> {
    pub name: &'a str,
    pub details: &'a str,
    pub price: f64,
    pub updated_at: NaiveDateTime,
}

impl<'a> NewProduct<'a> {
    pub fn new(product: &'a DomainNewProduct, now: NaiveDateTime) -> Self {
        Self {
            name: product.name.as_str(),
            details: product.details.as_str(),
            price: product.price.get(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl<'a> ProductChangeset<'a> {
    pub fn new(product: &'a DomainNewProduct, now: NaiveDateTime) -> Self {
        Self {
            name: product.name.as_str(),
            details: product.details.as_str(),
            price: product.price.get(),
            updated_at: now,
        }
    }
}

impl TryFrom<(Product, Vec<ProductImage>)> for DomainProduct {
    type Error = TypeConstraintError;

    fn try_from((product, images): (Product, Vec<ProductImage>)) -> Result<Self, Self::Error> {
        Ok(Self {
            id: product.id.try_into()?,
            name: ProductName::new(product.name)?,
            details: ProductDetails::new(product.details)?,
            price: ProductPrice::new(product.price)?,
            created_at: product.created_at,
            updated_at: product.updated_at,
            images: images
                .into_iter()
                .map(DomainProductImage::try_from)
                .collect::<Result<Vec<_>, _>>()?,
        })
    }
}

use chrono::Utc;
use diesel::prelude::*;

use crate::domain::product::{NewProduct, Product};
use crate::domain::product_image::ProductImage;
use crate::domain::types::ProductId;
use crate::models::product::{
    NewProduct as DbNewProduct, Product as DbProduct, ProductChangeset as DbProductChangeset,
};
use crate::models::product_image::ProductImage as DbProductImage;
use crate::repository::{DieselRepository, ProductReader, ProductWriter, RepositoryResult};

impl ProductReader for DieselRepository {
    fn list_products(&self) -> RepositoryResult<Vec<Product>> {
        use crate::schema::{product_images, products};

        let mut conn = self.conn()?;

        let rows = products::table
            .order((products::created_at.desc(), products::id.desc()))
            .select(DbProduct::as_select())
            .load::<DbProduct>(&mut conn)?;

        // One query for every image of the listed products.
        let images = DbProductImage::belonging_to(&rows)
            .order(product_images::id.asc())
            .select(DbProductImage::as_select())
            .load::<DbProductImage>(&mut conn)?;

        let items = images
            .grouped_by(&rows)
            .into_iter()
            .zip(rows)
            .map(|(images, product)| Product::try_from((product, images)))
            .collect::<Result<Vec<Product>, _>>()?;

        Ok(items)
    }

    fn get_product_by_id(&self, id: ProductId) -> RepositoryResult<Option<Product>> {
        use crate::schema::{product_images, products};

        let mut conn = self.conn()?;

        let row = products::table
            .find(id.get())
            .select(DbProduct::as_select())
            .first::<DbProduct>(&mut conn)
            .optional()?;

        let Some(row) = row else {
            return Ok(None);
        };

        let images = DbProductImage::belonging_to(&row)
            .order(product_images::id.asc())
            .select(DbProductImage::as_select())
            .load::<DbProductImage>(&mut conn)?;

        Ok(Some(Product::try_from((row, images))?))
    }
}

impl ProductWriter for DieselRepository {
    fn create_product(&self, product: &NewProduct) -> RepositoryResult<Product> {
        use crate::schema::products;

        let mut conn = self.conn()?;
        let now = Utc::now().naive_utc();

        let row = diesel::insert_into(products::table)
            .values(DbNewProduct::new(product, now))
            .returning(DbProduct::as_returning())
            .get_result::<DbProduct>(&mut conn)?;

        Ok(Product::try_from((row, Vec::new()))?)
    }

    fn update_product(&self, id: ProductId, product: &NewProduct) -> RepositoryResult<usize> {
        use crate::schema::products;

        let mut conn = self.conn()?;
        let now = Utc::now().naive_utc();

        let affected = diesel::update(products::table.find(id.get()))
            .set(DbProductChangeset::new(product, now))
            .execute(&mut conn)?;

        Ok(affected)
    }

    fn delete_product(&self, id: ProductId) -> RepositoryResult<Option<Vec<ProductImage>>> {
        use crate::schema::{product_images, products};

        let mut conn = self.conn()?;

        let removed = conn.transaction::<_, diesel::result::Error, _>(|conn| {
            let images = product_images::table
                .filter(product_images::product_id.eq(id.get()))
                .order(product_images::id.asc())
                .select(DbProductImage::as_select())
                .load::<DbProductImage>(conn)?;

            diesel::delete(product_images::table.filter(product_images::product_id.eq(id.get())))
                .execute(conn)?;

            let affected = diesel::delete(products::table.find(id.get())).execute(conn)?;

            Ok((affected > 0).then_some(images))
        })?;

        let removed = removed
            .map(|images| {
                images
                    .into_iter()
                    .map(ProductImage::try_from)
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;

        Ok(removed)
    }
}

use chrono::Utc;
use diesel::prelude::*;

use crate::domain::product_image::{NewProductImage, ProductImage};
use crate::domain::types::{ProductId, ProductImageId};
use crate::models::product_image::{
    NewProductImage as DbNewProductImage, ProductImage as DbProductImage,
};
use crate::repository::{
    DieselRepository, ProductImageReader, ProductImageWriter, RepositoryResult,
};

impl ProductImageReader for DieselRepository {
    fn get_product_image(
        &self,
        product_id: ProductId,
        id: ProductImageId,
    ) -> RepositoryResult<Option<ProductImage>> {
        use crate::schema::product_images;

        let mut conn = self.conn()?;

        let image = product_images::table
            .filter(product_images::id.eq(id.get()))
            .filter(product_images::product_id.eq(product_id.get()))
            .select(DbProductImage::as_select())
            .first::<DbProductImage>(&mut conn)
            .optional()?;

        let image = image.map(TryInto::try_into).transpose()?;
        Ok(image)
    }
}

impl ProductImageWriter for DieselRepository {
    fn create_product_image(&self, image: &NewProductImage) -> RepositoryResult<ProductImage> {
        use crate::schema::product_images;

        let mut conn = self.conn()?;
        let now = Utc::now().naive_utc();

        let row = diesel::insert_into(product_images::table)
            .values(DbNewProductImage::new(image, now))
            .returning(DbProductImage::as_returning())
            .get_result::<DbProductImage>(&mut conn)?;

        Ok(row.try_into()?)
    }

    fn delete_product_image(&self, id: ProductImageId) -> RepositoryResult<usize> {
        use crate::schema::product_images;

        let mut conn = self.conn()?;

        let affected = diesel::delete(product_images::table.find(id.get())).execute(&mut conn)?;

        Ok(affected)
    }
}

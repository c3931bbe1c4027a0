//! Reconciliation of a product's image rows with the files on disk.

use crate::domain::product::Product;
use crate::domain::product_image::{NewProductImage, ProductImage};
use crate::domain::types::{ProductId, ProductImageId};
use crate::repository::{ProductImageReader, ProductImageWriter, ProductReader};
use crate::storage::{ImageStorage, ImageUpload};

use super::{ServiceError, ServiceResult};

/// Bring the images of `product_id` in line with the requested changes.
///
/// Removals run first: ids that do not belong to the product are skipped,
/// a file that is already gone counts as removed, and a file that cannot be
/// deleted is logged without keeping its row alive. Uploads are then stored
/// and attached one by one in submission order. A failing upload aborts the
/// call; images handled before it stay committed.
///
/// Returns the product with its image list reloaded.
pub fn reconcile_images<R, S>(
    product_id: ProductId,
    remove_ids: &[ProductImageId],
    uploads: Vec<ImageUpload>,
    repo: &R,
    storage: &S,
) -> ServiceResult<Product>
where
    R: ProductReader + ProductImageReader + ProductImageWriter,
    S: ImageStorage + ?Sized,
{
    for &image_id in remove_ids {
        let image = match repo.get_product_image(product_id, image_id) {
            Ok(Some(image)) => image,
            Ok(None) => {
                log::debug!("Image {image_id} of product {product_id} is already gone");
                continue;
            }
            Err(e) => {
                log::error!("Failed to get product image: {e}");
                return Err(ServiceError::Internal);
            }
        };

        remove_image_file(&image, storage);

        if let Err(e) = repo.delete_product_image(image.id) {
            log::error!("Failed to delete product image: {e}");
            return Err(ServiceError::Internal);
        }
    }

    for upload in uploads {
        let path = match storage.store(upload) {
            Ok(path) => path,
            Err(e) => {
                log::error!("Failed to store image for product {product_id}: {e}");
                return Err(ServiceError::Internal);
            }
        };

        if let Err(e) = repo.create_product_image(&NewProductImage::new(product_id, path.clone())) {
            log::error!("Failed to create product image: {e}");
            if let Err(e) = storage.remove(&path) {
                log::warn!("Failed to remove orphaned image {path}: {e}");
            }
            return Err(ServiceError::Internal);
        }
    }

    match repo.get_product_by_id(product_id) {
        Ok(Some(product)) => Ok(product),
        Ok(None) => Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to reload product: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// Delete the file behind an image row, best-effort.
pub fn remove_image_file<S>(image: &ProductImage, storage: &S)
where
    S: ImageStorage + ?Sized,
{
    match storage.remove(&image.image) {
        Ok(true) => {}
        Ok(false) => log::debug!("Image file {} was already removed", image.image),
        Err(e) => log::warn!("Failed to remove image file {}: {e}", image.image),
    }
}

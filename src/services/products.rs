use crate::domain::product::Product;
use crate::domain::types::ProductId;
use crate::forms::products::{FieldErrors, ProductFormPayload};
use crate::repository::{ProductImageReader, ProductImageWriter, ProductReader, ProductWriter};
use crate::services::images::{reconcile_images, remove_image_file};
use crate::storage::ImageStorage;

use super::{ServiceError, ServiceResult};

fn too_many_images(max_images: usize) -> ServiceError {
    let mut errors = FieldErrors::default();
    errors.add(
        "images",
        format!("У товара может быть не больше {max_images} изображений."),
    );
    ServiceError::Form(errors)
}

/// Resolve a path id into an existing product.
///
/// Ids that cannot exist are reported as [`ServiceError::NotFound`] just like
/// missing rows.
fn find_product<R>(product_id: i32, repo: &R) -> ServiceResult<Product>
where
    R: ProductReader,
{
    let product_id = ProductId::new(product_id).map_err(|_| ServiceError::NotFound)?;

    match repo.get_product_by_id(product_id) {
        Ok(Some(product)) => Ok(product),
        Ok(None) => Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get product: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// Core business logic for rendering the products page.
///
/// Returns every product, newest first, with its images.
pub fn show_products<R>(repo: &R) -> ServiceResult<Vec<Product>>
where
    R: ProductReader,
{
    match repo.list_products() {
        Ok(products) => Ok(products),
        Err(e) => {
            log::error!("Failed to list products: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// Load a single product for the edit form.
pub fn show_product<R>(product_id: i32, repo: &R) -> ServiceResult<Product>
where
    R: ProductReader,
{
    find_product(product_id, repo)
}

/// Create a product and attach the uploaded images.
///
/// The image limit is checked before anything is written. Once the product
/// row exists, upload failures are reported as [`ServiceError::Internal`] and
/// the product keeps the images stored before the failure.
pub fn create_product<R, S>(
    payload: ProductFormPayload,
    max_images: usize,
    repo: &R,
    storage: &S,
) -> ServiceResult<Product>
where
    R: ProductReader + ProductWriter + ProductImageReader + ProductImageWriter,
    S: ImageStorage + ?Sized,
{
    if payload.uploads.len() > max_images {
        return Err(too_many_images(max_images));
    }

    let product = match repo.create_product(&payload.product) {
        Ok(product) => product,
        Err(e) => {
            log::error!("Failed to create product: {e}");
            return Err(ServiceError::Internal);
        }
    };

    log::info!("Created product {}", product.id);

    reconcile_images(product.id, &[], payload.uploads, repo, storage)
}

/// Overwrite the fields of a product, then reconcile its images.
///
/// The image limit is evaluated against the images that survive the
/// requested removals.
pub fn update_product<R, S>(
    product_id: i32,
    payload: ProductFormPayload,
    max_images: usize,
    repo: &R,
    storage: &S,
) -> ServiceResult<Product>
where
    R: ProductReader + ProductWriter + ProductImageReader + ProductImageWriter,
    S: ImageStorage + ?Sized,
{
    let product = find_product(product_id, repo)?;

    let kept = product
        .images
        .iter()
        .filter(|image| !payload.remove_images.contains(&image.id))
        .count();
    if kept + payload.uploads.len() > max_images {
        return Err(too_many_images(max_images));
    }

    match repo.update_product(product.id, &payload.product) {
        Ok(0) => return Err(ServiceError::NotFound),
        Ok(_) => {}
        Err(e) => {
            log::error!("Failed to update product: {e}");
            return Err(ServiceError::Internal);
        }
    }

    reconcile_images(
        product.id,
        &payload.remove_images,
        payload.uploads,
        repo,
        storage,
    )
}

/// Delete a product with its image rows and files.
///
/// Rows go first in a single transaction; files are removed afterwards and a
/// file that cannot be removed is only logged.
pub fn delete_product<R, S>(product_id: i32, repo: &R, storage: &S) -> ServiceResult<()>
where
    R: ProductReader + ProductWriter,
    S: ImageStorage + ?Sized,
{
    let product = find_product(product_id, repo)?;

    let images = match repo.delete_product(product.id) {
        Ok(Some(images)) => images,
        Ok(None) => return Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to delete product: {e}");
            return Err(ServiceError::Internal);
        }
    };

    for image in &images {
        remove_image_file(image, storage);
    }

    log::info!(
        "Deleted product {} with {} images",
        product.id,
        images.len()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::{NamedTempFile, TempDir};

    use super::*;
    use crate::domain::product::NewProduct;
    use crate::domain::types::{ImageKind, ProductDetails, ProductName, ProductPrice};
    use crate::repository::test::TestRepository;
    use crate::storage::{ImageUpload, LocalImageStorage};

    const MAX_IMAGES: usize = 3;

    fn new_product(name: &str, details: &str, price: f64) -> NewProduct {
        NewProduct::new(
            ProductName::new(name).unwrap(),
            ProductDetails::new(details).unwrap(),
            ProductPrice::new(price).unwrap(),
        )
    }

    fn upload(kind: ImageKind) -> ImageUpload {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"image").unwrap();
        ImageUpload::new(kind, file)
    }

    fn payload(product: NewProduct, uploads: Vec<ImageUpload>) -> ProductFormPayload {
        ProductFormPayload {
            product,
            uploads,
            remove_images: vec![],
        }
    }

    fn storage() -> (TempDir, LocalImageStorage) {
        let root = tempfile::tempdir().unwrap();
        let storage = LocalImageStorage::new(root.path());
        (root, storage)
    }

    #[test]
    fn create_then_get_returns_same_fields() {
        let (_root, storage) = storage();
        let repo = TestRepository::new();

        let created = create_product(
            payload(new_product("Chair", "Wooden chair", 49.99), vec![]),
            MAX_IMAGES,
            &repo,
            &storage,
        )
        .unwrap();

        let loaded = show_product(created.id.get(), &repo).unwrap();
        assert_eq!(loaded.name.as_str(), "Chair");
        assert_eq!(loaded.details.as_str(), "Wooden chair");
        assert_eq!(loaded.price.get(), 49.99);
        assert!(loaded.images.is_empty());
    }

    #[test]
    fn create_rejects_too_many_images_before_writing() {
        let (root, storage) = storage();
        let repo = TestRepository::new();
        let uploads = (0..=MAX_IMAGES).map(|_| upload(ImageKind::Png)).collect();

        let err = create_product(
            payload(new_product("Chair", "Wooden chair", 1.0), uploads),
            MAX_IMAGES,
            &repo,
            &storage,
        )
        .unwrap_err();

        assert!(matches!(err, ServiceError::Form(ref errors) if errors.contains("images")));
        assert!(show_products(&repo).unwrap().is_empty());
        assert!(!root.path().join("products").exists());
    }

    #[test]
    fn lists_newest_first() {
        let repo = TestRepository::new()
            .with_product(&new_product("Old", "first", 1.0), &[])
            .with_product(&new_product("New", "second", 2.0), &[]);

        let products = show_products(&repo).unwrap();

        let names = products
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["New", "Old"]);
    }

    #[test]
    fn show_product_maps_missing_and_invalid_ids_to_not_found() {
        let repo = TestRepository::new();

        assert_eq!(show_product(1, &repo).unwrap_err(), ServiceError::NotFound);
        assert_eq!(show_product(0, &repo).unwrap_err(), ServiceError::NotFound);
    }

    #[test]
    fn update_overwrites_fields_and_keeps_images() {
        let (_root, storage) = storage();
        let repo = TestRepository::new();
        let created = create_product(
            payload(
                new_product("Chair", "Wooden chair", 49.99),
                vec![upload(ImageKind::Jpeg)],
            ),
            MAX_IMAGES,
            &repo,
            &storage,
        )
        .unwrap();

        let updated = update_product(
            created.id.get(),
            payload(new_product("Stool", "Metal stool", 19.5), vec![]),
            MAX_IMAGES,
            &repo,
            &storage,
        )
        .unwrap();

        assert_eq!(updated.name.as_str(), "Stool");
        assert_eq!(updated.price.get(), 19.5);
        assert_eq!(updated.images, created.images);
    }

    #[test]
    fn update_of_missing_product_is_not_found() {
        let (_root, storage) = storage();
        let repo = TestRepository::new();

        let err = update_product(
            42,
            payload(new_product("Chair", "Wooden chair", 1.0), vec![]),
            MAX_IMAGES,
            &repo,
            &storage,
        )
        .unwrap_err();

        assert_eq!(err, ServiceError::NotFound);
    }

    #[test]
    fn update_limit_counts_images_that_survive_removal() {
        let (_root, storage) = storage();
        let repo = TestRepository::new();
        let uploads = (0..MAX_IMAGES).map(|_| upload(ImageKind::Png)).collect();
        let created = create_product(
            payload(new_product("Chair", "Wooden chair", 1.0), uploads),
            MAX_IMAGES,
            &repo,
            &storage,
        )
        .unwrap();

        let full = update_product(
            created.id.get(),
            payload(
                new_product("Chair", "Wooden chair", 1.0),
                vec![upload(ImageKind::Png)],
            ),
            MAX_IMAGES,
            &repo,
            &storage,
        );
        assert!(matches!(full, Err(ServiceError::Form(_))));

        let mut replace = payload(
            new_product("Chair", "Wooden chair", 1.0),
            vec![upload(ImageKind::Png)],
        );
        replace.remove_images = vec![created.images[0].id];
        let updated =
            update_product(created.id.get(), replace, MAX_IMAGES, &repo, &storage).unwrap();
        assert_eq!(updated.images.len(), MAX_IMAGES);
    }

    #[test]
    fn chair_scenario_replaces_first_image() {
        let (_root, storage) = storage();
        let repo = TestRepository::new();
        let created = create_product(
            payload(
                new_product("Chair", "Wooden chair", 49.99),
                vec![upload(ImageKind::Jpeg), upload(ImageKind::Png)],
            ),
            MAX_IMAGES,
            &repo,
            &storage,
        )
        .unwrap();
        let first = created.images[0].clone();
        let second = created.images[1].clone();

        let mut edit = payload(
            new_product("Chair", "Wooden chair", 49.99),
            vec![upload(ImageKind::Webp)],
        );
        edit.remove_images = vec![first.id];
        let updated =
            update_product(created.id.get(), edit, MAX_IMAGES, &repo, &storage).unwrap();

        assert_eq!(updated.images.len(), 2);
        assert_eq!(updated.images[0], second);
        assert!(updated.images[1].image.as_str().ends_with(".webp"));
        assert!(!storage.resolve(&first.image).is_file());
        assert!(storage.resolve(&second.image).is_file());
    }

    #[test]
    fn delete_removes_rows_and_files() {
        let (_root, storage) = storage();
        let repo = TestRepository::new();
        let created = create_product(
            payload(
                new_product("Chair", "Wooden chair", 49.99),
                vec![upload(ImageKind::Jpeg), upload(ImageKind::Png)],
            ),
            MAX_IMAGES,
            &repo,
            &storage,
        )
        .unwrap();

        delete_product(created.id.get(), &repo, &storage).unwrap();

        assert_eq!(
            show_product(created.id.get(), &repo).unwrap_err(),
            ServiceError::NotFound
        );
        assert_eq!(repo.image_count(), 0);
        for image in &created.images {
            assert!(!storage.resolve(&image.image).is_file());
        }
        assert_eq!(
            delete_product(created.id.get(), &repo, &storage).unwrap_err(),
            ServiceError::NotFound
        );
    }
}

use diesel::prelude::*;
use pushkind_catalog::domain::product::NewProduct;
use pushkind_catalog::domain::product_image::NewProductImage;
use pushkind_catalog::domain::types::{
    ImagePath, ProductDetails, ProductId, ProductImageId, ProductName, ProductPrice,
};
use pushkind_catalog::repository::{
    DieselRepository, ProductImageReader, ProductImageWriter, ProductReader, ProductWriter,
};
use pushkind_catalog::schema::{product_images, products};

mod common;

fn new_product(name: &str, details: &str, price: f64) -> NewProduct {
    NewProduct::new(
        ProductName::new(name).expect("valid name"),
        ProductDetails::new(details).expect("valid details"),
        ProductPrice::new(price).expect("valid price"),
    )
}

fn attach(repo: &DieselRepository, product_id: ProductId, path: &str) -> ProductImageId {
    repo.create_product_image(&NewProductImage::new(
        product_id,
        ImagePath::new(path).expect("valid path"),
    ))
    .expect("should create image")
    .id
}

#[test]
fn create_then_get_returns_product_without_images() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());

    let created = repo
        .create_product(&new_product("Chair", "Wooden chair", 49.99))
        .expect("should create product");

    let loaded = repo
        .get_product_by_id(created.id)
        .expect("should query product")
        .expect("product should exist");

    assert_eq!(loaded.name.as_str(), "Chair");
    assert_eq!(loaded.details.as_str(), "Wooden chair");
    assert_eq!(loaded.price.get(), 49.99);
    assert!(loaded.images.is_empty());
}

#[test]
fn missing_product_is_none() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());

    let missing = repo
        .get_product_by_id(ProductId::new(404).unwrap())
        .expect("should query product");

    assert!(missing.is_none());
}

#[test]
fn list_is_newest_first_with_images_in_upload_order() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());

    let older = repo
        .create_product(&new_product("Table", "Oak table", 120.0))
        .expect("should create product");
    let newer = repo
        .create_product(&new_product("Chair", "Wooden chair", 49.99))
        .expect("should create product");
    attach(&repo, newer.id, "products/a.jpg");
    attach(&repo, older.id, "products/c.jpg");
    attach(&repo, newer.id, "products/b.png");

    let items = repo.list_products().expect("should list products");

    let ids = items.iter().map(|p| p.id).collect::<Vec<_>>();
    assert_eq!(ids, vec![newer.id, older.id]);
    let newer_images = items[0]
        .images
        .iter()
        .map(|image| image.image.as_str())
        .collect::<Vec<_>>();
    assert_eq!(newer_images, vec!["products/a.jpg", "products/b.png"]);
    assert_eq!(items[1].images.len(), 1);
}

#[test]
fn update_overwrites_fields_only() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());
    let created = repo
        .create_product(&new_product("Chair", "Wooden chair", 49.99))
        .expect("should create product");
    attach(&repo, created.id, "products/a.jpg");

    let affected = repo
        .update_product(created.id, &new_product("Stool", "Metal stool", 15.0))
        .expect("should update product");
    assert_eq!(affected, 1);

    let loaded = repo
        .get_product_by_id(created.id)
        .expect("should query product")
        .expect("product should exist");
    assert_eq!(loaded.name.as_str(), "Stool");
    assert_eq!(loaded.price.get(), 15.0);
    assert_eq!(loaded.images.len(), 1);

    let affected = repo
        .update_product(ProductId::new(999).unwrap(), &new_product("X", "Y", 1.0))
        .expect("should run update");
    assert_eq!(affected, 0);
}

#[test]
fn image_lookup_is_scoped_to_product() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());
    let first = repo
        .create_product(&new_product("Chair", "Wooden chair", 49.99))
        .expect("should create product");
    let second = repo
        .create_product(&new_product("Table", "Oak table", 120.0))
        .expect("should create product");
    let image_id = attach(&repo, first.id, "products/a.jpg");

    assert!(
        repo.get_product_image(first.id, image_id)
            .expect("should query image")
            .is_some()
    );
    assert!(
        repo.get_product_image(second.id, image_id)
            .expect("should query image")
            .is_none()
    );

    assert_eq!(repo.delete_product_image(image_id).expect("should delete"), 1);
    assert_eq!(repo.delete_product_image(image_id).expect("should delete"), 0);
}

#[test]
fn delete_cascades_to_image_rows() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());
    let created = repo
        .create_product(&new_product("Chair", "Wooden chair", 49.99))
        .expect("should create product");
    attach(&repo, created.id, "products/a.jpg");
    attach(&repo, created.id, "products/b.jpg");

    let removed = repo
        .delete_product(created.id)
        .expect("should delete product")
        .expect("product existed");

    assert_eq!(removed.len(), 2);

    let mut conn = test_db.pool().get().expect("should acquire DB connection");
    let remaining_products: i64 = products::table
        .count()
        .get_result(&mut conn)
        .expect("should count products");
    let remaining_images: i64 = product_images::table
        .count()
        .get_result(&mut conn)
        .expect("should count images");
    assert_eq!(remaining_products, 0);
    assert_eq!(remaining_images, 0);

    assert!(
        repo.delete_product(created.id)
            .expect("should run delete")
            .is_none()
    );
}

#[test]
fn database_cascade_removes_orphaned_rows() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());
    let created = repo
        .create_product(&new_product("Chair", "Wooden chair", 49.99))
        .expect("should create product");
    attach(&repo, created.id, "products/a.jpg");

    let mut conn = test_db.pool().get().expect("should acquire DB connection");
    diesel::delete(products::table.find(created.id.get()))
        .execute(&mut conn)
        .expect("should delete product row directly");

    let remaining_images: i64 = product_images::table
        .count()
        .get_result(&mut conn)
        .expect("should count images");
    assert_eq!(remaining_images, 0);
}

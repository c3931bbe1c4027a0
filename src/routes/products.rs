use actix_multipart::form::MultipartForm;
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::dto::products::ProductDto;
use crate::forms::products::{FieldErrors, ProductForm, ProductFormPayload, ProductFormValues};
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{base_context, local_referer, redirect, render_template};
use crate::services::ServiceError;
use crate::services::products::{
    create_product as create_product_service, delete_product as delete_product_service,
    show_product as show_product_service, show_products as show_products_service,
    update_product as update_product_service,
};
use crate::storage::LocalImageStorage;

/// Render the create/edit form. `product` is set when editing.
fn render_product_form(
    tera: &Tera,
    flash_messages: &IncomingFlashMessages,
    product: Option<&ProductDto>,
    values: &ProductFormValues,
    errors: &FieldErrors,
) -> HttpResponse {
    let mut context = base_context(flash_messages, "products");
    context.insert("product", &product);
    context.insert("values", values);
    context.insert("errors", errors);
    let action = match product {
        Some(product) => format!("/products/{}/update", product.id),
        None => "/products".to_string(),
    };
    context.insert("action", &action);

    let mut response = render_template(tera, "products/form.html", &context);
    if !errors.is_empty() {
        *response.status_mut() = StatusCode::UNPROCESSABLE_ENTITY;
    }
    response
}

#[get("/products")]
pub async fn show_products(
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match show_products_service(repo.get_ref()) {
        Ok(products) => {
            let products = products
                .into_iter()
                .map(ProductDto::from)
                .collect::<Vec<_>>();
            let mut context = base_context(&flash_messages, "products");
            context.insert("products", &products);
            render_template(&tera, "products/index.html", &context)
        }
        Err(err) => {
            log::error!("Failed to render products page: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/products/create")]
pub async fn create_product_form(
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    render_product_form(
        &tera,
        &flash_messages,
        None,
        &ProductFormValues::default(),
        &FieldErrors::default(),
    )
}

#[post("/products")]
pub async fn create_product(
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    storage: web::Data<LocalImageStorage>,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
    MultipartForm(form): MultipartForm<ProductForm>,
) -> impl Responder {
    let values = ProductFormValues::from_form(&form);

    let result = ProductFormPayload::try_from(form)
        .map_err(ServiceError::from)
        .and_then(|payload| {
            create_product_service(
                payload,
                server_config.max_images_per_product,
                repo.get_ref(),
                storage.get_ref(),
            )
        });

    match result {
        Ok(product) => {
            FlashMessage::success(format!("Товар «{}» добавлен.", product.name)).send();
            redirect("/products")
        }
        Err(ServiceError::Form(errors)) => {
            render_product_form(&tera, &flash_messages, None, &values, &errors)
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Товар не найден.").send();
            redirect("/products")
        }
        Err(err) => {
            log::error!("Failed to create product: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/products/{product_id}/edit")]
pub async fn edit_product_form(
    product_id: web::Path<i32>,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match show_product_service(product_id.into_inner(), repo.get_ref()) {
        Ok(product) => {
            let values = ProductFormValues::from_product(&product);
            let product = ProductDto::from(product);
            render_product_form(
                &tera,
                &flash_messages,
                Some(&product),
                &values,
                &FieldErrors::default(),
            )
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Товар не найден.").send();
            redirect("/products")
        }
        Err(err) => {
            log::error!("Failed to render product form: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/products/{product_id}/update")]
pub async fn update_product(
    product_id: web::Path<i32>,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    storage: web::Data<LocalImageStorage>,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
    MultipartForm(form): MultipartForm<ProductForm>,
) -> impl Responder {
    let product_id = product_id.into_inner();
    let values = ProductFormValues::from_form(&form);

    let result = ProductFormPayload::try_from(form)
        .map_err(ServiceError::from)
        .and_then(|payload| {
            update_product_service(
                product_id,
                payload,
                server_config.max_images_per_product,
                repo.get_ref(),
                storage.get_ref(),
            )
        });

    match result {
        Ok(product) => {
            FlashMessage::success(format!("Товар «{}» обновлён.", product.name)).send();
            redirect("/products")
        }
        Err(ServiceError::Form(errors)) => {
            let product = match show_product_service(product_id, repo.get_ref()) {
                Ok(product) => ProductDto::from(product),
                Err(ServiceError::NotFound) => {
                    FlashMessage::error("Товар не найден.").send();
                    return redirect("/products");
                }
                Err(err) => {
                    log::error!("Failed to reload product for form: {err}");
                    return HttpResponse::InternalServerError().finish();
                }
            };
            render_product_form(&tera, &flash_messages, Some(&product), &values, &errors)
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Товар не найден.").send();
            redirect("/products")
        }
        Err(err) => {
            log::error!("Failed to update product: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/products/{product_id}/delete")]
pub async fn delete_product(
    req: HttpRequest,
    product_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
    storage: web::Data<LocalImageStorage>,
) -> impl Responder {
    let back = local_referer(&req).unwrap_or("/products").to_string();

    match delete_product_service(product_id.into_inner(), repo.get_ref(), storage.get_ref()) {
        Ok(()) => FlashMessage::success("Товар удалён.").send(),
        Err(ServiceError::NotFound) => FlashMessage::error("Товар не найден.").send(),
        Err(err) => {
            log::error!("Failed to delete product: {err}");
            return HttpResponse::InternalServerError().finish();
        }
    }

    redirect(&back)
}

use std::env;

use actix_files::Files;
use actix_multipart::form::MultipartFormConfig;
use actix_web::cookie::Key;
use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, web};
use actix_web_flash_messages::{FlashMessagesFramework, storage::CookieMessageStore};
use config::Config;
use dotenvy::dotenv;
use tera::Tera;

use pushkind_catalog::db::establish_connection_pool;
use pushkind_catalog::models::config::ServerConfig;
use pushkind_catalog::repository::DieselRepository;
use pushkind_catalog::routes::main::index;
use pushkind_catalog::routes::products::{
    create_product, create_product_form, delete_product, edit_product_form, show_products,
    update_product,
};
use pushkind_catalog::storage::LocalImageStorage;

const MULTIPART_TOTAL_LIMIT: usize = 50 * 1024 * 1024;

fn load_config() -> Result<ServerConfig, config::ConfigError> {
    let app_env = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());

    Config::builder()
        .add_source(config::File::with_name("config/default").required(false))
        .add_source(config::File::with_name(&format!("config/{app_env}")).required(false))
        .add_source(config::Environment::with_prefix("APP"))
        .build()?
        .try_deserialize::<ServerConfig>()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let server_config = match load_config() {
        Ok(server_config) => server_config,
        Err(e) => {
            log::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    let pool = match establish_connection_pool(&server_config.database_url) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };

    let storage = LocalImageStorage::new(&server_config.public_dir);
    if let Err(e) = storage.ensure_dirs() {
        log::error!(
            "Failed to prepare image directory under {}: {e}",
            storage.public_root().display()
        );
        std::process::exit(1);
    }

    let tera = match Tera::new(&format!("{}/**/*", server_config.templates_dir)) {
        Ok(tera) => tera,
        Err(e) => {
            log::error!("Failed to parse templates: {e}");
            std::process::exit(1);
        }
    };

    let secret_key = match &server_config.secret {
        Some(secret) => match Key::try_from(secret.as_bytes()) {
            Ok(key) => key,
            Err(e) => {
                log::error!("Invalid secret, at least 64 bytes are required: {e}");
                std::process::exit(1);
            }
        },
        None => {
            log::warn!("No secret configured, flash messages will not survive a restart");
            Key::generate()
        }
    };
    let message_framework =
        FlashMessagesFramework::builder(CookieMessageStore::builder(secret_key).build()).build();

    let repo = DieselRepository::new(pool);
    let bind_address = (server_config.address.clone(), server_config.port);
    let public_dir = server_config.public_dir.clone();

    log::info!("Starting server at {}:{}", bind_address.0, bind_address.1);

    HttpServer::new(move || {
        App::new()
            .wrap(message_framework.clone())
            .wrap(Logger::default())
            .app_data(MultipartFormConfig::default().total_limit(MULTIPART_TOTAL_LIMIT))
            .app_data(web::Data::new(repo.clone()))
            .app_data(web::Data::new(storage.clone()))
            .app_data(web::Data::new(server_config.clone()))
            .app_data(web::Data::new(tera.clone()))
            .service(Files::new("/public", public_dir.clone()))
            .service(index)
            .service(show_products)
            .service(create_product_form)
            .service(create_product)
            .service(edit_product_form)
            .service(update_product)
            .service(delete_product)
    })
    .bind(bind_address)?
    .run()
    .await
}

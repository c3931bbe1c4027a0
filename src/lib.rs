//! Core library exports for the Catalog service.
//!
//! The `data` feature exposes the domain, persistence models and repository
//! layer. The `server` feature adds forms, image storage, services and the
//! HTTP routes used by the Catalog web application.

#[cfg(feature = "data")]
pub mod db;
#[cfg(feature = "data")]
pub mod domain;
#[cfg(feature = "data")]
pub mod models;
#[cfg(feature = "data")]
pub mod repository;
#[cfg(feature = "data")]
pub mod schema;

#[cfg(feature = "server")]
pub mod dto;
#[cfg(feature = "server")]
mod error_conversions;
#[cfg(feature = "server")]
pub mod forms;
#[cfg(feature = "server")]
pub mod routes;
#[cfg(feature = "server")]
pub mod services;
#[cfg(feature = "server")]
pub mod storage;

/// Directory under the public root that holds uploaded product images.
pub const PRODUCT_IMAGES_DIR: &str = "products";

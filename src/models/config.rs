use serde::Deserialize;

/// Configuration options specific to the Catalog service.
#[derive(Clone, Debug, Deserialize)]
pub struct ServerConfig {
    /// Interface the HTTP server binds to.
    #[serde(default = "default_address")]
    pub address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Path of the SQLite database file.
    pub database_url: String,
    /// Public root; uploaded images live in its `products` subdirectory.
    #[serde(default = "default_public_dir")]
    pub public_dir: String,
    #[serde(default = "default_templates_dir")]
    pub templates_dir: String,
    /// Key material for signing flash-message cookies (at least 64 bytes).
    /// A random key is generated on startup when absent.
    #[serde(default)]
    pub secret: Option<String>,
    #[serde(default = "default_max_images_per_product")]
    pub max_images_per_product: usize,
}

fn default_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_public_dir() -> String {
    "public".to_string()
}

fn default_templates_dir() -> String {
    "templates".to_string()
}

fn default_max_images_per_product() -> usize {
    10
}

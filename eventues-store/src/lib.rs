pub mod app_config;
pub mod catalog_client;

pub use app_config::Config;
pub use catalog_client::HttpCatalogRepository;

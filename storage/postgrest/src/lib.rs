pub mod configuration;
mod locations;
mod photos;
pub mod repository;

pub use configuration::BackendConfig;
pub use repository::Repository;

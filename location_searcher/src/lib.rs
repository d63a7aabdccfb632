pub mod configuration;
mod geocoding;
pub mod searcher;

pub use configuration::GeocoderConfig;
pub use searcher::Searcher;

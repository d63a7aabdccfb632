pub mod geo;
pub mod locations;

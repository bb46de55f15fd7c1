pub mod detail;
pub mod engine;
pub mod geolocate;
pub mod query;
pub mod tiles;

//! Business logic services

pub mod geo;
pub mod geocoding;
pub mod hos;
pub mod log_sheet;
pub mod nominatim;
pub mod planner;
pub mod routing;

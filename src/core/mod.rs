//! Core fix types and constants for the geolocation application

pub mod types;
pub mod constants;

pub use types::*;
pub use constants::*;

//! IP geolocation port

pub mod client;

pub use client::{EnrichmentResult, GeoInfoClient, GeoLookupError};

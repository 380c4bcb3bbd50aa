//! Outbound IP geolocation adapters

mod ipinfo;

pub use ipinfo::{IpInfoClient, DEFAULT_IPINFO_BASE_URL};

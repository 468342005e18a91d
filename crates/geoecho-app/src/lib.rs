//! The GeoEcho request handler: a location echo endpoint plus a static-site fallback.

mod app;
pub mod location;
pub mod static_assets;

pub use app::{build_router, GeoEcho};
pub use location::{
    LocationEnvelope, CLIENT_IP_HEADER, DEFAULT_SOURCE, LOCATION_PATH, UNKNOWN_CLIENT_IP,
};

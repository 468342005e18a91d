//! Core primitives shared by the GeoEcho request handler and its edge adapters.

pub mod app;
pub mod assets;
pub mod body;
pub mod context;
pub mod error;
pub mod handler;
pub mod http;
pub mod manifest;
pub mod metadata;
pub mod middleware;
pub mod response;
pub mod router;

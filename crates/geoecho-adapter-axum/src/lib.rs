//! Axum adapter: runs the GeoEcho router as a local development server.

#[cfg(feature = "axum")]
mod assets;
#[cfg(feature = "axum")]
mod context;
#[cfg(feature = "axum")]
mod dev_server;
#[cfg(feature = "axum")]
mod request;
#[cfg(feature = "axum")]
mod response;
#[cfg(feature = "axum")]
mod service;

/// Manifest key for this adapter's `[logging.<adapter>]` table.
pub const ADAPTER_NAME: &str = "axum";

#[cfg(feature = "axum")]
pub use assets::DirectoryAssets;
#[cfg(feature = "axum")]
pub use context::AxumRequestContext;
#[cfg(feature = "axum")]
pub use dev_server::{run_app, AxumDevServer, AxumDevServerConfig};
#[cfg(feature = "axum")]
pub use request::into_core_request;
#[cfg(feature = "axum")]
pub use response::into_axum_response;
#[cfg(feature = "axum")]
pub use service::GeoEchoAxumService;

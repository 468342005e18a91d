//! Adapter helpers for Cloudflare Workers.

#[cfg(all(feature = "cloudflare", target_arch = "wasm32"))]
mod assets;
#[cfg(all(feature = "cloudflare", target_arch = "wasm32"))]
mod logger;
#[cfg(all(feature = "cloudflare", target_arch = "wasm32"))]
mod metadata;
#[cfg(all(feature = "cloudflare", target_arch = "wasm32"))]
mod request;
#[cfg(all(feature = "cloudflare", target_arch = "wasm32"))]
mod response;

#[cfg(all(feature = "cloudflare", target_arch = "wasm32"))]
pub use assets::CloudflareAssets;
#[cfg(all(feature = "cloudflare", target_arch = "wasm32"))]
pub use logger::ConsoleLogger;
#[cfg(all(feature = "cloudflare", target_arch = "wasm32"))]
pub use metadata::metadata_from_cf;
#[cfg(all(feature = "cloudflare", target_arch = "wasm32"))]
pub use request::{dispatch, into_core_request};
#[cfg(all(feature = "cloudflare", target_arch = "wasm32"))]
pub use response::{from_core_response, into_core_response};

/// Manifest key for this adapter's `[logging.<adapter>]` table.
pub const ADAPTER_NAME: &str = "cloudflare";

#[cfg(all(feature = "cloudflare", target_arch = "wasm32"))]
pub fn init_logger(level: log::LevelFilter) -> Result<(), log::SetLoggerError> {
    logger::install(level)
}

#[cfg(not(all(feature = "cloudflare", target_arch = "wasm32")))]
pub fn init_logger(_level: log::LevelFilter) -> Result<(), log::SetLoggerError> {
    Ok(())
}

/// Build the app from the embedded manifest and answer one Worker request.
#[cfg(all(feature = "cloudflare", target_arch = "wasm32"))]
pub async fn run_app<A: geoecho_core::app::Hooks>(
    manifest_src: &str,
    req: worker::Request,
    env: worker::Env,
    ctx: worker::Context,
) -> Result<worker::Response, worker::Error> {
    let loader = geoecho_core::manifest::ManifestLoader::load_from_str(manifest_src)
        .map_err(|err| worker::Error::RustError(err.to_string()))?;
    let manifest = loader.manifest();

    // A second install in the same isolate fails; the first logger stays active.
    init_logger(manifest.logging_or_default(ADAPTER_NAME).level_filter()).ok();

    let app = A::build_app(manifest);
    dispatch(&app, req, env, ctx, &manifest.assets.binding).await
}

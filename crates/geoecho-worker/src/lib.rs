//! Cloudflare Workers entry point for GeoEcho.

#![cfg_attr(target_arch = "wasm32", no_main)]

/// Manifest compiled into the worker; there is no filesystem at the edge.
pub const MANIFEST: &str = include_str!("../../../geoecho.toml");

#[cfg(target_arch = "wasm32")]
use geoecho_app::GeoEcho;
#[cfg(target_arch = "wasm32")]
use worker::*;

#[cfg(target_arch = "wasm32")]
#[event(fetch)]
pub async fn main(req: Request, env: Env, ctx: Context) -> Result<Response> {
    geoecho_adapter_cloudflare::run_app::<GeoEcho>(MANIFEST, req, env, ctx).await
}

use std::net::{SocketAddr, TcpListener as StdTcpListener};

use anyhow::Context;
use axum::Router;
use tokio::runtime::Builder as RuntimeBuilder;
use tokio::signal;
use tower::{service_fn, Service};

use geoecho_core::app::Hooks;
use geoecho_core::assets::AssetHandle;
use geoecho_core::manifest::Manifest;
use simple_logger::SimpleLogger;

use crate::assets::DirectoryAssets;
use crate::service::GeoEchoAxumService;
use crate::ADAPTER_NAME;

/// Configuration used when running the local dev server.
#[derive(Clone)]
pub struct AxumDevServerConfig {
    pub addr: SocketAddr,
    pub enable_ctrl_c: bool,
}

impl Default for AxumDevServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 8787)),
            enable_ctrl_c: true,
        }
    }
}

/// Blocking dev server runner used by the CLI.
pub struct AxumDevServer {
    service: GeoEchoAxumService,
    config: AxumDevServerConfig,
}

impl AxumDevServer {
    pub fn new(service: GeoEchoAxumService) -> Self {
        Self {
            service,
            config: AxumDevServerConfig::default(),
        }
    }

    pub fn with_config(service: GeoEchoAxumService, config: AxumDevServerConfig) -> Self {
        Self { service, config }
    }

    pub fn run(self) -> anyhow::Result<()> {
        let runtime = RuntimeBuilder::new_multi_thread()
            .enable_all()
            .build()
            .context("failed to build tokio runtime")?;

        runtime.block_on(async move { self.run_async().await })
    }

    async fn run_async(self) -> anyhow::Result<()> {
        let AxumDevServer { service, config } = self;

        let listener = StdTcpListener::bind(config.addr)
            .with_context(|| format!("failed to bind dev server to {}", config.addr))?;
        listener
            .set_nonblocking(true)
            .context("failed to set listener to non-blocking")?;

        let listener = tokio::net::TcpListener::from_std(listener)
            .context("failed to adopt std listener into tokio")?;

        log::info!("GeoEcho dev server listening on http://{}", config.addr);
        serve_with_listener(service, listener, config.enable_ctrl_c).await
    }

    #[cfg(test)]
    async fn run_with_listener(self, listener: tokio::net::TcpListener) -> anyhow::Result<()> {
        let AxumDevServer { service, config } = self;
        serve_with_listener(service, listener, config.enable_ctrl_c).await
    }
}

async fn serve_with_listener(
    service: GeoEchoAxumService,
    listener: tokio::net::TcpListener,
    enable_ctrl_c: bool,
) -> anyhow::Result<()> {
    let router = Router::new().fallback_service(service_fn(move |req| {
        let mut svc = service.clone();
        async move { svc.call(req).await }
    }));
    let make_service = router.into_make_service_with_connect_info::<SocketAddr>();

    let server = axum::serve(listener, make_service);
    if enable_ctrl_c {
        server
            .with_graceful_shutdown(async {
                let _ = signal::ctrl_c().await;
            })
            .await
            .context("axum server error")?;
    } else {
        server.await.context("axum server error")?;
    }

    Ok(())
}

/// Serve the app locally: static files come from the manifest's assets directory and
/// connection metadata from `[dev.metadata]`. `addr` overrides `[dev] addr`.
pub fn run_app<A: Hooks>(manifest: &Manifest, addr: Option<SocketAddr>) -> anyhow::Result<()> {
    let logging = manifest.logging_or_default(ADAPTER_NAME);
    SimpleLogger::new()
        .with_level(logging.level_filter())
        .init()
        .ok();

    let app = A::build_app(manifest);
    let assets = DirectoryAssets::new(manifest.assets_dir(), manifest.assets.index.clone());
    log::debug!(
        "{} serving assets from {}",
        app.name(),
        assets.root().display()
    );

    let service = GeoEchoAxumService::new(app.into_router())
        .with_assets(AssetHandle::with_fetcher(assets))
        .with_metadata(manifest.dev_metadata().clone());
    let config = AxumDevServerConfig {
        addr: addr.unwrap_or_else(|| manifest.dev_addr()),
        ..AxumDevServerConfig::default()
    };

    AxumDevServer::with_config(service, config).run()
}

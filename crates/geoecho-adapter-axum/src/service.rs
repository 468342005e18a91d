use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::Body as AxumBody;
use axum::http::{Request, Response};
use tokio::{runtime::Handle, task};
use tower::Service;

use geoecho_core::assets::AssetHandle;
use geoecho_core::metadata::ConnectionMetadata;
use geoecho_core::router::RouterService;

use crate::context::AxumRequestContext;
use crate::request::into_core_request;
use crate::response::into_axum_response;

/// Tower service that runs the core router for Axum/Hyper, supplying what the edge platform
/// would: an asset resolver and per-request connection metadata.
#[derive(Clone)]
pub struct GeoEchoAxumService {
    router: RouterService,
    assets: Option<AssetHandle>,
    metadata: ConnectionMetadata,
}

impl GeoEchoAxumService {
    pub fn new(router: RouterService) -> Self {
        Self {
            router,
            assets: None,
            metadata: ConnectionMetadata::default(),
        }
    }

    #[must_use]
    pub fn with_assets(mut self, assets: AssetHandle) -> Self {
        self.assets = Some(assets);
        self
    }

    /// Metadata attached to every request. When it pins no `clientIp`, the peer address is used.
    #[must_use]
    pub fn with_metadata(mut self, metadata: ConnectionMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

impl Service<Request<AxumBody>> for GeoEchoAxumService {
    type Response = Response<AxumBody>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<AxumBody>) -> Self::Future {
        let router = self.router.clone();
        let assets = self.assets.clone();
        let mut metadata = self.metadata.clone();
        Box::pin(async move {
            let mut core_request = into_core_request(request);

            if metadata.client_ip.is_none() {
                metadata.client_ip = AxumRequestContext::get(&core_request)
                    .and_then(|context| context.remote_addr)
                    .map(|addr| addr.ip().to_string());
            }
            ConnectionMetadata::insert(&mut core_request, metadata);
            if let Some(assets) = assets {
                assets.insert(&mut core_request);
            }

            let core_response = task::block_in_place(move || {
                Handle::current().block_on(router.oneshot(core_request))
            });
            Ok(into_axum_response(core_response))
        })
    }
}

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::EdgeError;
use crate::http::{Request, Response};

/// Capability that resolves requests for pre-built static files.
///
/// The hosting environment provides the implementation (the Workers `ASSETS` binding, a local
/// directory during development); handlers only ever consume it through an [`AssetHandle`].
#[async_trait(?Send)]
pub trait AssetFetcher: Send + Sync {
    /// Resolve `request`. A missing file is a response (typically 404), not an error; errors are
    /// reserved for failures to reach the resolver at all.
    async fn fetch(&self, request: Request) -> Result<Response, EdgeError>;
}

/// Cloneable handle to the asset resolver, stored in request extensions by adapters.
#[derive(Clone)]
pub struct AssetHandle {
    fetcher: Arc<dyn AssetFetcher>,
}

impl fmt::Debug for AssetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetHandle").finish_non_exhaustive()
    }
}

impl AssetHandle {
    pub fn new(fetcher: Arc<dyn AssetFetcher>) -> Self {
        Self { fetcher }
    }

    pub fn with_fetcher<F>(fetcher: F) -> Self
    where
        F: AssetFetcher + 'static,
    {
        Self::new(Arc::new(fetcher))
    }

    pub async fn fetch(&self, request: Request) -> Result<Response, EdgeError> {
        self.fetcher.fetch(request).await
    }

    pub fn insert(self, request: &mut Request) {
        request.extensions_mut().insert(self);
    }

    pub fn get(request: &Request) -> Option<AssetHandle> {
        request.extensions().get::<AssetHandle>().cloned()
    }
}

use crate::assets::AssetHandle;
use crate::http::Request;
use crate::metadata::ConnectionMetadata;

/// Request context exposed to handlers and middleware.
pub struct RequestContext {
    request: Request,
}

impl RequestContext {
    pub fn new(request: Request) -> Self {
        Self { request }
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn into_request(self) -> Request {
        self.request
    }

    /// Header value as UTF-8, or `None` when absent or not valid text.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.request
            .headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
    }

    pub fn metadata(&self) -> Option<&ConnectionMetadata> {
        ConnectionMetadata::get(&self.request)
    }

    pub fn assets(&self) -> Option<AssetHandle> {
        AssetHandle::get(&self.request)
    }
}

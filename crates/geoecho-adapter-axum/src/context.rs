use std::net::SocketAddr;

use geoecho_core::http::Request;

/// Connection details the dev server records on each core request.
#[derive(Clone, Debug)]
pub struct AxumRequestContext {
    pub remote_addr: Option<SocketAddr>,
}

impl AxumRequestContext {
    pub fn insert(request: &mut Request, context: AxumRequestContext) {
        request.extensions_mut().insert(context);
    }

    pub fn get(request: &Request) -> Option<&AxumRequestContext> {
        request.extensions().get::<AxumRequestContext>()
    }
}

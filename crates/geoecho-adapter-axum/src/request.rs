use std::net::SocketAddr;

use axum::body::Body as AxumBody;
use axum::extract::connect_info::ConnectInfo;
use axum::http::Request;
use geoecho_core::body::Body;
use geoecho_core::http::Request as CoreRequest;

use crate::context::AxumRequestContext;

/// Convert an Axum request into a core request. The body stays streaming; the peer address
/// from `ConnectInfo` moves into [`AxumRequestContext`].
pub fn into_core_request(request: Request<AxumBody>) -> CoreRequest {
    let (parts, body) = request.into_parts();
    let body = Body::from_stream(body.into_data_stream());
    let mut core_request = CoreRequest::from_parts(parts, body);

    if let Some(ConnectInfo(remote_addr)) = core_request
        .extensions_mut()
        .remove::<ConnectInfo<SocketAddr>>()
    {
        AxumRequestContext::insert(
            &mut core_request,
            AxumRequestContext {
                remote_addr: Some(remote_addr),
            },
        );
    }

    core_request
}

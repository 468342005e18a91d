use axum::body::Body as AxumBody;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Response, StatusCode};
use futures::executor::block_on;

use geoecho_core::body::Body;
use geoecho_core::http::Response as CoreResponse;

/// Convert a core response for Axum/Hyper.
///
/// Streaming bodies are drained into memory first: the core stream is not `Send`, so it cannot
/// be handed to Hyper directly.
pub fn into_axum_response(response: CoreResponse) -> Response<AxumBody> {
    let (parts, body) = response.into_parts();
    let bytes = match body {
        Body::Once(bytes) => bytes,
        stream => match block_on(stream.collect()) {
            Ok(bytes) => bytes,
            Err(err) => {
                log::error!("streaming response error: {err}");
                let mut response = Response::new(AxumBody::from("streaming response error"));
                *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
                response.headers_mut().insert(
                    CONTENT_TYPE,
                    HeaderValue::from_static("text/plain; charset=utf-8"),
                );
                return response;
            }
        },
    };

    Response::from_parts(parts, AxumBody::from(bytes))
}

use geoecho_core::body::Body;
use geoecho_core::error::EdgeError;
use geoecho_core::http::{HeaderName, HeaderValue, Response, StatusCode};
use futures_util::StreamExt;
use worker::{Error as WorkerError, Response as CfResponse};

pub fn from_core_response(response: Response) -> Result<CfResponse, EdgeError> {
    let (parts, body) = response.into_parts();

    let cf_response = match body {
        Body::Once(bytes) if bytes.is_empty() => {
            CfResponse::empty().map_err(EdgeError::internal)?
        }
        Body::Once(bytes) => CfResponse::from_bytes(bytes.to_vec()).map_err(EdgeError::internal)?,
        Body::Stream(stream) => {
            let worker_stream = stream
                .map(|res| match res {
                    Ok(bytes) => Ok::<Vec<u8>, WorkerError>(bytes.to_vec()),
                    Err(err) => Err(WorkerError::RustError(err.to_string())),
                })
                .boxed_local();
            CfResponse::from_stream(worker_stream).map_err(EdgeError::internal)?
        }
    };

    let mut cf_response = cf_response.with_status(parts.status.as_u16());
    let headers = cf_response.headers_mut();
    for (name, value) in parts.headers.iter() {
        if let Ok(value_str) = value.to_str() {
            headers
                .append(name.as_str(), value_str)
                .map_err(EdgeError::internal)?;
        }
    }
    Ok(cf_response)
}

/// Convert a Worker response (from the `ASSETS` fetcher) into a core response. The body is
/// buffered so bodiless statuses such as `304` convert without a stream.
pub async fn into_core_response(mut cf_response: CfResponse) -> Result<Response, EdgeError> {
    let status = StatusCode::from_u16(cf_response.status_code()).map_err(EdgeError::internal)?;
    let bytes = cf_response.bytes().await.map_err(EdgeError::internal)?;

    let mut response = Response::new(Body::from(bytes));
    *response.status_mut() = status;
    for (name, value) in cf_response.headers().entries() {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(&value),
        ) {
            response.headers_mut().append(name, value);
        }
    }
    Ok(response)
}

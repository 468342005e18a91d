use geoecho_core::context::RequestContext;
use geoecho_core::error::EdgeError;
use geoecho_core::http::{Response, StatusCode};
use geoecho_core::response::{IntoResponse, Json};
use serde::Serialize;

/// Characters of resolver body kept in the failure diagnostic.
pub const EXCERPT_LIMIT: usize = 200;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ResolverStatusFailure {
    message: &'static str,
    status: u16,
    asset_path: String,
    body: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DelegationFailure {
    message: &'static str,
    asset_path: String,
    error: ErrorDetail,
}

#[derive(Debug, Serialize)]
struct ErrorDetail {
    name: &'static str,
    message: String,
}

/// Forward a non-API `GET` or `HEAD` to the bound asset resolver.
///
/// Success (2xx) and `304 Not Modified` pass through untouched. Anything else becomes a `500`
/// with a JSON diagnostic carrying the resolver's status and a body excerpt; a failure to reach
/// the resolver at all becomes a `500` naming the error.
pub async fn serve_asset(ctx: RequestContext) -> Result<Response, EdgeError> {
    let asset_path = ctx.request().uri().path().to_string();

    let Some(assets) = ctx.assets() else {
        let err = EdgeError::internal(anyhow::anyhow!("no static asset resolver is bound"));
        log::error!("asset delegation failed path={} error={}", asset_path, err);
        return Ok(delegation_failure(asset_path, &err));
    };

    match assets.fetch(ctx.into_request()).await {
        Ok(response) if passes_through(response.status()) => Ok(response),
        Ok(response) => {
            let status = response.status();
            let body = match response.into_body().collect().await {
                Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                Err(err) => format!("<unreadable body: {}>", err),
            };
            log::warn!(
                "asset resolver returned status={} path={}",
                status.as_u16(),
                asset_path
            );
            Ok(resolver_status_failure(asset_path, status, &body))
        }
        Err(err) => {
            log::error!("asset delegation failed path={} error={}", asset_path, err);
            Ok(delegation_failure(asset_path, &err))
        }
    }
}

fn passes_through(status: StatusCode) -> bool {
    status.is_success() || status == StatusCode::NOT_MODIFIED
}

/// First [`EXCERPT_LIMIT`] characters, with `...` appended when anything was cut.
pub fn excerpt(body: &str) -> String {
    match body.char_indices().nth(EXCERPT_LIMIT) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}

fn resolver_status_failure(asset_path: String, status: StatusCode, body: &str) -> Response {
    let payload = ResolverStatusFailure {
        message: "Static asset resolver returned a non-success status",
        status: status.as_u16(),
        asset_path,
        body: excerpt(body),
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
}

fn delegation_failure(asset_path: String, err: &EdgeError) -> Response {
    let payload = DelegationFailure {
        message: "Failed to fetch static asset",
        asset_path,
        error: ErrorDetail {
            name: err.kind(),
            message: err.message(),
        },
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
}

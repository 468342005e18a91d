use std::sync::Arc;

use geoecho_core::context::RequestContext;
use geoecho_core::error::EdgeError;
use geoecho_core::metadata::ConnectionMetadata;
use geoecho_core::response::Json;
use serde::{Deserialize, Serialize};

pub const LOCATION_PATH: &str = "/api/location";
pub const CLIENT_IP_HEADER: &str = "CF-Connecting-IP";
pub const UNKNOWN_CLIENT_IP: &str = "N/A";
pub const DEFAULT_SOURCE: &str = "Cloudflare_Worker_Hono";

/// Body of every `/api/location` response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocationEnvelope {
    pub data: ConnectionMetadata,
    pub source: String,
}

/// Header first, then the platform-reported address, then the sentinel. Empty values count as
/// missing.
pub fn resolve_client_ip(header: Option<&str>, reported: Option<&str>) -> String {
    header
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .or_else(|| reported.filter(|value| !value.is_empty()))
        .unwrap_or(UNKNOWN_CLIENT_IP)
        .to_string()
}

pub fn location_envelope(ctx: &RequestContext, source: &str) -> LocationEnvelope {
    let mut data = ctx.metadata().cloned().unwrap_or_default();
    data.client_ip = Some(resolve_client_ip(
        ctx.header(CLIENT_IP_HEADER),
        data.client_ip.as_deref(),
    ));
    LocationEnvelope {
        data,
        source: source.to_string(),
    }
}

pub(crate) async fn location(
    ctx: RequestContext,
    source: Arc<str>,
) -> Result<Json<LocationEnvelope>, EdgeError> {
    let envelope = location_envelope(&ctx, &source);
    log::debug!(
        "location lookup client_ip={} country={}",
        envelope.data.client_ip.as_deref().unwrap_or(UNKNOWN_CLIENT_IP),
        envelope.data.country.as_deref().unwrap_or("-")
    );
    Ok(Json(envelope))
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use geoecho_core::body::Body;
    use geoecho_core::http::header::CONTENT_TYPE;
    use geoecho_core::http::{request_builder, HeaderValue, Method, StatusCode};
    use geoecho_core::response::IntoResponse;
    use serde_json::{json, Value};

    fn context(header: Option<&'static str>, metadata: Option<ConnectionMetadata>) -> RequestContext {
        let mut request = request_builder()
            .method(Method::GET)
            .uri(LOCATION_PATH)
            .body(Body::empty())
            .expect("request");
        if let Some(value) = header {
            request
                .headers_mut()
                .insert(CLIENT_IP_HEADER, HeaderValue::from_static(value));
        }
        if let Some(metadata) = metadata {
            ConnectionMetadata::insert(&mut request, metadata);
        }
        RequestContext::new(request)
    }

    fn payload(ctx: RequestContext) -> Value {
        let response = block_on(location(ctx, Arc::from(DEFAULT_SOURCE)))
            .expect("handler ok")
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).expect("content type"),
            "application/json"
        );
        serde_json::from_slice(response.body().as_bytes()).expect("json")
    }

    #[test]
    fn header_overrides_reported_address() {
        let metadata = ConnectionMetadata {
            country: Some("US".into()),
            city: Some("SF".into()),
            client_ip: Some("10.0.0.1".into()),
            ..ConnectionMetadata::default()
        };
        let value = payload(context(Some("1.2.3.4"), Some(metadata)));

        assert_eq!(value["data"]["clientIp"], "1.2.3.4");
        assert_eq!(value["data"]["country"], "US");
        assert_eq!(value["data"]["city"], "SF");
        assert_eq!(value["source"], DEFAULT_SOURCE);
    }

    #[test]
    fn reported_address_used_without_header() {
        let metadata = ConnectionMetadata {
            client_ip: Some("198.51.100.4".into()),
            ..ConnectionMetadata::default()
        };
        let value = payload(context(None, Some(metadata)));
        assert_eq!(value["data"]["clientIp"], "198.51.100.4");
    }

    #[test]
    fn sentinel_used_when_no_address_is_known() {
        let value = payload(context(None, None));
        assert_eq!(
            value,
            json!({ "data": { "clientIp": UNKNOWN_CLIENT_IP }, "source": DEFAULT_SOURCE })
        );
    }

    #[test]
    fn empty_header_falls_through() {
        let value = payload(context(Some(""), None));
        assert_eq!(value["data"]["clientIp"], UNKNOWN_CLIENT_IP);
    }

    #[test]
    fn platform_extras_are_echoed() {
        let metadata = ConnectionMetadata {
            timezone: Some("Europe/Berlin".into()),
            ..ConnectionMetadata::default()
        }
        .with_extra("colo", Some("FRA"));
        let value = payload(context(None, Some(metadata)));
        assert_eq!(value["data"]["timezone"], "Europe/Berlin");
        assert_eq!(value["data"]["colo"], "FRA");
    }

    #[test]
    fn resolve_client_ip_order() {
        assert_eq!(resolve_client_ip(Some("1.1.1.1"), Some("2.2.2.2")), "1.1.1.1");
        assert_eq!(resolve_client_ip(Some("  "), Some("2.2.2.2")), "2.2.2.2");
        assert_eq!(resolve_client_ip(None, Some("")), UNKNOWN_CLIENT_IP);
        assert_eq!(resolve_client_ip(None, None), UNKNOWN_CLIENT_IP);
    }

    #[test]
    fn envelope_uses_given_source() {
        let envelope = location_envelope(&context(None, None), "Local_Dev");
        assert_eq!(envelope.source, "Local_Dev");
    }
}

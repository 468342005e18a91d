use std::sync::Arc;

use geoecho_core::app::Hooks;
use geoecho_core::context::RequestContext;
use geoecho_core::http::Method;
use geoecho_core::manifest::Manifest;
use geoecho_core::middleware::RequestLogger;
use geoecho_core::router::RouterService;

use crate::location::{location, DEFAULT_SOURCE, LOCATION_PATH};
use crate::static_assets::serve_asset;

pub struct GeoEcho;

impl Hooks for GeoEcho {
    fn routes(manifest: &Manifest) -> RouterService {
        build_router(manifest.source_override().unwrap_or(DEFAULT_SOURCE))
    }
}

/// HEAD is routed alongside GET; the hosting server drops the body.
pub fn build_router(source: &str) -> RouterService {
    let source: Arc<str> = Arc::from(source);
    let location_handler = move |ctx: RequestContext| location(ctx, Arc::clone(&source));
    RouterService::builder()
        .middleware(RequestLogger)
        .get(LOCATION_PATH, location_handler.clone())
        .route(LOCATION_PATH, Method::HEAD, location_handler)
        .fallback(Method::GET, serve_asset)
        .fallback(Method::HEAD, serve_asset)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use futures::executor::block_on;
    use geoecho_core::assets::{AssetFetcher, AssetHandle};
    use geoecho_core::body::Body;
    use geoecho_core::error::EdgeError;
    use geoecho_core::http::header::ALLOW;
    use geoecho_core::http::{request_builder, Request, Response, StatusCode};
    use geoecho_core::manifest::ManifestLoader;
    use geoecho_core::metadata::ConnectionMetadata;
    use geoecho_core::response::response_with_body;
    use serde_json::Value;

    use crate::location::{CLIENT_IP_HEADER, UNKNOWN_CLIENT_IP};

    struct Site;

    #[async_trait(?Send)]
    impl AssetFetcher for Site {
        async fn fetch(&self, request: Request) -> Result<Response, EdgeError> {
            match request.uri().path() {
                "/" | "/index.html" => Ok(response_with_body(
                    StatusCode::OK,
                    Body::from("<h1>GeoEcho</h1>"),
                )),
                _ => Ok(response_with_body(StatusCode::NOT_FOUND, Body::from("Not Found"))),
            }
        }
    }

    fn request(method: Method, path: &str) -> Request {
        let mut request = request_builder()
            .method(method)
            .uri(path)
            .body(Body::empty())
            .expect("request");
        AssetHandle::with_fetcher(Site).insert(&mut request);
        request
    }

    fn send(method: Method, path: &str) -> Response {
        block_on(build_router(DEFAULT_SOURCE).oneshot(request(method, path)))
    }

    fn json(response: &Response) -> Value {
        serde_json::from_slice(response.body().as_bytes()).expect("json")
    }

    #[test]
    fn location_echoes_header_and_metadata() {
        let router = build_router(DEFAULT_SOURCE);
        let mut req = request(Method::GET, LOCATION_PATH);
        req.headers_mut()
            .insert(CLIENT_IP_HEADER, "1.2.3.4".parse().expect("header"));
        ConnectionMetadata::insert(
            &mut req,
            ConnectionMetadata {
                country: Some("US".into()),
                city: Some("SF".into()),
                ..ConnectionMetadata::default()
            },
        );

        let response = block_on(router.oneshot(req));
        assert_eq!(response.status(), StatusCode::OK);
        let value = json(&response);
        assert_eq!(value["data"]["clientIp"], "1.2.3.4");
        assert_eq!(value["data"]["country"], "US");
        assert_eq!(value["data"]["city"], "SF");
        assert_eq!(value["source"], DEFAULT_SOURCE);
    }

    #[test]
    fn location_without_metadata_still_succeeds() {
        let response = send(Method::GET, LOCATION_PATH);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json(&response)["data"]["clientIp"], UNKNOWN_CLIENT_IP);
    }

    #[test]
    fn other_paths_are_served_from_assets() {
        let router = build_router(DEFAULT_SOURCE);
        let response = block_on(router.oneshot(request(Method::GET, "/")));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body().as_bytes(), b"<h1>GeoEcho</h1>");

        let response = block_on(router.oneshot(request(Method::GET, "/nope.css")));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let value = json(&response);
        assert_eq!(value["status"], 404);
        assert_eq!(value["assetPath"], "/nope.css");
    }

    #[test]
    fn non_get_on_location_is_method_not_allowed() {
        let response = send(Method::POST, LOCATION_PATH);
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers().get(ALLOW).expect("allow"), "GET, HEAD");
    }

    #[test]
    fn head_is_answered_like_get() {
        let response = send(Method::HEAD, LOCATION_PATH);
        assert_eq!(response.status(), StatusCode::OK);

        for path in ["/", "/index.html"] {
            let response = send(Method::HEAD, path);
            assert_eq!(response.status(), StatusCode::OK, "path {}", path);
        }

        let response = send(Method::HEAD, "/nope.css");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn non_get_elsewhere_is_not_found() {
        let response = send(Method::DELETE, "/index.html");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn hooks_apply_manifest_source() {
        let loader =
            ManifestLoader::load_from_str("[app]\nsource = \"Local_Dev\"\n").expect("manifest");
        let app = GeoEcho::build_app(loader.manifest());
        let response = block_on(app.router().oneshot(request(Method::GET, LOCATION_PATH)));
        assert_eq!(json(&response)["source"], "Local_Dev");
    }

    #[test]
    fn hooks_default_source_and_name() {
        let app = GeoEcho::build_app(&Manifest::default());
        assert_eq!(app.name(), "GeoEcho");
        let response = block_on(app.router().oneshot(request(Method::GET, LOCATION_PATH)));
        assert_eq!(json(&response)["source"], DEFAULT_SOURCE);
    }
}

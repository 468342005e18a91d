//! Local stand-in for the Workers assets binding: serves a directory of pre-built files.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use axum::body::Body as AxumBody;
use axum::http::request::Parts;
use axum::http::{Request as HttpRequest, Uri};
use tower::ServiceExt;
use tower_http::services::ServeDir;

use geoecho_core::assets::AssetFetcher;
use geoecho_core::body::Body;
use geoecho_core::error::EdgeError;
use geoecho_core::http::{Request, Response, StatusCode};
use geoecho_core::manifest::DEFAULT_INDEX_FILE;

/// Serves `root` through [`ServeDir`]. Directory paths get `index.html`, then any further
/// configured index names; traversal outside the root answers 404.
pub struct DirectoryAssets {
    root: PathBuf,
    index: Vec<String>,
    serve_dir: ServeDir,
}

impl DirectoryAssets {
    pub fn new(root: impl Into<PathBuf>, index: Vec<String>) -> Self {
        let root = root.into();
        let serve_dir = ServeDir::new(&root).append_index_html_on_directories(true);
        Self {
            root,
            index,
            serve_dir,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn serve(&self, parts: &Parts, uri: Uri) -> Result<Response, EdgeError> {
        let mut request = HttpRequest::new(());
        *request.method_mut() = parts.method.clone();
        *request.uri_mut() = uri;
        *request.headers_mut() = parts.headers.clone();

        let response = match self.serve_dir.clone().oneshot(request).await {
            Ok(response) => response,
            Err(never) => match never {},
        };
        let (parts, body) = response.into_parts();
        let bytes = axum::body::to_bytes(AxumBody::new(body), usize::MAX)
            .await
            .map_err(EdgeError::internal)?;
        Ok(Response::from_parts(parts, Body::from(bytes)))
    }
}

#[async_trait(?Send)]
impl AssetFetcher for DirectoryAssets {
    async fn fetch(&self, request: Request) -> Result<Response, EdgeError> {
        let (parts, _body) = request.into_parts();
        let response = self.serve(&parts, parts.uri.clone()).await?;

        let path = parts.uri.path();
        if response.status() != StatusCode::NOT_FOUND || !path.ends_with('/') {
            return Ok(response);
        }
        for name in self.index.iter().filter(|name| *name != DEFAULT_INDEX_FILE) {
            let Some(uri) = index_uri(&parts.uri, name) else {
                continue;
            };
            let candidate = self.serve(&parts, uri).await?;
            if candidate.status() != StatusCode::NOT_FOUND {
                return Ok(candidate);
            }
        }
        log::debug!("no asset for {}", path);
        Ok(response)
    }
}

fn index_uri(uri: &Uri, name: &str) -> Option<Uri> {
    let path_and_query = match uri.query() {
        Some(query) => format!("{}{}?{}", uri.path(), name, query),
        None => format!("{}{}", uri.path(), name),
    };
    Uri::builder()
        .path_and_query(path_and_query)
        .build()
        .ok()
}

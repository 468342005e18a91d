use async_trait::async_trait;
use geoecho_core::assets::AssetFetcher;
use geoecho_core::body::Body;
use geoecho_core::error::EdgeError;
use geoecho_core::http::{Request, Response};
use worker::{wasm_bindgen::JsValue, Env, Fetcher, Headers, Request as CfRequest, RequestInit};

use crate::request::into_cf_method;
use crate::response::into_core_response;

/// Static assets served through the Workers assets binding (`[assets] binding`, `ASSETS` by
/// default).
pub struct CloudflareAssets {
    fetcher: Fetcher,
}

impl CloudflareAssets {
    pub fn from_env(env: &Env, binding: &str) -> Result<Self, EdgeError> {
        let fetcher = env.assets(binding).map_err(|err| {
            EdgeError::internal(anyhow::anyhow!(
                "failed to open assets binding `{}`: {}",
                binding,
                err
            ))
        })?;
        Ok(Self { fetcher })
    }
}

#[async_trait(?Send)]
impl AssetFetcher for CloudflareAssets {
    async fn fetch(&self, request: Request) -> Result<Response, EdgeError> {
        let cf_request = into_cf_request(request).await?;
        let cf_response = self
            .fetcher
            .fetch_request(cf_request)
            .await
            .map_err(EdgeError::internal)?;
        into_core_response(cf_response).await
    }
}

/// Method, URL, headers and body are forwarded; the inbound `cf` object is not.
async fn into_cf_request(request: Request) -> Result<CfRequest, EdgeError> {
    let (parts, body) = request.into_parts();

    let mut init = RequestInit::new();
    init.with_method(into_cf_method(&parts.method));
    init.with_headers(Headers::from(&parts.headers));

    let bytes = body.collect().await.map_err(EdgeError::internal)?;
    if !bytes.is_empty() {
        let array = worker::js_sys::Uint8Array::from(bytes.as_ref());
        init.with_body(Some(JsValue::from(array)));
    }

    CfRequest::new_with_init(&parts.uri.to_string(), &init).map_err(EdgeError::internal)
}

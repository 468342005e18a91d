use geoecho_core::app::App;
use geoecho_core::assets::AssetHandle;
use geoecho_core::body::Body;
use geoecho_core::error::EdgeError;
use geoecho_core::http::{request_builder, Method as CoreMethod, Request, Uri};
use geoecho_core::metadata::ConnectionMetadata;
use worker::{
    Context, Env, Error as WorkerError, Method, Request as CfRequest, Response as CfResponse,
};

use crate::assets::CloudflareAssets;
use crate::metadata::metadata_from_cf;
use crate::response::from_core_response;

/// Convert a Worker request into a core request carrying the `cf` metadata record.
pub async fn into_core_request(mut req: CfRequest) -> Result<Request, EdgeError> {
    let method = into_core_method(req.method());
    let url = req
        .url()
        .map_err(|err| EdgeError::bad_request(format!("invalid URL: {}", err)))?;
    let uri: Uri = url
        .as_str()
        .parse()
        .map_err(|err| EdgeError::bad_request(format!("invalid URI: {}", err)))?;

    let mut builder = request_builder().method(method).uri(uri);
    for (name, value) in req.headers().entries() {
        builder = builder.header(name.as_str(), value);
    }

    let metadata = req.cf().map(metadata_from_cf).unwrap_or_default();

    let bytes = req.bytes().await.map_err(EdgeError::internal)?;
    let mut request = builder
        .body(Body::from(bytes))
        .map_err(EdgeError::internal)?;

    ConnectionMetadata::insert(&mut request, metadata);
    Ok(request)
}

/// Route one Worker request through `app`. The asset resolver is looked up under
/// `assets_binding`; when the binding is absent the request proceeds without one.
pub async fn dispatch(
    app: &App,
    req: CfRequest,
    env: Env,
    _ctx: Context,
    assets_binding: &str,
) -> Result<CfResponse, WorkerError> {
    let assets = match CloudflareAssets::from_env(&env, assets_binding) {
        Ok(assets) => Some(assets),
        Err(err) => {
            log::warn!("asset binding unavailable: {}", err);
            None
        }
    };

    let mut core_request = into_core_request(req)
        .await
        .map_err(edge_error_to_worker)?;

    if let Some(assets) = assets {
        AssetHandle::with_fetcher(assets).insert(&mut core_request);
    }

    let response = app.router().oneshot(core_request).await;
    from_core_response(response).map_err(edge_error_to_worker)
}

fn edge_error_to_worker(err: EdgeError) -> WorkerError {
    WorkerError::RustError(err.to_string())
}

fn into_core_method(method: Method) -> CoreMethod {
    CoreMethod::from_bytes(method.as_ref().as_bytes()).unwrap_or(CoreMethod::GET)
}

pub(crate) fn into_cf_method(method: &CoreMethod) -> Method {
    Method::from(method.as_str().to_string())
}

use std::sync::Arc;

use async_trait::async_trait;
use web_time::Instant;

use crate::context::RequestContext;
use crate::error::EdgeError;
use crate::handler::DynHandler;
use crate::http::Response;

pub type BoxMiddleware = Arc<dyn Middleware>;

/// Wraps every routed request. Call `next.run(ctx)` to continue down the chain.
#[async_trait(?Send)]
pub trait Middleware: Send + Sync + 'static {
    async fn handle(&self, ctx: RequestContext, next: Next<'_>) -> Result<Response, EdgeError>;
}

pub struct Next<'a> {
    middlewares: &'a [BoxMiddleware],
    handler: &'a dyn DynHandler,
}

impl<'a> Next<'a> {
    pub fn new(middlewares: &'a [BoxMiddleware], handler: &'a dyn DynHandler) -> Self {
        Self {
            middlewares,
            handler,
        }
    }

    pub async fn run(self, ctx: RequestContext) -> Result<Response, EdgeError> {
        match self.middlewares.split_first() {
            Some((head, tail)) => head.handle(ctx, Next::new(tail, self.handler)).await,
            None => self.handler.call(ctx).await,
        }
    }
}

/// Logs method, path, status and latency for each request. `web_time` keeps the clock usable
/// on wasm, where `std::time::Instant` panics.
pub struct RequestLogger;

#[async_trait(?Send)]
impl Middleware for RequestLogger {
    async fn handle(&self, ctx: RequestContext, next: Next<'_>) -> Result<Response, EdgeError> {
        let method = ctx.request().method().clone();
        let path = ctx.request().uri().path().to_string();
        let start = Instant::now();

        let result = next.run(ctx).await;
        let elapsed = start.elapsed().as_secs_f64() * 1000.0;
        match &result {
            Ok(response) => tracing::info!(
                "request method={} path={} status={} elapsed_ms={:.2}",
                method,
                path,
                response.status().as_u16(),
                elapsed
            ),
            Err(err) => tracing::error!(
                "request method={} path={} status={} error={} elapsed_ms={:.2}",
                method,
                path,
                err.status().as_u16(),
                err.message(),
                elapsed
            ),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::Body;
    use crate::handler::IntoHandler;
    use crate::http::{request_builder, HeaderValue, Method, StatusCode};
    use crate::response::response_with_body;
    use futures::executor::block_on;
    use std::sync::Mutex;

    struct Tag {
        seen: Arc<Mutex<Vec<&'static str>>>,
        name: &'static str,
    }

    #[async_trait(?Send)]
    impl Middleware for Tag {
        async fn handle(&self, ctx: RequestContext, next: Next<'_>) -> Result<Response, EdgeError> {
            self.seen.lock().unwrap().push(self.name);
            let mut response = next.run(ctx).await?;
            response
                .headers_mut()
                .append("x-tag", HeaderValue::from_static(self.name));
            Ok(response)
        }
    }

    struct Deny;

    #[async_trait(?Send)]
    impl Middleware for Deny {
        async fn handle(
            &self,
            _ctx: RequestContext,
            _next: Next<'_>,
        ) -> Result<Response, EdgeError> {
            Ok(response_with_body(StatusCode::FORBIDDEN, Body::empty()))
        }
    }

    fn context(path: &str) -> RequestContext {
        let request = request_builder()
            .method(Method::GET)
            .uri(path)
            .body(Body::empty())
            .expect("request");
        RequestContext::new(request)
    }

    async fn ok(_ctx: RequestContext) -> Result<Response, EdgeError> {
        Ok(response_with_body(StatusCode::OK, Body::empty()))
    }

    #[test]
    fn chain_runs_outermost_first_and_unwinds_in_reverse() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let middlewares: Vec<BoxMiddleware> = vec![
            Arc::new(Tag {
                seen: Arc::clone(&seen),
                name: "outer",
            }),
            Arc::new(Tag {
                seen: Arc::clone(&seen),
                name: "inner",
            }),
        ];
        let handler = ok.into_handler();

        let response = block_on(Next::new(&middlewares, handler.as_ref()).run(context("/")))
            .expect("response");

        assert_eq!(*seen.lock().unwrap(), vec!["outer", "inner"]);
        let tags: Vec<_> = response.headers().get_all("x-tag").iter().collect();
        assert_eq!(tags, vec!["inner", "outer"]);
    }

    #[test]
    fn middleware_can_answer_without_calling_the_handler() {
        let handler = (|_ctx: RequestContext| async move {
            Err::<Response, EdgeError>(EdgeError::internal(anyhow::anyhow!("unreachable")))
        })
        .into_handler();
        let middlewares: Vec<BoxMiddleware> = vec![Arc::new(Deny)];

        let response = block_on(Next::new(&middlewares, handler.as_ref()).run(context("/")))
            .expect("response");
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn request_logger_passes_responses_through() {
        let handler = ok.into_handler();
        let response = block_on(
            RequestLogger.handle(context("/api/location"), Next::new(&[], handler.as_ref())),
        )
        .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn request_logger_propagates_errors() {
        let handler = (|_ctx: RequestContext| async move {
            Err::<Response, EdgeError>(EdgeError::bad_request("boom"))
        })
        .into_handler();
        let err = block_on(RequestLogger.handle(context("/"), Next::new(&[], handler.as_ref())))
            .expect_err("error");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}

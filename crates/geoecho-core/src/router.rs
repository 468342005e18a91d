use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use matchit::Router as PathRouter;

use crate::context::RequestContext;
use crate::error::EdgeError;
use crate::handler::{BoxHandler, IntoHandler};
use crate::http::{Method, Request, Response};
use crate::middleware::{BoxMiddleware, Middleware, Next};
use crate::response::IntoResponse;

#[derive(Default)]
pub struct RouterBuilder {
    routes: HashMap<Method, PathRouter<BoxHandler>>,
    fallbacks: HashMap<Method, BoxHandler>,
    middlewares: Vec<BoxMiddleware>,
}

impl RouterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route<H>(mut self, path: &str, method: Method, handler: H) -> Self
    where
        H: IntoHandler,
    {
        self.routes
            .entry(method.clone())
            .or_default()
            .insert(path, handler.into_handler())
            .unwrap_or_else(|err| panic!("duplicate route definition for {}: {}", path, err));
        self
    }

    pub fn get<H>(self, path: &str, handler: H) -> Self
    where
        H: IntoHandler,
    {
        self.route(path, Method::GET, handler)
    }

    /// Handle every `method` request whose path matches no registered route. Paths that match a
    /// route under another method still answer 405.
    pub fn fallback<H>(mut self, method: Method, handler: H) -> Self
    where
        H: IntoHandler,
    {
        let previous = self.fallbacks.insert(method.clone(), handler.into_handler());
        assert!(
            previous.is_none(),
            "duplicate fallback definition for {}",
            method
        );
        self
    }

    pub fn middleware<M>(mut self, middleware: M) -> Self
    where
        M: Middleware,
    {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    pub fn build(self) -> RouterService {
        RouterService {
            inner: Arc::new(RouterInner {
                routes: self.routes,
                fallbacks: self.fallbacks,
                middlewares: self.middlewares,
            }),
        }
    }
}

#[derive(Clone)]
pub struct RouterService {
    inner: Arc<RouterInner>,
}

impl RouterService {
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    /// Dispatch `request` and render any routing or handler error as its JSON response.
    pub async fn oneshot(&self, request: Request) -> Response {
        match self.inner.dispatch(request).await {
            Ok(response) => response,
            Err(err) => err.into_response(),
        }
    }
}

struct RouterInner {
    routes: HashMap<Method, PathRouter<BoxHandler>>,
    fallbacks: HashMap<Method, BoxHandler>,
    middlewares: Vec<BoxMiddleware>,
}

enum RouteMatch<'a> {
    Found(&'a BoxHandler),
    MethodNotAllowed(Vec<Method>),
    NotFound,
}

impl RouterInner {
    async fn dispatch(&self, request: Request) -> Result<Response, EdgeError> {
        let method = request.method().clone();
        let path = request.uri().path().to_string();

        match self.find_route(&method, &path) {
            RouteMatch::Found(handler) => {
                let ctx = RequestContext::new(request);
                Next::new(&self.middlewares, handler.as_ref()).run(ctx).await
            }
            RouteMatch::MethodNotAllowed(allowed) => {
                Err(EdgeError::method_not_allowed(&method, &allowed))
            }
            RouteMatch::NotFound => Err(EdgeError::not_found(path)),
        }
    }

    fn find_route(&self, method: &Method, path: &str) -> RouteMatch<'_> {
        if let Some(router) = self.routes.get(method) {
            if let Ok(matched) = router.at(path) {
                return RouteMatch::Found(matched.value);
            }
        }

        let allowed: HashSet<Method> = self
            .routes
            .iter()
            .filter(|(_, router)| router.at(path).is_ok())
            .map(|(candidate, _)| candidate.clone())
            .collect();

        if !allowed.is_empty() {
            return RouteMatch::MethodNotAllowed(allowed.into_iter().collect());
        }

        match self.fallbacks.get(method) {
            Some(handler) => RouteMatch::Found(handler),
            None => RouteMatch::NotFound,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::Body;
    use crate::http::header::ALLOW;
    use crate::http::{request_builder, StatusCode};
    use futures::executor::block_on;

    fn request(method: Method, path: &str) -> Request {
        request_builder()
            .method(method)
            .uri(path)
            .body(Body::empty())
            .expect("request")
    }

    async fn fixed(_ctx: RequestContext) -> Result<&'static str, EdgeError> {
        Ok("fixed")
    }

    async fn fallback(ctx: RequestContext) -> Result<String, EdgeError> {
        Ok(format!("fallback {}", ctx.request().uri().path()))
    }

    async fn failing(_ctx: RequestContext) -> Result<&'static str, EdgeError> {
        Err(EdgeError::bad_request("nope"))
    }

    #[test]
    fn exact_route_wins_over_fallback() {
        let service = RouterService::builder()
            .get("/api/location", fixed)
            .fallback(Method::GET, fallback)
            .build();

        let response = block_on(service.oneshot(request(Method::GET, "/api/location")));
        assert_eq!(response.body().as_bytes(), b"fixed");
    }

    #[test]
    fn fallback_handles_unmatched_paths_for_its_method() {
        let service = RouterService::builder()
            .get("/api/location", fixed)
            .fallback(Method::GET, fallback)
            .build();

        for path in ["/", "/index.html", "/api/location/extra", "/_next/app.js"] {
            let response = block_on(service.oneshot(request(Method::GET, path)));
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(
                response.body().as_bytes(),
                format!("fallback {}", path).as_bytes()
            );
        }
    }

    #[test]
    fn fallback_does_not_cover_other_methods() {
        let service = RouterService::builder()
            .get("/api/location", fixed)
            .fallback(Method::GET, fallback)
            .build();

        let response = block_on(service.oneshot(request(Method::POST, "/upload")));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn returns_method_not_allowed_even_with_fallback() {
        let service = RouterService::builder()
            .get("/api/location", fixed)
            .fallback(Method::POST, fallback)
            .build();

        let response = block_on(service.oneshot(request(Method::POST, "/api/location")));
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[ALLOW], "GET");
    }

    #[test]
    fn same_path_under_two_methods() {
        let service = RouterService::builder()
            .get("/api/location", fixed)
            .route("/api/location", Method::HEAD, fixed)
            .build();

        for method in [Method::GET, Method::HEAD] {
            let response = block_on(service.oneshot(request(method, "/api/location")));
            assert_eq!(response.status(), StatusCode::OK);
        }
    }

    #[test]
    fn handler_errors_are_rendered() {
        let service = RouterService::builder().get("/bad", failing).build();
        let response = block_on(service.oneshot(request(Method::GET, "/bad")));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn returns_not_found_without_fallback() {
        let service = RouterService::builder().build();
        let response = block_on(service.oneshot(request(Method::GET, "/missing")));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    #[should_panic(expected = "duplicate fallback definition")]
    fn duplicate_fallback_panics() {
        let _ = RouterService::builder()
            .fallback(Method::GET, fallback)
            .fallback(Method::GET, fallback);
    }
}

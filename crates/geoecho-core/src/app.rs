use crate::manifest::Manifest;
use crate::router::RouterService;

/// A named router, produced once per process (or per Worker isolate) by [`Hooks::build_app`].
pub struct App {
    router: RouterService,
    name: String,
}

impl App {
    pub fn new<S>(router: RouterService, name: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            router,
            name: name.into(),
        }
    }

    pub fn router(&self) -> &RouterService {
        &self.router
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name<S>(&mut self, name: S)
    where
        S: Into<String>,
    {
        self.name = name.into();
    }

    pub fn into_router(self) -> RouterService {
        self.router
    }
}

/// Implemented by applications so every adapter can build them the same way.
pub trait Hooks {
    /// Build the router from the loaded manifest.
    fn routes(manifest: &Manifest) -> RouterService;

    /// Adjust the freshly built app. No-op by default.
    fn configure(_app: &mut App, _manifest: &Manifest) {}

    fn build_app(manifest: &Manifest) -> App
    where
        Self: Sized,
    {
        let mut app = App::new(Self::routes(manifest), manifest.app_name());
        Self::configure(&mut app, manifest);
        app
    }
}

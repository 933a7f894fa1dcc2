use anyhow::Result;
use winit::dpi::LogicalSize;

use r404_engine::controller::{ControllerConfig, RenderLoopController};
use r404_engine::core::HostCtx;
use r404_engine::logging::{init_logging, LoggingConfig};
use r404_engine::module::ModuleLoader;
use r404_engine::surface::SurfaceSpec;
use r404_engine::window::{Runtime, RuntimeConfig};

use crate::page::ErrorPage;
use crate::props::{ErrorPageProps, PageContext};

// ── Application ───────────────────────────────────────────────────────────

/// Native error-page application builder.
///
/// Configure the window, the page props and the surface, then start the event
/// loop with [`run`](Application::run).
///
/// ```rust,ignore
/// Application::new()
///     .title("r404")
///     .props(ErrorPageProps::not_found())
///     .run(|host: &HostCtx| drift::loader(host));
/// ```
pub struct Application {
    title:      String,
    /// Window size in logical pixels; `None` sizes the window to the surface.
    size:       Option<(f64, f64)>,
    context:    PageContext,
    surface:    SurfaceSpec,
    controller: ControllerConfig,
    logging:    Option<LoggingConfig>,
}

impl Application {
    pub fn new() -> Self {
        Self {
            title:      "r404".to_string(),
            size:       None,
            context:    PageContext::new("/", ErrorPageProps::not_found()),
            surface:    SurfaceSpec::default(),
            controller: ControllerConfig::default(),
            logging:    None,
        }
    }

    /// Set the window title.
    pub fn title(mut self, t: impl Into<String>) -> Self {
        self.title = t.into();
        self
    }

    /// Set the initial window size in logical pixels.
    pub fn size(mut self, width: f64, height: f64) -> Self {
        self.size = Some((width, height));
        self
    }

    /// Set the page props, keeping the current URL.
    pub fn props(mut self, props: ErrorPageProps) -> Self {
        self.context.props = props;
        self
    }

    /// Replace the whole page context (URL, props, head metadata).
    pub fn context(mut self, context: PageContext) -> Self {
        self.context = context;
        self
    }

    /// Set the interactive surface description.
    pub fn surface(mut self, spec: SurfaceSpec) -> Self {
        self.surface = spec;
        self
    }

    pub fn controller_config(mut self, config: ControllerConfig) -> Self {
        self.controller = config;
        self
    }

    /// Initialize logging when the application starts.
    pub fn logging(mut self, config: LoggingConfig) -> Self {
        self.logging = Some(config);
        self
    }

    // ── Entry point ───────────────────────────────────────────────────────

    /// Start the event loop and show the page.
    ///
    /// `build` is called once after the window opens, and only for a 404; it
    /// returns the module loader the page hands to its render-loop controller.
    ///
    /// This never returns.
    pub fn run<L, F>(self, build: F) -> !
    where
        L: ModuleLoader,
        F: FnOnce(&HostCtx) -> Result<L>,
    {
        if let Some(config) = self.logging.clone() {
            init_logging(config);
        }

        let (width, height) = self
            .size
            .unwrap_or((self.surface.width as f64, self.surface.height as f64));
        let config = RuntimeConfig {
            title:        self.title,
            initial_size: LogicalSize::new(width, height),
            ..RuntimeConfig::default()
        };

        let context = self.context;
        let surface = self.surface;
        let controller = self.controller;

        let result = Runtime::run(config, move |host: &HostCtx| {
            let page = ErrorPage::new(context, &surface, || {
                let loader = build(host)?;
                Ok(RenderLoopController::new(
                    loader,
                    host.surface(&surface),
                    host.scheduler(),
                    host.clock(),
                    controller,
                ))
            });
            log::debug!("page document:\n{}", page.document());
            Ok(page)
        });

        Self::finish(result)
    }

    fn finish(result: Result<()>) -> ! {
        if let Err(e) = result {
            eprintln!("r404 runtime error: {e:#}");
            std::process::exit(1);
        }
        std::process::exit(0);
    }
}

impl Default for Application {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_a_not_found_page_with_the_standard_surface() {
        let app = Application::new();
        assert!(app.context.props.is_404);
        assert_eq!(app.surface, SurfaceSpec::default());
        assert!(app.size.is_none());
        assert!(app.controller.dt_max.is_none());
    }

    #[test]
    fn props_keep_the_current_url() {
        let app = Application::new()
            .context(PageContext::new("/missing", ErrorPageProps::not_found()))
            .props(ErrorPageProps::server_error());
        assert_eq!(app.context.url, "/missing");
        assert!(!app.context.props.is_404);
    }

    #[test]
    fn controller_config_reaches_the_builder() {
        let dt_max = Some(std::time::Duration::from_millis(100));
        let app = Application::new().controller_config(ControllerConfig { dt_max });
        assert_eq!(app.controller.dt_max, dt_max);
    }
}

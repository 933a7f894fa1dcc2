use anyhow::Result;

use r404_engine::controller::RenderLoopController;
use r404_engine::core::View;
use r404_engine::input::PointerButtonEvent;
use r404_engine::module::ModuleLoader;
use r404_engine::surface::SurfaceSpec;

use crate::props::PageContext;
use crate::view::{render_document, PageView};

/// The error page.
///
/// Shows a static message for every error. For a 404 it also owns the
/// render-loop controller of the interactive surface and forwards mount, click
/// and unmount to it. A failure to set the surface up leaves the page with its
/// static content only.
pub struct ErrorPage<L: ModuleLoader> {
    context: PageContext,
    view: PageView,
    controller: Option<RenderLoopController<L>>,
}

impl<L: ModuleLoader> ErrorPage<L> {
    /// `engage` builds the controller. It runs only when the page is a 404.
    pub fn new<F>(context: PageContext, surface: &SurfaceSpec, engage: F) -> Self
    where
        F: FnOnce() -> Result<RenderLoopController<L>>,
    {
        let view = PageView::for_props(&context.props, surface);

        let controller = if context.props.is_404 {
            match engage() {
                Ok(ctl) => Some(ctl),
                Err(e) => {
                    log::warn!("interactive surface unavailable: {e:#}");
                    None
                }
            }
        } else {
            None
        };

        Self {
            context,
            view,
            controller,
        }
    }

    pub fn context(&self) -> &PageContext {
        &self.context
    }

    pub fn view(&self) -> &PageView {
        &self.view
    }

    pub fn controller(&self) -> Option<&RenderLoopController<L>> {
        self.controller.as_ref()
    }

    /// Full HTML document for this page.
    pub fn document(&self) -> String {
        render_document(&self.context, &self.view)
    }
}

impl<L: ModuleLoader> View for ErrorPage<L> {
    fn on_mount(&mut self) {
        log::info!(
            "{} for {}: {}",
            self.context.props.status_code(),
            self.context.url,
            self.view.heading
        );
        if let Some(ctl) = self.controller.as_mut() {
            ctl.on_mount();
        }
    }

    fn on_pointer(&mut self, event: PointerButtonEvent) {
        if let Some(ctl) = self.controller.as_mut() {
            let outcome = ctl.on_activate(event);
            log::trace!("pointer {:?} at ({}, {}): {outcome:?}", event.button, event.x, event.y);
        }
    }

    fn on_unmount(&mut self) {
        if let Some(ctl) = self.controller.as_mut() {
            ctl.on_unmount();
        }
    }
}

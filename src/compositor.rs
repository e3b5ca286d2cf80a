// ABOUTME: Surface compositor: launcher, toolbar, and content webviews in one window
// ABOUTME: Keeps the toolbar stacked above the content band and both sized to the window

use crate::app::ShellEvent;
use crate::{ipc, pages, router};
use anyhow::Result;
use std::path::PathBuf;
use tao::event_loop::EventLoopProxy;
use tao::window::Window;
use tracing::debug;
use wry::dpi::{LogicalPosition, LogicalSize};
use wry::{Rect, WebContext, WebView, WebViewBuilder};

/// Visual toolbar band height; the content surface always starts here.
pub const BAR_HEIGHT: f64 = 56.0;
/// Ceiling for the toolbar surface when a dropdown expands it.
pub const MAX_OVERLAY_HEIGHT: f64 = 460.0;

/// Left padding pushed to the overlay document, clearing the platform's
/// window chrome (traffic lights on macOS).
pub fn toolbar_padding_left() -> f64 {
    if cfg!(target_os = "macos") {
        80.0
    } else {
        8.0
    }
}

/// Browsing-data location shared by every shell surface, so the
/// launcher's and overlay's saved-link storage is one store that
/// survives restarts.
fn web_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("beacon"))
}

pub fn clamp_overlay_height(height: f64) -> f64 {
    if !height.is_finite() {
        return BAR_HEIGHT;
    }
    height.clamp(BAR_HEIGHT, MAX_OVERLAY_HEIGHT)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceBounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl SurfaceBounds {
    fn to_rect(self) -> Rect {
        Rect {
            position: LogicalPosition::new(self.x, self.y).into(),
            size: LogicalSize::new(self.width, self.height).into(),
        }
    }
}

/// Bounds computation for one window size and overlay height. The dynamic
/// overlay height affects only the toolbar's own band; the content surface
/// start stays fixed at `BAR_HEIGHT`, so an expanded dropdown may visually
/// overlap the top of the page.
#[derive(Debug, Clone, Copy)]
pub struct Layout {
    pub width: f64,
    pub height: f64,
    pub overlay_height: f64,
}

impl Layout {
    pub fn toolbar_bounds(&self) -> SurfaceBounds {
        SurfaceBounds {
            x: 0.0,
            y: 0.0,
            width: self.width,
            height: clamp_overlay_height(self.overlay_height),
        }
    }

    pub fn content_bounds(&self) -> SurfaceBounds {
        SurfaceBounds {
            x: 0.0,
            y: BAR_HEIGHT,
            width: self.width,
            height: (self.height - BAR_HEIGHT).max(0.0),
        }
    }
}

fn logical_layout(window: &Window, overlay_height: f64) -> Layout {
    let size = window.inner_size();
    let scale = window.scale_factor();
    Layout {
        width: size.width as f64 / scale,
        height: size.height as f64 / scale,
        overlay_height,
    }
}

/// Owns the three surfaces. `Launcher` state holds only the primary
/// launcher webview; `Browsing` adds the content surface with the toolbar
/// surface stacked above it. Every operation is best-effort: callers log
/// and continue on failure.
pub struct Compositor {
    proxy: EventLoopProxy<ShellEvent>,
    context: WebContext,
    launcher: WebView,
    toolbar: Option<WebView>,
    content: Option<WebView>,
    overlay_height: f64,
}

impl Compositor {
    /// Build the primary launcher surface and leave the overlay surfaces
    /// unattached. Event wiring happens once, here and in the lazy
    /// constructors; callbacks only forward named notifications.
    pub fn new(window: &Window, proxy: EventLoopProxy<ShellEvent>) -> Result<Self> {
        let mut context = WebContext::new(web_data_dir());
        let ipc_proxy = proxy.clone();
        let load_proxy = proxy.clone();
        let launcher = WebViewBuilder::with_web_context(&mut context)
            .with_custom_protocol(pages::PROTOCOL.to_string(), |_id, request| {
                pages::respond(request)
            })
            .with_url(pages::launcher_url())
            .with_devtools(true)
            .with_ipc_handler(move |message| {
                if let Some(msg) = ipc::parse(message.body()) {
                    let _ = ipc_proxy.send_event(ShellEvent::Ipc(msg));
                }
            })
            .with_on_page_load_handler(move |event, url| {
                if matches!(event, wry::PageLoadEvent::Finished) {
                    let _ = load_proxy.send_event(ShellEvent::LauncherLoaded { url });
                }
            })
            // Trusted local surface: it only ever hosts shell documents.
            .with_navigation_handler(|url| pages::is_app_url(&url))
            .with_new_window_req_handler(|url| router::route_new_window(&url))
            .build(window)?;

        Ok(Compositor {
            proxy,
            context,
            launcher,
            toolbar: None,
            content: None,
            overlay_height: BAR_HEIGHT,
        })
    }

    pub fn launcher(&self) -> &WebView {
        &self.launcher
    }

    /// Current URL of the content surface, when browsing.
    pub fn content_url(&self) -> Option<String> {
        self.content.as_ref().and_then(|wv| wv.url().ok())
    }

    /// Idempotent: re-shows a live toolbar surface, otherwise constructs
    /// one pointed at the overlay document and positions it.
    pub fn show_toolbar(&mut self, window: &Window) -> Result<()> {
        if let Some(toolbar) = &self.toolbar {
            toolbar.set_visible(true)?;
        } else {
            let ipc_proxy = self.proxy.clone();
            let bounds = logical_layout(window, self.overlay_height)
                .toolbar_bounds()
                .to_rect();
            let toolbar = WebViewBuilder::with_web_context(&mut self.context)
                .with_custom_protocol(pages::PROTOCOL.to_string(), |_id, request| {
                    pages::respond(request)
                })
                .with_url(pages::overlay_url())
                .with_transparent(true)
                .with_bounds(bounds)
                .with_ipc_handler(move |message| {
                    if let Some(msg) = ipc::parse(message.body()) {
                        let _ = ipc_proxy.send_event(ShellEvent::Ipc(msg));
                    }
                })
                .with_navigation_handler(|url| pages::is_app_url(&url))
                .with_new_window_req_handler(|url| router::route_new_window(&url))
                .build_as_child(window)?;
            self.toolbar = Some(toolbar);
        }
        self.reposition(window)
    }

    /// Idempotent construction of the content surface, then load `url`
    /// into it. No-op for URLs the navigation router rejects.
    pub fn show_content(&mut self, window: &Window, url: &str) -> Result<()> {
        if !router::is_allowed(url) {
            debug!(url, "navigation denied");
            return Ok(());
        }
        if self.content.is_none() {
            // Child surfaces stack in creation order. Drop the toolbar
            // first so its rebuild in show_toolbar lands above the new
            // content surface.
            self.toolbar = None;
            let title_proxy = self.proxy.clone();
            let bounds = logical_layout(window, self.overlay_height)
                .content_bounds()
                .to_rect();
            let content = WebViewBuilder::with_web_context(&mut self.context)
                .with_devtools(true)
                .with_bounds(bounds)
                .with_navigation_handler(|url| router::is_allowed(&url))
                .with_new_window_req_handler(|url| router::route_new_window(&url))
                .with_document_title_changed_handler(move |title| {
                    let _ = title_proxy.send_event(ShellEvent::PageTitleChanged { title });
                })
                .build_as_child(window)?;
            self.content = Some(content);
        }
        self.show_toolbar(window)?;
        if let Some(content) = &self.content {
            content.load_url(url)?;
        }
        Ok(())
    }

    /// Recompute both surfaces' bounds and push the layout configuration
    /// to the overlay document. Called on every resize/move and after any
    /// overlay height change.
    pub fn reposition(&mut self, window: &Window) -> Result<()> {
        let layout = logical_layout(window, self.overlay_height);
        if let Some(toolbar) = &self.toolbar {
            toolbar.set_bounds(layout.toolbar_bounds().to_rect())?;
            let config = format!(
                "window.__overlay && window.__overlay.config({{paddingLeft:{},height:{}}})",
                toolbar_padding_left(),
                BAR_HEIGHT
            );
            toolbar.evaluate_script(&config)?;
        }
        if let Some(content) = &self.content {
            content.set_bounds(layout.content_bounds().to_rect())?;
        }
        Ok(())
    }

    /// The toolbar document reported its UI needs (dropdown open/close).
    pub fn set_overlay_height(&mut self, window: &Window, height: f64) -> Result<()> {
        self.overlay_height = clamp_overlay_height(height);
        self.reposition(window)
    }

    /// Destroy the content surface, hide the toolbar for reuse, reset the
    /// overlay band, and bring the primary surface back to the launcher.
    pub fn go_home(&mut self) -> Result<()> {
        self.content = None;
        if let Some(toolbar) = &self.toolbar {
            toolbar.set_visible(false)?;
        }
        self.overlay_height = BAR_HEIGHT;
        self.launcher.load_url(&pages::launcher_url())?;
        Ok(())
    }

    /// Navigate the primary surface to the settings document, tearing
    /// down any browsing surfaces first.
    pub fn open_settings(&mut self) -> Result<()> {
        self.content = None;
        if let Some(toolbar) = &self.toolbar {
            toolbar.set_visible(false)?;
        }
        self.overlay_height = BAR_HEIGHT;
        self.launcher.load_url(&pages::settings_url())?;
        Ok(())
    }

    /// Reload whichever surface the user is looking at.
    pub fn reload_active_surface(&self) {
        let target = self.content.as_ref().unwrap_or(&self.launcher);
        if let Err(e) = target.evaluate_script("location.reload()") {
            debug!("reload failed: {e}");
        }
    }

    /// Toggle devtools for whichever surface the user is looking at.
    pub fn toggle_devtools(&self) {
        let target = self.content.as_ref().unwrap_or(&self.launcher);
        if target.is_devtools_open() {
            target.close_devtools();
        } else {
            target.open_devtools();
        }
    }

    /// The owning window is closing; release the content surface. The
    /// process exits right after, there is no multi-window model.
    pub fn on_window_closed(&mut self) {
        self.content = None;
        self.toolbar = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_web_data_dir_is_app_scoped() {
        let dir = web_data_dir().unwrap();
        assert!(dir.ends_with("beacon"), "{}", dir.display());
    }

    #[test]
    fn test_overlay_height_clamped_to_band() {
        assert_eq!(clamp_overlay_height(10.0), BAR_HEIGHT);
        assert_eq!(clamp_overlay_height(56.0), 56.0);
        assert_eq!(clamp_overlay_height(320.0), 320.0);
        assert_eq!(clamp_overlay_height(9000.0), MAX_OVERLAY_HEIGHT);
        assert_eq!(clamp_overlay_height(f64::NAN), BAR_HEIGHT);
    }

    #[test]
    fn test_toolbar_spans_full_width_at_top() {
        let layout = Layout {
            width: 1280.0,
            height: 800.0,
            overlay_height: 320.0,
        };
        let bounds = layout.toolbar_bounds();
        assert_eq!(bounds, SurfaceBounds { x: 0.0, y: 0.0, width: 1280.0, height: 320.0 });
    }

    #[test]
    fn test_content_starts_below_fixed_band() {
        // The dynamic overlay height must not move the content start.
        let layout = Layout {
            width: 1024.0,
            height: 768.0,
            overlay_height: 460.0,
        };
        let bounds = layout.content_bounds();
        assert_eq!(bounds.y, BAR_HEIGHT);
        assert_eq!(bounds.height, 768.0 - BAR_HEIGHT);
        assert_eq!(bounds.width, 1024.0);
    }

    #[test]
    fn test_content_height_floors_at_zero() {
        let layout = Layout {
            width: 640.0,
            height: 20.0,
            overlay_height: BAR_HEIGHT,
        };
        assert_eq!(layout.content_bounds().height, 0.0);
    }

    #[test]
    fn test_resize_recomputes_content_height() {
        for h in [100.0, 600.0, 1200.0] {
            let layout = Layout {
                width: 800.0,
                height: h,
                overlay_height: BAR_HEIGHT,
            };
            assert_eq!(layout.content_bounds().height, (h - BAR_HEIGHT).max(0.0));
        }
    }
}

//! Overlay surfaces backed by transparent webview windows.
//!
//! Geometry, visibility, opacity and cursor are cached on the Rust side and
//! never read back from the window: window getters block on the main thread,
//! and the sweep calls into surfaces from a worker while holding the state
//! lock.

use overlayxpert_core::{
    Bounds, CursorHint, Error, OverlayId, RenderableSurface, SurfaceFactory, SurfaceStyle,
};
use serde::Serialize;
use tauri::{
    AppHandle, Emitter, LogicalPosition, LogicalSize, WebviewUrl, WebviewWindow,
    WebviewWindowBuilder, window::Color,
};
use tracing::debug;

use crate::platform::configure_overlay;

pub const OVERLAY_PAGE: &str = "overlay.html";
pub const REDRAW_EVENT: &str = "overlay://redraw";
pub const CURSOR_EVENT: &str = "overlay://cursor";
pub const OPACITY_EVENT: &str = "overlay://opacity";

fn surface_error(e: tauri::Error) -> Error {
    Error::Surface(e.to_string())
}

/// CSS cursor name for a hint.
pub fn css_cursor(cursor: CursorHint) -> &'static str {
    match cursor {
        CursorHint::Arrow => "default",
        CursorHint::OpenHand => "grab",
        CursorHint::SizeAll => "move",
        CursorHint::SizeHorizontal => "ew-resize",
        CursorHint::SizeVertical => "ns-resize",
        CursorHint::SizeFDiagonal => "nwse-resize",
        CursorHint::SizeBDiagonal => "nesw-resize",
    }
}

pub struct TauriSurfaceFactory {
    app: AppHandle,
}

impl TauriSurfaceFactory {
    pub fn new(app: AppHandle) -> Self {
        Self { app }
    }
}

impl SurfaceFactory for TauriSurfaceFactory {
    type Surface = TauriSurface;

    fn create(
        &mut self,
        id: OverlayId,
        bounds: Bounds,
        style: SurfaceStyle,
    ) -> Result<TauriSurface, Error> {
        let label = id.to_string();

        // Built hidden; the collection decides when it appears.
        let window =
            WebviewWindowBuilder::new(&self.app, &label, WebviewUrl::App(OVERLAY_PAGE.into()))
                .title(&label)
                .inner_size(f64::from(bounds.width), f64::from(bounds.height))
                .position(f64::from(bounds.x), f64::from(bounds.y))
                .decorations(false)
                .transparent(true)
                .background_color(Color(0, 0, 0, 0))
                .always_on_top(true)
                .skip_taskbar(true)
                .shadow(false)
                .focused(false)
                .visible(false)
                .build()
                .map_err(surface_error)?;

        configure_overlay(&window)?;

        let mut surface = TauriSurface {
            window,
            bounds,
            visible: false,
            opacity: style.opacity,
            cursor: CursorHint::Arrow,
        };
        surface.set_input_transparent(style.input_transparent)?;

        debug!(%id, ?bounds, "overlay window created");
        Ok(surface)
    }
}

pub struct TauriSurface {
    window: WebviewWindow,
    bounds: Bounds,
    visible: bool,
    opacity: f64,
    cursor: CursorHint,
}

impl TauriSurface {
    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    pub fn cursor(&self) -> CursorHint {
        self.cursor
    }

    /// Record a size the window system applied on its own. Returns whether it
    /// differs from the cached geometry.
    pub fn observe_size(&mut self, width: i32, height: i32) -> bool {
        let next = Bounds {
            width,
            height,
            ..self.bounds
        }
        .clamped();
        if next == self.bounds {
            return false;
        }
        self.bounds = next;
        true
    }

    fn emit<S: Serialize + Clone>(&self, event: &str, payload: S) -> Result<(), Error> {
        self.window
            .emit_to(self.window.label(), event, payload)
            .map_err(surface_error)
    }
}

impl RenderableSurface for TauriSurface {
    fn set_bounds(&mut self, bounds: Bounds) -> Result<(), Error> {
        self.window
            .set_position(LogicalPosition::new(bounds.x, bounds.y))
            .map_err(surface_error)?;
        self.window
            .set_size(LogicalSize::new(bounds.width, bounds.height))
            .map_err(surface_error)?;
        self.bounds = bounds;
        Ok(())
    }

    fn bounds(&self) -> Bounds {
        self.bounds
    }

    fn set_opacity(&mut self, opacity: f64) -> Result<(), Error> {
        self.opacity = opacity;
        self.emit(OPACITY_EVENT, opacity)
    }

    fn set_input_transparent(&mut self, transparent: bool) -> Result<(), Error> {
        self.window
            .set_ignore_cursor_events(transparent)
            .map_err(surface_error)
    }

    fn set_cursor(&mut self, cursor: CursorHint) -> Result<(), Error> {
        if cursor == self.cursor {
            return Ok(());
        }
        self.cursor = cursor;
        self.emit(CURSOR_EVENT, css_cursor(cursor))
    }

    fn show(&mut self) -> Result<(), Error> {
        self.window.show().map_err(surface_error)?;
        self.visible = true;
        Ok(())
    }

    fn hide(&mut self) -> Result<(), Error> {
        self.window.hide().map_err(surface_error)?;
        self.visible = false;
        Ok(())
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn request_redraw(&mut self) -> Result<(), Error> {
        self.emit(REDRAW_EVENT, ())
    }

    fn destroy(self) -> Result<(), Error> {
        self.window.destroy().map_err(surface_error)
    }
}

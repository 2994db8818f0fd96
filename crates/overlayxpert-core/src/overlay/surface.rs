//! Window-system capability consumed by the engine.
//!
//! A surface is a borderless, topmost window owned by exactly one
//! [`OverlayController`](super::OverlayController). The windowing layer
//! implements these traits and calls back into the collection with pointer
//! events and paint requests.

use serde::{Deserialize, Serialize};

use super::{Bounds, OverlayId};
use crate::Error;

/// Pointer shape shown over a surface while editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CursorHint {
    Arrow,
    OpenHand,
    SizeAll,
    SizeHorizontal,
    SizeVertical,
    /// `\` diagonal: top-left and bottom-right corners.
    SizeFDiagonal,
    /// `/` diagonal: top-right and bottom-left corners.
    SizeBDiagonal,
}

/// Initial presentation of a new surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceStyle {
    pub opacity: f64,
    pub input_transparent: bool,
}

pub trait RenderableSurface {
    fn set_bounds(&mut self, bounds: Bounds) -> Result<(), Error>;

    /// Current on-screen geometry. This is the live state records are
    /// synced from.
    fn bounds(&self) -> Bounds;

    fn set_opacity(&mut self, opacity: f64) -> Result<(), Error>;

    /// Click-through when `true`: pointer input goes to whatever is below.
    fn set_input_transparent(&mut self, transparent: bool) -> Result<(), Error>;

    fn set_cursor(&mut self, cursor: CursorHint) -> Result<(), Error>;

    fn show(&mut self) -> Result<(), Error>;

    fn hide(&mut self) -> Result<(), Error>;

    fn is_visible(&self) -> bool;

    /// Ask the windowing system to invoke the paint callback again.
    fn request_redraw(&mut self) -> Result<(), Error>;

    fn destroy(self) -> Result<(), Error>
    where
        Self: Sized;
}

pub trait SurfaceFactory {
    type Surface: RenderableSurface;

    /// Create a hidden surface at `bounds`.
    fn create(
        &mut self,
        id: OverlayId,
        bounds: Bounds,
        style: SurfaceStyle,
    ) -> Result<Self::Surface, Error>;
}

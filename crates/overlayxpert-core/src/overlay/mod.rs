//! Overlay model, editing controller and the collection that owns them.

pub mod controller;
pub mod editor;
pub mod manager;
pub mod policy;
pub mod record;
pub mod render;
pub mod surface;

pub use controller::*;
pub use editor::*;
pub use manager::{CollectionOptions, OverlayCollection, SweepReport};
pub use policy::*;
pub use record::*;
pub use render::*;
pub use surface::*;

//! Toolkit-independent core of OverlayXpert: the overlay records, the
//! per-process visibility policy, the edit-mode gesture controller, painting
//! and persistence. The windowing layer plugs in through
//! [`overlay::SurfaceFactory`].

pub mod error;
pub mod overlay;
pub mod services;
pub mod settings;
pub mod store;

pub use error::*;
pub use overlay::*;
pub use services::*;
pub use settings::*;
pub use store::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] overlayxpert_core::Error),

    #[error(transparent)]
    Tauri(#[from] tauri::Error),

    #[error("Overlay state lock poisoned")]
    LockPoisoned,

    #[error("Window {0} is not an overlay")]
    NotAnOverlay(String),
}

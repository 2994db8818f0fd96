use std::io;

use thiserror::Error;

use crate::overlay::OverlayId;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Overlay {0} not found")]
    OverlayNotFound(OverlayId),
    #[error("No overlay at row {0}")]
    RowOutOfRange(usize),
    #[error("Invalid color {0:?}")]
    InvalidColor(String),
    #[error("Surface error: {0}")]
    Surface(String),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

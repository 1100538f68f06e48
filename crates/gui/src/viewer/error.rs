//! Viewer error taxonomy. Configuration mistakes surface immediately;
//! anything recoverable mid-interaction is logged and degraded instead.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("unknown color name: {0:?}")]
    UnknownColor(String),

    #[error("color component out of range: {0}")]
    InvalidColorComponent(f64),

    #[error("no selection listener registered with id {0}")]
    UnknownListener(u64),

    #[error("background image not found: {}", .0.display())]
    MissingBackgroundImage(PathBuf),

    #[error("cannot infer image format from path: {}", .0.display())]
    UnsupportedImageFormat(PathBuf),
}

pub type Result<T> = std::result::Result<T, ViewerError>;

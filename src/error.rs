use std::path::PathBuf;

use thiserror::Error;

/// Failures reading or writing the persisted entry text.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no config directory: neither XDG_CONFIG_HOME nor HOME is set")]
    NoConfigDir,

    #[error("store io failed for {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("store is unavailable")]
    Unavailable,
}

/// Failures loading the label font.
#[derive(Debug, Error)]
pub enum FontError {
    #[error("failed to read font {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("font data at {} could not be parsed", path.display())]
    Parse { path: PathBuf },

    #[error("no usable font found")]
    NotFound,
}

/// Fatal errors raised while bringing up the picker window.
#[derive(Debug, Error)]
pub enum PickerError {
    #[error("event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("window creation: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("pixel surface: {0}")]
    Pixels(#[from] pixels::Error),
}

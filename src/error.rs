use std::path::PathBuf;

/// Failures while rendering or persisting a placeholder image.
#[derive(Debug, thiserror::Error)]
pub enum PlaceholderError {
    #[error("invalid color literal: {0}")]
    InvalidColor(String),

    #[error("cannot allocate a {width}x{height} drawing surface")]
    Surface { width: u32, height: u32 },

    #[error("failed to create directory {}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode placeholder as png")]
    Encode(#[from] image::ImageError),

    #[error("failed to write placeholder to {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    #[error("no route matches {0}")]
    NoMatch(String),

    #[error("no route named {0}")]
    UnknownRoute(String),

    #[error("navigation to {0} redirected too many times")]
    RedirectLoop(String),

    #[error("failed to load view {view}")]
    ViewLoad {
        view: String,
        #[source]
        source: anyhow::Error,
    },
}

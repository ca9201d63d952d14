use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SectionError {
    #[error("section `{0}` is already registered")]
    Duplicate(String),

    #[error("section setup failed: {0}")]
    Setup(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("a deck needs at least one pair")]
    NoPairs,
}

#[derive(Debug, Error)]
pub enum PrefsError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed preferences in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[cfg(feature = "gui")]
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("canvas has no area to export")]
    EmptyCanvas,

    #[error("cairo drawing failed: {0}")]
    Cairo(#[from] cairo::Error),

    #[error("failed to create {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode {path}: {source}")]
    Png {
        path: PathBuf,
        #[source]
        source: cairo::IoError,
    },
}

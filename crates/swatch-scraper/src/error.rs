use std::path::PathBuf;

use swatch_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid staging file prefix \"{prefix}\": must not contain path separators or \"..\"")]
    InvalidFilePrefix { prefix: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not start a WebDriver session: {0}")]
    Session(#[from] fantoccini::error::NewSessionError),

    #[error("WebDriver command failed: {0}")]
    WebDriver(#[from] fantoccini::error::CmdError),

    #[error("upload failed: {0}")]
    Upload(#[from] StoreError),
}

impl ScraperError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

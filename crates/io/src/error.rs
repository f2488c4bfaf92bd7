use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("cannot access {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot open workbook {}: {message}", path.display())]
    Workbook { path: PathBuf, message: String },

    #[error("cannot read sheet '{sheet}': {message}")]
    Sheet { sheet: String, message: String },

    #[error("cannot read cell styles from {}: {message}", path.display())]
    Styles { path: PathBuf, message: String },

    #[error("invalid travel log {}: {source}", path.display())]
    TravelLog {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),
}

impl IoError {
    pub(crate) fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::File { path: path.into(), source }
    }

    /// True for failures caused by file contents rather than file access.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Self::Workbook { .. } | Self::Sheet { .. } | Self::Styles { .. } | Self::TravelLog { .. }
        )
    }
}

use std::path::PathBuf;

use thiserror::Error;

use cyclecount_core::DomainError;

pub type InfraResult<T> = Result<T, InfraError>;

/// File, workbook and device failures.
#[derive(Debug, Error)]
pub enum InfraError {
    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read workbook {}: {source}", .path.display())]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("workbook {} has no worksheets", .path.display())]
    EmptyWorkbook { path: PathBuf },

    /// Schema validation failure, raised at load time.
    #[error("workbook {} is missing required column '{column}'", .path.display())]
    MissingColumn { path: PathBuf, column: String },

    #[error("{}: row {row}, column '{column}': {reason}", .path.display())]
    InvalidCell {
        path: PathBuf,
        row: usize,
        column: String,
        reason: String,
    },

    #[error("failed to write workbook {}: {source}", .path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },

    #[error("failed to render chart {}: {reason}", .path.display())]
    Chart { path: PathBuf, reason: String },

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl InfraError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

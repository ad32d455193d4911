use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("{} does not exist", .0.display())]
    MissingDirectory(PathBuf),

    #[error("No {what} file found at {}", .path.display())]
    FileNotFound { what: String, path: PathBuf },

    #[error("Pattern {pattern} matched {} files: {matches:?}", .matches.len())]
    AmbiguousFile {
        pattern: String,
        matches: Vec<PathBuf>,
    },

    #[error("Basin {0} not found in either the primary or the auxiliary catalog")]
    BasinNotFound(String),

    #[error("Some basins are missing static attributes: {}", .0.join(", "))]
    MissingAttributes(Vec<String>),

    #[error("Missing column '{column}' in {}", .path.display())]
    MissingColumn { column: String, path: PathBuf },

    #[error("InvalidData: {}:{line}: {message}", .path.display())]
    InvalidData {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Config: {0}")]
    Config(String),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, LoaderError>;

impl LoaderError {
    pub(crate) fn invalid(path: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        LoaderError::InvalidData {
            path: path.into(),
            line,
            message: message.into(),
        }
    }

    pub(crate) fn missing_column(column: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        LoaderError::MissingColumn {
            column: column.into(),
            path: path.into(),
        }
    }
}

#[cfg(feature = "python")]
mod python {
    use pyo3::exceptions::{PyFileNotFoundError, PyOSError, PyRuntimeError, PyValueError};
    use pyo3::PyErr;

    use super::LoaderError;

    impl From<LoaderError> for PyErr {
        fn from(err: LoaderError) -> PyErr {
            let msg = err.to_string();
            match err {
                LoaderError::MissingDirectory(_) => PyOSError::new_err(msg),
                LoaderError::FileNotFound { .. } => PyFileNotFoundError::new_err(msg),
                LoaderError::MissingAttributes(_) | LoaderError::Config(_) | LoaderError::Yaml(_) => {
                    PyValueError::new_err(msg)
                }
                _ => PyRuntimeError::new_err(msg),
            }
        }
    }
}

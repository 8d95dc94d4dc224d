use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub type StepResult<T> = Result<T, StepError>;

/// Errors raised while configuring, persisting or executing a step.
#[derive(Debug, Error)]
pub enum StepError {
    #[error("io failure during {operation} at {}", .path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("copy from {} to {} failed", .from.display(), .to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: fs_extra::error::Error,
    },
    #[error("json failure during {operation}")]
    Json {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },
    /// `execute` was called before the source directory arrived on the port.
    #[error("no data has been set on port {index}")]
    MissingPortData { index: usize },
    #[error("step has no port {index}")]
    UnknownPort { index: usize },
    /// The dialog window could not be shown.
    #[error("configuration dialog failed: {message}")]
    Gui { message: String },
}

impl StepError {
    pub(crate) fn io(operation: &'static str, path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub(crate) fn copy(
        from: impl AsRef<Path>,
        to: impl AsRef<Path>,
        source: fs_extra::error::Error,
    ) -> Self {
        Self::Copy {
            from: from.as_ref().to_path_buf(),
            to: to.as_ref().to_path_buf(),
            source,
        }
    }

    pub(crate) fn json(operation: &'static str, source: serde_json::Error) -> Self {
        Self::Json { operation, source }
    }
}

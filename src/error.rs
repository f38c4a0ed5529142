use std::io;
use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

/// Everything that can go wrong between an input table and a prediction.
///
/// None of these are recovered from: they bubble up to the caller, and the
/// HTTP layer turns them into a server error.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("artifact not found at {path:?}")]
    ArtifactMissing { path: PathBuf },
    #[error("i/o failure on {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not serialize object to {path:?}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("could not deserialize object from {path:?}")]
    Deserialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("column {column:?} is missing from the input table")]
    MissingColumn { column: String },
    #[error("column {column:?} has unexpected type {dtype}")]
    ColumnType { column: String, dtype: String },
    #[error("column {column:?} has no values to fit on")]
    EmptyColumn { column: String },
    #[error("input table has no rows")]
    EmptyInput,
    #[error("found unknown category {value:?} in column {column:?}")]
    UnknownCategory { column: String, value: String },
    #[error("model expects {expected} features but the preprocessor produces {found}")]
    ShapeMismatch { expected: usize, found: usize },
    #[error("model failure: {0}")]
    Model(String),
    #[error("unsupported table format {path:?}")]
    UnsupportedFormat { path: PathBuf },
    #[error(transparent)]
    Polars(#[from] PolarsError),
}

pub type PipelineResult<T> = Result<T, PipelineError>;

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            PipelineError::ArtifactMissing { path }
        } else {
            PipelineError::Io { path, source }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_missing_artifact() {
        let err = PipelineError::io(
            "artifacts/model.json",
            io::Error::new(io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, PipelineError::ArtifactMissing { .. }));

        let err = PipelineError::io(
            "artifacts/model.json",
            io::Error::new(io::ErrorKind::PermissionDenied, "nope"),
        );
        assert!(matches!(err, PipelineError::Io { .. }));
    }

    #[test]
    fn unknown_category_message_names_column_and_value() {
        let err = PipelineError::UnknownCategory {
            column: "gender".to_string(),
            value: "other".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "found unknown category \"other\" in column \"gender\""
        );
    }
}

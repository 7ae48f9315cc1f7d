use std::path::PathBuf;
use thiserror::Error;

/// The main error type for detprep operations.
#[derive(Debug, Error)]
pub enum DetprepError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("IO error at {path}: {source}")]
    PathIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse label map JSON from {path}: {source}")]
    LabelMapParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse COCO JSON from {path}: {source}")]
    CocoJsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write JSON to {path}: {source}")]
    JsonWrite {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse box CSV from {path}: {source}")]
    BoxCsvParse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Failed to write box CSV to {path}: {source}")]
    BoxCsvWrite {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Failed to parse dataset YAML from {path}: {source}")]
    DataYamlParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to write dataset YAML to {path}: {source}")]
    DataYamlWrite {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to read image dimensions from {path}: {source}")]
    ImageDimensionRead {
        path: PathBuf,
        #[source]
        source: imagesize::ImageError,
    },

    #[error("Invalid dataset layout at {path}: {message}")]
    LayoutInvalid { path: PathBuf, message: String },

    #[error("Run finished with {failures} failed item(s)")]
    RunFailed { failures: usize },
}

impl DetprepError {
    /// Wraps an IO error with the path it happened on.
    pub(crate) fn io_at(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| DetprepError::PathIo { path, source }
    }
}

use std::path::PathBuf;

/// Errors that can occur while extracting or loading signatures.
#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    #[error("image file does not exist: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("insufficient features: found {found} blobs, at least 3 are required")]
    InsufficientFeatures { found: usize },

    #[error("reference dots {start} and {end} share the same position")]
    DegenerateReference { start: usize, end: usize },

    #[error("failed to write resized image {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("worker task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

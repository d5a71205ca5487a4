//! Concurrent extraction over many images.
//!
//! Every image runs through its own pipeline on a blocking worker; nothing is
//! shared between runs except the read-only configuration.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::Serialize;

use crate::compare::compare;
use crate::error::SignatureError;
use crate::pipeline::{PipelineConfig, extract_from_path, is_image_file};
use crate::signature::Signature;

/// Outcome of one image in a batch.
#[derive(Debug)]
pub struct Extracted {
    pub path: PathBuf,
    pub result: Result<Signature, SignatureError>,
}

/// Score of one candidate against a reference signature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranked {
    pub path: PathBuf,
    pub score: f64,
}

/// Lists the image files directly inside `dir`, sorted by path.
pub async fn image_paths(dir: &Path) -> Result<Vec<PathBuf>, SignatureError> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut paths = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.is_file() && is_image_file(&path) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Extracts every image in `paths` with at most `config.worker_count()` runs in
/// flight. Results come back in input order.
pub async fn extract_all(paths: Vec<PathBuf>, config: Arc<PipelineConfig>) -> Vec<Extracted> {
    let workers = config.worker_count();
    tracing::debug!(images = paths.len(), workers, "starting batch");

    stream::iter(paths)
        .map(|path| {
            let config = Arc::clone(&config);
            async move {
                let task_path = path.clone();
                let result =
                    tokio::task::spawn_blocking(move || extract_from_path(&task_path, &config))
                        .await
                        .map_err(SignatureError::from)
                        .and_then(|r| r);
                Extracted { path, result }
            }
        })
        .buffered(workers)
        .collect()
        .await
}

/// Scores every candidate image against `reference`, best first.
///
/// Images that fail to produce a signature are logged and left out.
pub async fn rank(
    reference: &Signature,
    paths: Vec<PathBuf>,
    config: Arc<PipelineConfig>,
) -> Vec<Ranked> {
    let tolerance = config.tolerance;
    let mut ranked: Vec<Ranked> = extract_all(paths, config)
        .await
        .into_iter()
        .filter_map(|Extracted { path, result }| match result {
            Ok(signature) => Some(Ranked {
                score: compare(&signature, reference, tolerance),
                path,
            }),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping candidate");
                None
            }
        })
        .collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked
}

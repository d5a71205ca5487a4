//! End-to-end extraction: image → resize → binarize → damp → blobs → signature.

use std::borrow::Cow;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use image::{DynamicImage, ImageFormat};
use serde::{Deserialize, Serialize};

use crate::compare::{Tolerance, compare};
use crate::error::SignatureError;
use crate::shape::{Blob, Dot, PixelGrid, binarize, damp, detect_blobs, resize_to_fit};
use crate::signature::{ReferencePair, Signature, extract_features};

pub const DEFAULT_MAX_DIMENSION: u32 = 1000;
const DEFAULT_DAMP: bool = true;

/// Settings for one extraction run, passed explicitly to every entry point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Images larger than this on either side are scaled down first.
    pub max_dimension: u32,
    /// Run the single-pass denoiser before labeling blobs.
    pub damp: bool,
    /// When set, resized images are also written under
    /// `<resize_dir>/<max_dimension>/` as JPEG.
    pub resize_dir: Option<PathBuf>,
    pub tolerance: Tolerance,
    /// Concurrent extractions in batch mode; 0 picks the available parallelism.
    pub workers: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_dimension: DEFAULT_MAX_DIMENSION,
            damp: DEFAULT_DAMP,
            resize_dir: None,
            tolerance: Tolerance::default(),
            workers: 0,
        }
    }
}

impl PipelineConfig {
    /// Reads a configuration from a JSON file; missing fields keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, SignatureError> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn worker_count(&self) -> usize {
        if self.workers > 0 {
            return self.workers;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }
}

/// Everything the pipeline learned about one image.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Dimensions after resizing; dot coordinates live in this space.
    pub width: u32,
    pub height: u32,
    pub resized_path: Option<PathBuf>,
    pub grid: PixelGrid,
    pub damped: usize,
    pub blobs: Vec<Blob>,
    pub dots: Vec<Dot>,
    pub reference: ReferencePair,
    pub signature: Signature,
}

/// Returns `true` for file names with a raster extension the decoder handles.
pub fn is_image_file(path: &Path) -> bool {
    let Some(ext) = path.extension().and_then(OsStr::to_str) else {
        return false;
    };
    matches!(
        ext.to_ascii_lowercase().as_str(),
        "png" | "jpg" | "jpeg" | "bmp" | "gif" | "tif" | "tiff" | "webp"
    )
}

/// Opens and decodes an image file.
pub fn load_image(path: &Path) -> Result<DynamicImage, SignatureError> {
    if !path.is_file() {
        return Err(SignatureError::MissingFile(path.to_path_buf()));
    }
    image::open(path).map_err(|source| SignatureError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

fn persist_resized(image: &DynamicImage, dir: &Path, size: u32) -> Result<PathBuf, SignatureError> {
    let dir = dir.join(size.to_string());
    fs::create_dir_all(&dir)?;
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let path = dir.join(format!("{nanos}.jpg"));
    // JPEG has no alpha channel.
    DynamicImage::ImageRgb8(image.to_rgb8())
        .save_with_format(&path, ImageFormat::Jpeg)
        .map_err(|source| SignatureError::Persist {
            path: path.clone(),
            source,
        })?;
    Ok(path)
}

/// Runs every stage on an already decoded image.
pub fn analyze(image: &DynamicImage, config: &PipelineConfig) -> Result<Analysis, SignatureError> {
    let resized = resize_to_fit(image, config.max_dimension);
    let resized_path = match (&resized, &config.resize_dir) {
        (Cow::Owned(img), Some(dir)) => Some(persist_resized(img, dir, config.max_dimension)?),
        _ => None,
    };

    let mut grid = binarize(&resized);
    let damped = if config.damp { damp(&mut grid) } else { 0 };
    let blobs = detect_blobs(&grid);
    let dots: Vec<Dot> = blobs.iter().map(Blob::center).collect();
    let extraction = extract_features(&dots)?;

    tracing::info!(
        width = resized.width(),
        height = resized.height(),
        blobs = blobs.len(),
        features = extraction.signature.len(),
        "extracted signature"
    );

    Ok(Analysis {
        width: resized.width(),
        height: resized.height(),
        resized_path,
        grid,
        damped,
        blobs,
        dots,
        reference: extraction.reference,
        signature: extraction.signature,
    })
}

/// Signature of an already decoded image.
pub fn extract(image: &DynamicImage, config: &PipelineConfig) -> Result<Signature, SignatureError> {
    analyze(image, config).map(|a| a.signature)
}

/// Decodes `path` and extracts its signature.
pub fn extract_from_path(path: &Path, config: &PipelineConfig) -> Result<Signature, SignatureError> {
    tracing::debug!(path = %path.display(), "loading image");
    let image = load_image(path)?;
    extract(&image, config)
}

/// Reads a saved signature when `path` is a `.json` file, otherwise extracts it
/// from the image at `path`.
pub fn load_or_extract(path: &Path, config: &PipelineConfig) -> Result<Signature, SignatureError> {
    let is_json = path
        .extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if !is_json {
        return extract_from_path(path, config);
    }
    if !path.is_file() {
        return Err(SignatureError::MissingFile(path.to_path_buf()));
    }
    Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
}

/// Scores the image (or saved signature) at `subject` against `reference`
/// using the configured tolerance.
pub fn compare_files(
    subject: &Path,
    reference: &Path,
    config: &PipelineConfig,
) -> Result<f64, SignatureError> {
    let s = load_or_extract(subject, config)?;
    let c = load_or_extract(reference, config)?;
    Ok(compare(&s, &c, config.tolerance))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_image_extensions() {
        assert!(is_image_file(Path::new("a/b.PNG")));
        assert!(is_image_file(Path::new("x.jpeg")));
        assert!(!is_image_file(Path::new("x.json")));
        assert!(!is_image_file(Path::new("noext")));
    }

    #[test]
    fn config_defaults_fill_missing_fields() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"damp": false, "tolerance": {"angle": 3}}"#).expect("parse");
        assert_eq!(config.max_dimension, DEFAULT_MAX_DIMENSION);
        assert!(!config.damp);
        assert_eq!(config.tolerance, Tolerance::new(3, 1));
        assert!(config.resize_dir.is_none());
    }

    #[test]
    fn missing_file_is_reported() {
        let err = load_image(Path::new("does/not/exist.png")).expect_err("missing");
        assert!(matches!(err, SignatureError::MissingFile(_)));
    }

    #[test]
    fn explicit_worker_count_wins() {
        let config = PipelineConfig {
            workers: 3,
            ..PipelineConfig::default()
        };
        assert_eq!(config.worker_count(), 3);
        assert!(PipelineConfig::default().worker_count() >= 1);
    }
}

//! Shape signatures for dot patterns.
//!
//! An image is reduced to the bounding-box midpoints of its dark blobs, and the
//! layout of those dots is described relative to a reference pair so that it
//! survives rotation, uniform scaling and translation. Two such signatures are
//! compared with a tolerance-banded score.

pub mod annotate;
pub mod batch;
pub mod compare;
pub mod error;
pub mod pipeline;
pub mod shape;
pub mod signature;

pub use compare::{Tolerance, compare};
pub use error::SignatureError;
pub use pipeline::{Analysis, PipelineConfig, analyze, compare_files, extract, extract_from_path};
pub use shape::Dot;
pub use signature::{Feature, ReferencePair, Signature, build_signature};

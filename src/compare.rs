//! Tolerance-banded scoring of two signatures.

use serde::{Deserialize, Serialize};

use crate::signature::Signature;

/// One tolerance unit on the internal ×100 scale: a degree for angles, a
/// percent for length ratios.
const UNIT: i64 = 100;

/// Accepted drift per feature, in whole degrees and percent.
///
/// Values below one are treated as one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerance {
    pub angle: i32,
    pub length: i32,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            angle: 1,
            length: 1,
        }
    }
}

impl Tolerance {
    pub const fn new(angle: i32, length: i32) -> Self {
        Self { angle, length }
    }

    /// Tolerances on the scale the signature fields are stored in. Widened so
    /// any `i32` setting, doubled, still fits.
    pub fn scaled(&self) -> (i64, i64) {
        (
            i64::from(self.angle.max(1)) * UNIT,
            i64::from(self.length.max(1)) * UNIT,
        )
    }
}

/// Scores `subject` against `reference`.
///
/// Both are re-sorted by descending angle and paired by position. A pair with
/// either difference above twice its tolerance is skipped; otherwise it earns 2,
/// minus the overshoot ratio of each difference beyond its tolerance. The sum is
/// normalised by `2n`, so identical signatures score exactly 1.0.
///
/// Unequal lengths or empty signatures score 0.0.
pub fn compare(subject: &Signature, reference: &Signature, tolerance: Tolerance) -> f64 {
    if subject.len() != reference.len() || subject.is_empty() {
        return 0.0;
    }
    let (ta, tl) = tolerance.scaled();
    let subject = subject.sorted_by_angle();
    let reference = reference.sorted_by_angle();

    let mut score = 0.0;
    let mut skipped = 0usize;
    for (s, c) in subject.iter().zip(reference.iter()) {
        let diff_angle = (i64::from(s.angle) - i64::from(c.angle)).abs();
        let diff_length = (i64::from(s.length) - i64::from(c.length)).abs();
        if diff_angle > 2 * ta || diff_length > 2 * tl {
            skipped += 1;
            continue;
        }
        if diff_angle > ta {
            score -= (diff_angle - ta) as f64 / ta as f64;
        }
        if diff_length > tl {
            score -= (diff_length - tl) as f64 / tl as f64;
        }
        score += 2.0;
    }

    let score = score / (subject.len() * 2) as f64;
    tracing::debug!(features = subject.len(), skipped, score, "compared signatures");
    score
}

//! Rotation, scale and translation tolerant description of a dot set.
//!
//! Two dots are picked as a reference pair: `start` acts as the polar origin and
//! the direction towards `end` as the zero angle. Every other dot is described
//! by its clockwise angle relative to that direction and by its distance from
//! `start` relative to the reference segment.

use std::f64::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

use crate::error::SignatureError;
use crate::shape::Dot;

/// Angles are stored in hundredths of a degree.
pub const ANGLE_SCALE: f64 = 100.0;
/// Length ratios are stored in ten-thousandths.
pub const LENGTH_SCALE: f64 = 10_000.0;

/// One dot relative to the reference pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Feature {
    pub angle: i32,
    pub length: i32,
}

impl Feature {
    pub const fn new(angle: i32, length: i32) -> Self {
        Self { angle, length }
    }
}

/// Ordered features of a dot set. Order is significant when comparing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signature(Vec<Feature>);

impl Signature {
    pub fn new(features: Vec<Feature>) -> Self {
        Self(features)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn features(&self) -> &[Feature] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Feature> {
        self.0.iter()
    }

    /// Returns a copy ordered by descending angle. Equal angles keep their
    /// current relative order.
    pub fn sorted_by_angle(&self) -> Signature {
        let mut features = self.0.clone();
        features.sort_by(|a, b| b.angle.cmp(&a.angle));
        Signature(features)
    }
}

impl From<Vec<Feature>> for Signature {
    fn from(features: Vec<Feature>) -> Self {
        Self(features)
    }
}

impl<'a> IntoIterator for &'a Signature {
    type Item = &'a Feature;
    type IntoIter = std::slice::Iter<'a, Feature>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Distance between two dots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairDistance {
    pub squared: i64,
    pub length: f64,
}

/// Distances for every unordered pair of dot indices, computed once.
#[derive(Debug, Clone)]
pub struct PairwiseDistances {
    count: usize,
    pairs: Vec<PairDistance>,
}

impl PairwiseDistances {
    pub fn new(dots: &[Dot]) -> Self {
        let count = dots.len();
        let mut pairs = Vec::with_capacity(count * count.saturating_sub(1) / 2);
        for (i, a) in dots.iter().enumerate() {
            for b in &dots[i + 1..] {
                let dx = (b.x - a.x) as i64;
                let dy = (b.y - a.y) as i64;
                let squared = dx * dx + dy * dy;
                pairs.push(PairDistance {
                    squared,
                    length: (squared as f64).sqrt(),
                });
            }
        }
        Self { count, pairs }
    }

    /// Number of dots the table was built from.
    pub fn count(&self) -> usize {
        self.count
    }

    fn slot(&self, i: usize, j: usize) -> usize {
        debug_assert!(i < j && j < self.count);
        i * self.count - i * (i + 1) / 2 + (j - i - 1)
    }

    /// Distance between dots `a` and `b`, in either order.
    pub fn get(&self, a: usize, b: usize) -> PairDistance {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => self.pairs[self.slot(a, b)],
            std::cmp::Ordering::Greater => self.pairs[self.slot(b, a)],
            std::cmp::Ordering::Equal => PairDistance {
                squared: 0,
                length: 0.0,
            },
        }
    }

    /// All pairs `(i, j, distance)` with `i < j`, in ascending `(i, j)` order.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize, PairDistance)> + '_ {
        (0..self.count)
            .flat_map(move |i| (i + 1..self.count).map(move |j| (i, j)))
            .zip(self.pairs.iter().copied())
            .map(|((i, j), d)| (i, j, d))
    }
}

/// The two dots the signature is expressed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferencePair {
    /// Polar origin.
    pub start: usize,
    /// Direction anchor; `start → end` is the reference segment.
    pub end: usize,
}

/// First pair in ascending `(i, j)` order that strictly improves on every
/// accepted pair before it.
fn closest_pair(
    distances: &PairwiseDistances,
    accept: impl Fn(usize, usize) -> bool,
) -> Option<(usize, usize)> {
    let mut best: Option<(usize, usize, i64)> = None;
    for (i, j, d) in distances.pairs() {
        if !accept(i, j) {
            continue;
        }
        if best.is_none_or(|(_, _, squared)| d.squared < squared) {
            best = Some((i, j, d.squared));
        }
    }
    best.map(|(i, j, _)| (i, j))
}

/// Picks the reference pair by a nearest-neighbour chain.
///
/// The closest pair `(i0, j0)` comes first; the closest pair sharing one of its
/// endpoints then decides which endpoint becomes `start`: the shared one.
pub fn select_reference(distances: &PairwiseDistances) -> Result<ReferencePair, SignatureError> {
    let found = distances.count();
    if found < 3 {
        return Err(SignatureError::InsufficientFeatures { found });
    }

    let (i0, j0) =
        closest_pair(distances, |_, _| true).ok_or(SignatureError::InsufficientFeatures { found })?;
    let (i1, j1) = closest_pair(distances, |i, j| {
        (i, j) != (i0, j0) && (i == i0 || i == j0 || j == i0 || j == j0)
    })
    .ok_or(SignatureError::InsufficientFeatures { found })?;

    let reference = if i1 == j0 || j1 == j0 {
        ReferencePair { start: j0, end: i0 }
    } else {
        ReferencePair { start: i0, end: j0 }
    };
    tracing::debug!(
        start = reference.start,
        end = reference.end,
        second = ?(i1, j1),
        "selected reference pair"
    );
    Ok(reference)
}

/// Clockwise direction in degrees, in `(0, 360]`, of dot `target` seen from `start`.
///
/// Callers must not pass coincident dots; a zero-length pair is always the
/// reference pair and is rejected before any direction is taken.
fn direction(dots: &[Dot], distances: &PairwiseDistances, start: usize, target: usize) -> f64 {
    let (lo, hi) = if start < target {
        (start, target)
    } else {
        (target, start)
    };
    let (a, b) = (dots[lo], dots[hi]);
    let length = distances.get(lo, hi).length;

    let mut angle = if length > 0.0 {
        ((b.y - a.y) as f64 / length).clamp(-1.0, 1.0).asin()
    } else {
        0.0
    };
    if start > target {
        angle = -angle;
    }
    let right_half = (start < target && b.x >= a.x) || (start > target && b.x < a.x);
    if right_half {
        if angle < 0.0 {
            angle += TAU;
        }
    } else {
        angle = PI - angle;
    }
    360.0 - angle.to_degrees()
}

fn round_half_up(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

/// Reference pair together with the signature built against it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub reference: ReferencePair,
    pub signature: Signature,
}

/// Describes every dot but the reference pair relative to it.
///
/// Features are ordered by descending angle, equal angles by ascending dot index.
pub fn extract_features(dots: &[Dot]) -> Result<Extraction, SignatureError> {
    let distances = PairwiseDistances::new(dots);
    let reference = select_reference(&distances)?;
    let ReferencePair { start, end } = reference;

    let reference_length = distances.get(start, end).length;
    if reference_length == 0.0 {
        return Err(SignatureError::DegenerateReference { start, end });
    }
    let reference_angle = direction(dots, &distances, start, end);

    let mut indexed: Vec<(usize, Feature)> = (0..dots.len())
        .filter(|&i| i != start && i != end)
        .map(|i| {
            let mut diff = direction(dots, &distances, start, i) - reference_angle;
            if diff < 0.0 {
                diff += 360.0;
            }
            let ratio = distances.get(start, i).length / reference_length;
            (
                i,
                Feature::new(round_half_up(diff * ANGLE_SCALE), round_half_up(ratio * LENGTH_SCALE)),
            )
        })
        .collect();
    indexed.sort_by(|(ia, a), (ib, b)| b.angle.cmp(&a.angle).then(ia.cmp(ib)));

    Ok(Extraction {
        reference,
        signature: indexed.into_iter().map(|(_, f)| f).collect::<Vec<_>>().into(),
    })
}

/// Builds the signature of `dots`, discarding the reference pair.
pub fn build_signature(dots: &[Dot]) -> Result<Signature, SignatureError> {
    extract_features(dots).map(|e| e.signature)
}

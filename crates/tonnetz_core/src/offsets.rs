//! Pixel-nearest lattice displacements realising a step.
//!
//! Chord tones of one pitch class recur periodically around an anchor; the
//! renderer draws arms to the few visually closest ones. Results are memoized
//! through an injected [`OffsetMemo`].

use crate::coords::{vector_to_pixel, AxialCoord, LatticeVector, PixelPoint};
use crate::label::LatticeParams;
use crate::settings::SearchSettings;
use crate::traits::{MemoEntry, OffsetMemo};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A displacement congruent to the requested step, with its sort keys.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CongruentOffset {
    pub vector: LatticeVector,
    /// Squared pixel distance from the anchor.
    pub distance_squared: f64,
    pub manhattan: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OffsetKey {
    pub step: i32,
    pub params: LatticeParams,
    pub anchor: AxialCoord,
    size_bits: u64,
}

impl OffsetKey {
    pub fn new(step: i32, params: LatticeParams, anchor: AxialCoord, size: f64) -> Self {
        Self {
            step,
            params,
            anchor,
            size_bits: size.to_bits(),
        }
    }

    pub fn size(&self) -> f64 {
        f64::from_bits(self.size_bits)
    }
}

/// Hash-map backed [`OffsetMemo`].
#[derive(Debug, Default, Clone)]
pub struct OffsetCache {
    entries: HashMap<OffsetKey, MemoEntry>,
}

impl OffsetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl OffsetMemo for OffsetCache {
    fn lookup(&self, key: &OffsetKey) -> Option<&MemoEntry> {
        self.entries.get(key)
    }

    fn store(&mut self, key: OffsetKey, entry: MemoEntry) {
        self.entries.insert(key, entry);
    }

    fn clear(&mut self) {
        if !self.entries.is_empty() {
            tracing::trace!(entries = self.entries.len(), "clearing offset cache");
        }
        self.entries.clear();
    }
}

/// Squared length of a lattice vector in units of `size²`.
///
/// `x = size·(u + v/2)` and `y = size·v·√3/2`, so the squared pixel length
/// is exactly `size²·(u² + uv + v²)`. Sorting on this integer gives the
/// pixel-distance order without floating-point ties.
pub fn lattice_norm(vector: LatticeVector) -> i64 {
    let (u, v) = (vector.u as i64, vector.v as i64);
    u * u + u * v + v * v
}

/// Up to `need` distinct nonzero vectors congruent to `step`, nearest first
/// by pixel distance from `anchor`, ties broken by Manhattan norm.
///
/// The search square widens from `offset_initial_radius` in
/// `offset_radius_step` increments until `need` vectors are found or
/// `offset_max_radius` has been scanned. An empty result means the step is
/// not reachable and nothing should be drawn.
#[allow(clippy::too_many_arguments)]
pub fn nearest_offsets<M: OffsetMemo>(
    step: i32,
    params: &LatticeParams,
    anchor: AxialCoord,
    size: f64,
    need: usize,
    settings: &SearchSettings,
    memo: &mut M,
) -> Vec<CongruentOffset> {
    let step = params.normalize(step);
    let key = OffsetKey::new(step, *params, anchor, size);
    if let Some(entry) = memo.lookup(&key) {
        if entry.satisfies(need) {
            return entry.candidates.iter().take(need).copied().collect();
        }
    }

    let entry = search_offsets(step, params, size, need, settings);
    let result = entry.candidates.iter().take(need).copied().collect();
    memo.store(key, entry);
    result
}

fn search_offsets(
    step: i32,
    params: &LatticeParams,
    size: f64,
    need: usize,
    settings: &SearchSettings,
) -> MemoEntry {
    let increment = settings.offset_radius_step.max(1);
    let mut seen = HashSet::new();
    let mut found: Vec<(i64, CongruentOffset)> = Vec::new();
    let mut range = settings.offset_initial_radius.max(1);

    while found.len() < need && range <= settings.offset_max_radius {
        for u in -range..=range {
            for v in -range..=range {
                let vector = LatticeVector::new(u, v);
                if vector.is_zero() || params.step_of(vector) != step {
                    continue;
                }
                if !seen.insert(vector) {
                    continue;
                }
                // The raster map is linear, so the distance depends on the vector alone.
                let point = vector_to_pixel(vector, size);
                found.push((
                    lattice_norm(vector),
                    CongruentOffset {
                        vector,
                        distance_squared: point.distance_squared(PixelPoint::new(0.0, 0.0)),
                        manhattan: vector.manhattan(),
                    },
                ));
            }
        }
        range += increment;
    }

    let exhausted = range > settings.offset_max_radius;
    tracing::trace!(step, found = found.len(), exhausted, "nearest offset search");

    found.sort_by_key(|(norm, offset)| (*norm, offset.manhattan));
    let candidates = found
        .into_iter()
        .map(|(_, offset)| offset)
        .take(settings.offset_cache_cap.max(need))
        .collect();
    MemoEntry {
        candidates,
        exhausted,
    }
}

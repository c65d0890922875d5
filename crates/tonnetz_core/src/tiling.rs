//! Periodic repetition of placed anchors across the visible surface.

use crate::coords::{to_pixel, vector_to_pixel, AxialCoord};
use crate::period::PeriodBasis;
use crate::settings::SearchSettings;
use nalgebra::Matrix2;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Visible surface plus the margin tiles may spill into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TilingBounds {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
}

impl TilingBounds {
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= -self.margin
            && x <= self.width + self.margin
            && y >= -self.margin
            && y <= self.height + self.margin
    }

    pub fn diagonal(&self) -> f64 {
        self.width.hypot(self.height)
    }
}

/// Number of multiples of a vector of pixel length `length` needed to cross
/// the surface, capped for near-degenerate vectors.
fn translate_range(diagonal: f64, length: f64, cap: i32) -> i32 {
    if length.is_nan() || length <= 0.0 {
        return cap;
    }
    let range = (diagonal / length).ceil() + 2.0;
    if range.is_finite() {
        (range as i32).min(cap)
    } else {
        cap
    }
}

/// `anchor + n1·p1 + n2·p2`, or `None` when it leaves `i32`. Large moduli
/// give period vectors near `i32::MAX`, so the sum is formed in `i64`.
fn translate(anchor: AxialCoord, basis: &PeriodBasis, n1: i32, n2: i32) -> Option<AxialCoord> {
    let (n1, n2) = (i64::from(n1), i64::from(n2));
    let q = i64::from(anchor.q) + n1 * i64::from(basis.p1.u) + n2 * i64::from(basis.p2.u);
    let r = i64::from(anchor.r) + n1 * i64::from(basis.p1.v) + n2 * i64::from(basis.p2.v);
    Some(AxialCoord::new(i32::try_from(q).ok()?, i32::try_from(r).ok()?))
}

/// Every translate `anchor + n1·p1 + n2·p2` of the placed anchors whose
/// pixel position lies inside `bounds`, without duplicates. The placed
/// anchors themselves are the `n1 = n2 = 0` terms and obey the same bounds.
/// In-bounds placed anchors come first in their own order, followed by
/// translates in `n1`-major order.
pub fn expand_anchors(
    placed: &[AxialCoord],
    basis: &PeriodBasis,
    bounds: &TilingBounds,
    size: f64,
    settings: &SearchSettings,
) -> Vec<AxialCoord> {
    let diagonal = bounds.diagonal();
    let p1_px = vector_to_pixel(basis.p1, size);
    let p2_px = vector_to_pixel(basis.p2, size);
    let range1 = translate_range(diagonal, p1_px.x.hypot(p1_px.y), settings.tiling_range_cap);
    let range2 = translate_range(diagonal, p2_px.x.hypot(p2_px.y), settings.tiling_range_cap);

    let in_bounds = |coord: AxialCoord| {
        let point = to_pixel(coord, size);
        coord.is_addressable() && bounds.contains(point.x, point.y)
    };

    let mut seen = HashSet::new();
    let mut expanded = Vec::new();
    for anchor in placed {
        if in_bounds(*anchor) && seen.insert(*anchor) {
            expanded.push(*anchor);
        }
    }

    for anchor in placed {
        for n1 in -range1..=range1 {
            for n2 in -range2..=range2 {
                if n1 == 0 && n2 == 0 {
                    continue;
                }
                let Some(candidate) = translate(*anchor, basis, n1, n2) else {
                    continue;
                };
                if in_bounds(candidate) && seen.insert(candidate) {
                    expanded.push(candidate);
                }
            }
        }
    }

    tracing::trace!(
        placed = placed.len(),
        expanded = expanded.len(),
        range1,
        range2,
        "expanded overlay anchors"
    );
    expanded
}

/// Whether `candidate - existing` is an integer combination of the period
/// basis, solved by Cramer's rule and accepted within `tolerance` of integers.
pub fn is_equivalent_anchor(
    candidate: AxialCoord,
    existing: AxialCoord,
    basis: &PeriodBasis,
    tolerance: f64,
) -> bool {
    let du = (i64::from(candidate.q) - i64::from(existing.q)) as f64;
    let dv = (i64::from(candidate.r) - i64::from(existing.r)) as f64;
    let (p1, p2) = (basis.p1, basis.p2);
    let det = Matrix2::new(p1.u as f64, p2.u as f64, p1.v as f64, p2.v as f64).determinant();
    if det.abs() < f64::EPSILON {
        return candidate == existing;
    }
    let n1 = Matrix2::new(du, p2.u as f64, dv, p2.v as f64).determinant() / det;
    let n2 = Matrix2::new(p1.u as f64, du, p1.v as f64, dv).determinant() / det;
    (n1 - n1.round()).abs() < tolerance && (n2 - n2.round()).abs() < tolerance
}

/// The first anchor in `anchors` equivalent to `candidate`, if any.
pub fn find_equivalent_anchor(
    candidate: AxialCoord,
    anchors: &[AxialCoord],
    basis: &PeriodBasis,
    tolerance: f64,
) -> Option<usize> {
    anchors
        .iter()
        .position(|existing| is_equivalent_anchor(candidate, *existing, basis, tolerance))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::LatticeVector;
    use crate::label::LatticeParams;
    use crate::period::period_vectors;

    const SIZE: f64 = 40.0;

    fn twelve_basis() -> PeriodBasis {
        let params = LatticeParams::new(7, 4, 12).expect("params");
        period_vectors(&params, &SearchSettings::default())
    }

    fn scenario_bounds() -> TilingBounds {
        TilingBounds {
            width: 800.0,
            height: 600.0,
            margin: 80.0,
        }
    }

    #[test]
    fn expanded_anchors_cover_surface_and_stay_in_bounds() {
        let basis = twelve_basis();
        let bounds = scenario_bounds();
        let expanded = expand_anchors(&[AxialCoord::ORIGIN], &basis, &bounds, SIZE, &SearchSettings::default());

        assert_eq!(expanded[0], AxialCoord::ORIGIN);
        assert!(expanded.iter().any(|a| *a != AxialCoord::ORIGIN));
        for anchor in &expanded {
            let p = to_pixel(*anchor, SIZE);
            assert!(
                (-80.0..=880.0).contains(&p.x) && (-80.0..=680.0).contains(&p.y),
                "{anchor:?} at {p:?} is out of bounds"
            );
        }
        let unique: HashSet<_> = expanded.iter().collect();
        assert_eq!(unique.len(), expanded.len());
    }

    #[test]
    fn every_in_bounds_translate_is_found() {
        let params = LatticeParams::new(7, 4, 12).expect("params");
        let basis = twelve_basis();
        let bounds = scenario_bounds();
        let expanded: HashSet<_> =
            expand_anchors(&[AxialCoord::ORIGIN], &basis, &bounds, SIZE, &SearchSettings::default())
                .into_iter()
                .collect();

        // The basis spans the whole zero-label sublattice, so every visible
        // vertex labelled 0 is a translate of the origin.
        for r in -4..=22 {
            for q in -20..=30 {
                let coord = AxialCoord::new(q, r);
                let p = to_pixel(coord, SIZE);
                if params.label(coord) == 0 && bounds.contains(p.x, p.y) {
                    assert!(expanded.contains(&coord), "missing translate {coord:?}");
                }
            }
        }
    }

    #[test]
    fn overlapping_placements_are_deduplicated() {
        let basis = twelve_basis();
        let bounds = scenario_bounds();
        let second = AxialCoord::ORIGIN.offset(basis.p1 * -1);
        let single = expand_anchors(&[AxialCoord::ORIGIN], &basis, &bounds, SIZE, &SearchSettings::default());
        let both = expand_anchors(&[AxialCoord::ORIGIN, second], &basis, &bounds, SIZE, &SearchSettings::default());
        assert_eq!(single.len(), both.len());
        assert_eq!(both[1], second);
    }

    #[test]
    fn off_surface_placements_are_not_drawn() {
        let basis = twelve_basis();
        let bounds = scenario_bounds();
        let far = AxialCoord::new(100, 0);
        let expanded = expand_anchors(&[far], &basis, &bounds, SIZE, &SearchSettings::default());
        assert!(!expanded.contains(&far));
        for anchor in &expanded {
            let p = to_pixel(*anchor, SIZE);
            assert!(bounds.contains(p.x, p.y), "{anchor:?} at {p:?} is out of bounds");
        }

        let visible = AxialCoord::new(3, 2);
        let mixed = expand_anchors(&[far, visible], &basis, &bounds, SIZE, &SearchSettings::default());
        assert_eq!(mixed[0], visible);
        assert!(!mixed.contains(&far));
    }

    #[test]
    fn huge_modulus_basis_does_not_overflow() {
        let params = LatticeParams::new(1, 1, 1_000_000_000).expect("params");
        let basis = period_vectors(&params, &SearchSettings::default());
        assert_eq!(basis.p2, LatticeVector::new(1_000_000_000, 0));

        let bounds = scenario_bounds();
        let expanded = expand_anchors(&[AxialCoord::ORIGIN], &basis, &bounds, SIZE, &SearchSettings::default());
        assert_eq!(expanded[0], AxialCoord::ORIGIN);
        for anchor in &expanded {
            assert_eq!(params.label(*anchor), 0);
            let p = to_pixel(*anchor, SIZE);
            assert!(bounds.contains(p.x, p.y));
        }

        let edge = AxialCoord::new(i32::MAX - 1, 0);
        assert!(expand_anchors(&[edge], &basis, &bounds, SIZE, &SearchSettings::default()).is_empty());
        assert!(!is_equivalent_anchor(edge, AxialCoord::new(i32::MIN, 0), &basis, 1e-6));
    }

    #[test]
    fn range_cap_bounds_degenerate_vectors() {
        assert_eq!(translate_range(1000.0, 0.0, 40), 40);
        assert_eq!(translate_range(1000.0, 1.0, 40), 40);
        assert_eq!(translate_range(1000.0, 120.0, 40), 11);
    }

    #[test]
    fn equivalence_detects_period_translates() {
        let basis = twelve_basis();
        let origin = AxialCoord::new(2, 1);
        let translate = origin.offset(basis.p1 * 3 + basis.p2 * -2);
        assert!(is_equivalent_anchor(translate, origin, &basis, 1e-6));
        assert!(is_equivalent_anchor(origin, origin, &basis, 1e-6));
        assert!(!is_equivalent_anchor(origin.offset(LatticeVector::new(1, 0)), origin, &basis, 1e-6));

        let anchors = [AxialCoord::new(5, 5), origin];
        assert_eq!(find_equivalent_anchor(translate, &anchors, &basis, 1e-6), Some(1));
        assert_eq!(find_equivalent_anchor(AxialCoord::new(6, 5), &anchors, &basis, 1e-6), None);
    }

    #[test]
    fn equivalence_rejects_fractional_combinations() {
        // With a non-primitive basis, some zero-label vectors are half-integer combinations.
        let basis = PeriodBasis {
            p1: LatticeVector::new(2, 0),
            p2: LatticeVector::new(0, 2),
        };
        assert!(!is_equivalent_anchor(AxialCoord::new(1, 1), AxialCoord::ORIGIN, &basis, 1e-6));
        assert!(is_equivalent_anchor(AxialCoord::new(4, -2), AxialCoord::ORIGIN, &basis, 1e-6));
    }
}

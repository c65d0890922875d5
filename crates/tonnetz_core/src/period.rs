//! Basis of the label-preserving sublattice.
//!
//! Translating by any vector congruent to 0 leaves every label unchanged, so
//! placed shapes repeat along these vectors.

use crate::coords::LatticeVector;
use crate::label::{sublattice_index, LatticeParams};
use crate::settings::SearchSettings;
use serde::{Deserialize, Serialize};

/// Two non-collinear period vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodBasis {
    pub p1: LatticeVector,
    pub p2: LatticeVector,
}

impl PeriodBasis {
    /// Signed area of the fundamental cell in index space.
    pub fn cross(&self) -> i64 {
        self.p1.cross(self.p2)
    }
}

/// Nonzero vectors congruent to 0 within `range`, sorted by Manhattan norm.
/// The sort is stable, so equal norms keep `u`-major enumeration order.
fn zero_candidates(params: &LatticeParams, range: i32) -> Vec<LatticeVector> {
    let mut candidates = Vec::new();
    for u in -range..=range {
        for v in -range..=range {
            let candidate = LatticeVector::new(u, v);
            if candidate.is_zero() {
                continue;
            }
            if params.step_of(candidate) == 0 {
                candidates.push(candidate);
            }
        }
    }
    candidates.sort_by_key(|c| c.manhattan());
    candidates
}

fn pick_basis(candidates: &[LatticeVector]) -> Option<PeriodBasis> {
    let p1 = *candidates.first()?;
    let p2 = candidates.iter().copied().find(|c| p1.cross(*c) != 0)?;
    Some(PeriodBasis { p1, p2 })
}

/// Shortest period vector `p1` plus the shortest one not collinear with it.
///
/// The search starts at `settings.period_range` and doubles up to
/// `settings.period_range_ceiling`. If that still finds no pair, `p2` is
/// `p1` rotated a quarter turn when that rotation is itself a period, and
/// otherwise whichever of `(edo, 0)` / `(0, edo)` is not collinear with `p1`.
/// Both of those are congruent to 0 for every generator pair, so the result
/// is always a genuine, non-degenerate period basis.
pub fn period_vectors(params: &LatticeParams, settings: &SearchSettings) -> PeriodBasis {
    let mut range = settings.period_range.max(1);
    let mut shortest = None;
    loop {
        let candidates = zero_candidates(params, range);
        if let Some(basis) = pick_basis(&candidates) {
            check_primitive(params, &basis);
            return basis;
        }
        if shortest.is_none() {
            shortest = candidates.first().copied();
        }
        if range >= settings.period_range_ceiling {
            break;
        }
        range = (range * 2).min(settings.period_range_ceiling);
        tracing::debug!(range, ?params, "widening period vector search");
    }

    let edo = params.edo;
    let p1 = shortest.unwrap_or(LatticeVector::new(edo, 0));
    let rotated = p1.rotated();
    let p2 = if params.step_of(rotated) == 0 {
        rotated
    } else if p1.cross(LatticeVector::new(edo, 0)) != 0 {
        LatticeVector::new(edo, 0)
    } else {
        LatticeVector::new(0, edo)
    };
    tracing::debug!(?p1, ?p2, ?params, "period basis fell back to constructed vectors");
    PeriodBasis { p1, p2 }
}

fn check_primitive(params: &LatticeParams, basis: &PeriodBasis) {
    let index = sublattice_index(params);
    let area = basis.cross().abs();
    if area != index {
        tracing::debug!(
            area,
            index,
            ?basis,
            "period basis spans a proper sublattice; tiling will skip some repeats"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(x: i32, z: i32, edo: i32) -> LatticeParams {
        LatticeParams::new(x, z, edo).expect("params")
    }

    fn assert_valid(p: &LatticeParams, basis: &PeriodBasis) {
        assert_eq!(p.step_of(basis.p1), 0, "p1 {:?} not a period", basis.p1);
        assert_eq!(p.step_of(basis.p2), 0, "p2 {:?} not a period", basis.p2);
        assert!(!basis.p1.is_zero());
        assert_ne!(basis.cross(), 0, "collinear basis {basis:?}");
    }

    #[test]
    fn twelve_edo_basis_is_shortest_pair() {
        let p = params(7, 4, 12);
        let basis = period_vectors(&p, &SearchSettings::default());
        assert_valid(&p, &basis);
        assert_eq!(basis.p1, LatticeVector::new(0, -3));
        assert_eq!(basis.p2, LatticeVector::new(-4, 1));
        assert_eq!(basis.cross().abs(), sublattice_index(&p));
    }

    #[test]
    fn edo_one_still_returns_non_collinear_pair() {
        let p = params(1, 1, 1);
        let basis = period_vectors(&p, &SearchSettings::default());
        assert_valid(&p, &basis);
        assert_eq!(basis.p1.manhattan(), 1);
        assert_eq!(basis.p2.manhattan(), 1);
    }

    #[test]
    fn equal_generators_are_handled() {
        let p = params(5, 5, 12);
        let basis = period_vectors(&p, &SearchSettings::default());
        assert_valid(&p, &basis);
        assert_eq!(basis.p1.manhattan(), 2);
    }

    #[test]
    fn zero_generators_make_every_vector_a_period() {
        let p = params(0, 0, 12);
        let basis = period_vectors(&p, &SearchSettings::default());
        assert_valid(&p, &basis);
        assert_eq!(basis.cross().abs(), 1);
    }

    #[test]
    fn small_search_range_falls_back_to_exact_periods() {
        let p = params(1, 1, 53);
        let settings = SearchSettings {
            period_range: 2,
            period_range_ceiling: 2,
            ..SearchSettings::default()
        };
        let basis = period_vectors(&p, &settings);
        assert_valid(&p, &basis);
    }

    #[test]
    fn search_widens_before_falling_back() {
        // 1·u + 1·v ≡ 0 (mod 53) has (1, -1) but the second period needs |u|+|v| ≥ 53.
        let p = params(1, 1, 53);
        let settings = SearchSettings {
            period_range: 4,
            period_range_ceiling: 64,
            ..SearchSettings::default()
        };
        let basis = period_vectors(&p, &settings);
        assert_valid(&p, &basis);
        assert_eq!(basis.p1.manhattan(), 2);
        assert_eq!(basis.cross().abs(), 53);
    }

    #[test]
    fn bases_are_valid_across_common_tunings() {
        let settings = SearchSettings::default();
        for (x, z, edo) in [(7, 4, 12), (3, 5, 12), (31, 18, 53), (11, 7, 19), (2, 4, 12), (0, 1, 7)] {
            let p = params(x, z, edo);
            assert_valid(&p, &period_vectors(&p, &settings));
        }
    }
}

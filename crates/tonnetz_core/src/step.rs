//! Smallest lattice displacement realising a pitch-class step.

use crate::coords::LatticeVector;
use crate::label::LatticeParams;
use crate::settings::SearchSettings;

/// Minimal-Manhattan-norm `(u, v)` with `x·u + z·v ≡ step (mod edo)`, or
/// `None` when nothing within `settings.step_range` realises the step.
///
/// Ties keep the first vector in `u`-major, `v`-minor order from `-range`.
pub fn try_solve_step(
    step: i32,
    params: &LatticeParams,
    settings: &SearchSettings,
) -> Option<LatticeVector> {
    let step = params.normalize(step);
    let range = settings.step_range;

    let mut best: Option<LatticeVector> = None;
    for u in -range..=range {
        for v in -range..=range {
            let candidate = LatticeVector::new(u, v);
            if params.step_of(candidate) != step {
                continue;
            }
            if best.map_or(true, |b| candidate.manhattan() < b.manhattan()) {
                best = Some(candidate);
            }
        }
    }
    if best.is_some() {
        return best;
    }

    // The square search subsumes both axes, so these only matter if the
    // two-dimensional pass is ever narrowed.
    let along_q = (-range..=range)
        .map(|u| LatticeVector::new(u, 0))
        .find(|c| params.step_of(*c) == step);
    if along_q.is_some() {
        return along_q;
    }
    (-range..=range)
        .map(|v| LatticeVector::new(0, v))
        .find(|c| params.step_of(*c) == step)
}

/// As [`try_solve_step`], collapsing an unresolvable step to the zero vector.
///
/// A zero result for a non-zero step means the shape cannot be rendered;
/// callers must not treat it as a placement.
pub fn solve_step(step: i32, params: &LatticeParams, settings: &SearchSettings) -> LatticeVector {
    match try_solve_step(step, params, settings) {
        Some(vector) => vector,
        None => {
            tracing::debug!(step, ?params, "step unresolvable within search range");
            LatticeVector::ZERO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(x: i32, z: i32, edo: i32) -> LatticeParams {
        LatticeParams::new(x, z, edo).expect("params")
    }

    #[test]
    fn step_zero_is_the_origin() {
        let p = params(7, 4, 12);
        assert_eq!(solve_step(0, &p, &SearchSettings::default()), LatticeVector::ZERO);
    }

    #[test]
    fn generator_steps_resolve_to_unit_vectors() {
        let p = params(7, 4, 12);
        let settings = SearchSettings::default();
        assert_eq!(solve_step(7, &p, &settings), LatticeVector::new(1, 0));
        assert_eq!(solve_step(4, &p, &settings), LatticeVector::new(0, 1));
    }

    #[test]
    fn every_step_is_congruent_and_minimal() {
        let p = params(7, 4, 12);
        let settings = SearchSettings::default();
        for step in 0..12 {
            let vector = solve_step(step, &p, &settings);
            assert_eq!(p.step_of(vector), step, "step {step} resolved to {vector:?}");
            for u in -3..=3 {
                for v in -3..=3 {
                    let other = LatticeVector::new(u, v);
                    if p.step_of(other) == step {
                        assert!(vector.manhattan() <= other.manhattan());
                    }
                }
            }
        }
    }

    #[test]
    fn out_of_range_steps_are_normalized() {
        let p = params(7, 4, 12);
        let settings = SearchSettings::default();
        assert_eq!(solve_step(19, &p, &settings), solve_step(7, &p, &settings));
        assert_eq!(solve_step(-5, &p, &settings), solve_step(7, &p, &settings));
    }

    #[test]
    fn unreachable_steps_yield_none_and_zero_fallback() {
        // Even generators never reach odd pitch classes in 12-EDO.
        let p = params(2, 4, 12);
        let settings = SearchSettings::default();
        assert_eq!(try_solve_step(3, &p, &settings), None);
        assert_eq!(solve_step(3, &p, &settings), LatticeVector::ZERO);
        assert!(try_solve_step(6, &p, &settings).is_some());
    }

    #[test]
    fn narrow_range_reports_unresolvable() {
        let p = params(1, 1, 53);
        let settings = SearchSettings {
            step_range: 2,
            ..SearchSettings::default()
        };
        assert_eq!(try_solve_step(30, &p, &settings), None);
        assert_eq!(try_solve_step(4, &p, &settings), Some(LatticeVector::new(2, 2)));
    }
}

use serde::{Deserialize, Serialize};

/// Bounds and tolerances for the lattice searches.
///
/// Every search is a bounded widening loop; these values are its ceilings.
/// Override individual fields with `..SearchSettings::default()`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchSettings {
    /// Half-width of the square searched for period vectors.
    pub period_range: i32,
    /// Largest half-width the period search widens to before falling back.
    pub period_range_ceiling: i32,
    /// Half-width of the square searched by the step solver.
    pub step_range: i32,
    pub offset_initial_radius: i32,
    pub offset_radius_step: i32,
    pub offset_max_radius: i32,
    /// Candidates kept per offset cache entry.
    pub offset_cache_cap: usize,
    /// Anchors within this many steps of the coarse estimate are tested on click.
    pub click_candidate_range: i32,
    pub containment_epsilon: f64,
    pub equivalence_tolerance: f64,
    /// Ceiling on the `n1`/`n2` ranges used when tiling anchors.
    pub tiling_range_cap: i32,
    /// Tiling margin around the surface, in cells.
    pub tiling_margin_cells: f64,
    /// Fraction of a shape triangle kept when insetting it toward its centroid.
    pub triangle_inset: f64,
    /// Connecting arms drawn per non-triangle step.
    pub arms_per_step: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            period_range: 16,
            period_range_ceiling: 64,
            step_range: 12,
            offset_initial_radius: 4,
            offset_radius_step: 4,
            offset_max_radius: 40,
            offset_cache_cap: 200,
            click_candidate_range: 2,
            containment_epsilon: 1e-6,
            equivalence_tolerance: 1e-6,
            tiling_range_cap: 40,
            tiling_margin_cells: 2.0,
            triangle_inset: 0.92,
            arms_per_step: 4,
        }
    }
}

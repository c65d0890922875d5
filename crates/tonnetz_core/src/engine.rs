//! Stateful façade over the lattice functions.
//!
//! [`Tonnetz`] owns the lattice parameters, the cell size and the offset
//! cache, and clears the cache whenever one of those changes.

use crate::coords::{self, AxialCoord, LatticeVector, PixelPoint};
use crate::error::{validate_size, TonnetzError};
use crate::hit_test;
use crate::label::LatticeParams;
use crate::offsets::{nearest_offsets, CongruentOffset, OffsetCache};
use crate::overlay::{Overlay, OverlayPreset, OverlaySet, ToggleOutcome};
use crate::period::{period_vectors, PeriodBasis};
use crate::render::{plan_render, RenderPlan, RenderRequest};
use crate::settings::SearchSettings;
use crate::step::solve_step;
use crate::traits::OffsetMemo;
use anyhow::{bail, Result};

#[derive(Debug, Clone)]
pub struct Tonnetz {
    params: LatticeParams,
    size: f64,
    settings: SearchSettings,
    basis: PeriodBasis,
    cache: OffsetCache,
}

impl Tonnetz {
    pub fn new(params: LatticeParams, size: f64) -> Result<Self, TonnetzError> {
        Self::with_settings(params, size, SearchSettings::default())
    }

    pub fn with_settings(
        params: LatticeParams,
        size: f64,
        settings: SearchSettings,
    ) -> Result<Self, TonnetzError> {
        let size = validate_size(size)?;
        Ok(Self {
            params,
            size,
            settings,
            basis: period_vectors(&params, &settings),
            cache: OffsetCache::new(),
        })
    }

    pub fn params(&self) -> &LatticeParams {
        &self.params
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    pub fn period_basis(&self) -> &PeriodBasis {
        &self.basis
    }

    pub fn cached_offset_entries(&self) -> usize {
        self.cache.len()
    }

    /// Replaces generators and modulus; a change invalidates cached offsets
    /// and recomputes the period basis.
    pub fn set_params(&mut self, params: LatticeParams) {
        if params == self.params {
            return;
        }
        tracing::debug!(?params, "lattice parameters changed");
        self.params = params;
        self.basis = period_vectors(&params, &self.settings);
        self.cache.clear();
    }

    pub fn set_size(&mut self, size: f64) -> Result<(), TonnetzError> {
        let size = validate_size(size)?;
        if size != self.size {
            tracing::debug!(size, "cell size changed");
            self.size = size;
            self.cache.clear();
        }
        Ok(())
    }

    pub fn set_settings(&mut self, settings: SearchSettings) {
        self.settings = settings;
        self.basis = period_vectors(&self.params, &settings);
        self.cache.clear();
    }

    pub fn label(&self, coord: AxialCoord) -> i32 {
        self.params.label(coord)
    }

    pub fn to_pixel(&self, coord: AxialCoord) -> PixelPoint {
        coords::to_pixel(coord, self.size)
    }

    pub fn to_axial(&self, point: PixelPoint) -> AxialCoord {
        coords::to_axial(point, self.size)
    }

    pub fn pixel_to_cell(&self, point: PixelPoint) -> AxialCoord {
        hit_test::pixel_to_cell(point, self.size)
    }

    pub fn solve_step(&self, step: i32) -> LatticeVector {
        solve_step(step, &self.params, &self.settings)
    }

    pub fn nearest_offsets(&mut self, step: i32, anchor: AxialCoord, need: usize) -> Vec<CongruentOffset> {
        nearest_offsets(step, &self.params, anchor, self.size, need, &self.settings, &mut self.cache)
    }

    pub fn anchor_from_click(&self, point: PixelPoint, steps: &[i32]) -> Option<AxialCoord> {
        hit_test::anchor_from_click(point, self.size, &self.params, steps, &self.settings)
    }

    /// Anchor a click on `overlay` targets: the containing shape triangle for
    /// triangle overlays (`None` if the click misses every one), otherwise the
    /// containing grid cell.
    pub fn resolve_click(&self, point: PixelPoint, overlay: &Overlay) -> Option<AxialCoord> {
        if overlay.renders_triangle() {
            self.anchor_from_click(point, &overlay.steps)
        } else {
            Some(self.pixel_to_cell(point))
        }
    }

    /// Toggles the anchor under `point` on the active overlay, creating a
    /// default overlay first if there is none.
    pub fn handle_click(&self, point: PixelPoint, overlays: &mut OverlaySet) -> Result<ToggleOutcome> {
        if !coords::is_addressable(point, self.size) {
            bail!(
                "Click position must be finite and within the lattice, got ({}, {}).",
                point.x,
                point.y
            );
        }
        if overlays.is_empty() {
            overlays.add(OverlayPreset::default(), &self.params)?;
        }
        let Some(overlay) = overlays.active_mut() else {
            bail!("No overlay is available to receive the click.");
        };
        let Some(anchor) = self.resolve_click(point, overlay) else {
            return Ok(ToggleOutcome::Ignored);
        };
        Ok(overlay.toggle_anchor(anchor, Some(&self.basis), self.settings.equivalence_tolerance))
    }

    pub fn render(&mut self, width: f64, height: f64, overlays: &OverlaySet) -> Result<RenderPlan> {
        let request = RenderRequest {
            params: self.params,
            size: self.size,
            surface_width: width,
            surface_height: height,
        };
        plan_render(&request, overlays, &self.basis, &self.settings, &mut self.cache)
    }
}

//! Geometry handed to the external renderer.
//!
//! Nothing here draws. A [`RenderPlan`] lists the visible grid cells with
//! their labels and, per visible overlay, the pixel geometry of every shape
//! instance, already expanded across the period lattice when tiling is on.

use crate::coords::{centroid, column_to_q, row_height, to_pixel, up_triangle, AxialCoord, PixelPoint};
use crate::error::{validate_size, TonnetzError};
use crate::hit_test::triangle_corners;
use crate::label::LatticeParams;
use crate::offsets::nearest_offsets;
use crate::overlay::{Overlay, OverlaySet};
use crate::period::{period_vectors, PeriodBasis};
use crate::settings::SearchSettings;
use crate::tiling::{expand_anchors, TilingBounds};
use crate::traits::OffsetMemo;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderRequest {
    pub params: LatticeParams,
    pub size: f64,
    pub surface_width: f64,
    pub surface_height: f64,
}

impl RenderRequest {
    pub fn validate(&self) -> Result<()> {
        if self.params.edo < 1 {
            bail!(TonnetzError::InvalidEdo(self.params.edo));
        }
        validate_size(self.size)?;
        let (width, height) = (self.surface_width, self.surface_height);
        if !width.is_finite() || !height.is_finite() || width <= 0.0 || height <= 0.0 {
            bail!(TonnetzError::InvalidSurface { width, height });
        }
        Ok(())
    }

    pub fn tiling_bounds(&self, settings: &SearchSettings) -> TilingBounds {
        TilingBounds {
            width: self.surface_width,
            height: self.surface_height,
            margin: settings.tiling_margin_cells * self.size,
        }
    }
}

/// One grid vertex and the upward triangle hanging below it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellGeometry {
    pub coord: AxialCoord,
    pub label: i32,
    pub apex: PixelPoint,
    pub triangle: [PixelPoint; 3],
}

/// A line from an anchor to one nearby occurrence of `step`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arm {
    pub step: i32,
    pub from: PixelPoint,
    pub to: PixelPoint,
}

/// One instance of an overlay's chord shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeGeometry {
    pub anchor: AxialCoord,
    /// Inset triangle through the first three steps, when drawn as a triangle.
    pub triangle: Option<[PixelPoint; 3]>,
    pub arms: Vec<Arm>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayRender {
    pub id: u32,
    pub color: String,
    pub opacity: f64,
    pub shapes: Vec<ShapeGeometry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderPlan {
    pub size: f64,
    pub width: f64,
    pub height: f64,
    pub basis: PeriodBasis,
    pub cells: Vec<CellGeometry>,
    pub overlays: Vec<OverlayRender>,
}

/// Grid cells covering the surface with a two-cell border on every side.
pub fn visible_cells(request: &RenderRequest) -> Vec<CellGeometry> {
    let size = request.size;
    let rows = (request.surface_height / row_height(size)).ceil() as i32 + 4;
    let cols = (request.surface_width / size).ceil() as i32 + 4;

    let mut cells = Vec::with_capacity(((rows + 2) * (cols + 2)).max(0) as usize);
    for row in -2..rows {
        for col in -2..cols {
            let coord = AxialCoord::new(column_to_q(col, row), row);
            let apex = to_pixel(coord, size);
            cells.push(CellGeometry {
                coord,
                label: request.params.label(coord),
                apex,
                triangle: up_triangle(apex, size),
            });
        }
    }
    cells
}

/// Shape geometry for `overlay` at `anchor`, or `None` when its triangle
/// steps cannot be resolved on this lattice.
pub fn shape_at<M: OffsetMemo>(
    anchor: AxialCoord,
    overlay: &Overlay,
    params: &LatticeParams,
    size: f64,
    settings: &SearchSettings,
    memo: &mut M,
) -> Option<ShapeGeometry> {
    let anchor_px = to_pixel(anchor, size);

    let (triangle, arm_steps) = if overlay.renders_triangle() {
        let corners = triangle_corners(&overlay.steps, params, settings)?;
        let vertices = corners.map(|corner| to_pixel(anchor.offset(corner), size));
        let center = centroid(&vertices);
        let inset = vertices.map(|p| p.scaled_toward(center, settings.triangle_inset));
        (Some(inset), &overlay.steps[3..])
    } else {
        (None, &overlay.steps[..])
    };

    let mut arms = Vec::new();
    for &step in arm_steps {
        let step = params.normalize(step);
        let offsets = nearest_offsets(step, params, anchor, size, settings.arms_per_step, settings, memo);
        arms.extend(offsets.iter().map(|offset| Arm {
            step,
            from: anchor_px,
            to: to_pixel(anchor.offset(offset.vector), size),
        }));
    }

    Some(ShapeGeometry {
        anchor,
        triangle,
        arms,
    })
}

/// Placed anchors, expanded across the period lattice when the overlay tiles.
/// Anchors outside `±COORD_LIMIT` are never drawn.
pub fn render_anchors(
    overlay: &Overlay,
    request: &RenderRequest,
    basis: &PeriodBasis,
    settings: &SearchSettings,
) -> Vec<AxialCoord> {
    if overlay.repeat_all {
        expand_anchors(
            &overlay.anchors,
            basis,
            &request.tiling_bounds(settings),
            request.size,
            settings,
        )
    } else {
        overlay.anchors.iter().copied().filter(|a| a.is_addressable()).collect()
    }
}

pub fn plan_render<M: OffsetMemo>(
    request: &RenderRequest,
    overlays: &OverlaySet,
    basis: &PeriodBasis,
    settings: &SearchSettings,
    memo: &mut M,
) -> Result<RenderPlan> {
    request.validate()?;

    let mut rendered = Vec::new();
    for overlay in overlays.iter().filter(|o| o.visible) {
        let anchors = render_anchors(overlay, request, basis, settings);
        let shapes: Vec<ShapeGeometry> = anchors
            .into_iter()
            .filter_map(|anchor| shape_at(anchor, overlay, &request.params, request.size, settings, memo))
            .collect();
        if shapes.is_empty() && !overlay.anchors.is_empty() {
            tracing::debug!(id = overlay.id, steps = ?overlay.steps, "overlay has no renderable shapes");
        }
        rendered.push(OverlayRender {
            id: overlay.id,
            color: overlay.color.clone(),
            opacity: overlay.opacity,
            shapes,
        });
    }

    Ok(RenderPlan {
        size: request.size,
        width: request.surface_width,
        height: request.surface_height,
        basis: *basis,
        cells: visible_cells(request),
        overlays: rendered,
    })
}

/// [`plan_render`] with the period basis computed from the request.
pub fn plan_render_fresh<M: OffsetMemo>(
    request: &RenderRequest,
    overlays: &OverlaySet,
    settings: &SearchSettings,
    memo: &mut M,
) -> Result<RenderPlan> {
    request.validate()?;
    let basis = period_vectors(&request.params, settings);
    plan_render(request, overlays, &basis, settings, memo)
}

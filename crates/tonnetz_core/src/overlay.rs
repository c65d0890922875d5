//! Overlay records and the set of overlays placed on a diagram.

use crate::coords::AxialCoord;
use crate::error::TonnetzError;
use crate::label::LatticeParams;
use crate::period::PeriodBasis;
use crate::tiling::find_equivalent_anchor;
use serde::{Deserialize, Serialize};

pub const PALETTE: [&str; 7] = [
    "#00AA00", "#AA00AA", "#00AAAA", "#AA5500", "#0055AA", "#AA0055", "#557700",
];

pub const DEFAULT_OPACITY: f64 = 0.35;

/// A chord shape and the anchors it is placed at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overlay {
    pub id: u32,
    pub visible: bool,
    /// Pitch classes relative to the anchor; the first three form the triangle.
    pub steps: Vec<i32>,
    /// Passed through to the renderer untouched.
    pub color: String,
    pub opacity: f64,
    /// Explicitly placed anchors, unique, in placement order.
    pub anchors: Vec<AxialCoord>,
    /// Repeat every anchor along the period lattice.
    pub repeat_all: bool,
    /// Draw every step as arms instead of a triangle.
    pub non_triangle_mode: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ToggleOutcome {
    Added { anchor: AxialCoord },
    Removed { anchor: AxialCoord },
    Ignored,
}

impl Overlay {
    pub fn new(id: u32, steps: Vec<i32>, color: String, opacity: f64) -> Result<Self, TonnetzError> {
        if steps.is_empty() {
            return Err(TonnetzError::EmptySteps);
        }
        if !opacity.is_finite() || !(0.0..=1.0).contains(&opacity) {
            return Err(TonnetzError::InvalidOpacity(opacity));
        }
        Ok(Self {
            id,
            visible: true,
            steps,
            color,
            opacity,
            anchors: Vec::new(),
            repeat_all: false,
            non_triangle_mode: false,
        })
    }

    /// Whether clicks and rendering use the triangle formed by the first three steps.
    pub fn renders_triangle(&self) -> bool {
        self.steps.len() >= 3 && !self.non_triangle_mode
    }

    /// Removes `anchor` if it is placed, or the placed anchor it repeats when
    /// the overlay tiles; otherwise places it.
    pub fn toggle_anchor(
        &mut self,
        anchor: AxialCoord,
        basis: Option<&PeriodBasis>,
        tolerance: f64,
    ) -> ToggleOutcome {
        if let Some(index) = self.anchors.iter().position(|a| *a == anchor) {
            let removed = self.anchors.remove(index);
            return ToggleOutcome::Removed { anchor: removed };
        }
        if self.repeat_all {
            if let Some(basis) = basis {
                if let Some(index) = find_equivalent_anchor(anchor, &self.anchors, basis, tolerance) {
                    let removed = self.anchors.remove(index);
                    return ToggleOutcome::Removed { anchor: removed };
                }
            }
        }
        self.anchors.push(anchor);
        ToggleOutcome::Added { anchor }
    }
}

/// Optional starting values for a new overlay.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverlayPreset {
    pub steps: Option<Vec<i32>>,
    pub color: Option<String>,
    pub opacity: Option<f64>,
    #[serde(default)]
    pub anchors: Vec<AxialCoord>,
}

/// Steps for the overlay added after `existing` others: a downward triangle
/// `[0, z, x]`, then its inversion `[0, x − z, x]`, then a major triad.
pub fn default_steps(existing: usize, params: &LatticeParams) -> Vec<i32> {
    let x = params.normalize(params.interval_x);
    let z = params.normalize(params.interval_z);
    match existing {
        0 => vec![0, z, x],
        1 => vec![0, params.normalize(x - z), x],
        _ => vec![0, 4, 7],
    }
}

/// Clamps into `[min, max]`, substituting `fallback` for non-finite input.
pub fn clamp_or(value: f64, min: f64, max: f64, fallback: f64) -> f64 {
    let value = if value.is_finite() { value } else { fallback };
    value.max(min).min(max)
}

/// Leading integer of `token`, ignoring anything after the digits.
fn parse_leading_int(token: &str) -> Option<i32> {
    let token = token.trim();
    let (sign, digits) = match token.as_bytes().first()? {
        b'-' => (-1, &token[1..]),
        b'+' => (1, &token[1..]),
        _ => (1, token),
    };
    let end = digits
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(digits.len(), |(i, _)| i);
    let value: i32 = digits[..end].parse().ok()?;
    Some(sign * value)
}

/// Parses a comma- or whitespace-separated step list. Tokens without a
/// leading integer become 0; empty input yields `[0]`.
pub fn parse_chord_steps(text: &str) -> Vec<i32> {
    let steps: Vec<i32> = text
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(|token| parse_leading_int(token).unwrap_or(0))
        .collect();
    if steps.is_empty() {
        vec![0]
    } else {
        steps
    }
}

/// All overlays on a diagram and which one receives clicks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlaySet {
    overlays: Vec<Overlay>,
    next_id: u32,
    active: Option<u32>,
}

impl Default for OverlaySet {
    fn default() -> Self {
        Self {
            overlays: Vec::new(),
            next_id: 1,
            active: None,
        }
    }
}

impl OverlaySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.overlays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Overlay> {
        self.overlays.iter()
    }

    /// Adds an overlay and makes it active.
    pub fn add(&mut self, preset: OverlayPreset, params: &LatticeParams) -> Result<u32, TonnetzError> {
        let id = self.next_id;
        let steps = preset
            .steps
            .unwrap_or_else(|| default_steps(self.overlays.len(), params));
        let color = preset
            .color
            .unwrap_or_else(|| PALETTE[(id as usize - 1) % PALETTE.len()].to_string());
        let opacity = preset.opacity.unwrap_or(DEFAULT_OPACITY);

        let mut overlay = Overlay::new(id, steps, color, opacity)?;
        for anchor in preset.anchors {
            if !overlay.anchors.contains(&anchor) {
                overlay.anchors.push(anchor);
            }
        }
        self.overlays.push(overlay);
        self.next_id += 1;
        self.active = Some(id);
        Ok(id)
    }

    /// Removes an overlay; if it was active, the first remaining one becomes active.
    pub fn remove(&mut self, id: u32) -> Result<Overlay, TonnetzError> {
        let index = self
            .overlays
            .iter()
            .position(|o| o.id == id)
            .ok_or(TonnetzError::UnknownOverlay(id))?;
        let removed = self.overlays.remove(index);
        if self.active == Some(id) {
            self.active = self.overlays.first().map(|o| o.id);
        }
        Ok(removed)
    }

    pub fn get(&self, id: u32) -> Result<&Overlay, TonnetzError> {
        self.overlays
            .iter()
            .find(|o| o.id == id)
            .ok_or(TonnetzError::UnknownOverlay(id))
    }

    pub fn get_mut(&mut self, id: u32) -> Result<&mut Overlay, TonnetzError> {
        self.overlays
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or(TonnetzError::UnknownOverlay(id))
    }

    pub fn active_id(&self) -> Option<u32> {
        self.active
    }

    /// The active overlay, falling back to the first one.
    pub fn active_mut(&mut self) -> Option<&mut Overlay> {
        let id = self.active.or_else(|| self.overlays.first().map(|o| o.id))?;
        self.active = Some(id);
        self.overlays.iter_mut().find(|o| o.id == id)
    }

    pub fn set_active(&mut self, id: u32) -> Result<(), TonnetzError> {
        self.get(id)?;
        self.active = Some(id);
        Ok(())
    }

    pub fn clear_anchors(&mut self, id: u32) -> Result<(), TonnetzError> {
        self.get_mut(id)?.anchors.clear();
        Ok(())
    }

    pub fn set_steps(&mut self, id: u32, steps: Vec<i32>) -> Result<(), TonnetzError> {
        if steps.is_empty() {
            return Err(TonnetzError::EmptySteps);
        }
        self.get_mut(id)?.steps = steps;
        Ok(())
    }

    /// Sets opacity, clamped into `[0, 1]`; non-finite values reset to the default.
    pub fn set_opacity(&mut self, id: u32, opacity: f64) -> Result<(), TonnetzError> {
        self.get_mut(id)?.opacity = clamp_or(opacity, 0.0, 1.0, DEFAULT_OPACITY);
        Ok(())
    }

    pub fn set_color(&mut self, id: u32, color: String) -> Result<(), TonnetzError> {
        self.get_mut(id)?.color = color;
        Ok(())
    }

    pub fn set_visible(&mut self, id: u32, visible: bool) -> Result<(), TonnetzError> {
        self.get_mut(id)?.visible = visible;
        Ok(())
    }

    pub fn set_repeat_all(&mut self, id: u32, repeat_all: bool) -> Result<(), TonnetzError> {
        self.get_mut(id)?.repeat_all = repeat_all;
        Ok(())
    }

    pub fn set_non_triangle_mode(&mut self, id: u32, enabled: bool) -> Result<(), TonnetzError> {
        self.get_mut(id)?.non_triangle_mode = enabled;
        Ok(())
    }
}

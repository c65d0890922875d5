//! Overlay management and click handling for `WasmTonnetz`.

use crate::lattice::{coord_pair, js_error, WasmTonnetz};
use serde_wasm_bindgen::{from_value, to_value};
use tonnetz_core::overlay::parse_chord_steps;
use tonnetz_core::{AxialCoord, OverlayPreset, PixelPoint, TonnetzError};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
impl WasmTonnetz {
    /// Adds an overlay with default steps, color and opacity, returning its id.
    pub fn add_overlay(&mut self) -> Result<u32, JsValue> {
        self.overlays
            .add(OverlayPreset::default(), self.engine.params())
            .map_err(js_error)
    }

    /// Adds an overlay from a serialized `OverlayPreset`; missing fields use defaults.
    pub fn add_overlay_preset(&mut self, preset: JsValue) -> Result<u32, JsValue> {
        let preset: OverlayPreset = if preset.is_undefined() || preset.is_null() {
            OverlayPreset::default()
        } else {
            from_value(preset).map_err(|err| JsValue::from_str(&format!("Invalid overlay preset: {err}")))?
        };
        self.overlays.add(preset, self.engine.params()).map_err(js_error)
    }

    pub fn remove_overlay(&mut self, id: u32) -> Result<(), JsValue> {
        self.overlays.remove(id).map(|_| ()).map_err(js_error)
    }

    pub fn overlay_count(&self) -> usize {
        self.overlays.len()
    }

    pub fn overlay_ids(&self) -> Vec<u32> {
        self.overlays.iter().map(|overlay| overlay.id).collect()
    }

    pub fn active_overlay(&self) -> Option<u32> {
        self.overlays.active_id()
    }

    pub fn set_active_overlay(&mut self, id: u32) -> Result<(), JsValue> {
        self.overlays.set_active(id).map_err(js_error)
    }

    pub fn clear_overlay(&mut self, id: u32) -> Result<(), JsValue> {
        self.overlays.clear_anchors(id).map_err(js_error)
    }

    pub fn set_overlay_steps(&mut self, id: u32, steps: Vec<i32>) -> Result<(), JsValue> {
        self.overlays.set_steps(id, steps).map_err(js_error)
    }

    /// Sets steps from user text such as `"0, 4, 7"`.
    pub fn set_overlay_steps_text(&mut self, id: u32, text: &str) -> Result<(), JsValue> {
        self.overlays.set_steps(id, parse_chord_steps(text)).map_err(js_error)
    }

    pub fn set_overlay_opacity(&mut self, id: u32, opacity: f64) -> Result<(), JsValue> {
        self.overlays.set_opacity(id, opacity).map_err(js_error)
    }

    pub fn set_overlay_color(&mut self, id: u32, color: String) -> Result<(), JsValue> {
        self.overlays.set_color(id, color).map_err(js_error)
    }

    pub fn set_overlay_visible(&mut self, id: u32, visible: bool) -> Result<(), JsValue> {
        self.overlays.set_visible(id, visible).map_err(js_error)
    }

    pub fn set_overlay_repeat_all(&mut self, id: u32, repeat_all: bool) -> Result<(), JsValue> {
        self.overlays.set_repeat_all(id, repeat_all).map_err(js_error)
    }

    pub fn set_overlay_non_triangle_mode(&mut self, id: u32, enabled: bool) -> Result<(), JsValue> {
        self.overlays.set_non_triangle_mode(id, enabled).map_err(js_error)
    }

    /// Flattened `[q0, r0, q1, r1, ...]` of the explicitly placed anchors.
    pub fn overlay_anchors(&self, id: u32) -> Result<Vec<i32>, JsValue> {
        let overlay = self.overlays.get(id).map_err(js_error)?;
        Ok(overlay.anchors.iter().flat_map(|anchor| coord_pair(*anchor)).collect())
    }

    pub fn get_overlay(&self, id: u32) -> Result<JsValue, JsValue> {
        let overlay = self.overlays.get(id).map_err(js_error)?;
        to_value(overlay).map_err(|err| JsValue::from_str(&format!("Failed to serialize overlay: {err}")))
    }

    /// Toggles the anchor under the pointer on the active overlay and returns
    /// the serialized `ToggleOutcome`.
    pub fn handle_click(&mut self, x: f64, y: f64) -> Result<JsValue, JsValue> {
        let outcome = self
            .engine
            .handle_click(PixelPoint::new(x, y), &mut self.overlays)
            .map_err(|err| JsValue::from_str(&format!("Click handling failed: {err:#}")))?;
        to_value(&outcome).map_err(|err| JsValue::from_str(&format!("Failed to serialize outcome: {err}")))
    }

    /// Places an anchor directly, bypassing hit testing. Returns whether the
    /// anchor ended up placed.
    pub fn toggle_anchor(&mut self, id: u32, q: i32, r: i32) -> Result<bool, JsValue> {
        let anchor = AxialCoord::new(q, r);
        if !anchor.is_addressable() {
            return Err(js_error(TonnetzError::AnchorOutOfRange { q, r }));
        }
        let basis = *self.engine.period_basis();
        let tolerance = self.engine.settings().equivalence_tolerance;
        let overlay = self.overlays.get_mut(id).map_err(js_error)?;
        let outcome = overlay.toggle_anchor(anchor, Some(&basis), tolerance);
        Ok(matches!(outcome, tonnetz_core::ToggleOutcome::Added { .. }))
    }
}

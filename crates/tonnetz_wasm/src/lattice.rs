//! Lattice geometry bindings.

use anyhow::{Context, Result};
use js_sys::{Float64Array, Int32Array};
use serde_wasm_bindgen::{from_value, to_value};
use tonnetz_core::{
    AxialCoord, LatticeParams, LatticeVector, OverlaySet, PixelPoint, SearchSettings, Tonnetz,
};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct WasmTonnetz {
    pub(crate) engine: Tonnetz,
    pub(crate) overlays: OverlaySet,
}

pub(crate) fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

pub(crate) fn build_params(interval_x: i32, interval_z: i32, edo: i32) -> Result<LatticeParams> {
    LatticeParams::new(interval_x, interval_z, edo).context("Invalid lattice parameters")
}

pub(crate) fn coord_pair(coord: AxialCoord) -> Vec<i32> {
    vec![coord.q, coord.r]
}

fn vector_pair(vector: LatticeVector) -> Vec<i32> {
    vec![vector.u, vector.v]
}

#[wasm_bindgen]
impl WasmTonnetz {
    #[wasm_bindgen(constructor)]
    pub fn new(interval_x: i32, interval_z: i32, edo: i32, size: f64) -> Result<WasmTonnetz, JsValue> {
        console_error_panic_hook::set_once();

        let params = build_params(interval_x, interval_z, edo).map_err(|e| js_error(format!("{e:#}")))?;
        let engine = Tonnetz::new(params, size).map_err(js_error)?;
        Ok(WasmTonnetz {
            engine,
            overlays: OverlaySet::new(),
        })
    }

    /// Updates generators and modulus; cached offsets are dropped when they change.
    pub fn set_params(&mut self, interval_x: i32, interval_z: i32, edo: i32) -> Result<(), JsValue> {
        let params = build_params(interval_x, interval_z, edo).map_err(|e| js_error(format!("{e:#}")))?;
        self.engine.set_params(params);
        Ok(())
    }

    pub fn set_size(&mut self, size: f64) -> Result<(), JsValue> {
        self.engine.set_size(size).map_err(js_error)
    }

    pub fn get_size(&self) -> f64 {
        self.engine.size()
    }

    pub fn get_settings(&self) -> Result<JsValue, JsValue> {
        to_value(self.engine.settings())
            .map_err(|err| JsValue::from_str(&format!("Failed to serialize settings: {err}")))
    }

    pub fn set_settings(&mut self, settings: JsValue) -> Result<(), JsValue> {
        let settings: SearchSettings = from_value(settings)
            .map_err(|err| JsValue::from_str(&format!("Invalid search settings: {err}")))?;
        self.engine.set_settings(settings);
        Ok(())
    }

    pub fn label(&self, q: i32, r: i32) -> i32 {
        self.engine.label(AxialCoord::new(q, r))
    }

    /// `[x, y]` of the vertex `(q, r)`.
    pub fn to_pixel(&self, q: i32, r: i32) -> Vec<f64> {
        let point = self.engine.to_pixel(AxialCoord::new(q, r));
        vec![point.x, point.y]
    }

    /// Pixel positions of many vertices; `coords` is flattened `[q0, r0, q1, r1, ...]`.
    pub fn to_pixels(&self, coords: &[i32]) -> Float64Array {
        let points: Vec<f64> = coords
            .chunks_exact(2)
            .flat_map(|pair| {
                let point = self.engine.to_pixel(AxialCoord::new(pair[0], pair[1]));
                [point.x, point.y]
            })
            .collect();
        Float64Array::from(points.as_slice())
    }

    pub fn to_axial(&self, x: f64, y: f64) -> Vec<i32> {
        coord_pair(self.engine.to_axial(PixelPoint::new(x, y)))
    }

    pub fn pixel_to_cell(&self, x: f64, y: f64) -> Vec<i32> {
        coord_pair(self.engine.pixel_to_cell(PixelPoint::new(x, y)))
    }

    /// `[q, r]` of the overlay anchor whose triangle contains the point, if any.
    pub fn anchor_from_click(&self, x: f64, y: f64, steps: Vec<i32>) -> Option<Vec<i32>> {
        self.engine
            .anchor_from_click(PixelPoint::new(x, y), &steps)
            .map(coord_pair)
    }

    /// `[p1.u, p1.v, p2.u, p2.v]`.
    pub fn period_vectors(&self) -> Vec<i32> {
        let basis = self.engine.period_basis();
        let mut out = vector_pair(basis.p1);
        out.extend(vector_pair(basis.p2));
        out
    }

    pub fn solve_step(&self, step: i32) -> Vec<i32> {
        vector_pair(self.engine.solve_step(step))
    }

    /// Flattened `[u0, v0, u1, v1, ...]`, nearest first.
    pub fn nearest_offsets(&mut self, step: i32, anchor_q: i32, anchor_r: i32, need: u32) -> Vec<i32> {
        self.engine
            .nearest_offsets(step, AxialCoord::new(anchor_q, anchor_r), need as usize)
            .iter()
            .flat_map(|offset| vector_pair(offset.vector))
            .collect()
    }

    pub fn nearest_offsets_typed(&mut self, step: i32, anchor_q: i32, anchor_r: i32, need: u32) -> Int32Array {
        let flat = self.nearest_offsets(step, anchor_q, anchor_r, need);
        Int32Array::from(flat.as_slice())
    }

    /// Geometry for one frame of a `width` x `height` surface.
    pub fn render_plan(&mut self, width: f64, height: f64) -> Result<JsValue, JsValue> {
        let plan = self
            .engine
            .render(width, height, &self.overlays)
            .map_err(|err| JsValue::from_str(&format!("Render planning failed: {err}")))?;
        to_value(&plan).map_err(|err| JsValue::from_str(&format!("Failed to serialize render plan: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tonnetz() -> WasmTonnetz {
        WasmTonnetz::new(7, 4, 12, 40.0).expect("tonnetz")
    }

    #[test]
    fn build_params_reports_context() {
        let err = build_params(7, 4, 0).expect_err("edo 0");
        let message = format!("{err:#}");
        assert!(message.contains("Invalid lattice parameters"));
        assert!(message.contains("EDO must be at least 1"));
    }

    #[test]
    fn label_and_transforms_match_core() {
        let tonnetz = tonnetz();
        assert_eq!(tonnetz.label(2, 3), 2);
        let pixel = tonnetz.to_pixel(0, 1);
        assert_eq!(pixel[0], 20.0);
        assert_eq!(tonnetz.to_axial(pixel[0], pixel[1]), vec![0, 1]);
        assert_eq!(tonnetz.pixel_to_cell(pixel[0] + 0.01, pixel[1] + 1.0), vec![0, 1]);
    }

    #[test]
    fn solvers_are_exposed_as_flat_pairs() {
        let mut tonnetz = tonnetz();
        assert_eq!(tonnetz.period_vectors(), vec![0, -3, -4, 1]);
        assert_eq!(tonnetz.solve_step(7), vec![1, 0]);

        let offsets = tonnetz.nearest_offsets(7, 0, 0, 4);
        assert_eq!(offsets.len(), 8);
        for pair in offsets.chunks_exact(2) {
            assert_eq!(tonnetz.label(pair[0], pair[1]), 7);
        }
    }

    #[test]
    fn anchor_from_click_returns_pair_or_none() {
        let tonnetz = tonnetz();
        let centroid_x = 20.0;
        let centroid_y = tonnetz_core::coords::row_height(40.0) / 3.0;
        assert_eq!(
            tonnetz.anchor_from_click(centroid_x, centroid_y, vec![0, 4, 7]),
            Some(vec![0, 0])
        );
        assert_eq!(tonnetz.anchor_from_click(centroid_x, centroid_y, vec![0, 4]), None);
    }

    #[test]
    fn params_and_size_updates_apply() {
        let mut tonnetz = tonnetz();
        tonnetz.set_params(3, 5, 12).expect("params");
        assert_eq!(tonnetz.label(1, 1), 8);
        tonnetz.set_size(20.0).expect("size");
        assert_eq!(tonnetz.get_size(), 20.0);
        assert_eq!(tonnetz.to_pixel(1, 0), vec![20.0, 0.0]);
    }

    #[cfg(target_arch = "wasm32")]
    mod wasm {
        use super::*;
        use wasm_bindgen_test::wasm_bindgen_test;

        #[wasm_bindgen_test]
        fn rejects_invalid_edo() {
            let result = WasmTonnetz::new(7, 4, 0, 40.0);
            let message = result.err().and_then(|err| err.as_string()).unwrap_or_default();
            assert!(message.contains("EDO"));
        }

        #[wasm_bindgen_test]
        fn settings_round_trip_through_js() {
            let mut tonnetz = tonnetz();
            let value = tonnetz.get_settings().expect("settings");
            tonnetz.set_settings(value).expect("set settings");
            assert_eq!(*tonnetz.engine.settings(), SearchSettings::default());
        }

        #[wasm_bindgen_test]
        fn render_plan_rejects_empty_surface() {
            let mut tonnetz = tonnetz();
            assert!(tonnetz.render_plan(0.0, 0.0).is_err());
            assert!(tonnetz.render_plan(400.0, 300.0).is_ok());
        }

        #[wasm_bindgen_test]
        fn typed_offsets_match_vec_offsets() {
            let mut tonnetz = tonnetz();
            let typed = tonnetz.nearest_offsets_typed(4, 1, 1, 3).to_vec();
            assert_eq!(typed, tonnetz.nearest_offsets(4, 1, 1, 3));
            assert_eq!(tonnetz.to_pixels(&[1, 0, 0, 1]).to_vec(), vec![40.0, 0.0, 20.0, tonnetz.to_pixel(0, 1)[1]]);
        }
    }
}

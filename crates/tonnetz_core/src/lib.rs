//! The `tonnetz_core` crate provides the lattice geometry engine behind the Tonnetz viewer.
//! Every vertex of a triangular tiling carries the pitch class `(x·q + z·r) mod edo`;
//! the engine maps between that lattice and raster pixels and resolves chord-shape overlays.
//!
//! Key components:
//! - **Coordinates**: `AxialCoord`/`PixelPoint` and the forward/inverse raster transform.
//! - **Solvers**: period vectors (`period`), step vectors (`step`) and pixel-nearest congruent offsets (`offsets`).
//! - **Hit testing**: exact cell and overlay-anchor resolution for pointer clicks.
//! - **Tiling & rendering**: periodic anchor expansion and the geometry plan handed to the renderer.
//! - **Engine**: `Tonnetz`, which owns parameters and the offset cache and keeps them consistent.

pub mod coords;
pub mod engine;
pub mod error;
pub mod label;
pub mod offsets;
pub mod overlay;
pub mod period;
pub mod render;
pub mod settings;
pub mod step;
pub mod tiling;
pub mod traits;

pub use coords::{AxialCoord, LatticeVector, PixelPoint};
pub use engine::Tonnetz;
pub use error::TonnetzError;
pub use label::{label, LatticeParams};
pub use overlay::{Overlay, OverlayPreset, OverlaySet, ToggleOutcome};
pub use period::PeriodBasis;
pub use render::RenderPlan;
pub use settings::SearchSettings;

//! WASM bindings for the Tonnetz core library.
//!
//! `WasmTonnetz` is split across modules: `lattice` holds the struct and the
//! coordinate/solver methods, `overlays` the overlay state and click handling.

mod lattice;
mod overlays;

pub use lattice::WasmTonnetz;

use thiserror::Error;

/// Configuration errors raised when building lattice parameters or overlays.
///
/// The lattice searches themselves never fail; they return degenerate
/// results instead (see [`crate::step::try_solve_step`]).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TonnetzError {
    #[error("EDO must be at least 1, got {0}")]
    InvalidEdo(i32),
    #[error("Cell size must be finite and positive, got {0}")]
    InvalidCellSize(f64),
    #[error("Surface dimensions must be finite and positive, got {width}x{height}")]
    InvalidSurface { width: f64, height: f64 },
    #[error("Opacity must lie in [0, 1], got {0}")]
    InvalidOpacity(f64),
    #[error("Overlay needs at least one step")]
    EmptySteps,
    #[error("Unknown overlay id {0}")]
    UnknownOverlay(u32),
    #[error("Anchor ({q}, {r}) lies outside the addressable lattice")]
    AnchorOutOfRange { q: i32, r: i32 },
}

pub fn validate_size(size: f64) -> Result<f64, TonnetzError> {
    if size.is_finite() && size > 0.0 {
        Ok(size)
    } else {
        Err(TonnetzError::InvalidCellSize(size))
    }
}

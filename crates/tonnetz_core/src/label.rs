use crate::coords::{AxialCoord, LatticeVector};
use crate::error::TonnetzError;
use serde::{Deserialize, Serialize};

/// Generators and modulus of the labelling `(x·q + z·r) mod edo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LatticeParams {
    pub interval_x: i32,
    pub interval_z: i32,
    pub edo: i32,
}

impl LatticeParams {
    pub fn new(interval_x: i32, interval_z: i32, edo: i32) -> Result<Self, TonnetzError> {
        if edo < 1 {
            return Err(TonnetzError::InvalidEdo(edo));
        }
        Ok(Self {
            interval_x,
            interval_z,
            edo,
        })
    }

    /// Pitch class at `coord`.
    pub fn label(&self, coord: AxialCoord) -> i32 {
        label(coord.q, coord.r, self.interval_x, self.interval_z, self.edo)
    }

    /// Pitch-class step realised by moving along `vector`.
    pub fn step_of(&self, vector: LatticeVector) -> i32 {
        label(vector.u, vector.v, self.interval_x, self.interval_z, self.edo)
    }

    pub fn is_congruent(&self, vector: LatticeVector, step: i32) -> bool {
        self.step_of(vector) == self.normalize(step)
    }

    /// Maps any integer step into `[0, edo)`.
    pub fn normalize(&self, step: i32) -> i32 {
        modulo(step as i64, self.edo)
    }
}

/// `((x·q + z·r) mod edo + edo) mod edo`, computed in 64-bit so large
/// coordinates do not overflow.
pub fn label(q: i32, r: i32, interval_x: i32, interval_z: i32, edo: i32) -> i32 {
    let value = interval_x as i64 * q as i64 + interval_z as i64 * r as i64;
    modulo(value, edo)
}

fn modulo(value: i64, edo: i32) -> i32 {
    value.rem_euclid(edo.max(1) as i64) as i32
}

pub fn gcd(a: i64, b: i64) -> i64 {
    let (mut a, mut b) = (a.abs(), b.abs());
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// Number of distinct labels on the lattice, which is also the area
/// (`|cross|`) of any basis of the label-preserving sublattice.
pub fn sublattice_index(params: &LatticeParams) -> i64 {
    let edo = params.edo as i64;
    let g = gcd(gcd(params.interval_x as i64, params.interval_z as i64), edo);
    edo / g.max(1)
}

//! Axial lattice coordinates and the raster transform.
//!
//! The tiling alternates row parity: odd rows are shifted right by half a
//! cell. Written out, `x = size * (q + r / 2)` and `y = r * size * √3 / 2`,
//! so the forward map is linear even though it is expressed through
//! column/offset terms.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

pub const SQRT3_HALF: f64 = 0.866_025_403_784_438_6;

/// Largest axial index the engine resolves or draws. Pixel lookups clamp to
/// it, so neighbour and offset arithmetic stays well inside `i32`.
pub const COORD_LIMIT: i32 = 1 << 28;

/// Integer vertex of the triangular tiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AxialCoord {
    pub q: i32,
    pub r: i32,
}

impl AxialCoord {
    pub const ORIGIN: AxialCoord = AxialCoord { q: 0, r: 0 };

    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    pub fn offset(self, by: LatticeVector) -> Self {
        Self::new(self.q + by.u, self.r + by.v)
    }

    pub fn is_addressable(self) -> bool {
        self.q.abs() <= COORD_LIMIT && self.r.abs() <= COORD_LIMIT
    }
}

/// Integer displacement between two axial coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LatticeVector {
    pub u: i32,
    pub v: i32,
}

impl LatticeVector {
    pub const ZERO: LatticeVector = LatticeVector { u: 0, v: 0 };

    pub const fn new(u: i32, v: i32) -> Self {
        Self { u, v }
    }

    pub fn is_zero(self) -> bool {
        self.u == 0 && self.v == 0
    }

    /// Manhattan norm `|u| + |v|`, the tie-break used by every lattice search.
    pub fn manhattan(self) -> i32 {
        self.u.abs() + self.v.abs()
    }

    /// z-component of the 2D cross product; zero iff the vectors are collinear.
    pub fn cross(self, other: LatticeVector) -> i64 {
        self.u as i64 * other.v as i64 - self.v as i64 * other.u as i64
    }

    /// The same vector rotated a quarter turn in index space.
    pub fn rotated(self) -> Self {
        Self::new(-self.v, self.u)
    }
}

impl Add for LatticeVector {
    type Output = LatticeVector;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.u + rhs.u, self.v + rhs.v)
    }
}

impl Mul<i32> for LatticeVector {
    type Output = LatticeVector;

    fn mul(self, rhs: i32) -> Self {
        Self::new(self.u * rhs, self.v * rhs)
    }
}

impl Sub for AxialCoord {
    type Output = LatticeVector;

    fn sub(self, rhs: Self) -> LatticeVector {
        LatticeVector::new(self.q - rhs.q, self.r - rhs.r)
    }
}

/// Continuous position on the render surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_squared(self, other: PixelPoint) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Moves the point toward `center`, keeping `factor` of its distance.
    pub fn scaled_toward(self, center: PixelPoint, factor: f64) -> Self {
        Self::new(
            center.x + (self.x - center.x) * factor,
            center.y + (self.y - center.y) * factor,
        )
    }
}

pub fn centroid(points: &[PixelPoint; 3]) -> PixelPoint {
    PixelPoint::new(
        (points[0].x + points[1].x + points[2].x) / 3.0,
        (points[0].y + points[1].y + points[2].y) / 3.0,
    )
}

/// Floored or rounded index clamped into `±COORD_LIMIT`; NaN maps to 0.
pub fn clamp_index(value: f64) -> i32 {
    if value.is_nan() {
        return 0;
    }
    value.clamp(-f64::from(COORD_LIMIT), f64::from(COORD_LIMIT)) as i32
}

/// Whether `point` resolves to a vertex well inside `±COORD_LIMIT`, leaving
/// room for candidate neighbours and shape corners around it.
pub fn is_addressable(point: PixelPoint, size: f64) -> bool {
    let reach = f64::from(COORD_LIMIT / 4);
    point.x.is_finite()
        && point.y.is_finite()
        && (point.x / size).abs() < reach
        && (point.y / row_height(size)).abs() < reach
}

/// Height of one row of triangles.
pub fn row_height(size: f64) -> f64 {
    size * SQRT3_HALF
}

/// Horizontal shift applied to `row`; odd rows (negative ones included) move half a cell.
pub fn row_offset(row: i32, size: f64) -> f64 {
    row.rem_euclid(2) as f64 * (size / 2.0)
}

/// Axial `q` for a raster column within `row`.
pub fn column_to_q(col: i32, row: i32) -> i32 {
    col - row.div_euclid(2)
}

/// Raster column of `(q, r)`.
pub fn q_to_column(q: i32, r: i32) -> i32 {
    q + r.div_euclid(2)
}

pub fn to_pixel(coord: AxialCoord, size: f64) -> PixelPoint {
    let col = q_to_column(coord.q, coord.r);
    let x = col as f64 * size + row_offset(coord.r, size);
    let y = coord.r as f64 * row_height(size);
    PixelPoint::new(x, y)
}

/// Pixel displacement of a lattice vector. The forward map is linear, so
/// this is the same as `to_pixel(a + vector) - to_pixel(a)` for any `a`.
pub fn vector_to_pixel(vector: LatticeVector, size: f64) -> PixelPoint {
    PixelPoint::new(
        size * (vector.u as f64 + vector.v as f64 / 2.0),
        vector.v as f64 * row_height(size),
    )
}

/// Nearest-vertex approximation used to seed candidate searches.
/// Points near shared edges may land on a neighbour; use
/// [`crate::hit_test::pixel_to_cell`] for ground truth.
pub fn to_axial(point: PixelPoint, size: f64) -> AxialCoord {
    let row = clamp_index((point.y / row_height(size)).round());
    let col = clamp_index(((point.x - row_offset(row, size)) / size).round());
    AxialCoord::new(column_to_q(col, row), row)
}

/// Vertices of the upward triangle hanging below `apex`.
pub fn up_triangle(apex: PixelPoint, size: f64) -> [PixelPoint; 3] {
    let h = row_height(size);
    [
        apex,
        PixelPoint::new(apex.x + size / 2.0, apex.y + h),
        PixelPoint::new(apex.x - size / 2.0, apex.y + h),
    ]
}

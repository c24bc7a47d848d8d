//! Fixed-point cell and world geometry.
//!
//! # Units
//!
//! - `CPos` / `CVec` are integer cell-grid coordinates.  `+x` is east, `+y`
//!   is south.
//! - `WPos` / `WVec` are integer world units.  One cell spans
//!   [`CELL_SIZE`] = 1024 units on each axis; a cell's center is offset by
//!   half a cell from its top-left corner.
//! - `WAngle` is a facing in 1/1024ths of a full turn, `0` = north,
//!   increasing counter-clockwise (`256` = west, `768` = east).
//!
//! No floating point is used anywhere: lengths use an integer square root
//! and interpolation uses `i64` intermediates, so the same inputs always
//! produce the same outputs on every platform.

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

use crate::DkError;

/// World units per cell along each axis.
pub const CELL_SIZE: i32 = 1024;

// ── CVec ──────────────────────────────────────────────────────────────────────

/// A cell-grid offset.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CVec {
    pub x: i32,
    pub y: i32,
}

impl CVec {
    pub const ZERO: CVec = CVec { x: 0, y: 0 };

    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// `true` when both axis components are non-zero.
    #[inline]
    pub fn is_diagonal(self) -> bool {
        self.x != 0 && self.y != 0
    }

    /// Per-axis sign, collapsing any offset to one of the eight unit
    /// directions (or zero).
    #[inline]
    pub fn signum(self) -> CVec {
        CVec { x: self.x.signum(), y: self.y.signum() }
    }

    /// Chebyshev length (number of king moves).
    #[inline]
    pub fn chebyshev(self) -> i32 {
        self.x.abs().max(self.y.abs())
    }

    /// Facing that points along this offset.  Only the sign of each axis is
    /// considered; the zero vector faces north.
    pub fn facing(self) -> WAngle {
        let s = self.signum();
        let angle = match (s.x, s.y) {
            (0, -1)  => 0,
            (-1, -1) => 128,
            (-1, 0)  => 256,
            (-1, 1)  => 384,
            (0, 1)   => 512,
            (1, 1)   => 640,
            (1, 0)   => 768,
            (1, -1)  => 896,
            _        => 0,
        };
        WAngle::new(angle)
    }
}

impl Add for CVec {
    type Output = CVec;
    #[inline]
    fn add(self, rhs: CVec) -> CVec {
        CVec::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Neg for CVec {
    type Output = CVec;
    #[inline]
    fn neg(self) -> CVec {
        CVec::new(-self.x, -self.y)
    }
}

// ── CPos ──────────────────────────────────────────────────────────────────────

/// A cell on the map grid.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CPos {
    pub x: i32,
    pub y: i32,
}

impl CPos {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// World position of the center of this cell (ground level).
    #[inline]
    pub fn center(self) -> WPos {
        WPos::new(
            self.x * CELL_SIZE + CELL_SIZE / 2,
            self.y * CELL_SIZE + CELL_SIZE / 2,
            0,
        )
    }

    /// The 3x3 block of cells around `self`, row-major from the north-west
    /// corner.  `self` is included only when `include_self` is set.
    pub fn expand_footprint(self, include_self: bool) -> Vec<CPos> {
        let mut cells = Vec::with_capacity(9);
        for dy in -1..=1 {
            for dx in -1..=1 {
                if dx == 0 && dy == 0 && !include_self {
                    continue;
                }
                cells.push(CPos::new(self.x + dx, self.y + dy));
            }
        }
        cells
    }

    /// `true` if `other` is one of the eight cells surrounding `self`.
    #[inline]
    pub fn is_adjacent(self, other: CPos) -> bool {
        (other - self).chebyshev() == 1
    }
}

impl Add<CVec> for CPos {
    type Output = CPos;
    #[inline]
    fn add(self, rhs: CVec) -> CPos {
        CPos::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for CPos {
    type Output = CVec;
    #[inline]
    fn sub(self, rhs: CPos) -> CVec {
        CVec::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl fmt::Display for CPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

impl FromStr for CPos {
    type Err = DkError;

    /// Parse `"x,y"` (surrounding parentheses optional).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches('(').trim_end_matches(')');
        let (x, y) = trimmed
            .split_once(',')
            .ok_or_else(|| DkError::Parse(format!("expected \"x,y\", got {s:?}")))?;
        let x = x.trim().parse::<i32>().map_err(|e| DkError::Parse(format!("{s:?}: {e}")))?;
        let y = y.trim().parse::<i32>().map_err(|e| DkError::Parse(format!("{s:?}: {e}")))?;
        Ok(CPos::new(x, y))
    }
}

// ── WVec ──────────────────────────────────────────────────────────────────────

/// A world-space offset in world units.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WVec {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl WVec {
    pub const ZERO: WVec = WVec { x: 0, y: 0, z: 0 };

    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn length_squared(self) -> i64 {
        let (x, y, z) = (self.x as i64, self.y as i64, self.z as i64);
        x * x + y * y + z * z
    }

    /// Euclidean length, rounded down.
    #[inline]
    pub fn length(self) -> i32 {
        (self.length_squared() as u64).isqrt() as i32
    }

    /// Horizontal length, ignoring `z`.
    #[inline]
    pub fn horizontal_length(self) -> i32 {
        WVec::new(self.x, self.y, 0).length()
    }
}

impl From<CVec> for WVec {
    #[inline]
    fn from(v: CVec) -> WVec {
        WVec::new(v.x, v.y, 0)
    }
}

impl Add for WVec {
    type Output = WVec;
    #[inline]
    fn add(self, rhs: WVec) -> WVec {
        WVec::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for WVec {
    type Output = WVec;
    #[inline]
    fn sub(self, rhs: WVec) -> WVec {
        WVec::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<i32> for WVec {
    type Output = WVec;
    #[inline]
    fn mul(self, rhs: i32) -> WVec {
        WVec::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

// ── WPos ──────────────────────────────────────────────────────────────────────

/// An absolute world position in world units.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl WPos {
    pub const ZERO: WPos = WPos { x: 0, y: 0, z: 0 };

    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The cell whose area contains this position.
    #[inline]
    pub fn cell(self) -> CPos {
        CPos::new(self.x.div_euclid(CELL_SIZE), self.y.div_euclid(CELL_SIZE))
    }

    /// Linear interpolation `a + (b - a) * mul / div`, truncated toward zero
    /// per axis.  `div` must be non-zero.
    pub fn lerp(a: WPos, b: WPos, mul: i64, div: i64) -> WPos {
        let axis = |from: i32, to: i32| -> i32 {
            (from as i64 + (to as i64 - from as i64) * mul / div) as i32
        };
        WPos::new(axis(a.x, b.x), axis(a.y, b.y), axis(a.z, b.z))
    }
}

impl Add<WVec> for WPos {
    type Output = WPos;
    #[inline]
    fn add(self, rhs: WVec) -> WPos {
        WPos::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for WPos {
    type Output = WVec;
    #[inline]
    fn sub(self, rhs: WPos) -> WVec {
        WVec::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl fmt::Display for WPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.x, self.y, self.z)
    }
}

// ── WAngle / WRot ─────────────────────────────────────────────────────────────

/// A facing angle in 1/1024ths of a turn, always normalized to `0..1024`.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WAngle(i32);

impl WAngle {
    pub const ZERO: WAngle = WAngle(0);

    #[inline]
    pub fn new(angle: i32) -> Self {
        WAngle(angle.rem_euclid(1024))
    }

    #[inline]
    pub fn angle(self) -> i32 {
        self.0
    }
}

impl fmt::Display for WAngle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Full orientation.  Only yaw is driven by gameplay; roll and pitch are
/// carried through so attached actors copy the whole rotation.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WRot {
    pub roll:  WAngle,
    pub pitch: WAngle,
    pub yaw:   WAngle,
}

impl WRot {
    pub const NONE: WRot = WRot { roll: WAngle::ZERO, pitch: WAngle::ZERO, yaw: WAngle::ZERO };

    #[inline]
    pub fn from_yaw(yaw: WAngle) -> Self {
        WRot { yaw, ..WRot::NONE }
    }

    #[inline]
    pub fn with_yaw(self, yaw: WAngle) -> Self {
        WRot { yaw, ..self }
    }
}

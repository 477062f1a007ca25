//! Immutable 2D vector math.
//!
//! `Vector2` is a plain `Copy` value: every operation returns a new vector
//! and never mutates its receiver. Arithmetic is available both through the
//! `std::ops` operators and through the geometric helpers below.

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Rounding mode for [`Vector2::round`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rounding {
    #[default]
    Nearest,
    Up,
    Down,
}

/// A 2D vector of `f64` components.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector2 {
    pub x: f64,
    pub y: f64,
}

impl Vector2 {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// The zero vector.
    #[inline]
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0)
    }

    /// The vector `(1, 1)`.
    #[inline]
    pub const fn unit() -> Self {
        Self::new(1.0, 1.0)
    }

    /// Uniformly random vector in `[-1, 1]²`.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::new(rng.gen_range(-1.0..=1.0), rng.gen_range(-1.0..=1.0))
    }

    /// Cartesian vector from polar coordinates.
    #[inline]
    pub fn from_polar(radius: f64, angle: f64) -> Self {
        Self::new(radius * angle.cos(), radius * angle.sin())
    }

    /// Component-wise product.
    #[inline]
    pub fn pointwise(self, other: Self) -> Self {
        Self::new(self.x * other.x, self.y * other.y)
    }

    /// Component-wise reciprocal `(1/x, 1/y)`.
    #[inline]
    pub fn inverse(self) -> Self {
        Self::new(1.0 / self.x, 1.0 / self.y)
    }

    /// Perpendicular vector `(-y, x)`.
    #[inline]
    pub fn normal(self) -> Self {
        Self::new(-self.y, self.x)
    }

    #[inline]
    pub fn inner(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Outer product as a row-major 2x2 matrix.
    #[inline]
    pub fn outer(self, other: Self) -> [[f64; 2]; 2] {
        [
            [self.x * other.x, self.x * other.y],
            [self.y * other.x, self.y * other.y],
        ]
    }

    /// Euclidean length.
    #[inline]
    pub fn magnitude(self) -> f64 {
        self.inner(self).sqrt()
    }

    /// Polar angle in radians, `atan2(y, x)`.
    #[inline]
    pub fn angle(self) -> f64 {
        self.y.atan2(self.x)
    }

    /// Unit vector in the same direction.
    ///
    /// The zero vector has no direction; its components come back NaN.
    /// Use [`Vector2::direction`] where a defined result is required.
    #[inline]
    pub fn normalize(self) -> Self {
        self / self.magnitude()
    }

    /// Like [`Vector2::normalize`], but the zero vector maps to zero.
    #[inline]
    pub fn direction(self) -> Self {
        let norm = self.magnitude();
        if norm == 0.0 { Self::zero() } else { self / norm }
    }

    /// Scale down so the magnitude does not exceed `max_norm`.
    ///
    /// Vectors already within the bound are returned unchanged.
    #[inline]
    pub fn clip_norm(self, max_norm: f64) -> Self {
        let norm = self.magnitude();
        if norm > max_norm {
            self * (max_norm / norm)
        } else {
            self
        }
    }

    #[inline]
    pub fn min(self, other: Self) -> Self {
        Self::new(self.x.min(other.x), self.y.min(other.y))
    }

    #[inline]
    pub fn max(self, other: Self) -> Self {
        Self::new(self.x.max(other.x), self.y.max(other.y))
    }

    pub fn round(self, mode: Rounding) -> Self {
        let round: fn(f64) -> f64 = match mode {
            Rounding::Nearest => f64::round,
            Rounding::Up => f64::ceil,
            Rounding::Down => f64::floor,
        };
        Self::new(round(self.x), round(self.y))
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// True when the two vectors are closer than `tolerance`.
    #[inline]
    pub fn is_close(self, other: Self, tolerance: f64) -> bool {
        (self - other).magnitude() < tolerance
    }
}

impl fmt::Display for Vector2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vector2({}, {})", self.x, self.y)
    }
}

impl From<(f64, f64)> for Vector2 {
    #[inline]
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl From<Vector2> for [f64; 2] {
    #[inline]
    fn from(v: Vector2) -> Self {
        [v.x, v.y]
    }
}

impl Add for Vector2 {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vector2 {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vector2 {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f64> for Vector2 {
    type Output = Self;

    #[inline]
    fn div(self, rhs: f64) -> Self {
        Self::new(self.x / rhs, self.y / rhs)
    }
}

impl Neg for Vector2 {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

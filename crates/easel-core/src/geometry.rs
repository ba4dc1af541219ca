//! Plain 2D value types shared by every part of the scene model.
//!
//! Matrices are `glam::Mat4` in column-vector convention: a point is
//! transformed by `m * p`, so in a product the rightmost matrix acts first.

use glam::{Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

// ─── Point ───────────────────────────────────────────────────────────────

/// A position (or position offset) in 2D space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Map this point through a transform matrix.
    pub fn transform(self, matrix: &Mat4) -> Self {
        let p = matrix.transform_point3(Vec3::new(self.x, self.y, 0.0));
        Self::new(p.x, p.y)
    }
}

impl Add for Point {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Point {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl From<Point> for Vec2 {
    fn from(p: Point) -> Self {
        Vec2::new(p.x, p.y)
    }
}

impl From<Vec2> for Point {
    fn from(v: Vec2) -> Self {
        Self::new(v.x, v.y)
    }
}

// ─── Vector2 ─────────────────────────────────────────────────────────────

/// A non-uniform scale, or a size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

impl Vector2 {
    pub const ONE: Self = Self { x: 1.0, y: 1.0 };
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub const fn splat(v: f32) -> Self {
        Self { x: v, y: v }
    }
}

impl Default for Vector2 {
    fn default() -> Self {
        Self::ONE
    }
}

/// Component-wise product.
impl Mul for Vector2 {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Self::new(self.x * rhs.x, self.y * rhs.y)
    }
}

// ─── Radians ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Radians(pub f32);

impl Radians {
    pub const ZERO: Self = Self(0.0);

    pub fn from_degrees(degrees: f32) -> Self {
        Self(degrees.to_radians())
    }

    pub fn to_degrees(self) -> f32 {
        self.0.to_degrees()
    }
}

impl Add for Radians {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

// ─── Depth ───────────────────────────────────────────────────────────────

/// Draw-order ordinal. Lower values are nearer to the viewer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Depth(pub i32);

impl Depth {
    pub const ZERO: Self = Self(0);
}

impl Add for Depth {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Depth {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

// ─── Flip ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Flip {
    pub horizontal: bool,
    pub vertical: bool,
}

impl Flip {
    pub const NONE: Self = Self {
        horizontal: false,
        vertical: false,
    };

    /// The flip expressed as a `±1` scale on each axis.
    pub fn as_scale(self) -> Vec3 {
        Vec3::new(
            if self.horizontal { -1.0 } else { 1.0 },
            if self.vertical { -1.0 } else { 1.0 },
            1.0,
        )
    }
}

// ─── Rectangle ───────────────────────────────────────────────────────────

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rectangle {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rectangle {
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Vector2 {
        Vector2::new(self.width, self.height)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Corners in clockwise order starting at the top-left.
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.x, self.y),
            Point::new(self.right(), self.y),
            Point::new(self.right(), self.bottom()),
            Point::new(self.x, self.bottom()),
        ]
    }

    /// Smallest rectangle containing every point. `ZERO` for no points.
    pub fn from_points<I: IntoIterator<Item = Point>>(points: I) -> Self {
        let mut iter = points.into_iter();
        let Some(first) = iter.next() else {
            return Self::ZERO;
        };
        let (mut min, mut max) = (first, first);
        for p in iter {
            min = Point::new(min.x.min(p.x), min.y.min(p.y));
            max = Point::new(max.x.max(p.x), max.y.max(p.y));
        }
        Self::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }

    /// Union: the smallest rectangle covering both.
    pub fn expand_to_include(&self, other: &Rectangle) -> Self {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Self::new(
            x,
            y,
            self.right().max(other.right()) - x,
            self.bottom().max(other.bottom()) - y,
        )
    }

    /// Axis-aligned hull of this rectangle after mapping it through `matrix`.
    pub fn transform(&self, matrix: &Mat4) -> Self {
        Self::from_points(self.corners().map(|c| c.transform(matrix)))
    }
}

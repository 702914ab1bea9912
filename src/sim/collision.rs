//! Hit tests for center-anchored boxes
//!
//! Every entity is an axis-aligned box around its center. Projectile hits use
//! a cheap squared-distance broad phase before the exact box test.

use glam::Vec2;

/// Axis-aligned box anchored at its center
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hitbox {
    pub center: Vec2,
    pub size: Vec2,
}

impl Hitbox {
    pub fn new(center: Vec2, size: Vec2) -> Self {
        Self { center, size }
    }

    pub fn square(center: Vec2, side: f32) -> Self {
        Self::new(center, Vec2::splat(side))
    }

    pub fn half(&self) -> Vec2 {
        self.size * 0.5
    }

    /// Strict overlap test (touching edges do not count)
    pub fn overlaps(&self, other: &Hitbox) -> bool {
        let a = self.half();
        let b = other.half();
        self.center.x - a.x < other.center.x + b.x
            && self.center.x + a.x > other.center.x - b.x
            && self.center.y - a.y < other.center.y + b.y
            && self.center.y + a.y > other.center.y - b.y
    }
}

/// Broad phase: centers within the mean of the two widths
#[inline]
pub fn near_enough(a: Vec2, a_width: f32, b: Vec2, b_width: f32) -> bool {
    let reach = a_width + b_width;
    a.distance_squared(b) <= reach * reach / 4.0
}

/// Broad phase followed by the exact box test
pub fn projectile_hits(projectile: &Hitbox, target: &Hitbox) -> bool {
    near_enough(projectile.center, projectile.size.x, target.center, target.size.x)
        && projectile.overlaps(target)
}

/// Strictly inside a circle (area effects)
#[inline]
pub fn within_radius(center: Vec2, point: Vec2, radius: f32) -> bool {
    center.distance_squared(point) < radius * radius
}

/// Box-style proximity: both axis distances under `reach`
#[inline]
pub fn within_reach(a: Vec2, b: Vec2, reach: f32) -> bool {
    (a.x - b.x).abs() < reach && (a.y - b.y).abs() < reach
}

/// Heading after bouncing off a vertical wall
#[inline]
pub fn reflect_off_wall(angle: f32) -> f32 {
    std::f32::consts::PI - angle
}

/// Heading after bouncing off a horizontal surface (ceiling or ground)
#[inline]
pub fn reflect_off_floor(angle: f32) -> f32 {
    -angle
}

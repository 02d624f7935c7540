//! A ray in 3D space, and the result of tracing one.

use glam::{vec3a, Vec2, Vec3A};

/// Offset applied along the surface normal for rays leaving a surface, so they don't hit it again.
pub const RAY_EPSILON: f32 = 1e-4;

/// Computes the inverse of `x` avoiding division by zero.
#[inline(always)]
pub fn safe_inverse(x: f32) -> f32 {
    if x.abs() <= f32::EPSILON {
        x.signum() / f32::EPSILON
    } else {
        1.0 / x
    }
}

/// A struct representing a ray in 3D space.
#[derive(Clone, Copy, Debug, Default)]
#[repr(C)]
pub struct Ray {
    /// The starting point of the ray.
    pub origin: Vec3A,
    /// The direction vector of the ray. Expected to be normalized.
    pub direction: Vec3A,
    /// The inverse of the direction vector components.
    /// Used to avoid division in ray/aabb tests.
    pub inv_direction: Vec3A,
    /// The minimum `t` (distance) value for intersection tests.
    pub tmin: f32,
    /// The maximum `t` (distance) value for intersection tests. Narrowed by traversal as closer
    /// hits are found.
    pub tmax: f32,
}

impl Ray {
    /// Creates a new `Ray` with the given origin, direction, and `t` (distance) range.
    #[inline(always)]
    pub fn new(origin: Vec3A, direction: Vec3A, min: f32, max: f32) -> Self {
        let ray = Ray {
            origin,
            direction,
            inv_direction: vec3a(
                safe_inverse(direction.x),
                safe_inverse(direction.y),
                safe_inverse(direction.z),
            ),
            tmin: min,
            tmax: max,
        };

        debug_assert!(ray.inv_direction.is_finite());
        debug_assert!(ray.direction.is_finite());
        debug_assert!(origin.is_finite());
        debug_assert!(
            direction.length_squared() > 0.0,
            "ray direction must not be zero length"
        );

        ray
    }

    /// Creates a new infinite `Ray` with the given origin, direction.
    #[inline(always)]
    pub fn new_inf(origin: Vec3A, direction: Vec3A) -> Self {
        Self::new(origin, direction, 0.0, f32::INFINITY)
    }

    /// Creates a ray leaving a surface at `position`, nudged along `normal` by [`RAY_EPSILON`].
    #[inline(always)]
    pub fn from_surface(position: Vec3A, normal: Vec3A, direction: Vec3A) -> Self {
        Self::new(
            position + normal * RAY_EPSILON,
            direction,
            RAY_EPSILON,
            f32::INFINITY,
        )
    }

    /// Point along the ray at distance `t`.
    #[inline(always)]
    pub fn at(&self, t: f32) -> Vec3A {
        self.origin + self.direction * t
    }
}

/// The closest hit found along a ray.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    /// Distance along the ray.
    pub t: f32,
    /// Index of the hit triangle in the source mesh (its position in the index buffer / 3).
    pub source_index: u32,
    /// Barycentric `(u, v)` of the hit, weights of `v1` and `v2`. The weight of `v0` is `1 - u - v`.
    pub barycentric: Vec2,
}

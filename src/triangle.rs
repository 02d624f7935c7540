//! Triangle representation in 3D space.

use glam::{vec2, Vec2, Vec3A};

use crate::{aabb::Aabb, ray::Ray};

/// Three vertex positions plus the index of the triangle in the mesh it was extracted from.
/// Winding is kept as given and never validated.
#[derive(Clone, Copy, Default, Debug, PartialEq)]
pub struct Triangle {
    pub v0: Vec3A,
    pub v1: Vec3A,
    pub v2: Vec3A,
    /// Position of this triangle in the source index buffer (first index / 3).
    pub source_index: u32,
}

impl Triangle {
    #[inline(always)]
    pub fn new(v0: Vec3A, v1: Vec3A, v2: Vec3A, source_index: u32) -> Self {
        Self {
            v0,
            v1,
            v2,
            source_index,
        }
    }

    /// Compute the normal of the triangle geometry.
    #[inline(always)]
    pub fn compute_normal(&self) -> Vec3A {
        let e1 = self.v1 - self.v0;
        let e2 = self.v2 - self.v0;
        e1.cross(e2).normalize_or_zero()
    }

    /// Compute the bounding box of the triangle.
    #[inline(always)]
    pub fn aabb(&self) -> Aabb {
        *Aabb::from_point(self.v0).extend(self.v1).extend(self.v2)
    }

    /// Find the distance (t) of the intersection of the `Ray` and this Triangle.
    /// Only hits within `[ray.tmin, ray.tmax]` count. Returns f32::INFINITY for miss.
    /// Both faces are hit, there is no backface culling.
    #[inline(always)]
    pub fn intersect(&self, ray: &Ray) -> f32 {
        // Based on Fast Minimum Storage Ray Triangle Intersection by T. Möller and B. Trumbore
        // https://madmann91.github.io/2021/04/29/an-introduction-to-bvhs.html
        let e1 = self.v0 - self.v1;
        let e2 = self.v2 - self.v0;
        let n = e1.cross(e2);

        let det = n.dot(ray.direction);
        if det == 0.0 {
            // Ray parallel to the triangle plane, or a zero-area triangle.
            return f32::INFINITY;
        }

        let c = self.v0 - ray.origin;
        let r = ray.direction.cross(c);
        let inv_det = 1.0 / det;

        let u = r.dot(e2) * inv_det;
        let v = r.dot(e1) * inv_det;
        let w = 1.0 - u - v;

        // Edges count as inside so rays through a shared edge hit one of its triangles.
        if u >= 0.0 && v >= 0.0 && w >= 0.0 {
            let t = n.dot(c) * inv_det;
            if t >= ray.tmin && t <= ray.tmax {
                return t;
            }
        }

        f32::INFINITY
    }

    /// Barycentric `(u, v)` of the point where `ray` crosses the triangle plane.
    /// `u` weights `v1`, `v` weights `v2`, `1 - u - v` weights `v0`.
    #[inline(always)]
    pub fn compute_barycentric(&self, ray: &Ray) -> Vec2 {
        let e1 = self.v0 - self.v1;
        let e2 = self.v2 - self.v0;
        let ng = e1.cross(e2);
        let r = ray.direction.cross(self.v0 - ray.origin);
        vec2(r.dot(e2), r.dot(e1)) / ng.dot(ray.direction)
    }

    /// Point on the triangle for a barycentric `(u, v)` as returned by [`Triangle::compute_barycentric`].
    #[inline(always)]
    pub fn interpolate(&self, barycentric: Vec2) -> Vec3A {
        self.v0 * (1.0 - barycentric.x - barycentric.y)
            + self.v1 * barycentric.x
            + self.v2 * barycentric.y
    }
}

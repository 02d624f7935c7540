//! An Axis-Aligned Bounding Box (AABB) represented by its minimum and maximum points.

use bytemuck::{Pod, Zeroable};
use glam::Vec3A;

use crate::{ray::Ray, triangle::Triangle};

/// An Axis-Aligned Bounding Box (AABB) represented by its minimum and maximum points.
///
/// Zero-extent boxes (around a point, or around a triangle lying in an axis plane) are valid.
#[derive(Default, Clone, Copy, Debug, PartialEq)]
#[repr(C)]
pub struct Aabb {
    pub min: Vec3A,
    pub max: Vec3A,
}

unsafe impl Pod for Aabb {}
unsafe impl Zeroable for Aabb {}

impl Aabb {
    /// Creates a new AABB with both min and max set to the given point.
    #[inline(always)]
    pub fn from_point(point: Vec3A) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    /// Bounding box of a sequence of triangles: the first triangle's box with every following
    /// one merged in. Returns `None` for an empty slice.
    pub fn from_triangles(triangles: &[Triangle]) -> Option<Self> {
        let (first, rest) = triangles.split_first()?;
        Some(
            rest.iter()
                .fold(first.aabb(), |acc, tri| acc.union(&tri.aabb())),
        )
    }

    /// Extends the AABB to include the given point.
    #[inline(always)]
    pub fn extend(&mut self, point: Vec3A) -> &mut Self {
        *self = self.union(&Self::from_point(point));
        self
    }

    /// Returns the union of this AABB and another AABB, the minimal box enclosing both.
    /// Commutative and associative.
    #[inline(always)]
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Returns the center point of the AABB.
    /// Only used as a partitioning key, it is not guaranteed to lie inside the enclosed geometry.
    #[inline(always)]
    pub fn center(&self) -> Vec3A {
        (self.max + self.min) * 0.5
    }

    /// Returns the center coordinate of the AABB along a specific axis.
    #[inline(always)]
    pub fn center_axis(&self, axis: usize) -> f32 {
        (self.max[axis] + self.min[axis]) * 0.5
    }

    /// Returns an empty AABB, the identity of [`Aabb::union`].
    #[inline(always)]
    pub fn empty() -> Self {
        Self {
            min: Vec3A::new(f32::MAX, f32::MAX, f32::MAX),
            max: Vec3A::new(f32::MIN, f32::MIN, f32::MIN),
        }
    }

    /// True if `other` lies entirely inside this box (touching faces count as inside).
    #[inline(always)]
    pub fn contains(&self, other: &Aabb) -> bool {
        (other.min.cmplt(self.min) | other.max.cmpgt(self.max)).bitmask() == 0
    }

    /// True if `min <= max` on every axis.
    #[inline(always)]
    pub fn is_valid(&self) -> bool {
        self.min.cmple(self.max).all()
    }

    /// Checks if this AABB intersects with a ray and returns the distance to the intersection point.
    /// Returns `f32::INFINITY` if there is no intersection.
    #[inline(always)]
    pub fn intersect_ray(&self, ray: &Ray) -> f32 {
        let t1 = (self.min - ray.origin) * ray.inv_direction;
        let t2 = (self.max - ray.origin) * ray.inv_direction;

        let tmin = t1.min(t2);
        let tmax = t1.max(t2);

        let tmin_n = tmin.x.max(tmin.y.max(tmin.z));
        let tmax_n = tmax.x.min(tmax.y.min(tmax.z));

        if tmax_n >= tmin_n && tmax_n >= ray.tmin {
            tmin_n
        } else {
            f32::INFINITY
        }
    }
}

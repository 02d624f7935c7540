//! Scenes and reference routines shared by tests, the demo and the CLI.

pub mod geometry;

use crate::{ray::Ray, triangle::Triangle};

/// Tests `ray` against every triangle and returns the closest `(t, source_index)`.
/// Ties keep the first triangle in slice order.
pub fn brute_force_intersect(triangles: &[Triangle], ray: &Ray) -> Option<(f32, u32)> {
    let mut closest: Option<(f32, u32)> = None;
    for tri in triangles {
        let t = tri.intersect(ray);
        if t.is_finite() && closest.map_or(true, |(best, _)| t < best) {
            closest = Some((t, tri.source_index));
        }
    }
    closest
}

use glam::{vec3a, Vec3A};
use rand::Rng;

use crate::triangle::Triangle;

/// Corner `i` of the unit cube centered on the origin: bit 0 is x, bit 1 is y, bit 2 is z.
#[inline(always)]
fn cube_corner(i: u32) -> Vec3A {
    vec3a(
        if i & 1 == 0 { -0.5 } else { 0.5 },
        if i & 2 == 0 { -0.5 } else { 0.5 },
        if i & 4 == 0 { -0.5 } else { 0.5 },
    )
}

/// Faces of the cube as corner quads, in triangle order: -z, +z, -x, +x, -y, +y.
const CUBE_FACES: [[u32; 4]; 6] = [
    [0, 2, 3, 1],
    [4, 5, 7, 6],
    [0, 4, 6, 2],
    [1, 3, 7, 5],
    [0, 1, 5, 4],
    [2, 6, 7, 3],
];

/// Triangles `2 * face` and `2 * face + 1` of [`cube`] make up face `face`.
pub const CUBE_FACE_POS_Z: u32 = 1;

/// Indexed unit cube centered on the origin: 8 vertices, 12 triangles.
pub fn cube() -> (Vec<u32>, Vec<Vec3A>) {
    let vertices = (0..8).map(cube_corner).collect();
    let indices = CUBE_FACES
        .iter()
        .flat_map(|&[a, b, c, d]| [a, b, c, a, c, d])
        .collect();
    (indices, vertices)
}

/// Small random triangles scattered in a 20 unit box around the origin. `source_index` is the
/// position in the returned vec.
pub fn random_triangles<R: Rng>(count: usize, rng: &mut R) -> Vec<Triangle> {
    (0..count)
        .map(|i| {
            let center = random_point(rng, 10.0);
            Triangle::new(
                center + random_point(rng, 1.0),
                center + random_point(rng, 1.0),
                center + random_point(rng, 1.0),
                i as u32,
            )
        })
        .collect()
}

/// Random triangles lying in the plane `x = x`, so every box center shares that coordinate.
pub fn coplanar_triangles<R: Rng>(count: usize, x: f32, rng: &mut R) -> Vec<Triangle> {
    random_triangles(count, rng)
        .into_iter()
        .map(|mut tri| {
            tri.v0.x = x;
            tri.v1.x = x;
            tri.v2.x = x;
            tri
        })
        .collect()
}

/// Uniform point in `[-extent, extent]^3`.
#[inline(always)]
pub fn random_point<R: Rng>(rng: &mut R, extent: f32) -> Vec3A {
    vec3a(
        rng.random_range(-extent..extent),
        rng.random_range(-extent..extent),
        rng.random_range(-extent..extent),
    )
}

/// Uniformly distributed unit vector.
#[inline(always)]
pub fn random_direction<R: Rng>(rng: &mut R) -> Vec3A {
    loop {
        let v = random_point(rng, 1.0);
        let len2 = v.length_squared();
        if len2 > 1e-4 && len2 <= 1.0 {
            return v / len2.sqrt();
        }
    }
}

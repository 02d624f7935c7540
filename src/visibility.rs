//! Per-vertex shadowing terms for precomputed transfer.
//!
//! For every vertex and every sample direction in its upper hemisphere a shadow ray is cast
//! against the tree. Vertices are processed in parallel, each rayon task reusing one traversal
//! stack. The tree is only read, so no locking is needed.

use rayon::prelude::*;

use crate::{
    bvh::BvhTree,
    mesh::{MeshVertex, VertexPosition},
    ray::Ray,
    sampler::Sampler,
    scope_print_major,
};

/// For each vertex, one flag per sample: `true` when the direction faces away from the surface
/// less than 90 degrees (positive cosine with the normal) and nothing blocks it.
pub fn bake_visibility(
    tree: &BvhTree,
    vertices: &[MeshVertex],
    sampler: &Sampler,
) -> Vec<Vec<bool>> {
    scope_print_major!("bake_visibility");
    log::debug!(
        "visibility: {} vertices x {} samples",
        vertices.len(),
        sampler.len()
    );

    vertices
        .par_iter()
        .map_init(
            || tree.new_traversal(Ray::default()),
            |state, vertex| {
                let position = vertex.position();
                let normal = vertex.normal();
                sampler
                    .samples
                    .iter()
                    .map(|sample| {
                        normal.dot(sample.direction) > 0.0
                            && !tree.occluded_with(
                                state,
                                Ray::from_surface(position, normal, sample.direction),
                            )
                    })
                    .collect()
            },
        )
        .collect()
}

/// For each vertex, the fraction of its upper-hemisphere samples that hit geometry. `0.0` for a
/// vertex with no sample in its hemisphere.
pub fn bake_occlusion(tree: &BvhTree, vertices: &[MeshVertex], sampler: &Sampler) -> Vec<f32> {
    scope_print_major!("bake_occlusion");

    vertices
        .par_iter()
        .map_init(
            || tree.new_traversal(Ray::default()),
            |state, vertex| {
                let position = vertex.position();
                let normal = vertex.normal();
                let mut facing = 0u32;
                let mut blocked = 0u32;
                for sample in &sampler.samples {
                    if normal.dot(sample.direction) <= 0.0 {
                        continue;
                    }
                    facing += 1;
                    let ray = Ray::from_surface(position, normal, sample.direction);
                    if tree.occluded_with(state, ray) {
                        blocked += 1;
                    }
                }
                if facing == 0 {
                    0.0
                } else {
                    blocked as f32 / facing as f32
                }
            },
        )
        .collect()
}

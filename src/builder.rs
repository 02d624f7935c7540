//! Top-down BVH construction.
//!
//! Each level takes the bounding box of its triangles, splits at the box center on the current
//! axis, and recurses on both halves with the next axis (x -> y -> z -> x). Ranges of one or two
//! triangles become leaves. When the split puts every triangle on one side, the range is cut in
//! half instead so the recursion always makes progress.

use std::time::Instant;

use crate::{
    aabb::Aabb,
    bvh::{BvhNode, BvhTree},
    error::{BvhError, Result},
    scope, scope_print, scope_print_major,
    triangle::Triangle,
    PrettyDuration,
};

/// Construction settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuildParams {
    /// Past this depth every range is cut in half regardless of geometry, which bounds the
    /// recursion to roughly `max_depth + log2(triangle count)` levels.
    pub max_depth: u32,
}

impl Default for BuildParams {
    fn default() -> Self {
        Self { max_depth: 64 }
    }
}

/// Builds a tree over `triangles`. The triangles are reordered in place so every leaf refers to
/// a contiguous run, and the tree takes ownership of them.
pub fn build_bvh(mut triangles: Vec<Triangle>, params: &BuildParams) -> Result<BvhTree> {
    scope_print_major!("build_bvh");
    if triangles.is_empty() {
        return Err(BvhError::EmptyMesh);
    }
    check_triangle_count(triangles.len())?;

    let start_time = Instant::now();
    log::debug!("BVH: building over {} triangles", triangles.len());

    // A binary tree with at most one leaf per triangle never has more than 2n - 1 nodes.
    let mut nodes = Vec::with_capacity(2 * triangles.len() - 1);
    let count = triangles.len();
    let root = {
        scope_print!("build_bvh::build_node");
        build_node(&mut triangles, &mut nodes, 0, count, 0, 0, params)
    };

    log::info!(
        "BVH: built {} nodes over {} triangles in {}",
        nodes.len(),
        count,
        PrettyDuration(start_time.elapsed())
    );

    Ok(BvhTree::from_parts(nodes, triangles, root))
}

/// Triangle and node indices are stored as `u32`, with `u32::MAX` reserved for "no hit".
pub(crate) fn check_triangle_count(count: usize) -> Result<()> {
    if count >= u32::MAX as usize {
        return Err(BvhError::TooManyTriangles(count));
    }
    Ok(())
}

/// Builds the subtree over `triangles[start..start + count]`, pushes its nodes and returns the
/// index of its root. Children are always pushed before their parent.
fn build_node(
    triangles: &mut [Triangle],
    nodes: &mut Vec<BvhNode>,
    start: usize,
    count: usize,
    axis: usize,
    depth: u32,
    params: &BuildParams,
) -> u32 {
    debug_assert!(count > 0, "cannot build a node over zero triangles");

    let node = match count {
        1 => BvhNode::Leaf {
            triangle: start as u32,
        },
        2 => BvhNode::LeafPair {
            first: start as u32,
        },
        _ => {
            scope!("build_node");
            let range = &mut triangles[start..start + count];
            let aabb = Aabb::from_triangles(range).unwrap_or_else(Aabb::empty);

            let mid = if depth < params.max_depth {
                split(range, axis, aabb.center_axis(axis))
            } else {
                count / 2
            };
            debug_assert!(mid > 0 && mid < count);

            let next_axis = (axis + 1) % 3;
            let left = build_node(triangles, nodes, start, mid, next_axis, depth + 1, params);
            let right = build_node(
                triangles,
                nodes,
                start + mid,
                count - mid,
                next_axis,
                depth + 1,
                params,
            );
            BvhNode::Internal { aabb, left, right }
        }
    };

    nodes.push(node);
    (nodes.len() - 1) as u32
}

/// Moves every triangle whose box center on `axis` is strictly below `pivot` to the front of the
/// slice, with a single left to right scan of swaps. Returns how many were moved.
///
/// Deterministic for a given input order and pivot. Relative order is not preserved.
pub fn partition_by_centroid(triangles: &mut [Triangle], axis: usize, pivot: f32) -> usize {
    let mut count = 0;
    for i in 0..triangles.len() {
        if triangles[i].aabb().center_axis(axis) < pivot {
            triangles.swap(i, count);
            count += 1;
        }
    }
    count
}

/// [`partition_by_centroid`], falling back to `len / 2` when every triangle lands on the same
/// side. The midpoint is not re-checked against the centers, it only has to make progress.
pub fn split(triangles: &mut [Triangle], axis: usize, pivot: f32) -> usize {
    let count = partition_by_centroid(triangles, axis, pivot);
    if count == 0 || count == triangles.len() {
        triangles.len() / 2
    } else {
        count
    }
}

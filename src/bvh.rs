use crate::{
    aabb::Aabb,
    builder::{build_bvh, BuildParams},
    error::Result,
    mesh::{extract_triangles, VertexPosition},
    ray::{Ray, RayHit},
    triangle::Triangle,
};

/// A node of the hierarchy. Children and triangles are referenced by index into the owning
/// [`BvhTree`]'s node and triangle arrays.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BvhNode {
    /// A single triangle.
    Leaf { triangle: u32 },
    /// Two triangles, `first` and `first + 1`.
    LeafPair { first: u32 },
    /// Bounding box of the whole subtree and its two children.
    Internal { aabb: Aabb, left: u32, right: u32 },
}

impl BvhNode {
    /// Range of triangle indices held by a leaf. Empty for internal nodes.
    #[inline(always)]
    pub fn triangle_range(&self) -> std::ops::Range<usize> {
        match *self {
            BvhNode::Leaf { triangle } => triangle as usize..triangle as usize + 1,
            BvhNode::LeafPair { first } => first as usize..first as usize + 2,
            BvhNode::Internal { .. } => 0..0,
        }
    }

    #[inline(always)]
    pub fn is_leaf(&self) -> bool {
        !matches!(self, BvhNode::Internal { .. })
    }
}

/// Resumable traversal state: the node stack and the ray, whose `tmax` shrinks as hits are found.
pub struct Traversal {
    pub stack: Vec<u32>,
    pub ray: Ray,
}

/// A bounding volume hierarchy over a triangle mesh. Immutable once built, so it can be shared
/// between threads for queries.
#[derive(Clone, Debug)]
pub struct BvhTree {
    nodes: Vec<BvhNode>,
    triangles: Vec<Triangle>,
    root: u32,
}

impl BvhTree {
    /// Extracts the triangles of an indexed mesh and builds a tree over them.
    pub fn build<V: VertexPosition>(indices: &[u32], vertices: &[V]) -> Result<Self> {
        Self::build_with_params(indices, vertices, &BuildParams::default())
    }

    pub fn build_with_params<V: VertexPosition>(
        indices: &[u32],
        vertices: &[V],
        params: &BuildParams,
    ) -> Result<Self> {
        let triangles = extract_triangles(indices, vertices)?;
        Self::from_triangles(triangles, params)
    }

    pub fn from_triangles(triangles: Vec<Triangle>, params: &BuildParams) -> Result<Self> {
        build_bvh(triangles, params)
    }

    pub(crate) fn from_parts(nodes: Vec<BvhNode>, triangles: Vec<Triangle>, root: u32) -> Self {
        Self {
            nodes,
            triangles,
            root,
        }
    }

    #[inline(always)]
    pub fn root(&self) -> &BvhNode {
        &self.nodes[self.root as usize]
    }

    #[inline(always)]
    pub fn nodes(&self) -> &[BvhNode] {
        &self.nodes
    }

    /// The triangles in build order. Leaves index into this slice, use
    /// [`Triangle::source_index`] to get back to the mesh.
    #[inline(always)]
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Bounding box of any node. Computed from the triangles for leaves.
    pub fn node_aabb(&self, node: &BvhNode) -> Aabb {
        match node {
            BvhNode::Internal { aabb, .. } => *aabb,
            leaf => Aabb::from_triangles(&self.triangles[leaf.triangle_range()])
                .unwrap_or_else(Aabb::empty),
        }
    }

    /// Bounding box of the whole mesh.
    pub fn aabb(&self) -> Aabb {
        self.node_aabb(self.root())
    }

    #[inline(always)]
    pub fn new_traversal(&self, ray: Ray) -> Traversal {
        let mut stack = Vec::with_capacity(96);
        stack.push(self.root);
        Traversal { stack, ray }
    }

    /// Reinitialize traversal state with new ray.
    #[inline(always)]
    pub fn reinit_traversal(&self, state: &mut Traversal, ray: Ray) {
        state.stack.clear();
        state.stack.push(self.root);
        state.ray = ray;
    }

    /// Walks the tree, calling `intersection_fn` with the index of every triangle in a visited
    /// leaf. An internal node is skipped along with its whole subtree when the ray's entry into
    /// its box lies past `state.ray.tmax` or at or past `closest_t`. A missed box has an infinite
    /// entry.
    ///
    /// `intersection_fn` returns the hit distance or `f32::INFINITY`. A hit counts when it is at
    /// most `state.ray.tmax` and strictly closer than `closest_t`, so `closest_t` must start at
    /// `f32::INFINITY`. Returns `true` as soon as a leaf produced a closer hit (with `closest_t`,
    /// `closest_id` and `state.ray.tmax` updated), so it can be called in a loop to find the
    /// closest hit, or once for any hit. Returns `false` when the traversal is exhausted.
    #[inline(always)]
    pub fn traverse<F: FnMut(&Ray, usize) -> f32>(
        &self,
        state: &mut Traversal,
        closest_t: &mut f32,
        closest_id: &mut u32,
        mut intersection_fn: F,
    ) -> bool {
        while let Some(current_node_index) = state.stack.pop() {
            let node = &self.nodes[current_node_index as usize];
            if let BvhNode::Internal { aabb, left, right } = node {
                let entry = aabb.intersect_ray(&state.ray);
                if entry > state.ray.tmax || entry >= *closest_t {
                    continue;
                }
                state.stack.push(*right);
                state.stack.push(*left);
                continue;
            }

            let mut found = false;
            for primitive_id in node.triangle_range() {
                let t = intersection_fn(&state.ray, primitive_id);
                if t <= state.ray.tmax && t < *closest_t {
                    *closest_id = primitive_id as u32;
                    *closest_t = t;
                    state.ray.tmax = t;
                    found = true;
                }
            }
            if found {
                return true; // Yield when we hit a primitive
            }
        }
        false // Returns false when there are no more primitives to test.
    }

    /// Closest triangle hit along `ray` within its `[tmin, tmax]`, or `None` for a miss.
    pub fn intersect(&self, ray: Ray) -> Option<RayHit> {
        let mut state = self.new_traversal(ray);
        self.intersect_with(&mut state, ray)
    }

    /// [`BvhTree::intersect`] reusing the stack allocation of `state`.
    pub fn intersect_with(&self, state: &mut Traversal, ray: Ray) -> Option<RayHit> {
        self.reinit_traversal(state, ray);
        let mut t = f32::INFINITY;
        let mut id = u32::MAX;
        while self.traverse(state, &mut t, &mut id, |ray, i| self.triangles[i].intersect(ray)) {}

        if id == u32::MAX {
            return None;
        }
        let triangle = &self.triangles[id as usize];
        Some(RayHit {
            t,
            source_index: triangle.source_index,
            barycentric: triangle.compute_barycentric(&ray),
        })
    }

    /// True if anything lies along `ray` within its `[tmin, tmax]`. Stops at the first hit.
    pub fn occluded(&self, ray: Ray) -> bool {
        let mut state = self.new_traversal(ray);
        self.occluded_with(&mut state, ray)
    }

    /// [`BvhTree::occluded`] reusing the stack allocation of `state`.
    pub fn occluded_with(&self, state: &mut Traversal, ray: Ray) -> bool {
        self.reinit_traversal(state, ray);
        let mut t = f32::INFINITY;
        let mut id = u32::MAX;
        self.traverse(state, &mut t, &mut id, |ray, i| {
            self.triangles[i].intersect(ray)
        })
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Number of nodes on the longest root to leaf path. A single leaf tree has depth 1.
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(self.root, 1)];
        while let Some((index, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            if let BvhNode::Internal { left, right, .. } = self.nodes[index as usize] {
                stack.push((left, depth + 1));
                stack.push((right, depth + 1));
            }
        }
        max_depth
    }

    /// Checks the structural invariants of the tree. Panics on the first violation:
    /// - every node is reachable from the root exactly once,
    /// - every internal box contains the boxes of both children,
    /// - every triangle is held by exactly one leaf.
    pub fn validate(&self) {
        let mut node_visits = vec![0u32; self.nodes.len()];
        let mut triangle_visits = vec![0u32; self.triangles.len()];
        let mut stack = vec![self.root];
        while let Some(index) = stack.pop() {
            node_visits[index as usize] += 1;
            let node = &self.nodes[index as usize];
            match *node {
                BvhNode::Internal { aabb, left, right } => {
                    assert!(aabb.is_valid(), "node {index} has an inverted box");
                    for child in [left, right] {
                        let child_aabb = self.node_aabb(&self.nodes[child as usize]);
                        assert!(
                            aabb.contains(&child_aabb),
                            "node {index} does not contain child {child}"
                        );
                        stack.push(child);
                    }
                }
                _ => {
                    for tri in node.triangle_range() {
                        triangle_visits[tri] += 1;
                    }
                }
            }
        }
        assert!(
            node_visits.iter().all(|&v| v == 1),
            "every node must be reachable exactly once"
        );
        assert!(
            triangle_visits.iter().all(|&v| v == 1),
            "every triangle must be in exactly one leaf"
        );
    }
}

use std::collections::HashSet;

use glam::vec3a;
use prt_bvh::{
    bvh::{BvhNode, BvhTree},
    ray::Ray,
    test_util::{
        brute_force_intersect,
        geometry::{
            coplanar_triangles, cube, random_direction, random_point, random_triangles,
            CUBE_FACE_POS_Z,
        },
    },
    BuildParams, BvhError,
};
use rand::{rngs::StdRng, SeedableRng};
use rayon::prelude::*;

fn random_rays(count: usize, rng: &mut StdRng) -> Vec<Ray> {
    (0..count)
        .map(|_| Ray::new_inf(random_point(rng, 15.0), random_direction(rng)))
        .collect()
}

fn same_distance(a: f32, b: f32) -> bool {
    (a - b).abs() <= 1e-4 * a.abs().max(1.0)
}

/// Indices into `bvh.triangles()` of every triangle below `node`.
fn subtree_triangles(bvh: &BvhTree, node: u32) -> Vec<usize> {
    let mut out = Vec::new();
    let mut stack = vec![node];
    while let Some(index) = stack.pop() {
        match bvh.nodes()[index as usize] {
            BvhNode::Internal { left, right, .. } => {
                stack.push(left);
                stack.push(right);
            }
            leaf => out.extend(leaf.triangle_range()),
        }
    }
    out
}

#[test]
fn cube_hit_and_miss() {
    let (indices, vertices) = cube();
    let bvh = BvhTree::build(&indices, &vertices).unwrap();

    let hit = bvh
        .intersect(Ray::new_inf(vec3a(0.0, 0.0, 5.0), vec3a(0.0, 0.0, -1.0)))
        .expect("ray down the z axis hits the top face");
    assert_eq!(hit.t, 4.5);
    // The ray goes through the diagonal shared by both triangles of the face.
    assert!(
        [2 * CUBE_FACE_POS_Z, 2 * CUBE_FACE_POS_Z + 1].contains(&hit.source_index),
        "hit triangle {}",
        hit.source_index
    );

    let miss = bvh.intersect(Ray::new_inf(vec3a(10.0, 10.0, 10.0), vec3a(1.0, 0.0, 0.0)));
    assert_eq!(miss, None);
}

#[test]
fn cube_hit_reports_barycentric() {
    let (indices, vertices) = cube();
    let bvh = BvhTree::build(&indices, &vertices).unwrap();
    let ray = Ray::new_inf(vec3a(0.25, -0.25, 5.0), vec3a(0.0, 0.0, -1.0));
    let hit = bvh.intersect(ray).unwrap();
    let tri = bvh
        .triangles()
        .iter()
        .find(|t| t.source_index == hit.source_index)
        .unwrap();
    assert!((tri.interpolate(hit.barycentric) - ray.at(hit.t)).length() < 1e-5);
}

#[test]
fn matches_brute_force() {
    let mut rng = StdRng::seed_from_u64(42);
    let tris = random_triangles(1000, &mut rng);
    let bvh = BvhTree::from_triangles(tris.clone(), &BuildParams::default()).unwrap();
    bvh.validate();

    let mut hits = 0;
    for ray in random_rays(2000, &mut rng) {
        let expected = brute_force_intersect(&tris, &ray);
        let actual = bvh.intersect(ray);
        match (expected, actual) {
            (None, None) => {}
            (Some((t, source_index)), Some(hit)) => {
                hits += 1;
                assert!(same_distance(hit.t, t), "{} != {t}", hit.t);
                if hit.source_index != source_index {
                    // Only acceptable as a tie.
                    let other = tris[hit.source_index as usize].intersect(&ray);
                    assert!(same_distance(other, t));
                }
            }
            (expected, actual) => panic!("expected {expected:?}, got {actual:?} for {ray:?}"),
        }
    }
    assert!(hits > 100, "scene too sparse to be meaningful: {hits} hits");
}

#[test]
fn occluded_matches_brute_force() {
    let mut rng = StdRng::seed_from_u64(5);
    let tris = random_triangles(300, &mut rng);
    let bvh = BvhTree::from_triangles(tris.clone(), &BuildParams::default()).unwrap();
    for ray in random_rays(500, &mut rng) {
        assert_eq!(
            bvh.occluded(ray),
            brute_force_intersect(&tris, &ray).is_some()
        );
    }
}

#[test]
fn missed_boxes_are_never_opened() {
    let mut rng = StdRng::seed_from_u64(9);
    let tris = random_triangles(500, &mut rng);
    let bvh = BvhTree::from_triangles(tris, &BuildParams::default()).unwrap();

    let mut total_tests = 0;
    for ray in random_rays(300, &mut rng) {
        let mut tested = HashSet::new();
        let mut state = bvh.new_traversal(ray);
        let (mut t, mut id) = (f32::INFINITY, u32::MAX);
        while bvh.traverse(&mut state, &mut t, &mut id, |ray, i| {
            tested.insert(i);
            bvh.triangles()[i].intersect(ray)
        }) {}
        total_tests += tested.len();

        for (index, node) in bvh.nodes().iter().enumerate() {
            if let BvhNode::Internal { aabb, .. } = node {
                if aabb.intersect_ray(&ray) == f32::INFINITY {
                    for tri in subtree_triangles(&bvh, index as u32) {
                        assert!(!tested.contains(&tri), "triangle {tri} tested inside a missed box");
                    }
                }
            }
        }
    }
    // Pruning must beat testing every triangle for every ray by a wide margin.
    assert!(total_tests < 300 * 500 / 5, "{total_tests} triangle tests");
}

#[test]
fn one_and_two_triangle_trees() {
    let mut rng = StdRng::seed_from_u64(1);
    for count in [1, 2] {
        let tris = random_triangles(count, &mut rng);
        let bvh = BvhTree::from_triangles(tris.clone(), &BuildParams::default()).unwrap();
        assert_eq!(bvh.node_count(), 1);
        assert!(bvh.root().is_leaf());
        assert_eq!(bvh.root().triangle_range().len(), count);

        // Aim at each triangle's centroid so there is at least one hit per triangle.
        for tri in &tris {
            let target = (tri.v0 + tri.v1 + tri.v2) / 3.0;
            let origin = target + vec3a(0.0, 0.0, 30.0);
            let ray = Ray::new_inf(origin, (target - origin).normalize());
            let expected = brute_force_intersect(&tris, &ray).map(|(t, _)| t);
            assert_eq!(bvh.intersect(ray).map(|h| h.t), expected);
            assert!(expected.is_some());
        }
    }
}

#[test]
fn coplanar_centers_still_build_shallow() {
    let mut rng = StdRng::seed_from_u64(1000);
    let tris = coplanar_triangles(1000, 2.0, &mut rng);
    let bvh = BvhTree::from_triangles(tris.clone(), &BuildParams::default()).unwrap();
    bvh.validate();

    let log2 = (1000f32).log2().ceil() as usize;
    assert!(bvh.depth() <= 3 * log2, "depth {}", bvh.depth());

    let sources: HashSet<u32> = bvh.triangles().iter().map(|t| t.source_index).collect();
    assert_eq!(sources.len(), 1000);

    // Overlapping triangles in one plane are hit at distances a few ulps apart, so only the
    // distance is compared, loosely.
    for ray in random_rays(200, &mut rng) {
        let expected = brute_force_intersect(&tris, &ray).map(|(t, _)| t);
        let actual = bvh.intersect(ray).map(|h| h.t);
        assert_eq!(actual.is_some(), expected.is_some());
        if let (Some(a), Some(e)) = (actual, expected) {
            assert!(same_distance(a, e), "{a} != {e}");
        }
    }
}

#[test]
fn coincident_triangles_terminate() {
    // Every triangle is the same: no center split can separate them.
    let tri = random_triangles(1, &mut StdRng::seed_from_u64(3))[0];
    let tris: Vec<_> = (0..257)
        .map(|i| {
            let mut t = tri;
            t.source_index = i;
            t
        })
        .collect();
    let bvh = BvhTree::from_triangles(tris, &BuildParams::default()).unwrap();
    bvh.validate();
    assert!(bvh.depth() <= 10);
}

#[test]
fn malformed_meshes_are_rejected() {
    let (mut indices, vertices) = cube();
    assert_eq!(
        BvhTree::build(&[], &vertices).unwrap_err(),
        BvhError::EmptyMesh
    );

    indices.pop();
    assert_eq!(
        BvhTree::build(&indices, &vertices).unwrap_err(),
        BvhError::IndexCountNotMultipleOfThree(35)
    );

    let bad = [0, 1, 8];
    assert!(matches!(
        BvhTree::build(&bad, &vertices),
        Err(BvhError::IndexOutOfRange { index: 8, .. })
    ));
}

#[test]
fn concurrent_queries_agree() {
    let mut rng = StdRng::seed_from_u64(77);
    let bvh = BvhTree::from_triangles(random_triangles(2000, &mut rng), &BuildParams::default())
        .unwrap();
    let rays = random_rays(4000, &mut rng);

    let sequential: Vec<_> = rays.iter().map(|ray| bvh.intersect(*ray)).collect();
    let parallel: Vec<_> = rays.par_iter().map(|ray| bvh.intersect(*ray)).collect();
    assert_eq!(sequential, parallel);
}

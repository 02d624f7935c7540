use glam::*;
use prt_bvh::{bvh::BvhTree, ray::Ray, test_util::geometry::cube};

fn main() {
    // A unit cube centered on the origin, as index and vertex buffers.
    let (indices, vertices) = cube();
    let bvh = BvhTree::build(&indices, &vertices).expect("cube mesh is well formed");
    println!(
        "Built {} triangles into {} nodes, depth {}",
        bvh.triangles().len(),
        bvh.node_count(),
        bvh.depth()
    );

    let rays = [
        Ray::new_inf(vec3a(0.0, 0.0, 5.0), vec3a(0.0, 0.0, -1.0)),
        Ray::new_inf(vec3a(10.0, 10.0, 10.0), vec3a(1.0, 0.0, 0.0)),
    ];

    for ray in rays {
        match bvh.intersect(ray) {
            Some(hit) => {
                println!("Hit Triangle {}", hit.source_index);
                println!("Distance to hit: {}", hit.t);
            }
            None => println!("Miss"),
        }
    }
}

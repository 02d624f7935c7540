use std::time::Instant;

use argh::FromArgs;
use rand::{rngs::StdRng, SeedableRng};
use rayon::prelude::*;

use prt_bvh::{
    builder::BuildParams,
    bvh::BvhTree,
    ray::Ray,
    test_util::{
        brute_force_intersect,
        geometry::{random_direction, random_point, random_triangles},
    },
    PrettyDuration,
};

/// Build a BVH over a random triangle soup and trace random rays through it.
#[derive(FromArgs)]
struct Args {
    /// number of triangles
    #[argh(option, default = "100_000")]
    triangles: usize,

    /// number of rays
    #[argh(option, default = "1_000_000")]
    rays: usize,

    /// rng seed for the scene and the rays
    #[argh(option, default = "0")]
    seed: u64,

    /// depth past which ranges are split in half
    #[argh(option, default = "BuildParams::default().max_depth")]
    max_depth: u32,

    /// check every ray against a linear scan of all triangles
    #[argh(switch)]
    brute_force: bool,
}

fn main() {
    let args: Args = argh::from_env();
    let mut rng = StdRng::seed_from_u64(args.seed);

    let tris = random_triangles(args.triangles, &mut rng);
    let start_time = Instant::now();
    let bvh = match BvhTree::from_triangles(
        tris.clone(),
        &BuildParams {
            max_depth: args.max_depth,
        },
    ) {
        Ok(bvh) => bvh,
        Err(e) => {
            eprintln!("Build failed: {e}");
            std::process::exit(1);
        }
    };
    println!(
        "Built {} triangles in {}: {} nodes, depth {}",
        args.triangles,
        PrettyDuration(start_time.elapsed()),
        bvh.node_count(),
        bvh.depth()
    );

    let rays: Vec<Ray> = (0..args.rays)
        .map(|_| Ray::new_inf(random_point(&mut rng, 15.0), random_direction(&mut rng)))
        .collect();

    let start_time = Instant::now();
    let hits: Vec<_> = rays
        .par_iter()
        .map_init(
            || bvh.new_traversal(Ray::default()),
            |state, ray| bvh.intersect_with(state, *ray),
        )
        .collect();
    let elapsed = start_time.elapsed();
    let hit_count = hits.iter().filter(|h| h.is_some()).count();
    println!(
        "Traced {} rays in {} ({:.2} Mrays/s), {} hits",
        args.rays,
        PrettyDuration(elapsed),
        args.rays as f64 / elapsed.as_secs_f64() / 1_000_000.0,
        hit_count
    );

    if args.brute_force {
        let start_time = Instant::now();
        let mismatches = rays
            .par_iter()
            .zip(hits.par_iter())
            .filter(|(ray, hit)| {
                brute_force_intersect(&tris, ray).map(|(t, _)| t) != hit.map(|h| h.t)
            })
            .count();
        println!(
            "Brute force check in {}: {} mismatches",
            PrettyDuration(start_time.elapsed()),
            mismatches
        );
        if mismatches > 0 {
            std::process::exit(1);
        }
    }
}

//! Random multi-dimensional knapsack solved with every search strategy.
//!
//! Run with: cargo run --release -p solver-mip --example knapsack [items] [seed]
//! Set RUST_LOG=debug to trace individual nodes.

use std::time::Instant;

use env_logger::Builder;
use log::LevelFilter;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use solver_lp::{Bounds, Direction};
use solver_mip::{solve_mip, BranchingRule, MipProblem, MipSettings, NodeSelection, VarKind};

fn knapsack(items: usize, seed: u64) -> MipProblem {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let values: Vec<f64> = (0..items).map(|_| rng.gen_range(10..60) as f64).collect();
    let weights: Vec<Vec<f64>> = (0..3)
        .map(|_| (0..items).map(|_| rng.gen_range(5..40) as f64).collect())
        .collect();

    let mut prob = MipProblem::from_dense(Direction::Maximize, values, &weights);
    for (i, row) in weights.iter().enumerate() {
        let cap = (row.iter().sum::<f64>() * 0.4).floor();
        prob = prob.with_row_bounds(i, Bounds::upper(cap));
    }
    for j in 0..items {
        prob = prob.with_kind(j, VarKind::Binary);
    }
    prob
}

fn main() {
    Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let mut args = std::env::args().skip(1);
    let items = args.next().and_then(|s| s.parse().ok()).unwrap_or(30);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(42);
    let prob = knapsack(items, seed);

    println!("=== Knapsack: {} items, 3 constraints, seed {} ===\n", items, seed);
    println!(
        "{:<16} {:<15} {:>12} {:>8} {:>10} {:>10}",
        "branching", "backtracking", "objective", "nodes", "lp iters", "time (ms)"
    );

    for rule in [
        BranchingRule::FirstFractional,
        BranchingRule::LastFractional,
        BranchingRule::MostFractional,
        BranchingRule::DriebeckTomlin,
    ] {
        for selection in [
            NodeSelection::DepthFirst,
            NodeSelection::BreadthFirst,
            NodeSelection::BestProjection,
            NodeSelection::BestBound,
        ] {
            let settings = MipSettings::default()
                .with_branching(rule)
                .with_node_selection(selection)
                .with_time_limit(30.0);

            let start = Instant::now();
            match solve_mip(&prob, &settings) {
                Ok(sol) => println!(
                    "{:<16} {:<15} {:>12} {:>8} {:>10} {:>10}",
                    format!("{:?}", rule),
                    format!("{:?}", selection),
                    sol.obj_val()
                        .map_or_else(|| format!("{:?}", sol.status), |v| format!("{:.1}", v)),
                    sol.nodes_created,
                    sol.lp_iterations,
                    start.elapsed().as_millis()
                ),
                Err(e) => println!("{:?}/{:?}: {}", rule, selection, e),
            }
        }
    }

    // One verbose run to show the progress log.
    println!();
    let settings = MipSettings {
        progress_interval_ms: 0,
        ..MipSettings::verbose()
    };
    if let Ok(sol) = solve_mip(&prob, &settings) {
        println!(
            "\nStatus: {:?}, bound {:.3}, gap {:.2}%",
            sol.status,
            sol.bound,
            sol.gap * 100.0
        );
    }
}

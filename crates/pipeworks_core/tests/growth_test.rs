//! # Growth Integration Test
//!
//! Runs whole generations and checks the grid and event invariants end to end.

use std::collections::HashSet;

use pipeworks_core::{
    DeathCurve, GridBounds, OccupancyGrid, PipeEvent, SimError, Voxel, World, WorldConfig,
    KILL_CHECK_MIN_PERCENT,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn run_to_completion(config: WorldConfig) -> (World, Vec<PipeEvent>) {
    let mut world = World::new(config).expect("valid config");
    let mut events = Vec::new();
    let mut ticks = 0;
    while !world.is_generation_complete() {
        world.tick(&mut events).expect("tick");
        ticks += 1;
        assert!(ticks < 100_000, "generation never completed");
    }
    (world, events)
}

/// Test: draining a grid visits every voxel exactly once.
#[test]
fn test_take_random_free_covers_every_voxel() {
    for (bounds, seed) in [([3, 5, 7], 1), ([8, 8, 1], 2), ([1, 1, 130], 3)] {
        let mut grid = OccupancyGrid::new(GridBounds::new(bounds[0], bounds[1], bounds[2]).unwrap());
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut seen = HashSet::new();

        while let Some(voxel) = grid.take_random_free(&mut rng) {
            assert!(seen.insert(voxel), "duplicate {voxel:?}");
        }

        assert_eq!(seen.len(), grid.total_voxels());
        assert_eq!(grid.used(), grid.total_voxels());
        assert!(grid.is_full());
    }
}

/// Test: every pipe's nodes are disjoint from every other pipe's nodes.
#[test]
fn test_pipes_never_collide() {
    let (world, _) = run_to_completion(WorldConfig {
        bounds: [10, 10, 10],
        max_pipes: 8,
        seed: Some(31337),
        death_curve: DeathCurve::Identity,
    });

    let mut claimed: HashSet<Voxel> = HashSet::new();
    for pipe in world.pipes() {
        assert!(!pipe.is_alive());
        for node in pipe.nodes() {
            assert!(claimed.insert(*node), "voxel {node:?} claimed twice");
        }
    }
    assert_eq!(claimed.len(), world.grid().used());
}

/// Test: each pipe's event stream follows the lifecycle New -> FirstPipe -> ... -> dead.
#[test]
fn test_event_stream_lifecycle() {
    let (world, events) = run_to_completion(WorldConfig {
        bounds: [9, 9, 9],
        max_pipes: 4,
        seed: Some(7),
        death_curve: DeathCurve::Identity,
    });

    for pipe_id in 0..world.pipe_count() {
        let stream: Vec<_> = events.iter().filter(|e| e.pipe_id() == pipe_id).collect();
        assert!(matches!(stream[0], PipeEvent::New { .. }));

        // Exactly one terminal event, and it is the last one.
        let terminal: Vec<_> = stream.iter().filter(|e| e.is_terminal()).collect();
        assert_eq!(terminal.len(), 1, "pipe {pipe_id}");
        assert!(stream.last().unwrap().is_terminal());

        // Growth events: one per node after the first.
        let growth = stream.iter().filter(|e| e.growth().is_some()).count();
        assert_eq!(growth + 1, world.pipe(pipe_id).unwrap().len());

        if growth > 0 {
            assert!(matches!(stream[1], PipeEvent::FirstPipe(_)));
            assert!(!stream[2..]
                .iter()
                .any(|e| matches!(e, PipeEvent::FirstPipe(_))));
        }
    }
}

/// Test: without the death bias pipes only die boxed in, so the grid ends densely packed.
#[test]
fn test_disabled_death_curve_only_exhaustion_kills() {
    let (world, events) = run_to_completion(WorldConfig {
        bounds: [5, 5, 5],
        max_pipes: 3,
        seed: Some(99),
        death_curve: DeathCurve::Disabled,
    });

    let deaths = events
        .iter()
        .filter(|e| matches!(e, PipeEvent::Died { .. }))
        .count();
    assert_eq!(deaths, world.pipe_count());
    assert!(events
        .iter()
        .filter_map(PipeEvent::growth)
        .all(|g| g.alive));
}

/// Test: the fill-ratio curve retires long pipes, keeping the node grown that tick.
#[test]
fn test_identity_curve_retires_long_pipes() {
    let mut retired = 0;
    for seed in 0..40 {
        let (world, events) = run_to_completion(WorldConfig {
            bounds: [6, 6, 6],
            max_pipes: 4,
            seed: Some(seed),
            death_curve: DeathCurve::Identity,
        });
        let min_len = world.grid().total_voxels() * KILL_CHECK_MIN_PERCENT / 100;

        let mut lengths = vec![0usize; world.pipe_count()];
        for event in &events {
            match event {
                PipeEvent::New { pipe_id, .. } => lengths[*pipe_id] = 1,
                PipeEvent::Died { .. } => {}
                _ => {
                    let Some(g) = event.growth() else { continue };
                    lengths[g.pipe_id] += 1;
                    if g.alive {
                        continue;
                    }
                    retired += 1;
                    assert!(
                        lengths[g.pipe_id] >= min_len,
                        "seed {seed}: pipe {} retired at length {}",
                        g.pipe_id,
                        lengths[g.pipe_id]
                    );

                    let pipe = world.pipe(g.pipe_id).unwrap();
                    assert!(!pipe.is_alive());
                    assert_eq!(pipe.head(), g.current_node);
                    assert_eq!(pipe.len(), lengths[g.pipe_id]);
                }
            }
        }
    }
    assert!(retired > 0, "no pipe was ever retired by the death curve");
}

/// Test: invalid configuration never builds a world.
#[test]
fn test_invalid_config_rejected() {
    let config = WorldConfig {
        max_pipes: 0,
        ..WorldConfig::default()
    };
    assert!(matches!(World::new(config), Err(SimError::InvalidConfig(_))));
}

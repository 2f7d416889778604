use std::collections::HashSet;

use pocket_spawn_core::{CellCoord, ConfigurationIssue, OccupancyGrid, SpawnError};
use pocket_spawn_system_discovery::{discover_pockets, PocketDiscovery};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn random_grid(side: u32, blocked_ratio: f64, seed: u64) -> OccupancyGrid {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let len = (side * side) as usize;
    let cells: Vec<bool> = (0..len).map(|_| rng.gen_bool(blocked_ratio)).collect();
    OccupancyGrid::from_cells(side, &cells).expect("grid")
}

fn cell_sets(grid: &OccupancyGrid) -> Vec<HashSet<CellCoord>> {
    discover_pockets(grid, grid.side())
        .expect("discovery")
        .iter()
        .map(|pocket| pocket.iter().collect())
        .collect()
}

#[test]
fn fully_open_grid_yields_single_pocket() {
    let grid = OccupancyGrid::from_rows(5, &[[0; 5]; 5]).expect("grid");
    let pockets = discover_pockets(&grid, 5).expect("discovery");

    assert_eq!(pockets.len(), 1);
    assert_eq!(pockets[0].len(), 25);
}

#[test]
fn all_blocked_grid_yields_no_pockets() {
    let grid = OccupancyGrid::from_rows(4, &[[1; 4]; 4]).expect("grid");
    let discovery = PocketDiscovery::run(&grid, 4).expect("discovery");

    assert!(discovery.pockets().is_empty());
    assert_eq!(discovery.visited().visited_count(), 0);
    assert_eq!(discovery.open_cell_count(), 0);
}

#[test]
fn pockets_partition_the_open_cells() {
    for seed in 0..16 {
        let grid = random_grid(24, 0.45, seed);
        let discovery = PocketDiscovery::run(&grid, 24).expect("discovery");

        let mut seen = HashSet::new();
        for pocket in discovery.pockets() {
            for cell in pocket.iter() {
                assert!(grid.is_open(cell), "blocked cell {cell} in a pocket");
                assert!(seen.insert(cell), "cell {cell} belongs to two pockets");
            }
        }

        let open: HashSet<_> = grid.open_cells().collect();
        assert_eq!(seen, open, "pockets do not cover every open cell");
        assert_eq!(discovery.visited().visited_count(), open.len());
        assert_eq!(discovery.open_cell_count(), open.len());
    }
}

#[test]
fn blocked_cells_are_never_visited() {
    let grid = random_grid(16, 0.5, 0xfeed);
    let discovery = PocketDiscovery::run(&grid, 16).expect("discovery");

    for row in 0..16 {
        for column in 0..16 {
            let cell = CellCoord::new(row, column);
            assert_eq!(discovery.visited().is_visited(cell), grid.is_open(cell));
        }
    }
}

#[test]
fn pockets_are_ordered_by_row_major_seed() {
    let grid = OccupancyGrid::from_rows(
        4,
        &[
            [1, 1, 1, 0],
            [0, 1, 1, 1],
            [1, 1, 0, 0],
            [0, 1, 1, 1],
        ],
    )
    .expect("grid");
    let pockets = discover_pockets(&grid, 4).expect("discovery");

    let seeds: Vec<_> = pockets.iter().map(|pocket| pocket.get(0)).collect();
    assert_eq!(
        seeds,
        vec![
            Some(CellCoord::new(0, 3)),
            Some(CellCoord::new(1, 0)),
            Some(CellCoord::new(2, 2)),
            Some(CellCoord::new(3, 0)),
        ]
    );
    for (index, pocket) in pockets.iter().enumerate() {
        assert_eq!(pocket.id().get() as usize, index);
    }
}

#[test]
fn diagonal_cells_are_separate_pockets() {
    let grid = OccupancyGrid::from_rows(2, &[[0, 1], [1, 0]]).expect("grid");
    let pockets = discover_pockets(&grid, 2).expect("discovery");

    assert_eq!(pockets.len(), 2);
    assert!(pockets.iter().all(|pocket| pocket.len() == 1));
}

#[test]
fn large_open_region_does_not_exhaust_the_stack() {
    let grid = OccupancyGrid::open(512);
    let pockets = discover_pockets(&grid, 512).expect("discovery");

    assert_eq!(pockets.len(), 1);
    assert_eq!(pockets[0].len(), 512 * 512);
}

#[test]
fn serpentine_corridor_is_one_pocket() {
    let side = 64u32;
    let mut rows = vec![vec![1u8; side as usize]; side as usize];
    for (row, cells) in rows.iter_mut().enumerate() {
        if row % 2 == 0 {
            cells.fill(0);
        } else if row % 4 == 1 {
            cells[side as usize - 1] = 0;
        } else {
            cells[0] = 0;
        }
    }
    let grid = OccupancyGrid::from_rows(side, &rows).expect("grid");
    let pockets = discover_pockets(&grid, side).expect("discovery");

    assert_eq!(pockets.len(), 1);
    assert_eq!(pockets[0].len(), grid.open_cells().count());
}

#[test]
fn rediscovery_yields_identical_cell_sets() {
    let grid = random_grid(32, 0.4, 0x5eed);

    assert_eq!(cell_sets(&grid), cell_sets(&grid));
}

#[test]
fn declared_size_must_match_grid() {
    let grid = OccupancyGrid::open(6);

    assert_eq!(
        discover_pockets(&grid, 8).unwrap_err(),
        SpawnError::Configuration(ConfigurationIssue::MapSizeMismatch {
            declared: 8,
            actual: 6,
        })
    );
}

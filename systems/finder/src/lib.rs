#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! End-to-end spawn location finder.
//!
//! [`SpawnLocationFinder`] runs region discovery to completion, picks the
//! largest pocket, anchors it and samples the spawn cluster, threading one
//! random source through every draw. Each call to
//! [`SpawnLocationFinder::generate`] allocates its own visited mask and pocket
//! list, so the finder never carries grid state from one run to the next.

use log::{debug, warn};
use pocket_spawn_core::{CellCoord, OccupancyGrid, Pocket, SpawnConfig, SpawnError};
use pocket_spawn_system_discovery::{PocketDiscovery, VisitedMask};
use pocket_spawn_system_selection::{
    sample_spawn_points, select_anchor, select_largest, SamplingBudget,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Everything produced by a single spawn computation.
#[derive(Clone, Debug)]
pub struct SpawnPlan {
    pockets: Vec<Pocket>,
    visited: VisitedMask,
    largest: usize,
    anchor: CellCoord,
    spawn_points: Vec<CellCoord>,
}

impl SpawnPlan {
    /// Pockets in discovery order.
    #[must_use]
    pub fn pockets(&self) -> &[Pocket] {
        &self.pockets
    }

    /// Visited mask left behind by discovery.
    #[must_use]
    pub fn visited(&self) -> &VisitedMask {
        &self.visited
    }

    /// Index of the pocket chosen as the spawn region.
    #[must_use]
    pub fn largest_pocket_index(&self) -> usize {
        self.largest
    }

    /// Pocket chosen as the spawn region.
    #[must_use]
    pub fn largest_pocket(&self) -> &Pocket {
        &self.pockets[self.largest]
    }

    /// Cell around which the spawn points were sampled.
    #[must_use]
    pub fn anchor(&self) -> CellCoord {
        self.anchor
    }

    /// Spawn points in the order they were selected.
    #[must_use]
    pub fn spawn_points(&self) -> &[CellCoord] {
        &self.spawn_points
    }

    /// Consumes the plan, keeping only the spawn points.
    #[must_use]
    pub fn into_spawn_points(self) -> Vec<CellCoord> {
        self.spawn_points
    }
}

/// Computes spawn clusters for occupancy grids.
#[derive(Clone, Debug)]
pub struct SpawnLocationFinder<R = ChaCha8Rng> {
    config: SpawnConfig,
    budget: SamplingBudget,
    rng: R,
}

impl SpawnLocationFinder<ChaCha8Rng> {
    /// Creates a finder whose draws replay exactly for a given seed.
    #[must_use]
    pub fn from_seed(config: SpawnConfig, seed: u64) -> Self {
        Self::new(config, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R> SpawnLocationFinder<R>
where
    R: Rng,
{
    /// Creates a finder that draws from the provided random source.
    #[must_use]
    pub fn new(config: SpawnConfig, rng: R) -> Self {
        Self {
            config,
            budget: SamplingBudget::default(),
            rng,
        }
    }

    /// Replaces the rejection-sampling budget.
    #[must_use]
    pub fn with_budget(mut self, budget: SamplingBudget) -> Self {
        self.budget = budget;
        self
    }

    /// Configuration applied to every run.
    #[must_use]
    pub fn config(&self) -> &SpawnConfig {
        &self.config
    }

    /// Sampling budget applied to every run.
    #[must_use]
    pub fn budget(&self) -> SamplingBudget {
        self.budget
    }

    /// Runs discovery and selection against `grid`.
    pub fn generate(&mut self, grid: &OccupancyGrid) -> Result<SpawnPlan, SpawnError> {
        self.plan(grid).map_err(|error| {
            warn!("spawn generation failed: {error}");
            error
        })
    }

    fn plan(&mut self, grid: &OccupancyGrid) -> Result<SpawnPlan, SpawnError> {
        let (pockets, visited) = PocketDiscovery::run(grid, self.config.map_size())?.into_parts();
        let largest = select_largest(&pockets)?;
        let pocket = &pockets[largest];
        let anchor = select_anchor(pocket, &mut self.rng)?;
        let spawn_points = sample_spawn_points(
            anchor,
            pocket,
            self.config.map_size(),
            self.config.spawn_points(),
            self.config.spawn_spread(),
            self.budget,
            &mut self.rng,
        )?;

        debug!(
            "placed {} spawn points in pocket {} around {anchor}",
            spawn_points.len(),
            pocket.id()
        );

        Ok(SpawnPlan {
            pockets,
            visited,
            largest,
            anchor,
            spawn_points,
        })
    }
}

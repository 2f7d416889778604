#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Region discovery system that partitions open grid cells into pockets.
//!
//! A single row-major scan seeds one flood fill per unvisited open cell. Each
//! flood fill walks 4-connected neighbours with an explicit work-list, so the
//! traversal depth never depends on the call stack.

use log::{debug, trace};
use pocket_spawn_core::{
    CellCoord, ConfigurationIssue, OccupancyGrid, Pocket, PocketId, SpawnError,
};

/// Write-once record of which cells have been claimed by a pocket.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VisitedMask {
    side: u32,
    visited: Vec<bool>,
}

impl VisitedMask {
    /// Creates an unvisited mask for a grid with the provided side length.
    #[must_use]
    pub fn new(side: u32) -> Self {
        let len = usize::try_from(side).unwrap_or(0);
        Self {
            side,
            visited: vec![false; len.saturating_mul(len)],
        }
    }

    /// Reports whether the cell has been claimed. Cells outside the mask never are.
    #[must_use]
    pub fn is_visited(&self, cell: CellCoord) -> bool {
        self.offset(cell)
            .and_then(|offset| self.visited.get(offset).copied())
            .unwrap_or(false)
    }

    /// Number of cells claimed so far.
    #[must_use]
    pub fn visited_count(&self) -> usize {
        self.visited.iter().filter(|visited| **visited).count()
    }

    /// Claims the cell, returning `false` when it was already claimed or lies
    /// outside the mask.
    fn mark(&mut self, cell: CellCoord) -> bool {
        let Some(slot) = self.offset(cell).and_then(|offset| self.visited.get_mut(offset)) else {
            return false;
        };

        if *slot {
            return false;
        }

        *slot = true;
        true
    }

    fn offset(&self, cell: CellCoord) -> Option<usize> {
        if cell.row() >= self.side || cell.column() >= self.side {
            return None;
        }

        let side = usize::try_from(self.side).ok()?;
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        row.checked_mul(side)?.checked_add(column)
    }
}

/// Outcome of one discovery pass: the pockets plus the mask that produced them.
#[derive(Clone, Debug)]
pub struct PocketDiscovery {
    visited: VisitedMask,
    pockets: Vec<Pocket>,
}

impl PocketDiscovery {
    /// Scans the grid once and collects every pocket in row-major seed order.
    ///
    /// `map_size` must equal the grid's side length; a mismatch is reported as
    /// a configuration error rather than silently truncating the scan.
    pub fn run(grid: &OccupancyGrid, map_size: u32) -> Result<Self, SpawnError> {
        if map_size != grid.side() {
            return Err(ConfigurationIssue::MapSizeMismatch {
                declared: map_size,
                actual: grid.side(),
            }
            .into());
        }

        let mut visited = VisitedMask::new(map_size);
        let mut pockets = Vec::new();
        let mut pending = Vec::new();

        for row in 0..map_size {
            for column in 0..map_size {
                let seed = CellCoord::new(row, column);
                if !grid.is_open(seed) || !visited.mark(seed) {
                    continue;
                }

                let id = PocketId::new(u32::try_from(pockets.len()).unwrap_or(u32::MAX));
                let cells = flood_fill(grid, &mut visited, seed, &mut pending);
                trace!("pocket {id} seeded at {seed} holds {} cells", cells.len());
                pockets.push(Pocket::from_cells(id, cells));
            }
        }

        let discovery = Self { visited, pockets };
        debug!(
            "discovered {} pockets covering {} open cells on a {map_size}x{map_size} grid",
            discovery.pockets.len(),
            discovery.open_cell_count()
        );
        Ok(discovery)
    }

    /// Pockets in the order their seed cell was met during the scan.
    #[must_use]
    pub fn pockets(&self) -> &[Pocket] {
        &self.pockets
    }

    /// Mask recording every cell claimed by a pocket.
    #[must_use]
    pub fn visited(&self) -> &VisitedMask {
        &self.visited
    }

    /// Number of open cells, which equals the combined size of all pockets.
    #[must_use]
    pub fn open_cell_count(&self) -> usize {
        self.pockets.iter().map(Pocket::len).sum()
    }

    /// Splits the discovery into its pockets and visited mask.
    #[must_use]
    pub fn into_parts(self) -> (Vec<Pocket>, VisitedMask) {
        (self.pockets, self.visited)
    }
}

/// Partitions the open cells of `grid` into pockets.
///
/// Convenience wrapper around [`PocketDiscovery::run`] for callers that do not
/// need the visited mask.
pub fn discover_pockets(grid: &OccupancyGrid, map_size: u32) -> Result<Vec<Pocket>, SpawnError> {
    PocketDiscovery::run(grid, map_size).map(|discovery| discovery.into_parts().0)
}

/// Collects every open cell reachable from an already claimed seed.
fn flood_fill(
    grid: &OccupancyGrid,
    visited: &mut VisitedMask,
    seed: CellCoord,
    pending: &mut Vec<CellCoord>,
) -> Vec<CellCoord> {
    let mut cells = Vec::new();
    pending.clear();
    pending.push(seed);

    while let Some(cell) = pending.pop() {
        cells.push(cell);

        for neighbor in neighbors(cell, grid.side()) {
            if grid.is_open(neighbor) && visited.mark(neighbor) {
                pending.push(neighbor);
            }
        }
    }

    cells
}

fn neighbors(cell: CellCoord, side: u32) -> impl Iterator<Item = CellCoord> {
    let mut candidates = [None; 4];
    let mut count = 0;

    if let Some(row) = cell.row().checked_add(1) {
        if row < side {
            candidates[count] = Some(CellCoord::new(row, cell.column()));
            count += 1;
        }
    }

    if let Some(row) = cell.row().checked_sub(1) {
        candidates[count] = Some(CellCoord::new(row, cell.column()));
        count += 1;
    }

    if let Some(column) = cell.column().checked_add(1) {
        if column < side {
            candidates[count] = Some(CellCoord::new(cell.row(), column));
            count += 1;
        }
    }

    if let Some(column) = cell.column().checked_sub(1) {
        candidates[count] = Some(CellCoord::new(cell.row(), column));
        count += 1;
    }

    candidates.into_iter().take(count).flatten()
}

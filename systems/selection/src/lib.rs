#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Spawn selection system that turns discovered pockets into spawn points.
//!
//! Selection happens in three steps: the largest pocket is chosen, an anchor
//! cell is drawn uniformly from it, and spawn points are rejection-sampled
//! from a half-open window around the anchor. Every random draw goes through
//! the caller's generator so a seeded generator replays the same points.

use std::ops::Range;

use log::{debug, trace};
use pocket_spawn_core::{CellCoord, ConfigurationIssue, Pocket, SpawnError};
use rand::Rng;

/// Upper bound on the rejection-sampling draws spent on each spawn point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SamplingBudget {
    attempts_per_point: u32,
}

impl SamplingBudget {
    /// Draws allowed per spawn point when no explicit budget is supplied.
    pub const DEFAULT_ATTEMPTS_PER_POINT: u32 = 4_096;

    /// Creates a budget allowing the provided number of draws per point.
    #[must_use]
    pub const fn new(attempts_per_point: u32) -> Self {
        Self { attempts_per_point }
    }

    /// Draws allowed before a point is taken from the remaining eligible cells.
    #[must_use]
    pub const fn attempts_per_point(&self) -> u32 {
        self.attempts_per_point
    }
}

impl Default for SamplingBudget {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ATTEMPTS_PER_POINT)
    }
}

/// Square window of candidate cells centred on an anchor.
///
/// Both axes cover `[anchor - spread, anchor + spread)`, so the window is
/// `2 * spread` cells wide and excludes its far edge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpreadWindow {
    rows: Range<i64>,
    columns: Range<i64>,
}

impl SpreadWindow {
    /// Builds the window around `anchor` with the provided half-width.
    #[must_use]
    pub fn around(anchor: CellCoord, spread: u32) -> Self {
        let spread = i64::from(spread);
        let row = i64::from(anchor.row());
        let column = i64::from(anchor.column());
        Self {
            rows: row - spread..row + spread,
            columns: column - spread..column + spread,
        }
    }

    /// Reports whether the cell falls inside the window.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.rows.contains(&i64::from(cell.row()))
            && self.columns.contains(&i64::from(cell.column()))
    }

    fn draw<R>(&self, rng: &mut R) -> (i64, i64)
    where
        R: Rng + ?Sized,
    {
        (
            rng.gen_range(self.rows.clone()),
            rng.gen_range(self.columns.clone()),
        )
    }
}

/// Returns the index of the largest pocket.
///
/// Ties keep the earliest pocket, which is the first one met in row-major scan
/// order when the list comes straight from discovery.
pub fn select_largest(pockets: &[Pocket]) -> Result<usize, SpawnError> {
    let mut largest: Option<(usize, usize)> = None;

    for (index, pocket) in pockets.iter().enumerate() {
        match largest {
            Some((_, size)) if pocket.len() <= size => {}
            _ => largest = Some((index, pocket.len())),
        }
    }

    match largest {
        Some((index, size)) if size > 0 => {
            debug!("selected pocket {index} of {} with {size} cells", pockets.len());
            Ok(index)
        }
        _ => Err(SpawnError::NoSpawnablePocket),
    }
}

/// Draws one member of the pocket with uniform probability.
pub fn select_anchor<R>(pocket: &Pocket, rng: &mut R) -> Result<CellCoord, SpawnError>
where
    R: Rng + ?Sized,
{
    if pocket.is_empty() {
        return Err(SpawnError::EmptyPocket { pocket: pocket.id() });
    }

    let index = rng.gen_range(0..pocket.len());
    let anchor = pocket
        .get(index)
        .ok_or(SpawnError::EmptyPocket { pocket: pocket.id() })?;
    debug!("anchored pocket {} at {anchor}", pocket.id());
    Ok(anchor)
}

/// Samples `count` distinct spawn points from the window around `anchor`.
///
/// Each accepted point lies inside the `map_size` grid, belongs to `pocket`
/// and has not been chosen before. Points are returned in the order they were
/// accepted. Every point is first rejection-sampled from the window; once a
/// point spends its whole `budget`, it is drawn uniformly from the eligible
/// cells not chosen yet, which yields the same distribution. Sampling fails
/// with [`SpawnError::SpawnPointUnavailable`] only when the window holds fewer
/// than `count` eligible cells.
pub fn sample_spawn_points<R>(
    anchor: CellCoord,
    pocket: &Pocket,
    map_size: u32,
    count: u32,
    spread: u32,
    budget: SamplingBudget,
    rng: &mut R,
) -> Result<Vec<CellCoord>, SpawnError>
where
    R: Rng + ?Sized,
{
    if count == 0 {
        return Err(ConfigurationIssue::ZeroSpawnPoints.into());
    }
    if spread == 0 {
        return Err(ConfigurationIssue::ZeroSpread.into());
    }

    let window = SpreadWindow::around(anchor, spread);
    let mut remaining: Vec<CellCoord> = pocket
        .iter()
        .filter(|cell| in_bounds(*cell, map_size) && window.contains(*cell))
        .collect();
    let eligible = u32::try_from(remaining.len()).unwrap_or(u32::MAX);
    let unavailable = SpawnError::SpawnPointUnavailable {
        requested: count,
        eligible,
    };

    if eligible < count {
        return Err(unavailable);
    }

    let mut points: Vec<CellCoord> = Vec::new();
    for _ in 0..count {
        let point = match draw_point(&window, pocket, map_size, &points, budget, rng) {
            Some(point) => point,
            None => draw_remaining(&remaining, rng).ok_or(unavailable)?,
        };
        remaining.retain(|cell| *cell != point);
        points.push(point);
    }

    debug!(
        "sampled {} spawn points around {anchor} from {eligible} eligible cells",
        points.len()
    );
    Ok(points)
}

fn draw_point<R>(
    window: &SpreadWindow,
    pocket: &Pocket,
    map_size: u32,
    chosen: &[CellCoord],
    budget: SamplingBudget,
    rng: &mut R,
) -> Option<CellCoord>
where
    R: Rng + ?Sized,
{
    for attempt in 0..budget.attempts_per_point() {
        let (row, column) = window.draw(rng);
        let Some(candidate) = to_cell(row, column, map_size) else {
            continue;
        };

        if pocket.contains(candidate) && !chosen.contains(&candidate) {
            trace!("accepted {candidate} after {} draws", attempt + 1);
            return Some(candidate);
        }
    }

    None
}

fn draw_remaining<R>(remaining: &[CellCoord], rng: &mut R) -> Option<CellCoord>
where
    R: Rng + ?Sized,
{
    if remaining.is_empty() {
        return None;
    }

    let candidate = remaining.get(rng.gen_range(0..remaining.len())).copied()?;
    trace!("budget spent, drew {candidate} from {} remaining cells", remaining.len());
    Some(candidate)
}

fn to_cell(row: i64, column: i64, map_size: u32) -> Option<CellCoord> {
    let cell = CellCoord::new(u32::try_from(row).ok()?, u32::try_from(column).ok()?);
    in_bounds(cell, map_size).then_some(cell)
}

fn in_bounds(cell: CellCoord, map_size: u32) -> bool {
    cell.row() < map_size && cell.column() < map_size
}

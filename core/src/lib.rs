#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the pocket spawn workspace.
//!
//! This crate defines the values that flow between the systems. An external
//! map generator supplies an [`OccupancyGrid`], the discovery system carves it
//! into [`Pocket`] values, and the selection system turns the largest pocket
//! into a list of [`CellCoord`] spawn points. Every failure along the way is
//! reported through [`SpawnError`].

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Grid side length used when no explicit configuration is supplied.
pub const DEFAULT_MAP_SIZE: u32 = 64;
/// Number of spawn points produced when no explicit configuration is supplied.
pub const DEFAULT_SPAWN_POINTS: u32 = 3;
/// Half-width of the sampling window when no explicit configuration is supplied.
pub const DEFAULT_SPAWN_SPREAD: u32 = 2;

/// Location of a single grid cell.
///
/// Coordinates order by row and then by column, which matches the row-major
/// scan used to discover pockets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    row: u32,
    column: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

/// Marker stored in a single cell of the input grid.
///
/// Zero markers are open, everything else is blocked. For `bool` markers the
/// value answers "is this cell blocked?", so `false` is open.
pub trait CellMarker {
    /// Reports whether the marker describes a traversable cell.
    fn is_open(&self) -> bool;
}

macro_rules! integer_markers {
    ($($ty:ty),*) => {
        $(
            impl CellMarker for $ty {
                fn is_open(&self) -> bool {
                    *self == 0
                }
            }
        )*
    };
}

integer_markers!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl CellMarker for bool {
    fn is_open(&self) -> bool {
        !*self
    }
}

/// Square, immutable occupancy grid.
///
/// The grid always matches its declared side length; constructors reject any
/// input whose real extent disagrees with the declared `map_size`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OccupancyGrid {
    side: u32,
    open: Vec<bool>,
}

impl OccupancyGrid {
    /// Builds a grid from nested rows of markers.
    ///
    /// Fails with [`ConfigurationIssue::MapSizeMismatch`] when the number of
    /// rows differs from `map_size` and with [`ConfigurationIssue::RaggedRow`]
    /// when any row has a different length.
    pub fn from_rows<T, R>(map_size: u32, rows: &[R]) -> Result<Self, SpawnError>
    where
        T: CellMarker,
        R: AsRef<[T]>,
    {
        let side = side_len(map_size)?;
        if rows.len() != side {
            return Err(ConfigurationIssue::MapSizeMismatch {
                declared: map_size,
                actual: saturating_u32(rows.len()),
            }
            .into());
        }

        let mut open = Vec::with_capacity(side * side);
        for (index, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != side {
                return Err(ConfigurationIssue::RaggedRow {
                    row: saturating_u32(index),
                    expected: map_size,
                    actual: saturating_u32(row.len()),
                }
                .into());
            }
            open.extend(row.iter().map(CellMarker::is_open));
        }

        Ok(Self {
            side: map_size,
            open,
        })
    }

    /// Builds a grid from a flat row-major buffer of markers.
    ///
    /// Fails with [`ConfigurationIssue::CellCountMismatch`] unless the buffer
    /// holds exactly `map_size * map_size` markers.
    pub fn from_cells<T>(map_size: u32, cells: &[T]) -> Result<Self, SpawnError>
    where
        T: CellMarker,
    {
        let side = side_len(map_size)?;
        let expected = side.checked_mul(side).ok_or(ConfigurationIssue::CellCountMismatch {
            expected: usize::MAX,
            actual: cells.len(),
        })?;
        if cells.len() != expected {
            return Err(ConfigurationIssue::CellCountMismatch {
                expected,
                actual: cells.len(),
            }
            .into());
        }

        Ok(Self {
            side: map_size,
            open: cells.iter().map(CellMarker::is_open).collect(),
        })
    }

    /// Creates a grid where every cell is open.
    #[must_use]
    pub fn open(side: u32) -> Self {
        Self::filled(side, true)
    }

    /// Creates a grid where every cell is blocked.
    #[must_use]
    pub fn blocked(side: u32) -> Self {
        Self::filled(side, false)
    }

    fn filled(side: u32, open: bool) -> Self {
        let len = usize::try_from(side).unwrap_or(0);
        Self {
            side,
            open: vec![open; len.saturating_mul(len)],
        }
    }

    /// Side length of the grid measured in cells.
    #[must_use]
    pub const fn side(&self) -> u32 {
        self.side
    }

    /// Reports whether the cell lies within the grid.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        cell.row() < self.side && cell.column() < self.side
    }

    /// Reports whether the cell is open. Cells outside the grid are not.
    #[must_use]
    pub fn is_open(&self, cell: CellCoord) -> bool {
        self.index(cell)
            .and_then(|index| self.open.get(index).copied())
            .unwrap_or(false)
    }

    /// Row-major offset of the cell, if it lies within the grid.
    #[must_use]
    pub fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }

        let side = usize::try_from(self.side).ok()?;
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        row.checked_mul(side)?.checked_add(column)
    }

    /// Iterates over every open cell in row-major order.
    pub fn open_cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        let side = usize::try_from(self.side).unwrap_or(0);
        self.open
            .iter()
            .enumerate()
            .filter(|(_, open)| **open)
            // Row and column are both below `side`, which is a `u32`.
            .map(move |(index, _)| CellCoord::new((index / side) as u32, (index % side) as u32))
    }
}

fn side_len(map_size: u32) -> Result<usize, SpawnError> {
    usize::try_from(map_size).map_err(|_| {
        SpawnError::from(ConfigurationIssue::MapSizeMismatch {
            declared: map_size,
            actual: 0,
        })
    })
}

fn saturating_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

/// Identifier of a pocket, equal to its position in discovery order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PocketId(u32);

impl PocketId {
    /// Creates a new pocket identifier wrapper.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the underlying discovery index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for PocketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Maximal 4-connected region of open cells.
///
/// Members are kept unique and sorted in row-major order. The sort doubles as
/// the fixed enumeration used when drawing a member by index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pocket {
    id: PocketId,
    cells: Vec<CellCoord>,
}

impl Pocket {
    /// Creates a pocket from the provided cells, discarding duplicates.
    #[must_use]
    pub fn from_cells<I>(id: PocketId, cells: I) -> Self
    where
        I: IntoIterator<Item = CellCoord>,
    {
        let mut cells: Vec<CellCoord> = cells.into_iter().collect();
        cells.sort_unstable();
        cells.dedup();
        Self { id, cells }
    }

    /// Identifier assigned to the pocket during discovery.
    #[must_use]
    pub const fn id(&self) -> PocketId {
        self.id
    }

    /// Number of cells in the pocket.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether the pocket holds no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Reports whether the cell belongs to the pocket.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.cells.binary_search(&cell).is_ok()
    }

    /// Member at the provided position of the row-major enumeration.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<CellCoord> {
        self.cells.get(index).copied()
    }

    /// Iterates over the members in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.cells.iter().copied()
    }
}

/// Configuration parameters required to compute spawn points.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SpawnConfig {
    map_size: u32,
    spawn_points: u32,
    spawn_spread: u32,
}

impl SpawnConfig {
    /// Creates a validated configuration.
    ///
    /// Both the spawn point count and the spread must be at least one.
    pub const fn new(
        map_size: u32,
        spawn_points: u32,
        spawn_spread: u32,
    ) -> Result<Self, ConfigurationIssue> {
        if spawn_points == 0 {
            return Err(ConfigurationIssue::ZeroSpawnPoints);
        }
        if spawn_spread == 0 {
            return Err(ConfigurationIssue::ZeroSpread);
        }

        Ok(Self {
            map_size,
            spawn_points,
            spawn_spread,
        })
    }

    /// Declared side length of the grid.
    #[must_use]
    pub const fn map_size(&self) -> u32 {
        self.map_size
    }

    /// Number of spawn points to produce.
    #[must_use]
    pub const fn spawn_points(&self) -> u32 {
        self.spawn_points
    }

    /// Half-width of the sampling window around the anchor.
    #[must_use]
    pub const fn spawn_spread(&self) -> u32 {
        self.spawn_spread
    }
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            map_size: DEFAULT_MAP_SIZE,
            spawn_points: DEFAULT_SPAWN_POINTS,
            spawn_spread: DEFAULT_SPAWN_SPREAD,
        }
    }
}

/// Reasons a configuration or grid is rejected before any work is done.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum ConfigurationIssue {
    /// The declared side length disagrees with the grid's real extent.
    #[error("declared map size {declared} does not match grid extent {actual}")]
    MapSizeMismatch {
        /// Side length the caller declared.
        declared: u32,
        /// Extent observed on the supplied grid.
        actual: u32,
    },
    /// One of the grid rows has a different length than the declared side.
    #[error("row {row} holds {actual} cells but the map size is {expected}")]
    RaggedRow {
        /// Index of the offending row.
        row: u32,
        /// Length every row must have.
        expected: u32,
        /// Length observed on the row.
        actual: u32,
    },
    /// A flat cell buffer does not hold `map_size * map_size` markers.
    #[error("grid buffer holds {actual} cells but {expected} were expected")]
    CellCountMismatch {
        /// Number of markers the declared side requires.
        expected: usize,
        /// Number of markers supplied.
        actual: usize,
    },
    /// The requested spawn point count is zero.
    #[error("spawn point count must be at least one")]
    ZeroSpawnPoints,
    /// The requested spawn spread is zero.
    #[error("spawn spread must be at least one")]
    ZeroSpread,
}

/// Failures surfaced while computing spawn points.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum SpawnError {
    /// The grid or configuration is inconsistent.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationIssue),
    /// The grid holds no open cells, so no pocket exists.
    #[error("unable to locate a spawnable pocket")]
    NoSpawnablePocket,
    /// The selected pocket has no members.
    #[error("pocket {pocket} has no cells to pick a spawn origin from")]
    EmptyPocket {
        /// Pocket that was found empty.
        pocket: PocketId,
    },
    /// Not enough distinct spawn points could be sampled near the anchor.
    #[error("{requested} spawn points requested but only {eligible} eligible cells lie near the anchor")]
    SpawnPointUnavailable {
        /// Number of spawn points requested.
        requested: u32,
        /// Number of cells inside the window that could ever be accepted.
        eligible: u32,
    },
}

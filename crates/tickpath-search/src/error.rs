use std::io;

use thiserror::Error;
use tickpath_core::Point;

/// Reasons a goal-bounds table cannot be used.
///
/// Goal-bound queries refuse to run against a table that fails any of
/// these checks, since a partial or outdated table prunes valid paths.
#[derive(Debug, Error)]
pub enum GoalBoundsError {
    /// No table is installed and preprocessing has not completed.
    #[error("no goal-bounds table; run preprocessing or install one")]
    Missing,
    /// The table was built for a map of another size.
    #[error("goal-bounds table is {found:?} but the map is {expected:?}")]
    DimensionMismatch { expected: Point, found: Point },
    /// The table was built for different walkability.
    #[error("goal-bounds table is stale (fingerprint {found:#018x}, map {expected:#018x})")]
    Stale { expected: u64, found: u64 },
    /// A walkable cell lacks one or more directional boxes.
    #[error("goal-bounds table has no complete entry for {0}")]
    Incomplete(Point),
    /// Persisted data is malformed.
    #[error("corrupt goal-bounds data: {0}")]
    Corrupt(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

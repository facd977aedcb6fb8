//! Goal-bounding: precomputed directional boxes that prune A* expansion.
//!
//! For every walkable source cell, an exhaustive zero-heuristic flood fill
//! assigns each reached cell to one of four buckets, named after the first
//! step a shortest path from the source takes toward it. Each bucket keeps
//! the bounding box of its cells. At query time, a candidate cell is only
//! expanded when one of the start's boxes holds both the candidate and the
//! goal.
//!
//! Buckets are assigned when a cell is expanded. At that moment its parent
//! is final: with strictly positive step costs a zero-heuristic fill closes
//! cells in nondecreasing `g` order, so a closed cell's `f` is always below
//! any new offer and the `>=` reopening rule never fires. Every
//! cell on a shortest-path-tree branch carries the branch's first step and
//! the box holding the goal also holds the whole branch leading to it.
//! Pruning therefore never removes the optimal path.

use std::time::Instant;

use log::{debug, info, trace, warn};
use tickpath_core::{Grid, Point};

use crate::astar::{AStarPathfinding, Expansion, SearchResult};
use crate::error::GoalBoundsError;
use crate::frontier::Frontier;
use crate::heuristic::Heuristic;
use crate::node::NodeRecord;

/// First-step direction of a bucket.
///
/// `Up` is increasing `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(i: u8) -> Option<Self> {
        Self::ALL.get(usize::from(i)).copied()
    }

    /// Bucket of a step by `delta` out of the source: vertical movement
    /// wins over horizontal.
    pub fn of_offset(delta: Point) -> Self {
        if delta.y > 0 {
            Direction::Up
        } else if delta.y < 0 {
            Direction::Down
        } else if delta.x > 0 {
            Direction::Right
        } else {
            Direction::Left
        }
    }
}

/// Inclusive axis-aligned box. Starts empty and only grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundBox {
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
}

impl Default for BoundBox {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl BoundBox {
    pub const EMPTY: BoundBox = BoundBox {
        min_x: i32::MAX,
        max_x: i32::MIN,
        min_y: i32::MAX,
        max_y: i32::MIN,
    };

    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    pub fn grow(&mut self, p: Point) {
        self.min_x = self.min_x.min(p.x);
        self.max_x = self.max_x.max(p.x);
        self.min_y = self.min_y.min(p.y);
        self.max_y = self.max_y.max(p.y);
    }

    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }
}

/// One directional box of one source, the unit of persistence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundRecord {
    pub source: Point,
    pub direction: Direction,
    pub bounds: BoundBox,
}

/// Per-cell goal-bound boxes for one map.
///
/// The table remembers the map size and a fingerprint of its walkability
/// so it can be checked against the grid it is used with.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GoalBounds {
    width: i32,
    height: i32,
    fingerprint: u64,
    entries: Vec<Option<[BoundBox; 4]>>,
}

/// Largest map, in cells, a persisted table may describe.
///
/// Preprocessing runs one flood fill per walkable cell, so tables for
/// larger maps are impractical to build and a header claiming one is
/// treated as corrupt.
pub const MAX_TABLE_CELLS: usize = 1 << 20;

/// Cell count of a `width`×`height` table, if the size is usable.
pub(crate) fn table_cells(width: i32, height: i32) -> Result<usize, GoalBoundsError> {
    let w = usize::try_from(width).ok().filter(|&w| w > 0);
    let h = usize::try_from(height).ok().filter(|&h| h > 0);
    w.zip(h)
        .and_then(|(w, h)| w.checked_mul(h))
        .filter(|&cells| cells <= MAX_TABLE_CELLS)
        .ok_or_else(|| GoalBoundsError::Corrupt(format!("invalid map size {width}x{height}")))
}

impl GoalBounds {
    fn empty(width: i32, height: i32, fingerprint: u64, cells: usize) -> Self {
        Self {
            width,
            height,
            fingerprint,
            entries: vec![None; cells],
        }
    }

    /// An empty table matching `grid`.
    pub fn for_grid(grid: &Grid<NodeRecord>) -> Self {
        Self::empty(grid.width(), grid.height(), fingerprint(grid), grid.len())
    }

    /// Rebuild a table from persisted records.
    ///
    /// The map must have between 1 and [`MAX_TABLE_CELLS`] cells. Every
    /// source must lie inside it and appear with each direction exactly
    /// once.
    pub fn from_records(
        width: i32,
        height: i32,
        fingerprint: u64,
        records: impl IntoIterator<Item = BoundRecord>,
    ) -> Result<Self, GoalBoundsError> {
        let cells = table_cells(width, height)?;
        let mut table = Self::empty(width, height, fingerprint, cells);
        let mut seen = vec![[false; 4]; table.entries.len()];
        for r in records {
            let i = table.index(r.source).ok_or_else(|| {
                GoalBoundsError::Corrupt(format!("source {} outside {width}x{height}", r.source))
            })?;
            let d = r.direction.index();
            if seen[i][d] {
                return Err(GoalBoundsError::Corrupt(format!(
                    "duplicate {:?} box for {}",
                    r.direction, r.source
                )));
            }
            seen[i][d] = true;
            table.entries[i].get_or_insert([BoundBox::EMPTY; 4])[d] = r.bounds;
        }
        for (i, s) in seen.iter().enumerate() {
            if s.iter().any(|&x| x) && !s.iter().all(|&x| x) {
                return Err(GoalBoundsError::Corrupt(format!(
                    "{} is missing a direction",
                    table.point(i)
                )));
            }
        }
        Ok(table)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Walkability fingerprint of the map the table was built for.
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    /// Number of sources with boxes.
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn index(&self, p: Point) -> Option<usize> {
        if p.x < 0 || p.y < 0 || p.x >= self.width || p.y >= self.height {
            return None;
        }
        Some(p.y as usize * self.width as usize + p.x as usize)
    }

    fn point(&self, i: usize) -> Point {
        let w = self.width as usize;
        Point::new((i % w) as i32, (i / w) as i32)
    }

    /// The four boxes of `source`, indexed by [`Direction::index`].
    pub fn get(&self, source: Point) -> Option<&[BoundBox; 4]> {
        self.index(source)
            .and_then(|i| self.entries.get(i))
            .and_then(Option::as_ref)
    }

    pub fn bound(&self, source: Point, direction: Direction) -> Option<BoundBox> {
        self.get(source).map(|b| b[direction.index()])
    }

    pub(crate) fn insert(&mut self, source: Point, boxes: [BoundBox; 4]) {
        if let Some(i) = self.index(source) {
            self.entries[i] = Some(boxes);
        }
    }

    /// Whether some box of `start` holds both `candidate` and `goal`.
    /// Always `false` for a start without boxes.
    pub fn admits(&self, start: Point, candidate: Point, goal: Point) -> bool {
        self.get(start)
            .is_some_and(|boxes| boxes.iter().any(|b| b.contains(candidate) && b.contains(goal)))
    }

    /// All boxes as flat records, sources in row-major order.
    pub fn records(&self) -> impl Iterator<Item = BoundRecord> + '_ {
        self.entries.iter().enumerate().flat_map(move |(i, e)| {
            let source = self.point(i);
            e.iter().flat_map(move |boxes| {
                Direction::ALL.into_iter().map(move |direction| BoundRecord {
                    source,
                    direction,
                    bounds: boxes[direction.index()],
                })
            })
        })
    }

    /// Check that this table describes `grid`: same size, same
    /// walkability, and boxes for every walkable cell.
    pub fn check(&self, grid: &Grid<NodeRecord>) -> Result<(), GoalBoundsError> {
        if self.width != grid.width() || self.height != grid.height() {
            return Err(GoalBoundsError::DimensionMismatch {
                expected: grid.size(),
                found: Point::new(self.width, self.height),
            });
        }
        let expected = fingerprint(grid);
        if self.fingerprint != expected {
            return Err(GoalBoundsError::Stale {
                expected,
                found: self.fingerprint,
            });
        }
        for (i, n) in grid.cells().iter().enumerate() {
            if n.walkable && self.entries.get(i).is_none_or(Option::is_none) {
                return Err(GoalBoundsError::Incomplete(n.pos()));
            }
        }
        Ok(())
    }
}

/// FNV-1a hash of the grid's dimensions and walkability.
pub fn fingerprint(grid: &Grid<NodeRecord>) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    let mut hash = OFFSET;
    let mut feed = |byte: u8| {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(PRIME);
    };
    for b in grid.width().to_le_bytes().into_iter().chain(grid.height().to_le_bytes()) {
        feed(b);
    }
    for n in grid.cells() {
        feed(u8::from(n.walkable));
    }
    hash
}

/// Bucket assignment during one source's flood fill.
struct BucketFill {
    source: usize,
    origin: Point,
    boxes: [BoundBox; 4],
}

impl BucketFill {
    fn new(source: usize, origin: Point) -> Self {
        Self {
            source,
            origin,
            boxes: [BoundBox::EMPTY; 4],
        }
    }
}

impl Expansion for BucketFill {
    fn expanded(&mut self, id: usize, nodes: &mut [NodeRecord]) {
        let Some(parent) = nodes[id].parent else {
            return;
        };
        if nodes[id].best_goal_bound_edge.is_none() {
            nodes[id].best_goal_bound_edge = if parent == self.source {
                Some(Direction::of_offset(nodes[id].pos() - self.origin))
            } else {
                nodes[parent].best_goal_bound_edge
            };
        }
        if let Some(d) = nodes[id].best_goal_bound_edge {
            self.boxes[d.index()].grow(nodes[id].pos());
        }
    }
}

/// Query-time filter: the boxes of the start that hold the goal.
struct BoundFilter {
    boxes: Vec<BoundBox>,
}

impl BoundFilter {
    fn new(bounds: &GoalBounds, start: Point, goal: Point) -> Self {
        let boxes = bounds
            .get(start)
            .map(|b| b.iter().copied().filter(|b| b.contains(goal)).collect())
            .unwrap_or_default();
        Self { boxes }
    }
}

impl Expansion for BoundFilter {
    fn admit(&mut self, _from: Point, to: Point) -> bool {
        self.boxes.iter().any(|b| b.contains(to))
    }
}

/// Progress of [`GoalBoundPathfinding::preprocess_step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreprocessStatus {
    Pending {
        sources_done: usize,
        sources_total: usize,
    },
    /// The table is complete and installed.
    Done,
}

struct Preprocess {
    table: GoalBounds,
    next: usize,
    fill: Option<BucketFill>,
    sources_done: usize,
    sources_total: usize,
    started: Instant,
}

/// An A* engine whose searches are pruned by a [`GoalBounds`] table.
///
/// The table is either computed in place by [`preprocess_step`] /
/// [`map_preprocess`] or loaded with [`install_bounds`]. Searches refuse to
/// start without a valid table.
///
/// [`preprocess_step`]: Self::preprocess_step
/// [`map_preprocess`]: Self::map_preprocess
/// [`install_bounds`]: Self::install_bounds
pub struct GoalBoundPathfinding<F, H> {
    engine: AStarPathfinding<F, H>,
    bounds: Option<GoalBounds>,
    preprocess: Option<Preprocess>,
    query: Option<BoundFilter>,
}

impl<F: Frontier, H: Heuristic> GoalBoundPathfinding<F, H> {
    pub fn new(engine: AStarPathfinding<F, H>) -> Self {
        Self {
            engine,
            bounds: None,
            preprocess: None,
            query: None,
        }
    }

    pub fn engine(&self) -> &AStarPathfinding<F, H> {
        &self.engine
    }

    pub fn grid(&self) -> &Grid<NodeRecord> {
        self.engine.grid()
    }

    pub fn bounds(&self) -> Option<&GoalBounds> {
        self.bounds.as_ref()
    }

    pub fn into_engine(self) -> AStarPathfinding<F, H> {
        self.engine
    }

    /// Run preprocessing for at most `budget` processed neighbors.
    ///
    /// Sources are flood-filled one after another in row-major order; a
    /// source's fill may span several calls. The finished table replaces
    /// any installed one. While preprocessing is underway no table is
    /// installed, so searches are refused.
    pub fn preprocess_step(&mut self, budget: u32) -> PreprocessStatus {
        if self.preprocess.is_none() {
            let grid = self.engine.grid();
            self.preprocess = Some(Preprocess {
                table: GoalBounds::for_grid(grid),
                next: 0,
                fill: None,
                sources_done: 0,
                sources_total: grid.cells().iter().filter(|n| n.walkable).count(),
                started: Instant::now(),
            });
            self.bounds = None;
            self.query = None;
        }
        let Some(state) = self.preprocess.as_mut() else {
            return PreprocessStatus::Done;
        };

        let budget = budget.max(1);
        let mut used: u32 = 0;
        loop {
            if state.fill.is_none() {
                let cells = self.engine.grid().cells();
                let Some(i) = (state.next..cells.len()).find(|&i| cells[i].walkable) else {
                    break;
                };
                let origin = self.engine.grid().point(i);
                self.engine.initialize_flood(origin);
                state.fill = Some(BucketFill::new(i, origin));
                state.next = i + 1;
            }
            let Some(fill) = state.fill.as_mut() else {
                break;
            };

            let before = self.engine.stats().processed_nodes;
            let result = self.engine.run(budget - used, fill);
            let spent = self.engine.stats().processed_nodes - before;
            used = used.saturating_add(u32::try_from(spent).unwrap_or(u32::MAX));

            if result.is_done() || result == SearchResult::Idle {
                state.table.insert(fill.origin, fill.boxes);
                trace!("goal bounds ready for {}", fill.origin);
                state.fill = None;
                state.sources_done += 1;
            }
            if used >= budget {
                return PreprocessStatus::Pending {
                    sources_done: state.sources_done,
                    sources_total: state.sources_total,
                };
            }
        }

        let Some(state) = self.preprocess.take() else {
            return PreprocessStatus::Done;
        };
        info!(
            "goal-bound preprocessing finished: {} sources in {:?}",
            state.sources_done,
            state.started.elapsed()
        );
        self.bounds = Some(state.table);
        PreprocessStatus::Done
    }

    /// Run preprocessing to completion.
    pub fn map_preprocess(&mut self) {
        while self.preprocess_step(crate::UNBOUNDED) != PreprocessStatus::Done {}
    }

    /// Install a table built earlier, typically one loaded from disk.
    ///
    /// The table is rejected unless it matches the current grid's size and
    /// walkability and covers every walkable cell.
    pub fn install_bounds(&mut self, table: GoalBounds) -> Result<(), GoalBoundsError> {
        table.check(self.engine.grid())?;
        self.preprocess = None;
        self.query = None;
        self.bounds = Some(table);
        Ok(())
    }

    /// Remove and return the installed table.
    pub fn take_bounds(&mut self) -> Option<GoalBounds> {
        self.query = None;
        self.bounds.take()
    }

    /// Start a pruned search.
    ///
    /// Fails if no table is installed or the grid changed since it was
    /// built. A start without boxes, such as an unwalkable cell, is
    /// reported as [`GoalBoundsError::Incomplete`] since every expansion
    /// from it would be pruned. Otherwise behaves like
    /// [`AStarPathfinding::initialize_search`].
    pub fn initialize_search(&mut self, start: Point, goal: Point) -> Result<bool, GoalBoundsError> {
        let bounds = self.bounds.as_ref().ok_or(GoalBoundsError::Missing)?;
        let expected = fingerprint(self.engine.grid());
        if bounds.fingerprint() != expected {
            return Err(GoalBoundsError::Stale {
                expected,
                found: bounds.fingerprint(),
            });
        }
        if self.engine.grid().contains(start) && bounds.get(start).is_none() {
            debug!("pruned search from {start} refused: no goal bounds for the start");
            self.query = None;
            return Err(GoalBoundsError::Incomplete(start));
        }
        if !self.engine.initialize_search(start, goal) {
            self.query = None;
            return Ok(false);
        }
        self.query = Some(BoundFilter::new(bounds, start, goal));
        Ok(true)
    }

    /// Advance the pruned search, see [`AStarPathfinding::search`].
    pub fn search(&mut self, budget: u32) -> SearchResult {
        match self.query.as_mut() {
            Some(filter) => self.engine.run(budget, filter),
            None => SearchResult::Idle,
        }
    }

    pub fn step(&mut self) -> SearchResult {
        self.search(self.engine.config().nodes_per_search)
    }

    /// Change a cell's walkability. A real change invalidates the table
    /// and any preprocessing underway.
    pub fn set_walkable(&mut self, p: Point, walkable: bool) -> bool {
        let changed = self.engine.grid().at(p).is_some_and(|n| n.walkable != walkable);
        if changed && (self.bounds.is_some() || self.preprocess.is_some()) {
            warn!("walkability of {p} changed; goal bounds discarded");
            self.bounds = None;
            self.preprocess = None;
            self.query = None;
        }
        self.engine.set_walkable(p, walkable)
    }

    /// Whether `p` lies in the `direction` box of `source`.
    pub fn inside_goal_bound_box(&self, source: Point, p: Point, direction: Direction) -> bool {
        self.bounds
            .as_ref()
            .and_then(|b| b.bound(source, direction))
            .is_some_and(|b| b.contains(p))
    }
}


#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;
    use crate::frontier::NodeArray;
    use crate::heuristic::ZeroHeuristic;
    use crate::node::node_grid;

    #[test]
    fn table_round_trips_through_json() {
        let grid = node_grid(3, 3, 1.0, |p| p != Point::new(1, 1)).unwrap();
        let mut gb = GoalBoundPathfinding::new(AStarPathfinding::new(grid, NodeArray::new(), ZeroHeuristic));
        gb.map_preprocess();
        let table = gb.take_bounds().unwrap();
        let json = serde_json::to_string(&table).unwrap();
        let back: GoalBounds = serde_json::from_str(&json).unwrap();
        assert_eq!(back, table);
    }
}

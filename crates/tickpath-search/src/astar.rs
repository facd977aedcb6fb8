//! The resumable, budgeted A* engine.
//!
//! A search is started with [`AStarPathfinding::initialize_search`] and then
//! advanced by repeated calls to [`AStarPathfinding::search`], each doing at
//! most a fixed amount of work. All search state lives in the engine, so a
//! caller can stop calling at any time and resume later.

use std::time::{Duration, Instant};

use log::{debug, warn};
use tickpath_core::{Grid, Point};

use crate::config::SearchConfig;
use crate::frontier::Frontier;
use crate::heuristic::Heuristic;
use crate::neighbors::Neighbors;
use crate::node::{NodeRecord, NodeStatus};

/// A budget large enough to finish any search in one call.
pub const UNBOUNDED: u32 = u32::MAX;

/// Outcome of one [`AStarPathfinding::search`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchResult {
    /// Budget exhausted; call again to continue.
    Pending,
    /// The goal was reached.
    Found(Path),
    /// The frontier emptied without reaching the goal. This is a final
    /// answer, not an error.
    NoPath,
    /// No search is in progress.
    Idle,
}

impl SearchResult {
    /// Whether the search has terminated, with or without a path.
    pub fn is_done(&self) -> bool {
        matches!(self, SearchResult::Found(_) | SearchResult::NoPath)
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            SearchResult::Found(path) => Some(path),
            _ => None,
        }
    }

    pub fn into_path(self) -> Option<Path> {
        match self {
            SearchResult::Found(path) => Some(path),
            _ => None,
        }
    }
}

/// A path from start to goal, both included.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    nodes: Vec<NodeRecord>,
}

impl Path {
    /// Snapshots of the records along the path, start first.
    pub fn nodes(&self) -> &[NodeRecord] {
        &self.nodes
    }

    pub fn points(&self) -> Vec<Point> {
        self.nodes.iter().map(NodeRecord::pos).collect()
    }

    /// Total movement cost: the goal's `g_cost`.
    pub fn cost(&self) -> f64 {
        self.nodes.last().map_or(0.0, |n| n.g_cost)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Counters for the current search, accumulated across calls and reset by
/// initialization.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SearchStats {
    /// Neighbors handed to the relaxation step. This is the unit the
    /// per-call budget is measured in.
    pub processed_nodes: u64,
    /// Nodes popped from the open set and closed.
    pub expanded_nodes: u64,
    /// High-water mark of the open set.
    pub max_open_nodes: usize,
    /// Wall-clock time spent inside `search` calls.
    pub processing_time: Duration,
}

/// Callbacks into the expansion loop, used by goal bounding.
pub(crate) trait Expansion {
    /// Whether the move `from -> to` may be relaxed.
    fn admit(&mut self, _from: Point, _to: Point) -> bool {
        true
    }

    /// Called after node `id` was popped and closed.
    fn expanded(&mut self, _id: usize, _nodes: &mut [NodeRecord]) {}
}

struct Unfiltered;

impl Expansion for Unfiltered {}

/// A resumable A* search over a grid of [`NodeRecord`]s.
///
/// The engine owns the grid: every record lives in its dense cell array and
/// the frontier only holds indices into it. Search progress is written to
/// the grid as it happens, so enabling [`Grid::track_changes`] lets a
/// renderer follow the search cell by cell.
#[derive(Debug)]
pub struct AStarPathfinding<F, H> {
    grid: Grid<NodeRecord>,
    frontier: F,
    heuristic: H,
    config: SearchConfig,
    neighbors: Neighbors,
    in_progress: bool,
    start: Option<usize>,
    // `None` while flood-filling.
    goal: Option<usize>,
    stats: SearchStats,
}

impl<F: Frontier, H: Heuristic> AStarPathfinding<F, H> {
    pub fn new(grid: Grid<NodeRecord>, frontier: F, heuristic: H) -> Self {
        Self::with_config(grid, frontier, heuristic, SearchConfig::default())
    }

    pub fn with_config(
        grid: Grid<NodeRecord>,
        frontier: F,
        heuristic: H,
        config: SearchConfig,
    ) -> Self {
        if !heuristic.admissible_under(&config.costs) {
            warn!(
                "heuristic is not admissible with straight cost {} and diagonal cost {}; paths may be suboptimal",
                config.costs.straight, config.costs.diagonal
            );
        }
        Self {
            grid,
            frontier,
            heuristic,
            config,
            neighbors: Neighbors::new(),
            in_progress: false,
            start: None,
            goal: None,
            stats: SearchStats::default(),
        }
    }

    pub fn grid(&self) -> &Grid<NodeRecord> {
        &self.grid
    }

    /// Mutable access to the grid. Changing walkability or record state
    /// while a search is in progress makes its result unspecified.
    pub fn grid_mut(&mut self) -> &mut Grid<NodeRecord> {
        &mut self.grid
    }

    pub fn frontier(&self) -> &F {
        &self.frontier
    }

    pub fn heuristic(&self) -> &H {
        &self.heuristic
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    pub fn in_progress(&self) -> bool {
        self.in_progress
    }

    pub fn start(&self) -> Option<Point> {
        self.start.map(|i| self.grid.point(i))
    }

    pub fn goal(&self) -> Option<Point> {
        self.goal.map(|i| self.grid.point(i))
    }

    /// Start a search from `start` to `goal`.
    ///
    /// Returns `false` and leaves the engine idle if either point lies
    /// outside the grid. Any previous search is discarded either way.
    pub fn initialize_search(&mut self, start: Point, goal: Point) -> bool {
        let (Some(s), Some(g)) = (self.grid.index(start), self.grid.index(goal)) else {
            debug!("search from {start} to {goal} rejected: outside the grid");
            self.abort();
            return false;
        };
        self.begin(s, Some(g));
        true
    }

    /// Start an exhaustive zero-heuristic flood fill from `source`. It ends
    /// with [`SearchResult::NoPath`] once every reachable cell is closed.
    pub fn initialize_flood(&mut self, source: Point) -> bool {
        let Some(s) = self.grid.index(source) else {
            debug!("flood fill from {source} rejected: outside the grid");
            self.abort();
            return false;
        };
        self.begin(s, None);
        true
    }

    /// Advance the current search by at most `budget` processed neighbors.
    ///
    /// The budget is checked before each node is popped, so the neighbors
    /// of the last popped node are always finished. A budget of 0 acts as
    /// 1. Calling this repeatedly with any budget gives the same result as
    /// one call with [`UNBOUNDED`].
    pub fn search(&mut self, budget: u32) -> SearchResult {
        self.run(budget, &mut Unfiltered)
    }

    /// [`search`](Self::search) with the configured per-call budget.
    pub fn step(&mut self) -> SearchResult {
        self.search(self.config.nodes_per_search)
    }

    /// Mark a cell as walkable or blocked. Returns `false` outside the grid.
    pub fn set_walkable(&mut self, p: Point, walkable: bool) -> bool {
        self.grid.update(p, |n| n.walkable = walkable).is_some()
    }

    /// Re-mark every cell's walkability, as after loading a new map. Any
    /// search in progress is discarded.
    pub fn reset_walkability(&mut self, walkable: impl Fn(Point) -> bool) {
        self.abort();
        for i in 0..self.grid.len() {
            let p = self.grid.point(i);
            let w = walkable(p);
            let node = &mut self.grid.cells_mut()[i];
            if node.walkable != w {
                node.walkable = w;
                self.grid.notify(p);
            }
        }
    }

    fn abort(&mut self) {
        self.in_progress = false;
        self.start = None;
        self.goal = None;
    }

    fn begin(&mut self, start: usize, goal: Option<usize>) {
        self.reset_records();
        self.frontier.initialize();
        self.stats = SearchStats::default();

        let start_pos = self.grid.point(start);
        let h = match goal {
            Some(g) => self.heuristic.h(start_pos, self.grid.point(g)),
            None => 0.0,
        };
        let nodes = self.grid.cells_mut();
        nodes[start].g_cost = 0.0;
        nodes[start].h_cost = h;
        nodes[start].calculate_f_cost();
        self.frontier.add_to_open(start, nodes);
        self.grid.notify(start_pos);

        self.stats.max_open_nodes = self.frontier.count_open();
        self.start = Some(start);
        self.goal = goal;
        self.in_progress = true;
    }

    fn reset_records(&mut self) {
        for i in 0..self.grid.len() {
            let node = &mut self.grid.cells_mut()[i];
            let dirty = node.status != NodeStatus::Unvisited || node.parent.is_some();
            node.reset();
            if dirty {
                let p = self.grid.point(i);
                self.grid.notify(p);
            }
        }
    }

    pub(crate) fn run<X: Expansion>(&mut self, budget: u32, hooks: &mut X) -> SearchResult {
        if !self.in_progress {
            return SearchResult::Idle;
        }
        let started = Instant::now();
        let budget = budget.max(1);
        let mut processed: u32 = 0;
        let mut nbuf = std::mem::take(&mut self.neighbors);

        let result = loop {
            if processed >= budget {
                break SearchResult::Pending;
            }
            let Some(current) = self.frontier.best_and_remove(self.grid.cells_mut()) else {
                break SearchResult::NoPath;
            };
            let pos = self.grid.point(current);
            self.frontier.add_to_closed(current, self.grid.cells_mut());
            self.grid.notify(pos);
            self.stats.expanded_nodes += 1;

            if Some(current) == self.goal {
                break SearchResult::Found(self.reconstruct(current));
            }
            hooks.expanded(current, self.grid.cells_mut());

            for &child in nbuf.walkable(&self.grid, pos) {
                if !hooks.admit(pos, self.grid.point(child)) {
                    continue;
                }
                self.process_child(current, child);
                processed = processed.saturating_add(1);
                self.stats.processed_nodes += 1;
            }
            self.stats.max_open_nodes = self.stats.max_open_nodes.max(self.frontier.count_open());
        };

        self.neighbors = nbuf;
        self.stats.processing_time += started.elapsed();
        if result.is_done() {
            self.in_progress = false;
            debug!(
                "search from {:?} finished ({}): {} processed, {} expanded, max open {}",
                self.start(),
                if matches!(result, SearchResult::Found(_)) {
                    "found"
                } else {
                    "exhausted"
                },
                self.stats.processed_nodes,
                self.stats.expanded_nodes,
                self.stats.max_open_nodes,
            );
        }
        result
    }

    /// Relax the move `parent -> child`.
    ///
    /// A closed child whose recorded `f_cost` is not below the new one is
    /// reopened, an open child is updated in place under the same rule, and
    /// an unvisited child is opened. The child's cell is notified whenever
    /// it changes.
    fn process_child(&mut self, parent: usize, child: usize) {
        let parent_pos = self.grid.point(parent);
        let child_pos = self.grid.point(child);
        let g = self.grid.cells()[parent].g_cost + self.config.costs.between(parent_pos, child_pos);
        let h = match self.goal {
            Some(goal) => self.heuristic.h(child_pos, self.grid.point(goal)),
            None => 0.0,
        };
        let f = g + h;

        let nodes = self.grid.cells_mut();
        match self.frontier.status_of(child, nodes) {
            NodeStatus::Closed if nodes[child].f_cost >= f => {
                self.frontier.remove_from_closed(child, nodes);
                nodes[child].relax(g, h, parent);
                self.frontier.add_to_open(child, nodes);
            }
            NodeStatus::Open if nodes[child].f_cost >= f => {
                nodes[child].relax(g, h, parent);
                self.frontier.update_in_open(child, nodes);
            }
            NodeStatus::Unvisited => {
                nodes[child].relax(g, h, parent);
                self.frontier.add_to_open(child, nodes);
            }
            _ => return,
        }
        self.grid.notify(child_pos);
    }

    fn reconstruct(&self, goal: usize) -> Path {
        let nodes = self.grid.cells();
        let mut path = Vec::new();
        let mut cur = Some(goal);
        while let Some(i) = cur {
            if path.len() == nodes.len() {
                warn!("parent chain from {} does not terminate", self.grid.point(goal));
                break;
            }
            path.push(nodes[i]);
            if Some(i) == self.start {
                break;
            }
            cur = nodes[i].parent;
        }
        path.reverse();
        Path { nodes: path }
    }
}

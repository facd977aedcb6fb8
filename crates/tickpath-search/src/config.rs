use crate::distance::MoveCosts;

/// Tunables shared by every search an engine runs.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SearchConfig {
    /// Per-call work budget used by [`step`](crate::AStarPathfinding::step),
    /// counted in processed neighbors.
    pub nodes_per_search: u32,
    pub costs: MoveCosts,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            nodes_per_search: 100,
            costs: MoveCosts::default(),
        }
    }
}

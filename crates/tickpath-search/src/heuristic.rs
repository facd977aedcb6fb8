use tickpath_core::Point;

use crate::distance::{self, MoveCosts};

/// Cost-to-goal estimate used to order the frontier.
pub trait Heuristic {
    /// Estimate of the cost from `node` to `goal`. Must be non-negative.
    fn h(&self, node: Point, goal: Point) -> f64;

    /// Whether the estimate never exceeds the true remaining cost under
    /// `costs`. A* only guarantees optimal paths when this holds.
    fn admissible_under(&self, _costs: &MoveCosts) -> bool {
        true
    }
}

/// Always zero. Turns A* into Dijkstra's algorithm.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroHeuristic;

impl Heuristic for ZeroHeuristic {
    #[inline]
    fn h(&self, _node: Point, _goal: Point) -> f64 {
        0.0
    }
}

/// Straight-line distance to the goal.
#[derive(Debug, Clone, Copy, Default)]
pub struct EuclideanDistance;

impl Heuristic for EuclideanDistance {
    #[inline]
    fn h(&self, node: Point, goal: Point) -> f64 {
        distance::euclidean(node, goal)
    }

    /// Euclidean distance underestimates octile distance exactly when a
    /// straight step costs at least 1 and a diagonal step at least √2.
    fn admissible_under(&self, costs: &MoveCosts) -> bool {
        costs.straight >= 1.0 && costs.diagonal >= std::f64::consts::SQRT_2
    }
}

impl<H: Heuristic + ?Sized> Heuristic for &H {
    fn h(&self, node: Point, goal: Point) -> f64 {
        (**self).h(node, goal)
    }

    fn admissible_under(&self, costs: &MoveCosts) -> bool {
        (**self).admissible_under(costs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_always_zero() {
        assert_eq!(ZeroHeuristic.h(Point::new(0, 0), Point::new(9, 9)), 0.0);
        assert!(ZeroHeuristic.admissible_under(&MoveCosts {
            straight: 0.1,
            diagonal: 0.1
        }));
    }

    #[test]
    fn euclidean_admissibility_depends_on_costs() {
        assert!(EuclideanDistance.admissible_under(&MoveCosts::default()));
        assert!(!EuclideanDistance.admissible_under(&MoveCosts {
            straight: 1.0,
            diagonal: 1.4
        }));
        assert!(!EuclideanDistance.admissible_under(&MoveCosts {
            straight: 0.5,
            diagonal: 1.5
        }));
    }

    #[test]
    fn euclidean_value() {
        assert_eq!(EuclideanDistance.h(Point::new(1, 1), Point::new(4, 5)), 5.0);
    }
}

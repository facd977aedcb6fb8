use tickpath_core::Point;

/// Cost of a single grid step.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MoveCosts {
    /// Cost of a horizontal or vertical step.
    pub straight: f64,
    /// Cost of a diagonal step.
    pub diagonal: f64,
}

impl Default for MoveCosts {
    fn default() -> Self {
        Self {
            straight: 1.0,
            diagonal: 1.5,
        }
    }
}

impl MoveCosts {
    /// Octile distance between `a` and `b`: as many diagonal steps as the
    /// shorter axis allows, straight steps for the rest.
    #[inline]
    pub fn between(&self, a: Point, b: Point) -> f64 {
        let (dx, dy) = a.abs_delta(b);
        let diag = dx.min(dy);
        let rest = dx.max(dy) - diag;
        self.diagonal * f64::from(diag) + self.straight * f64::from(rest)
    }
}

/// Straight-line distance between two cells.
#[inline]
pub fn euclidean(a: Point, b: Point) -> f64 {
    let (dx, dy) = a.abs_delta(b);
    f64::from(dx).hypot(f64::from(dy))
}

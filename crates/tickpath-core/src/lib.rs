//! **tickpath-core**: grid primitives shared by the *tickpath* crates.
//!
//! This crate provides integer geometry ([`Point`]) and a dense,
//! change-tracking [`Grid`] container with world↔grid coordinate
//! conversion.

pub mod geom;
pub mod grid;

pub use geom::Point;
pub use grid::{Grid, GridError};

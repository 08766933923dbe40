//! Remap grid generation and serialization.
//!
//! [`grid`] computes the displacement field, [`pgm`] writes it in the format
//! ffmpeg's `remap` filter reads.

pub mod grid;
pub mod pgm;

pub use grid::{RemapGrid, WarpMode, generate, output_dimensions};
pub use pgm::MapPaths;

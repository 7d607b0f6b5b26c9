//! A planar path geometry kernel.
//!
//! Paths made of line and cubic segments are flattened, normalized by a
//! sweep into a directed planar graph, and combined through winding numbers.
//! On top of that graph the crate offers boolean operations, offsetting and
//! stroking, simplification and connected-component splitting.
pub mod config;
pub mod error;
pub mod flatten;
pub mod geometry;
pub mod graph;
pub mod math;
pub mod operations;
pub mod sweep;

pub use config::{CancelFlag, KernelConfig};
pub use error::{PathgraphError, Result};
pub use geometry::{Path, PathBuilder, PathVector, Segment};
pub use operations::boolean::{BooleanOp, FillRule};

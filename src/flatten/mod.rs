//! Line-segment approximation of paths.
//!
//! Curves are flattened into polylines whose vertices optionally remember
//! the segment and curve parameter they came from, so that processed
//! results can be re-fitted onto the original curves.
mod approximate;
mod polyline;

pub use approximate::Approximate;
pub use polyline::{BackData, EdgeSource, PolyEdge, PolyPoint, PolySubpath, Polyline};

//! Sweep-line machinery used to normalize a set of segments into a planar
//! arrangement.
mod normalize;
mod queue;
mod status;

pub use normalize::{SplitPoint, SweepPass, SweepReport};
pub use queue::{EventId, SweepEvent, SweepEventQueue};
pub use status::SweepStatus;

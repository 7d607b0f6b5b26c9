mod cap;
mod half_outline;
mod join;
mod outline;
mod region_offset;
mod style;

pub use cap::outline_cap;
pub use half_outline::HalfOutline;
pub use join::{outline_join, JoinGeometry};
pub use outline::{Offset, Outline};
pub use region_offset::RegionOffset;
pub use style::{LineCap, LineJoin, StrokeStyle};

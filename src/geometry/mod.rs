pub mod path;
pub mod segment;

pub use path::{is_path_empty, total_signed_area, Path, PathBuilder, PathVector};
pub use segment::Segment;

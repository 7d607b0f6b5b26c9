mod boolean_op;
mod engine;
mod exclude;
mod intersect_op;
mod select;
mod simplify;
mod subtract;
mod union;

pub use boolean_op::Boolean;
pub use engine::{boolean_execute, simplify_execute, Operand};
pub use exclude::Exclude;
pub use intersect_op::Intersect;
pub use select::{BooleanOp, FillRule};
pub use simplify::Simplify;
pub use subtract::Subtract;
pub use union::Union;

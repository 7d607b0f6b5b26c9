pub mod boolean;
pub mod components;
pub mod offset;

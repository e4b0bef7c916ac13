pub mod mark;
pub mod rect;
pub mod symbol;

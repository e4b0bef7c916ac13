pub mod colors;
pub mod types;
pub mod value;

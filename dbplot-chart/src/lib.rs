pub mod categorical;
pub mod error;
pub mod numeric;
pub mod render;
pub mod scatter;
pub mod style;
pub mod weights;

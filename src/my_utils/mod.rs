pub mod image;
pub mod math;

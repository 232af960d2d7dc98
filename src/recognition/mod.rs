pub mod classifier;
pub mod contours;
pub mod engine;
pub mod hold;
pub mod peaks;
pub mod quads;
pub mod rank_patch;
pub mod rectify;

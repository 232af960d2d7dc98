pub mod recognition;
pub mod models;
pub mod my_utils;
pub mod config;
pub mod error;

pub use config::{Config, CONFIG};
pub use error::{GeometryError, GeometryResult};
pub use models::card::{CardPoint, Polygon, Quadrilateral};
pub use recognition::classifier::{ClassifyRank, RankClassifier};
pub use recognition::engine::Engine;
pub use recognition::hold::HeldDetections;
pub use recognition::quads::DetectRegions;
pub use recognition::rank_patch::LocateRankPatch;
pub use recognition::rectify::{CardEnhancer, ContrastEnhancer, RectifyRegions};

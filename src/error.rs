use thiserror::Error;

/// 几何前置条件被破坏时的错误
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("baseline has zero length")]
    DegenerateBaseline,
    #[error("symmetric pairing needs an even number of peaks, got {0}")]
    OddPeakCount(usize),
    #[error("points admit no projective transform")]
    SingularTransform,
}

pub type GeometryResult<T> = std::result::Result<T, GeometryError>;

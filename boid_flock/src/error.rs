use thiserror::Error;

/// Errors raised while building or filling a spatial index.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndexError {
    /// A node must be able to hold at least one point before it subdivides.
    #[error("node capacity must be at least 1")]
    InvalidCapacity,
    /// Rectangles need finite origins and strictly positive extents.
    #[error("invalid rectangle ({x}, {y}, {width}x{height})")]
    InvalidBounds {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    /// Too many coincident points forced subdivision past the depth limit.
    #[error("maximum quadtree depth {max_depth} exceeded")]
    MaxDepthExceeded { max_depth: usize },
}

/// Errors raised while loading or validating a [`crate::config::FlockConfig`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("could not parse yaml: {0}")]
    Parse(String),
    #[error("key `{key}` should be {expected}")]
    WrongType {
        key: &'static str,
        expected: &'static str,
    },
    #[error("invalid value for `{key}`: {reason}")]
    InvalidValue { key: &'static str, reason: String },
}

/// Top level error for simulation setup and stepping.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FlockError {
    #[error(transparent)]
    Index(#[from] IndexError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("agent {index} has a non-finite position or velocity")]
    NonFiniteAgent { index: usize },
    #[error("agent {index} has size class 0; size classes start at 1")]
    InvalidSizeClass { index: usize },
}

//! Error types for geometry construction and octree queries

/// Geometry errors
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// Bounds with `lo > hi` on at least one axis
    #[error("Invalid bounds: lo {lo:?} exceeds hi {hi:?}")]
    InvalidBounds {
        /// Lower corner as given
        lo: [f32; 3],
        /// Upper corner as given
        hi: [f32; 3],
    },

    /// Query issued against a tree that has not been built since the last mutation
    #[error("Octree has not been built since the last mutation")]
    NotBuilt,

    /// Octant, vertex or side index past the end
    #[error("Index {index} out of range (len {len})")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Number of valid indices
        len: usize,
    },

    /// Octree thresholds rejected by validation
    #[error("Invalid octree configuration: {0}")]
    InvalidConfig(String),

    /// Operation undefined for degenerate input
    #[error("Degenerate geometry: {0}")]
    Degenerate(&'static str),
}

/// Result alias for geometry operations
pub type Result<T> = std::result::Result<T, GeometryError>;

impl GeometryError {
    /// Build an [`GeometryError::IndexOutOfRange`] error
    pub const fn index_out_of_range(index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { index, len }
    }
}

//! Error types for the BVH build pipeline.

use thiserror::Error;

/// Main error type for BVH construction.
#[derive(Error, Debug)]
pub enum Error {
    /// A bounding box was requested from zero points
    #[error("cannot build a bounding box from an empty point set")]
    EmptyPointSet,
}

/// Result type alias for BVH operations.
pub type Result<T> = std::result::Result<T, Error>;

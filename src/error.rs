//! Error types for shapemirror.
//!
//! Every precondition of a mirror operation maps to one variant here. All of
//! them are reported before the target shape key is touched.

use std::path::PathBuf;
use thiserror::Error;

use crate::algo::mirror::Axis;

/// Result type alias using [`MirrorError`].
pub type Result<T> = std::result::Result<T, MirrorError>;

/// Errors that can occur while building mirror maps or transferring deltas.
#[derive(Error, Debug)]
pub enum MirrorError {
    /// The object carries no shape key collection at all.
    #[error("no shape keys found")]
    NoShapeKeys,

    /// The requested shape key is not part of the collection.
    #[error("shape key '{name}' not found")]
    ShapeKeyNotFound {
        /// The requested key name.
        name: String,
    },

    /// The target shape key has no relative (reference) key.
    #[error("shape key '{name}' has no relative key")]
    NoReferenceKey {
        /// The target key name.
        name: String,
    },

    /// The reference key is not symmetric under the requested axis.
    #[error("reference shape key '{reference}' is not symmetric on {axis}-axis")]
    AsymmetricReference {
        /// Name of the reference key that failed the check.
        reference: String,
        /// The mirror axis that was checked.
        axis: Axis,
    },

    /// Mirror map construction produced no correspondences.
    #[error("no symmetric vertices found")]
    EmptyMirrorMap,

    /// A shape key with this name already exists.
    #[error("shape key '{name}' already exists")]
    DuplicateShapeKey {
        /// The duplicated key name.
        name: String,
    },

    /// A face references an invalid vertex index.
    #[error("face {face} references invalid vertex index {vertex}")]
    InvalidFaceIndex {
        /// The face index.
        face: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// An edge references an invalid vertex index.
    #[error("edge {edge} references invalid vertex index {vertex}")]
    InvalidEdgeIndex {
        /// The edge index.
        edge: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A face has fewer than three distinct vertices.
    #[error("face {face} is degenerate (has duplicate vertices)")]
    DegenerateFace {
        /// The face index.
        face: usize,
    },

    /// An edge connects a vertex to itself.
    #[error("edge {edge} is degenerate (both ends are vertex {vertex})")]
    DegenerateEdge {
        /// The edge index.
        edge: usize,
        /// The repeated vertex index.
        vertex: usize,
    },

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error loading mesh or shape key data from file.
    #[error("failed to load {path}: {message}")]
    LoadError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Error saving shape key data to file.
    #[error("failed to save {path}: {message}")]
    SaveError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Unsupported file format.
    #[error("unsupported file format: {extension}")]
    UnsupportedFormat {
        /// The file extension.
        extension: String,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl MirrorError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        MirrorError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asymmetric_message_names_axis_and_reference() {
        let err = MirrorError::AsymmetricReference {
            reference: "Basis".to_string(),
            axis: Axis::Y,
        };
        assert_eq!(
            err.to_string(),
            "reference shape key 'Basis' is not symmetric on Y-axis"
        );
    }

    #[test]
    fn test_invalid_param() {
        let err = MirrorError::invalid_param("tolerance", -1.0, "must be non-negative");
        assert_eq!(
            err.to_string(),
            "invalid parameter: tolerance = -1 (must be non-negative)"
        );
    }
}

//! Error types for BVH construction.

use thiserror::Error;

/// Malformed geometry handed to the builder. Detected before any node is created.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BvhError {
    /// The mesh has no triangles.
    #[error("mesh is empty")]
    EmptyMesh,

    /// Indices must come in triples, one per triangle.
    #[error("index count {0} is not a multiple of 3")]
    IndexCountNotMultipleOfThree(usize),

    /// An index addresses a vertex past the end of the vertex buffer.
    #[error("triangle {triangle} references vertex {index} but the mesh has {vertex_count} vertices")]
    IndexOutOfRange {
        triangle: usize,
        index: u32,
        vertex_count: usize,
    },

    /// Triangles are addressed with `u32` inside the tree.
    #[error("{0} triangles exceed the u32 triangle index range")]
    TooManyTriangles(usize),

    /// A raw buffer could not be reinterpreted as indices or vertices.
    #[error("invalid {buffer} buffer: {reason}")]
    InvalidBuffer {
        buffer: &'static str,
        reason: String,
    },
}

/// Result type for BVH operations.
pub type Result<T> = std::result::Result<T, BvhError>;

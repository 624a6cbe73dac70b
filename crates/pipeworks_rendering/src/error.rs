//! # Rendering Error Types

use thiserror::Error;

/// Errors from instance storage.
///
/// Running out of space is not one of them: a full store grows before writing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InstanceError {
    /// A store needs room for at least one record.
    #[error("instance store capacity must be non-zero")]
    ZeroCapacity,

    /// Requested capacity cannot hold the records already written.
    #[error("capacity {requested} cannot hold {live} live records")]
    CapacityBelowLive {
        /// Requested capacity.
        requested: usize,
        /// Records currently stored at both ends.
        live: usize,
    },

    /// `update_left` with nothing pushed on the left.
    #[error("no left record to update")]
    EmptyRange,

    /// Capacity in bytes overflows `usize`.
    #[error("capacity of {records} records overflows")]
    CapacityOverflow {
        /// Requested record count.
        records: usize,
    },

    /// The backend could not provide host-visible memory.
    #[error("failed to allocate {bytes} bytes of host-visible memory")]
    AllocationFailed {
        /// Requested size in bytes.
        bytes: usize,
    },
}

/// Malformed mesh data. Fatal at startup, never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// Mesh has no vertices or no triangles.
    #[error("mesh {mesh} is empty")]
    Empty {
        /// Mesh name.
        mesh: &'static str,
    },

    /// Vertex and normal arrays differ in length.
    #[error("mesh {mesh} has {positions} positions but {normals} normals")]
    NormalCountMismatch {
        /// Mesh name.
        mesh: &'static str,
        /// Position count.
        positions: usize,
        /// Normal count.
        normals: usize,
    },

    /// Index count is not a multiple of three.
    #[error("mesh {mesh} has {indices} indices, not a whole number of triangles")]
    PartialTriangle {
        /// Mesh name.
        mesh: &'static str,
        /// Index count.
        indices: usize,
    },

    /// An index points past the vertex array.
    #[error("mesh {mesh} index {index} out of range for {vertices} vertices")]
    IndexOutOfRange {
        /// Mesh name.
        mesh: &'static str,
        /// Offending index.
        index: u16,
        /// Vertex count.
        vertices: usize,
    },

    /// More vertices than a 16-bit index can address.
    #[error("mesh {mesh} has {vertices} vertices, more than 16-bit indices can address")]
    TooManyVertices {
        /// Mesh name.
        mesh: &'static str,
        /// Vertex count.
        vertices: usize,
    },
}

/// Errors from the render bridge and render loop.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    /// Event for a pipe the bridge never saw spawn (or already released).
    #[error("no render state for pipe {0}")]
    UnknownPipe(usize),

    /// `New` event for a pipe that already has render state.
    #[error("pipe {0} already has render state")]
    DuplicatePipe(usize),

    /// Invalid render configuration value.
    #[error("invalid render configuration: {0}")]
    InvalidConfig(String),

    /// Growth event for a pipe with no open segment.
    #[error("pipe {0} has no open segment to extend")]
    NoOpenSegment(usize),

    /// Instance storage failure.
    #[error(transparent)]
    Instance(#[from] InstanceError),

    /// Mesh failure.
    #[error(transparent)]
    Mesh(#[from] MeshError),

    /// Simulation failure during a render-loop tick.
    #[error(transparent)]
    Simulation(#[from] pipeworks_core::SimError),
}

/// Result type for rendering operations.
pub type RenderResult<T> = Result<T, RenderError>;

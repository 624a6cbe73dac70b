//! # PIPEWORKS Rendering
//!
//! Turns pipe growth events into instanced geometry:
//! - One double-ended instance store per pipe (segments low, balls high)
//! - Two static meshes, drawn once per pipe and range
//! - A fixed-interval simulation tick under a free-running frame loop
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     INSTANCE PIPELINE                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  PipeEvent → RenderBridge → InstanceStore → InstanceDrawer  │
//! │                                  ↓                          │
//! │                  BufferAllocator / HostBuffer (backend)     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The device, window and shaders belong to the backend. This crate sees them
//! only through [`instancing::BufferAllocator`] and [`integration::InstanceDrawer`].

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod error;
pub mod instancing;
pub mod integration;
pub mod mesh;

pub use error::{InstanceError, MeshError, RenderError, RenderResult};
pub use instancing::{
    BufferAllocator, HeapAllocator, HeapBuffer, HostBuffer, InstanceRange, InstanceStore,
    InstanceTransform, BALL_RADIUS, BALL_SCALE, PIPE_SCALE,
};
pub use mesh::{MeshData, MeshKind, MeshLibrary};

// === INTEGRATION ===
pub use integration::{
    DrawCall, FrameResult, InstanceDrawer, RecordingDrawer, RenderBridge, RenderBridgeConfig,
    RenderLoop, RenderLoopConfig, RenderLoopStats, SimulationGate,
};

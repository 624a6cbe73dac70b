//! # Simulation Integration Layer
//!
//! Connects the growth simulation to instanced drawing.
//!
//! ```text
//! ┌──────────────┐  PipeEvent  ┌──────────────┐  DrawCall  ┌────────────────┐
//! │ World (core) │ ──────────► │ RenderBridge │ ─────────► │ InstanceDrawer │
//! └──────────────┘             └──────────────┘            └────────────────┘
//!        ▲                            ▲
//!        └──────── RenderLoop ────────┘
//! ```
//!
//! ## Rules
//!
//! 1. The bridge never reads the grid; events are its only input
//! 2. Every event is applied in the frame whose tick produced it
//! 3. A pipe's store lives until `release` or until the bridge is dropped

pub mod render_bridge;
mod render_loop;

pub use render_bridge::{
    DrawCall, InstanceDrawer, PipeRenderState, RecordingDrawer, RenderBridge, RenderBridgeConfig,
    RenderBridgeStats, DEFAULT_INITIAL_CAPACITY,
};
pub use render_loop::{
    FrameResult, RenderLoop, RenderLoopConfig, RenderLoopStats, SimulationGate,
    DEFAULT_TICK_INTERVAL_SECS,
};

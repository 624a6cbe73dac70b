//! Render Bridge - turns pipe events into instance records.
//!
//! The bridge is the only owner of per-pipe geometry. Each pipe gets one
//! [`InstanceStore`] when its `New` event arrives; segments live in the left range,
//! balls in the right range. Stores are released only through [`RenderBridge::release`]
//! (or by dropping the bridge).
//!
//! ## Segment geometry
//!
//! ```text
//!   ball            segment                 head
//!  ( o )=====================================  .
//!     ^ center + dir * R                     ^ head - dir * R
//! ```
//!
//! An open segment always stops one ball radius short of the head voxel, so a
//! corner ball or a terminal cap fills the gap without overlap.

use std::collections::BTreeMap;

use pipeworks_core::{Direction, GrowthEvent, PipeEvent, Voxel};
use serde::{Deserialize, Serialize};

use crate::error::{InstanceError, RenderError, RenderResult};
use crate::instancing::{
    BufferAllocator, HeapAllocator, HostBuffer, InstanceRange, InstanceStore, InstanceTransform,
    BALL_RADIUS,
};
use crate::mesh::MeshKind;

/// Default records per new store.
pub const DEFAULT_INITIAL_CAPACITY: usize = 128;

/// Color used when the caller has none for a pipe.
const FALLBACK_COLOR: [f32; 3] = [1.0, 1.0, 1.0];

/// Configuration for the render bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderBridgeConfig {
    /// Records allocated for each new pipe store
    pub initial_capacity: usize,
}

impl Default for RenderBridgeConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
        }
    }
}

/// Statistics from render bridge operations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderBridgeStats {
    /// Events applied successfully
    pub events_applied: u64,
    /// Segment records pushed
    pub segments_pushed: u64,
    /// Segment records rewritten in place
    pub segments_updated: u64,
    /// Ball records pushed
    pub balls_pushed: u64,
    /// Stores released
    pub stores_released: u64,
}

/// One draw request: a contiguous range of one pipe's store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCall {
    /// Pipe the range belongs to
    pub pipe_id: usize,
    /// Mesh to instance
    pub mesh: MeshKind,
    /// Records to draw
    pub range: InstanceRange,
    /// Flat color for the whole pipe
    pub color: [f32; 3],
}

/// Sink for instanced draws. Implemented by the drawing backend.
pub trait InstanceDrawer<B: HostBuffer> {
    /// Draws `call.range` of `buffer` with `call.mesh`.
    fn draw(&mut self, buffer: &B, call: DrawCall);
}

/// Drawer that records every call and decodes the drawn transforms.
///
/// Used by the headless driver and by tests.
#[derive(Debug, Default, Clone)]
pub struct RecordingDrawer {
    calls: Vec<DrawCall>,
    transforms: Vec<InstanceTransform>,
}

impl RecordingDrawer {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls recorded since the last [`clear`](Self::clear).
    #[must_use]
    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    /// Every drawn transform, in call order.
    #[must_use]
    pub fn transforms(&self) -> &[InstanceTransform] {
        &self.transforms
    }

    /// Total instances drawn.
    #[must_use]
    pub fn instance_count(&self) -> usize {
        self.transforms.len()
    }

    /// Forgets recorded calls.
    pub fn clear(&mut self) {
        self.calls.clear();
        self.transforms.clear();
    }
}

impl<B: HostBuffer> InstanceDrawer<B> for RecordingDrawer {
    fn draw(&mut self, buffer: &B, call: DrawCall) {
        let bytes = buffer.bytes(call.range.byte_range(InstanceTransform::SIZE));
        self.transforms.extend(
            bytes
                .chunks_exact(InstanceTransform::SIZE)
                .map(bytemuck::pod_read_unaligned::<InstanceTransform>),
        );
        self.calls.push(call);
    }
}

/// The segment currently being lengthened.
#[derive(Debug, Clone, Copy, PartialEq)]
struct OpenSegment {
    start: [f32; 3],
    end: [f32; 3],
    direction: Direction,
}

impl OpenSegment {
    /// Segment leaving the ball at `center`, reaching one voxel along `direction`.
    fn from_ball(center: [f32; 3], direction: Direction) -> Self {
        let d = direction.unit_vector();
        Self {
            start: [
                center[0] + d[0] * BALL_RADIUS,
                center[1] + d[1] * BALL_RADIUS,
                center[2] + d[2] * BALL_RADIUS,
            ],
            end: [
                center[0] + d[0] * (1.0 - BALL_RADIUS),
                center[1] + d[1] * (1.0 - BALL_RADIUS),
                center[2] + d[2] * (1.0 - BALL_RADIUS),
            ],
            direction,
        }
    }

    fn extend(&mut self) {
        let d = self.direction.unit_vector();
        for (end, step) in self.end.iter_mut().zip(d) {
            *end += step;
        }
    }

    fn transform(&self) -> InstanceTransform {
        InstanceTransform::segment(self.start, self.end, self.direction)
    }
}

/// Geometry owned for one pipe.
pub struct PipeRenderState<A: BufferAllocator> {
    store: InstanceStore<InstanceTransform, A>,
    segment: Option<OpenSegment>,
    capped: bool,
}

impl<A: BufferAllocator> PipeRenderState<A> {
    /// The pipe's instance store.
    #[must_use]
    pub fn store(&self) -> &InstanceStore<InstanceTransform, A> {
        &self.store
    }

    /// Returns true once the pipe has its terminal cap.
    #[must_use]
    pub const fn is_capped(&self) -> bool {
        self.capped
    }

    /// Returns true while a segment is being lengthened.
    #[must_use]
    pub const fn has_open_segment(&self) -> bool {
        self.segment.is_some()
    }

    fn open_segment(&mut self, center: [f32; 3], direction: Direction) -> Result<(), InstanceError> {
        let segment = OpenSegment::from_ball(center, direction);
        self.store.push_left(segment.transform())?;
        self.segment = Some(segment);
        Ok(())
    }

    /// Closes the pipe with a ball at `head`.
    ///
    /// A pipe that never left its start ball needs no cap. Returns true if a ball
    /// was pushed.
    fn cap(&mut self, head: Voxel) -> Result<bool, InstanceError> {
        if self.capped {
            return Ok(false);
        }
        self.capped = true;
        if self.segment.take().is_none() {
            return Ok(false);
        }
        self.store.push_right(InstanceTransform::ball(head.center()))?;
        Ok(true)
    }
}

impl<A: BufferAllocator> std::fmt::Debug for PipeRenderState<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipeRenderState")
            .field("store", &self.store)
            .field("segment", &self.segment)
            .field("capped", &self.capped)
            .finish()
    }
}

/// The bridge between pipe events and instanced geometry.
pub struct RenderBridge<A: BufferAllocator = HeapAllocator> {
    /// Configuration
    config: RenderBridgeConfig,
    /// Handed to every new store
    allocator: A,
    /// Render state by pipe id
    pipes: BTreeMap<usize, PipeRenderState<A>>,
    /// Counters
    stats: RenderBridgeStats,
}

impl RenderBridge<HeapAllocator> {
    /// Creates a bridge whose stores live in process memory.
    ///
    /// # Errors
    ///
    /// [`InstanceError::ZeroCapacity`] for a zero initial capacity.
    pub fn headless(config: RenderBridgeConfig) -> RenderResult<Self> {
        Self::new(config, HeapAllocator::new())
    }
}

impl<A: BufferAllocator + Clone> RenderBridge<A> {
    /// Creates a bridge with no pipes.
    ///
    /// # Errors
    ///
    /// [`InstanceError::ZeroCapacity`] for a zero initial capacity.
    pub fn new(config: RenderBridgeConfig, allocator: A) -> RenderResult<Self> {
        if config.initial_capacity == 0 {
            return Err(InstanceError::ZeroCapacity.into());
        }
        Ok(Self {
            config,
            allocator,
            pipes: BTreeMap::new(),
            stats: RenderBridgeStats::default(),
        })
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &RenderBridgeConfig {
        &self.config
    }

    /// Counters since creation.
    #[must_use]
    pub const fn stats(&self) -> &RenderBridgeStats {
        &self.stats
    }

    /// Pipes with live render state.
    #[must_use]
    pub fn pipe_count(&self) -> usize {
        self.pipes.len()
    }

    /// Render state of one pipe.
    #[must_use]
    pub fn pipe(&self, pipe_id: usize) -> Option<&PipeRenderState<A>> {
        self.pipes.get(&pipe_id)
    }

    /// Applies one simulation event.
    ///
    /// # Errors
    ///
    /// [`RenderError::UnknownPipe`] for a pipe with no render state,
    /// [`RenderError::DuplicatePipe`] for a second `New`,
    /// [`RenderError::NoOpenSegment`] for a straight step with nothing to extend,
    /// or a store growth failure.
    pub fn apply(&mut self, event: &PipeEvent) -> RenderResult<()> {
        match *event {
            PipeEvent::New {
                pipe_id,
                start_node,
            } => {
                if self.pipes.contains_key(&pipe_id) {
                    return Err(RenderError::DuplicatePipe(pipe_id));
                }
                let mut store =
                    InstanceStore::new(self.allocator.clone(), self.config.initial_capacity)?;
                store.push_right(InstanceTransform::ball(start_node.center()))?;
                self.stats.balls_pushed += 1;
                self.pipes.insert(
                    pipe_id,
                    PipeRenderState {
                        store,
                        segment: None,
                        capped: false,
                    },
                );
                tracing::debug!(pipe_id, ?start_node, "pipe store created");
            }
            PipeEvent::FirstPipe(growth) => {
                let state = self.state_mut(growth.pipe_id)?;
                state.open_segment(growth.last_node.center(), growth.current_dir)?;
                self.stats.segments_pushed += 1;
                self.cap_if_retired(&growth)?;
            }
            PipeEvent::PipeStraight(growth) => {
                let state = self.state_mut(growth.pipe_id)?;
                let segment = state
                    .segment
                    .as_mut()
                    .ok_or(RenderError::NoOpenSegment(growth.pipe_id))?;
                segment.extend();
                let transform = segment.transform();
                state.store.update_left(transform)?;
                self.stats.segments_updated += 1;
                self.cap_if_retired(&growth)?;
            }
            PipeEvent::PipeBend(growth) => {
                // The open segment already stops short of the corner voxel.
                let corner = growth.last_node.center();
                let state = self.state_mut(growth.pipe_id)?;
                state.store.push_right(InstanceTransform::ball(corner))?;
                state.open_segment(corner, growth.current_dir)?;
                self.stats.balls_pushed += 1;
                self.stats.segments_pushed += 1;
                self.cap_if_retired(&growth)?;
            }
            PipeEvent::Died { pipe_id, head, .. } => {
                if self.state_mut(pipe_id)?.cap(head)? {
                    self.stats.balls_pushed += 1;
                }
            }
        }
        self.stats.events_applied += 1;
        Ok(())
    }

    /// Applies events in order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// The first error from [`apply`](Self::apply).
    pub fn apply_all<'a, I>(&mut self, events: I) -> RenderResult<()>
    where
        I: IntoIterator<Item = &'a PipeEvent>,
    {
        events.into_iter().try_for_each(|event| self.apply(event))
    }

    /// Drops a pipe's store.
    ///
    /// # Errors
    ///
    /// [`RenderError::UnknownPipe`] if the pipe has no render state.
    pub fn release(&mut self, pipe_id: usize) -> RenderResult<()> {
        self.pipes
            .remove(&pipe_id)
            .ok_or(RenderError::UnknownPipe(pipe_id))?;
        self.stats.stores_released += 1;
        tracing::debug!(pipe_id, "pipe store released");
        Ok(())
    }

    /// Issues draws for every pipe in id order: segments, then balls.
    ///
    /// Empty ranges are skipped. `colors[pipe_id]` colors the pipe; missing
    /// entries fall back to white. Returns the number of draw calls.
    pub fn draw<D>(&self, drawer: &mut D, colors: &[[f32; 3]]) -> usize
    where
        D: InstanceDrawer<A::Buffer>,
    {
        let mut calls = 0;
        for (&pipe_id, state) in &self.pipes {
            let color = colors.get(pipe_id).copied().unwrap_or(FALLBACK_COLOR);
            let store = &state.store;
            for (mesh, range) in [
                (MeshKind::Segment, store.left_range()),
                (MeshKind::Ball, store.right_range()),
            ] {
                if range.is_empty() {
                    continue;
                }
                drawer.draw(
                    store.buffer(),
                    DrawCall {
                        pipe_id,
                        mesh,
                        range,
                        color,
                    },
                );
                calls += 1;
            }
        }
        calls
    }

    fn state_mut(&mut self, pipe_id: usize) -> RenderResult<&mut PipeRenderState<A>> {
        self.pipes
            .get_mut(&pipe_id)
            .ok_or(RenderError::UnknownPipe(pipe_id))
    }

    /// Caps a pipe the death check retired right after it grew.
    fn cap_if_retired(&mut self, growth: &GrowthEvent) -> RenderResult<()> {
        if !growth.alive && self.state_mut(growth.pipe_id)?.cap(growth.current_node)? {
            self.stats.balls_pushed += 1;
        }
        Ok(())
    }
}

impl<A: BufferAllocator> std::fmt::Debug for RenderBridge<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderBridge")
            .field("config", &self.config)
            .field("pipes", &self.pipes.len())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

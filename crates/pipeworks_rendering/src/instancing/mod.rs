//! Instance storage for pipe geometry.
//!
//! Each pipe owns one [`InstanceStore`] of [`InstanceTransform`]s: segments grow
//! from the front, balls from the back, and both ranges are drawn straight out of
//! the same host-visible block.

mod host;
mod store;
mod transform;

pub use host::{BufferAllocator, HeapAllocator, HeapBuffer, HostBuffer, FLUSH_LOG_LIMIT};
pub use store::{InstanceRange, InstanceStore};
pub use transform::{InstanceTransform, BALL_RADIUS, BALL_SCALE, PIPE_SCALE};

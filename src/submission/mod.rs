//! Per-frame collection, batching and submission of registered drawables.
//!
//! A frame moves through the same stages for every path: the collector turns
//! registered drawables into records, the batcher sorts them and groups compatible
//! ones into instanced draw descriptors, the writer fills the path's instance buffer,
//! the executor records the draws and `end_frame` reclaims what the frame no longer
//! uses. [`RenderSubmissionContext`] drives all of it.

pub mod batching;
pub mod camera;
pub mod collector;
pub mod config;
pub mod context;
pub mod error;
pub mod executor;
pub mod instance_writer;
pub mod path_buffer;
pub mod records;
pub mod registry;
pub mod renderable;
pub mod stats;

#[cfg(test)]
pub(crate) mod test_support;

pub use camera::Camera;
pub use config::{ConfigError, PathConfig, SubmissionConfig};
pub use context::{FrameReport, InstanceStrides, RenderSubmissionContext};
pub use error::SubmissionError;
pub use instance_writer::InstanceCursor;
pub use records::{DrawDescriptor, SubsetRecord, UiRecord};
pub use registry::{RegistryKind, RendererHandle};
pub use renderable::{render_queue, DrawCall, Renderable, ShadowCastMode};
pub use stats::{FrameStats, PathStats};

/// The three record streams a frame is split into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderPath {
    Shadow,
    Main,
    Ui,
}

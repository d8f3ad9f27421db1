//! The graphics API boundary of the submission engine.
//!
//! The engine itself never talks to a GPU directly. It creates, resizes and maps
//! instance buffers through [`GraphicsBackend`] / [`InstanceBuffer`], and records
//! draws into whatever pass context the backend hands out through [`PassEncoder`].

pub mod headless;
pub mod wgpu_backend;

use thiserror::Error;

/// Logical render passes of a frame, in the order they are recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PassKind {
    Shadow,
    DepthPrepass,
    Main,
    Ui,
}

/// Which per-instance struct a buffer holds. Backends may use it to pick a bind
/// group layout or a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstanceLayout {
    World,
    Ui,
}

/// Instance buffers are rewritten every frame, so backends should place them in
/// CPU-writable memory.
#[derive(Debug, Clone)]
pub struct InstanceBufferDescriptor {
    pub label: &'static str,
    pub element_size: u64,
    pub element_count: u64,
    pub layout: InstanceLayout,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BufferError {
    #[error("requested {requested_bytes} bytes but the backend allows at most {limit_bytes}")]
    TooLarge {
        requested_bytes: u64,
        limit_bytes: u64,
    },
    #[error("buffer is already mapped")]
    AlreadyMapped,
    #[error("cannot map {requested} elements, capacity is {capacity}")]
    MapOutOfRange { requested: u64, capacity: u64 },
    #[error("map failed: {0}")]
    MapFailed(String),
}

/// A GPU-visible array of fixed-size instance records.
pub trait InstanceBuffer {
    fn element_size(&self) -> u64;

    fn capacity(&self) -> u64;

    /// Reallocates storage for `element_count` elements. Contents are not preserved.
    fn resize(&mut self, element_count: u64) -> Result<(), BufferError>;

    /// Maps the first `element_count` elements for writing with discard semantics:
    /// whatever was there before is undefined.
    fn map(&mut self, element_count: u64) -> Result<&mut [u8], BufferError>;

    fn unmap(&mut self);
}

pub trait GraphicsBackend: Sized + 'static {
    /// A recorder for one render pass.
    type Context;
    type InstanceBuffer: InstanceBuffer;

    fn create_instance_buffer(
        &self,
        descriptor: &InstanceBufferDescriptor,
    ) -> Result<Self::InstanceBuffer, BufferError>;
}

/// Opens and closes the render passes of one frame.
pub trait PassEncoder<B: GraphicsBackend> {
    /// Returns `None` when the pass should be skipped, e.g. because the target for it
    /// doesn't exist.
    fn begin_pass(&mut self, pass: PassKind) -> Option<B::Context>;

    fn end_pass(&mut self, pass: PassKind, context: B::Context);
}

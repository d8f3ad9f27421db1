//! A CPU-only backend. Instance buffers are plain byte vectors and pass contexts
//! record what would have been sent to the GPU. Useful for tests and for running the
//! submission pipeline on machines without an adapter.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::backend::{
    BufferError, GraphicsBackend, InstanceBuffer, InstanceBufferDescriptor, InstanceLayout,
    PassEncoder, PassKind,
};

#[derive(Debug, Default, Clone)]
pub struct HeadlessBackend {
    /// Upper bound on elements per instance buffer. Creating or resizing past it
    /// fails like an out-of-memory GPU allocation would.
    pub max_elements: Option<u64>,
    fail_map: Arc<AtomicBool>,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_elements(max_elements: u64) -> Self {
        Self {
            max_elements: Some(max_elements),
            ..Self::default()
        }
    }

    /// Makes every subsequent `map` on buffers created by this backend fail.
    pub fn set_map_failure(&self, fail: bool) {
        self.fail_map.store(fail, Ordering::Relaxed);
    }
}

impl GraphicsBackend for HeadlessBackend {
    type Context = HeadlessPass;
    type InstanceBuffer = HeadlessInstanceBuffer;

    fn create_instance_buffer(
        &self,
        descriptor: &InstanceBufferDescriptor,
    ) -> Result<HeadlessInstanceBuffer, BufferError> {
        let mut buffer = HeadlessInstanceBuffer {
            label: descriptor.label,
            layout: descriptor.layout,
            element_size: descriptor.element_size,
            capacity: 0,
            data: Vec::new(),
            mapped: false,
            resize_count: 0,
            max_elements: self.max_elements,
            fail_map: self.fail_map.clone(),
        };

        buffer.allocate(descriptor.element_count)?;

        Ok(buffer)
    }
}

#[derive(Debug)]
pub struct HeadlessInstanceBuffer {
    label: &'static str,
    layout: InstanceLayout,
    element_size: u64,
    capacity: u64,
    data: Vec<u8>,
    mapped: bool,
    resize_count: u32,
    max_elements: Option<u64>,
    fail_map: Arc<AtomicBool>,
}

impl HeadlessInstanceBuffer {
    fn allocate(&mut self, element_count: u64) -> Result<(), BufferError> {
        if let Some(limit) = self.max_elements {
            if element_count > limit {
                return Err(BufferError::TooLarge {
                    requested_bytes: element_count * self.element_size,
                    limit_bytes: limit * self.element_size,
                });
            }
        }

        self.data = vec![0; (element_count * self.element_size) as usize];
        self.capacity = element_count;

        Ok(())
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn layout(&self) -> InstanceLayout {
        self.layout
    }

    /// Number of successful resizes since creation.
    pub fn resize_count(&self) -> u32 {
        self.resize_count
    }

    /// Raw bytes of `count` elements starting at `first`.
    pub fn instance_bytes(&self, first: u32, count: u32) -> &[u8] {
        let start = first as usize * self.element_size as usize;
        let end = start + count as usize * self.element_size as usize;
        &self.data[start.min(self.data.len())..end.min(self.data.len())]
    }
}

impl InstanceBuffer for HeadlessInstanceBuffer {
    fn element_size(&self) -> u64 {
        self.element_size
    }

    fn capacity(&self) -> u64 {
        self.capacity
    }

    fn resize(&mut self, element_count: u64) -> Result<(), BufferError> {
        self.allocate(element_count)?;
        self.resize_count += 1;
        Ok(())
    }

    fn map(&mut self, element_count: u64) -> Result<&mut [u8], BufferError> {
        if self.fail_map.load(Ordering::Relaxed) {
            return Err(BufferError::MapFailed(format!(
                "{} is unavailable",
                self.label
            )));
        }

        if self.mapped {
            return Err(BufferError::AlreadyMapped);
        }

        if element_count > self.capacity {
            return Err(BufferError::MapOutOfRange {
                requested: element_count,
                capacity: self.capacity,
            });
        }

        self.mapped = true;

        let end = (element_count * self.element_size) as usize;
        let mapped = &mut self.data[..end];
        mapped.fill(0);

        Ok(mapped)
    }

    fn unmap(&mut self) {
        self.mapped = false;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedDraw {
    pub label: String,
    pub subset_index: u32,
    pub first_instance: u32,
    pub instance_count: u32,
    pub depth_only: bool,
    /// The instance data the draw would have read.
    pub payload: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCommand {
    BindTargets,
    BindView,
    CopyTargets,
    Draw(RecordedDraw),
}

#[derive(Debug, Clone)]
pub struct HeadlessPass {
    pub kind: PassKind,
    pub commands: Vec<RecordedCommand>,
}

impl HeadlessPass {
    pub fn draws(&self) -> impl Iterator<Item = &RecordedDraw> {
        self.commands.iter().filter_map(|command| match command {
            RecordedCommand::Draw(draw) => Some(draw),
            _ => None,
        })
    }
}

/// Collects the passes of one or more frames in recording order.
#[derive(Debug, Default)]
pub struct HeadlessFrame {
    pub passes: Vec<HeadlessPass>,
    /// Passes listed here are refused by `begin_pass`.
    pub disabled_passes: Vec<PassKind>,
}

impl HeadlessFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pass(&self, kind: PassKind) -> Option<&HeadlessPass> {
        self.passes.iter().find(|pass| pass.kind == kind)
    }

    pub fn draws(&self, kind: PassKind) -> Vec<&RecordedDraw> {
        self.pass(kind)
            .map(|pass| pass.draws().collect())
            .unwrap_or_default()
    }
}

impl PassEncoder<HeadlessBackend> for HeadlessFrame {
    fn begin_pass(&mut self, pass: PassKind) -> Option<HeadlessPass> {
        if self.disabled_passes.contains(&pass) {
            return None;
        }

        Some(HeadlessPass {
            kind: pass,
            commands: Vec::new(),
        })
    }

    fn end_pass(&mut self, _pass: PassKind, context: HeadlessPass) {
        self.passes.push(context);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(count: u64) -> InstanceBufferDescriptor {
        InstanceBufferDescriptor {
            label: "Test instances",
            element_size: 16,
            element_count: count,
            layout: InstanceLayout::World,
        }
    }

    #[test]
    fn test_create_respects_limit() {
        let backend = HeadlessBackend::with_max_elements(4);

        assert!(backend.create_instance_buffer(&descriptor(4)).is_ok());
        assert!(matches!(
            backend.create_instance_buffer(&descriptor(5)),
            Err(BufferError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_map_twice_fails_until_unmapped() {
        let backend = HeadlessBackend::new();
        let mut buffer = backend.create_instance_buffer(&descriptor(8)).unwrap();

        assert_eq!(buffer.map(8).unwrap().len(), 8 * 16);
        assert_eq!(buffer.map(1), Err(BufferError::AlreadyMapped));

        buffer.unmap();
        assert!(buffer.map(1).is_ok());
    }

    #[test]
    fn test_map_out_of_range() {
        let backend = HeadlessBackend::new();
        let mut buffer = backend.create_instance_buffer(&descriptor(2)).unwrap();

        assert_eq!(
            buffer.map(3),
            Err(BufferError::MapOutOfRange {
                requested: 3,
                capacity: 2
            })
        );
    }

    #[test]
    fn test_map_failure_switch_is_shared() {
        let backend = HeadlessBackend::new();
        let mut buffer = backend.create_instance_buffer(&descriptor(2)).unwrap();

        backend.set_map_failure(true);
        assert!(matches!(buffer.map(1), Err(BufferError::MapFailed(_))));

        backend.set_map_failure(false);
        assert!(buffer.map(1).is_ok());
    }

    #[test]
    fn test_resize_counts_and_reallocates() {
        let backend = HeadlessBackend::new();
        let mut buffer = backend.create_instance_buffer(&descriptor(2)).unwrap();

        buffer.resize(10).unwrap();

        assert_eq!(buffer.capacity(), 10);
        assert_eq!(buffer.resize_count(), 1);
        assert_eq!(buffer.instance_bytes(0, 10).len(), 160);
    }
}

use bytemuck::Pod;

use crate::{
    backend::{BufferError, GraphicsBackend, InstanceBuffer},
    submission::{
        error::SubmissionError,
        path_buffer::PathBuffer,
        records::{DrawDescriptor, PathRecord},
        registry::RegistrySlots,
    },
};

/// A view of one instance slot in a mapped instance buffer.
pub struct InstanceCursor<'a> {
    data: &'a mut [u8],
    stride: usize,
    slot: usize,
}

impl<'a> InstanceCursor<'a> {
    pub(crate) fn new(data: &'a mut [u8], stride: usize) -> Self {
        Self {
            data,
            stride,
            slot: 0,
        }
    }

    pub(crate) fn seek(&mut self, slot: usize) {
        self.slot = slot;
    }

    /// Index of the instance slot being written.
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Bytes available per instance.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Writes `instance` into the current slot. A payload larger than the stride is
    /// truncated.
    pub fn write<T: Pod>(&mut self, instance: &T) {
        self.write_bytes(bytemuck::bytes_of(instance));
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        if bytes.len() > self.stride {
            log::warn!(
                "Instance payload of {} bytes doesn't fit the {} byte stride",
                bytes.len(),
                self.stride
            );
        }

        let len = bytes.len().min(self.stride);
        let start = self.slot * self.stride;
        self.data[start..start + len].copy_from_slice(&bytes[..len]);
    }
}

/// Maps the path's instance buffer, lets every drawable behind a generated draw
/// descriptor write its payload into its slot and unmaps again.
///
/// Returns the number of instance slots written. A map failure marks the path failed
/// for the rest of the frame.
pub fn write_instances<B, R>(
    path_buffer: &mut PathBuffer<R, B::InstanceBuffer>,
    drawables: &RegistrySlots<B>,
) -> Result<usize, SubmissionError>
where
    B: GraphicsBackend,
    R: PathRecord,
{
    if path_buffer.is_failed() {
        return Ok(0);
    }

    let path = path_buffer.path();
    let (records, descriptors, instance_buffer) = path_buffer.split_for_writing();

    let result = fill_instances(records, descriptors, instance_buffer, drawables);

    result.map_err(|source| {
        path_buffer.mark_failed();
        SubmissionError::Map { path, source }
    })
}

fn fill_instances<B, R>(
    records: &[R],
    descriptors: &[DrawDescriptor],
    instance_buffer: &mut B::InstanceBuffer,
    drawables: &RegistrySlots<B>,
) -> Result<usize, BufferError>
where
    B: GraphicsBackend,
    R: PathRecord,
{
    let used_slots = descriptors
        .iter()
        .map(|descriptor| descriptor.instances().end)
        .max()
        .unwrap_or(0);

    if used_slots == 0 {
        return Ok(0);
    }

    let stride = instance_buffer.element_size() as usize;
    let mapped = instance_buffer.map(used_slots as u64)?;

    let mut cursor = InstanceCursor::new(mapped, stride);
    let mut written = 0;

    for descriptor in descriptors {
        for slot in descriptor.instances() {
            let Some(drawable) = records[slot]
                .owner()
                .and_then(|handle| drawables.get(handle))
            else {
                continue;
            };

            cursor.seek(slot);
            drawable.write_instance(&mut cursor);
            written += 1;
        }
    }

    instance_buffer.unmap();

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Mat4;

    #[test]
    fn test_cursor_writes_at_slot() {
        let mut data = vec![0u8; 3 * 64];
        let mut cursor = InstanceCursor::new(&mut data, 64);

        cursor.seek(2);
        cursor.write(&Mat4::IDENTITY);

        assert!(data[..128].iter().all(|byte| *byte == 0));
        assert_eq!(&data[128..192], bytemuck::bytes_of(&Mat4::IDENTITY));
    }

    #[test]
    fn test_oversized_payload_is_truncated() {
        let mut data = vec![0u8; 8];
        let mut cursor = InstanceCursor::new(&mut data, 4);

        cursor.seek(1);
        cursor.write(&[1u32, 2u32]);

        assert_eq!(&data[4..8], bytemuck::bytes_of(&1u32));
    }
}

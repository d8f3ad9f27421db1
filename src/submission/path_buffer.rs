use crate::{
    backend::InstanceBuffer,
    submission::{
        config::PathConfig,
        error::SubmissionError,
        records::{DrawDescriptor, PathRecord},
        RenderPath,
    },
};

/// Per-path storage: a growable record array, the GPU instance buffer sized to the
/// same capacity and the draw descriptors generated from the records.
///
/// Nothing is ever freed between frames. `end_frame` rotates the current and previous
/// counts and drops the drawable handles of slots the frame no longer uses.
pub struct PathBuffer<R: PathRecord, I: InstanceBuffer> {
    path: RenderPath,
    growth_increment: usize,
    records: Vec<R>,
    current_count: usize,
    previous_count: usize,
    descriptors: Vec<DrawDescriptor>,
    descriptor_count: usize,
    previous_descriptor_count: usize,
    instance_buffer: I,
    failed: bool,
}

impl<R: PathRecord, I: InstanceBuffer> PathBuffer<R, I> {
    pub fn new(path: RenderPath, config: &PathConfig, instance_buffer: I) -> Self {
        let capacity = instance_buffer.capacity() as usize;

        Self {
            path,
            growth_increment: config.growth_increment() as usize,
            records: vec![R::default(); capacity],
            current_count: 0,
            previous_count: 0,
            descriptors: vec![DrawDescriptor::default(); capacity],
            descriptor_count: 0,
            previous_descriptor_count: 0,
            instance_buffer,
            failed: false,
        }
    }

    pub fn path(&self) -> RenderPath {
        self.path
    }

    pub fn capacity(&self) -> usize {
        self.records.len()
    }

    pub fn current_count(&self) -> usize {
        self.current_count
    }

    pub fn previous_count(&self) -> usize {
        self.previous_count
    }

    /// True when a buffer operation failed this frame. The path is skipped until
    /// `end_frame`.
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    pub(crate) fn mark_failed(&mut self) {
        self.failed = true;
    }

    /// Makes room for `additional` more records. Capacity grows by whole growth
    /// increments in a single resize of the records, the instance buffer and the
    /// descriptor array.
    pub fn ensure_capacity(&mut self, additional: usize) -> Result<(), SubmissionError> {
        let required = self.current_count + additional;
        let capacity = self.capacity();

        if required <= capacity {
            return Ok(());
        }

        let increments = (required - capacity).div_ceil(self.growth_increment);
        let new_capacity = capacity + increments * self.growth_increment;

        if let Err(source) = self.instance_buffer.resize(new_capacity as u64) {
            self.failed = true;
            return Err(SubmissionError::Resize {
                path: self.path,
                capacity: new_capacity as u64,
                source,
            });
        }

        log::debug!(
            "Growing {:?} path buffer from {} to {} records",
            self.path,
            capacity,
            new_capacity
        );

        self.records.resize(new_capacity, R::default());
        self.descriptors.resize(new_capacity, DrawDescriptor::default());

        Ok(())
    }

    /// Appends a record. Capacity must have been reserved with `ensure_capacity`.
    pub fn push(&mut self, record: R) {
        debug_assert!(self.current_count < self.capacity());

        self.records[self.current_count] = record;
        self.current_count += 1;
    }

    /// The records submitted this frame.
    pub fn records(&self) -> &[R] {
        &self.records[..self.current_count]
    }

    /// The whole backing array, including slots past `current_count`.
    pub fn slots(&self) -> &[R] {
        &self.records
    }

    pub fn descriptors(&self) -> &[DrawDescriptor] {
        &self.descriptors[..self.descriptor_count]
    }

    /// The whole descriptor array, including slots past the descriptor cursor.
    pub fn descriptor_slots(&self) -> &[DrawDescriptor] {
        &self.descriptors
    }

    /// Borrows this frame's records for reordering together with a writer that appends
    /// draw descriptors.
    pub(crate) fn split_for_batching(&mut self) -> (&mut [R], DescriptorWriter<'_>) {
        (
            &mut self.records[..self.current_count],
            DescriptorWriter::new(&mut self.descriptors, &mut self.descriptor_count),
        )
    }

    pub fn instance_buffer(&self) -> &I {
        &self.instance_buffer
    }

    /// Borrows the frame's records and descriptors alongside the instance buffer, for
    /// writing instance data.
    pub(crate) fn split_for_writing(&mut self) -> (&[R], &[DrawDescriptor], &mut I) {
        (
            &self.records[..self.current_count],
            &self.descriptors[..self.descriptor_count],
            &mut self.instance_buffer,
        )
    }

    /// Throws away what the frame collected so far so it can be collected again. The
    /// discarded slots stay in the reclaim range of the next `end_frame`.
    pub(crate) fn restart_frame(&mut self) {
        self.previous_count = self.previous_count.max(self.current_count);
        self.previous_descriptor_count = self.previous_descriptor_count.max(self.descriptor_count);
        self.current_count = 0;
        self.descriptor_count = 0;
        self.failed = false;
    }

    /// Reclaims the slots the frame stopped using and rotates the counters.
    pub fn end_frame(&mut self) {
        if self.current_count < self.previous_count {
            for record in &mut self.records[self.current_count..self.previous_count] {
                record.clear_owner();
            }
        }

        if self.descriptor_count < self.previous_descriptor_count {
            for descriptor in
                &mut self.descriptors[self.descriptor_count..self.previous_descriptor_count]
            {
                descriptor.owner = None;
            }
        }

        self.previous_count = self.current_count;
        self.current_count = 0;
        self.previous_descriptor_count = self.descriptor_count;
        self.descriptor_count = 0;
        self.failed = false;
    }
}

/// Appends draw descriptors into a path's preallocated descriptor array.
pub struct DescriptorWriter<'a> {
    slots: &'a mut [DrawDescriptor],
    count: &'a mut usize,
}

impl<'a> DescriptorWriter<'a> {
    pub(crate) fn new(slots: &'a mut [DrawDescriptor], count: &'a mut usize) -> Self {
        Self { slots, count }
    }

    /// There is never more than one descriptor per record, so the array sized to the
    /// record capacity always has room.
    pub fn push(&mut self, descriptor: DrawDescriptor) {
        self.slots[*self.count] = descriptor;
        *self.count += 1;
    }

    pub fn len(&self) -> usize {
        *self.count
    }

    pub fn is_empty(&self) -> bool {
        *self.count == 0
    }
}

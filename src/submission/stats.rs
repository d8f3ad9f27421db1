use std::fmt;

use crate::{
    backend::InstanceBuffer,
    submission::{executor::SubmitCounts, path_buffer::PathBuffer, records::PathRecord},
};

/// What one path did in one frame.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PathStats {
    pub records: usize,
    /// Records that survived culling. Equal to `records` on paths that don't cull.
    pub visible: usize,
    pub descriptors: usize,
    /// Descriptors drawing more than one instance.
    pub instanced_descriptors: usize,
    pub instances_written: usize,
    pub draws: usize,
    pub capacity: usize,
    pub failed: bool,
}

impl PathStats {
    pub(crate) fn collect<R: PathRecord, I: InstanceBuffer>(
        path_buffer: &PathBuffer<R, I>,
        visible: usize,
        instances_written: usize,
        submitted: SubmitCounts,
    ) -> Self {
        let descriptors = path_buffer.descriptors();

        Self {
            records: path_buffer.current_count(),
            visible,
            descriptors: descriptors.len(),
            instanced_descriptors: descriptors
                .iter()
                .filter(|descriptor| descriptor.instance_count > 1)
                .count(),
            instances_written,
            draws: submitted.total(),
            capacity: path_buffer.capacity(),
            failed: path_buffer.is_failed(),
        }
    }
}

impl fmt::Display for PathStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} visible, {} descriptors ({} instanced), {} draws, capacity {}",
            self.visible,
            self.records,
            self.descriptors,
            self.instanced_descriptors,
            self.draws,
            self.capacity
        )?;

        if self.failed {
            write!(f, " [failed]")?;
        }

        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameStats {
    pub frame_index: u64,
    pub shadow: PathStats,
    pub main: PathStats,
    pub ui: PathStats,
}

impl FrameStats {
    pub fn total_draws(&self) -> usize {
        self.shadow.draws + self.main.draws + self.ui.draws
    }
}

impl fmt::Display for FrameStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "frame {}: shadow {}; main {}; ui {}",
            self.frame_index, self.shadow, self.main, self.ui
        )
    }
}

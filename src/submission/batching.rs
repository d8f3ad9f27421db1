//! Sorting and clustering of path records into draw descriptors.
//!
//! Records are reordered in place so that every descriptor covers a contiguous run of
//! records. A record's index after sorting is also its instance slot, which is what
//! lets the instance writer walk descriptors and records in lockstep.
//!
//! Main path order: visible before culled, then by queue. Opaque queues put
//! non-batchable records first (one draw each) and cluster the rest by material,
//! mesh and subset. Transparent queues are drawn back to front, one draw per record.

use std::cmp::Ordering;

use rayon::prelude::*;

use crate::{
    backend::GraphicsBackend,
    math::frustum::Frustum,
    submission::{
        path_buffer::DescriptorWriter,
        records::{DrawDescriptor, SubsetRecord, UiRecord},
        registry::RegistrySlots,
        renderable::render_queue,
    },
};

fn single(record: &SubsetRecord, slot: usize) -> DrawDescriptor {
    instanced(record, slot, 1)
}

fn instanced(record: &SubsetRecord, slot: usize, instance_count: usize) -> DrawDescriptor {
    DrawDescriptor {
        start_instance: slot as u32,
        instance_count: instance_count as u32,
        queue: record.queue,
        subset_index: record.subset_index,
        uses_copy_target: record.uses_copy_target,
        owner: record.owner,
    }
}

/// Sets `do_render` on every record from its owner's bounds. Owners exempt from
/// culling always render; records whose owner was unregistered never do.
pub fn cull_records<B: GraphicsBackend>(
    records: &mut [SubsetRecord],
    drawables: &RegistrySlots<B>,
    frustum: &Frustum,
    parallel_threshold: usize,
) {
    let is_visible = |record: &SubsetRecord| {
        let Some(drawable) = record.owner.and_then(|handle| drawables.get(handle)) else {
            return false;
        };

        drawable.is_through_frustum_culling()
            || drawable.renderer_bounds().intersects_frustum(frustum)
    };

    if records.len() >= parallel_threshold {
        records
            .par_iter_mut()
            .for_each(|record| record.do_render = is_visible(record));
    } else {
        for record in records.iter_mut() {
            record.do_render = is_visible(record);
        }
    }
}

/// Partitions visible records to the front and clusters them. Returns the number of
/// visible records.
pub fn batch_main(records: &mut [SubsetRecord], descriptors: &mut DescriptorWriter<'_>) -> usize {
    // Stable: false sorts before true, so negate to get visible records first.
    records.sort_by_key(|record| !record.do_render);
    let visible = records.partition_point(|record| record.do_render);

    if visible > 0 {
        cluster_by_queue(&mut records[..visible], descriptors);
    }

    visible
}

/// Shadow records are consumed as collected unless clustering was requested, in which
/// case every caster is treated as visible.
pub fn batch_shadow(
    records: &mut [SubsetRecord],
    cluster: bool,
    descriptors: &mut DescriptorWriter<'_>,
) {
    if cluster {
        cluster_by_queue(records, descriptors);
        return;
    }

    for (slot, record) in records.iter().enumerate() {
        descriptors.push(single(record, slot));
    }
}

fn cluster_by_queue(records: &mut [SubsetRecord], descriptors: &mut DescriptorWriter<'_>) {
    records.sort_by_key(|record| record.queue);

    let mut offset = 0;
    for run in records.chunk_by_mut(|a, b| a.queue == b.queue) {
        let len = run.len();

        if run[0].queue < render_queue::TRANSPARENT {
            cluster_opaque(run, offset, descriptors);
        } else {
            order_back_to_front(run, offset, descriptors);
        }

        offset += len;
    }
}

fn cluster_opaque(run: &mut [SubsetRecord], offset: usize, descriptors: &mut DescriptorWriter<'_>) {
    run.sort_by_key(|record| record.can_batch);
    let singles = run.partition_point(|record| !record.can_batch);

    for (index, record) in run[..singles].iter().enumerate() {
        descriptors.push(single(record, offset + index));
    }

    let batchable = &mut run[singles..];
    batchable.sort_by_key(SubsetRecord::batch_key);

    let mut slot = offset + singles;
    for batch in batchable.chunk_by(|a, b| a.batch_key() == b.batch_key()) {
        descriptors.push(instanced(&batch[0], slot, batch.len()));
        slot += batch.len();
    }
}

fn order_back_to_front(
    run: &mut [SubsetRecord],
    offset: usize,
    descriptors: &mut DescriptorWriter<'_>,
) {
    run.sort_by(|a, b| b.distance.total_cmp(&a.distance));

    for (index, record) in run.iter().enumerate() {
        descriptors.push(single(record, offset + index));
    }
}

fn compare_ui(a: &UiRecord, b: &UiRecord) -> Ordering {
    a.depth
        .total_cmp(&b.depth)
        .then(a.material_hash.cmp(&b.material_hash))
        .then(a.texture_hash.cmp(&b.texture_hash))
}

/// Sorts UI records by depth, material and texture and emits one instanced draw per
/// run of equal keys.
pub fn batch_ui(records: &mut [UiRecord], descriptors: &mut DescriptorWriter<'_>) {
    records.sort_by(compare_ui);

    let mut slot = 0;
    for batch in records.chunk_by(|a, b| compare_ui(a, b) == Ordering::Equal) {
        let representative = &batch[0];

        descriptors.push(DrawDescriptor {
            start_instance: slot as u32,
            instance_count: batch.len() as u32,
            queue: render_queue::OVERLAY,
            subset_index: 0,
            uses_copy_target: representative.uses_copy_target,
            owner: representative.owner,
        });

        slot += batch.len();
    }
}

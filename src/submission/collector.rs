//! Walks the registries and fills the path buffers with this frame's records.

use crate::{
    backend::{GraphicsBackend, InstanceBuffer},
    submission::{
        camera::Camera,
        error::SubmissionError,
        path_buffer::PathBuffer,
        records::{PathRecord, SubsetRecord, UiRecord},
        registry::RegistrySlots,
        renderable::ShadowCastMode,
    },
};

/// True when the camera's mask excludes the layer.
fn is_layer_culled(culling_mask: u32, layer: u32) -> bool {
    let bit = 1u32.checked_shl(layer).unwrap_or(0);
    culling_mask & bit != 0
}

/// Returns false when the path has failed and the records were dropped.
fn append<R: PathRecord, I: InstanceBuffer>(
    path_buffer: &mut PathBuffer<R, I>,
    records: &[R],
    errors: &mut Vec<SubmissionError>,
) -> bool {
    if path_buffer.is_failed() {
        return false;
    }

    if let Err(error) = path_buffer.ensure_capacity(records.len()) {
        log::error!("{error}: {}", error_source(&error));
        errors.push(error);
        return false;
    }

    for record in records {
        path_buffer.push(*record);
    }

    true
}

fn error_source(error: &SubmissionError) -> String {
    std::error::Error::source(error)
        .map(|source| source.to_string())
        .unwrap_or_default()
}

/// Builds the shadow and main records of every eligible world drawable.
pub fn collect_world<B: GraphicsBackend>(
    camera: &dyn Camera<B>,
    drawables: &RegistrySlots<B>,
    shadow: &mut PathBuffer<SubsetRecord, B::InstanceBuffer>,
    main: &mut PathBuffer<SubsetRecord, B::InstanceBuffer>,
    scratch: &mut Vec<SubsetRecord>,
    errors: &mut Vec<SubmissionError>,
) {
    let culling_mask = camera.culling_mask();
    let camera_position = camera.world_position();

    for (handle, drawable) in drawables.iter() {
        drawable.set_visible(false);

        if !drawable.is_active_and_enabled() {
            continue;
        }

        if is_layer_culled(culling_mask, drawable.layer()) {
            continue;
        }

        let subset_count = drawable.subset_count();
        if subset_count == 0 {
            continue;
        }

        drawable.calculate_render_parameter(camera);

        let distance = (camera_position - drawable.world_position()).length_squared();
        let can_batch = drawable.can_batch();
        let mesh_hash = drawable.mesh_hash();

        scratch.clear();
        scratch.extend((0..subset_count).filter_map(|subset| {
            let queue = drawable.render_queue(subset);
            if queue < 0 {
                return None;
            }

            Some(SubsetRecord {
                queue,
                can_batch,
                distance,
                mesh_hash,
                material_hash: drawable.material_hash(subset),
                subset_index: subset as u32,
                uses_copy_target: drawable.uses_copy_target(subset),
                do_render: false,
                owner: Some(handle),
            })
        }));

        let shadow_cast_mode = drawable.shadow_cast_mode();

        if shadow_cast_mode != ShadowCastMode::Off && append(shadow, scratch, errors) {
            drawable.set_visible(true);
        }

        if shadow_cast_mode != ShadowCastMode::ShadowsOnly {
            append(main, scratch, errors);
        }
    }
}

/// Builds one record per eligible UI drawable.
pub fn collect_ui<B: GraphicsBackend>(
    camera: &dyn Camera<B>,
    drawables: &RegistrySlots<B>,
    ui: &mut PathBuffer<UiRecord, B::InstanceBuffer>,
    errors: &mut Vec<SubmissionError>,
) {
    let culling_mask = camera.culling_mask();

    for (handle, drawable) in drawables.iter() {
        drawable.set_visible(false);

        if !drawable.is_active_and_enabled() {
            continue;
        }

        if is_layer_culled(culling_mask, drawable.layer()) {
            continue;
        }

        let texture_hash = drawable.texture_hash();
        if texture_hash == 0 {
            continue;
        }

        let record = UiRecord {
            depth: drawable.depth(),
            material_hash: drawable.material_hash(0),
            texture_hash,
            uses_copy_target: drawable.uses_copy_target(0),
            owner: Some(handle),
        };

        if append(ui, &[record], errors) {
            drawable.set_visible(true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_culling_uses_excluded_bits() {
        assert!(is_layer_culled(0b0100, 2));
        assert!(!is_layer_culled(0b0100, 1));
        assert!(!is_layer_culled(u32::MAX, 40));
    }
}

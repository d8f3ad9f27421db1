//! Turns draw descriptors into render calls on the drawables that own them.

use std::sync::Arc;

use crate::{
    backend::{GraphicsBackend, PassEncoder, PassKind},
    submission::{
        camera::Camera,
        path_buffer::PathBuffer,
        records::{DrawDescriptor, PathRecord},
        registry::RegistrySlots,
        renderable::{render_queue, DrawCall, Renderable},
    },
};

/// Draw counts of one submitted path.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SubmitCounts {
    pub depth_draws: usize,
    pub color_draws: usize,
}

impl SubmitCounts {
    pub fn total(&self) -> usize {
        self.depth_draws + self.color_draws
    }
}

struct Target<'a, B: GraphicsBackend, R: PathRecord> {
    camera: &'a dyn Camera<B>,
    instance_buffer: &'a B::InstanceBuffer,
    records: &'a [R],
    drawables: &'a RegistrySlots<B>,
}

impl<'a, B: GraphicsBackend, R: PathRecord> Target<'a, B, R> {
    fn pass(
        &self,
        encoder: &mut dyn PassEncoder<B>,
        kind: PassKind,
        record: impl FnOnce(&mut B::Context) -> usize,
    ) -> usize {
        let Some(mut context) = encoder.begin_pass(kind) else {
            log::trace!("{kind:?} pass skipped by the encoder");
            return 0;
        };

        self.camera.bind_targets(&mut context);
        self.camera.bind_view(&mut context);

        let draws = record(&mut context);

        encoder.end_pass(kind, context);

        draws
    }

    /// The drawable that renders a descriptor. When the descriptor's owner has been
    /// unregistered, any still registered drawable of the same instance run stands in.
    fn resolve(&self, descriptor: &DrawDescriptor) -> Option<&'a Arc<dyn Renderable<B>>> {
        let drawables = self.drawables;

        descriptor
            .owner
            .and_then(|handle| drawables.get(handle))
            .or_else(|| {
                self.records
                    .get(descriptor.instances())?
                    .iter()
                    .find_map(|record| record.owner().and_then(|handle| drawables.get(handle)))
            })
    }

    fn draw(
        &self,
        context: &mut B::Context,
        drawable: &dyn Renderable<B>,
        descriptor: &DrawDescriptor,
        depth_only: bool,
    ) {
        drawable.render(
            context,
            &DrawCall {
                subset_index: descriptor.subset_index,
                first_instance: descriptor.start_instance,
                instance_count: descriptor.instance_count,
                instance_buffer: self.instance_buffer,
                camera: self.camera,
                depth_only,
            },
        );
    }

    /// Draws every descriptor that still resolves to a drawable and returns the count.
    fn draw_all<'d>(
        &self,
        context: &mut B::Context,
        descriptors: impl Iterator<Item = &'d DrawDescriptor>,
        depth_only: bool,
    ) -> usize {
        let mut draws = 0;

        for descriptor in descriptors {
            if let Some(drawable) = self.resolve(descriptor) {
                self.draw(context, drawable.as_ref(), descriptor, depth_only);
                draws += 1;
            }
        }

        draws
    }
}

fn target<'a, B: GraphicsBackend, R: PathRecord>(
    camera: &'a dyn Camera<B>,
    path_buffer: &'a PathBuffer<R, B::InstanceBuffer>,
    drawables: &'a RegistrySlots<B>,
) -> Option<Target<'a, B, R>> {
    if path_buffer.is_failed() || path_buffer.descriptors().is_empty() {
        return None;
    }

    Some(Target {
        camera,
        instance_buffer: path_buffer.instance_buffer(),
        records: path_buffer.records(),
        drawables,
    })
}

/// Depth-only draws of every shadow descriptor.
pub fn submit_shadow<B: GraphicsBackend, R: PathRecord>(
    encoder: &mut dyn PassEncoder<B>,
    camera: &dyn Camera<B>,
    path_buffer: &PathBuffer<R, B::InstanceBuffer>,
    drawables: &RegistrySlots<B>,
) -> SubmitCounts {
    let Some(target) = target(camera, path_buffer, drawables) else {
        return SubmitCounts::default();
    };

    let depth_draws = target.pass(encoder, PassKind::Shadow, |context| {
        target.draw_all(context, path_buffer.descriptors().iter(), true)
    });

    SubmitCounts {
        depth_draws,
        color_draws: 0,
    }
}

/// Depth prepass for opaque non-particle draws, then the colour pass.
pub fn submit_main<B: GraphicsBackend, R: PathRecord>(
    encoder: &mut dyn PassEncoder<B>,
    camera: &dyn Camera<B>,
    path_buffer: &PathBuffer<R, B::InstanceBuffer>,
    drawables: &RegistrySlots<B>,
) -> SubmitCounts {
    let Some(target) = target(camera, path_buffer, drawables) else {
        return SubmitCounts::default();
    };

    let descriptors = path_buffer.descriptors();

    let in_prepass = |descriptor: &DrawDescriptor| {
        descriptor.queue < render_queue::ALPHA_TEST
            && target
                .resolve(descriptor)
                .is_some_and(|drawable| !drawable.is_particle())
    };

    let mut counts = SubmitCounts::default();

    if descriptors.iter().any(in_prepass) {
        counts.depth_draws = target.pass(encoder, PassKind::DepthPrepass, |context| {
            target.draw_all(context, descriptors.iter().filter(|&d| in_prepass(d)), true)
        });
    }

    counts.color_draws = target.pass(encoder, PassKind::Main, |context| {
        let mut draws = 0;

        for descriptor in descriptors {
            let Some(drawable) = target.resolve(descriptor) else {
                continue;
            };

            if descriptor.uses_copy_target {
                camera.copy_and_bind_targets(context);
            }

            target.draw(context, drawable.as_ref(), descriptor, false);
            draws += 1;
        }

        draws
    });

    counts
}

/// One draw per UI descriptor.
pub fn submit_ui<B: GraphicsBackend, R: PathRecord>(
    encoder: &mut dyn PassEncoder<B>,
    camera: &dyn Camera<B>,
    path_buffer: &PathBuffer<R, B::InstanceBuffer>,
    drawables: &RegistrySlots<B>,
) -> SubmitCounts {
    let Some(target) = target(camera, path_buffer, drawables) else {
        return SubmitCounts::default();
    };

    let color_draws = target.pass(encoder, PassKind::Ui, |context| {
        target.draw_all(context, path_buffer.descriptors().iter(), false)
    });

    SubmitCounts {
        depth_draws: 0,
        color_draws,
    }
}

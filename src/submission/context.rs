use std::sync::Arc;

use glam::{Mat4, Vec4};

use crate::{
    backend::{GraphicsBackend, InstanceBufferDescriptor, InstanceLayout, PassEncoder},
    submission::{
        batching::{batch_main, batch_shadow, batch_ui, cull_records},
        camera::Camera,
        collector::{collect_ui, collect_world},
        config::SubmissionConfig,
        error::SubmissionError,
        executor::{submit_main, submit_shadow, submit_ui, SubmitCounts},
        instance_writer::write_instances,
        path_buffer::PathBuffer,
        records::{PathRecord, SubsetRecord, UiRecord},
        registry::{RegistryKind, RegistrySlots, RendererHandle, RendererRegistry},
        renderable::Renderable,
        stats::{FrameStats, PathStats},
        RenderPath,
    },
};

/// Bytes per instance slot of the world paths and of the UI path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstanceStrides {
    pub world: u64,
    pub ui: u64,
}

impl Default for InstanceStrides {
    /// A model matrix per world instance, a rect and a tint per UI instance.
    fn default() -> Self {
        Self {
            world: std::mem::size_of::<Mat4>() as u64,
            ui: 2 * std::mem::size_of::<Vec4>() as u64,
        }
    }
}

/// Outcome of one frame.
#[derive(Debug, Default)]
pub struct FrameReport {
    pub stats: FrameStats,
    /// Paths that failed this frame and why. A failed path drew nothing.
    pub errors: Vec<SubmissionError>,
}

#[derive(Debug, Default, Clone, Copy)]
struct PathProgress {
    visible: usize,
    instances_written: usize,
    submitted: SubmitCounts,
}

#[derive(Debug, Default)]
struct FrameState {
    shadow: PathProgress,
    main: PathProgress,
    ui: PathProgress,
    errors: Vec<SubmissionError>,
}

/// Owns the drawable registries and the per-path buffers, and drives a frame through
/// collection, batching, instance writing, submission and reclaiming.
///
/// Registration and unregistration may happen from any thread, also while a frame is
/// running: clone the registry out of [`Self::world_registry`] or
/// [`Self::ui_registry`] to hand it to another thread. The frame stages lock the
/// registries while they read drawables, so drawables must not register or unregister
/// from inside their own callbacks.
pub struct RenderSubmissionContext<B: GraphicsBackend> {
    config: SubmissionConfig,
    world: Arc<RendererRegistry<B>>,
    ui: Arc<RendererRegistry<B>>,
    shadow_path: PathBuffer<SubsetRecord, B::InstanceBuffer>,
    main_path: PathBuffer<SubsetRecord, B::InstanceBuffer>,
    ui_path: PathBuffer<UiRecord, B::InstanceBuffer>,
    scratch: Vec<SubsetRecord>,
    frame_index: u64,
    frame: FrameState,
}

fn create_path<B: GraphicsBackend, R: PathRecord>(
    backend: &B,
    config: &SubmissionConfig,
    path: RenderPath,
    element_size: u64,
) -> Result<PathBuffer<R, B::InstanceBuffer>, SubmissionError> {
    let (label, layout) = match path {
        RenderPath::Shadow => ("Shadow instance buffer", InstanceLayout::World),
        RenderPath::Main => ("Main instance buffer", InstanceLayout::World),
        RenderPath::Ui => ("UI instance buffer", InstanceLayout::Ui),
    };

    let path_config = config.path(path);

    let instance_buffer = backend
        .create_instance_buffer(&InstanceBufferDescriptor {
            label,
            element_size,
            element_count: path_config.initial_capacity as u64,
            layout,
        })
        .map_err(|source| SubmissionError::Create { path, source })?;

    Ok(PathBuffer::new(path, path_config, instance_buffer))
}

fn write_path<B: GraphicsBackend, R: PathRecord>(
    path_buffer: &mut PathBuffer<R, B::InstanceBuffer>,
    drawables: &RegistrySlots<B>,
    errors: &mut Vec<SubmissionError>,
) -> usize {
    match write_instances(path_buffer, drawables) {
        Ok(written) => written,
        Err(error) => {
            log::error!("{error}");
            errors.push(error);
            0
        }
    }
}

impl<B: GraphicsBackend> RenderSubmissionContext<B> {
    pub fn new(backend: &B, config: SubmissionConfig) -> Result<Self, SubmissionError> {
        Self::with_strides(backend, config, InstanceStrides::default())
    }

    pub fn with_strides(
        backend: &B,
        config: SubmissionConfig,
        strides: InstanceStrides,
    ) -> Result<Self, SubmissionError> {
        let shadow_path = create_path(backend, &config, RenderPath::Shadow, strides.world)?;
        let main_path = create_path(backend, &config, RenderPath::Main, strides.world)?;
        let ui_path = create_path(backend, &config, RenderPath::Ui, strides.ui)?;

        log::debug!(
            "Created submission context with capacities shadow {}, main {}, ui {}",
            shadow_path.capacity(),
            main_path.capacity(),
            ui_path.capacity()
        );

        Ok(Self {
            config,
            world: Arc::new(RendererRegistry::new(RegistryKind::World)),
            ui: Arc::new(RendererRegistry::new(RegistryKind::Ui)),
            shadow_path,
            main_path,
            ui_path,
            scratch: Vec::new(),
            frame_index: 0,
            frame: FrameState::default(),
        })
    }

    pub fn config(&self) -> &SubmissionConfig {
        &self.config
    }

    /// Adds a drawable to the shadow and main paths.
    pub fn register(&self, drawable: Arc<dyn Renderable<B>>) -> RendererHandle {
        self.world.register(drawable)
    }

    pub fn register_ui(&self, drawable: Arc<dyn Renderable<B>>) -> RendererHandle {
        self.ui.register(drawable)
    }

    /// Removes a drawable from whichever registry issued the handle. Records still
    /// pointing at it stop resolving immediately.
    pub fn unregister(&self, handle: RendererHandle) -> Option<Arc<dyn Renderable<B>>> {
        match handle.kind() {
            RegistryKind::World => self.world.unregister(handle),
            RegistryKind::Ui => self.ui.unregister(handle),
        }
    }

    pub fn world_registry(&self) -> &Arc<RendererRegistry<B>> {
        &self.world
    }

    pub fn ui_registry(&self) -> &Arc<RendererRegistry<B>> {
        &self.ui
    }

    /// Collects, culls and batches every path and writes the instance buffers.
    ///
    /// Calling it again before `end_frame` collects the frame again from scratch.
    pub fn prepare_frame(&mut self, camera: &dyn Camera<B>) {
        self.shadow_path.restart_frame();
        self.main_path.restart_frame();
        self.ui_path.restart_frame();
        self.frame = FrameState::default();

        let world_guard = self.world.lock();
        let world: &RegistrySlots<B> = &world_guard;

        collect_world(
            camera,
            world,
            &mut self.shadow_path,
            &mut self.main_path,
            &mut self.scratch,
            &mut self.frame.errors,
        );

        if !self.shadow_path.is_failed() {
            let (records, mut descriptors) = self.shadow_path.split_for_batching();
            batch_shadow(records, self.config.batch_shadows, &mut descriptors);
            self.frame.shadow.visible = records.len();
        }

        if !self.main_path.is_failed() {
            let frustum = camera.frustum();
            let (records, mut descriptors) = self.main_path.split_for_batching();
            cull_records(
                records,
                world,
                &frustum,
                self.config.parallel_culling_threshold,
            );
            self.frame.main.visible = batch_main(records, &mut descriptors);
        }

        self.frame.shadow.instances_written =
            write_path(&mut self.shadow_path, world, &mut self.frame.errors);
        self.frame.main.instances_written =
            write_path(&mut self.main_path, world, &mut self.frame.errors);

        drop(world_guard);

        let ui_guard = self.ui.lock();
        let ui: &RegistrySlots<B> = &ui_guard;

        collect_ui(camera, ui, &mut self.ui_path, &mut self.frame.errors);

        if !self.ui_path.is_failed() {
            let (records, mut descriptors) = self.ui_path.split_for_batching();
            batch_ui(records, &mut descriptors);
            self.frame.ui.visible = records.len();
        }

        self.frame.ui.instances_written =
            write_path(&mut self.ui_path, ui, &mut self.frame.errors);
    }

    /// Records the frame's passes in order: shadow, depth prepass, main, UI.
    pub fn submit_frame(&mut self, encoder: &mut dyn PassEncoder<B>, camera: &dyn Camera<B>) {
        let world_guard = self.world.lock();
        let world: &RegistrySlots<B> = &world_guard;

        self.frame.shadow.submitted = submit_shadow(encoder, camera, &self.shadow_path, world);
        self.frame.main.submitted = submit_main(encoder, camera, &self.main_path, world);

        drop(world_guard);

        let ui_guard = self.ui.lock();
        self.frame.ui.submitted = submit_ui(encoder, camera, &self.ui_path, &ui_guard);
    }

    /// Reclaims unused slots, rotates the path counters and reports on the frame.
    pub fn end_frame(&mut self) -> FrameReport {
        let frame = std::mem::take(&mut self.frame);

        let stats = FrameStats {
            frame_index: self.frame_index,
            shadow: PathStats::collect(
                &self.shadow_path,
                frame.shadow.visible,
                frame.shadow.instances_written,
                frame.shadow.submitted,
            ),
            main: PathStats::collect(
                &self.main_path,
                frame.main.visible,
                frame.main.instances_written,
                frame.main.submitted,
            ),
            ui: PathStats::collect(
                &self.ui_path,
                frame.ui.visible,
                frame.ui.instances_written,
                frame.ui.submitted,
            ),
        };

        if self.frame_index == 0 {
            log::debug!("{stats}");
        } else {
            log::trace!("{stats}");
        }

        self.shadow_path.end_frame();
        self.main_path.end_frame();
        self.ui_path.end_frame();

        self.frame_index += 1;

        FrameReport {
            stats,
            errors: frame.errors,
        }
    }

    /// Runs every stage of one frame for one camera.
    pub fn run_frame(
        &mut self,
        camera: &dyn Camera<B>,
        encoder: &mut dyn PassEncoder<B>,
    ) -> FrameReport {
        self.prepare_frame(camera);
        self.submit_frame(encoder, camera);
        self.end_frame()
    }

    /// Number of frames completed so far.
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Records waiting in the shadow path. Between `end_frame` and the next
    /// `prepare_frame` this is zero.
    pub fn shadow_record_count(&self) -> usize {
        self.shadow_path.current_count()
    }

    pub fn shadow_path(&self) -> &PathBuffer<SubsetRecord, B::InstanceBuffer> {
        &self.shadow_path
    }

    pub fn main_path(&self) -> &PathBuffer<SubsetRecord, B::InstanceBuffer> {
        &self.main_path
    }

    pub fn ui_path(&self) -> &PathBuffer<UiRecord, B::InstanceBuffer> {
        &self.ui_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    use crate::{
        backend::{
            headless::{HeadlessBackend, HeadlessFrame},
            InstanceBuffer, PassKind,
        },
        submission::{
            config::PathConfig,
            renderable::{render_queue, ShadowCastMode},
            test_support::{payload_ids, TestCamera, TestDrawable, TestSubset},
        },
    };

    fn context(config: SubmissionConfig) -> RenderSubmissionContext<HeadlessBackend> {
        RenderSubmissionContext::new(&HeadlessBackend::new(), config).unwrap()
    }

    fn add(
        context: &RenderSubmissionContext<HeadlessBackend>,
        drawable: TestDrawable,
    ) -> (Arc<TestDrawable>, RendererHandle) {
        let drawable = Arc::new(drawable);
        let handle = context.register(drawable.clone());
        (drawable, handle)
    }

    #[test]
    fn test_two_compatible_opaques_and_a_transparent() {
        let mut context = context(SubmissionConfig::default());
        add(&context, TestDrawable::opaque("a"));
        add(&context, TestDrawable::transparent("glass"));
        add(&context, TestDrawable::opaque("b"));

        context.prepare_frame(&TestCamera::new());

        let descriptors = context.main_path().descriptors();
        assert_eq!(descriptors.len(), 2);
        assert_eq!(descriptors[0].instance_count, 2);
        assert_eq!(descriptors[0].queue, render_queue::GEOMETRY);
        assert_eq!(descriptors[1].instance_count, 1);
        assert_eq!(descriptors[1].queue, render_queue::TRANSPARENT);
    }

    #[test]
    fn test_culled_drawable_keeps_its_record_slot() {
        let mut context = context(SubmissionConfig::default());
        add(&context, TestDrawable::opaque("front"));
        add(&context, TestDrawable::opaque("behind").at(Vec3::new(0.0, 0.0, -10.0)));

        context.prepare_frame(&TestCamera::new());

        let main = context.main_path();
        assert_eq!(main.records().len(), 2);
        assert!(main.records()[0].do_render);
        assert!(!main.records()[1].do_render);
        assert_eq!(main.descriptors().len(), 1);
        assert_eq!(main.descriptors()[0].instances(), 0..1);
    }

    #[test]
    fn test_exempt_drawable_is_never_culled() {
        let mut context = context(SubmissionConfig::default());
        add(
            &context,
            TestDrawable::opaque("sky").at(Vec3::new(0.0, 0.0, -10.0)).unculled(),
        );

        context.prepare_frame(&TestCamera::new());

        assert_eq!(context.main_path().descriptors().len(), 1);
    }

    #[test]
    fn test_growth_from_capacity_two() {
        let config = SubmissionConfig {
            main: PathConfig::new(2, 4),
            ..SubmissionConfig::default()
        };
        let mut context = context(config);

        let subsets = (0..5)
            .map(|subset| TestSubset {
                queue: render_queue::GEOMETRY,
                material_hash: 5 - subset,
                uses_copy_target: false,
            })
            .collect();
        add(&context, TestDrawable::opaque("multi").with_subsets(subsets));

        context.prepare_frame(&TestCamera::new());

        let main = context.main_path();
        assert_eq!(main.capacity(), 6);
        assert_eq!(main.instance_buffer().capacity(), 6);
        assert_eq!(main.instance_buffer().resize_count(), 1);

        let materials: Vec<_> = main.records().iter().map(|r| r.material_hash).collect();
        assert_eq!(materials, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_negative_queue_subsets_are_dropped() {
        let mut context = context(SubmissionConfig::default());
        let subsets = vec![
            TestSubset {
                queue: -1,
                material_hash: 1,
                uses_copy_target: false,
            },
            TestSubset {
                queue: render_queue::GEOMETRY,
                material_hash: 2,
                uses_copy_target: false,
            },
        ];
        add(&context, TestDrawable::opaque("partial").with_subsets(subsets));

        context.prepare_frame(&TestCamera::new());

        assert_eq!(context.main_path().records().len(), 1);
        assert_eq!(context.main_path().records()[0].subset_index, 1);
        assert_eq!(context.shadow_record_count(), 1);
    }

    #[test]
    fn test_filtered_drawables_are_skipped() {
        let mut context = context(SubmissionConfig::default());
        let (inactive, _) = add(&context, TestDrawable::opaque("inactive"));
        inactive.set_active(false);
        add(&context, TestDrawable::opaque("hidden layer").with_layer(3));
        add(&context, TestDrawable::opaque("empty").with_subsets(Vec::new()));

        let camera = TestCamera {
            culling_mask: 1 << 3,
            ..TestCamera::new()
        };
        context.prepare_frame(&camera);

        assert_eq!(context.main_path().records().len(), 0);
        assert_eq!(context.shadow_record_count(), 0);
        assert!(!inactive.is_visible());
    }

    #[test]
    fn test_shadow_cast_modes_route_records() {
        let mut context = context(SubmissionConfig::default());
        let (no_shadow, _) = add(
            &context,
            TestDrawable::opaque("off").with_shadow_cast_mode(ShadowCastMode::Off),
        );
        let (shadow_only, _) = add(
            &context,
            TestDrawable::opaque("caster").with_shadow_cast_mode(ShadowCastMode::ShadowsOnly),
        );

        context.prepare_frame(&TestCamera::new());

        assert_eq!(context.shadow_record_count(), 1);
        assert_eq!(context.main_path().records().len(), 1);
        assert!(shadow_only.is_visible());
        assert!(!no_shadow.is_visible());
        assert_eq!(no_shadow.parameter_updates(), 1);
    }

    #[test]
    fn test_run_frame_draws_every_path_in_order() {
        let mut context = context(SubmissionConfig::default());
        add(&context, TestDrawable::opaque("a"));
        add(&context, TestDrawable::opaque("b"));
        context.register_ui(Arc::new(TestDrawable::ui("label", 0.0, 1, 9)));

        let mut frame = HeadlessFrame::new();
        let report = context.run_frame(&TestCamera::new(), &mut frame);

        let kinds: Vec<_> = frame.passes.iter().map(|pass| pass.kind).collect();
        assert_eq!(
            kinds,
            vec![
                PassKind::Shadow,
                PassKind::DepthPrepass,
                PassKind::Main,
                PassKind::Ui
            ]
        );
        assert!(report.errors.is_empty());
        assert_eq!(report.stats.shadow.draws, 2);
        assert_eq!(report.stats.main.draws, 2);
        assert_eq!(report.stats.main.instanced_descriptors, 1);
        assert_eq!(report.stats.ui.draws, 1);
        assert_eq!(context.frame_index(), 1);
    }

    #[test]
    fn test_instance_payloads_follow_records() {
        let mut context = context(SubmissionConfig::default());
        let (a, _) = add(&context, TestDrawable::opaque("a").with_material(2));
        let (b, _) = add(&context, TestDrawable::opaque("b").with_material(1));
        let (c, _) = add(&context, TestDrawable::opaque("c").with_material(2));

        let mut frame = HeadlessFrame::new();
        context.run_frame(&TestCamera::new(), &mut frame);

        let draws = frame.draws(PassKind::Main);
        let stride = InstanceStrides::default().world as usize;
        assert_eq!(payload_ids(draws[0], stride), vec![b.id]);
        assert_eq!(payload_ids(draws[1], stride), vec![a.id, c.id]);
    }

    #[test]
    fn test_end_frame_reclaims_shrunk_slots() {
        let mut context = context(SubmissionConfig::default());
        let handles: Vec<_> = (0..3)
            .map(|_| add(&context, TestDrawable::opaque("a")).1)
            .collect();

        let mut frame = HeadlessFrame::new();
        context.run_frame(&TestCamera::new(), &mut frame);
        assert_eq!(context.main_path().previous_count(), 3);

        context.unregister(handles[1]);
        context.unregister(handles[2]);
        context.run_frame(&TestCamera::new(), &mut frame);

        let main = context.main_path();
        assert_eq!(main.previous_count(), 1);
        assert_eq!(main.current_count(), 0);
        assert!(main.slots()[0].owner.is_some());
        assert!(main.slots()[1..3].iter().all(|r| r.owner.is_none()));
        assert!(main.descriptor_slots()[1..3].iter().all(|d| d.owner.is_none()));
    }

    #[test]
    fn test_map_failure_aborts_only_that_frame() {
        let backend = HeadlessBackend::new();
        let mut context =
            RenderSubmissionContext::new(&backend, SubmissionConfig::default()).unwrap();
        add(&context, TestDrawable::opaque("a"));

        backend.set_map_failure(true);
        let mut frame = HeadlessFrame::new();
        let report = context.run_frame(&TestCamera::new(), &mut frame);

        assert!(frame.passes.is_empty());
        assert_eq!(report.errors.len(), 2);
        assert!(report.stats.main.failed);

        backend.set_map_failure(false);
        let mut frame = HeadlessFrame::new();
        let report = context.run_frame(&TestCamera::new(), &mut frame);

        assert!(report.errors.is_empty());
        assert_eq!(frame.draws(PassKind::Main).len(), 1);
    }

    #[test]
    fn test_resize_failure_fails_only_that_path() {
        let backend = HeadlessBackend::with_max_elements(2);
        let config = SubmissionConfig {
            shadow: PathConfig::new(2, 2),
            main: PathConfig::new(2, 2),
            ui: PathConfig::new(2, 2),
            ..SubmissionConfig::default()
        };
        let mut context = RenderSubmissionContext::new(&backend, config).unwrap();
        for _ in 0..3 {
            add(
                &context,
                TestDrawable::opaque("caster").with_shadow_cast_mode(ShadowCastMode::ShadowsOnly),
            );
        }
        add(
            &context,
            TestDrawable::opaque("receiver").with_shadow_cast_mode(ShadowCastMode::Off),
        );

        let mut frame = HeadlessFrame::new();
        let report = context.run_frame(&TestCamera::new(), &mut frame);

        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].path(), RenderPath::Shadow);
        assert!(frame.pass(PassKind::Shadow).is_none());
        assert_eq!(frame.draws(PassKind::Main).len(), 1);
    }

    #[test]
    fn test_creation_failure_is_reported() {
        let backend = HeadlessBackend::with_max_elements(16);

        let result = RenderSubmissionContext::new(&backend, SubmissionConfig::default());

        assert!(matches!(
            result,
            Err(SubmissionError::Create {
                path: RenderPath::Shadow,
                ..
            })
        ));
    }

    #[test]
    fn test_ui_requires_texture() {
        let mut context = context(SubmissionConfig::default());
        let untextured = Arc::new(TestDrawable::ui("blank", 0.0, 1, 0));
        let textured = Arc::new(TestDrawable::ui("icon", 0.0, 1, 3));
        context.register_ui(untextured.clone());
        context.register_ui(textured.clone());

        context.prepare_frame(&TestCamera::new());

        assert_eq!(context.ui_path().records().len(), 1);
        assert!(textured.is_visible());
        assert!(!untextured.is_visible());
    }

    #[test]
    fn test_batch_survives_unregistering_its_first_drawable() {
        let mut context = context(SubmissionConfig::default());
        let (a, a_handle) = add(&context, TestDrawable::opaque("a"));
        let (b, _) = add(&context, TestDrawable::opaque("b"));
        let camera = TestCamera::new();

        context.prepare_frame(&camera);
        assert_eq!(context.main_path().descriptors()[0].owner, Some(a_handle));

        context.unregister(a_handle);
        let mut frame = HeadlessFrame::new();
        context.submit_frame(&mut frame, &camera);

        let draws = frame.draws(PassKind::Main);
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].label, "b");
        assert_eq!(draws[0].instance_count, 2);
        let stride = InstanceStrides::default().world as usize;
        assert_eq!(payload_ids(draws[0], stride), vec![a.id, b.id]);
    }

    #[test]
    fn test_preparing_twice_collects_the_frame_again() {
        let config = SubmissionConfig {
            main: PathConfig::new(2, 2),
            ..SubmissionConfig::default()
        };
        let mut context = context(config);
        add(&context, TestDrawable::opaque("a"));
        add(&context, TestDrawable::opaque("b"));
        let camera = TestCamera::new();

        context.prepare_frame(&camera);
        context.prepare_frame(&camera);

        let main = context.main_path();
        assert_eq!(main.records().len(), 2);
        assert_eq!(main.descriptors().len(), 1);
        assert_eq!(main.capacity(), 2);
        assert_eq!(context.shadow_record_count(), 2);

        let mut frame = HeadlessFrame::new();
        context.submit_frame(&mut frame, &camera);
        let report = context.end_frame();

        assert!(report.errors.is_empty());
        assert_eq!(report.stats.main.records, 2);
        assert_eq!(frame.draws(PassKind::Main).len(), 1);
    }

    #[test]
    fn test_failed_shadow_append_leaves_drawable_invisible() {
        let backend = HeadlessBackend::with_max_elements(2);
        let config = SubmissionConfig {
            shadow: PathConfig::new(1, 1),
            main: PathConfig::new(2, 2),
            ui: PathConfig::new(2, 2),
            ..SubmissionConfig::default()
        };
        let mut context = RenderSubmissionContext::new(&backend, config).unwrap();
        let subsets = (0..3)
            .map(|subset| TestSubset {
                queue: render_queue::GEOMETRY,
                material_hash: subset,
                uses_copy_target: false,
            })
            .collect();
        let (caster, _) = add(
            &context,
            TestDrawable::opaque("caster")
                .with_subsets(subsets)
                .with_shadow_cast_mode(ShadowCastMode::ShadowsOnly),
        );

        context.prepare_frame(&TestCamera::new());

        assert!(context.shadow_path().is_failed());
        assert!(!caster.is_visible());
    }

    #[test]
    fn test_refused_pass_draws_nothing_and_others_continue() {
        let mut context = context(SubmissionConfig::default());
        add(&context, TestDrawable::opaque("a"));

        let mut frame = HeadlessFrame {
            disabled_passes: vec![PassKind::DepthPrepass],
            ..HeadlessFrame::new()
        };
        let report = context.run_frame(&TestCamera::new(), &mut frame);

        assert!(frame.pass(PassKind::DepthPrepass).is_none());
        assert_eq!(frame.draws(PassKind::Main).len(), 1);
        assert_eq!(report.stats.main.draws, 1);
    }
}

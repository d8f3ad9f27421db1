//! Headless demo: a field of spinning cubes drawn into an offscreen target.

mod cube;
mod material;
mod mesh;
mod passes;

use std::sync::Arc;

use anyhow::Context;
use glam::{Quat, Vec3, Vec4};
use rand::{rngs::StdRng, Rng, SeedableRng};

use batchforge::{
    backend::wgpu_backend::{SceneCamera, WgpuBackend},
    submission::{RenderSubmissionContext, SubmissionConfig},
};

use cube::{CubeRenderer, Transform};
use material::{Blend, DemoPipelines};
use mesh::GpuMesh;
use passes::{FrameTargets, OffscreenPasses, COLOR_FORMAT};

pub struct DemoOptions {
    pub frames: u32,
    pub opaque_cubes: usize,
    pub transparent_cubes: usize,
    pub seed: u64,
    pub width: u32,
    pub height: u32,
}

impl Default for DemoOptions {
    fn default() -> Self {
        Self {
            frames: 8,
            opaque_cubes: 2000,
            transparent_cubes: 32,
            seed: 7,
            width: 640,
            height: 480,
        }
    }
}

async fn create_backend() -> anyhow::Result<WgpuBackend> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());

    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        })
        .await
        .context("No suitable GPU adapter")?;

    log::info!("Using adapter {}", adapter.get_info().name);

    let (device, queue) = adapter
        .request_device(&wgpu::DeviceDescriptor {
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            label: None,
            memory_hints: Default::default(),
            trace: wgpu::Trace::Off,
        })
        .await
        .context("Failed to create device")?;

    Ok(WgpuBackend::new(device, queue))
}

pub async fn run(config: SubmissionConfig, options: DemoOptions) -> anyhow::Result<()> {
    let backend = create_backend().await?;
    let device = backend.device();

    let mut submission = RenderSubmissionContext::new(&backend, config)
        .context("Failed to create the submission context")?;

    let pipelines = Arc::new(DemoPipelines::new(&backend, COLOR_FORMAT));
    let cube_mesh = Arc::new(GpuMesh::cube(device, 1));

    let materials = [
        (Vec4::new(0.9, 0.3, 0.2, 1.0), Blend::Opaque),
        (Vec4::new(0.2, 0.6, 0.9, 1.0), Blend::Opaque),
        (Vec4::new(0.9, 0.9, 0.9, 0.35), Blend::Transparent),
    ]
    .into_iter()
    .enumerate()
    .map(|(index, (color, blend))| {
        Arc::new(pipelines.create_material(device, index as u32 + 1, color, blend))
    })
    .collect::<Vec<_>>();

    let mut rng = StdRng::seed_from_u64(options.seed);
    let mut spawn = |material: usize| {
        let transform = Transform {
            translation: Vec3::new(
                rng.gen_range(-40.0..40.0),
                rng.gen_range(-20.0..20.0),
                rng.gen_range(5.0..120.0),
            ),
            rotation: Quat::from_rotation_y(rng.gen_range(0.0..std::f32::consts::TAU)),
            scale: rng.gen_range(0.5..2.0),
        };

        Arc::new(CubeRenderer::new(
            cube_mesh.clone(),
            materials[material].clone(),
            pipelines.clone(),
            transform,
        ))
    };

    let mut cubes = Vec::with_capacity(options.opaque_cubes + options.transparent_cubes);
    for index in 0..options.opaque_cubes {
        cubes.push(spawn(index % 2));
    }
    for _ in 0..options.transparent_cubes {
        cubes.push(spawn(2));
    }

    let mut handles: Vec<_> = cubes
        .iter()
        .map(|cube| submission.register(cube.clone()))
        .collect();

    log::info!("Registered {} cubes", handles.len());

    let targets = FrameTargets::new(device, options.width, options.height);
    let camera = SceneCamera::new(
        &backend,
        Vec3::new(0.0, 5.0, -20.0),
        Vec3::new(0.0, 0.0, 40.0),
        options.width,
        options.height,
    );

    for frame in 0..options.frames {
        // Halfway through, drop a third of the scene to exercise slot reclaiming.
        if frame == options.frames / 2 {
            let keep = cubes.len() * 2 / 3;
            for handle in handles.drain(keep..) {
                submission.unregister(handle);
            }
            cubes.truncate(keep);
        }

        let angle = frame as f32 * 0.2;
        for cube in &cubes {
            cube.set_rotation(Quat::from_rotation_y(angle));
        }

        camera.update(backend.queue());

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Frame encoder"),
        });

        let report = {
            let mut passes = OffscreenPasses::new(&mut encoder, &targets);
            submission.run_frame(&camera, &mut passes)
        };

        backend.queue().submit(std::iter::once(encoder.finish()));

        for error in &report.errors {
            log::warn!("Frame {frame}: {:#}", anyhow::Error::new(error.clone()));
        }

        let visible = cubes.iter().filter(|cube| cube.is_visible()).count();
        log::info!("{} ({visible} cubes marked visible)", report.stats);
    }

    device
        .poll(wgpu::PollType::Wait)
        .context("Failed to wait for the GPU")?;

    Ok(())
}

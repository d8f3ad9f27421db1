use batchforge::backend::{
    wgpu_backend::{DepthTexture, WgpuBackend},
    PassEncoder, PassKind,
};

pub const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.02,
    g: 0.02,
    b: 0.04,
    a: 1.0,
};

/// Offscreen colour and depth targets plus a shadow map of the same size.
pub struct FrameTargets {
    _color: wgpu::Texture,
    color_view: wgpu::TextureView,
    depth: DepthTexture,
    shadow_map: DepthTexture,
}

impl FrameTargets {
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let color = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Offscreen colour target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: COLOR_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let color_view = color.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            _color: color,
            color_view,
            depth: DepthTexture::new(device, width, height, "Scene depth"),
            shadow_map: DepthTexture::new(device, width, height, "Shadow map"),
        }
    }
}

/// Opens the frame's passes on one command encoder.
///
/// The main pass clears colour, and clears depth unless the depth prepass already
/// did. The UI pass draws on top without depth.
pub struct OffscreenPasses<'a> {
    encoder: &'a mut wgpu::CommandEncoder,
    targets: &'a FrameTargets,
    depth_written: bool,
    color_written: bool,
}

impl<'a> OffscreenPasses<'a> {
    pub fn new(encoder: &'a mut wgpu::CommandEncoder, targets: &'a FrameTargets) -> Self {
        Self {
            encoder,
            targets,
            depth_written: false,
            color_written: false,
        }
    }
}

fn load_or_clear<T>(written: bool, clear: T) -> wgpu::LoadOp<T> {
    if written {
        wgpu::LoadOp::Load
    } else {
        wgpu::LoadOp::Clear(clear)
    }
}

impl PassEncoder<WgpuBackend> for OffscreenPasses<'_> {
    fn begin_pass(&mut self, pass: PassKind) -> Option<wgpu::RenderPass<'static>> {
        let targets = self.targets;

        let (label, color, depth) = match pass {
            PassKind::Shadow => (
                "Shadow pass",
                None,
                Some((targets.shadow_map.view(), wgpu::LoadOp::Clear(1.0))),
            ),
            PassKind::DepthPrepass => (
                "Depth prepass",
                None,
                Some((targets.depth.view(), wgpu::LoadOp::Clear(1.0))),
            ),
            PassKind::Main => (
                "Main pass",
                Some(load_or_clear(self.color_written, CLEAR_COLOR)),
                Some((targets.depth.view(), load_or_clear(self.depth_written, 1.0))),
            ),
            PassKind::Ui => (
                "UI pass",
                Some(load_or_clear(self.color_written, CLEAR_COLOR)),
                None,
            ),
        };

        let color_attachments: Vec<_> = color
            .into_iter()
            .map(|load| {
                Some(wgpu::RenderPassColorAttachment {
                    view: &targets.color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                })
            })
            .collect();

        let depth_stencil_attachment =
            depth.map(|(view, load)| wgpu::RenderPassDepthStencilAttachment {
                view,
                depth_ops: Some(wgpu::Operations {
                    load,
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            });

        match pass {
            PassKind::DepthPrepass => self.depth_written = true,
            PassKind::Main => {
                self.depth_written = true;
                self.color_written = true;
            }
            PassKind::Ui => self.color_written = true,
            PassKind::Shadow => {}
        }

        let render_pass = self
            .encoder
            .begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some(label),
                color_attachments: &color_attachments,
                depth_stencil_attachment,
                occlusion_query_set: None,
                timestamp_writes: None,
            })
            .forget_lifetime();

        Some(render_pass)
    }

    fn end_pass(&mut self, _pass: PassKind, context: wgpu::RenderPass<'static>) {
        drop(context);
    }
}

//! Surface + device setup shared by the native window and the web canvas.

use crate::renderer::{FrameParams, TreeRenderer};
use tree_core::{ParticleMorphEngine, Session};

pub struct GpuContext<'w> {
    surface: wgpu::Surface<'w>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: TreeRenderer,
}

impl<'w> GpuContext<'w> {
    /// Finish setup for an already created `surface` of `width x height`.
    /// `capacity` is the initial `(points, bodies)` instance buffer size; see
    /// [`instance_capacity`].
    pub async fn new(
        instance: &wgpu::Instance,
        surface: wgpu::Surface<'w>,
        width: u32,
        height: u32,
        capacity: (usize, usize),
    ) -> anyhow::Result<Self> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No GPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    // default limits keep older WebGPU implementations happy
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await
            .map_err(|e| anyhow::anyhow!("request_device error: {:?}", e))?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| {
                matches!(
                    f,
                    wgpu::TextureFormat::Bgra8UnormSrgb | wgpu::TextureFormat::Rgba8UnormSrgb
                )
            })
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| anyhow::anyhow!("surface reports no texture formats"))?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        log::info!(
            "[render] surface {}x{} {:?}",
            config.width,
            config.height,
            format
        );

        let renderer = TreeRenderer::new(
            &device,
            format,
            (config.width, config.height),
            capacity.0,
            capacity.1,
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            renderer,
        })
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    #[inline]
    pub fn aspect(&self) -> f32 {
        self.config.width as f32 / self.config.height.max(1) as f32
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.renderer.resize(&self.device, width, height);
    }

    /// Reconfigure with the current size, e.g. after `SurfaceError::Lost`.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    /// Upload the session's current buffers and present one frame.
    pub fn render(&mut self, session: &Session, elapsed: f32) -> Result<(), wgpu::SurfaceError> {
        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let engine = session.engine();
        self.renderer.prepare(
            &self.device,
            &self.queue,
            session.camera(),
            FrameParams::for_engine(engine, elapsed),
            engine.point_instances(),
            engine.body_instances(),
        );

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });
        self.renderer.encode(&mut encoder, &view);
        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}

/// `(points, bodies)` buffer sizes for the engine's current ensemble.
#[inline]
pub fn instance_capacity(engine: &ParticleMorphEngine) -> (usize, usize) {
    (engine.point_count(), engine.body_instances().len())
}

use glam::Quat;
use tree_core::{BodyInstance, Camera, ParticleMorphEngine, PointInstance};
use wgpu::util::DeviceExt;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    camera_right: [f32; 4],
    camera_up: [f32; 4],
    params: [f32; 4],
    // quaternion xyzw
    star_rotation: [f32; 4],
}

/// Per-frame inputs that are not part of the instance buffers.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameParams {
    pub elapsed: f32,
    pub chaos_level: f32,
    pub star_orientation: Quat,
}

impl FrameParams {
    pub fn for_engine(engine: &ParticleMorphEngine, elapsed: f32) -> Self {
        Self {
            elapsed,
            chaos_level: engine.chaos_level(),
            star_orientation: engine.star().orientation(),
        }
    }
}

/// Draws the morph engine's instance buffers. Owns no surface; the caller
/// supplies the target view and encoder.
pub struct TreeRenderer {
    point_pipeline: wgpu::RenderPipeline,
    body_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    depth_view: wgpu::TextureView,
    quad_vb: wgpu::Buffer,
    point_vb: wgpu::Buffer,
    body_vb: wgpu::Buffer,
    point_capacity: usize,
    body_capacity: usize,
    point_count: u32,
    body_count: u32,
    pub clear_color: wgpu::Color,
}

impl TreeRenderer {
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        (width, height): (u32, u32),
        point_capacity: usize,
        body_capacity: usize,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("tree_shader"),
            source: wgpu::ShaderSource::Wgsl(crate::TREE_WGSL.into()),
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("uniforms"),
            size: std::mem::size_of::<Uniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        // Quad vertices for two triangles
        let quad_vertices: [f32; 12] = [
            -0.5, -0.5, 0.5, -0.5, 0.5, 0.5, -0.5, -0.5, 0.5, 0.5, -0.5, 0.5,
        ];
        let quad_vb = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad_vb"),
            contents: bytemuck::cast_slice(&quad_vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let point_capacity = point_capacity.max(1);
        let body_capacity = body_capacity.max(1);
        let point_vb = instance_buffer::<PointInstance>(device, "point_vb", point_capacity);
        let body_vb = instance_buffer::<BodyInstance>(device, "body_vb", body_capacity);

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("bg"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pl"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        // bodies are opaque and fill the depth buffer; points glow additively
        // and are hidden behind bodies without occluding each other
        let additive = wgpu::BlendState {
            color: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::One,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
            alpha: wgpu::BlendComponent::OVER,
        };
        let point_pipeline = make_instanced_pipeline(
            device,
            &pipeline_layout,
            &shader,
            "fs_point",
            format,
            Some(additive),
            false,
        );
        let body_pipeline = make_instanced_pipeline(
            device,
            &pipeline_layout,
            &shader,
            "fs_body",
            format,
            Some(wgpu::BlendState::REPLACE),
            true,
        );
        let depth_view = depth_texture(device, width, height);

        Self {
            point_pipeline,
            body_pipeline,
            uniform_buffer,
            bind_group,
            depth_view,
            quad_vb,
            point_vb,
            body_vb,
            point_capacity,
            body_capacity,
            point_count: 0,
            body_count: 0,
            clear_color: wgpu::Color {
                r: 0.0,
                g: 0.01,
                b: 0.02,
                a: 1.0,
            },
        }
    }

    /// Recreate the depth buffer to match a resized target.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_view = depth_texture(device, width, height);
    }

    /// Upload camera uniforms and both instance buffers, growing the GPU
    /// buffers if the ensemble got larger (e.g. after a reseed with new counts).
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        camera: &Camera,
        params: FrameParams,
        points: &[PointInstance],
        bodies: &[BodyInstance],
    ) {
        let view = camera.view_matrix();
        let uniforms = Uniforms {
            view_proj: camera.view_proj().to_cols_array_2d(),
            camera_right: view.row(0).to_array(),
            camera_up: view.row(1).to_array(),
            params: [params.elapsed, params.chaos_level, 0.0, 0.0],
            star_rotation: params.star_orientation.to_array(),
        };
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        if points.len() > self.point_capacity {
            self.point_capacity = points.len().next_power_of_two();
            log::info!("[render] point buffer grown to {}", self.point_capacity);
            self.point_vb = instance_buffer::<PointInstance>(device, "point_vb", self.point_capacity);
        }
        if bodies.len() > self.body_capacity {
            self.body_capacity = bodies.len().next_power_of_two();
            self.body_vb = instance_buffer::<BodyInstance>(device, "body_vb", self.body_capacity);
        }
        if !points.is_empty() {
            queue.write_buffer(&self.point_vb, 0, bytemuck::cast_slice(points));
        }
        if !bodies.is_empty() {
            queue.write_buffer(&self.body_vb, 0, bytemuck::cast_slice(bodies));
        }
        self.point_count = points.len() as u32;
        self.body_count = bodies.len() as u32;
    }

    /// Clear `target` and draw bodies, then points.
    pub fn encode(&self, encoder: &mut wgpu::CommandEncoder, target: &wgpu::TextureView) {
        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("tree_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Discard,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        rpass.set_bind_group(0, &self.bind_group, &[]);
        rpass.set_vertex_buffer(0, self.quad_vb.slice(..));

        if self.body_count > 0 {
            rpass.set_pipeline(&self.body_pipeline);
            rpass.set_vertex_buffer(1, self.body_vb.slice(..));
            rpass.draw(0..6, 0..self.body_count);
        }
        if self.point_count > 0 {
            rpass.set_pipeline(&self.point_pipeline);
            rpass.set_vertex_buffer(1, self.point_vb.slice(..));
            rpass.draw(0..6, 0..self.point_count);
        }
    }
}

fn depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

fn instance_buffer<T>(device: &wgpu::Device, label: &str, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: (std::mem::size_of::<T>() * capacity) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

// PointInstance and BodyInstance share one 32-byte layout:
// position (12) | size or scale (4) | color (12) | light or emissive (4)
const INSTANCE_ATTRIBUTES: [wgpu::VertexAttribute; 4] = [
    wgpu::VertexAttribute {
        format: wgpu::VertexFormat::Float32x3,
        offset: 0,
        shader_location: 1,
    },
    wgpu::VertexAttribute {
        format: wgpu::VertexFormat::Float32,
        offset: 12,
        shader_location: 2,
    },
    wgpu::VertexAttribute {
        format: wgpu::VertexFormat::Float32x3,
        offset: 16,
        shader_location: 3,
    },
    wgpu::VertexAttribute {
        format: wgpu::VertexFormat::Float32,
        offset: 28,
        shader_location: 4,
    },
];

fn make_instanced_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    frag_entry: &str,
    color_format: wgpu::TextureFormat,
    blend: Option<wgpu::BlendState>,
    depth_write: bool,
) -> wgpu::RenderPipeline {
    let vertex_buffers = [
        // slot 0: quad corners
        wgpu::VertexBufferLayout {
            array_stride: (std::mem::size_of::<f32>() * 2) as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x2,
                offset: 0,
                shader_location: 0,
            }],
        },
        // slot 1: instance data
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<PointInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &INSTANCE_ATTRIBUTES,
        },
    ];
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(frag_entry),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &vertex_buffers,
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: depth_write,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(frag_entry),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        cache: None,
        multiview: None,
    })
}

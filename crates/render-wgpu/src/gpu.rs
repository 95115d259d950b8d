use crate::RenderError;
use crate::shaders::TEXTURE_GROUP_BASE;
use crate::texture::HeightmapTexture;
use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use heightfield_mesh::{GridMesh, MeshSummary};
use heightfield_render::TerrainView;
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    model: [[f32; 4]; 4],
    view: [[f32; 4]; 4],
    projection: [[f32; 4]; 4],
    scale: f32,
    // WGSL rounds the struct up to a 16-byte multiple.
    _padding: [f32; 3],
}

impl Uniforms {
    fn new(view: &TerrainView, grid_width: u32, scale: f32) -> Self {
        Self {
            model: view.model(grid_width).to_cols_array_2d(),
            view: view.view().to_cols_array_2d(),
            projection: view.projection().to_cols_array_2d(),
            scale,
            _padding: [0.0; 3],
        }
    }
}

/// Check every mesh buffer against the device's `max_buffer_size` and
/// return the index count as the `u32` the draw call takes.
fn check_mesh_limits(summary: &MeshSummary, max_buffer_size: u64) -> Result<u32, RenderError> {
    let buffers = [
        ("position", summary.position_bytes),
        ("texcoord", summary.texcoord_bytes),
        ("index", summary.index_bytes),
    ];
    for (buffer, bytes) in buffers {
        let bytes = bytes as u64;
        if bytes > max_buffer_size {
            return Err(RenderError::MeshTooLarge {
                width: summary.width,
                height: summary.height,
                buffer,
                bytes,
                limit: max_buffer_size,
            });
        }
    }
    u32::try_from(summary.index_count).map_err(|_| RenderError::MeshTooLarge {
        width: summary.width,
        height: summary.height,
        buffer: "index",
        bytes: summary.index_bytes as u64,
        limit: max_buffer_size,
    })
}

/// wgpu-based terrain renderer.
///
/// Owns the uploaded grid buffers and heightmap; each frame only rewrites
/// the uniform buffer.
pub struct TerrainRenderer {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    heightmap: HeightmapTexture,
    heightmap_bind_group: wgpu::BindGroup,
    position_buffer: wgpu::Buffer,
    texcoord_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    grid_width: u32,
    depth_texture: wgpu::TextureView,
    surface_format: wgpu::TextureFormat,
}

impl TerrainRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        mesh: &GridMesh,
        heightmap: HeightmapTexture,
        shader_source: &str,
    ) -> Result<Self, RenderError> {
        if mesh.is_empty() {
            return Err(RenderError::EmptyMesh);
        }
        if heightmap.bind_group_index() != TEXTURE_GROUP_BASE {
            return Err(RenderError::UnsupportedTextureUnit(heightmap.unit().index()));
        }
        let index_count = check_mesh_limits(&mesh.summary(), device.limits().max_buffer_size)?;

        // Uniform buffer
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("terrain_uniform_buffer"),
            contents: bytemuck::bytes_of(&Uniforms {
                model: Mat4::IDENTITY.to_cols_array_2d(),
                view: Mat4::IDENTITY.to_cols_array_2d(),
                projection: Mat4::IDENTITY.to_cols_array_2d(),
                scale: 0.0,
                _padding: [0.0; 3],
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("terrain_uniform_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("terrain_uniform_bind_group"),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let heightmap_layout = HeightmapTexture::bind_group_layout(device);
        let heightmap_bind_group = heightmap.create_bind_group(device, &heightmap_layout);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("terrain_pipeline_layout"),
            bind_group_layouts: &[&uniform_layout, &heightmap_layout],
            push_constant_ranges: &[],
        });

        // Validation failures inside this scope come back as errors instead
        // of reaching the device's uncaptured error handler.
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("terrain_shader"),
            source: wgpu::ShaderSource::Wgsl(shader_source.into()),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("terrain_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: (3 * std::mem::size_of::<f32>()) as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![0 => Float32x3],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: (2 * std::mem::size_of::<f32>()) as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![1 => Float32x2],
                    },
                ],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(RenderError::Shader(err.to_string()));
        }

        // Grid mesh
        let position_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("terrain_position_buffer"),
            contents: bytemuck::cast_slice(mesh.positions()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let texcoord_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("terrain_texcoord_buffer"),
            contents: bytemuck::cast_slice(mesh.texcoords()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("terrain_index_buffer"),
            contents: bytemuck::cast_slice(mesh.indices()),
            usage: wgpu::BufferUsages::INDEX,
        });

        tracing::info!(
            "terrain uploaded: {}x{} grid, {} vertices, {} indices",
            mesh.width(),
            mesh.height(),
            mesh.vertex_count(),
            index_count
        );

        let depth_texture = Self::create_depth_texture(device, width, height);

        Ok(Self {
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            heightmap,
            heightmap_bind_group,
            position_buffer,
            texcoord_buffer,
            index_buffer,
            index_count,
            grid_width: mesh.width(),
            depth_texture,
            surface_format,
        })
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn heightmap(&self) -> &HeightmapTexture {
        &self.heightmap
    }

    /// Render one frame of the displaced terrain into `target`.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target: &wgpu::TextureView,
        view: &TerrainView,
        scale: f32,
        clear_color: wgpu::Color,
    ) {
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&Uniforms::new(view, self.grid_width, scale)),
        );

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("terrain_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("terrain_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            pass.set_bind_group(
                self.heightmap.bind_group_index(),
                &self.heightmap_bind_group,
                &[],
            );
            pass.set_vertex_buffer(0, self.position_buffer.slice(..));
            pass.set_vertex_buffer(1, self.texcoord_buffer.slice(..));
            pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..self.index_count, 0, 0..1);
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("terrain_depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

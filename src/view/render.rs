use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::config::AssetSettings;
use crate::controller::{CameraUniform, FrameOutput};
use crate::model::{LightUniform, Material, MaterialUniform, TextureSlot};
use crate::utils::{Mesh, MeshBuffer, Vertex};
use crate::view::texture::{self, GpuTexture};
use crate::view::GpuContext;

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

pub const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.2,
    g: 0.3,
    b: 0.4,
    a: 1.0,
};

/// Per-object transforms as laid out in the scene shader.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 4],
}

impl ObjectUniform {
    pub fn new(model: Mat4) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            normal: model.inverse().transpose().to_cols_array_2d(),
        }
    }
}

/// Textures indexed by [`TextureSlot`]: diffuse, specular, emission.
struct TextureTable {
    slots: Vec<Option<GpuTexture>>,
    white: GpuTexture,
    black: GpuTexture,
}

impl TextureTable {
    fn load(device: &wgpu::Device, queue: &wgpu::Queue, assets: &AssetSettings) -> Self {
        let diffuse = texture::load_rgba(&assets.diffuse_map);
        let specular = texture::load_rgba(&assets.specular_map);
        let emission = assets.emission_map.as_deref().map(texture::load_rgba);
        Self {
            slots: vec![
                Some(GpuTexture::from_image(device, queue, &diffuse, "diffuse_map", true)),
                Some(GpuTexture::from_image(device, queue, &specular, "specular_map", false)),
                emission.map(|img| GpuTexture::from_image(device, queue, &img, "emission_map", true)),
            ],
            white: GpuTexture::from_image(device, queue, &texture::solid([255; 4]), "white", false),
            black: GpuTexture::from_image(device, queue, &texture::solid([0, 0, 0, 255]), "black", false),
        }
    }

    fn view_or<'a>(&'a self, slot: Option<&TextureSlot>, fallback: &'a GpuTexture) -> &'a wgpu::TextureView {
        slot.and_then(|s| self.slots.get(s.0 as usize))
            .and_then(Option::as_ref)
            .map_or(&fallback.view, |t| &t.view)
    }
}

pub struct Renderer {
    pipeline: wgpu::RenderPipeline,
    camera_buffer: wgpu::Buffer,
    light_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    material_bind_groups: Vec<wgpu::BindGroup>,
    object_buffers: Vec<wgpu::Buffer>,
    object_bind_groups: Vec<wgpu::BindGroup>,
    cube: MeshBuffer,
    _depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,
}

impl Renderer {
    pub fn new(
        gpu: &GpuContext,
        mesh: &Mesh,
        materials: &[Material],
        assets: &AssetSettings,
        object_count: usize,
    ) -> Self {
        let device = gpu.device.as_ref();
        let queue = gpu.queue.as_ref();

        let camera_buffer = uniform_buffer(device, "camera_buffer", std::mem::size_of::<CameraUniform>());
        let light_buffer = uniform_buffer(device, "light_buffer", std::mem::size_of::<LightUniform>());

        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("frame_bind_group_layout"),
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT),
                uniform_entry(1, wgpu::ShaderStages::FRAGMENT),
            ],
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame_bind_group"),
            layout: &frame_layout,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: camera_buffer.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 1, resource: light_buffer.as_entire_binding() },
            ],
        });

        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("material_bind_group_layout"),
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::FRAGMENT),
                texture_entry(1),
                texture_entry(2),
                texture_entry(3),
                wgpu::BindGroupLayoutEntry {
                    binding: 4,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("map_sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let textures = TextureTable::load(device, queue, assets);
        let material_bind_groups = materials
            .iter()
            .map(|material| {
                let binding = material.binding();
                let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(material.name()),
                    contents: bytemuck::bytes_of::<MaterialUniform>(&binding.uniform),
                    usage: wgpu::BufferUsages::UNIFORM,
                });
                let diffuse = textures.view_or(binding.textures.first(), &textures.white);
                let specular = textures.view_or(binding.textures.get(1), &textures.white);
                let emission = textures.view_or(binding.textures.get(2), &textures.black);
                device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("material_bind_group"),
                    layout: &material_layout,
                    entries: &[
                        wgpu::BindGroupEntry { binding: 0, resource: buffer.as_entire_binding() },
                        wgpu::BindGroupEntry { binding: 1, resource: wgpu::BindingResource::TextureView(diffuse) },
                        wgpu::BindGroupEntry { binding: 2, resource: wgpu::BindingResource::TextureView(specular) },
                        wgpu::BindGroupEntry { binding: 3, resource: wgpu::BindingResource::TextureView(emission) },
                        wgpu::BindGroupEntry { binding: 4, resource: wgpu::BindingResource::Sampler(&sampler) },
                    ],
                })
            })
            .collect();

        let object_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("object_bind_group_layout"),
            entries: &[uniform_entry(0, wgpu::ShaderStages::VERTEX)],
        });
        let object_buffers: Vec<wgpu::Buffer> = (0..object_count)
            .map(|_| uniform_buffer(device, "object_buffer", std::mem::size_of::<ObjectUniform>()))
            .collect();
        let object_bind_groups = object_buffers
            .iter()
            .map(|buffer| {
                device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("object_bind_group"),
                    layout: &object_layout,
                    entries: &[wgpu::BindGroupEntry { binding: 0, resource: buffer.as_entire_binding() }],
                })
            })
            .collect();

        let pipeline = create_scene_pipeline(
            device,
            gpu.format,
            &[&frame_layout, &material_layout, &object_layout],
        );
        let (depth_texture, depth_view) =
            texture::create_depth_texture(device, gpu.config.width, gpu.config.height);

        tracing::info!(materials = materials.len(), objects = object_count, "renderer ready");

        Self {
            pipeline,
            camera_buffer,
            light_buffer,
            frame_bind_group,
            material_bind_groups,
            object_buffers,
            object_bind_groups,
            cube: mesh.upload(device),
            _depth_texture: depth_texture,
            depth_view,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        let (depth_texture, depth_view) = texture::create_depth_texture(device, width, height);
        self._depth_texture = depth_texture;
        self.depth_view = depth_view;
    }

    pub fn depth_view(&self) -> &wgpu::TextureView {
        &self.depth_view
    }

    /// Upload this frame's camera, light and object transforms.
    pub fn write_frame(&self, queue: &wgpu::Queue, frame: &FrameOutput) {
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(&frame.camera));
        queue.write_buffer(&self.light_buffer, 0, bytemuck::bytes_of(&frame.light));
        for (buffer, model) in self.object_buffers.iter().zip(&frame.model_matrices) {
            queue.write_buffer(buffer, 0, bytemuck::bytes_of(&ObjectUniform::new(*model)));
        }
    }

    /// Draw every object with one material.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, material_index: usize) {
        let Some(material) = self.material_bind_groups.get(material_index) else {
            return;
        };
        if self.cube.vertex_count == 0 {
            return;
        }
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.frame_bind_group, &[]);
        pass.set_bind_group(1, material, &[]);
        pass.set_vertex_buffer(0, self.cube.vertex_buffer.slice(..));
        for object in &self.object_bind_groups {
            pass.set_bind_group(2, object, &[]);
            pass.draw(0..self.cube.vertex_count, 0..1);
        }
    }
}

fn uniform_buffer(device: &wgpu::Device, label: &str, size: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: size as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

fn create_scene_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    bind_group_layouts: &[&wgpu::BindGroupLayout],
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("scene_shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shaders/scene.wgsl").into()),
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("scene_pipeline_layout"),
        bind_group_layouts,
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("scene_pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[Vertex::layout()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: Some(wgpu::Face::Back),
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn object_uniform_carries_normal_matrix() {
        let model = Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0));
        let u = ObjectUniform::new(model);
        assert_eq!(u.model, model.to_cols_array_2d());
        assert!((u.normal[0][0] - 0.5).abs() < 1e-6);
        assert_eq!(std::mem::size_of::<ObjectUniform>(), 128);
    }
}

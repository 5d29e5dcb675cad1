use bytemuck::{Pod, Zeroable};
use folio_render::{FrameView, Prop, Renderer};
use glam::{Mat4, Vec2, Vec3};
use wgpu::util::DeviceExt;

use crate::shaders;

const MAX_INSTANCES: u32 = 8_192;
const NEAR: f32 = 0.1;
const FAR: f32 = 500.0;
/// Props farther than this from the eye are drawn in the sky color.
const FOG_DISTANCE: f32 = 140.0;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    eye: [f32; 4],
    sky: [f32; 4],
}

impl Uniforms {
    fn for_frame(frame: &FrameView, view_proj: Mat4) -> Self {
        let [r, g, b] = frame.sky;
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            eye: frame.camera.eye.extend(FOG_DISTANCE).to_array(),
            sky: [r, g, b, frame.fade.clamp(0.0, 1.0)],
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Instance {
    offset_yaw: [f32; 4],
    scale_emissive: [f32; 4],
    color: [f32; 3],
}

impl Instance {
    fn from_prop(prop: &Prop) -> Self {
        Self {
            offset_yaw: prop.position.extend(prop.yaw).to_array(),
            scale_emissive: prop.scale.extend(prop.emissive).to_array(),
            color: prop.color,
        }
    }
}

/// Unit cube centered on the origin, one quad per face.
fn cube_mesh() -> (Vec<Vertex>, Vec<u16>) {
    const FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        // normal, u axis, v axis
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    ];
    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (normal, u, v) in FACES {
        let (n, u, v) = (Vec3::from(normal), Vec3::from(u), Vec3::from(v));
        let base = vertices.len() as u16;
        for (su, sv) in [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)] {
            vertices.push(Vertex {
                position: (n * 0.5 + u * su + v * sv).to_array(),
                normal,
            });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }
    (vertices, indices)
}

fn view_projection(frame: &FrameView, aspect: f32) -> Mat4 {
    let view = Mat4::look_at_rh(frame.camera.eye, frame.camera.target, Vec3::Y);
    let proj = Mat4::perspective_rh(frame.fov_degrees.to_radians(), aspect, NEAR, FAR);
    proj * view
}

/// Screen position (pixels, origin top-left) of `world` for a label, or
/// `None` when it is behind the camera or off screen.
pub fn project_to_screen(view_proj: Mat4, world: Vec3, width: u32, height: u32) -> Option<Vec2> {
    let clip = view_proj * world.extend(1.0);
    if clip.w <= 0.0 {
        return None;
    }
    let ndc = clip.truncate() / clip.w;
    if ndc.x.abs() > 1.0 || ndc.y.abs() > 1.0 {
        return None;
    }
    Some(Vec2::new(
        (ndc.x + 1.0) * 0.5 * width as f32,
        (1.0 - ndc.y) * 0.5 * height as f32,
    ))
}

/// GPU state for drawing frames onto a surface.
pub struct WgpuRenderer {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    cube_vertex_buffer: wgpu::Buffer,
    cube_index_buffer: wgpu::Buffer,
    cube_index_count: u32,
    instance_buffer: wgpu::Buffer,
    depth_texture: wgpu::TextureView,
    surface_format: wgpu::TextureFormat,
    width: u32,
    height: u32,
}

impl WgpuRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("frame_uniforms"),
            contents: bytemuck::bytes_of(&Uniforms::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("frame_uniforms_layout"),
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

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame_uniforms_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("prop_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("prop_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::PROP_SHADER.into()),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("prop_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<Vertex>() as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<Instance>() as u64,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &wgpu::vertex_attr_array![
                            2 => Float32x4,
                            3 => Float32x4,
                            4 => Float32x3,
                        ],
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
                cull_mode: Some(wgpu::Face::Back),
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

        let (cube_verts, cube_indices) = cube_mesh();
        let cube_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cube_vertices"),
            contents: bytemuck::cast_slice(&cube_verts),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let cube_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cube_indices"),
            contents: bytemuck::cast_slice(&cube_indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("prop_instances"),
            size: MAX_INSTANCES as u64 * std::mem::size_of::<Instance>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            cube_vertex_buffer,
            cube_index_buffer,
            cube_index_count: cube_indices.len() as u32,
            instance_buffer,
            depth_texture: Self::create_depth_texture(device, width, height),
            surface_format,
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// The matrix a frame will be drawn with, for placing labels.
    pub fn view_projection(&self, frame: &FrameView) -> Mat4 {
        view_projection(frame, self.aspect())
    }

    /// Draw `frame` into `view`. Returns the number of props drawn.
    pub fn draw(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        frame: &FrameView,
    ) -> usize {
        let fade = frame.fade.clamp(0.0, 1.0);
        let uniforms = Uniforms::for_frame(frame, self.view_projection(frame));
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        if frame.props.len() > MAX_INSTANCES as usize {
            tracing::warn!(
                props = frame.props.len(),
                max = MAX_INSTANCES,
                "frame exceeds instance capacity, truncating"
            );
        }
        let instances: Vec<Instance> = frame
            .props
            .iter()
            .take(MAX_INSTANCES as usize)
            .map(Instance::from_prop)
            .collect();
        if !instances.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));
        }

        let sky = frame.sky.map(|c| f64::from(c * (1.0 - fade)));
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("frame_encoder"),
        });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("world_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: sky[0],
                            g: sky[1],
                            b: sky[2],
                            a: 1.0,
                        }),
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

            if !instances.is_empty() {
                pass.set_pipeline(&self.pipeline);
                pass.set_bind_group(0, &self.uniform_bind_group, &[]);
                pass.set_vertex_buffer(0, self.cube_vertex_buffer.slice(..));
                pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
                pass.set_index_buffer(self.cube_index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                pass.draw_indexed(0..self.cube_index_count, 0, 0..instances.len() as u32);
            }
        }
        queue.submit(std::iter::once(encoder.finish()));
        instances.len()
    }

    fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
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

/// One surface texture's worth of GPU context, usable as a [`Renderer`].
pub struct WgpuFrame<'a> {
    pub renderer: &'a WgpuRenderer,
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub target: &'a wgpu::TextureView,
}

impl Renderer for WgpuFrame<'_> {
    type Output = usize;

    fn render(&self, frame: &FrameView) -> usize {
        self.renderer
            .draw(self.device, self.queue, self.target, frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_common::SceneKey;
    use folio_render::CameraPose;

    #[test]
    fn cube_mesh_faces_point_outward() {
        let (vertices, indices) = cube_mesh();
        assert_eq!(vertices.len(), 24);
        assert_eq!(indices.len(), 36);
        for tri in indices.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Vec3::from(vertices[i as usize].position));
            let n = Vec3::from(vertices[tri[0] as usize].normal);
            // Counter-clockwise seen from outside.
            assert!((b - a).cross(c - a).dot(n) > 0.0);
        }
    }

    #[test]
    fn instance_packs_yaw_and_emissive() {
        let mut prop =
            Prop::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.7, 1.8, 0.5), [0.1, 0.2, 0.3])
                .with_emissive(0.6);
        prop.yaw = 1.5;
        let instance = Instance::from_prop(&prop);
        assert_eq!(instance.offset_yaw, [1.0, 2.0, 3.0, 1.5]);
        assert_eq!(instance.scale_emissive, [0.7, 1.8, 0.5, 0.6]);
        assert_eq!(instance.color, [0.1, 0.2, 0.3]);
    }

    #[test]
    fn uniforms_carry_fog_and_clamped_fade() {
        let mut frame = FrameView::new(
            SceneKey::Ai,
            CameraPose::new(Vec3::new(0.0, 3.0, 6.0), Vec3::ZERO),
            55.0,
        );
        frame.fade = 1.4;
        let u = Uniforms::for_frame(&frame, Mat4::IDENTITY);
        assert_eq!(u.eye, [0.0, 3.0, 6.0, FOG_DISTANCE]);
        assert_eq!(u.sky[3], 1.0);
        assert_eq!(&u.sky[..3], &frame.sky[..]);
    }

    #[test]
    fn projection_centers_camera_target() {
        let frame = FrameView::new(
            SceneKey::Hub,
            CameraPose::new(Vec3::new(0.0, 5.0, 10.0), Vec3::ZERO),
            55.0,
        );
        let vp = view_projection(&frame, 16.0 / 9.0);
        let p = project_to_screen(vp, Vec3::ZERO, 1600, 900).unwrap();
        assert!((p.x - 800.0).abs() < 0.5 && (p.y - 450.0).abs() < 0.5);
        // Behind the eye.
        assert!(project_to_screen(vp, Vec3::new(0.0, 5.0, 20.0), 1600, 900).is_none());
    }
}

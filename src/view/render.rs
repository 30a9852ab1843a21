use wgpu::*;
use glam::Mat4;

use crate::model::Scene;
use crate::utils::{self, MeshBuffer, Vertex, Xorshift32};

/// Slots in the per-entity uniform buffer: slot 0 is the starfield identity
/// transform, the rest cover ship + turrets + asteroids + lasers in flight.
pub const MAX_ENTITY_SLOTS: usize = 128;
/// Uniform slot stride, matching the minimum dynamic offset alignment.
const ENTITY_SLOT_STRIDE: usize = 256;

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct EntityUniform {
    pub model: [[f32; 4]; 4],
    /// rgb override weighted by a; a = 0 keeps the mesh's own colors
    pub tint: [f32; 4],
}

impl EntityUniform {
    fn plain(model: Mat4) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            tint: [0.0; 4],
        }
    }

    fn tinted(model: Mat4, tint: [f32; 4]) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            tint,
        }
    }
}

/// Wreck tint applied to destroyed turrets (every sub-part goes red).
const WRECK_TINT: [f32; 4] = [1.0, 0.0, 0.0, 1.0];

pub struct CameraResources {
    pub camera_buffer: wgpu::Buffer,
    pub bind_group_layout: wgpu::BindGroupLayout,
    pub camera_bind_group: wgpu::BindGroup,
}

pub struct EntityResources {
    pub entity_buffer: wgpu::Buffer,
    pub bind_group_layout: wgpu::BindGroupLayout,
    pub entity_bind_group: wgpu::BindGroup,
}

pub fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> (wgpu::Texture, wgpu::TextureView) {
    let depth_texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Depth32Float,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let depth_view = depth_texture.create_view(&wgpu::TextureViewDescriptor::default());
    (depth_texture, depth_view)
}

pub fn create_camera_resources(device: &wgpu::Device) -> CameraResources {
    let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("camera_buffer"),
        size: std::mem::size_of::<CameraUniform>() as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("camera_bind_group_layout"),
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

    let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("camera_bind_group"),
        layout: &bind_group_layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: camera_buffer.as_entire_binding(),
        }],
    });

    CameraResources { camera_buffer, bind_group_layout, camera_bind_group }
}

/// One uniform buffer holds every entity's model transform and tint in
/// 256-byte slots; draws pick their slot through a dynamic offset.
pub fn create_entity_resources(device: &wgpu::Device) -> EntityResources {
    let entity_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("entity_buffer"),
        size: (MAX_ENTITY_SLOTS * ENTITY_SLOT_STRIDE) as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("entity_bind_group_layout"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: true,
                min_binding_size: None,
            },
            count: None,
        }],
    });

    let entity_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("entity_bind_group"),
        layout: &bind_group_layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &entity_buffer,
                offset: 0,
                size: wgpu::BufferSize::new(std::mem::size_of::<EntityUniform>() as u64),
            }),
        }],
    });

    EntityResources { entity_buffer, bind_group_layout, entity_bind_group }
}

fn create_pipeline(
    device: &wgpu::Device,
    shader: &wgpu::ShaderModule,
    layout: &wgpu::PipelineLayout,
    format: wgpu::TextureFormat,
    depth_format: wgpu::TextureFormat,
    topology: wgpu::PrimitiveTopology,
    label: &str,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &[
                    wgpu::VertexAttribute { offset: 0, shader_location: 0, format: wgpu::VertexFormat::Float32x3 },
                    wgpu::VertexAttribute { offset: 12, shader_location: 1, format: wgpu::VertexFormat::Float32x4 },
                ],
            }],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: depth_format,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState { count: 1, mask: !0, alpha_to_coverage_enabled: false },
        multiview: None,
        cache: None,
    })
}

fn draw_entity(rp: &mut RenderPass<'_>, bind_group: &BindGroup, mesh: &MeshBuffer, slot: usize) {
    rp.set_bind_group(1, bind_group, &[(slot * ENTITY_SLOT_STRIDE) as u32]);
    rp.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
    rp.set_index_buffer(mesh.index_buffer.slice(..), IndexFormat::Uint32);
    rp.draw_indexed(0..mesh.index_count, 0, 0..1);
}

/// Consolidated render state to avoid parameter explosion
pub struct RenderState {
    pub format: TextureFormat,
    pub alpha_mode: CompositeAlphaMode,
    pub width: u32,
    pub height: u32,

    // Pipelines
    pub line_pipeline: RenderPipeline,
    pub point_pipeline: RenderPipeline,

    // Meshes: one per entity class, one per asteroid (each rock is jittered
    // individually), one starfield point cloud
    pub ship_mesh: MeshBuffer,
    pub laser_mesh: MeshBuffer,
    pub turret_mesh: MeshBuffer,
    pub asteroid_meshes: Vec<MeshBuffer>,
    pub starfield_mesh: MeshBuffer,

    // Per-entity uniforms
    pub entity_buffer: Buffer,
    pub entity_bind_group: BindGroup,

    // UI
    pub egui_renderer: egui_wgpu::Renderer,
    pub egui_primitives: Option<Vec<egui::ClippedPrimitive>>,
    pub egui_full_output: Option<egui::FullOutput>,
    pub egui_dpr: f32,
}

impl RenderState {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        device: &Device,
        format: TextureFormat,
        alpha_mode: CompositeAlphaMode,
        width: u32,
        height: u32,
        camera_layout: &wgpu::BindGroupLayout,
        entity: EntityResources,
        scene: &Scene,
        cosmetic_seed: u32,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("entity_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/entity.wgsl").into()),
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("entity_pipeline_layout"),
            bind_group_layouts: &[camera_layout, &entity.bind_group_layout],
            push_constant_ranges: &[],
        });

        let depth_format = wgpu::TextureFormat::Depth32Float;
        let line_pipeline = create_pipeline(
            device, &shader, &pipeline_layout, format, depth_format,
            wgpu::PrimitiveTopology::LineList, "line_pipeline",
        );
        let point_pipeline = create_pipeline(
            device, &shader, &pipeline_layout, format, depth_format,
            wgpu::PrimitiveTopology::PointList, "point_pipeline",
        );

        // mesh jitter is cosmetic only, so it runs off its own rng
        let mut rng = Xorshift32::new(cosmetic_seed);
        let asteroid_meshes = scene
            .asteroids
            .iter()
            .map(|_| utils::create_asteroid_mesh(&mut rng).upload(device))
            .collect();
        let starfield_mesh = utils::create_starfield_mesh(&mut rng, 1000, 1000.0).upload(device);

        let egui_renderer = egui_wgpu::Renderer::new(device, format, egui_wgpu::RendererOptions::default());

        Self {
            format,
            alpha_mode,
            width,
            height,
            line_pipeline,
            point_pipeline,
            ship_mesh: utils::create_ship_mesh().upload(device),
            laser_mesh: utils::create_laser_mesh().upload(device),
            turret_mesh: utils::create_turret_mesh().upload(device),
            asteroid_meshes,
            starfield_mesh,
            entity_buffer: entity.entity_buffer,
            entity_bind_group: entity.entity_bind_group,
            egui_renderer,
            egui_primitives: None,
            egui_full_output: None,
            egui_dpr: 1.0,
        }
    }

    /// Write every entity's uniform slot for this frame. Slot order matches
    /// the draw order below: starfield, ship, turrets, asteroids, lasers.
    fn write_entity_slots(&self, queue: &Queue, scene: &Scene) -> usize {
        let mut slots: Vec<EntityUniform> = Vec::with_capacity(
            2 + scene.turrets.len() + scene.asteroids.len() + scene.ship.lasers.len(),
        );
        slots.push(EntityUniform::plain(Mat4::IDENTITY));
        slots.push(EntityUniform::plain(scene.ship.transform()));
        for turret in &scene.turrets {
            let uniform = if turret.is_destroyed() {
                EntityUniform::tinted(turret.transform(), WRECK_TINT)
            } else {
                EntityUniform::plain(turret.transform())
            };
            slots.push(uniform);
        }
        for asteroid in &scene.asteroids {
            slots.push(EntityUniform::plain(asteroid.transform()));
        }
        for laser in &scene.ship.lasers {
            slots.push(EntityUniform::plain(laser.transform()));
        }
        slots.truncate(MAX_ENTITY_SLOTS);

        let mut bytes = vec![0u8; slots.len() * ENTITY_SLOT_STRIDE];
        for (i, slot) in slots.iter().enumerate() {
            let offset = i * ENTITY_SLOT_STRIDE;
            bytes[offset..offset + std::mem::size_of::<EntityUniform>()]
                .copy_from_slice(bytemuck::bytes_of(slot));
        }
        queue.write_buffer(&self.entity_buffer, 0, &bytes);
        slots.len()
    }

    pub fn draw_frame(
        &mut self,
        device: &Device,
        queue: &Queue,
        surface: &Surface,
        scene: &Scene,
        depth_view: &TextureView,
        cam_bg: &BindGroup,
    ) {
        let (egui_primitives, egui_full_output) = match (self.egui_primitives.take(), self.egui_full_output.take()) {
            (Some(prim), Some(output)) => (prim, output),
            _ => return, // No UI to render
        };

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.width, self.height],
            pixels_per_point: self.egui_dpr,
        };

        let slot_count = self.write_entity_slots(queue, scene);

        let frame = match surface.get_current_texture() {
            Ok(frame) => frame,
            Err(SurfaceError::Lost) => {
                surface.configure(
                    device,
                    &SurfaceConfiguration {
                        usage: TextureUsages::RENDER_ATTACHMENT,
                        format: self.format,
                        width: self.width,
                        height: self.height,
                        present_mode: PresentMode::Fifo,
                        alpha_mode: self.alpha_mode,
                        view_formats: vec![],
                        desired_maximum_frame_latency: 2,
                    },
                );
                surface
                    .get_current_texture()
                    .expect("Failed to acquire frame after reconfigure")
            }
            Err(e) => panic!("Surface error: {e:?}"),
        };

        let view = frame.texture.create_view(&TextureViewDescriptor::default());
        let mut encoder = device.create_command_encoder(&CommandEncoderDescriptor {
            label: Some("encoder"),
        });

        {
            let mut rp = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("render_pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations {
                        // deep space
                        load: LoadOp::Clear(Color {
                            r: 0.0,
                            g: 0.0,
                            b: 0.02,
                            a: 1.0,
                        }),
                        store: StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(RenderPassDepthStencilAttachment {
                    view: depth_view,
                    depth_ops: Some(Operations {
                        load: LoadOp::Clear(1.0),
                        store: StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            rp.set_bind_group(0, cam_bg, &[]);

            let mut slot: usize = 0;

            // STARFIELD
            rp.set_pipeline(&self.point_pipeline);
            draw_entity(&mut rp, &self.entity_bind_group, &self.starfield_mesh, slot);
            slot += 1;

            // ENTITIES
            rp.set_pipeline(&self.line_pipeline);
            draw_entity(&mut rp, &self.entity_bind_group, &self.ship_mesh, slot);
            slot += 1;
            for _ in &scene.turrets {
                if slot >= slot_count {
                    break;
                }
                draw_entity(&mut rp, &self.entity_bind_group, &self.turret_mesh, slot);
                slot += 1;
            }
            for mesh in &self.asteroid_meshes {
                if slot >= slot_count {
                    break;
                }
                draw_entity(&mut rp, &self.entity_bind_group, mesh, slot);
                slot += 1;
            }
            for _ in &scene.ship.lasers {
                if slot >= slot_count {
                    break;
                }
                draw_entity(&mut rp, &self.entity_bind_group, &self.laser_mesh, slot);
                slot += 1;
            }
        }

        // Upload egui textures
        for (id, image_delta) in &egui_full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }

        // Update egui buffers
        self.egui_renderer
            .update_buffers(device, queue, &mut encoder, &egui_primitives, &screen_descriptor);

        // Render egui overlay
        {
            let egui_pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("egui_render_pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Load,
                        store: StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.egui_renderer
                .render(&mut egui_pass.forget_lifetime(), &egui_primitives, &screen_descriptor);
        }

        // Free egui textures
        for id in &egui_full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        queue.submit(std::iter::once(encoder.finish()));
        frame.present();
    }
}

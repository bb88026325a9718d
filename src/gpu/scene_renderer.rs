//! wgpu implementation of [`RenderBackend`].
//!
//! Draws the equirectangular environment as a backdrop, then every mesh in
//! the scene graph: opaque first, then transparent back to front. GPU
//! resources are cached per node and rebuilt only when the node's revision
//! changes; textures and procedural meshes are shared between nodes.

use std::sync::Arc;

use glam::{Mat4, Vec3};
use rustc_hash::{FxHashMap, FxHashSet};
use wgpu::util::DeviceExt;

use super::mesh::{GeometryKey, GpuMesh, Vertex};
use super::pipeline_helpers::{
    create_pipeline, depth_stencil_state, filtering_sampler, linear_sampler, texture_2d,
    uniform_buffer, PipelineSpec,
};
use super::render_context::RenderContext;
use super::shader_composer::{ShaderComposer, MESH_SHADER, SKYBOX_SHADER};
use super::texture::{DepthTarget, GpuTexture};
use crate::assets::TextureData;
use crate::camera::{Camera, CameraUniform, Frustum};
use crate::engine::{FrameInfo, RenderBackend};
use crate::error::{FrameError, OrreryError};
use crate::options::DisplayOptions;
use crate::scene::{Light, MapSlot, MeshInstance, NodeId, Scene, Shading};
use crate::viewport::Resolution;

// ---------------------------------------------------------------------------
// Uniform layouts
// ---------------------------------------------------------------------------

#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct LightUniform {
    ambient: [f32; 4],
    point_position: [f32; 4],
    point_color: [f32; 4],
    env: [f32; 4],
}

impl LightUniform {
    fn new(lights: &[Light], display: &DisplayOptions, has_env: bool) -> Self {
        let mut uniform = Self {
            ambient: [0.0; 4],
            point_position: [0.0; 4],
            point_color: [0.0; 4],
            env: [
                display.env_map_intensity,
                display.background_intensity,
                display.background_blurriness,
                if has_env { 1.0 } else { 0.0 },
            ],
        };
        let mut has_point = false;
        for light in lights {
            match *light {
                Light::Ambient { color, intensity } => {
                    for (dst, c) in uniform.ambient.iter_mut().zip(color) {
                        *dst += c * intensity;
                    }
                }
                // One point light is supported; the first one wins.
                Light::Point {
                    position,
                    color,
                    intensity,
                    range,
                    decay,
                } if !has_point => {
                    has_point = true;
                    uniform.point_position = position.extend(range).to_array();
                    uniform.point_color = [
                        color[0] * intensity,
                        color[1] * intensity,
                        color[2] * intensity,
                        decay,
                    ];
                }
                Light::Point { .. } => {}
            }
        }
        uniform
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct NodeUniform {
    model: [[f32; 4]; 4],
    normal_matrix: [[f32; 4]; 4],
    base_color: [f32; 4],
    params: [f32; 4],
}

impl NodeUniform {
    fn new(instance: &MeshInstance<'_>) -> Self {
        let material = &instance.mesh.material;
        let lit = match material.shading {
            Shading::Lit => 1.0,
            Shading::Unlit => 0.0,
        };
        let displacement = if material.displacement_map.is_some() {
            material.displacement_scale
        } else {
            0.0
        };
        let has_alpha = if material.alpha_map.is_some() { 1.0 } else { 0.0 };
        Self {
            model: instance.world.to_cols_array_2d(),
            normal_matrix: instance.world.inverse().transpose().to_cols_array_2d(),
            base_color: material.base_color,
            params: [lit, displacement, has_alpha, 0.0],
        }
    }
}

// ---------------------------------------------------------------------------
// Caches
// ---------------------------------------------------------------------------

/// GPU copy of a shared [`TextureData`], keyed by its allocation.
struct CachedTexture {
    texture: GpuTexture,
    source: Arc<TextureData>,
}

/// Per-node uniform and material bind group.
struct NodeResources {
    revision: u64,
    geometry: GeometryKey,
    uniform: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// 1×1 textures bound to empty material slots.
struct Fallbacks {
    white: GpuTexture,
    black_linear: GpuTexture,
    black_hdr: GpuTexture,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    Opaque,
    DoubleSided,
    Transparent,
}

struct Draw {
    node: NodeId,
    pass: Pass,
    depth: f32,
}

fn texture_key(texture: &Arc<TextureData>) -> usize {
    Arc::as_ptr(texture) as usize
}

/// View of the uploaded `texture`, or `fallback` when there is none.
fn view_or<'a>(
    textures: &'a FxHashMap<usize, CachedTexture>,
    texture: Option<&Arc<TextureData>>,
    fallback: &'a GpuTexture,
) -> &'a wgpu::TextureView {
    texture
        .and_then(|t| textures.get(&texture_key(t)))
        .map_or(&fallback.view, |cached| &cached.texture.view)
}

/// Largest axis scale of an affine matrix.
fn max_scale(m: &Mat4) -> f32 {
    m.x_axis
        .truncate()
        .length()
        .max(m.y_axis.truncate().length())
        .max(m.z_axis.truncate().length())
}

// ---------------------------------------------------------------------------
// SceneRenderer
// ---------------------------------------------------------------------------

/// Renders a [`Scene`] to a window surface.
pub struct SceneRenderer {
    context: RenderContext,
    depth: DepthTarget,

    camera_buffer: wgpu::Buffer,
    light_buffer: wgpu::Buffer,
    frame_layout: wgpu::BindGroupLayout,
    node_layout: wgpu::BindGroupLayout,
    frame_bind_group: wgpu::BindGroup,
    env_revision: Option<u64>,
    has_env: bool,

    map_sampler: wgpu::Sampler,
    env_sampler: wgpu::Sampler,
    fallbacks: Fallbacks,

    sky_pipeline: wgpu::RenderPipeline,
    opaque_pipeline: wgpu::RenderPipeline,
    double_sided_pipeline: wgpu::RenderPipeline,
    transparent_pipeline: wgpu::RenderPipeline,

    meshes: FxHashMap<GeometryKey, GpuMesh>,
    textures: FxHashMap<usize, CachedTexture>,
    nodes: FxHashMap<NodeId, NodeResources>,
}

impl SceneRenderer {
    /// Build pipelines and shared resources on `context`.
    ///
    /// # Errors
    ///
    /// Returns [`OrreryError::Shader`] if a shader fails to compose.
    pub fn new(context: RenderContext) -> Result<Self, OrreryError> {
        let device = &context.device;
        let mut composer = ShaderComposer::new()?;
        let mesh_shader = composer.compose(device, "Mesh Shader", MESH_SHADER.0, MESH_SHADER.1)?;
        let sky_shader =
            composer.compose(device, "Skybox Shader", SKYBOX_SHADER.0, SKYBOX_SHADER.1)?;

        let both = wgpu::ShaderStages::VERTEX_FRAGMENT;
        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Frame Bind Group Layout"),
            entries: &[
                uniform_buffer(0, both),
                uniform_buffer(1, both),
                texture_2d(2, wgpu::ShaderStages::FRAGMENT),
                filtering_sampler(3, wgpu::ShaderStages::FRAGMENT),
            ],
        });
        let node_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Node Bind Group Layout"),
            entries: &[
                uniform_buffer(0, both),
                texture_2d(1, wgpu::ShaderStages::FRAGMENT),
                texture_2d(2, wgpu::ShaderStages::VERTEX),
                texture_2d(3, wgpu::ShaderStages::FRAGMENT),
                filtering_sampler(4, both),
            ],
        });

        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Uniform"),
            contents: bytemuck::bytes_of(&CameraUniform::default()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let light_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Light Uniform"),
            contents: bytemuck::bytes_of(&LightUniform::new(&[], &DisplayOptions::default(), false)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let map_sampler = linear_sampler(device, "Map Sampler", wgpu::AddressMode::ClampToEdge);
        let env_sampler = linear_sampler(device, "Env Sampler", wgpu::AddressMode::Repeat);
        let queue = &context.queue;
        let fallbacks = Fallbacks {
            white: GpuTexture::upload(device, queue, &TextureData::solid([255; 4]), "White"),
            black_linear: GpuTexture::upload(
                device,
                queue,
                &TextureData::solid_linear([0, 0, 0, 255]),
                "Black",
            ),
            black_hdr: GpuTexture::upload(
                device,
                queue,
                &TextureData::solid_hdr([0.0, 0.0, 0.0, 1.0]),
                "Black HDR",
            ),
        };

        let frame_bind_group = Self::create_frame_bind_group(
            device,
            &frame_layout,
            &camera_buffer,
            &light_buffer,
            &fallbacks.black_hdr.view,
            &env_sampler,
        );

        let format = context.format();
        let vertex_layouts = [Vertex::layout()];
        let mesh_layouts = [&frame_layout, &node_layout];
        let mesh_spec = |label, cull_mode, blend, write_depth| PipelineSpec {
            label,
            shader: &mesh_shader,
            buffers: &vertex_layouts,
            bind_group_layouts: &mesh_layouts,
            format,
            blend,
            cull_mode,
            depth: depth_stencil_state(write_depth, wgpu::CompareFunction::Less),
        };
        let opaque_pipeline = create_pipeline(
            device,
            &mesh_spec("Opaque Mesh", Some(wgpu::Face::Back), None, true),
        );
        let double_sided_pipeline =
            create_pipeline(device, &mesh_spec("Double-Sided Mesh", None, None, true));
        let transparent_pipeline = create_pipeline(
            device,
            &mesh_spec(
                "Transparent Mesh",
                None,
                Some(wgpu::BlendState::ALPHA_BLENDING),
                false,
            ),
        );
        let sky_pipeline = create_pipeline(
            device,
            &PipelineSpec {
                label: "Skybox",
                shader: &sky_shader,
                buffers: &[],
                bind_group_layouts: &[&frame_layout],
                format,
                blend: None,
                cull_mode: None,
                depth: depth_stencil_state(false, wgpu::CompareFunction::Always),
            },
        );

        let depth = DepthTarget::new(device, context.width(), context.height());

        Ok(Self {
            context,
            depth,
            camera_buffer,
            light_buffer,
            frame_layout,
            node_layout,
            frame_bind_group,
            env_revision: None,
            has_env: false,
            map_sampler,
            env_sampler,
            fallbacks,
            sky_pipeline,
            opaque_pipeline,
            double_sided_pipeline,
            transparent_pipeline,
            meshes: FxHashMap::default(),
            textures: FxHashMap::default(),
            nodes: FxHashMap::default(),
        })
    }

    /// The underlying wgpu context.
    #[must_use]
    pub fn context(&self) -> &RenderContext {
        &self.context
    }

    fn create_frame_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        camera: &wgpu::Buffer,
        lights: &wgpu::Buffer,
        env: &wgpu::TextureView,
        sampler: &wgpu::Sampler,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: lights.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(env),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    }

    /// Upload `texture` unless an upload of the same allocation exists.
    fn ensure_texture(&mut self, texture: &Arc<TextureData>) {
        let key = texture_key(texture);
        if self.textures.contains_key(&key) {
            return;
        }
        let gpu = GpuTexture::upload(
            &self.context.device,
            &self.context.queue,
            texture,
            "Scene Texture",
        );
        let _ = self.textures.insert(
            key,
            CachedTexture {
                texture: gpu,
                source: Arc::clone(texture),
            },
        );
    }

    fn sync_environment(&mut self, scene: &Scene) {
        let environment = scene.environment();
        if self.env_revision == Some(environment.revision) {
            return;
        }
        self.env_revision = Some(environment.revision);
        if let Some(texture) = &environment.texture {
            self.ensure_texture(texture);
        }
        let view = view_or(
            &self.textures,
            environment.texture.as_ref(),
            &self.fallbacks.black_hdr,
        );
        self.has_env = environment.texture.is_some();
        self.frame_bind_group = Self::create_frame_bind_group(
            &self.context.device,
            &self.frame_layout,
            &self.camera_buffer,
            &self.light_buffer,
            view,
            &self.env_sampler,
        );
        log::debug!("environment bound (revision {})", environment.revision);
    }

    /// Create or refresh the resources of one mesh node.
    fn sync_node(&mut self, instance: &MeshInstance<'_>) {
        let geometry = GeometryKey::of(&instance.mesh.geometry);
        if !self.meshes.contains_key(&geometry) {
            let mesh = GpuMesh::new(&self.context.device, "Scene Mesh", &instance.mesh.geometry);
            let _ = self.meshes.insert(geometry, mesh);
        }

        let uniform = NodeUniform::new(instance);
        if let Some(existing) = self.nodes.get(&instance.node) {
            if existing.revision == instance.revision && existing.geometry == geometry {
                self.context
                    .queue
                    .write_buffer(&existing.uniform, 0, bytemuck::bytes_of(&uniform));
                return;
            }
        }

        let material = &instance.mesh.material;
        for slot in [MapSlot::Color, MapSlot::Displacement, MapSlot::Alpha] {
            if let Some(texture) = material.slot(slot) {
                self.ensure_texture(texture);
            }
        }
        let color_view = view_or(
            &self.textures,
            material.slot(MapSlot::Color),
            &self.fallbacks.white,
        );
        let displacement_view = view_or(
            &self.textures,
            material.slot(MapSlot::Displacement),
            &self.fallbacks.black_linear,
        );
        let alpha_view = view_or(
            &self.textures,
            material.slot(MapSlot::Alpha),
            &self.fallbacks.white,
        );

        let device = &self.context.device;
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Node Uniform"),
            contents: bytemuck::bytes_of(&uniform),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Node Bind Group"),
            layout: &self.node_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(color_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(displacement_view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(alpha_view),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::Sampler(&self.map_sampler),
                },
            ],
        });
        let _ = self.nodes.insert(
            instance.node,
            NodeResources {
                revision: instance.revision,
                geometry,
                uniform: buffer,
                bind_group,
            },
        );
    }

    /// Drop resources the scene no longer references.
    fn prune(&mut self, live_nodes: &FxHashSet<NodeId>) {
        self.nodes.retain(|id, _| live_nodes.contains(id));
        let live_geometry: FxHashSet<GeometryKey> =
            self.nodes.values().map(|n| n.geometry).collect();
        self.meshes
            .retain(|key, mesh| live_geometry.contains(key) || !mesh.is_orphaned());
        // Bind groups keep their own references to evicted views.
        self.textures
            .retain(|_, cached| Arc::strong_count(&cached.source) > 1);
    }

    fn pipeline(&self, pass: Pass) -> &wgpu::RenderPipeline {
        match pass {
            Pass::Opaque => &self.opaque_pipeline,
            Pass::DoubleSided => &self.double_sided_pipeline,
            Pass::Transparent => &self.transparent_pipeline,
        }
    }
}

impl RenderBackend for SceneRenderer {
    fn set_resolution(&mut self, resolution: Resolution) {
        self.context.resize(resolution.width, resolution.height);
        self.depth = DepthTarget::new(&self.context.device, self.context.width(), self.context.height());
        log::debug!("render target {}x{}", resolution.width, resolution.height);
    }

    fn reconfigure(&mut self) {
        self.context.reconfigure();
        log::debug!("surface reconfigured");
    }

    fn render(
        &mut self,
        scene: &Scene,
        camera: &Camera,
        frame: &FrameInfo<'_>,
    ) -> Result<(), FrameError> {
        self.sync_environment(scene);
        let queue = &self.context.queue;
        queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::bytes_of(&CameraUniform::from_camera(camera)),
        );
        queue.write_buffer(
            &self.light_buffer,
            0,
            bytemuck::bytes_of(&LightUniform::new(scene.lights(), frame.display, self.has_env)),
        );

        let frustum = Frustum::from_view_projection(camera.build_matrix());
        let mut draws = Vec::new();
        let mut live = FxHashSet::default();
        for instance in scene.mesh_instances() {
            let _ = live.insert(instance.node);
            self.sync_node(&instance);

            let material = &instance.mesh.material;
            let center = instance.world.transform_point3(Vec3::ZERO);
            let radius = instance.mesh.geometry.bounding_radius() * max_scale(&instance.world)
                + material.displacement_scale.abs();
            if !frustum.intersects_sphere(center, radius) {
                continue;
            }
            let pass = if material.transparent {
                Pass::Transparent
            } else if material.double_sided {
                Pass::DoubleSided
            } else {
                Pass::Opaque
            };
            draws.push(Draw {
                node: instance.node,
                pass,
                depth: center.distance_squared(camera.eye),
            });
        }
        // Opaque front to back, transparent back to front.
        draws.sort_by(|a, b| match (a.pass == Pass::Transparent, b.pass == Pass::Transparent) {
            (false, false) => a.depth.total_cmp(&b.depth),
            (true, true) => b.depth.total_cmp(&a.depth),
            (false, true) => std::cmp::Ordering::Less,
            (true, false) => std::cmp::Ordering::Greater,
        });

        let output = self.context.get_next_frame()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let [r, g, b] = frame.display.clear_color;
        let mut encoder = self.context.create_encoder();
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: f64::from(r),
                            g: f64::from(g),
                            b: f64::from(b),
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_bind_group(0, &self.frame_bind_group, &[]);
            if self.has_env {
                pass.set_pipeline(&self.sky_pipeline);
                pass.draw(0..3, 0..1);
            }

            let mut bound = None;
            for draw in &draws {
                let Some(node) = self.nodes.get(&draw.node) else { continue };
                let Some(mesh) = self.meshes.get(&node.geometry) else { continue };
                if mesh.index_count == 0 {
                    continue;
                }
                if bound != Some(draw.pass) {
                    pass.set_pipeline(self.pipeline(draw.pass));
                    bound = Some(draw.pass);
                }
                pass.set_bind_group(1, &node.bind_group, &[]);
                pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }
        }
        self.context.submit(encoder);
        output.present();

        self.prune(&live);
        if frame.frame_index == 0 {
            log::debug!("first frame: {} draws", draws.len());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn light_uniform_packs_scene_lights() {
        let lights = [
            Light::Ambient {
                color: [1.0; 3],
                intensity: 0.1,
            },
            Light::Point {
                position: Vec3::new(1.0, 2.0, 3.0),
                color: [1.0, 0.5, 0.0],
                intensity: 100.0,
                range: 100.0,
                decay: 1.2,
            },
        ];
        let u = LightUniform::new(&lights, &DisplayOptions::default(), true);
        assert!((u.ambient[0] - 0.1).abs() < 1e-6);
        assert_eq!(u.point_position, [1.0, 2.0, 3.0, 100.0]);
        assert_eq!(u.point_color, [100.0, 50.0, 0.0, 1.2]);
        assert_eq!(u.env[3], 1.0);
        assert!((u.env[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn max_scale_reads_axis_lengths() {
        let m = Mat4::from_scale(Vec3::new(1.0, 3.0, 2.0));
        assert!((max_scale(&m) - 3.0).abs() < 1e-6);
    }
}

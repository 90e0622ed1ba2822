//! wgpu backend for [`SpriteBatch`] output.

pub mod pipeline;
pub mod texture;
pub mod utils;

use std::collections::HashMap;
use std::sync::Arc;

use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use pipeline::{SpritePipeline, create_sprite_pipeline};
use texture::{GpuTexture, create_sampler};
use utils::{Viewport, letterbox_viewport};

use crate::camera::CameraUniform;
use crate::config::KitConfig;
use crate::error::{Error, Result};
use crate::sprite::{SpriteBatch, TextureCache, TextureId};

pub struct Renderer {
    pub window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    pub(crate) device: wgpu::Device,
    pub(crate) queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipeline: SpritePipeline,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    sampler: wgpu::Sampler,
    /// GPU mirror of the texture cache, filled on first use.
    textures: HashMap<TextureId, GpuTexture>,
    /// Cache generation the mirror matches; `None` before the first frame.
    synced_generation: Option<u64>,
    clear_color: wgpu::Color,
    /// Game resolution in pixels; the camera projects onto this.
    logical: (u32, u32),
    viewport: Viewport,
}

impl Renderer {
    pub async fn new(window: Arc<Window>, kit: &KitConfig) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(Arc::clone(&window))
            .map_err(|e| Error::Gpu(format!("failed to create surface: {e}")))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                compatible_surface: Some(&surface),
                ..Default::default()
            })
            .await
            .map_err(|e| Error::Gpu(format!("no suitable GPU adapter found: {e}")))?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor::default())
            .await
            .map_err(|e| Error::Gpu(format!("failed to create device: {e}")))?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| Error::Gpu("surface reports no formats".into()))?;
        let alpha_mode = caps.alpha_modes.first().copied().unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: if kit.window.vsync {
                wgpu::PresentMode::AutoVsync
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        log::info!("renderer: {}x{} surface, format {format:?}", config.width, config.height);

        let pipeline = create_sprite_pipeline(&device, format);
        let logical = (kit.window.width.max(1), kit.window.height.max(1));

        // Identity ortho until the first camera upload.
        let cam_uniform = CameraUniform::identity_ortho(logical.0 as f32, logical.1 as f32);
        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("camera_buffer"),
            contents: bytemuck::cast_slice(&[cam_uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("camera_bg"),
            layout: &pipeline.camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let sampler = create_sampler(&device, kit.render.pixel_art);
        let [r, g, b, a] = kit.render.clear_color.0;

        Ok(Self {
            window,
            surface,
            device,
            queue,
            viewport: letterbox_viewport((config.width, config.height), logical),
            config,
            pipeline,
            camera_buffer,
            camera_bind_group,
            sampler,
            textures: HashMap::new(),
            synced_generation: None,
            clear_color: wgpu::Color { r: r as f64, g: g as f64, b: b as f64, a: a as f64 },
            logical,
        })
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
        self.viewport = letterbox_viewport((new_size.width, new_size.height), self.logical);
    }

    /// Upload a new camera view-projection matrix to the GPU.
    /// Call this once per frame (after `Camera::tick`, before `render`).
    pub fn update_camera(&mut self, uniform: &CameraUniform) {
        self.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(std::slice::from_ref(uniform)),
        );
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Logical game resolution the camera projects onto.
    pub fn logical_size(&self) -> (u32, u32) {
        self.logical
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn gpu_texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Drop the GPU mirror when the cache changed, then upload whatever
    /// `batch` needs that is not resident yet.
    fn sync_textures(&mut self, batch: &SpriteBatch, cache: &TextureCache) {
        let generation = cache.generation();
        if self.synced_generation != Some(generation) {
            if !self.textures.is_empty() {
                log::debug!("renderer: texture cache changed, dropping {} GPU textures", self.textures.len());
            }
            self.textures.clear();
            self.synced_generation = Some(generation);
        }

        for call in batch.draw_calls() {
            if self.textures.contains_key(&call.texture) {
                continue;
            }
            let Some(source) = cache.get(call.texture) else {
                continue;
            };
            let label = format!("sprite_texture_{}", call.texture.0);
            let gpu = GpuTexture::upload(
                &self.device,
                &self.queue,
                &self.pipeline.texture_bind_group_layout,
                &self.sampler,
                &label,
                source,
            );
            self.textures.insert(call.texture, gpu);
        }
    }

    /// Render one frame: one indexed draw per [`DrawCall`](crate::sprite::DrawCall),
    /// in batch order. `batch` must already be finished.
    pub fn render(&mut self, batch: &SpriteBatch, cache: &TextureCache) -> std::result::Result<(), wgpu::SurfaceError> {
        self.sync_textures(batch, cache);

        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let buffers = if batch.indices().is_empty() {
            None
        } else {
            let vbuf = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("sprite_vertex_buffer"),
                contents: bytemuck::cast_slice(batch.vertices()),
                usage: wgpu::BufferUsages::VERTEX,
            });
            let ibuf = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("sprite_index_buffer"),
                contents: bytemuck::cast_slice(batch.indices()),
                usage: wgpu::BufferUsages::INDEX,
            });
            Some((vbuf, ibuf))
        };

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("frame") });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("sprite_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            if let Some((vbuf, ibuf)) = &buffers {
                if !self.viewport.is_empty() {
                    let v = self.viewport;
                    pass.set_viewport(v.x, v.y, v.width, v.height, 0.0, 1.0);
                    pass.set_pipeline(&self.pipeline.render_pipeline);
                    pass.set_bind_group(0, &self.camera_bind_group, &[]);
                    pass.set_vertex_buffer(0, vbuf.slice(..));
                    pass.set_index_buffer(ibuf.slice(..), wgpu::IndexFormat::Uint32);

                    for call in batch.draw_calls() {
                        let Some(gpu) = self.textures.get(&call.texture) else { continue };
                        pass.set_bind_group(1, &gpu.bind_group, &[]);
                        pass.draw_indexed(call.index_range.clone(), 0, 0..1);
                    }
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}

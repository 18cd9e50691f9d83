//! WGPU-based renderer for the showroom
//!
//! One depth-tested pass draws every scene object with the lit scene
//! pipeline, then an optional UI callback draws on top.

use std::sync::Arc;

use anyhow::Context;
use log::{debug, error, info, warn};
use wgpu::TextureFormat;

use crate::{
    config::LightingConfig,
    gfx::{
        camera::camera_utils::CameraUniform,
        resources::{
            global_bindings::{
                create_transform_layout, update_global_ubo, GlobalBindings, GlobalUBO,
                GlobalUBOContent, LightConfig,
            },
            texture_bindings::TextureBindings,
            texture_resource::TextureResource,
        },
        scene::{object::DrawObject, scene::Scene},
    },
};

use super::pipeline_manager::{PipelineConfig, PipelineManager};

const SCENE_PIPELINE: &str = "Scene";

/// Surface and presentation settings
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub vsync: bool,
    pub clear_color: wgpu::Color,
    pub light: LightConfig,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::from_lighting(&LightingConfig::default(), true)
    }
}

impl RenderOptions {
    pub fn from_lighting(lighting: &LightingConfig, vsync: bool) -> Self {
        let [r, g, b] = lighting.clear_color;
        Self {
            vsync,
            clear_color: wgpu::Color { r, g, b, a: 1.0 },
            light: LightConfig::from(lighting),
        }
    }
}

/// What one rendered frame drew
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub draw_calls: u32,
    pub triangles: u32,
}

pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    depth_texture: TextureResource,
    format: TextureFormat,
    pub pipeline_manager: PipelineManager,
    global_ubo: GlobalUBO,
    global_bindings: GlobalBindings,
    transform_layout: wgpu::BindGroupLayout,
    texture_bindings: TextureBindings,
    options: RenderOptions,
}

fn present_mode(vsync: bool) -> wgpu::PresentMode {
    if vsync {
        wgpu::PresentMode::AutoVsync
    } else {
        wgpu::PresentMode::AutoNoVsync
    }
}

impl RenderEngine {
    /// Creates the device, surface and scene pipeline for `window`
    ///
    /// # Arguments
    /// * `window` - Surface target, usually an `Arc<Window>`
    /// * `width` - Initial surface width in physical pixels
    /// * `height` - Initial surface height in physical pixels
    /// * `options` - Present mode and scene lighting
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        options: RenderOptions,
    ) -> anyhow::Result<RenderEngine> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window)
            .context("Failed to create render surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("Failed to request adapter")?;
        info!("Using adapter: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits {
                    max_texture_dimension_2d: 4096,
                    ..wgpu::Limits::downlevel_defaults()
                },
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("Failed to request a device")?;

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .context("Surface reports no supported formats")?;
        let alpha_mode = surface_capabilities
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: present_mode(options.vsync),
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture =
            TextureResource::create_depth_texture(&device, &config, "depth_texture");

        let global_ubo = GlobalUBO::new_with_data(
            &device,
            &GlobalUBOContent::new(&CameraUniform::default(), &options.light),
        );
        let global_bindings = GlobalBindings::new(&device, &global_ubo);
        let transform_layout = create_transform_layout(&device);
        let texture_bindings = TextureBindings::new(&device, &queue);

        let device: Arc<wgpu::Device> = Arc::new(device);
        let queue: Arc<wgpu::Queue> = Arc::new(queue);
        let mut pipeline_manager = PipelineManager::new(device.clone());

        pipeline_manager.load_shader("scene", include_str!("scene.wgsl"));
        // Car and room meshes are not reliably closed, so draw both faces
        pipeline_manager.register_pipeline(
            SCENE_PIPELINE,
            PipelineConfig::default()
                .with_label("SCENE")
                .with_shader("scene")
                .with_cull_mode(None)
                .with_depth_format(TextureResource::DEPTH_FORMAT)
                .with_color_format(format, Some(wgpu::BlendState::ALPHA_BLENDING))
                .with_bind_group_layouts(vec![
                    global_bindings.layout().clone(),
                    transform_layout.clone(),
                    texture_bindings.layout().clone(),
                ]),
        );

        if let Err(errors) = pipeline_manager.create_all_pipelines() {
            anyhow::bail!("Failed to create pipelines: {}", errors.join("; "));
        }

        Ok(RenderEngine {
            surface,
            device,
            queue,
            config,
            depth_texture,
            format,
            pipeline_manager,
            global_ubo,
            global_bindings,
            transform_layout,
            texture_bindings,
            options,
        })
    }

    /// Draws the scene and the optional UI overlay
    ///
    /// Returns `None` when the frame was skipped because the surface was
    /// lost, outdated or timed out. Lost and outdated surfaces are
    /// reconfigured for the next frame.
    ///
    /// # Arguments
    /// * `scene` - Objects whose GPU resources were set up by `prepare_scene`
    /// * `ui_callback` - Records the overlay pass on top of the scene
    pub fn render_frame<F>(&mut self, scene: &Scene, ui_callback: Option<F>) -> Option<FrameStats>
    where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                warn!("Surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return None;
            }
            Err(wgpu::SurfaceError::Timeout) => {
                debug!("Surface timed out, skipping frame");
                return None;
            }
            Err(e) => {
                error!("Failed to acquire surface texture: {}", e);
                return None;
            }
        };

        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        let mut stats = FrameStats::default();
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.options.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_bind_group(0, self.global_bindings.bind_group(), &[]);

            if let Some(pipeline) = self.pipeline_manager.get_pipeline(SCENE_PIPELINE) {
                render_pass.set_pipeline(pipeline);

                for object in scene.objects.iter().filter(|o| o.visible) {
                    render_pass.draw_object(object);
                    stats.draw_calls += object.meshes.len() as u32;
                    stats.triangles += object.triangle_count() as u32;
                }
            }
        }

        if let Some(ui_callback) = ui_callback {
            ui_callback(
                &self.device,
                &self.queue,
                &mut encoder,
                &surface_texture_view,
            );
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Some(stats)
    }

    /// Uploads this frame's camera matrices
    pub fn update(&mut self, camera_uniform: CameraUniform) {
        update_global_ubo(
            &mut self.global_ubo,
            &self.queue,
            &camera_uniform,
            &self.options.light,
        );
    }

    /// Uploads GPU buffers and textures for objects added since the last call
    pub fn prepare_scene(&self, scene: &mut Scene) {
        scene.init_gpu_resources(
            &self.device,
            &self.queue,
            &self.transform_layout,
            &self.texture_bindings,
        );
    }

    /// Reconfigures the surface and depth buffer; zero sizes are ignored
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture =
            TextureResource::create_depth_texture(&self.device, &self.config, "depth_texture");
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }
}

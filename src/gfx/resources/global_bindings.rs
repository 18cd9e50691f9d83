//! Per-frame uniforms shared by every draw: camera and lighting
//!
//! Bound to group 0 of the scene pipeline. Per-object transforms live in
//! group 1 and are owned by each [`Object`](crate::gfx::scene::Object).

use cgmath::{InnerSpace, Vector3};

use crate::{
    config::LightingConfig, gfx::camera::camera_utils::CameraUniform,
    wgpu_utils::uniform_buffer::UniformBuffer,
};

/// Layout must match `Globals` in `scene.wgsl`
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalUBOContent {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
    ambient_color: [f32; 3],
    ambient_intensity: f32,
    key_direction: [f32; 3],
    key_intensity: f32,
}

/// Scene lighting: a uniform ambient term plus an optional directional key light
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LightConfig {
    pub ambient_color: [f32; 3],
    pub ambient_intensity: f32,
    pub key_direction: [f32; 3],
    pub key_intensity: f32,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self::from(&LightingConfig::default())
    }
}

impl From<&LightingConfig> for LightConfig {
    fn from(config: &LightingConfig) -> Self {
        let direction = Vector3::from(config.key_direction);
        let key_direction = if direction.magnitude2() > f32::EPSILON {
            direction.normalize().into()
        } else {
            [0.0, -1.0, 0.0]
        };
        Self {
            ambient_color: config.ambient_color,
            ambient_intensity: config.ambient_intensity,
            key_direction,
            key_intensity: config.key_intensity,
        }
    }
}

impl GlobalUBOContent {
    pub fn new(camera: &CameraUniform, light: &LightConfig) -> Self {
        Self {
            view_position: camera.view_position,
            view_proj: camera.view_proj,
            ambient_color: light.ambient_color,
            ambient_intensity: light.ambient_intensity,
            key_direction: light.key_direction,
            key_intensity: light.key_intensity,
        }
    }
}

pub type GlobalUBO = UniformBuffer<GlobalUBOContent>;

/// Writes the camera and light into the global uniform
///
/// # Arguments
/// * `ubo` - Uniform shared by every scene pipeline
/// * `queue` - WGPU queue for the upload
/// * `camera` - Current view-projection and eye position
/// * `light` - Ambient and key light settings
pub fn update_global_ubo(
    ubo: &mut GlobalUBO,
    queue: &wgpu::Queue,
    camera: &CameraUniform,
    light: &LightConfig,
) {
    ubo.update_content(queue, GlobalUBOContent::new(camera, light));
}

/// Layout and bind group for [`GlobalUBO`]
pub struct GlobalBindings {
    layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
}

impl GlobalBindings {
    /// Builds the group 0 layout and binds `ubo` to it
    ///
    /// # Arguments
    /// * `device` - WGPU device for creating the layout and bind group
    /// * `ubo` - Global uniform visible to both shader stages
    pub fn new(device: &wgpu::Device, ubo: &GlobalUBO) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Globals Bind Group Layout"),
            entries: &[uniform_layout_entry(
                0,
                wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            )],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Globals Bind Group"),
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: ubo.binding_resource(),
            }],
        });

        Self { layout, bind_group }
    }

    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

/// Layout for the per-object model matrix in group 1
pub fn create_transform_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Transform Bind Group Layout"),
        entries: &[uniform_layout_entry(0, wgpu::ShaderStages::VERTEX)],
    })
}

fn uniform_layout_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
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

// src/gfx/resources/texture_bindings.rs
//! Base-color texture binding, group 2 of the scene pipeline
//!
//! Every mesh binds a texture. Untextured meshes get a 1x1 white texture so
//! the shader can always multiply by the sample.

use super::texture_resource::TextureResource;

/// Layout, shared sampler and the white fallback texture
pub struct TextureBindings {
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    white: TextureResource,
}

impl TextureBindings {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Base Color Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        // glTF's default wrap mode is repeat
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Base Color Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let white = TextureResource::create_from_rgba_data(
            device,
            queue,
            &[u8::MAX; 4],
            1,
            1,
            "White Texture",
        );

        Self {
            layout,
            sampler,
            white,
        }
    }

    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    /// Binds `view`, or the white fallback when `None`
    ///
    /// # Arguments
    /// * `device` - WGPU device for creating the bind group
    /// * `view` - Base-color texture view, if the mesh has one
    /// * `label` - Debug label for the bind group
    pub fn create_bind_group(
        &self,
        device: &wgpu::Device,
        view: Option<&wgpu::TextureView>,
        label: &str,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(
                        view.unwrap_or(&self.white.view),
                    ),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        })
    }
}

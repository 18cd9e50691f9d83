// src/gfx/scene/object.rs
use std::{collections::HashMap, sync::Arc};

use cgmath::{Matrix4, SquareMatrix};
use wgpu::{util::DeviceExt, Device, Queue};

use super::vertex::Vertex3D;
use crate::{
    assets::model::{MeshData, TextureData},
    gfx::resources::{texture_bindings::TextureBindings, texture_resource::TextureResource},
    wgpu_utils::uniform_buffer::UniformBuffer,
};

pub struct Mesh {
    vertices: Vec<Vertex3D>,
    indices: Vec<u32>,
    texture: Option<Arc<TextureData>>,
    vertex_buffer: Option<wgpu::Buffer>,
    index_buffer: Option<wgpu::Buffer>,
    texture_bind_group: Option<wgpu::BindGroup>,
    pub index_count: u32,
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex3D>, indices: Vec<u32>) -> Self {
        Self {
            index_count: indices.len() as u32,
            vertices,
            indices,
            texture: None,
            vertex_buffer: None,
            index_buffer: None,
            texture_bind_group: None,
        }
    }

    /// Interleaves loaded mesh data, painting every vertex with the mesh color
    pub fn from_data(data: &MeshData) -> Self {
        let vertices = data
            .positions
            .iter()
            .zip(&data.normals)
            .zip(&data.tex_coords)
            .map(|((&position, &normal), &tex_coords)| Vertex3D {
                position,
                normal,
                color: data.color,
                tex_coords,
            })
            .collect();
        let mut mesh = Self::new(vertices, data.indices.clone());
        mesh.texture = data.texture.clone();
        mesh
    }

    pub fn is_textured(&self) -> bool {
        self.texture.is_some()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    fn init_gpu_resources(&mut self, device: &Device, texture_bind_group: wgpu::BindGroup) {
        self.texture_bind_group = Some(texture_bind_group);
        self.vertex_buffer = Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Vertex Buffer"),
            contents: bytemuck::cast_slice(&self.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        }));
        self.index_buffer = Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Index Buffer"),
            contents: bytemuck::cast_slice(&self.indices),
            usage: wgpu::BufferUsages::INDEX,
        }));
    }
}

type TransformBuffer = UniformBuffer<[[f32; 4]; 4]>;

pub struct ObjectGpuResources {
    pub transform_buffer: TransformBuffer,
    pub transform_bind_group: wgpu::BindGroup,
}

/// A named group of meshes sharing one model matrix
pub struct Object {
    pub name: String,
    pub meshes: Vec<Mesh>,
    pub transform: Matrix4<f32>,
    pub visible: bool,
    pub gpu_resources: Option<ObjectGpuResources>, // None until init_gpu_resources called
}

impl Object {
    pub fn new(name: impl Into<String>, meshes: Vec<Mesh>) -> Self {
        Self {
            name: name.into(),
            meshes,
            transform: Matrix4::identity(),
            visible: true,
            gpu_resources: None,
        }
    }

    pub fn with_transform(mut self, transform: Matrix4<f32>) -> Self {
        self.transform = transform;
        self
    }

    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(Mesh::vertex_count).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(|m| m.index_count as usize / 3).sum()
    }

    /// Uploads meshes and textures and creates the group-1 transform binding
    ///
    /// Meshes that share a texture image share one GPU texture.
    ///
    /// # Arguments
    /// * `device` - WGPU device for creating buffers and bind groups
    /// * `queue` - WGPU queue for uploading texture data
    /// * `transform_layout` - Layout of the per-object model matrix
    /// * `textures` - Base-color texture layout, sampler and fallback
    pub fn init_gpu_resources(
        &mut self,
        device: &Device,
        queue: &Queue,
        transform_layout: &wgpu::BindGroupLayout,
        textures: &TextureBindings,
    ) {
        let mut uploaded: HashMap<*const TextureData, TextureResource> = HashMap::new();
        for (index, mesh) in self.meshes.iter_mut().enumerate() {
            let view = match mesh.texture.as_ref() {
                Some(data) => Some(
                    &uploaded
                        .entry(Arc::as_ptr(data))
                        .or_insert_with(|| {
                            TextureResource::create_from_rgba_data(
                                device,
                                queue,
                                &data.rgba,
                                data.width,
                                data.height,
                                &format!("{} Base Color", self.name),
                            )
                        })
                        .view,
                ),
                None => None,
            };
            let bind_group = textures.create_bind_group(
                device,
                view,
                &format!("{} Mesh {} Texture Bind Group", self.name, index),
            );
            mesh.init_gpu_resources(device, bind_group);
        }

        let transform_buffer = TransformBuffer::new_with_data(device, &self.transform.into());
        let transform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{} Transform Bind Group", self.name)),
            layout: transform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: transform_buffer.binding_resource(),
            }],
        });

        self.gpu_resources = Some(ObjectGpuResources {
            transform_buffer,
            transform_bind_group,
        });
    }
}

pub trait DrawObject<'a> {
    fn draw_mesh(&mut self, mesh: &'a Mesh);
    /// Binds the object's transform to group 1 and draws each mesh with its texture in group 2
    fn draw_object(&mut self, object: &'a Object);
}

impl<'a, 'b> DrawObject<'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn draw_mesh(&mut self, mesh: &'b Mesh) {
        let (Some(vertex_buffer), Some(index_buffer), Some(texture_bind_group)) = (
            &mesh.vertex_buffer,
            &mesh.index_buffer,
            &mesh.texture_bind_group,
        ) else {
            return; // Not uploaded yet
        };

        self.set_bind_group(2, texture_bind_group, &[]);
        self.set_vertex_buffer(0, vertex_buffer.slice(..));
        self.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.draw_indexed(0..mesh.index_count, 0, 0..1);
    }

    fn draw_object(&mut self, object: &'b Object) {
        let Some(gpu) = object.gpu_resources.as_ref() else {
            return;
        };
        self.set_bind_group(1, &gpu.transform_bind_group, &[]);
        for mesh in &object.meshes {
            if mesh.index_count > 0 {
                self.draw_mesh(mesh);
            }
        }
    }
}

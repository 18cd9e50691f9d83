use log::debug;
use wgpu::{Device, Queue};

use super::object::{Mesh, Object};
use crate::{
    assets::loader::LoadedAsset,
    gfx::{camera::camera_utils::CameraManager, resources::texture_bindings::TextureBindings},
};

/// Everything that gets drawn, plus the camera it is drawn from
pub struct Scene {
    pub camera_manager: CameraManager,
    pub objects: Vec<Object>,
}

impl Scene {
    pub fn new(camera_manager: CameraManager) -> Self {
        Self {
            camera_manager,
            objects: Vec::new(),
        }
    }

    /// Refreshes camera matrices
    pub fn update(&mut self) {
        self.camera_manager.camera.update_view_proj();
    }

    pub fn add_object(&mut self, object: Object) -> usize {
        self.objects.push(object);
        self.objects.len() - 1
    }

    /// Adds a loaded model at its placement transform
    pub fn add_asset(&mut self, asset: &LoadedAsset) -> usize {
        let meshes = asset.model.meshes.iter().map(Mesh::from_data).collect();
        let object = Object::new(asset.name.clone(), meshes).with_transform(asset.transform);
        debug!(
            "Adding '{}' to scene: {} vertices, {} triangles",
            object.name,
            object.vertex_count(),
            object.triangle_count()
        );
        self.add_object(object)
    }

    /// Uploads any object that has no GPU resources yet
    pub fn init_gpu_resources(
        &mut self,
        device: &Device,
        queue: &Queue,
        transform_layout: &wgpu::BindGroupLayout,
        textures: &TextureBindings,
    ) {
        for object in self.objects.iter_mut().filter(|o| o.gpu_resources.is_none()) {
            object.init_gpu_resources(device, queue, transform_layout, textures);
        }
    }

    pub fn get_statistics(&self) -> SceneStatistics {
        SceneStatistics {
            object_count: self.objects.len(),
            total_vertices: self.objects.iter().map(Object::vertex_count).sum(),
            total_triangles: self.objects.iter().map(Object::triangle_count).sum(),
        }
    }
}

/// Scene statistics for the overlay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SceneStatistics {
    pub object_count: usize,
    pub total_vertices: usize,
    pub total_triangles: usize,
}

use cgmath::{Matrix4, SquareMatrix};
use winit::event::DeviceEvent;

use super::{camera_controller::CameraController, fps_camera::FirstPersonCamera};

pub struct CameraManager {
    pub camera: FirstPersonCamera,
    pub controller: CameraController,
}

impl CameraManager {
    pub fn new(camera: FirstPersonCamera, controller: CameraController) -> Self {
        Self { camera, controller }
    }

    /// Feeds raw device input (mouse motion) to the look controller
    pub fn process_event(&mut self, event: &DeviceEvent) {
        self.controller.process_events(event, &mut self.camera);
    }
}

pub trait Camera: Sized {
    fn build_view_projection_matrix(&self) -> Matrix4<f32>;
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable, Debug)]
pub struct CameraUniform {
    /// The eye position of the camera in homogenous coordinates.
    ///
    /// Homogenous coordinates are used to fullfill the 16 byte alignment requirement.
    pub view_position: [f32; 4],

    /// Contains the view projection matrix.
    pub view_proj: [[f32; 4]; 4],
}

impl Default for CameraUniform {
    /// Creates a default [CameraUniform].
    fn default() -> Self {
        Self {
            view_position: [0.0; 4],
            view_proj: Matrix4::identity().into(),
        }
    }
}

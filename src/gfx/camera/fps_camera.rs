use super::camera_utils::{Camera, CameraUniform};
use crate::walk::frame::CameraRig;
use cgmath::*;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

/// Pitch stays just inside straight up/down so the view basis never degenerates
const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 1e-4;

/// First-person camera: a position plus yaw/pitch
///
/// Yaw rotates about +Y, pitch about the camera's right axis. With zero yaw
/// and pitch the camera looks down -Z.
#[derive(Debug, Clone, Copy)]
pub struct FirstPersonCamera {
    pub position: Vector3<f32>,
    pub yaw: f32,
    pub pitch: f32,
    pub up: Vector3<f32>,
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
    pub uniform: CameraUniform,
}

impl Camera for FirstPersonCamera {
    fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        let eye = Point3::from_vec(self.position);
        let view = Matrix4::look_to_rh(eye, self.look_direction(), self.up);
        let proj =
            OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar);
        proj * view
    }
}

impl FirstPersonCamera {
    pub fn new(position: Vector3<f32>, yaw: f32, fovy: Deg<f32>, aspect: f32) -> Self {
        Self {
            position,
            yaw,
            pitch: 0.0,
            up: Vector3::unit_y(),
            aspect,
            fovy: fovy.into(),
            znear: 0.1,
            zfar: 2000.0,
            uniform: CameraUniform::default(),
        }
    }

    /// Unit vector the camera is looking along
    pub fn look_direction(&self) -> Vector3<f32> {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        Vector3::new(-sin_yaw * cos_pitch, sin_pitch, -cos_yaw * cos_pitch)
    }

    /// Camera right axis; always horizontal
    pub fn right_vector(&self) -> Vector3<f32> {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        Vector3::new(cos_yaw, 0.0, -sin_yaw)
    }

    /// Forward on the ground plane: up × right, ignoring pitch
    pub fn horizontal_forward(&self) -> Vector3<f32> {
        Vector3::unit_y().cross(self.right_vector())
    }

    pub fn add_yaw(&mut self, delta: f32) {
        self.yaw += delta;
    }

    pub fn add_pitch(&mut self, delta: f32) {
        self.pitch = (self.pitch + delta).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    pub fn resize_projection(&mut self, width: u32, height: u32) {
        if height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn update_view_proj(&mut self) {
        self.uniform.view_position = [self.position.x, self.position.y, self.position.z, 1.0];
        self.uniform.view_proj = self.build_view_projection_matrix().into();
    }
}

impl CameraRig for FirstPersonCamera {
    fn position(&self) -> Vector3<f32> {
        self.position
    }

    fn set_position(&mut self, position: Vector3<f32>) {
        self.position = position;
    }

    fn move_forward(&mut self, distance: f32) {
        self.position += self.horizontal_forward() * distance;
    }

    fn move_right(&mut self, distance: f32) {
        self.position += self.right_vector() * distance;
    }
}

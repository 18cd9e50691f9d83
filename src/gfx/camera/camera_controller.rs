use log::{info, warn};
use winit::{
    event::DeviceEvent,
    window::{CursorGrabMode, Window},
};

use super::fps_camera::FirstPersonCamera;

/// Radians of rotation per pixel of mouse travel
pub const DEFAULT_LOOK_SENSITIVITY: f32 = 0.002;

/// Pointer-lock state
///
/// The first click engages the lock. From then on, whenever the lock is lost
/// (focus change, OS escape) it is requested again as soon as possible; there
/// is no paused state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PointerLock {
    engaged: bool,
    locked: bool,
}

impl PointerLock {
    /// A click inside the window. Returns `true` if the cursor should be grabbed.
    pub fn on_click(&mut self) -> bool {
        self.engaged = true;
        !self.locked
    }

    /// Focus changed. Returns `true` if the cursor should be grabbed again.
    pub fn on_focus_changed(&mut self, focused: bool) -> bool {
        if focused {
            self.engaged && !self.locked
        } else {
            if self.locked {
                info!("Pointer unlocked");
            }
            self.locked = false;
            false
        }
    }

    /// Records the outcome of a grab attempt
    pub fn set_locked(&mut self, locked: bool) {
        if locked && !self.locked {
            info!("Pointer locked");
        }
        self.locked = locked;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }
}

/// Grabs and hides the cursor, preferring a true lock over confinement
///
/// # Arguments
/// * `window` - Window that owns the cursor
///
/// Returns `false` when the platform refused both grab modes.
pub fn grab_cursor(window: &Window) -> bool {
    let grabbed = window
        .set_cursor_grab(CursorGrabMode::Locked)
        .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));

    match grabbed {
        Ok(()) => {
            window.set_cursor_visible(false);
            true
        }
        Err(err) => {
            warn!("Failed to grab cursor: {}", err);
            false
        }
    }
}

/// Mouse-look controller for a [`FirstPersonCamera`]
pub struct CameraController {
    pub look_sensitivity: f32,
    pub pointer: PointerLock,
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(DEFAULT_LOOK_SENSITIVITY)
    }
}

impl CameraController {
    pub fn new(look_sensitivity: f32) -> Self {
        Self {
            look_sensitivity,
            pointer: PointerLock::default(),
        }
    }

    /// Applies raw mouse motion to the camera while the pointer is locked
    pub fn process_events(&mut self, event: &DeviceEvent, camera: &mut FirstPersonCamera) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.look(*delta, camera);
        }
    }

    /// Rotates the camera by a mouse delta in pixels
    ///
    /// # Arguments
    /// * `delta` - Raw mouse motion `(x, y)`; positive x turns right, positive y looks down
    /// * `camera` - Camera whose yaw and pitch are changed
    pub fn look(&self, delta: (f64, f64), camera: &mut FirstPersonCamera) {
        if !self.pointer.is_locked() {
            return;
        }
        camera.add_yaw(-delta.0 as f32 * self.look_sensitivity);
        camera.add_pitch(-delta.1 as f32 * self.look_sensitivity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Deg, Vector3, Zero};

    #[test]
    fn test_click_engages_lock() {
        let mut pointer = PointerLock::default();
        assert!(!pointer.on_focus_changed(true));
        assert!(pointer.on_click());
        pointer.set_locked(true);
        assert!(pointer.is_locked());
        assert!(!pointer.on_click());
    }

    #[test]
    fn test_relocks_after_focus_loss() {
        let mut pointer = PointerLock::default();
        pointer.on_click();
        pointer.set_locked(true);

        assert!(!pointer.on_focus_changed(false));
        assert!(!pointer.is_locked());
        assert!(pointer.on_focus_changed(true));
    }

    #[test]
    fn test_look_ignored_until_locked() {
        let mut controller = CameraController::default();
        let mut camera = FirstPersonCamera::new(Vector3::zero(), 0.0, Deg(25.0), 1.0);

        controller.look((100.0, 50.0), &mut camera);
        assert_eq!(camera.yaw, 0.0);
        assert_eq!(camera.pitch, 0.0);

        controller.pointer.on_click();
        controller.pointer.set_locked(true);
        controller.look((100.0, 50.0), &mut camera);
        assert!((camera.yaw - -0.2).abs() < 1e-6);
        assert!((camera.pitch - -0.1).abs() < 1e-6);
    }
}

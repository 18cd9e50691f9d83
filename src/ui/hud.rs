// src/ui/hud.rs
//! Read-only status overlay
//!
//! Shows the camera pose, current speed, obstacle counts and asset load
//! progress. Toggled at runtime; nothing in it is interactive.

use cgmath::Vector3;

use crate::assets::loader::LoadProgress;

/// Values shown by the overlay for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HudSnapshot {
    pub position: Vector3<f32>,
    pub yaw: f32,
    pub pitch: f32,
    pub speed: f32,
    pub blocked: bool,
    pub walls: usize,
    pub cars: usize,
    pub loads: LoadProgress,
    pub pointer_locked: bool,
}

impl HudSnapshot {
    pub fn load_status(&self) -> String {
        let loads = &self.loads;
        if loads.is_complete() {
            if loads.failed == 0 {
                format!("all {} assets loaded", loads.loaded)
            } else {
                format!("{} loaded, {} failed", loads.loaded, loads.failed)
            }
        } else {
            format!("loading {}/{}", loads.loaded + loads.failed, loads.requested)
        }
    }

    pub fn pointer_hint(&self) -> &'static str {
        if self.pointer_locked {
            "mouse look active"
        } else {
            "click to look around"
        }
    }
}

/// Draws the overlay in the top-left corner
///
/// # Arguments
/// * `ui` - ImGui frame being built
/// * `hud` - Values captured after this frame's movement step
pub fn render_hud(ui: &imgui::Ui, hud: &HudSnapshot) {
    ui.window("Showroom")
        .position([10.0, 10.0], imgui::Condition::Always)
        .always_auto_resize(true)
        .no_decoration()
        .no_inputs()
        .bg_alpha(0.35)
        .build(|| {
            let p = hud.position;
            ui.text(format!("pos   {:7.2} {:7.2} {:7.2}", p.x, p.y, p.z));
            ui.text(format!(
                "look  yaw {:6.1}  pitch {:5.1}",
                hud.yaw.to_degrees(),
                hud.pitch.to_degrees()
            ));
            ui.text(format!("speed {:5.2}", hud.speed));
            if hud.blocked {
                ui.text_colored([1.0, 0.45, 0.3, 1.0], "blocked");
            }
            ui.separator();
            ui.text(format!("obstacles  {} walls, {} cars", hud.walls, hud.cars));
            ui.text(hud.load_status());
            ui.text_disabled(hud.pointer_hint());
        });
}

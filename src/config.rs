//! Walkthrough configuration
//!
//! Every field has a default matching the stock showroom, so a config file
//! only needs to name what it changes. Files are JSON.

use std::{f32::consts::PI, fs, path::Path};

use cgmath::Vector3;
use serde::{Deserialize, Serialize};

use crate::{
    error::ConfigError,
    walk::{
        collision::CollisionGate,
        frame::DEFAULT_MAX_FRAME_DT,
        input::KeyBindings,
        movement::{MovementIntegrator, DEFAULT_ACCELERATION, DEFAULT_DAMPING},
    },
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkthroughConfig {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub movement: MovementConfig,
    pub collision: CollisionConfig,
    pub lighting: LightingConfig,
    pub controls: KeyBindings,
    pub assets: AssetConfig,
}

impl WalkthroughConfig {
    /// Reads a JSON config file; missing fields take their defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Parses JSON text and checks the result with [`Self::validate`]
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the walkthrough cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.movement.validate()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
    /// Shows the debug overlay at startup
    pub show_hud: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Showroom".to_string(),
            width: 1280,
            height: 720,
            vsync: true,
            show_hud: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    /// Radians about +Y; zero looks down -Z
    pub yaw: f32,
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Radians per pixel of mouse travel
    pub look_sensitivity: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [10.0, 1.0, -5.0],
            yaw: PI / 2.0,
            fov_degrees: 25.0,
            near: 0.1,
            far: 2000.0,
            look_sensitivity: 0.002,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    pub damping: f32,
    pub acceleration: f32,
    /// Longest frame time fed to the integrator, in seconds
    pub max_frame_dt: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            damping: DEFAULT_DAMPING,
            acceleration: DEFAULT_ACCELERATION,
            max_frame_dt: DEFAULT_MAX_FRAME_DT,
        }
    }
}

impl MovementConfig {
    /// Idle velocity is scaled by `1 - damping * dt` each frame, so the
    /// longest frame must keep that factor within `[0, 1]`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::Invalid {
            section: "movement",
            reason,
        };

        if self.damping.is_nan() || self.damping < 0.0 {
            return Err(invalid(format!("damping {} must be >= 0", self.damping)));
        }
        if self.acceleration.is_nan() || self.acceleration < 0.0 {
            return Err(invalid(format!(
                "acceleration {} must be >= 0",
                self.acceleration
            )));
        }
        if self.max_frame_dt.is_nan() || self.max_frame_dt <= 0.0 {
            return Err(invalid(format!(
                "max_frame_dt {} must be > 0",
                self.max_frame_dt
            )));
        }
        if self.damping * self.max_frame_dt > 1.0 {
            return Err(invalid(format!(
                "damping {} * max_frame_dt {} exceeds 1; velocity would not decay",
                self.damping, self.max_frame_dt
            )));
        }
        Ok(())
    }

    pub fn integrator(&self) -> MovementIntegrator {
        MovementIntegrator::new(self.damping, self.acceleration)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// Width, height, depth of the camera's body volume
    pub body_size: [f32; 3],
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            body_size: [1.0, 2.0, 1.0],
        }
    }
}

impl CollisionConfig {
    pub fn gate(&self) -> CollisionGate {
        CollisionGate::new(Vector3::from(self.body_size))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    pub ambient_color: [f32; 3],
    pub ambient_intensity: f32,
    /// Direction the key light shines towards
    pub key_direction: [f32; 3],
    /// Zero leaves the scene lit by ambient light alone
    pub key_intensity: f32,
    pub clear_color: [f64; 3],
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            ambient_color: [1.0, 1.0, 1.0],
            ambient_intensity: 1.0,
            key_direction: [-0.3, -1.0, -0.4],
            key_intensity: 0.0,
            clear_color: [0.1, 0.1, 0.1],
        }
    }
}

/// Horizontal axis a wall runs along
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WallAxis {
    X,
    Z,
}

/// Room measurement a wall length or offset is taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomDimension {
    /// Room extent along X
    Width,
    /// Room extent along Z
    Length,
}

/// Horizontal coordinate of a wall center: a fixed value, or a fraction of a
/// room dimension
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WallOffset {
    Fixed(f32),
    Scaled { dimension: RoomDimension, factor: f32 },
}

/// One invisible collision wall, placed relative to the measured room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallSpec {
    pub name: String,
    pub center_x: WallOffset,
    pub center_z: WallOffset,
    pub runs_along: WallAxis,
    pub span: RoomDimension,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarSpec {
    pub name: String,
    pub model: String,
    pub position: [f32; 3],
    /// Radians about +Y
    pub yaw: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    pub room_model: String,
    pub walls: Vec<WallSpec>,
    pub cars: Vec<CarSpec>,
    /// Largest dimension every car is scaled to
    pub car_target_size: f32,
}

impl Default for AssetConfig {
    fn default() -> Self {
        use RoomDimension::{Length, Width};
        use WallOffset::{Fixed, Scaled};

        let wall = |name: &str, center_x, center_z, runs_along, span| WallSpec {
            name: name.to_string(),
            center_x,
            center_z,
            runs_along,
            span,
        };

        Self {
            room_model: "assets/room/scene.gltf".to_string(),
            walls: vec![
                wall("back", Fixed(7.0), Fixed(-1.0), WallAxis::X, Width),
                wall(
                    "left",
                    Fixed(-5.0),
                    Scaled { dimension: Length, factor: -0.5 },
                    WallAxis::Z,
                    Length,
                ),
                wall(
                    "right",
                    Fixed(18.0),
                    Scaled { dimension: Length, factor: -0.5 },
                    WallAxis::Z,
                    Length,
                ),
                wall(
                    "front",
                    Fixed(7.0),
                    Scaled { dimension: Width, factor: -0.5 },
                    WallAxis::X,
                    Width,
                ),
            ],
            cars: vec![
                CarSpec {
                    name: "Porsche 911 Targa".to_string(),
                    model: "assets/cars/porsche_911_targa/scene.gltf".to_string(),
                    position: [0.0, 0.8, 0.0],
                    yaw: PI - PI / 3.0,
                },
                CarSpec {
                    name: "Porsche Cayenne Turbo".to_string(),
                    model: "assets/cars/porsche_cayenne_turbo/scene.gltf".to_string(),
                    position: [-2.0, 0.0, -10.0],
                    yaw: PI / 3.0,
                },
            ],
            car_target_size: 5.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::keyboard::KeyCode;

    #[test]
    fn test_defaults_match_stock_showroom() {
        let config = WalkthroughConfig::default();
        assert_eq!(config.camera.position, [10.0, 1.0, -5.0]);
        assert_eq!(config.camera.fov_degrees, 25.0);
        assert_eq!(config.movement.damping, 10.0);
        assert_eq!(config.movement.acceleration, 100.0);
        assert_eq!(config.collision.body_size, [1.0, 2.0, 1.0]);
        assert_eq!(config.controls.forward, KeyCode::KeyW);
        assert_eq!(config.assets.walls.len(), 4);
        assert_eq!(config.assets.cars.len(), 2);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = WalkthroughConfig::from_json(
            r#"{
                "movement": { "acceleration": 50.0 },
                "controls": { "forward": "ArrowUp" }
            }"#,
        )
        .expect("valid config");

        assert_eq!(config.movement.acceleration, 50.0);
        assert_eq!(config.movement.damping, 10.0);
        assert_eq!(config.controls.forward, KeyCode::ArrowUp);
        assert_eq!(config.controls.backward, KeyCode::KeyS);
        assert_eq!(config.assets, AssetConfig::default());
    }

    #[test]
    fn test_json_round_trip() {
        let config = WalkthroughConfig::default();
        let text = config.to_json().expect("serializes");
        let parsed = WalkthroughConfig::from_json(&text).expect("parses");
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_load_reports_missing_file() {
        let path = std::env::temp_dir().join("showroom-config-that-does-not-exist.json");
        let err = WalkthroughConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_load_reports_bad_json() {
        let path = std::env::temp_dir().join(format!("showroom-bad-{}.json", std::process::id()));
        fs::write(&path, "{ not json").expect("temp file");
        let err = WalkthroughConfig::load(&path).unwrap_err();
        let _ = fs::remove_file(&path);
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_rejects_frame_cap_that_undoes_damping() {
        let err = WalkthroughConfig::from_json(r#"{ "movement": { "max_frame_dt": 0.25 } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { section: "movement", .. }));

        for movement in [
            r#"{ "damping": -1.0 }"#,
            r#"{ "max_frame_dt": 0.0 }"#,
            r#"{ "acceleration": -5.0 }"#,
        ] {
            let text = format!(r#"{{ "movement": {} }}"#, movement);
            assert!(
                WalkthroughConfig::from_json(&text).is_err(),
                "accepted {}",
                movement
            );
        }

        // Exactly at the limit velocity stops in one idle frame
        let config =
            WalkthroughConfig::from_json(r#"{ "movement": { "damping": 10.0, "max_frame_dt": 0.1 } }"#)
                .expect("boundary is valid");
        assert_eq!(config.movement.max_frame_dt, 0.1);
    }

    #[test]
    fn test_accepted_movement_config_always_decays() {
        use crate::walk::{frame::FrameClock, input::InputState, movement::MotionState};

        let config =
            WalkthroughConfig::from_json(r#"{ "movement": { "damping": 4.0, "max_frame_dt": 0.25 } }"#)
                .expect("valid config");
        let integrator = config.movement.integrator();
        let clock = FrameClock::new(config.movement.max_frame_dt);

        let mut motion = MotionState::default();
        motion.velocity = Vector3::new(3.0, 0.0, 4.0);
        let mut previous = motion.speed();
        for _ in 0..20 {
            // Every frame stalls well past the cap
            integrator.advance(&InputState::default(), &mut motion, clock.clamp(2.0));
            assert!(motion.speed() <= previous, "idle velocity grew to {}", motion.speed());
            previous = motion.speed();
        }
    }

    #[test]
    fn test_load_rejects_invalid_movement() {
        let path = std::env::temp_dir().join(format!("showroom-fast-{}.json", std::process::id()));
        fs::write(&path, r#"{ "movement": { "damping": 30.0 } }"#).expect("temp file");
        let err = WalkthroughConfig::load(&path).unwrap_err();
        let _ = fs::remove_file(&path);
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }
}

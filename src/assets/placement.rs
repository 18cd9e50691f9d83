//! Turning loaded model bounds into world placements and obstacle volumes

use cgmath::{Matrix4, Rad, Vector3};

use crate::{
    config::{CarSpec, RoomDimension, WallAxis, WallOffset, WallSpec},
    walk::{
        collision::Aabb,
        world::{Obstacle, ObstacleKind},
    },
};

/// Measured size of the room model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoomDimensions {
    /// Extent along X
    pub width: f32,
    /// Extent along Y
    pub height: f32,
    /// Extent along Z
    pub length: f32,
}

impl RoomDimensions {
    pub fn from_bounds(bounds: &Aabb) -> Self {
        let size = bounds.size();
        Self {
            width: size.x,
            height: size.y,
            length: size.z,
        }
    }

    pub fn get(&self, dimension: RoomDimension) -> f32 {
        match dimension {
            RoomDimension::Width => self.width,
            RoomDimension::Length => self.length,
        }
    }

    fn resolve(&self, offset: WallOffset) -> f32 {
        match offset {
            WallOffset::Fixed(value) => value,
            WallOffset::Scaled { dimension, factor } => self.get(dimension) * factor,
        }
    }
}

impl WallSpec {
    /// Zero-thickness box standing on y = 0 and as tall as the room
    pub fn volume(&self, room: &RoomDimensions) -> Aabb {
        let center = Vector3::new(
            room.resolve(self.center_x),
            room.height * 0.5,
            room.resolve(self.center_z),
        );
        let span = room.get(self.span);
        let size = match self.runs_along {
            WallAxis::X => Vector3::new(span, room.height, 0.0),
            WallAxis::Z => Vector3::new(0.0, room.height, span),
        };
        Aabb::from_center_and_size(center, size)
    }
}

/// Collision walls for a room of the given size
pub fn build_walls(room: &RoomDimensions, specs: &[WallSpec]) -> Vec<Obstacle> {
    specs
        .iter()
        .map(|spec| Obstacle::new(spec.name.clone(), ObstacleKind::Wall, spec.volume(room)))
        .collect()
}

/// Uniform scale that makes the largest dimension of `bounds` equal `target`
///
/// Degenerate bounds keep their native scale.
pub fn fit_scale(bounds: &Aabb, target: f32) -> f32 {
    let size = bounds.size();
    let largest = size.x.max(size.y).max(size.z);
    if largest > f32::EPSILON {
        target / largest
    } else {
        1.0
    }
}

/// Translation, yaw and uniform scale for one car
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: Vector3<f32>,
    pub yaw: f32,
    pub scale: f32,
}

impl Placement {
    pub fn for_car(spec: &CarSpec, bounds: &Aabb, target_size: f32) -> Self {
        Self {
            position: Vector3::from(spec.position),
            yaw: spec.yaw,
            scale: fit_scale(bounds, target_size),
        }
    }

    /// Model matrix, applied as scale then yaw then translation
    pub fn matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * Matrix4::from_angle_y(Rad(self.yaw))
            * Matrix4::from_scale(self.scale)
    }

    /// World-space obstacle for a model with local `bounds`
    pub fn obstacle(&self, label: impl Into<String>, bounds: &Aabb) -> Obstacle {
        Obstacle::new(label, ObstacleKind::Car, bounds.transformed(&self.matrix()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AssetConfig;
    use std::f32::consts::PI;

    fn assert_vec_eq(a: Vector3<f32>, b: Vector3<f32>) {
        assert!(
            (a.x - b.x).abs() < 1e-4 && (a.y - b.y).abs() < 1e-4 && (a.z - b.z).abs() < 1e-4,
            "{:?} != {:?}",
            a,
            b
        );
    }

    #[test]
    fn test_default_walls_from_room_size() {
        let room = RoomDimensions {
            width: 30.0,
            height: 6.0,
            length: 40.0,
        };
        let walls = build_walls(&room, &AssetConfig::default().walls);
        assert_eq!(walls.len(), 4);
        assert!(walls.iter().all(|w| w.kind == ObstacleKind::Wall));

        let back = &walls[0].volume;
        assert_vec_eq(back.min, Vector3::new(-8.0, 0.0, -1.0));
        assert_vec_eq(back.max, Vector3::new(22.0, 6.0, -1.0));

        let left = &walls[1].volume;
        assert_vec_eq(left.min, Vector3::new(-5.0, 0.0, -40.0));
        assert_vec_eq(left.max, Vector3::new(-5.0, 6.0, 0.0));

        let right = &walls[2].volume;
        assert_vec_eq(right.center(), Vector3::new(18.0, 3.0, -20.0));

        let front = &walls[3].volume;
        assert_vec_eq(front.center(), Vector3::new(7.0, 3.0, -15.0));
        assert_vec_eq(front.size(), Vector3::new(30.0, 6.0, 0.0));
    }

    #[test]
    fn test_room_dimensions_from_bounds() {
        let bounds = Aabb::new(Vector3::new(-5.0, 0.0, -20.0), Vector3::new(15.0, 4.0, 2.0));
        let room = RoomDimensions::from_bounds(&bounds);
        assert_eq!(room.width, 20.0);
        assert_eq!(room.height, 4.0);
        assert_eq!(room.length, 22.0);
    }

    #[test]
    fn test_fit_scale_uses_largest_dimension() {
        let bounds = Aabb::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(2.0, 1.0, 4.0));
        assert!((fit_scale(&bounds, 5.0) - 1.25).abs() < 1e-6);

        let flat = Aabb::new(Vector3::new(1.0, 1.0, 1.0), Vector3::new(1.0, 1.0, 1.0));
        assert_eq!(fit_scale(&flat, 5.0), 1.0);
    }

    #[test]
    fn test_car_obstacle_is_scaled_and_placed() {
        let bounds = Aabb::new(Vector3::new(-1.0, 0.0, -2.0), Vector3::new(1.0, 1.0, 2.0));
        let spec = CarSpec {
            name: "test".into(),
            model: "car.obj".into(),
            position: [-2.0, 0.0, -10.0],
            yaw: 0.0,
        };
        let placement = Placement::for_car(&spec, &bounds, 5.0);
        let obstacle = placement.obstacle(spec.name.clone(), &bounds);

        assert_eq!(obstacle.kind, ObstacleKind::Car);
        let size = obstacle.volume.size();
        assert!((size.x.max(size.y).max(size.z) - 5.0).abs() < 1e-4);
        assert_vec_eq(obstacle.volume.min, Vector3::new(-3.25, 0.0, -12.5));
        assert_vec_eq(obstacle.volume.max, Vector3::new(-0.75, 1.25, -7.5));
    }

    #[test]
    fn test_quarter_turn_swaps_footprint() {
        let bounds = Aabb::new(Vector3::new(-1.0, 0.0, -2.0), Vector3::new(1.0, 1.0, 2.0));
        let placement = Placement {
            position: Vector3::new(0.0, 0.0, 0.0),
            yaw: PI / 2.0,
            scale: 1.0,
        };
        let volume = placement.obstacle("turned", &bounds).volume;
        assert_vec_eq(volume.size(), Vector3::new(4.0, 1.0, 2.0));
    }
}

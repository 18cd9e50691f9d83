//! Axis-aligned bounding volumes and the collision gate
//!
//! The gate is deliberately all-or-nothing: a proposed camera position is
//! either accepted as-is or rejected in favour of the previous position. There
//! is no sliding along walls and no push-out. The test is discrete, so a
//! displacement larger than an obstacle's thickness in a single frame can pass
//! straight through it.

use cgmath::{Matrix4, Point3, Transform, Vector3};

/// Axis-aligned bounding box
///
/// Constructors keep `min <= max` on every axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the box
    pub min: Vector3<f32>,
    /// Maximum corner of the box
    pub max: Vector3<f32>,
}

impl Aabb {
    /// Create a box from two opposite corners in any order
    pub fn new(a: Vector3<f32>, b: Vector3<f32>) -> Self {
        Self {
            min: Vector3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Vector3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Create a box centered on `center` with full extents `size`
    pub fn from_center_and_size(center: Vector3<f32>, size: Vector3<f32>) -> Self {
        let half = size * 0.5;
        Self::new(center - half, center + half)
    }

    /// Smallest box containing every point, or `None` for an empty slice
    pub fn from_points(points: &[Vector3<f32>]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut min = *first;
        let mut max = *first;

        for p in rest {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
        }

        Some(Self { min, max })
    }

    /// The eight corners of the box
    pub fn corners(&self) -> [Vector3<f32>; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            Vector3::new(lo.x, lo.y, lo.z),
            Vector3::new(hi.x, lo.y, lo.z),
            Vector3::new(lo.x, hi.y, lo.z),
            Vector3::new(hi.x, hi.y, lo.z),
            Vector3::new(lo.x, lo.y, hi.z),
            Vector3::new(hi.x, lo.y, hi.z),
            Vector3::new(lo.x, hi.y, hi.z),
            Vector3::new(hi.x, hi.y, hi.z),
        ]
    }

    /// World-space box enclosing this box after `transform`
    ///
    /// Transforms the eight corners and re-fits, so rotated boxes grow.
    pub fn transformed(&self, transform: &Matrix4<f32>) -> Self {
        let corners = self.corners().map(|c| {
            let p = transform.transform_point(Point3::new(c.x, c.y, c.z));
            Vector3::new(p.x, p.y, p.z)
        });
        // Eight corners are never empty
        Self::from_points(&corners).unwrap_or(*self)
    }

    /// Full extents along each axis
    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }

    pub fn center(&self) -> Vector3<f32> {
        (self.min + self.max) * 0.5
    }

    /// Interval overlap on all three axes; touching faces count as overlap
    pub fn intersects(&self, other: &Aabb) -> bool {
        !(other.max.x < self.min.x
            || other.min.x > self.max.x
            || other.max.y < self.min.y
            || other.min.y > self.max.y
            || other.max.z < self.min.z
            || other.min.z > self.max.z)
    }

    /// Whether `other` lies entirely inside this box
    pub fn contains(&self, other: &Aabb) -> bool {
        self.min.x <= other.min.x
            && other.max.x <= self.max.x
            && self.min.y <= other.min.y
            && other.max.y <= self.max.y
            && self.min.z <= other.min.z
            && other.max.z <= self.max.z
    }
}

/// Rejects camera moves whose body volume would overlap an obstacle
#[derive(Debug, Clone, Copy)]
pub struct CollisionGate {
    /// Full extents of the camera body (width, height, depth)
    pub body_size: Vector3<f32>,
}

impl Default for CollisionGate {
    fn default() -> Self {
        Self {
            body_size: Vector3::new(1.0, 2.0, 1.0),
        }
    }
}

impl CollisionGate {
    pub fn new(body_size: Vector3<f32>) -> Self {
        Self { body_size }
    }

    /// Body volume of a camera standing at `position`
    pub fn camera_volume(&self, position: Vector3<f32>) -> Aabb {
        Aabb::from_center_and_size(position, self.body_size)
    }

    /// Returns the first obstacle the body at `position` overlaps
    pub fn first_hit<'a, I>(&self, position: Vector3<f32>, obstacles: I) -> Option<&'a Aabb>
    where
        I: IntoIterator<Item = &'a Aabb>,
    {
        let body = self.camera_volume(position);
        obstacles.into_iter().find(|obstacle| body.intersects(obstacle))
    }

    /// Accepts `new_position` unless its body volume overlaps any obstacle,
    /// in which case `prev_position` is returned unchanged
    pub fn check_and_resolve<'a, I>(
        &self,
        prev_position: Vector3<f32>,
        new_position: Vector3<f32>,
        obstacles: I,
    ) -> Vector3<f32>
    where
        I: IntoIterator<Item = &'a Aabb>,
    {
        match self.first_hit(new_position, obstacles) {
            Some(_) => prev_position,
            None => new_position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn v(x: f32, y: f32, z: f32) -> Vector3<f32> {
        Vector3::new(x, y, z)
    }

    fn random_box(rng: &mut StdRng) -> Aabb {
        let a = v(
            rng.random_range(-20.0..20.0),
            rng.random_range(-20.0..20.0),
            rng.random_range(-20.0..20.0),
        );
        let b = v(
            rng.random_range(-20.0..20.0),
            rng.random_range(-20.0..20.0),
            rng.random_range(-20.0..20.0),
        );
        Aabb::new(a, b)
    }

    #[test]
    fn test_new_orders_corners() {
        let aabb = Aabb::new(v(1.0, -2.0, 3.0), v(-1.0, 2.0, -3.0));
        assert_eq!(aabb.min, v(-1.0, -2.0, -3.0));
        assert_eq!(aabb.max, v(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_camera_volume_extent() {
        let gate = CollisionGate::default();
        let body = gate.camera_volume(v(0.0, 1.0, 0.0));
        assert_eq!(body.min, v(-0.5, 0.0, -0.5));
        assert_eq!(body.max, v(0.5, 2.0, 0.5));
    }

    #[test]
    fn test_from_points_empty() {
        assert!(Aabb::from_points(&[]).is_none());
    }

    #[test]
    fn test_touching_faces_overlap() {
        let a = Aabb::new(v(0.0, 0.0, 0.0), v(1.0, 1.0, 1.0));
        let b = Aabb::new(v(1.0, 0.0, 0.0), v(2.0, 1.0, 1.0));
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn test_zero_thickness_wall_blocks() {
        let wall = Aabb::new(v(-5.0, 0.0, -1.0), v(19.0, 3.0, -1.0));
        let gate = CollisionGate::default();
        assert!(gate.first_hit(v(0.0, 1.0, -1.2), [&wall]).is_some());
        assert!(gate.first_hit(v(0.0, 1.0, 0.0), [&wall]).is_none());
    }

    #[test]
    fn test_rejects_move_into_wall() {
        let gate = CollisionGate::default();
        let wall = Aabb::new(v(6.0, 0.0, -10.0), v(8.0, 4.0, 10.0));
        let prev = v(0.0, 1.0, 0.0);

        let resolved = gate.check_and_resolve(prev, v(6.2, 1.0, 0.0), [&wall]);
        assert_eq!(resolved, prev);

        // Short of the wall the move is accepted
        let resolved = gate.check_and_resolve(prev, v(5.0, 1.0, 0.0), [&wall]);
        assert_eq!(resolved, v(5.0, 1.0, 0.0));
    }

    #[test]
    fn test_empty_obstacle_set_accepts_everything() {
        let gate = CollisionGate::default();
        let obstacles: Vec<Aabb> = Vec::new();
        let target = v(123.0, -4.0, 9.5);
        assert_eq!(
            gate.check_and_resolve(v(0.0, 1.0, 0.0), target, &obstacles),
            target
        );
    }

    #[test]
    fn test_any_single_overlap_reverts() {
        let gate = CollisionGate::default();
        let far = Aabb::new(v(50.0, 0.0, 50.0), v(51.0, 1.0, 51.0));
        let hit = Aabb::new(v(2.0, 0.0, -1.0), v(3.0, 2.0, 1.0));
        let prev = v(0.0, 1.0, 0.0);
        let next = v(2.2, 1.0, 0.0);

        assert_eq!(gate.check_and_resolve(prev, next, [&far, &hit]), prev);
        assert_eq!(gate.check_and_resolve(prev, next, [&hit, &far]), prev);
    }

    #[test]
    fn test_gate_is_idempotent() {
        let mut rng = StdRng::seed_from_u64(7);
        let gate = CollisionGate::default();

        for _ in 0..200 {
            let obstacles: Vec<Aabb> = (0..4).map(|_| random_box(&mut rng)).collect();
            let prev = v(rng.random_range(-20.0..20.0), 1.0, rng.random_range(-20.0..20.0));
            let next = prev + v(rng.random_range(-3.0..3.0), 0.0, rng.random_range(-3.0..3.0));

            let first = gate.check_and_resolve(prev, next, &obstacles);
            let second = gate.check_and_resolve(prev, next, &obstacles);
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_separated_boxes_never_revert() {
        let mut rng = StdRng::seed_from_u64(11);
        let gate = CollisionGate::default();

        for _ in 0..200 {
            let obstacle = random_box(&mut rng);
            // Place the body strictly beyond the obstacle on a random axis
            let gap = rng.random_range(0.01..5.0);
            let mut center = obstacle.center();
            match rng.random_range(0..3) {
                0 => center.x = obstacle.max.x + gate.body_size.x * 0.5 + gap,
                1 => center.y = obstacle.min.y - gate.body_size.y * 0.5 - gap,
                _ => center.z = obstacle.max.z + gate.body_size.z * 0.5 + gap,
            }

            let prev = v(1000.0, 1000.0, 1000.0);
            assert_eq!(gate.check_and_resolve(prev, center, [&obstacle]), center);
        }
    }

    #[test]
    fn test_containment_detected_both_ways() {
        let gate = CollisionGate::default();
        let prev = v(100.0, 1.0, 100.0);

        // Obstacle fully inside the body
        let pebble = Aabb::from_center_and_size(v(0.0, 1.0, 0.0), v(0.1, 0.1, 0.1));
        assert!(gate.camera_volume(v(0.0, 1.0, 0.0)).contains(&pebble));
        assert_eq!(gate.check_and_resolve(prev, v(0.0, 1.0, 0.0), [&pebble]), prev);

        // Body fully inside the obstacle
        let hall = Aabb::new(v(-10.0, -10.0, -10.0), v(10.0, 10.0, 10.0));
        assert!(hall.contains(&gate.camera_volume(v(0.0, 1.0, 0.0))));
        assert_eq!(gate.check_and_resolve(prev, v(0.0, 1.0, 0.0), [&hall]), prev);
    }

    #[test]
    fn test_transformed_rotation_grows_box() {
        let unit = Aabb::new(v(-1.0, 0.0, -2.0), v(1.0, 1.0, 2.0));
        let rotated = unit.transformed(&Matrix4::from_angle_y(cgmath::Deg(90.0)));
        assert!((rotated.min.x - -2.0).abs() < 1e-5);
        assert!((rotated.max.x - 2.0).abs() < 1e-5);
        assert!((rotated.min.z - -1.0).abs() < 1e-5);
        assert!((rotated.max.z - 1.0).abs() < 1e-5);
    }
}

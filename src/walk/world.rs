//! Static obstacles the camera cannot enter
//!
//! Obstacles arrive one asset at a time as background loads finish. Nothing
//! waits for the full set: collision simply starts working against an asset
//! once it has been registered.

use std::fmt;

use super::collision::Aabb;

/// What an obstacle volume came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleKind {
    Wall,
    Car,
}

impl fmt::Display for ObstacleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObstacleKind::Wall => write!(f, "wall"),
            ObstacleKind::Car => write!(f, "car"),
        }
    }
}

/// A named static volume
///
/// Walls and cars never move after placement, so the world-space volume is
/// computed once when the obstacle is built.
#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    pub label: String,
    pub kind: ObstacleKind,
    pub volume: Aabb,
}

impl Obstacle {
    pub fn new(label: impl Into<String>, kind: ObstacleKind, volume: Aabb) -> Self {
        Self {
            label: label.into(),
            kind,
            volume,
        }
    }
}

/// Append-only set of registered obstacles
#[derive(Debug, Default)]
pub struct WorldState {
    obstacles: Vec<Obstacle>,
}

impl WorldState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_obstacle(&mut self, obstacle: Obstacle) {
        log::debug!(
            "Registered {} '{}' spanning {:?}..{:?}",
            obstacle.kind,
            obstacle.label,
            obstacle.volume.min,
            obstacle.volume.max
        );
        self.obstacles.push(obstacle);
    }

    pub fn register_all<I>(&mut self, obstacles: I)
    where
        I: IntoIterator<Item = Obstacle>,
    {
        for obstacle in obstacles {
            self.register_obstacle(obstacle);
        }
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Volumes of every registered obstacle, in registration order
    pub fn volumes(&self) -> impl Iterator<Item = &Aabb> + '_ {
        self.obstacles.iter().map(|o| &o.volume)
    }

    pub fn count(&self, kind: ObstacleKind) -> usize {
        self.obstacles.iter().filter(|o| o.kind == kind).count()
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }
}

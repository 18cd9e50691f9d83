//! Background asset loading
//!
//! Each model loads on its own thread and reports back over a channel. The
//! frame loop drains finished loads with [`AssetLoader::poll`] and never
//! blocks on them, so loads complete independently and in any order.

use std::{
    sync::mpsc::{self, Receiver, Sender, TryRecvError},
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use cgmath::{Matrix4, SquareMatrix};
use log::{error, info, warn};

use super::{
    model::{load_model, ModelData},
    placement::{build_walls, Placement, RoomDimensions},
};
use crate::{
    config::{AssetConfig, CarSpec, WallSpec},
    error::AssetError,
    walk::world::Obstacle,
};

/// What to load and how to place it once loaded
#[derive(Debug, Clone)]
pub enum AssetRequest {
    /// The room model; its measured size drives the collision walls
    Room { model: String, walls: Vec<WallSpec> },
    /// A car, scaled to `target_size` and placed at its configured position
    Car { spec: CarSpec, target_size: f32 },
}

impl AssetRequest {
    pub fn name(&self) -> &str {
        match self {
            AssetRequest::Room { .. } => "room",
            AssetRequest::Car { spec, .. } => &spec.name,
        }
    }

    /// Loads the model and computes its placement and obstacles
    pub fn resolve(self) -> Result<LoadedAsset, AssetError> {
        match self {
            AssetRequest::Room { model, walls } => {
                let data = load_model(&model)?;
                let bounds = data.bounds().ok_or(AssetError::Empty { path: model.into() })?;
                let room = RoomDimensions::from_bounds(&bounds);
                info!(
                    "Room measures {:.2} x {:.2} x {:.2}",
                    room.width, room.height, room.length
                );
                Ok(LoadedAsset {
                    name: "room".to_string(),
                    model: data,
                    transform: Matrix4::identity(),
                    obstacles: build_walls(&room, &walls),
                })
            }
            AssetRequest::Car { spec, target_size } => {
                let data = load_model(&spec.model)?;
                let bounds = data.bounds().ok_or(AssetError::Empty {
                    path: spec.model.clone().into(),
                })?;
                let placement = Placement::for_car(&spec, &bounds, target_size);
                let obstacle = placement.obstacle(spec.name.clone(), &bounds);
                Ok(LoadedAsset {
                    name: spec.name,
                    model: data,
                    transform: placement.matrix(),
                    obstacles: vec![obstacle],
                })
            }
        }
    }
}

/// A model ready to hand to the renderer, with its world obstacles
#[derive(Debug, Clone)]
pub struct LoadedAsset {
    pub name: String,
    pub model: ModelData,
    pub transform: Matrix4<f32>,
    pub obstacles: Vec<Obstacle>,
}

#[derive(Debug)]
pub enum AssetEvent {
    Loaded(LoadedAsset),
    Failed { name: String, error: AssetError },
}


struct PendingLoad {
    id: usize,
    name: String,
    handle: JoinHandle<()>,
}

/// Running totals for the status overlay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadProgress {
    pub requested: usize,
    pub loaded: usize,
    pub failed: usize,
}

impl LoadProgress {
    pub fn pending(&self) -> usize {
        self.requested
            .saturating_sub(self.loaded)
            .saturating_sub(self.failed)
    }

    pub fn is_complete(&self) -> bool {
        self.pending() == 0
    }
}

pub struct AssetLoader {
    sender: Sender<(usize, AssetEvent)>,
    receiver: Receiver<(usize, AssetEvent)>,
    pending: Vec<PendingLoad>,
    next_id: usize,
    progress: LoadProgress,
}

impl Default for AssetLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetLoader {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            receiver,
            pending: Vec::new(),
            next_id: 0,
            progress: LoadProgress::default(),
        }
    }

    /// Starts the room and every car from the asset config
    pub fn from_config(config: &AssetConfig) -> Self {
        let mut loader = Self::new();
        loader.request(AssetRequest::Room {
            model: config.room_model.clone(),
            walls: config.walls.clone(),
        });
        for car in &config.cars {
            loader.request(AssetRequest::Car {
                spec: car.clone(),
                target_size: config.car_target_size,
            });
        }
        loader
    }

    /// Starts loading on a worker thread
    pub fn request(&mut self, request: AssetRequest) {
        let id = self.next_id;
        self.next_id += 1;
        self.progress.requested += 1;

        let name = request.name().to_string();
        let sender = self.sender.clone();
        let spawned = thread::Builder::new()
            .name(format!("load-{}", name))
            .spawn(move || {
                let name = request.name().to_string();
                let event = match request.resolve() {
                    Ok(asset) => AssetEvent::Loaded(asset),
                    Err(error) => AssetEvent::Failed { name, error },
                };
                // Receiver gone means the app is shutting down
                let _ = sender.send((id, event));
            });

        match spawned {
            Ok(handle) => {
                info!("Loading '{}'", name);
                self.pending.push(PendingLoad { id, name, handle });
            }
            Err(source) => {
                let event = AssetEvent::Failed {
                    name: name.clone(),
                    error: AssetError::Spawn { name, source },
                };
                let _ = self.sender.send((id, event));
            }
        }
    }

    /// Drains every load that has finished since the last call
    pub fn poll(&mut self) -> Vec<AssetEvent> {
        // A worker sends before it exits, so anything finished now has its
        // event in the channel by the time the drain below runs
        let finished: Vec<usize> = self
            .pending
            .iter()
            .filter(|p| p.handle.is_finished())
            .map(|p| p.id)
            .collect();

        let mut events = Vec::new();
        self.drain_into(&mut events);
        self.reap_silent(&finished, &mut events);
        events
    }

    /// Reports loads in `finished` that exited without sending anything
    fn reap_silent(&mut self, finished: &[usize], events: &mut Vec<AssetEvent>) {
        if finished.is_empty() {
            return;
        }

        let (silent, running): (Vec<_>, Vec<_>) = self
            .pending
            .drain(..)
            .partition(|p| finished.contains(&p.id));
        self.pending = running;

        for load in silent {
            if load.handle.join().is_err() {
                warn!("Loader thread for '{}' panicked", load.name);
            }
            let event = AssetEvent::Failed {
                name: load.name.clone(),
                error: AssetError::Disconnected { name: load.name },
            };
            self.record(&event);
            events.push(event);
        }
    }

    /// Blocks until every requested load has reported or `timeout` passes
    pub fn wait(&mut self, timeout: Duration) -> Vec<AssetEvent> {
        let deadline = Instant::now() + timeout;
        let mut events = Vec::new();
        while !self.progress.is_complete() && Instant::now() < deadline {
            events.extend(self.poll());
            thread::sleep(Duration::from_millis(5));
        }
        events
    }

    pub fn progress(&self) -> LoadProgress {
        self.progress
    }

    fn drain_into(&mut self, events: &mut Vec<AssetEvent>) {
        loop {
            match self.receiver.try_recv() {
                Ok((id, event)) => {
                    if let Some(index) = self.pending.iter().position(|p| p.id == id) {
                        let load = self.pending.swap_remove(index);
                        let _ = load.handle.join();
                    }
                    self.record(&event);
                    events.push(event);
                }
                Err(TryRecvError::Empty) => break,
                // The loader holds a sender itself, so this cannot happen
                Err(TryRecvError::Disconnected) => break,
            }
        }
    }

    fn record(&mut self, event: &AssetEvent) {
        match event {
            AssetEvent::Loaded(asset) => {
                self.progress.loaded += 1;
                info!(
                    "Loaded '{}' with {} obstacle(s)",
                    asset.name,
                    asset.obstacles.len()
                );
            }
            AssetEvent::Failed { name, error } => {
                self.progress.failed += 1;
                error!("Failed to load '{}': {}", name, error);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::AssetConfig, walk::world::ObstacleKind};
    use std::fs;

    const WAIT: Duration = Duration::from_secs(10);

    fn write_box_obj(name: &str, size: [f32; 3]) -> String {
        let [x, y, z] = size;
        let path = std::env::temp_dir().join(format!("showroom-{}-{}.obj", std::process::id(), name));
        let text = format!(
            "v 0 0 0\nv {x} 0 0\nv {x} {y} 0\nv 0 {y} 0\n\
             v 0 0 {z}\nv {x} 0 {z}\nv {x} {y} {z}\nv 0 {y} {z}\n\
             f 1 2 3\nf 1 3 4\nf 5 6 7\nf 5 7 8\n"
        );
        fs::write(&path, text).expect("temp file");
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_missing_file_reports_failure() {
        let mut loader = AssetLoader::new();
        loader.request(AssetRequest::Car {
            spec: CarSpec {
                name: "ghost".into(),
                model: "/definitely/not/here.obj".into(),
                position: [0.0, 0.0, 0.0],
                yaw: 0.0,
            },
            target_size: 5.0,
        });

        let events = loader.wait(WAIT);
        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            AssetEvent::Failed { name, error: AssetError::Obj { .. } } if name == "ghost"
        ));
        assert_eq!(loader.progress().failed, 1);
        assert!(loader.progress().is_complete());
    }

    #[test]
    fn test_room_and_car_load_independently() {
        let room_path = write_box_obj("room", [30.0, 6.0, 40.0]);
        let car_path = write_box_obj("car", [2.0, 1.0, 4.0]);

        let config = AssetConfig {
            room_model: room_path.clone(),
            cars: vec![
                CarSpec {
                    name: "box car".into(),
                    model: car_path.clone(),
                    position: [0.0, 0.0, -10.0],
                    yaw: 0.0,
                },
                CarSpec {
                    name: "missing car".into(),
                    model: "/definitely/not/here.gltf".into(),
                    position: [0.0, 0.0, 0.0],
                    yaw: 0.0,
                },
            ],
            ..AssetConfig::default()
        };

        let mut loader = AssetLoader::from_config(&config);
        let events = loader.wait(WAIT);
        let _ = fs::remove_file(&room_path);
        let _ = fs::remove_file(&car_path);

        assert_eq!(events.len(), 3);
        let progress = loader.progress();
        assert_eq!((progress.loaded, progress.failed), (2, 1));

        let room = events
            .iter()
            .find_map(|e| match e {
                AssetEvent::Loaded(asset) if asset.name == "room" => Some(asset),
                _ => None,
            })
            .expect("room loaded");
        assert_eq!(room.obstacles.len(), 4);
        assert!(room.obstacles.iter().all(|o| o.kind == ObstacleKind::Wall));

        let car = events
            .iter()
            .find_map(|e| match e {
                AssetEvent::Loaded(asset) if asset.name == "box car" => Some(asset),
                _ => None,
            })
            .expect("car loaded");
        assert_eq!(car.obstacles.len(), 1);
        let size = car.obstacles[0].volume.size();
        assert!((size.z - 5.0).abs() < 1e-4);
    }

    /// Registers a worker that runs `work` and waits for it to exit
    fn finished_worker<F>(loader: &mut AssetLoader, name: &str, work: F)
    where
        F: FnOnce(usize, Sender<(usize, AssetEvent)>) + Send + 'static,
    {
        let id = loader.next_id;
        loader.next_id += 1;
        loader.progress.requested += 1;

        let sender = loader.sender.clone();
        let handle = thread::spawn(move || work(id, sender));
        let deadline = Instant::now() + WAIT;
        while !handle.is_finished() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        loader.pending.push(PendingLoad {
            id,
            name: name.to_string(),
            handle,
        });
    }

    #[test]
    fn test_finished_load_is_counted_once() {
        let mut loader = AssetLoader::new();
        finished_worker(&mut loader, "quick", |id, sender| {
            let event = AssetEvent::Failed {
                name: "quick".into(),
                error: AssetError::Empty {
                    path: "quick.obj".into(),
                },
            };
            let _ = sender.send((id, event));
        });

        let events = loader.poll();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            AssetEvent::Failed { error: AssetError::Empty { .. }, .. }
        ));
        assert!(loader.poll().is_empty());

        let progress = loader.progress();
        assert_eq!((progress.requested, progress.loaded, progress.failed), (1, 0, 1));
        assert_eq!(progress.pending(), 0);
        assert!(loader.pending.is_empty());
    }

    #[test]
    fn test_silent_worker_reports_disconnected() {
        let mut loader = AssetLoader::new();
        finished_worker(&mut loader, "silent", |_, sender| drop(sender));

        let events = loader.poll();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            AssetEvent::Failed { name, error: AssetError::Disconnected { .. } } if name == "silent"
        ));
        assert!(loader.poll().is_empty());
        assert_eq!(loader.progress().failed, 1);
    }

    #[test]
    fn test_pending_never_underflows() {
        let progress = LoadProgress {
            requested: 1,
            loaded: 1,
            failed: 1,
        };
        assert_eq!(progress.pending(), 0);
        assert!(progress.is_complete());
    }

    #[test]
    fn test_poll_without_requests_is_empty() {
        let mut loader = AssetLoader::new();
        assert!(loader.poll().is_empty());
        assert!(loader.progress().is_complete());
    }
}

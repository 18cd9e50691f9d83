//! Application shell: window, event routing and the per-frame update
//!
//! [`ShowroomApp`] wires configuration into the camera, movement, collision
//! and asset loading, then hands control to the winit event loop.

use std::sync::Arc;

use anyhow::Context;
use cgmath::{Deg, Vector3};
use log::{debug, info};
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::{DeviceEvent, DeviceId, ElementState, KeyEvent, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::{
    assets::loader::{AssetEvent, AssetLoader},
    config::WalkthroughConfig,
    gfx::{
        camera::{
            camera_controller::grab_cursor, CameraController, CameraManager, FirstPersonCamera,
        },
        rendering::{RenderEngine, RenderOptions},
        scene::Scene,
    },
    performance::PerformanceMonitor,
    ui::{render_hud, HudSnapshot, UiManager},
    walk::{FrameClock, InputTracker, ObstacleKind, StepOutcome, Walker, WorldState},
};

/// Key that shows or hides the status overlay
const HUD_TOGGLE_KEY: KeyCode = KeyCode::F1;

pub struct ShowroomApp {
    event_loop: EventLoop<()>,
    app_state: AppState,
}

struct AppState {
    config: WalkthroughConfig,
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    ui_manager: Option<UiManager>,
    scene: Scene,
    world: WorldState,
    input: InputTracker,
    walker: Walker,
    clock: FrameClock,
    loader: AssetLoader,
    performance: PerformanceMonitor,
    last_step: Option<StepOutcome>,
    show_hud: bool,
    startup_error: Option<anyhow::Error>,
}

impl ShowroomApp {
    /// Builds the app and starts loading assets in the background
    pub fn new(config: WalkthroughConfig) -> anyhow::Result<Self> {
        let event_loop = EventLoop::new().context("Failed to create event loop")?;

        let camera_config = &config.camera;
        let mut camera = FirstPersonCamera::new(
            Vector3::from(camera_config.position),
            camera_config.yaw,
            Deg(camera_config.fov_degrees),
            config.window.width as f32 / config.window.height.max(1) as f32,
        );
        camera.znear = camera_config.near;
        camera.zfar = camera_config.far;
        let controller = CameraController::new(camera_config.look_sensitivity);
        let scene = Scene::new(CameraManager::new(camera, controller));

        let walker = Walker::new(config.movement.integrator(), config.collision.gate());
        let clock = FrameClock::new(config.movement.max_frame_dt);
        let input = InputTracker::new(config.controls.clone());
        let loader = AssetLoader::from_config(&config.assets);

        Ok(Self {
            event_loop,
            app_state: AppState {
                show_hud: config.window.show_hud,
                config,
                window: None,
                render_engine: None,
                ui_manager: None,
                scene,
                world: WorldState::new(),
                input,
                walker,
                clock,
                loader,
                performance: PerformanceMonitor::new(),
                last_step: None,
                startup_error: None,
            },
        })
    }

    /// Runs until the window closes
    pub fn run(mut self) -> anyhow::Result<()> {
        self.event_loop.set_control_flow(ControlFlow::Poll);
        self.event_loop
            .run_app(&mut self.app_state)
            .context("Event loop failed")?;

        match self.app_state.startup_error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl AppState {
    fn init_graphics(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let window_config = &self.config.window;
        let window = event_loop
            .create_window(
                WindowAttributes::default()
                    .with_title(window_config.title.clone())
                    .with_inner_size(LogicalSize::new(window_config.width, window_config.height)),
            )
            .context("Failed to create window")?;
        let window = Arc::new(window);

        let (width, height) = window.inner_size().into();
        let options = RenderOptions::from_lighting(&self.config.lighting, window_config.vsync);
        let window_clone = window.clone();
        let renderer = pollster::block_on(async move {
            RenderEngine::new(window_clone, width, height, options).await
        })?;

        let mut ui_manager = UiManager::new(
            renderer.device(),
            renderer.queue(),
            renderer.surface_format(),
            &window,
        );
        ui_manager.update_display_size(width, height);
        self.scene
            .camera_manager
            .camera
            .resize_projection(width, height);

        info!("Click inside the window to look around; WASD to walk, F1 for status");
        self.ui_manager = Some(ui_manager);
        self.render_engine = Some(renderer);
        self.window = Some(window);
        Ok(())
    }

    fn resize(&mut self, PhysicalSize { width, height }: PhysicalSize<u32>) {
        self.scene
            .camera_manager
            .camera
            .resize_projection(width, height);
        if let Some(render_engine) = self.render_engine.as_mut() {
            render_engine.resize(width, height);
        }
        if let Some(ui_manager) = self.ui_manager.as_mut() {
            ui_manager.update_display_size(width, height);
        }
    }

    fn request_pointer_lock(&mut self) {
        let Some(window) = self.window.as_ref() else {
            return;
        };
        let locked = grab_cursor(window);
        self.scene.camera_manager.controller.pointer.set_locked(locked);
    }

    fn on_key(&mut self, event_loop: &ActiveEventLoop, event: &KeyEvent) {
        let PhysicalKey::Code(code) = event.physical_key else {
            return;
        };
        let pressed = event.state == ElementState::Pressed;

        match code {
            KeyCode::Escape if pressed => event_loop.exit(),
            HUD_TOGGLE_KEY if pressed && !event.repeat => self.show_hud = !self.show_hud,
            _ => {
                self.input.on_key_change(code, pressed);
            }
        }
    }

    /// Moves newly loaded assets into the scene and their volumes into the world
    fn absorb_loaded_assets(&mut self) {
        for event in self.loader.poll() {
            if let AssetEvent::Loaded(asset) = event {
                self.scene.add_asset(&asset);
                self.world.register_all(asset.obstacles);
            }
        }
    }

    fn hud_snapshot(&self) -> HudSnapshot {
        let camera = &self.scene.camera_manager.camera;
        HudSnapshot {
            position: camera.position,
            yaw: camera.yaw,
            pitch: camera.pitch,
            speed: self.walker.motion().speed(),
            blocked: self.last_step.is_some_and(|step| step.blocked),
            walls: self.world.count(ObstacleKind::Wall),
            cars: self.world.count(ObstacleKind::Car),
            loads: self.loader.progress(),
            pointer_locked: self.scene.camera_manager.controller.pointer.is_locked(),
        }
    }

    fn frame(&mut self) {
        self.performance.begin_frame();
        self.absorb_loaded_assets();

        let dt = self.clock.tick();
        let outcome = self.walker.step(
            self.input.state(),
            &mut self.scene.camera_manager.camera,
            self.world.volumes(),
            dt,
        );
        self.last_step = Some(outcome);
        self.scene.update();

        let hud = self.hud_snapshot();
        let show_hud = self.show_hud;

        let (Some(render_engine), Some(window)) = (self.render_engine.as_mut(), self.window.as_ref())
        else {
            return;
        };
        render_engine.prepare_scene(&mut self.scene);
        render_engine.update(self.scene.camera_manager.camera.uniform);

        let performance = &self.performance;
        let ui_callback = self.ui_manager.as_mut().filter(|_| show_hud).map(|ui_manager| {
            move |device: &wgpu::Device,
                  queue: &wgpu::Queue,
                  encoder: &mut wgpu::CommandEncoder,
                  color_attachment: &wgpu::TextureView| {
                ui_manager.draw(device, queue, encoder, window, color_attachment, |ui| {
                    render_hud(ui, &hud);
                    performance.render_overlay(ui);
                });
            }
        });

        if let Some(stats) = render_engine.render_frame(&self.scene, ui_callback) {
            self.performance
                .update_render_stats(stats.draw_calls, stats.triangles);
        }
        self.performance.end_frame();
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(err) = self.init_graphics(event_loop) {
            self.startup_error = Some(err);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = self.window.clone() else {
            return;
        };

        // The overlay never consumes input; ImGui only needs to see it
        if let Some(ui_manager) = self.ui_manager.as_mut() {
            let ui_event = winit::event::Event::WindowEvent {
                window_id,
                event: event.clone(),
            };
            ui_manager.handle_input(&window, &ui_event);
        }

        match event {
            WindowEvent::KeyboardInput { event, .. } => self.on_key(event_loop, &event),
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                if self.scene.camera_manager.controller.pointer.on_click() {
                    self.request_pointer_lock();
                }
            }
            WindowEvent::Focused(focused) => {
                if !focused {
                    // Key-up events are lost while unfocused
                    self.input.clear();
                }
                if self
                    .scene
                    .camera_manager
                    .controller
                    .pointer
                    .on_focus_changed(focused)
                {
                    self.request_pointer_lock();
                }
            }
            WindowEvent::Resized(size) => self.resize(size),
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                debug!("Scale factor changed to {}", scale_factor);
                self.resize(window.inner_size());
            }
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::RedrawRequested => self.frame(),
            _ => (),
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        self.scene.camera_manager.process_event(&event);
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }
}

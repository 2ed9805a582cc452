// app.rs
use std::sync::Arc;
use std::time::Instant;

use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::*,
    event_loop::ActiveEventLoop,
    keyboard::{Key, KeyCode, NamedKey, PhysicalKey},
    window::{Window, WindowId},
};

use crate::error::RendererError;
use crate::renderer::Renderer;
use crate::scene::{OrbitKey, SceneManager};
use crate::settings::{LabStage, RenderSettings};

/// Pixels of trackpad scroll per wheel line.
const PIXELS_PER_LINE: f64 = 40.0;

pub struct App {
    renderer: Option<Renderer>,
    window: Option<Arc<Window>>,
    window_id: Option<WindowId>,
    scene: SceneManager,
    settings: RenderSettings,
    last_frame: Instant,
}

impl App {
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            renderer: None,
            window: None,
            window_id: None,
            scene: SceneManager::new(settings.rotation_speed),
            settings,
            last_frame: Instant::now(),
        }
    }

    fn update_title(&self, stage: LabStage) {
        if let Some(w) = &self.window {
            w.set_title(&window_title(stage));
        }
    }

    fn cycle_stage(&mut self) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };
        let next = renderer.stage().next();
        log::info!("Switching to stage: {}", next.label());
        renderer.set_stage(next);
        self.update_title(next);
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f64();
        self.last_frame = now;
        self.scene.update(dt);

        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };

        match renderer.render(&self.scene) {
            Ok(()) => {}
            Err(err) if err.is_surface_lost() => renderer.reconfigure(),
            Err(RendererError::Surface(wgpu::SurfaceError::Timeout)) => {
                log::warn!("Swapchain image acquisition timed out, skipping frame");
            }
            Err(RendererError::NotRunning) => return,
            Err(err) => {
                log::error!("Frame failed: {}", err);
                renderer.clean();
                event_loop.exit();
                return;
            }
        }

        if let Some(w) = &self.window {
            w.request_redraw();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let resolution = &self.settings.resolution;
        let attributes = Window::default_attributes()
            .with_title(window_title(self.settings.stage))
            .with_inner_size(PhysicalSize::new(resolution.width, resolution.height));
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                log::error!("Failed to create window: {}", err);
                event_loop.exit();
                return;
            }
        };
        let id = window.id();

        match pollster::block_on(Renderer::new(window.clone(), self.settings.clone())) {
            Ok(renderer) => self.renderer = Some(renderer),
            Err(err) => {
                log::error!("Failed to initialize renderer: {}", err);
                event_loop.exit();
                return;
            }
        }

        window.request_redraw();
        self.window = Some(window);
        self.window_id = Some(id);
        self.last_frame = Instant::now();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        if Some(id) != self.window_id {
            return;
        }

        match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.clean();
                }
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.resize(size);
                }
            }
            WindowEvent::ScaleFactorChanged { .. } => {
                if let (Some(renderer), Some(w)) = (self.renderer.as_mut(), &self.window) {
                    renderer.resize(w.inner_size());
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: Key::Named(NamedKey::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                event_loop.exit();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: Key::Named(NamedKey::Tab),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                self.cycle_stage();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        ..
                    },
                ..
            } => {
                if let Some(key) = orbit_key(code) {
                    self.scene.set_key(key, state == ElementState::Pressed);
                }
            }
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state,
                ..
            } => {
                self.scene.set_dragging(state == ElementState::Pressed);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => (pos.y / PIXELS_PER_LINE) as f32,
                };
                self.scene.on_scroll(lines);
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            self.scene.on_mouse_motion(dx, dy);
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.clean();
        }
    }
}

fn window_title(stage: LabStage) -> String {
    format!("Lab renderer - {}", stage.label())
}

fn orbit_key(code: KeyCode) -> Option<OrbitKey> {
    match code {
        KeyCode::ArrowLeft | KeyCode::KeyA => Some(OrbitKey::Left),
        KeyCode::ArrowRight | KeyCode::KeyD => Some(OrbitKey::Right),
        KeyCode::ArrowUp | KeyCode::KeyW => Some(OrbitKey::Up),
        KeyCode::ArrowDown | KeyCode::KeyS => Some(OrbitKey::Down),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrows_and_wasd_orbit() {
        assert_eq!(orbit_key(KeyCode::ArrowLeft), Some(OrbitKey::Left));
        assert_eq!(orbit_key(KeyCode::KeyD), Some(OrbitKey::Right));
        assert_eq!(orbit_key(KeyCode::KeyW), Some(OrbitKey::Up));
        assert_eq!(orbit_key(KeyCode::ArrowDown), Some(OrbitKey::Down));
        assert_eq!(orbit_key(KeyCode::KeyQ), None);
    }

    #[test]
    fn title_names_the_stage() {
        assert_eq!(window_title(LabStage::Cube), "Lab renderer - Cube");
    }
}

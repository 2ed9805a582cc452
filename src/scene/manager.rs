use glam::Mat4;

use super::Camera;

/// Radians per pixel of mouse drag.
const DRAG_SENSITIVITY: f32 = 0.005;
/// Radians per second while an orbit key is held.
const KEY_ORBIT_SPEED: f32 = 1.5;
/// Distance units per scroll line.
const ZOOM_STEP: f32 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrbitKey {
    Left,
    Right,
    Up,
    Down,
}

#[derive(Clone, Copy, Debug, Default)]
struct HeldKeys {
    left: bool,
    right: bool,
    up: bool,
    down: bool,
}

impl HeldKeys {
    fn axis(negative: bool, positive: bool) -> f32 {
        match (negative, positive) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        }
    }
}

/// Owns the per-frame scene state the renderer reads: the camera and the
/// animated model transform.
#[derive(Debug)]
pub struct SceneManager {
    camera: Camera,
    model_angle: f32,
    rotation_speed: f32,
    held: HeldKeys,
    dragging: bool,
}

impl SceneManager {
    pub fn new(rotation_speed: f32) -> Self {
        Self {
            camera: Camera::default(),
            model_angle: 0.0,
            rotation_speed,
            held: HeldKeys::default(),
            dragging: false,
        }
    }

    pub fn update(&mut self, dt: f64) {
        let dt = dt as f32;
        self.model_angle =
            (self.model_angle + self.rotation_speed * dt).rem_euclid(std::f32::consts::TAU);

        let yaw = HeldKeys::axis(self.held.left, self.held.right);
        let pitch = HeldKeys::axis(self.held.down, self.held.up);
        if yaw != 0.0 || pitch != 0.0 {
            self.camera
                .orbit(yaw * KEY_ORBIT_SPEED * dt, pitch * KEY_ORBIT_SPEED * dt);
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Camera-to-world transform.
    pub fn camera_transform(&self) -> Mat4 {
        self.camera.transform()
    }

    /// Transform of the animated cube.
    pub fn model_transform(&self) -> Mat4 {
        Mat4::from_rotation_y(self.model_angle)
    }

    pub fn model_angle(&self) -> f32 {
        self.model_angle
    }

    pub fn set_dragging(&mut self, dragging: bool) {
        self.dragging = dragging;
    }

    pub fn on_mouse_motion(&mut self, dx: f64, dy: f64) {
        if !self.dragging {
            return;
        }
        self.camera.orbit(
            -(dx as f32) * DRAG_SENSITIVITY,
            dy as f32 * DRAG_SENSITIVITY,
        );
    }

    pub fn on_scroll(&mut self, lines: f32) {
        self.camera.zoom(lines * ZOOM_STEP);
    }

    pub fn set_key(&mut self, key: OrbitKey, pressed: bool) {
        match key {
            OrbitKey::Left => self.held.left = pressed,
            OrbitKey::Right => self.held.right = pressed,
            OrbitKey::Up => self.held.up = pressed,
            OrbitKey::Down => self.held.down = pressed,
        }
    }
}

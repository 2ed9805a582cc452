use glam::{Mat4, Vec3};

const MAX_PITCH: f32 = 85.0 * std::f32::consts::PI / 180.0;
const MIN_DISTANCE: f32 = 1.5;
const MAX_DISTANCE: f32 = 40.0;
/// Scale applied to the near-plane bounding radius so the skybox sphere
/// never intersects the near clip plane.
const SKYBOX_RADIUS_MARGIN: f32 = 1.1;
/// Horizontal field of view, 3.14 / 3.
const DEFAULT_FOV_X: f32 = 1.046_666_7;

/// Orbit camera circling `target`.
///
/// Right-handed, looking down -Z in view space. The field of view is
/// horizontal; the vertical one follows from the aspect ratio. Projection
/// uses reversed depth: the near plane maps to 1.0 and the far plane to 0.0.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pub target: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
    pub fov_x_radians: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn position(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        self.target
            + Vec3::new(cos_pitch * sin_yaw, sin_pitch, cos_pitch * cos_yaw) * self.distance
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    /// Camera-to-world transform. The inverse of [`Camera::view`].
    pub fn transform(&self) -> Mat4 {
        self.view().inverse()
    }

    /// Vertical field of view that keeps the horizontal one fixed.
    pub fn fov_y(&self, aspect: f32) -> f32 {
        2.0 * ((self.fov_x_radians / 2.0).tan() / aspect).atan()
    }

    pub fn projection(&self, aspect: f32) -> Mat4 {
        // Swapped planes give reversed depth.
        Mat4::perspective_rh(self.fov_y(aspect), aspect, self.far, self.near)
    }

    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        self.projection(aspect) * self.view()
    }

    /// Radius of a camera-centered sphere that fully encloses the near
    /// plane rectangle, with a small margin.
    pub fn skybox_radius(&self, aspect: f32) -> f32 {
        let half_width = self.near * (self.fov_x_radians / 2.0).tan();
        let half_height = half_width / aspect;
        (self.near * self.near + half_width * half_width + half_height * half_height).sqrt()
            * SKYBOX_RADIUS_MARGIN
    }

    pub fn orbit(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.yaw = (self.yaw + delta_yaw).rem_euclid(std::f32::consts::TAU);
        self.pitch = (self.pitch + delta_pitch).clamp(-MAX_PITCH, MAX_PITCH);
    }

    pub fn zoom(&mut self, delta: f32) {
        self.distance = (self.distance - delta).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.35,
            distance: 8.0,
            fov_x_radians: DEFAULT_FOV_X,
            near: 0.1,
            far: 100.0,
        }
    }
}

// renderer/uniforms.rs
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};

/// Tint applied to translucent cubes; alpha is the blend opacity.
pub const TRANSLUCENT_COLOR: [f32; 4] = [0.7, 1.0, 0.5, 0.6];

/// Rewritten once per frame.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Debug, PartialEq)]
pub struct ViewUniform {
    pub view_proj: [[f32; 4]; 4],
    pub camera_position: [f32; 4],
}

impl ViewUniform {
    pub fn new() -> Self {
        Self {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            camera_position: [0.0, 0.0, 0.0, 1.0],
        }
    }

    pub fn from_matrix(view_proj: Mat4, camera_position: Vec3) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            camera_position: camera_position.extend(1.0).to_array(),
        }
    }
}

impl Default for ViewUniform {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-draw object data.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Debug, PartialEq)]
pub struct SceneUniform {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
}

impl SceneUniform {
    pub fn new(model: Mat4) -> Self {
        Self::tinted(model, Vec4::ONE)
    }

    pub fn tinted(model: Mat4, color: Vec4) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            color: color.to_array(),
        }
    }
}

impl From<Mat4> for SceneUniform {
    fn from(model: Mat4) -> Self {
        Self::new(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_uniform_is_80_bytes() {
        // mat4x4<f32> = 64 bytes, vec4<f32> = 16 bytes
        assert_eq!(std::mem::size_of::<ViewUniform>(), 80);
    }

    #[test]
    fn scene_uniform_is_80_bytes() {
        assert_eq!(std::mem::size_of::<SceneUniform>(), 80);
    }

    #[test]
    fn untinted_scene_uniform_is_white() {
        let uni = SceneUniform::from(Mat4::from_translation(Vec3::X));
        assert_eq!(uni.color, [1.0; 4]);
        assert_eq!(uni.model[3], [1.0, 0.0, 0.0, 1.0]);
    }
}

//! One renderer per lab. The [`Renderer`](crate::renderer::Renderer) owns
//! exactly one boxed [`FrameStage`] and swaps it when the lab changes.

mod clear;
mod cube;
mod textured;
mod triangle;

pub use clear::ClearStage;
pub use cube::CubeStage;
pub use textured::{opaque_models, translucent_models, TexturedStage};
pub use triangle::TriangleStage;

use winit::dpi::PhysicalSize;

use crate::renderer::depth::Depth;
use crate::renderer::uniforms::ViewUniform;
use crate::scene::SceneManager;
use crate::settings::{LabStage, RenderSettings};

/// Everything a stage needs to build its GPU resources.
pub struct StageInit<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub color_format: wgpu::TextureFormat,
    pub depth: &'a Depth,
    pub settings: &'a RenderSettings,
}

/// Per-frame inputs, read during [`FrameStage::prepare`].
pub struct FrameContext<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub scene: &'a SceneManager,
    pub size: PhysicalSize<u32>,
}

impl FrameContext<'_> {
    pub fn aspect_ratio(&self) -> f32 {
        self.size.width as f32 / self.size.height.max(1) as f32
    }

    pub fn view_uniform(&self) -> ViewUniform {
        let camera = self.scene.camera();
        ViewUniform::from_matrix(camera.view_proj(self.aspect_ratio()), camera.position())
    }
}

pub trait FrameStage {
    fn label(&self) -> &'static str;

    /// Uploads this frame's uniforms. Runs before any command is recorded.
    fn prepare(&mut self, frame: &FrameContext<'_>) {
        let _ = frame;
    }

    /// Records the stage's passes into `encoder`, drawing into `target`.
    fn record(&self, encoder: &mut wgpu::CommandEncoder, target: &wgpu::TextureView, depth: &Depth);
}

pub fn create_stage(stage: LabStage, init: &StageInit<'_>) -> Box<dyn FrameStage> {
    log::info!("Building stage: {}", stage.label());
    match stage {
        LabStage::Clear => Box::new(ClearStage::new()),
        LabStage::Triangle => Box::new(TriangleStage::new(init)),
        LabStage::Cube => Box::new(CubeStage::new(init)),
        LabStage::Textured => Box::new(TexturedStage::new(init)),
    }
}

/// Starts a pass that clears `target` to `clear` and, when given, the depth
/// buffer to the far plane.
fn begin_pass<'e>(
    encoder: &'e mut wgpu::CommandEncoder,
    label: &str,
    target: &wgpu::TextureView,
    clear: wgpu::Color,
    depth: Option<&Depth>,
) -> wgpu::RenderPass<'e> {
    encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: target,
            depth_slice: None,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(clear),
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: depth.map(Depth::clearing_attachment),
        timestamp_writes: None,
        occlusion_query_set: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgba(color: wgpu::Color) -> [f64; 4] {
        [color.r, color.g, color.b, color.a]
    }

    #[test]
    fn each_lab_clears_to_its_own_color() {
        assert_eq!(rgba(clear::CLEAR_COLOR), [0.7, 0.6, 0.4, 0.3]);
        assert_eq!(rgba(triangle::CLEAR_COLOR), [0.0; 4]);
        assert_eq!(rgba(cube::CLEAR_COLOR), [0.0; 4]);
        assert_eq!(rgba(textured::CLEAR_COLOR), [0.1; 4]);
    }
}

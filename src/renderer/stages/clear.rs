use super::{begin_pass, FrameStage};
use crate::renderer::depth::Depth;

pub const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.7,
    g: 0.6,
    b: 0.4,
    a: 0.3,
};

/// Clears the swapchain image and draws nothing.
#[derive(Debug, Default)]
pub struct ClearStage;

impl ClearStage {
    pub fn new() -> Self {
        Self
    }
}

impl FrameStage for ClearStage {
    fn label(&self) -> &'static str {
        "Clear"
    }

    fn record(&self, encoder: &mut wgpu::CommandEncoder, target: &wgpu::TextureView, _depth: &Depth) {
        let _pass = begin_pass(encoder, "ClearPass", target, CLEAR_COLOR, None);
    }
}

use super::{begin_pass, FrameStage, StageInit};
use crate::renderer::buffers::Mesh;
use crate::renderer::depth::Depth;
use crate::renderer::pipeline_builder::PipelineBuilder;
use crate::renderer::primitives;
use crate::renderer::vertex::ColorVertex;

pub const CLEAR_COLOR: wgpu::Color = wgpu::Color::TRANSPARENT;

/// A single vertex-colored triangle given directly in clip space.
pub struct TriangleStage {
    mesh: Mesh,
    pipeline: wgpu::RenderPipeline,
}

impl TriangleStage {
    pub fn new(init: &StageInit<'_>) -> Self {
        let device = init.device;
        let (vertices, indices) = primitives::triangle();
        let mesh = Mesh::new(device, "Triangle", &vertices, &indices);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("VertexColorShader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../../shader/vertex_color.wgsl").into()),
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("TrianglePipelineLayout"),
            bind_group_layouts: &[],
            push_constant_ranges: &[],
        });

        let pipeline = PipelineBuilder::new(device, &layout, &shader)
            .with_label("TrianglePipeline")
            .with_vertex_entry("vs_clip")
            .with_vertex_buffer(ColorVertex::layout())
            .with_color_target(init.color_format)
            .build();

        Self { mesh, pipeline }
    }
}

impl FrameStage for TriangleStage {
    fn label(&self) -> &'static str {
        "Triangle"
    }

    fn record(&self, encoder: &mut wgpu::CommandEncoder, target: &wgpu::TextureView, _depth: &Depth) {
        let mut pass = begin_pass(encoder, "TrianglePass", target, CLEAR_COLOR, None);
        pass.set_pipeline(&self.pipeline);
        self.mesh.bind(&mut pass);
        self.mesh.draw(&mut pass);
    }
}

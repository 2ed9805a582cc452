use super::{begin_pass, FrameContext, FrameStage, StageInit};
use crate::renderer::buffers::{Mesh, SceneBuffer, ViewBuffer};
use crate::renderer::depth::{Depth, DepthMode};
use crate::renderer::pipeline_builder::PipelineBuilder;
use crate::renderer::primitives;
use crate::renderer::uniforms::SceneUniform;
use crate::renderer::vertex::ColorVertex;

pub const CLEAR_COLOR: wgpu::Color = wgpu::Color::TRANSPARENT;

/// The vertex-colored cube, spun by the scene and seen through the camera.
pub struct CubeStage {
    mesh: Mesh,
    view_buffer: ViewBuffer,
    scene_buffer: SceneBuffer,
    pipeline: wgpu::RenderPipeline,
    model_offset: u32,
}

impl CubeStage {
    pub fn new(init: &StageInit<'_>) -> Self {
        let device = init.device;
        let (vertices, indices) = primitives::color_cube();
        let mesh = Mesh::new(device, "ColorCube", &vertices, &indices);

        let view_buffer = ViewBuffer::new(device);
        let scene_buffer = SceneBuffer::new(device);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("VertexColorShader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../../shader/vertex_color.wgsl").into()),
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("CubePipelineLayout"),
            bind_group_layouts: &[&view_buffer.bind_layout, &scene_buffer.bind_layout],
            push_constant_ranges: &[],
        });

        let pipeline = PipelineBuilder::new(device, &layout, &shader)
            .with_label("CubePipeline")
            .with_vertex_buffer(ColorVertex::layout())
            .with_color_target(init.color_format)
            .with_depth(init.depth, DepthMode::ReadWrite)
            .build();

        Self {
            mesh,
            view_buffer,
            scene_buffer,
            pipeline,
            model_offset: 0,
        }
    }
}

impl FrameStage for CubeStage {
    fn label(&self) -> &'static str {
        "Cube"
    }

    fn prepare(&mut self, frame: &FrameContext<'_>) {
        self.view_buffer.update(frame.queue, &frame.view_uniform());

        self.scene_buffer.begin_frame();
        self.model_offset = self
            .scene_buffer
            .push(SceneUniform::new(frame.scene.model_transform()));
        self.scene_buffer.flush(frame.device, frame.queue);
    }

    fn record(&self, encoder: &mut wgpu::CommandEncoder, target: &wgpu::TextureView, depth: &Depth) {
        let mut pass = begin_pass(encoder, "CubePass", target, CLEAR_COLOR, Some(depth));
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.view_buffer.bind_group, &[]);
        pass.set_bind_group(1, &self.scene_buffer.bind_group, &[self.model_offset]);
        self.mesh.bind(&mut pass);
        self.mesh.draw(&mut pass);
    }
}

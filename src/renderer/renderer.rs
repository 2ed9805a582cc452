// renderer/renderer.rs
use std::sync::Arc;

use winit::{dpi::PhysicalSize, window::Window};

use crate::error::RendererError;
use crate::renderer::context::RenderContext;
use crate::renderer::stages::{create_stage, FrameContext, FrameStage, StageInit};
use crate::scene::SceneManager;
use crate::settings::{LabStage, RenderSettings};

/// Draws the active lab into a window.
///
/// Fields drop in declaration order, so the stage's buffers, textures and
/// pipelines are released before the depth buffer, the swapchain and
/// finally the device.
pub struct Renderer {
    stage: Option<Box<dyn FrameStage>>,
    context: Option<RenderContext>,
    current: LabStage,
    settings: RenderSettings,
}

impl Renderer {
    pub async fn new(window: Arc<Window>, settings: RenderSettings) -> Result<Self, RendererError> {
        let context = RenderContext::new(window, &settings).await?;
        let current = settings.stage;
        let stage = create_stage(current, &stage_init(&context, &settings));

        Ok(Self {
            stage: Some(stage),
            context: Some(context),
            current,
            settings,
        })
    }

    /// False once [`Renderer::clean`] has released the device.
    pub fn is_running(&self) -> bool {
        self.context.is_some()
    }

    pub fn stage(&self) -> LabStage {
        self.current
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Switches to another lab, building its resources from scratch.
    pub fn set_stage(&mut self, stage: LabStage) {
        self.current = stage;
        let Some(context) = self.context.as_ref() else {
            return;
        };
        // Release the old stage before allocating the new one.
        self.stage = None;
        self.stage = Some(create_stage(stage, &stage_init(context, &self.settings)));
    }

    /// Returns whether the swapchain was reconfigured.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) -> bool {
        self.context
            .as_mut()
            .is_some_and(|context| context.resize(new_size))
    }

    /// Reapplies the swapchain configuration after a lost or outdated
    /// surface.
    pub fn reconfigure(&mut self) {
        if let Some(context) = self.context.as_ref() {
            log::warn!("Reconfiguring lost surface");
            context.reconfigure();
        }
    }

    pub fn size(&self) -> Option<PhysicalSize<u32>> {
        self.context.as_ref().map(RenderContext::size)
    }

    pub fn render(&mut self, scene: &SceneManager) -> Result<(), RendererError> {
        let (Some(context), Some(stage)) = (self.context.as_ref(), self.stage.as_mut()) else {
            return Err(RendererError::NotRunning);
        };

        let frame = context.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        stage.prepare(&FrameContext {
            device: &context.device,
            queue: &context.queue,
            scene,
            size: context.size(),
        });

        let mut encoder = context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some(stage.label()),
            });
        stage.record(&mut encoder, &view, &context.depth);

        context.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }

    /// Releases every GPU resource. Later calls to [`Renderer::render`]
    /// fail with [`RendererError::NotRunning`].
    pub fn clean(&mut self) {
        if !self.is_running() {
            return;
        }
        self.stage = None;
        self.context = None;
        log::info!("Renderer resources released");
    }
}

fn stage_init<'a>(context: &'a RenderContext, settings: &'a RenderSettings) -> StageInit<'a> {
    StageInit {
        device: &context.device,
        queue: &context.queue,
        color_format: context.config.format,
        depth: &context.depth,
        settings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn released(settings: RenderSettings) -> Renderer {
        Renderer {
            stage: None,
            context: None,
            current: settings.stage,
            settings,
        }
    }

    #[test]
    fn released_renderer_refuses_to_draw() {
        let mut renderer = released(RenderSettings::default());
        let scene = SceneManager::new(1.0);

        assert!(!renderer.is_running());
        assert!(matches!(
            renderer.render(&scene),
            Err(RendererError::NotRunning)
        ));
        assert!(!renderer.resize(PhysicalSize::new(800, 600)));
        assert_eq!(renderer.size(), None);
    }

    #[test]
    fn clean_is_idempotent_and_stage_survives_release() {
        let mut renderer = released(RenderSettings::default());
        renderer.clean();
        renderer.clean();

        renderer.set_stage(LabStage::Cube);
        assert_eq!(renderer.stage(), LabStage::Cube);
        assert!(matches!(
            renderer.render(&SceneManager::new(0.0)),
            Err(RendererError::NotRunning)
        ));
    }
}

use winit::dpi::PhysicalSize;

/// Value the depth buffer is cleared to. With reversed depth this is the
/// far plane.
pub const DEPTH_CLEAR: f32 = 0.0;

/// How a pipeline uses the shared depth buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DepthMode {
    /// Test and write. Opaque geometry.
    ReadWrite,
    /// Test only. Skybox and translucent geometry.
    Read,
}

impl DepthMode {
    pub fn depth_write(self) -> bool {
        matches!(self, DepthMode::ReadWrite)
    }

    /// Nearer fragments have larger depth values.
    pub fn compare(self) -> wgpu::CompareFunction {
        wgpu::CompareFunction::GreaterEqual
    }
}

pub struct Depth {
    pub view: wgpu::TextureView,
    pub format: wgpu::TextureFormat,
}

impl Depth {
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    pub fn new(device: &wgpu::Device, size: PhysicalSize<u32>) -> Self {
        let format = Self::FORMAT;
        let tex = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("DepthBuffer"),
            size: wgpu::Extent3d {
                width: size.width.max(1),
                height: size.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = tex.create_view(&wgpu::TextureViewDescriptor {
            label: Some("DepthBufferView"),
            ..Default::default()
        });
        Self { view, format }
    }

    pub fn depth_stencil_state(&self, mode: DepthMode) -> wgpu::DepthStencilState {
        wgpu::DepthStencilState {
            format: self.format,
            depth_write_enabled: mode.depth_write(),
            depth_compare: mode.compare(),
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }
    }

    /// Attachment that clears depth to the far plane at the start of a pass.
    pub fn clearing_attachment(&self) -> wgpu::RenderPassDepthStencilAttachment<'_> {
        wgpu::RenderPassDepthStencilAttachment {
            view: &self.view,
            depth_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(DEPTH_CLEAR),
                store: wgpu::StoreOp::Discard,
            }),
            stencil_ops: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_format_is_depth32float() {
        assert!(matches!(Depth::FORMAT, wgpu::TextureFormat::Depth32Float));
    }

    #[test]
    fn only_read_write_mode_writes_depth() {
        assert!(DepthMode::ReadWrite.depth_write());
        assert!(!DepthMode::Read.depth_write());
        assert_eq!(
            DepthMode::Read.compare(),
            wgpu::CompareFunction::GreaterEqual
        );
    }
}

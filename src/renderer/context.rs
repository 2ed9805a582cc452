use std::sync::Arc;

use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::error::RendererError;
use crate::renderer::depth::Depth;
use crate::settings::RenderSettings;

/// Device, queue and the configured swapchain for one window.
///
/// Fields drop in declaration order: depth buffer, swapchain, then device.
pub(crate) struct RenderContext {
    pub(crate) depth: Depth,
    pub(crate) surface: wgpu::Surface<'static>,
    pub(crate) config: wgpu::SurfaceConfiguration,
    pub(crate) queue: wgpu::Queue,
    pub(crate) device: wgpu::Device,
}

impl RenderContext {
    pub(crate) async fn new(
        window: Arc<Window>,
        settings: &RenderSettings,
    ) -> Result<Self, RendererError> {
        let size = window.inner_size();
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window)?;

        log::info!("Surface created successfully!");

        let adapter = select_adapter(&instance, &surface).await?;
        let info = adapter.get_info();
        log::info!("Using adapter: {} ({:?})", info.name, info.device_type);
        log::info!("Using backend: {:?}", info.backend);

        let mut required_features = wgpu::Features::empty();
        if adapter
            .features()
            .contains(wgpu::Features::TEXTURE_ADAPTER_SPECIFIC_FORMAT_FEATURES)
        {
            required_features |= wgpu::Features::TEXTURE_ADAPTER_SPECIFIC_FORMAT_FEATURES;
        }

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Device"),
                required_features,
                required_limits: wgpu::Limits::default(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let format =
            pick_surface_format(&surface_caps.formats).ok_or(RendererError::NoSurfaceFormat)?;
        log::info!("Surface format: {:?}", format);

        let present_mode = settings.present_mode(&surface_caps.present_modes);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth = Depth::new(&device, size);

        Ok(Self {
            depth,
            surface,
            config,
            queue,
            device,
        })
    }

    /// Reconfigures the swapchain and depth buffer. Zero or unchanged sizes
    /// are ignored.
    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) -> bool {
        if new_size.width == 0 || new_size.height == 0 {
            return false;
        }
        if new_size.width == self.config.width && new_size.height == self.config.height {
            return false;
        }
        log::info!("Resizing to {}x{}", new_size.width, new_size.height);
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
        self.depth = Depth::new(&self.device, new_size);
        true
    }

    /// Applies the current configuration again after the surface was lost.
    pub(crate) fn reconfigure(&self) {
        self.surface.configure(&self.device, &self.config);
    }

    /// Size of the configured swapchain images.
    pub(crate) fn size(&self) -> PhysicalSize<u32> {
        PhysicalSize::new(self.config.width, self.config.height)
    }
}

/// First hardware adapter that can present to `surface`. Software adapters
/// are used only when nothing else is available.
async fn select_adapter(
    instance: &wgpu::Instance,
    surface: &wgpu::Surface<'_>,
) -> Result<wgpu::Adapter, RendererError> {
    let compatible: Vec<wgpu::Adapter> = instance
        .enumerate_adapters(wgpu::Backends::all())
        .into_iter()
        .filter(|adapter| adapter.is_surface_supported(surface))
        .collect();

    for adapter in &compatible {
        let info = adapter.get_info();
        log::info!("Found adapter: {} ({:?})", info.name, info.device_type);
    }

    let mut software = None;
    for adapter in compatible {
        if is_software(adapter.get_info().device_type) {
            software.get_or_insert(adapter);
        } else {
            return Ok(adapter);
        }
    }

    if let Some(adapter) = software {
        log::warn!("No hardware adapter found, using a software adapter");
        return Ok(adapter);
    }

    instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(surface),
            force_fallback_adapter: false,
        })
        .await
        .map_err(|_| RendererError::NoAdapter)
}

fn is_software(device_type: wgpu::DeviceType) -> bool {
    matches!(device_type, wgpu::DeviceType::Cpu)
}

/// Prefers a non-sRGB 8-bit format so textures and clear colors pass
/// through unconverted.
fn pick_surface_format(formats: &[wgpu::TextureFormat]) -> Option<wgpu::TextureFormat> {
    const PREFERRED: [wgpu::TextureFormat; 2] = [
        wgpu::TextureFormat::Rgba8Unorm,
        wgpu::TextureFormat::Bgra8Unorm,
    ];

    PREFERRED
        .iter()
        .copied()
        .find(|f| formats.contains(f))
        .or_else(|| formats.iter().copied().find(|f| !f.is_srgb()))
        .or_else(|| formats.first().copied())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::TextureFormat;

    #[test]
    fn prefers_unorm_rgba_then_bgra() {
        let formats = [
            TextureFormat::Bgra8UnormSrgb,
            TextureFormat::Bgra8Unorm,
            TextureFormat::Rgba8Unorm,
        ];
        assert_eq!(pick_surface_format(&formats), Some(TextureFormat::Rgba8Unorm));

        let formats = [TextureFormat::Bgra8UnormSrgb, TextureFormat::Bgra8Unorm];
        assert_eq!(pick_surface_format(&formats), Some(TextureFormat::Bgra8Unorm));
    }

    #[test]
    fn falls_back_to_any_linear_then_first() {
        let formats = [TextureFormat::Rgba8UnormSrgb, TextureFormat::Rgb10a2Unorm];
        assert_eq!(pick_surface_format(&formats), Some(TextureFormat::Rgb10a2Unorm));

        let formats = [TextureFormat::Bgra8UnormSrgb];
        assert_eq!(pick_surface_format(&formats), Some(TextureFormat::Bgra8UnormSrgb));

        assert_eq!(pick_surface_format(&[]), None);
    }

    #[test]
    fn only_cpu_adapters_count_as_software() {
        assert!(is_software(wgpu::DeviceType::Cpu));
        assert!(!is_software(wgpu::DeviceType::DiscreteGpu));
        assert!(!is_software(wgpu::DeviceType::IntegratedGpu));
        assert!(!is_software(wgpu::DeviceType::VirtualGpu));
        assert!(!is_software(wgpu::DeviceType::Other));
    }
}

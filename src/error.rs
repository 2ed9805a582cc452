use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RendererError {
    #[error("No graphics adapter is compatible with the window surface")]
    NoAdapter,
    #[error("The window surface reports no usable color format")]
    NoSurfaceFormat,
    #[error("Failed to create the window surface")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("Failed to create the graphics device")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    #[error("Failed to acquire the next swapchain image: {0}")]
    Surface(#[from] wgpu::SurfaceError),
    #[error("The renderer has been cleaned up and can no longer draw")]
    NotRunning,
    #[error("Failed to load image {path:?}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("Cubemap face {face} is {found:?} but the first face is {expected:?}")]
    MismatchedCubeFaces {
        face: usize,
        expected: (u32, u32),
        found: (u32, u32),
    },
}

impl RendererError {
    /// Whether the swapchain must be reconfigured before the next frame.
    pub fn is_surface_lost(&self) -> bool {
        matches!(
            self,
            RendererError::Surface(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lost_and_outdated_surfaces_require_reconfigure() {
        assert!(RendererError::Surface(wgpu::SurfaceError::Lost).is_surface_lost());
        assert!(RendererError::Surface(wgpu::SurfaceError::Outdated).is_surface_lost());
        assert!(!RendererError::Surface(wgpu::SurfaceError::Timeout).is_surface_lost());
        assert!(!RendererError::NotRunning.is_surface_lost());
    }

    #[test]
    fn setup_failures_describe_themselves() {
        assert_eq!(
            RendererError::NoSurfaceFormat.to_string(),
            "The window surface reports no usable color format"
        );
        let err = RendererError::MismatchedCubeFaces {
            face: 2,
            expected: (64, 64),
            found: (32, 32),
        };
        assert_eq!(
            err.to_string(),
            "Cubemap face 2 is (32, 32) but the first face is (64, 64)"
        );
    }
}

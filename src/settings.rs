use std::path::PathBuf;

use log::{info, warn};
use serde::{Deserialize, Serialize};

/// The incremental exercise the renderer draws.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabStage {
    /// Swapchain clear only.
    Clear,
    /// A single vertex-colored triangle.
    Triangle,
    /// A vertex-colored cube driven by the camera.
    Cube,
    /// Textured cubes, a skybox and sorted translucent cubes.
    #[default]
    Textured,
}

impl LabStage {
    pub const ALL: [LabStage; 4] = [
        LabStage::Clear,
        LabStage::Triangle,
        LabStage::Cube,
        LabStage::Textured,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            LabStage::Clear => "Clear",
            LabStage::Triangle => "Triangle",
            LabStage::Cube => "Cube",
            LabStage::Textured => "Textured",
        }
    }

    /// The following stage, wrapping back to the first one.
    pub fn next(self) -> Self {
        let index = Self::ALL
            .iter()
            .position(|stage| *stage == self)
            .unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderSettings {
    #[serde(default)]
    pub stage: LabStage,
    #[serde(default)]
    pub resolution: Resolution,
    #[serde(default)]
    pub present_mode: PresentModeSetting,
    #[serde(default)]
    pub assets: AssetPaths,
    #[serde(default = "RenderSettings::default_max_anisotropy")]
    pub max_anisotropy: u16,
    #[serde(default = "RenderSettings::default_rotation_speed")]
    pub rotation_speed: f32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            stage: LabStage::default(),
            resolution: Resolution::default(),
            present_mode: PresentModeSetting::default(),
            assets: AssetPaths::default(),
            max_anisotropy: Self::default_max_anisotropy(),
            rotation_speed: Self::default_rotation_speed(),
        }
    }
}

impl RenderSettings {
    pub fn load() -> Self {
        Self::load_from_path("settings.json")
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Self {
        use std::fs;

        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<RenderSettings>(&contents) {
                Ok(settings) => {
                    info!("Loaded render settings from {:?}", path);
                    settings.validate()
                }
                Err(err) => {
                    warn!(
                        "Failed to parse {:?} ({}). Falling back to default render settings.",
                        path, err
                    );
                    RenderSettings::default()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!(
                    "Render settings file {:?} not found. Using default settings.",
                    path
                );
                RenderSettings::default()
            }
            Err(err) => {
                warn!(
                    "Failed to read {:?} ({}). Falling back to default render settings.",
                    path, err
                );
                RenderSettings::default()
            }
        }
    }

    fn validate(mut self) -> Self {
        if self.resolution.width == 0 || self.resolution.height == 0 {
            warn!("Resolution must be greater than zero. Using default resolution.");
            self.resolution = Resolution::default();
        }

        if !(1..=16).contains(&self.max_anisotropy) {
            warn!(
                "Anisotropy {} is outside 1..=16. Using {} instead.",
                self.max_anisotropy,
                Self::default_max_anisotropy()
            );
            self.max_anisotropy = Self::default_max_anisotropy();
        }

        if !self.rotation_speed.is_finite() {
            warn!("Rotation speed must be finite. Using default value.");
            self.rotation_speed = Self::default_rotation_speed();
        }

        self
    }

    pub fn present_mode(&self, available: &[wgpu::PresentMode]) -> wgpu::PresentMode {
        let desired = self.present_mode.to_wgpu();
        if available.contains(&desired) {
            return desired;
        }

        warn!(
            "Requested present mode {:?} is not supported. Falling back to FIFO.",
            desired
        );

        if available.contains(&wgpu::PresentMode::Fifo) {
            wgpu::PresentMode::Fifo
        } else {
            available
                .first()
                .copied()
                .unwrap_or(wgpu::PresentMode::Fifo)
        }
    }

    const fn default_max_anisotropy() -> u16 {
        16
    }

    const fn default_rotation_speed() -> f32 {
        1.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

/// Texture files used by the textured stage. Missing files fall back to
/// procedural textures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetPaths {
    #[serde(default = "AssetPaths::default_cube_texture")]
    pub cube_texture: PathBuf,
    /// Faces in +X, -X, +Y, -Y, +Z, -Z order.
    #[serde(default = "AssetPaths::default_skybox_faces")]
    pub skybox_faces: [PathBuf; 6],
}

impl Default for AssetPaths {
    fn default() -> Self {
        Self {
            cube_texture: Self::default_cube_texture(),
            skybox_faces: Self::default_skybox_faces(),
        }
    }
}

impl AssetPaths {
    fn default_cube_texture() -> PathBuf {
        PathBuf::from("assets/kit.png")
    }

    fn default_skybox_faces() -> [PathBuf; 6] {
        ["px", "nx", "py", "ny", "pz", "nz"].map(|face| PathBuf::from(format!("assets/{face}.png")))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresentModeSetting {
    Fifo,
    FifoRelaxed,
    Immediate,
    Mailbox,
    AutoVsync,
    AutoNoVsync,
}

impl PresentModeSetting {
    fn to_wgpu(&self) -> wgpu::PresentMode {
        match self {
            PresentModeSetting::Fifo => wgpu::PresentMode::Fifo,
            PresentModeSetting::FifoRelaxed => wgpu::PresentMode::FifoRelaxed,
            PresentModeSetting::Immediate => wgpu::PresentMode::Immediate,
            PresentModeSetting::Mailbox => wgpu::PresentMode::Mailbox,
            PresentModeSetting::AutoVsync => wgpu::PresentMode::AutoVsync,
            PresentModeSetting::AutoNoVsync => wgpu::PresentMode::AutoNoVsync,
        }
    }
}

impl Default for PresentModeSetting {
    fn default() -> Self {
        PresentModeSetting::Fifo
    }
}

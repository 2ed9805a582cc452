// renderer/texture.rs (with mipmaps)

use std::path::Path;

use crate::error::RendererError;

/// Color textures are stored linearly to match the non-sRGB swapchain.
const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
/// Edge length of the generated fallback skybox faces.
const FALLBACK_FACE_SIZE: u32 = 64;

/// Number of `block`-sized blocks needed to cover `dim` texels.
pub fn block_count(dim: u32, block: u32) -> u32 {
    dim.div_ceil(block.max(1))
}

/// Number of mip levels in a full chain for a texture of this size.
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    let max_dimension = width.max(height).max(1);
    u32::BITS - max_dimension.leading_zeros()
}

/// Bytes per row of blocks for one mip level, or `None` for formats that
/// have no single copy size (depth/stencil combinations).
fn bytes_per_block_row(format: wgpu::TextureFormat, width: u32) -> Option<u32> {
    let (block_width, _) = format.block_dimensions();
    let block_size = format.block_copy_size(None)?;
    Some(block_count(width, block_width) * block_size)
}

fn write_layer(
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
    layer: u32,
    data: &[u8],
    width: u32,
    height: u32,
) {
    let format = texture.format();
    let (_, block_height) = format.block_dimensions();
    let bytes_per_row = bytes_per_block_row(format, width);

    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d {
                x: 0,
                y: 0,
                z: layer,
            },
            aspect: wgpu::TextureAspect::All,
        },
        data,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row,
            rows_per_image: Some(block_count(height, block_height)),
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
}

#[derive(Debug)]
pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl Texture {
    /// Load texture from file path with mipmaps
    pub fn from_path(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: impl AsRef<Path>,
    ) -> Result<Self, RendererError> {
        let path = path.as_ref();
        log::info!("Loading texture: {:?}", path);

        let rgba = load_rgba(path)?;
        let (width, height) = rgba.dimensions();
        Ok(Self::from_rgba8(
            device,
            queue,
            &rgba,
            width,
            height,
            path.to_str(),
        ))
    }

    /// Load `path`, or fall back to a checkerboard if it cannot be read.
    pub fn from_path_or_checkerboard(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: impl AsRef<Path>,
    ) -> Self {
        let path = path.as_ref();
        match Self::from_path(device, queue, path) {
            Ok(texture) => texture,
            Err(err) => {
                log::warn!("{}. Using a checkerboard texture instead.", err);
                Self::checkerboard(
                    device,
                    queue,
                    256,
                    32,
                    [235, 200, 120, 255],
                    [60, 45, 30, 255],
                    Some("CheckerboardTexture"),
                )
            }
        }
    }

    /// Create texture from rgba8 data with mipmaps
    pub fn from_rgba8(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        data: &[u8],
        width: u32,
        height: u32,
        label: Option<&str>,
    ) -> Self {
        let mip_level_count = mip_level_count(width, height);

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label,
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: COLOR_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_DST
                | wgpu::TextureUsages::RENDER_ATTACHMENT, // Needed for mipmap generation
            view_formats: &[],
        });

        write_layer(queue, &texture, 0, data, width, height);

        Self::generate_mipmaps(device, queue, &texture, mip_level_count);

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label,
            ..Default::default()
        });

        Self { texture, view }
    }

    /// Create a procedural checkerboard texture
    pub fn checkerboard(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        size: u32,
        checker_size: u32,
        color1: [u8; 4],
        color2: [u8; 4],
        label: Option<&str>,
    ) -> Self {
        let pixels = checkerboard_pixels(size, checker_size, color1, color2);
        Self::from_rgba8(device, queue, &pixels, size, size, label)
    }

    /// Cubemap from six equally sized face images in +X, -X, +Y, -Y, +Z, -Z
    /// order.
    pub fn cubemap_from_paths<P: AsRef<Path>>(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        paths: &[P; 6],
    ) -> Result<Self, RendererError> {
        let mut faces = Vec::with_capacity(6);
        for path in paths {
            log::info!("Loading cubemap face: {:?}", path.as_ref());
            faces.push(load_rgba(path.as_ref())?);
        }

        let expected = faces[0].dimensions();
        if let Some((face, image)) = faces
            .iter()
            .enumerate()
            .find(|(_, image)| image.dimensions() != expected)
        {
            return Err(RendererError::MismatchedCubeFaces {
                face,
                expected,
                found: image.dimensions(),
            });
        }

        let data = faces.iter().map(|image| image.as_raw().as_slice());
        Ok(Self::cubemap_from_rgba8(
            device, queue, data, expected.0, expected.1,
        ))
    }

    /// Load the skybox faces, or generate a gradient sky if any face is
    /// missing or the faces disagree in size.
    pub fn cubemap_from_paths_or_gradient<P: AsRef<Path>>(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        paths: &[P; 6],
    ) -> Self {
        match Self::cubemap_from_paths(device, queue, paths) {
            Ok(texture) => texture,
            Err(err) => {
                log::warn!("{}. Using a generated sky instead.", err);
                let faces: Vec<Vec<u8>> = (0..6)
                    .map(|face| gradient_sky_face(face, FALLBACK_FACE_SIZE))
                    .collect();
                Self::cubemap_from_rgba8(
                    device,
                    queue,
                    faces.iter().map(Vec::as_slice),
                    FALLBACK_FACE_SIZE,
                    FALLBACK_FACE_SIZE,
                )
            }
        }
    }

    fn cubemap_from_rgba8<'d>(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        faces: impl Iterator<Item = &'d [u8]>,
        width: u32,
        height: u32,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("CubemapTexture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 6,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: COLOR_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (layer, data) in faces.take(6).enumerate() {
            write_layer(queue, &texture, layer as u32, data, width, height);
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("CubemapTextureView"),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            array_layer_count: Some(6),
            ..Default::default()
        });

        Self { texture, view }
    }

    /// Generate mipmaps using GPU rendering
    fn generate_mipmaps(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        texture: &wgpu::Texture,
        mip_level_count: u32,
    ) {
        if mip_level_count <= 1 {
            return;
        }
        let format = texture.format();

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Blit Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shader/blit.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Blit Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Blit Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Blit Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Mip Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Mipmap Generator"),
        });

        let mip_view = |mip: u32, usage: wgpu::TextureUsages| {
            texture.create_view(&wgpu::TextureViewDescriptor {
                label: Some("Mip View"),
                format: Some(format),
                dimension: Some(wgpu::TextureViewDimension::D2),
                aspect: wgpu::TextureAspect::All,
                base_mip_level: mip,
                mip_level_count: Some(1),
                base_array_layer: 0,
                array_layer_count: Some(1),
                usage: Some(usage),
            })
        };

        for target_mip in 1..mip_level_count {
            let src_view = mip_view(target_mip - 1, wgpu::TextureUsages::TEXTURE_BINDING);
            let dst_view = mip_view(target_mip, wgpu::TextureUsages::RENDER_ATTACHMENT);

            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Mip Bind Group"),
                layout: &bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&src_view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&sampler),
                    },
                ],
            });

            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Mipmap Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &dst_view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            rpass.set_pipeline(&pipeline);
            rpass.set_bind_group(0, &bind_group, &[]);
            rpass.draw(0..3, 0..1); // Fullscreen triangle
        }

        queue.submit(Some(encoder.finish()));
    }
}

/// Wrap-addressed sampler shared by the cube texture and the skybox.
pub fn anisotropic_sampler(device: &wgpu::Device, max_anisotropy: u16) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("TextureSampler"),
        address_mode_u: wgpu::AddressMode::Repeat,
        address_mode_v: wgpu::AddressMode::Repeat,
        address_mode_w: wgpu::AddressMode::Repeat,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Linear,
        anisotropy_clamp: max_anisotropy.clamp(1, 16),
        ..Default::default()
    })
}

fn load_rgba(path: &Path) -> Result<image::RgbaImage, RendererError> {
    let img = image::open(path).map_err(|source| RendererError::Image {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(img.to_rgba8())
}

fn checkerboard_pixels(size: u32, checker_size: u32, color1: [u8; 4], color2: [u8; 4]) -> Vec<u8> {
    let checker_size = checker_size.max(1);
    let mut pixels = vec![0u8; (size * size * 4) as usize];

    for y in 0..size {
        for x in 0..size {
            let checker_x = (x / checker_size) % 2;
            let checker_y = (y / checker_size) % 2;
            let color = if (checker_x + checker_y) % 2 == 0 {
                color1
            } else {
                color2
            };
            let idx = ((y * size + x) * 4) as usize;
            pixels[idx..idx + 4].copy_from_slice(&color);
        }
    }

    pixels
}

/// A vertical horizon-to-zenith gradient for the side faces, a flat sky
/// for +Y and flat ground for -Y.
fn gradient_sky_face(face: u32, size: u32) -> Vec<u8> {
    const ZENITH: [f32; 3] = [40.0, 90.0, 180.0];
    const HORIZON: [f32; 3] = [190.0, 210.0, 235.0];
    const GROUND: [f32; 3] = [70.0, 60.0, 50.0];

    let mut pixels = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        // Cube face rows run top to bottom.
        let t = y as f32 / (size.max(2) - 1) as f32;
        let rgb = match face {
            2 => ZENITH,
            3 => GROUND,
            _ if t < 0.5 => lerp(ZENITH, HORIZON, t * 2.0),
            _ => lerp(HORIZON, GROUND, (t - 0.5) * 2.0),
        };
        for _ in 0..size {
            pixels.extend_from_slice(&[rgb[0] as u8, rgb[1] as u8, rgb[2] as u8, 255]);
        }
    }
    pixels
}

fn lerp(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mip_level_calculation() {
        // 1x1 should have 1 mip level
        assert_eq!(mip_level_count(1, 1), 1);

        // 4x4 should have 3 mip levels (4x4, 2x2, 1x1)
        assert_eq!(mip_level_count(4, 4), 3);

        assert_eq!(mip_level_count(256, 256), 9);
        assert_eq!(mip_level_count(2048, 2048), 12);

        // Non-square textures use the larger dimension
        assert_eq!(mip_level_count(256, 128), 9);
        assert_eq!(mip_level_count(128, 256), 9);

        // NPOT
        assert_eq!(mip_level_count(100, 100), 7);
        assert_eq!(mip_level_count(1920, 1080), 11);
    }

    #[test]
    fn block_count_rounds_up() {
        assert_eq!(block_count(256, 4), 64);
        assert_eq!(block_count(257, 4), 65);
        assert_eq!(block_count(1, 4), 1);
        assert_eq!(block_count(7, 1), 7);
    }

    #[test]
    fn row_pitch_accounts_for_compressed_blocks() {
        assert_eq!(
            bytes_per_block_row(wgpu::TextureFormat::Rgba8Unorm, 10),
            Some(40)
        );
        // 4x4 blocks of 8 bytes.
        assert_eq!(
            bytes_per_block_row(wgpu::TextureFormat::Bc1RgbaUnorm, 10),
            Some(24)
        );
    }

    #[test]
    fn checkerboard_alternates_cells() {
        let white = [255, 255, 255, 255];
        let black = [0, 0, 0, 255];
        let pixels = checkerboard_pixels(4, 2, white, black);

        let at = |x: usize, y: usize| &pixels[(y * 4 + x) * 4..(y * 4 + x) * 4 + 4];
        assert_eq!(at(0, 0), white);
        assert_eq!(at(2, 0), black);
        assert_eq!(at(0, 2), black);
        assert_eq!(at(3, 3), white);
    }

    #[test]
    fn gradient_faces_are_fully_opaque_and_sized() {
        for face in 0..6 {
            let pixels = gradient_sky_face(face, 8);
            assert_eq!(pixels.len(), 8 * 8 * 4);
            assert!(pixels.chunks(4).all(|px| px[3] == 255));
        }
    }

    #[test]
    fn side_faces_fade_from_sky_to_ground() {
        let pixels = gradient_sky_face(0, 16);
        let top_blue = pixels[2];
        let bottom_blue = pixels[(15 * 16) * 4 + 2];
        assert!(top_blue > bottom_blue);
    }

    // This test requires a GPU
    #[test]
    #[ignore]
    fn test_texture_creation_with_mipmaps() {
        pollster::block_on(async {
            let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
                backends: wgpu::Backends::all(),
                ..Default::default()
            });

            let adapter = instance
                .request_adapter(&wgpu::RequestAdapterOptions::default())
                .await
                .expect("Failed to find adapter");

            let (device, queue) = adapter
                .request_device(&wgpu::DeviceDescriptor::default())
                .await
                .expect("Failed to create device");

            let data = vec![255u8; 4 * 4 * 4];
            let texture = Texture::from_rgba8(&device, &queue, &data, 4, 4, Some("Test Texture"));
            assert_eq!(texture.texture.mip_level_count(), 3);

            let sky = Texture::cubemap_from_paths_or_gradient(
                &device,
                &queue,
                &["missing/px.png"; 6],
            );
            assert_eq!(sky.texture.depth_or_array_layers(), 6);
            assert_eq!(sky.texture.width(), FALLBACK_FACE_SIZE);
        });
    }
}

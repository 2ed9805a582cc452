use glam::{Mat4, Vec3, Vec4};

use super::{begin_pass, FrameContext, FrameStage, StageInit};
use crate::renderer::buffers::{Mesh, SceneBuffer, ViewBuffer};
use crate::renderer::depth::{Depth, DepthMode};
use crate::renderer::pipeline_builder::{PipelineBuilder, TRANSLUCENT_BLEND};
use crate::renderer::primitives;
use crate::renderer::sorting::sort_back_to_front;
use crate::renderer::texture::{anisotropic_sampler, Texture};
use crate::renderer::uniforms::{SceneUniform, TRANSLUCENT_COLOR};
use crate::renderer::vertex::{PositionVertex, TextureVertex};

pub const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.1,
    g: 0.1,
    b: 0.1,
    a: 0.1,
};

/// Static opaque cube drawn before the animated one.
pub const OPAQUE_CUBE_POSITION: Vec3 = Vec3::new(-2.8, 1.0, -1.8);

pub const TRANSLUCENT_CUBE_POSITIONS: [Vec3; 3] = [
    Vec3::new(4.5, 3.0, 0.7),
    Vec3::new(-2.5, 1.0, 1.7),
    Vec3::new(0.5, 3.0, -0.7),
];

/// Per-draw uniform offsets for the current frame, in draw order.
#[derive(Debug, Default)]
struct FrameDraws {
    opaque: Vec<u32>,
    skybox: u32,
    translucent: Vec<u32>,
}

/// Textured cubes, a cubemap skybox and painter-sorted translucent cubes.
pub struct TexturedStage {
    cube_mesh: Mesh,
    sky_mesh: Mesh,
    view_buffer: ViewBuffer,
    scene_buffer: SceneBuffer,
    cube_bind_group: wgpu::BindGroup,
    sky_bind_group: wgpu::BindGroup,
    opaque_pipeline: wgpu::RenderPipeline,
    sky_pipeline: wgpu::RenderPipeline,
    translucent_pipeline: wgpu::RenderPipeline,
    draws: FrameDraws,
    viewport: (u32, u32),
    _cube_texture: Texture,
    _sky_texture: Texture,
    _sampler: wgpu::Sampler,
}

impl TexturedStage {
    pub fn new(init: &StageInit<'_>) -> Self {
        let device = init.device;
        let assets = &init.settings.assets;

        let (vertices, indices) = primitives::textured_cube();
        let cube_mesh = Mesh::new(device, "TexturedCube", &vertices, &indices);
        let (vertices, indices) = primitives::skybox_sphere();
        let sky_mesh = Mesh::new(device, "Skybox", &vertices, &indices);

        let cube_texture =
            Texture::from_path_or_checkerboard(device, init.queue, &assets.cube_texture);
        let sky_texture =
            Texture::cubemap_from_paths_or_gradient(device, init.queue, &assets.skybox_faces);
        let sampler = anisotropic_sampler(device, init.settings.max_anisotropy);

        let view_buffer = ViewBuffer::new(device);
        let scene_buffer = SceneBuffer::new(device);

        let cube_texture_layout = texture_bind_layout(
            device,
            "CubeTextureBindLayout",
            wgpu::TextureViewDimension::D2,
        );
        let sky_texture_layout = texture_bind_layout(
            device,
            "SkyboxTextureBindLayout",
            wgpu::TextureViewDimension::Cube,
        );
        let cube_bind_group = texture_bind_group(
            device,
            "CubeTextureBindGroup",
            &cube_texture_layout,
            &cube_texture,
            &sampler,
        );
        let sky_bind_group = texture_bind_group(
            device,
            "SkyboxTextureBindGroup",
            &sky_texture_layout,
            &sky_texture,
            &sampler,
        );

        let cube_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("TexturedShader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../../shader/textured.wgsl").into()),
        });
        let sky_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("SkyboxShader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../../shader/skybox.wgsl").into()),
        });

        let cube_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("TexturedPipelineLayout"),
            bind_group_layouts: &[
                &view_buffer.bind_layout,
                &scene_buffer.bind_layout,
                &cube_texture_layout,
            ],
            push_constant_ranges: &[],
        });
        let sky_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("SkyboxPipelineLayout"),
            bind_group_layouts: &[
                &view_buffer.bind_layout,
                &scene_buffer.bind_layout,
                &sky_texture_layout,
            ],
            push_constant_ranges: &[],
        });

        let opaque_pipeline = PipelineBuilder::new(device, &cube_layout, &cube_shader)
            .with_label("OpaquePipeline")
            .with_vertex_buffer(TextureVertex::layout())
            .with_color_target(init.color_format)
            .with_depth(init.depth, DepthMode::ReadWrite)
            .build();

        // The camera sits inside the sphere.
        let sky_pipeline = PipelineBuilder::new(device, &sky_layout, &sky_shader)
            .with_label("SkyboxPipeline")
            .with_vertex_buffer(PositionVertex::layout())
            .with_color_target(init.color_format)
            .with_depth(init.depth, DepthMode::Read)
            .with_no_culling()
            .build();

        let translucent_pipeline = PipelineBuilder::new(device, &cube_layout, &cube_shader)
            .with_label("TranslucentPipeline")
            .with_fragment_entry("fs_translucent")
            .with_vertex_buffer(TextureVertex::layout())
            .with_blended_color_target(
                init.color_format,
                Some(TRANSLUCENT_BLEND),
                wgpu::ColorWrites::COLOR,
            )
            .with_depth(init.depth, DepthMode::Read)
            .build();

        Self {
            cube_mesh,
            sky_mesh,
            view_buffer,
            scene_buffer,
            cube_bind_group,
            sky_bind_group,
            opaque_pipeline,
            sky_pipeline,
            translucent_pipeline,
            draws: FrameDraws::default(),
            viewport: (1, 1),
            _cube_texture: cube_texture,
            _sky_texture: sky_texture,
            _sampler: sampler,
        }
    }
}

impl FrameStage for TexturedStage {
    fn label(&self) -> &'static str {
        "Textured"
    }

    fn prepare(&mut self, frame: &FrameContext<'_>) {
        let camera = frame.scene.camera();
        self.viewport = (frame.size.width.max(1), frame.size.height.max(1));
        self.view_buffer.update(frame.queue, &frame.view_uniform());

        let draws = &mut self.draws;
        let scene_buffer = &mut self.scene_buffer;
        scene_buffer.begin_frame();

        draws.opaque.clear();
        for model in opaque_models(frame.scene.model_transform()) {
            draws.opaque.push(scene_buffer.push(SceneUniform::new(model)));
        }

        let radius = camera.skybox_radius(frame.aspect_ratio());
        draws.skybox = scene_buffer.push(SceneUniform::new(Mat4::from_scale(Vec3::splat(radius))));

        let translucent = translucent_models();
        let tint = Vec4::from_array(TRANSLUCENT_COLOR);
        draws.translucent.clear();
        for index in sort_back_to_front(&translucent, camera.view()) {
            draws
                .translucent
                .push(scene_buffer.push(SceneUniform::tinted(translucent[index], tint)));
        }

        scene_buffer.flush(frame.device, frame.queue);
    }

    fn record(&self, encoder: &mut wgpu::CommandEncoder, target: &wgpu::TextureView, depth: &Depth) {
        let mut pass = begin_pass(encoder, "TexturedPass", target, CLEAR_COLOR, Some(depth));

        let (width, height) = self.viewport;
        pass.set_viewport(0.0, 0.0, width as f32, height as f32, 0.0, 1.0);
        pass.set_scissor_rect(0, 0, width, height);
        pass.set_bind_group(0, &self.view_buffer.bind_group, &[]);

        pass.set_pipeline(&self.opaque_pipeline);
        pass.set_bind_group(2, &self.cube_bind_group, &[]);
        self.cube_mesh.bind(&mut pass);
        for &offset in &self.draws.opaque {
            pass.set_bind_group(1, &self.scene_buffer.bind_group, &[offset]);
            self.cube_mesh.draw(&mut pass);
        }

        pass.set_pipeline(&self.sky_pipeline);
        pass.set_bind_group(1, &self.scene_buffer.bind_group, &[self.draws.skybox]);
        pass.set_bind_group(2, &self.sky_bind_group, &[]);
        self.sky_mesh.bind(&mut pass);
        self.sky_mesh.draw(&mut pass);

        pass.set_pipeline(&self.translucent_pipeline);
        pass.set_bind_group(2, &self.cube_bind_group, &[]);
        self.cube_mesh.bind(&mut pass);
        for &offset in &self.draws.translucent {
            pass.set_bind_group(1, &self.scene_buffer.bind_group, &[offset]);
            self.cube_mesh.draw(&mut pass);
        }
    }
}

/// Opaque cubes in draw order: the static cube, then the animated one.
pub fn opaque_models(animated: Mat4) -> [Mat4; 2] {
    [Mat4::from_translation(OPAQUE_CUBE_POSITION), animated]
}

pub fn translucent_models() -> [Mat4; 3] {
    TRANSLUCENT_CUBE_POSITIONS.map(Mat4::from_translation)
}

fn texture_bind_layout(
    device: &wgpu::Device,
    label: &str,
    view_dimension: wgpu::TextureViewDimension,
) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension,
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
    })
}

fn texture_bind_group(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::BindGroupLayout,
    texture: &Texture,
    sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_cube_is_drawn_before_animated_cube() {
        let animated = Mat4::from_rotation_y(1.0);
        let [first, second] = opaque_models(animated);
        assert_eq!(first.w_axis.truncate(), OPAQUE_CUBE_POSITION);
        assert_eq!(second, animated);
    }

    /// Face index and (u, v) a cube texture fetch picks for `dir`, in the
    /// +X, -X, +Y, -Y, +Z, -Z layer order.
    fn cube_face_uv(dir: Vec3) -> (usize, f32, f32) {
        let a = dir.abs();
        let (face, sc, tc, ma) = if a.x >= a.y && a.x >= a.z {
            if dir.x > 0.0 {
                (0, -dir.z, -dir.y, a.x)
            } else {
                (1, dir.z, -dir.y, a.x)
            }
        } else if a.y >= a.z {
            if dir.y > 0.0 {
                (2, dir.x, dir.z, a.y)
            } else {
                (3, dir.x, -dir.z, a.y)
            }
        } else if dir.z > 0.0 {
            (4, dir.x, -dir.y, a.z)
        } else {
            (5, -dir.x, -dir.y, a.z)
        };
        (face, (sc / ma + 1.0) / 2.0, (tc / ma + 1.0) / 2.0)
    }

    /// The skybox shader's lookup, z mirrored into the cubemap's space.
    fn sky_lookup(world: Vec3) -> Vec3 {
        Vec3::new(world.x, world.y, -world.z)
    }

    #[test]
    fn skybox_shader_mirrors_z_for_lookup() {
        let source = include_str!("../../shader/skybox.wgsl");
        assert!(source.contains("out.direction = vec3<f32>(position.x, position.y, -position.z);"));
    }

    #[test]
    fn skybox_is_not_mirrored_from_inside() {
        let eps = 0.1;
        for forward in [Vec3::X, Vec3::NEG_X, Vec3::Z, Vec3::NEG_Z] {
            let right = forward.cross(Vec3::Y);

            let (face_l, u_left, _) = cube_face_uv(sky_lookup(forward - right * eps));
            let (face_r, u_right, _) = cube_face_uv(sky_lookup(forward + right * eps));
            let (_, _, v_up) = cube_face_uv(sky_lookup(forward + Vec3::Y * eps));
            let (_, _, v_down) = cube_face_uv(sky_lookup(forward - Vec3::Y * eps));

            assert_eq!(face_l, face_r);
            assert!(u_right > u_left, "looking along {forward}: u decreases to the right");
            assert!(v_down > v_up, "looking along {forward}: v decreases downwards");
        }
    }

    #[test]
    fn looking_down_negative_z_shows_the_positive_z_face() {
        let (face, _, _) = cube_face_uv(sky_lookup(Vec3::NEG_Z));
        assert_eq!(face, 4);
    }

    #[test]
    fn translucent_cubes_sort_by_distance_from_default_camera() {
        let camera = crate::scene::Camera::default();
        let models = translucent_models();
        let order = sort_back_to_front(&models, camera.view());

        let distances: Vec<f32> = order
            .iter()
            .map(|&i| -camera.view().transform_point3(models[i].w_axis.truncate()).z)
            .collect();
        assert!(distances.windows(2).all(|w| w[0] >= w[1]));
    }
}

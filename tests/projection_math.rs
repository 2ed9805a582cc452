//! Camera and projection math used by the lab stages.
//!
//! Conventions used in this codebase:
//! - Right-handed view space (camera looks down -Z).
//! - Reversed depth: near plane -> 1, far plane -> 0, cleared to 0.
//! - The skybox is drawn at depth 0 and must never be clipped by the near
//!   plane.
//!
use glam::{Mat4, Vec3, Vec4};
use lab_renderer::renderer::primitives;
use lab_renderer::scene::{Camera, SceneManager};

fn ndc(view_proj: Mat4, world: Vec3) -> Vec3 {
    let clip: Vec4 = view_proj * world.extend(1.0);
    clip.truncate() / clip.w
}

#[test]
fn nearer_points_get_larger_depth() {
    let camera = Camera::default();
    let vp = camera.view_proj(16.0 / 9.0);
    let forward = (camera.target - camera.position()).normalize();

    let near = ndc(vp, camera.position() + forward * 1.0).z;
    let far = ndc(vp, camera.position() + forward * 50.0).z;
    assert!(near > far, "near {near} should be greater than far {far}");
    assert!((0.0..=1.0).contains(&near));
    assert!((0.0..=1.0).contains(&far));
}

#[test]
fn depth_range_ends_are_reversed() {
    let camera = Camera::default();
    let proj = camera.projection(1.0);

    let at_near = proj.project_point3(Vec3::new(0.0, 0.0, -camera.near));
    let at_far = proj.project_point3(Vec3::new(0.0, 0.0, -camera.far));
    assert!((at_near.z - 1.0).abs() < 1e-4);
    assert!(at_far.z.abs() < 1e-4);
}

#[test]
fn skybox_sphere_encloses_near_plane_corners() {
    for aspect in [0.5_f32, 1.0, 16.0 / 9.0, 3.0] {
        let camera = Camera::default();
        let radius = camera.skybox_radius(aspect);

        let half_width = camera.near * (camera.fov_x_radians / 2.0).tan();
        let half_height = half_width / aspect;
        let corner = Vec3::new(half_width, half_height, -camera.near);
        assert!(radius > corner.length(), "aspect {aspect}");
    }
}

#[test]
fn scaled_skybox_vertices_stay_beyond_near_plane() {
    let camera = Camera::default();
    let aspect = 16.0 / 9.0;
    let radius = camera.skybox_radius(aspect);
    let (vertices, _) = primitives::skybox_sphere();

    let nearest = vertices
        .iter()
        .map(|v| Vec3::from_array(v.pos).length() * radius)
        .fold(f32::INFINITY, f32::min);
    assert!(nearest > camera.near);
}

#[test]
fn camera_transform_places_camera_at_orbit_position() {
    let mut scene = SceneManager::new(0.0);
    scene.on_scroll(2.0);
    scene.update(0.016);

    let origin = scene.camera_transform().transform_point3(Vec3::ZERO);
    assert!(origin.abs_diff_eq(scene.camera().position(), 1e-4));
}

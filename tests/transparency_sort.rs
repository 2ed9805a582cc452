//! Painter's-algorithm ordering of the translucent cubes.
//!
//! Translucent cubes are drawn with depth writes disabled, so they must be
//! submitted farthest first for `src * a + dst * (1 - a)` to composite
//! correctly.
//!
use glam::{Mat4, Vec3};
use lab_renderer::renderer::sort_back_to_front;
use lab_renderer::renderer::stages::translucent_models;
use lab_renderer::scene::Camera;

fn view_distance(view: Mat4, model: Mat4) -> f32 {
    -view.transform_point3(model.transform_point3(Vec3::ZERO)).z
}

#[test]
fn order_follows_camera_around_the_scene() {
    let models = translucent_models();

    for step in 0..16 {
        let mut camera = Camera::default();
        camera.orbit(step as f32 * std::f32::consts::TAU / 16.0, 0.0);
        let view = camera.view();

        let order = sort_back_to_front(&models, view);
        let distances: Vec<f32> = order.iter().map(|&i| view_distance(view, models[i])).collect();
        assert!(
            distances.windows(2).all(|w| w[0] >= w[1]),
            "step {step}: {distances:?}"
        );
    }
}

#[test]
fn opposite_views_reverse_the_order() {
    let models = [
        Mat4::from_translation(Vec3::new(0.0, 0.0, -3.0)),
        Mat4::from_translation(Vec3::ZERO),
        Mat4::from_translation(Vec3::new(0.0, 0.0, 3.0)),
    ];

    let front = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, Vec3::Y);
    let back = Mat4::look_at_rh(Vec3::new(0.0, 0.0, -10.0), Vec3::ZERO, Vec3::Y);

    assert_eq!(sort_back_to_front(&models, front), vec![0, 1, 2]);
    assert_eq!(sort_back_to_front(&models, back), vec![2, 1, 0]);
}

#[test]
fn rotation_of_a_model_does_not_change_its_depth() {
    let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, Vec3::Y);
    let spun = Mat4::from_translation(Vec3::new(0.0, 0.0, 1.0)) * Mat4::from_rotation_y(2.0);
    let plain = Mat4::from_translation(Vec3::new(0.0, 0.0, -1.0));

    assert_eq!(sort_back_to_front(&[spun, plain], view), vec![1, 0]);
}

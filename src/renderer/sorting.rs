// renderer/sorting.rs
use glam::{Mat4, Vec3};

/// Orders `models` for painter's-algorithm drawing: farthest from the
/// camera first.
///
/// Depth is the view-space `z` of each model's translation. The camera
/// looks down `-z`, so farther objects have smaller `z`. Objects at equal
/// depth keep their input order. NaN depths still yield a total order.
pub fn sort_back_to_front(models: &[Mat4], view: Mat4) -> Vec<usize> {
    let depths: Vec<f32> = models
        .iter()
        .map(|model| view_depth(*model, view))
        .collect();

    let mut order: Vec<usize> = (0..models.len()).collect();
    order.sort_by(|&a, &b| depths[a].total_cmp(&depths[b]));
    order
}

fn view_depth(model: Mat4, view: Mat4) -> f32 {
    let center = model.transform_point3(Vec3::ZERO);
    view.transform_point3(center).z
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn farthest_model_comes_first() {
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, Vec3::Y);
        let models = [
            Mat4::from_translation(Vec3::new(0.0, 0.0, 5.0)),
            Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0)),
            Mat4::from_translation(Vec3::ZERO),
        ];

        assert_eq!(sort_back_to_front(&models, view), vec![1, 2, 0]);
    }

    #[test]
    fn equal_depths_keep_input_order() {
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, Vec3::Y);
        let models = [
            Mat4::from_translation(Vec3::new(-1.0, 0.0, 0.0)),
            Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0)),
            Mat4::from_translation(Vec3::new(0.0, 2.0, 0.0)),
        ];

        assert_eq!(sort_back_to_front(&models, view), vec![0, 1, 2]);
    }

    #[test]
    fn nan_depths_keep_finite_models_ordered() {
        let nan = Mat4::from_translation(Vec3::new(0.0, 0.0, f32::NAN));
        let at = |z: f32| Mat4::from_translation(Vec3::new(0.0, 0.0, z));
        let models = [at(1.0), nan, at(-3.0), nan, at(-1.0), nan, at(2.0)];

        let order = sort_back_to_front(&models, Mat4::IDENTITY);

        let mut seen = order.clone();
        seen.sort_unstable();
        assert_eq!(seen, (0..models.len()).collect::<Vec<_>>());

        let finite: Vec<usize> = order.into_iter().filter(|i| i % 2 == 0).collect();
        assert_eq!(finite, vec![2, 4, 0, 6]);
    }

    #[test]
    fn empty_input_is_empty() {
        assert!(sort_back_to_front(&[], Mat4::IDENTITY).is_empty());
    }
}

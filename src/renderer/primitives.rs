use super::vertex::{rgb, ColorVertex, PositionVertex, TextureVertex};
use std::f32::consts::PI;

/// Horizontal segments of the skybox sphere.
pub const SPHERE_H_RES: u16 = 18;
/// Vertical rings of the skybox sphere.
pub const SPHERE_W_RES: u16 = 8;
pub const SPHERE_RADIUS: f32 = 1.1;

/// Clip-space triangle with red, green and blue corners.
pub fn triangle() -> (Vec<ColorVertex>, Vec<u16>) {
    let verts = vec![
        ColorVertex {
            pos: [-0.5, -0.5, 0.0],
            color: rgb(255, 0, 0),
        },
        ColorVertex {
            pos: [0.5, -0.5, 0.0],
            color: rgb(0, 255, 0),
        },
        ColorVertex {
            pos: [0.0, 0.5, 0.0],
            color: rgb(0, 0, 255),
        },
    ];

    (verts, vec![0, 1, 2])
}

/// Eight shared corners of a cube with half-extent 1, one color per corner.
pub fn color_cube() -> (Vec<ColorVertex>, Vec<u16>) {
    let c = |pos: [f32; 3], color: u32| ColorVertex { pos, color };

    let verts = vec![
        c([-1.0, -1.0, -1.0], rgb(0, 150, 150)),
        c([1.0, -1.0, -1.0], rgb(25, 133, 0)),
        c([-1.0, 1.0, -1.0], rgb(0, 25, 70)),
        c([1.0, 1.0, -1.0], rgb(255, 25, 0)),
        c([-1.0, -1.0, 1.0], rgb(200, 70, 55)),
        c([1.0, -1.0, 1.0], rgb(55, 0, 55)),
        c([-1.0, 1.0, 1.0], rgb(0, 255, 255)),
        c([1.0, 1.0, 1.0], rgb(255, 25, 255)),
    ];

    // Counter-clockwise when viewed from outside.
    let idx = vec![
        0, 2, 3, 3, 1, 0, // -Z
        5, 7, 6, 6, 4, 5, // +Z
        2, 0, 4, 4, 6, 2, // -X
        1, 3, 7, 7, 5, 1, // +X
        2, 6, 7, 7, 3, 2, // +Y
        0, 1, 5, 5, 4, 0, // -Y
    ];

    (verts, idx)
}

/// Cube with half-extent 1 and a full texture per face. Seen from outside,
/// `u` runs left to right and `v` top to bottom.
pub fn textured_cube() -> (Vec<TextureVertex>, Vec<u16>) {
    let t = |pos: [f32; 3], uv: [f32; 2]| TextureVertex { pos, uv };

    let verts = vec![
        // +X
        t([1.0, -1.0, -1.0], [1.0, 1.0]),
        t([1.0, 1.0, -1.0], [1.0, 0.0]),
        t([1.0, 1.0, 1.0], [0.0, 0.0]),
        t([1.0, -1.0, 1.0], [0.0, 1.0]),
        // -X
        t([-1.0, -1.0, 1.0], [1.0, 1.0]),
        t([-1.0, 1.0, 1.0], [1.0, 0.0]),
        t([-1.0, 1.0, -1.0], [0.0, 0.0]),
        t([-1.0, -1.0, -1.0], [0.0, 1.0]),
        // +Y
        t([-1.0, 1.0, -1.0], [1.0, 1.0]),
        t([-1.0, 1.0, 1.0], [1.0, 0.0]),
        t([1.0, 1.0, 1.0], [0.0, 0.0]),
        t([1.0, 1.0, -1.0], [0.0, 1.0]),
        // -Y
        t([-1.0, -1.0, 1.0], [1.0, 1.0]),
        t([-1.0, -1.0, -1.0], [1.0, 0.0]),
        t([1.0, -1.0, -1.0], [0.0, 0.0]),
        t([1.0, -1.0, 1.0], [0.0, 1.0]),
        // +Z
        t([1.0, -1.0, 1.0], [1.0, 1.0]),
        t([1.0, 1.0, 1.0], [1.0, 0.0]),
        t([-1.0, 1.0, 1.0], [0.0, 0.0]),
        t([-1.0, -1.0, 1.0], [0.0, 1.0]),
        // -Z
        t([-1.0, -1.0, -1.0], [1.0, 1.0]),
        t([-1.0, 1.0, -1.0], [1.0, 0.0]),
        t([1.0, 1.0, -1.0], [0.0, 0.0]),
        t([1.0, -1.0, -1.0], [0.0, 1.0]),
    ];

    let idx = (0..6u16)
        .flat_map(|f| {
            let o = f * 4;
            [o, o + 1, o + 2, o, o + 2, o + 3]
        })
        .collect::<Vec<_>>();

    (verts, idx)
}

/// Latitude/longitude sphere. Rings run from the +Y pole (`w = 0`) to the
/// -Y pole (`w = w_res`); the degenerate triangle of each pole quad is
/// skipped.
pub fn sphere(h_res: u16, w_res: u16, radius: f32) -> (Vec<PositionVertex>, Vec<u16>) {
    let mut vertices = Vec::with_capacity(((w_res + 1) * (h_res + 1)) as usize);
    let mut indices = Vec::new();

    for w in 0..=w_res {
        let beta = PI * w as f32 / w_res as f32;
        for h in 0..=h_res {
            let alpha = 2.0 * PI * h as f32 / h_res as f32;
            vertices.push(PositionVertex {
                pos: [
                    radius * beta.sin() * alpha.cos(),
                    radius * beta.cos(),
                    radius * beta.sin() * alpha.sin(),
                ],
            });
        }
    }

    for w in 0..w_res {
        for h in 0..h_res {
            let i = w * (h_res + 1) + h;
            let next = i + h_res + 1;
            if w != 0 {
                indices.extend_from_slice(&[next + 1, i + 1, i]);
            }
            if w + 1 != w_res {
                indices.extend_from_slice(&[i, next, next + 1]);
            }
        }
    }

    (vertices, indices)
}

/// The sphere the skybox is drawn with.
pub fn skybox_sphere() -> (Vec<PositionVertex>, Vec<u16>) {
    sphere(SPHERE_H_RES, SPHERE_W_RES, SPHERE_RADIUS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_counts_look_right() {
        let (v, i) = textured_cube();
        assert_eq!(v.len(), 24);
        assert_eq!(i.len(), 36);

        let (v, i) = color_cube();
        assert_eq!(v.len(), 8);
        assert_eq!(i.len(), 36);
        assert!(i.iter().all(|&idx| (idx as usize) < v.len()));
    }

    /// Signed area of a triangle in a y-down plane.
    fn winding(a: glam::Vec2, b: glam::Vec2, c: glam::Vec2) -> f32 {
        (b - a).perp_dot(c - a)
    }

    #[test]
    fn textured_faces_are_not_mirrored() {
        use glam::{Mat4, Vec2, Vec3};

        let (v, _) = textured_cube();
        let proj = Mat4::perspective_rh(1.0, 1.0, 0.1, 100.0);

        for face in v.chunks(4) {
            let normal = face
                .iter()
                .map(|vert| Vec3::from_array(vert.pos))
                .sum::<Vec3>()
                .normalize();
            let up = if normal.y.abs() > 0.5 { Vec3::Z } else { Vec3::Y };
            let view = Mat4::look_at_rh(normal * 5.0, Vec3::ZERO, up);

            let screen: Vec<Vec2> = face[..3]
                .iter()
                .map(|vert| {
                    let ndc = (proj * view).project_point3(Vec3::from_array(vert.pos));
                    Vec2::new(ndc.x, -ndc.y)
                })
                .collect();
            let uv: Vec<Vec2> = face[..3].iter().map(|vert| Vec2::from_array(vert.uv)).collect();

            let screen_area = winding(screen[0], screen[1], screen[2]);
            let uv_area = winding(uv[0], uv[1], uv[2]);
            assert!(screen_area * uv_area > 0.0, "face with normal {normal} is mirrored");
        }
    }

    #[test]
    fn plus_x_face_u_grows_to_the_right() {
        use glam::{Mat4, Vec3};

        let (v, _) = textured_cube();
        let vp = Mat4::perspective_rh(1.0, 1.0, 0.1, 100.0)
            * Mat4::look_at_rh(Vec3::new(5.0, 0.0, 0.0), Vec3::ZERO, Vec3::Y);

        let mut by_x: Vec<(f32, f32)> = v[..4]
            .iter()
            .map(|vert| (vp.project_point3(Vec3::from_array(vert.pos)).x, vert.uv[0]))
            .collect();
        by_x.sort_by(|a, b| a.0.total_cmp(&b.0));

        assert_eq!(by_x[0].1, 0.0);
        assert_eq!(by_x[1].1, 0.0);
        assert_eq!(by_x[2].1, 1.0);
        assert_eq!(by_x[3].1, 1.0);
    }

    #[test]
    fn skybox_sphere_has_756_indices() {
        let (v, i) = skybox_sphere();
        assert_eq!(v.len(), 9 * 19);
        assert_eq!(i.len(), 756);
        assert!(i.iter().all(|&idx| (idx as usize) < v.len()));
    }

    #[test]
    fn sphere_vertices_lie_on_radius() {
        let (v, _) = sphere(12, 6, 2.0);
        for vertex in v {
            let [x, y, z] = vertex.pos;
            let len = (x * x + y * y + z * z).sqrt();
            assert!((len - 2.0).abs() < 1e-5);
        }
    }
}

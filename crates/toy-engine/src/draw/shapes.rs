use std::f32::consts::{FRAC_PI_2, PI, TAU};

use glam::{Mat4, Quat, Vec3};

use crate::color::Color;
use crate::error::DegenerateGeometryError;

use super::Draw;

/// Segments per circle (cones, cylinders, sphere rings).
pub const CIRCLE_SEGMENTS: usize = 8;

/// Latitude subdivisions of a wire sphere, pole to pole.
pub const SPHERE_LONGITUDE_SEGMENTS: usize = 8;

/// Unit cube corners: lower face (`y = -0.5`) then upper face (`y = 0.5`),
/// same winding on both.
pub const CUBE_VERTICES: [Vec3; 8] = [
    Vec3::new(-0.5, -0.5, -0.5),
    Vec3::new(-0.5, -0.5, 0.5),
    Vec3::new(0.5, -0.5, 0.5),
    Vec3::new(0.5, -0.5, -0.5),
    Vec3::new(-0.5, 0.5, -0.5),
    Vec3::new(-0.5, 0.5, 0.5),
    Vec3::new(0.5, 0.5, 0.5),
    Vec3::new(0.5, 0.5, -0.5),
];

/// Unit circle in the XZ plane, starting on +X.
pub fn circle_points() -> [Vec3; CIRCLE_SEGMENTS] {
    let step = TAU / CIRCLE_SEGMENTS as f32;
    std::array::from_fn(|i| {
        let a = i as f32 * step;
        Vec3::new(a.cos(), 0.0, a.sin())
    })
}

pub(super) fn sphere<D: Draw + ?Sized>(draw: &mut D, position: Vec3, radius: f32, color: Color) {
    let step = PI / SPHERE_LONGITUDE_SEGMENTS as f32;
    let circle = circle_points();

    let mut ring = [position + Vec3::Y * radius; CIRCLE_SEGMENTS];
    for i in 1..SPHERE_LONGITUDE_SEGMENTS {
        let phi = i as f32 * step;
        let center = position + Vec3::Y * (radius * phi.cos());
        let ring_radius = radius * phi.sin();
        let next = circle.map(|p| center + p * ring_radius);

        draw.draw_polygon(&next, color);
        draw.draw_pair_lines(&ring, &next, color);
        ring = next;
    }

    let south = [position - Vec3::Y * radius; CIRCLE_SEGMENTS];
    draw.draw_pair_lines(&ring, &south, color);
}

pub(super) fn cone<D: Draw + ?Sized>(
    draw: &mut D,
    matrix: &Mat4,
    radius: f32,
    height: f32,
    color: Color,
) {
    let tip = matrix.transform_point3(Vec3::Y * height);
    let base = circle_points().map(|p| matrix.transform_point3(p * radius));
    draw.draw_polygon(&base, color);
    draw.draw_tip_lines(tip, &base, color);
}

pub(super) fn cylinder<D: Draw + ?Sized>(
    draw: &mut D,
    start: Vec3,
    end: Vec3,
    radius: f32,
    color: Color,
) -> Result<(), DegenerateGeometryError> {
    let Some(normal) = (end - start).try_normalize() else {
        return Err(DegenerateGeometryError {
            shape: "cylinder",
            start,
            end,
        });
    };

    let rotation = Quat::from_rotation_arc(Vec3::Y, normal);
    let scale = Vec3::splat(radius);
    let m0 = Mat4::from_scale_rotation_translation(scale, rotation, start);
    let m1 = Mat4::from_scale_rotation_translation(scale, rotation, end);

    let circle = circle_points();
    let ring0 = circle.map(|p| m0.transform_point3(p));
    let ring1 = circle.map(|p| m1.transform_point3(p));

    draw.draw_polygon(&ring0, color);
    draw.draw_polygon(&ring1, color);
    draw.draw_pair_lines(&ring0, &ring1, color);
    draw.draw_point(start, color);
    draw.draw_point(end, color);
    Ok(())
}

pub(super) fn grid<D: Draw + ?Sized>(draw: &mut D, step: f32, n: u32, color: Color) {
    draw.draw_point(Vec3::ZERO, color);

    let border = n as f32 * step;
    for i in 1..=n {
        let seg = i as f32 * step;
        draw.draw_line(Vec3::new(-seg, 0.0, -border), Vec3::new(-seg, 0.0, border), color);
        draw.draw_line(Vec3::new(seg, 0.0, -border), Vec3::new(seg, 0.0, border), color);
        draw.draw_line(Vec3::new(-border, 0.0, -seg), Vec3::new(border, 0.0, -seg), color);
        draw.draw_line(Vec3::new(-border, 0.0, seg), Vec3::new(border, 0.0, seg), color);
    }

    draw.draw_line(Vec3::new(-border, 0.0, 0.0), Vec3::new(border, 0.0, 0.0), Color::RED);
    draw.draw_point(Vec3::new(border, 0.0, 0.0), Color::RED);
    draw.draw_line(Vec3::new(0.0, 0.0, -border), Vec3::new(0.0, 0.0, border), Color::BLUE);
    draw.draw_point(Vec3::new(0.0, 0.0, border), Color::BLUE);
}

pub(super) fn axis<D: Draw + ?Sized>(draw: &mut D, matrix: &Mat4, length: f32) {
    let (_, rotation, position) = matrix.to_scale_rotation_translation();
    let heads = [
        (position + rotation * Vec3::X * length, Color::RED),
        (position + rotation * Vec3::Y * length, Color::GREEN),
        (position + rotation * Vec3::Z * length, Color::BLUE),
    ];

    for (head, color) in heads {
        draw.draw_line(position, head, color);
    }
    for (head, color) in heads {
        draw.draw_point(head, color);
    }

    // Cones are built along +Y, then turned onto X and Z.
    let head_radius = length * 0.1;
    let head_height = head_radius * 3.0;
    let to_head = Mat4::from_translation(Vec3::Y * length);
    let cones = [
        (Mat4::from_rotation_z(-FRAC_PI_2), Color::RED),
        (Mat4::IDENTITY, Color::GREEN),
        (Mat4::from_rotation_x(FRAC_PI_2), Color::BLUE),
    ];
    for (turn, color) in cones {
        draw.draw_cone(&(*matrix * turn * to_head), head_radius, head_height, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::testing::Recorder;

    // ── sphere ────────────────────────────────────────────────────────────

    #[test]
    fn sphere_stays_within_radius() {
        let center = Vec3::new(3.0, -2.0, 7.5);
        let radius = 2.5;
        let mut rec = Recorder::default();
        rec.draw_sphere(center, radius, Color::RED);

        assert!(!rec.lines.is_empty());
        for p in rec.all_positions() {
            assert!(p.distance(center) <= radius + 1e-4, "{p} escapes the sphere");
        }
    }

    #[test]
    fn sphere_line_count() {
        let mut rec = Recorder::default();
        rec.draw_sphere(Vec3::ZERO, 1.0, Color::RED);
        // 7 rings of (polygon + links to previous ring), then links to the south pole.
        let rings = SPHERE_LONGITUDE_SEGMENTS - 1;
        assert_eq!(rec.lines.len(), rings * 2 * CIRCLE_SEGMENTS + CIRCLE_SEGMENTS);
        assert!(rec.points.is_empty());
    }

    // ── cone ──────────────────────────────────────────────────────────────

    #[test]
    fn cone_tip_lines_meet_at_transformed_tip() {
        let m = Mat4::from_translation(Vec3::new(0.0, 1.0, 0.0));
        let mut rec = Recorder::default();
        rec.draw_cone(&m, 0.5, 2.0, Color::CYAN);
        assert_eq!(rec.lines.len(), 2 * CIRCLE_SEGMENTS);
        for line in &rec.lines[CIRCLE_SEGMENTS..] {
            assert!(line.0.distance(Vec3::new(0.0, 3.0, 0.0)) < 1e-6);
        }
    }

    // ── cylinder ──────────────────────────────────────────────────────────

    #[test]
    fn cylinder_along_x() {
        let mut rec = Recorder::default();
        rec.draw_cylinder(Vec3::ZERO, Vec3::new(4.0, 0.0, 0.0), 1.0, Color::BLUE)
            .unwrap();

        assert_eq!(rec.lines.len(), 3 * CIRCLE_SEGMENTS);
        assert_eq!(rec.points.len(), 2);
        // Rings lie in planes perpendicular to the axis.
        for (a, b, _) in &rec.lines[..CIRCLE_SEGMENTS] {
            assert!(a.x.abs() < 1e-5 && b.x.abs() < 1e-5);
            assert!((a.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn cylinder_pointing_down_is_not_degenerate() {
        let mut rec = Recorder::default();
        assert!(rec
            .draw_cylinder(Vec3::Y, -Vec3::Y, 0.5, Color::BLUE)
            .is_ok());
    }

    #[test]
    fn zero_length_cylinder_is_rejected() {
        let mut rec = Recorder::default();
        let p = Vec3::new(1.0, 1.0, 1.0);
        let err = rec.draw_cylinder(p, p, 1.0, Color::BLUE).unwrap_err();
        assert_eq!(err.start, p);
        assert!(rec.lines.is_empty() && rec.points.is_empty());
    }

    // ── grid ──────────────────────────────────────────────────────────────

    #[test]
    fn grid_step_one_n_two() {
        let mut rec = Recorder::default();
        rec.draw_grid(1.0, 2, Color::GRAY);

        assert_eq!(rec.points.len(), 3);
        assert_eq!(rec.lines.len(), 10);
        assert_eq!(rec.points[0], (Vec3::ZERO, Color::GRAY));
        assert_eq!(rec.points[1], (Vec3::new(2.0, 0.0, 0.0), Color::RED));
        assert_eq!(rec.points[2], (Vec3::new(0.0, 0.0, 2.0), Color::BLUE));
        assert_eq!(rec.lines.iter().filter(|l| l.2 == Color::GRAY).count(), 8);
    }

    // ── axis ──────────────────────────────────────────────────────────────

    #[test]
    fn axis_heads_follow_rotation() {
        let m = Mat4::from_rotation_translation(
            Quat::from_rotation_y(FRAC_PI_2),
            Vec3::new(1.0, 0.0, 0.0),
        );
        let mut rec = Recorder::default();
        rec.draw_axis(&m, 2.0);

        // 3 shafts + 3 cones of 2 * CIRCLE_SEGMENTS lines.
        assert_eq!(rec.lines.len(), 3 + 3 * 2 * CIRCLE_SEGMENTS);
        assert_eq!(rec.points.len(), 3);
        // Local +X rotated 90° about Y points to world -Z.
        assert!(rec.points[0].0.distance(Vec3::new(1.0, 0.0, -2.0)) < 1e-5);
        assert_eq!(rec.points[0].1, Color::RED);
    }

    #[test]
    fn axis_x_cone_sits_beyond_the_red_head() {
        let mut rec = Recorder::default();
        rec.draw_axis(&Mat4::IDENTITY, 1.0);
        let red_cone = &rec.lines[3..3 + 2 * CIRCLE_SEGMENTS];
        let tip = red_cone[CIRCLE_SEGMENTS].0;
        assert!(tip.distance(Vec3::new(1.3, 0.0, 0.0)) < 1e-5, "{tip}");
    }
}

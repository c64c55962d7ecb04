//! High-level debug drawing.
//!
//! Every shape is expressed as a sequence of [`Draw::draw_point`] and
//! [`Draw::draw_line`] calls, so anything that can take points and lines
//! (the primitive batch, a [`LocalDraw`] frame, a test recorder) gets the
//! whole shape vocabulary for free.

mod local;
mod shapes;

use glam::{Mat4, Vec3};

use crate::color::Color;
use crate::error::DegenerateGeometryError;

pub use local::LocalDraw;
pub use shapes::{circle_points, CIRCLE_SEGMENTS, CUBE_VERTICES, SPHERE_LONGITUDE_SEGMENTS};

/// Sink for immediate-mode points and lines, plus derived shapes.
pub trait Draw {
    fn draw_point(&mut self, position: Vec3, color: Color);

    fn draw_line(&mut self, start: Vec3, end: Vec3, color: Color);

    /// Lines between consecutive points; `n` points give `n - 1` lines.
    fn draw_polyline(&mut self, points: &[Vec3], color: Color) {
        for pair in points.windows(2) {
            self.draw_line(pair[0], pair[1], color);
        }
    }

    /// Closed loop; `k` points give `k` lines, the closing `(p[k-1], p[0])` first.
    fn draw_polygon(&mut self, points: &[Vec3], color: Color) {
        let Some(&last) = points.last() else {
            return;
        };
        let mut prev = last;
        for &p in points {
            self.draw_line(prev, p, color);
            prev = p;
        }
    }

    /// One line per index pair; extra points on the longer side are ignored.
    fn draw_pair_lines(&mut self, from: &[Vec3], to: &[Vec3], color: Color) {
        for (&a, &b) in from.iter().zip(to) {
            self.draw_line(a, b, color);
        }
    }

    fn draw_tip_lines(&mut self, tip: Vec3, points: &[Vec3], color: Color) {
        for &p in points {
            self.draw_line(tip, p, color);
        }
    }

    /// Wire sphere: latitude rings joined by meridian segments.
    fn draw_sphere(&mut self, position: Vec3, radius: f32, color: Color) {
        shapes::sphere(self, position, radius, color);
    }

    /// Cone with its base circle in the local XZ plane and its tip at `+Y * height`.
    fn draw_cone(&mut self, matrix: &Mat4, radius: f32, height: f32, color: Color) {
        shapes::cone(self, matrix, radius, height, color);
    }

    /// Box from 8 corners: lower face (first 4), upper face (last 4), verticals.
    fn draw_box_vertices(&mut self, vertices: &[Vec3; 8], color: Color) {
        let (lower, upper) = vertices.split_at(4);
        self.draw_polygon(lower, color);
        self.draw_polygon(upper, color);
        self.draw_pair_lines(lower, upper, color);
    }

    /// Axis-aligned cube of edge `length` centered on `position`, plus a center point.
    fn draw_cube(&mut self, position: Vec3, length: f32, color: Color) {
        let vertices = CUBE_VERTICES.map(|v| position + v * length);
        self.draw_box_vertices(&vertices, color);
        self.draw_point(position, color);
    }

    /// Unit cube transformed by `matrix`, plus a point at its translation.
    fn draw_box(&mut self, matrix: &Mat4, color: Color) {
        let vertices = CUBE_VERTICES.map(|v| matrix.transform_point3(v));
        self.draw_box_vertices(&vertices, color);
        self.draw_point(matrix.w_axis.truncate(), color);
    }

    /// Wire cylinder between two end points.
    ///
    /// Fails when `start == end`, since the axis direction is undefined.
    fn draw_cylinder(
        &mut self,
        start: Vec3,
        end: Vec3,
        radius: f32,
        color: Color,
    ) -> Result<(), DegenerateGeometryError> {
        shapes::cylinder(self, start, end, radius, color)
    }

    /// Square grid on the XZ plane, `n` lines each side of the origin, with
    /// the X centerline in red and the Z centerline in blue.
    fn draw_grid(&mut self, step: f32, n: u32, color: Color) {
        shapes::grid(self, step, n, color);
    }

    /// RGB axis triad of `matrix`'s rotation at its translation, with cone heads.
    fn draw_axis(&mut self, matrix: &Mat4, length: f32) {
        shapes::axis(self, matrix, length);
    }
}

impl<D: Draw + ?Sized> Draw for &mut D {
    #[inline]
    fn draw_point(&mut self, position: Vec3, color: Color) {
        (**self).draw_point(position, color);
    }

    #[inline]
    fn draw_line(&mut self, start: Vec3, end: Vec3, color: Color) {
        (**self).draw_line(start, end, color);
    }
}


#[cfg(test)]
mod tests {
    use super::testing::Recorder;
    use super::*;

    fn square() -> Vec<Vec3> {
        vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(0.0, 0.0, 1.0),
        ]
    }

    // ── polyline / polygon ────────────────────────────────────────────────

    #[test]
    fn polygon_on_k_points_emits_k_lines_closing_first() {
        let pts = square();
        let mut rec = Recorder::default();
        rec.draw_polygon(&pts, Color::RED);

        assert_eq!(rec.lines.len(), pts.len());
        assert_eq!((rec.lines[0].0, rec.lines[0].1), (pts[3], pts[0]));
        for i in 1..pts.len() {
            assert_eq!((rec.lines[i].0, rec.lines[i].1), (pts[i - 1], pts[i]));
        }
    }

    #[test]
    fn polyline_is_open() {
        let mut rec = Recorder::default();
        rec.draw_polyline(&square(), Color::RED);
        assert_eq!(rec.lines.len(), 3);
    }

    #[test]
    fn empty_shapes_draw_nothing() {
        let mut rec = Recorder::default();
        rec.draw_polygon(&[], Color::RED);
        rec.draw_polyline(&[Vec3::ONE], Color::RED);
        assert!(rec.lines.is_empty());
    }

    // ── boxes ─────────────────────────────────────────────────────────────

    #[test]
    fn cube_is_twelve_edges_and_a_center() {
        let mut rec = Recorder::default();
        rec.draw_cube(Vec3::new(1.0, 2.0, 3.0), 2.0, Color::GREEN);
        assert_eq!(rec.lines.len(), 12);
        assert_eq!(rec.points, vec![(Vec3::new(1.0, 2.0, 3.0), Color::GREEN)]);
        for p in rec.all_positions() {
            let d = (p - Vec3::new(1.0, 2.0, 3.0)).abs();
            assert!(d.max_element() <= 1.0 + 1e-6);
        }
    }

    #[test]
    fn box_marks_its_translation() {
        let m = Mat4::from_translation(Vec3::new(5.0, 0.0, -1.0)) * Mat4::from_scale(Vec3::splat(3.0));
        let mut rec = Recorder::default();
        rec.draw_box(&m, Color::YELLOW);
        assert_eq!(rec.lines.len(), 12);
        assert_eq!(rec.points[0].0, Vec3::new(5.0, 0.0, -1.0));
    }

    // ── blanket impl ──────────────────────────────────────────────────────

    #[test]
    fn mutable_reference_forwards() {
        let mut rec = Recorder::default();
        {
            let mut by_ref: &mut dyn Draw = &mut rec;
            by_ref.draw_line(Vec3::ZERO, Vec3::X, Color::BLUE);
        }
        assert_eq!(rec.lines.len(), 1);
    }
}

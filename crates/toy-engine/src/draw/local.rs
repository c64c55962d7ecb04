use glam::{Mat4, Vec3};

use crate::color::Color;

use super::Draw;

/// Draws in a local frame: every point is transformed by `matrix` before
/// being forwarded to the parent sink.
///
/// Since it is itself a [`Draw`], local frames nest; the innermost matrix is
/// applied first.
pub struct LocalDraw<'a, D: Draw + ?Sized> {
    parent: &'a mut D,
    matrix: Mat4,
}

impl<'a, D: Draw + ?Sized> LocalDraw<'a, D> {
    pub fn new(parent: &'a mut D, matrix: Mat4) -> Self {
        Self { parent, matrix }
    }

    pub fn matrix(&self) -> &Mat4 {
        &self.matrix
    }
}

impl<D: Draw + ?Sized> Draw for LocalDraw<'_, D> {
    fn draw_point(&mut self, position: Vec3, color: Color) {
        let p = self.matrix.transform_point3(position);
        self.parent.draw_point(p, color);
    }

    fn draw_line(&mut self, start: Vec3, end: Vec3, color: Color) {
        let a = self.matrix.transform_point3(start);
        let b = self.matrix.transform_point3(end);
        self.parent.draw_line(a, b, color);
    }
}

#[cfg(test)]
mod tests {
    use glam::Quat;

    use super::*;
    use crate::draw::testing::Recorder;

    #[test]
    fn points_are_transformed_into_the_parent_frame() {
        let mut rec = Recorder::default();
        let m = Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0));
        LocalDraw::new(&mut rec, m).draw_line(Vec3::ZERO, Vec3::Y, Color::RED);
        assert_eq!(rec.lines[0].0, Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(rec.lines[0].1, Vec3::new(10.0, 1.0, 0.0));
    }

    #[test]
    fn derived_shapes_go_through_the_transform() {
        let mut plain = Recorder::default();
        plain.draw_sphere(Vec3::new(2.0, 0.0, 0.0), 1.0, Color::RED);

        let mut local = Recorder::default();
        LocalDraw::new(&mut local, Mat4::from_translation(Vec3::new(2.0, 0.0, 0.0)))
            .draw_sphere(Vec3::ZERO, 1.0, Color::RED);

        assert_eq!(plain.lines.len(), local.lines.len());
        for (a, b) in plain.lines.iter().zip(&local.lines) {
            assert!(a.0.distance(b.0) < 1e-5 && a.1.distance(b.1) < 1e-5);
        }
    }

    #[test]
    fn nested_frames_apply_inner_matrix_first() {
        let mut rec = Recorder::default();
        let outer = Mat4::from_rotation_translation(Quat::from_rotation_y(std::f32::consts::PI), Vec3::ZERO);
        let inner = Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0));
        {
            let mut parent = LocalDraw::new(&mut rec, outer);
            let mut child = LocalDraw::new(&mut parent, inner);
            child.draw_point(Vec3::ZERO, Color::BLACK);
        }
        // Translate to +X, then rotate half a turn: ends on -X.
        assert!(rec.points[0].0.distance(Vec3::new(-1.0, 0.0, 0.0)) < 1e-5);
    }

    #[test]
    fn wraps_trait_objects() {
        let mut rec = Recorder::default();
        let sink: &mut dyn Draw = &mut rec;
        LocalDraw::new(sink, Mat4::from_scale(Vec3::splat(2.0))).draw_point(Vec3::ONE, Color::RED);
        assert_eq!(rec.points[0].0, Vec3::splat(2.0));
    }
}

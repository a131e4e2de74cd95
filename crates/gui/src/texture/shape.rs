use kurbo::{BezPath, Circle, Point, Rect, Shape};
use shared::ShapeKind;

/// Shapes are authored in a 100 × 100 view box
pub(super) const VIEW_BOX: f64 = 100.0;

pub(super) fn path(shape: ShapeKind) -> BezPath {
    match shape {
        ShapeKind::Circle => Circle::new((50.0, 50.0), 45.0).to_path(0.01),
        ShapeKind::Square => Rect::new(10.0, 10.0, 90.0, 90.0).to_path(0.01),
        ShapeKind::Triangle => polygon(&[(50.0, 10.0), (90.0, 90.0), (10.0, 90.0)]),
        ShapeKind::Star => polygon(&[
            (50.0, 10.0),
            (61.0, 35.0),
            (88.0, 35.0),
            (67.0, 52.0),
            (77.0, 78.0),
            (50.0, 62.0),
            (23.0, 78.0),
            (33.0, 52.0),
            (12.0, 35.0),
            (39.0, 35.0),
        ]),
        ShapeKind::Heart => heart(),
        ShapeKind::Hexagon => polygon(&[
            (50.0, 5.0),
            (90.0, 27.5),
            (90.0, 72.5),
            (50.0, 95.0),
            (10.0, 72.5),
            (10.0, 27.5),
        ]),
    }
}

fn polygon(points: &[(f64, f64)]) -> BezPath {
    let mut path = BezPath::new();
    let mut iter = points.iter().map(|&p| Point::from(p));
    if let Some(first) = iter.next() {
        path.move_to(first);
        for p in iter {
            path.line_to(p);
        }
        path.close_path();
    }
    path
}

fn heart() -> BezPath {
    let mut p = BezPath::new();
    p.move_to((50.0, 90.0));
    p.curve_to((50.0, 90.0), (10.0, 65.0), (10.0, 40.0));
    p.curve_to((10.0, 25.0), (20.0, 15.0), (30.0, 15.0));
    p.curve_to((40.0, 15.0), (50.0, 25.0), (50.0, 25.0));
    p.curve_to((50.0, 25.0), (60.0, 15.0), (70.0, 15.0));
    p.curve_to((80.0, 15.0), (90.0, 25.0), (90.0, 40.0));
    p.curve_to((90.0, 65.0), (50.0, 90.0), (50.0, 90.0));
    p.close_path();
    p
}

#[cfg(test)]
mod tests {
    use shared::Rgb;

    use super::super::{TextureGenerator, SHAPE_TEXTURE_SIZE};
    use super::*;
    use crate::state::settings::FontSettings;

    fn alpha_at(shape: ShapeKind, x: u32, y: u32) -> u8 {
        let gen = TextureGenerator::new(&FontSettings::default());
        gen.shape_bitmap(shape, Rgb::BLACK).get_pixel(x, y).0[3]
    }

    #[test]
    fn test_every_shape_has_ink_in_center() {
        for shape in ShapeKind::all() {
            // Star and heart are hollow-free at the view box center
            assert_eq!(alpha_at(*shape, 100, 110), 255, "{shape:?}");
        }
    }

    #[test]
    fn test_corners_are_transparent() {
        for shape in ShapeKind::all() {
            assert_eq!(alpha_at(*shape, 1, 1), 0, "{shape:?}");
            assert_eq!(alpha_at(*shape, SHAPE_TEXTURE_SIZE - 2, 1), 0, "{shape:?}");
        }
    }

    #[test]
    fn test_circle_area_close_to_analytic() {
        let gen = TextureGenerator::new(&FontSettings::default());
        let img = gen.shape_bitmap(ShapeKind::Circle, Rgb::BLACK);
        let area: f64 = img.pixels().map(|p| p.0[3] as f64 / 255.0).sum();
        let expected = std::f64::consts::PI * 90.0 * 90.0;
        assert!((area - expected).abs() / expected < 0.01, "area = {area}");
    }

    #[test]
    fn test_edges_are_antialiased() {
        let gen = TextureGenerator::new(&FontSettings::default());
        let img = gen.shape_bitmap(ShapeKind::Circle, Rgb::BLACK);
        assert!(img.pixels().any(|p| p.0[3] > 0 && p.0[3] < 255));
    }

    #[test]
    fn test_triangle_apex_is_narrow() {
        // Row just under the apex has far less ink than the base row
        let gen = TextureGenerator::new(&FontSettings::default());
        let img = gen.shape_bitmap(ShapeKind::Triangle, Rgb::BLACK);
        let row_ink = |y: u32| (0..SHAPE_TEXTURE_SIZE).filter(|&x| img.get_pixel(x, y).0[3] > 0).count();
        assert!(row_ink(25) < row_ink(170) / 4);
    }
}

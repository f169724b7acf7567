use crate::utils::clipping::intersection_area;
use crate::utils::primitive::BoxFloat;
use geo::{Coord, LineString, Polygon};
use ndarray::ArrayView1;

/// Rotated bounding box in the format (center x, center y, width, height, angle)
///
/// The angle is kept in radians, normalized into `[0, 2π)` at construction.
///
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct OrientedBox<T: BoxFloat> {
    center_x: T,
    center_y: T,
    width: T,
    height: T,
    angle: T,
}

impl<T: BoxFloat> OrientedBox<T> {
    /// Constructor
    ///
    pub fn new(center_x: T, center_y: T, width: T, height: T, angle: T) -> Self {
        Self {
            center_x,
            center_y,
            width,
            height,
            angle: normalize_angle(angle),
        }
    }

    /// Copies a `[cx, cy, width, height, angle]` row of a box array.
    ///
    /// The row must hold at least 5 values; entry points check the column count.
    ///
    pub fn from_row(row: ArrayView1<T>) -> Self {
        Self::new(row[0], row[1], row[2], row[3], row[4])
    }

    pub fn center_x(&self) -> T {
        self.center_x
    }

    pub fn center_y(&self) -> T {
        self.center_y
    }

    pub fn width(&self) -> T {
        self.width
    }

    pub fn height(&self) -> T {
        self.height
    }

    pub fn angle(&self) -> T {
        self.angle
    }

    pub fn area(&self) -> T {
        self.width * self.height
    }

    /// Radius of the circle circumscribed around the box
    ///
    pub fn radius(&self) -> T {
        let hw = self.width * T::HALF;
        let hh = self.height * T::HALF;
        (hw * hw + hh * hh).sqrt()
    }

    pub fn is_valid(&self) -> bool {
        self.width > T::zero() && self.height > T::zero()
    }

    /// Corner points, clockwise, starting from the top-left corner of the unrotated box
    ///
    pub fn vertices(&self) -> [Coord<T>; 4] {
        let (s, c) = self.angle.sin_cos();

        let half_width = self.width * T::HALF;
        let half_height = self.height * T::HALF;

        let r1x = -half_width * c - half_height * s;
        let r1y = -half_width * s + half_height * c;

        let r2x = half_width * c - half_height * s;
        let r2y = half_width * s + half_height * c;

        let x = self.center_x;
        let y = self.center_y;

        [
            Coord {
                x: x + r1x,
                y: y + r1y,
            },
            Coord {
                x: x + r2x,
                y: y + r2y,
            },
            Coord {
                x: x - r1x,
                y: y - r1y,
            },
            Coord {
                x: x - r2x,
                y: y - r2y,
            },
        ]
    }

    pub fn gen_vertices(self) -> BoxPolygon<T> {
        BoxPolygon::from(self)
    }

    /// True when the circumscribed circles of the boxes do not overlap
    ///
    pub fn too_far(l: &OrientedBox<T>, r: &OrientedBox<T>) -> bool {
        let max_distance = l.radius() + r.radius();
        let x = l.center_x - r.center_x;
        let y = l.center_y - r.center_y;
        x * x + y * y > max_distance * max_distance
    }

    /// Area of the intersection of two rotated boxes
    ///
    pub fn intersection(l: &OrientedBox<T>, r: &OrientedBox<T>) -> T {
        intersection_area(&l.gen_vertices(), &r.gen_vertices())
    }

    /// Area of the intersection of the boxes when their rotation is ignored
    ///
    pub fn aligned_intersection(l: &OrientedBox<T>, r: &OrientedBox<T>) -> T {
        let (lhw, lhh) = (l.width * T::HALF, l.height * T::HALF);
        let (rhw, rhh) = (r.width * T::HALF, r.height * T::HALF);

        let x1 = (l.center_x - lhw).max(r.center_x - rhw);
        let y1 = (l.center_y - lhh).max(r.center_y - rhh);
        let x2 = (l.center_x + lhw).min(r.center_x + rhw);
        let y2 = (l.center_y + lhh).min(r.center_y + rhh);

        let int_width = x2 - x1;
        let int_height = y2 - y1;

        if int_width > T::zero() && int_height > T::zero() {
            int_width * int_height
        } else {
            T::zero()
        }
    }
}

/// Box with its corner points computed once, ready for repeated clipping
///
#[derive(Clone, Copy, Debug)]
pub struct BoxPolygon<T: BoxFloat> {
    bbox: OrientedBox<T>,
    vertices: [Coord<T>; 4],
}

impl<T: BoxFloat> BoxPolygon<T> {
    pub fn bbox(&self) -> &OrientedBox<T> {
        &self.bbox
    }

    pub fn vertices(&self) -> &[Coord<T>; 4] {
        &self.vertices
    }

    pub fn area(&self) -> T {
        self.bbox.area()
    }
}

impl<T: BoxFloat> From<OrientedBox<T>> for BoxPolygon<T> {
    fn from(bbox: OrientedBox<T>) -> Self {
        Self {
            vertices: bbox.vertices(),
            bbox,
        }
    }
}

impl<T: BoxFloat> From<&OrientedBox<T>> for Polygon<T> {
    fn from(b: &OrientedBox<T>) -> Self {
        Polygon::new(LineString::from(b.vertices().to_vec()), vec![])
    }
}

pub fn normalize_angle<T: BoxFloat>(a: T) -> T {
    let n = (a / T::TWO_PI).floor();
    let a = a - n * T::TWO_PI;
    if a < T::zero() {
        a + T::TWO_PI
    } else if a >= T::TWO_PI {
        // rounding of tiny negative angles
        T::zero()
    } else {
        a
    }
}


#[cfg(test)]
mod polygons {
    use crate::utils::bbox::OrientedBox;
    use geo::{Area, BooleanOps, Polygon};
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

    const EPS: f64 = 1e-9;

    #[test]
    fn vertices_are_clockwise() {
        let b = OrientedBox::<f64>::new(1.0, 2.0, 4.0, 2.0, 0.0);
        let v = b.vertices();
        assert!((v[0].x + 1.0).abs() < EPS && (v[0].y - 3.0).abs() < EPS);
        assert!((v[1].x - 3.0).abs() < EPS && (v[1].y - 3.0).abs() < EPS);
        assert!((v[2].x - 3.0).abs() < EPS && (v[2].y - 1.0).abs() < EPS);
        assert!((v[3].x + 1.0).abs() < EPS && (v[3].y - 1.0).abs() < EPS);

        let polygon = Polygon::from(&b);
        assert!(polygon.signed_area() < 0.0);
        assert!((polygon.unsigned_area() - b.area()).abs() < EPS);
    }

    #[test]
    fn quarter_turn_swaps_extents() {
        let b = OrientedBox::<f64>::new(0.0, 0.0, 4.0, 2.0, FRAC_PI_2);
        let v = b.vertices();
        let max_x = v.iter().map(|c| c.x).fold(f64::MIN, f64::max);
        let max_y = v.iter().map(|c| c.y).fold(f64::MIN, f64::max);
        assert!((max_x - 1.0).abs() < EPS);
        assert!((max_y - 2.0).abs() < EPS);
    }

    #[test]
    fn transform() {
        let bbox1 = OrientedBox::<f64>::new(0.0, 0.0, 1.0, 2.0, 2.0);
        let polygon1 = Polygon::from(&bbox1);
        let bbox2 = OrientedBox::<f64>::new(0.0, 0.0, 1.0, 2.0, 2.0 + FRAC_PI_2);
        let polygon2 = Polygon::from(&bbox2);

        let int = polygon1.intersection(&polygon2).unsigned_area();
        let clipped = OrientedBox::intersection(&bbox1, &bbox2);
        assert!((int - clipped).abs() < 1e-6);
        assert!((clipped - 1.0).abs() < 1e-6);

        let bbox3 = OrientedBox::<f64>::new(10.0, 0.0, 1.0, 2.0, 2.0 + FRAC_PI_2);
        assert!(OrientedBox::too_far(&bbox1, &bbox3));
        assert_eq!(OrientedBox::intersection(&bbox1, &bbox3), 0.0);
    }

    #[test]
    fn radius() {
        let b = OrientedBox::new(0.0_f32, 0.0, 6.0, 8.0, FRAC_PI_4 as f32);
        assert!((b.radius() - 5.0).abs() < 1e-6);
        assert!(b.is_valid());
        assert!(!OrientedBox::new(0.0_f32, 0.0, 0.0, 8.0, 0.0).is_valid());
        assert!(!OrientedBox::new(0.0_f32, 0.0, 1.0, -8.0, 0.0).is_valid());
    }

    #[test]
    fn aligned_intersection() {
        let bb1 = OrientedBox::<f64>::new(0.0, 0.0, 2.0, 2.0, 0.0);
        let bb2 = OrientedBox::<f64>::new(0.1, 0.1, 2.0, 2.0, 0.0);
        let bb3 = OrientedBox::<f64>::new(3.5, 3.5, 3.0, 3.0, 0.0);

        assert!((OrientedBox::aligned_intersection(&bb1, &bb1) - 4.0).abs() < EPS);
        assert!((OrientedBox::aligned_intersection(&bb1, &bb2) - 1.9 * 1.9).abs() < EPS);
        assert_eq!(OrientedBox::aligned_intersection(&bb1, &bb3), 0.0);

        let rotated = OrientedBox::<f64>::new(0.1, 0.1, 2.0, 2.0, 1.0);
        assert!(
            (OrientedBox::aligned_intersection(&bb1, &rotated)
                - OrientedBox::aligned_intersection(&bb1, &bb2))
            .abs()
                < EPS
        );
    }
}

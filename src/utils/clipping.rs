use crate::utils::bbox::{BoxPolygon, OrientedBox};
use crate::utils::primitive::BoxFloat;
use geo::{Area, Coord, CoordFloat, LineString, Polygon};

/// Signed distance-like value of `q` relative to the directed edge `p1 -> p2`.
/// Non-positive values are inside for clockwise clipping polygons.
///
fn edge_side<T: CoordFloat>(q: &Coord<T>, p1: &Coord<T>, p2: &Coord<T>) -> T {
    (p2.x - p1.x) * (q.y - p1.y) - (p2.y - p1.y) * (q.x - p1.x)
}

fn is_inside<T: CoordFloat>(side: T) -> bool {
    side <= T::zero()
}

/// Crossing point of the segment `s -> e` with the clip line.
///
/// Only called when exactly one end is strictly outside, so `s_side - e_side` is never zero.
///
fn compute_intersection<T: CoordFloat>(s: &Coord<T>, e: &Coord<T>, s_side: T, e_side: T) -> Coord<T> {
    let t = s_side / (s_side - e_side);
    Coord {
        x: s.x + (e.x - s.x) * t,
        y: s.y + (e.y - s.y) * t,
    }
}

/// Sutherland-Hodgman clipping of a polygon against a convex clockwise polygon
///
/// Both polygons are given as open rings (the first point is not repeated).
/// The result is the intersection as an open ring; it is empty when the
/// polygons are disjoint and may contain repeated points when they touch.
///
pub fn clip_convex<T: CoordFloat>(subject: &[Coord<T>], clipping: &[Coord<T>]) -> Vec<Coord<T>> {
    let mut final_polygon = subject.to_vec();

    for (i, c_edge_end) in clipping.iter().enumerate() {
        if final_polygon.is_empty() {
            break;
        }

        let i_i = if i == 0 { clipping.len() - 1 } else { i - 1 };
        let c_edge_start = &clipping[i_i];

        let next_polygon = std::mem::take(&mut final_polygon);
        let mut s_edge_start = next_polygon[next_polygon.len() - 1];
        let mut s_side = edge_side(&s_edge_start, c_edge_start, c_edge_end);

        for s_edge_end in next_polygon {
            let e_side = edge_side(&s_edge_end, c_edge_start, c_edge_end);
            if is_inside(e_side) {
                if !is_inside(s_side) {
                    final_polygon.push(compute_intersection(
                        &s_edge_start,
                        &s_edge_end,
                        s_side,
                        e_side,
                    ));
                }
                final_polygon.push(s_edge_end);
            } else if is_inside(s_side) {
                final_polygon.push(compute_intersection(
                    &s_edge_start,
                    &s_edge_end,
                    s_side,
                    e_side,
                ));
            }
            s_edge_start = s_edge_end;
            s_side = e_side;
        }
    }
    final_polygon
}

/// Shoelace area of an open ring
///
pub fn polygon_area<T: CoordFloat>(points: Vec<Coord<T>>) -> T {
    Polygon::new(LineString::new(points), vec![]).unsigned_area()
}

/// Area of the intersection of two rotated boxes
///
/// Returns exactly zero when the circumscribed circles do not overlap. The
/// result never exceeds the area of either box and is never negative.
///
pub fn intersection_area<T: BoxFloat>(l: &BoxPolygon<T>, r: &BoxPolygon<T>) -> T {
    if OrientedBox::too_far(l.bbox(), r.bbox()) {
        return T::zero();
    }
    polygon_area(clip_convex(l.vertices(), r.vertices()))
        .min(l.area().min(r.area()))
        .max(T::zero())
}

#[cfg(test)]
mod tests {
    use crate::examples::random_boxes;
    use crate::utils::bbox::OrientedBox;
    use crate::utils::clipping::{clip_convex, intersection_area, polygon_area};
    use geo::{Area, BooleanOps, Coord, Polygon};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::f64::consts::FRAC_PI_4;

    fn area(l: &OrientedBox<f64>, r: &OrientedBox<f64>) -> f64 {
        intersection_area(&l.gen_vertices(), &r.gen_vertices())
    }

    #[test]
    fn clip() {
        let subject =
            OrientedBox::<f64>::new(8044.315, 8011.0454, 49.8073 * 1.00801, 49.8073, 2.67877485);
        let clipping = OrientedBox::<f64>::new(
            8044.455,
            8011.338,
            49.79979 * 1.0083783,
            49.79979,
            2.67877485,
        );

        let clipped = clip_convex(
            subject.gen_vertices().vertices(),
            clipping.gen_vertices().vertices(),
        );
        assert!(clipped.len() >= 4);

        let smaller = subject.area().min(clipping.area());
        let int = polygon_area(clipped);
        assert!(int <= smaller);
        assert!(int > 0.98 * smaller);
    }

    #[test]
    fn matches_boolean_ops() {
        let mut rng = StdRng::seed_from_u64(7);
        let boxes = random_boxes::<f64, _>(&mut rng, 40, 20.0, 2.0..10.0);
        for (i, l) in boxes.rows().into_iter().enumerate() {
            for (j, r) in boxes.rows().into_iter().enumerate() {
                if i == j {
                    continue;
                }
                let l = OrientedBox::from_row(l);
                let r = OrientedBox::from_row(r);
                let expected = Polygon::from(&l)
                    .intersection(&Polygon::from(&r))
                    .unsigned_area();
                let actual = area(&l, &r);
                assert!(
                    (actual - expected).abs() < 1e-6 * (1.0 + expected),
                    "{:?} {:?}: {} != {}",
                    l,
                    r,
                    actual,
                    expected
                );
            }
        }
    }

    #[test]
    fn nested() {
        let outer = OrientedBox::<f64>::new(0.0, 0.0, 10.0, 10.0, 0.3);
        let inner = OrientedBox::<f64>::new(0.5, -0.5, 1.0, 2.0, 1.1);
        assert!((area(&outer, &inner) - 2.0).abs() < 1e-9);
        assert!((area(&inner, &outer) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn touching_edges() {
        let l = OrientedBox::<f64>::new(0.0, 0.0, 1.0, 1.0, 0.0);
        let r = OrientedBox::<f64>::new(1.0, 0.0, 1.0, 1.0, 0.0);
        let a = area(&l, &r);
        assert!(a.is_finite());
        assert!(a.abs() < 1e-12);
    }

    #[test]
    fn touching_corner() {
        let l = OrientedBox::<f64>::new(0.0, 0.0, 1.0, 1.0, 0.0);
        let r = OrientedBox::<f64>::new(1.0, 1.0, 1.0, 1.0, 0.0);
        let a = area(&l, &r);
        assert!(a.is_finite());
        assert!(a.abs() < 1e-12);

        let diamond = OrientedBox::<f64>::new(0.5 + 0.5_f64.sqrt(), 0.0, 1.0, 1.0, FRAC_PI_4);
        let a = area(&l, &diamond);
        assert!(a.is_finite());
        assert!(a.abs() < 1e-9);
    }

    #[test]
    fn collinear_edges() {
        let l = OrientedBox::<f64>::new(0.0, 0.0, 2.0, 1.0, 0.0);
        let r = OrientedBox::<f64>::new(0.5, 0.0, 2.0, 1.0, 0.0);
        assert!((area(&l, &r) - 1.5).abs() < 1e-12);
    }

    #[test]
    fn degenerate_boxes() {
        let l = OrientedBox::<f64>::new(0.0, 0.0, 1.0, 1.0, 0.0);
        let flat = OrientedBox::<f64>::new(0.0, 0.0, 0.0, 1.0, 0.4);
        let point = OrientedBox::<f64>::new(0.1, 0.1, 0.0, 0.0, 0.0);
        let negative = OrientedBox::<f64>::new(0.0, 0.0, -1.0, 1.0, 0.2);

        for other in [flat, point, negative] {
            for a in [area(&l, &other), area(&other, &l), area(&other, &other)] {
                assert!(a.is_finite());
                assert!(a >= 0.0);
            }
        }
        assert!(area(&l, &flat).abs() < 1e-12);
        assert!(area(&l, &point).abs() < 1e-12);
    }

    #[test]
    fn empty_subject() {
        let clipping = OrientedBox::<f64>::new(0.0, 0.0, 1.0, 1.0, 0.0).vertices();
        let clipped = clip_convex::<f64>(&[], &clipping);
        assert!(clipped.is_empty());
        assert_eq!(polygon_area(clipped), 0.0);
        assert_eq!(polygon_area(vec![Coord { x: 1.0, y: 1.0 }]), 0.0);
    }
}

pub type Unit = euclid::UnknownUnit;

pub type Point = euclid::Point2D<f64, Unit>;
pub type Vector = euclid::Vector2D<f64, Unit>;
pub type Size = euclid::Size2D<f64, Unit>;
pub type Rect = euclid::Rect<f64, Unit>;

pub fn point(x: f64, y: f64) -> Point {
    euclid::point2(x, y)
}

pub fn vector(x: f64, y: f64) -> Vector {
    euclid::vec2(x, y)
}

pub fn rect(x: f64, y: f64, width: f64, height: f64) -> Rect {
    euclid::rect(x, y, width, height)
}

/// Smallest rectangle containing both inputs.
///
/// Unlike `euclid::Rect::union`, zero-sized rectangles still contribute their position, which is
/// what bounding-box aggregation of points and hairline edges needs.
pub fn union(a: &Rect, b: &Rect) -> Rect {
    let min_x = a.min_x().min(b.min_x());
    let min_y = a.min_y().min(b.min_y());
    let max_x = a.max_x().max(b.max_x());
    let max_y = a.max_y().max(b.max_y());
    rect(min_x, min_y, max_x - min_x, max_y - min_y)
}

/// Grows `r` by `d` on every side.
pub fn grow(r: &Rect, d: f64) -> Rect {
    rect(
        r.origin.x - d,
        r.origin.y - d,
        r.size.width + 2.0 * d,
        r.size.height + 2.0 * d,
    )
}

pub fn is_finite_point(p: Point) -> bool {
    p.x.is_finite() && p.y.is_finite()
}

/// Intersection of segments `(p0, p1)` and `(p2, p3)`, if they cross.
pub fn segment_intersection(p0: Point, p1: Point, p2: Point, p3: Point) -> Option<Point> {
    let denom = (p3.y - p2.y) * (p1.x - p0.x) - (p3.x - p2.x) * (p1.y - p0.y);
    if denom == 0.0 {
        return None;
    }
    let ua = ((p3.x - p2.x) * (p0.y - p2.y) - (p3.y - p2.y) * (p0.x - p2.x)) / denom;
    let ub = ((p1.x - p0.x) * (p0.y - p2.y) - (p1.y - p0.y) * (p0.x - p2.x)) / denom;
    if (0.0..=1.0).contains(&ua) && (0.0..=1.0).contains(&ub) {
        let p = point(p0.x + ua * (p1.x - p0.x), p0.y + ua * (p1.y - p0.y));
        is_finite_point(p).then_some(p)
    } else {
        None
    }
}

/// Squared distance from `p` to the segment `(a, b)`.
pub fn segment_distance_sq(a: Point, b: Point, p: Point) -> f64 {
    let d = b - a;
    let len_sq = d.square_length();
    if len_sq == 0.0 {
        return (p - a).square_length();
    }
    let t = ((p - a).dot(d) / len_sq).clamp(0.0, 1.0);
    (p - (a + d * t)).square_length()
}

/// Distance from `p` to the infinite line through `a` and `b`.
pub fn line_distance(a: Point, b: Point, p: Point) -> f64 {
    let d = b - a;
    let len = d.length();
    if len == 0.0 {
        return (p - a).length();
    }
    (d.cross(p - a) / len).abs()
}

/// Which side of the directed line `a -> b` the point lies on: -1, 0 or 1.
pub fn relative_ccw(a: Point, b: Point, p: Point) -> i32 {
    let d = b - a;
    let cross = (p - a).cross(d);
    if cross > 0.0 {
        1
    } else if cross < 0.0 {
        -1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_keeps_empty_rects() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let b = rect(20.0, 5.0, 0.0, 0.0);
        assert_eq!(union(&a, &b), rect(0.0, 0.0, 20.0, 10.0));
    }

    #[test]
    fn parallel_segments_do_not_intersect() {
        let hit = segment_intersection(
            point(0.0, 0.0),
            point(10.0, 0.0),
            point(0.0, 1.0),
            point(10.0, 1.0),
        );
        assert_eq!(hit, None);
    }

    #[test]
    fn crossing_segments_intersect() {
        let hit = segment_intersection(
            point(0.0, 0.0),
            point(10.0, 10.0),
            point(0.0, 10.0),
            point(10.0, 0.0),
        );
        assert_eq!(hit, Some(point(5.0, 5.0)));
    }
}

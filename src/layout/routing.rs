use std::f32::consts::FRAC_1_SQRT_2;

/// Tolerance used when checking finished segments for octilinearity.
const SEGMENT_EPSILON: f32 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentShape {
    Horizontal,
    Vertical,
    Diagonal,
    /// Needs an elbow; neither extent is within tolerance of the other.
    Elbow,
}

pub fn classify(dx: f32, dy: f32, tolerance: f32) -> SegmentShape {
    if dy.abs() < tolerance {
        SegmentShape::Horizontal
    } else if dx.abs() < tolerance {
        SegmentShape::Vertical
    } else if (dx.abs() - dy.abs()).abs() < tolerance {
        SegmentShape::Diagonal
    } else {
        SegmentShape::Elbow
    }
}

/// Octilinear polyline from `(x1, y1)` to `(x2, y2)` shifted sideways by
/// `offset`. At most one elbow: a 45° leg out of the start, then a
/// horizontal or vertical leg into the end, whichever axis dominates.
pub fn octilinear_points(
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
    offset: f32,
    tolerance: f32,
) -> Vec<(f32, f32)> {
    let dx = x2 - x1;
    let dy = y2 - y1;

    match classify(dx, dy, tolerance) {
        SegmentShape::Horizontal => vec![(x1, y1 + offset), (x2, y2 + offset)],
        SegmentShape::Vertical => vec![(x1 + offset, y1), (x2 + offset, y2)],
        SegmentShape::Diagonal => {
            let (nx, ny) = diagonal_normal(dx, dy, offset);
            vec![(x1 + nx, y1 + ny), (x2 + nx, y2 + ny)]
        }
        SegmentShape::Elbow => {
            let sx = dx.signum();
            let sy = dy.signum();
            let (nx, ny) = diagonal_normal(dx, dy, offset);
            let start = (x1 + nx, y1 + ny);
            if dx.abs() > dy.abs() {
                let end_y = y2 + offset;
                let t = (end_y - start.1) / sy;
                vec![start, (start.0 + sx * t, end_y), (x2, end_y)]
            } else {
                let end_x = x2 + offset;
                let t = (end_x - start.0) / sx;
                vec![start, (end_x, start.1 + sy * t), (end_x, y2)]
            }
        }
    }
}

pub fn octilinear_path(x1: f32, y1: f32, x2: f32, y2: f32, offset: f32, tolerance: f32) -> String {
    points_to_path(&octilinear_points(x1, y1, x2, y2, offset, tolerance))
}

// Unit normal of the 45° direction (sign dx, sign dy), scaled by `offset`.
fn diagonal_normal(dx: f32, dy: f32, offset: f32) -> (f32, f32) {
    let sx = dx.signum();
    let sy = dy.signum();
    (-sy * FRAC_1_SQRT_2 * offset, sx * FRAC_1_SQRT_2 * offset)
}

pub fn points_to_path(points: &[(f32, f32)]) -> String {
    if points.is_empty() {
        return String::new();
    }
    let mut d = String::new();
    d.push_str(&format!("M {:.2} {:.2}", points[0].0, points[0].1));
    for point in points.iter().skip(1) {
        d.push_str(&format!(" L {:.2} {:.2}", point.0, point.1));
    }
    d
}

/// True when every segment of the polyline is horizontal, vertical or 45°.
pub fn is_octilinear(points: &[(f32, f32)]) -> bool {
    points.windows(2).all(|pair| {
        let dx = (pair[1].0 - pair[0].0).abs();
        let dy = (pair[1].1 - pair[0].1).abs();
        dx < SEGMENT_EPSILON || dy < SEGMENT_EPSILON || (dx - dy).abs() < SEGMENT_EPSILON
    })
}

/// Distance from `(px, py)` to the polyline, for hit-testing lines.
pub fn distance_to_polyline(points: &[(f32, f32)], px: f32, py: f32) -> Option<f32> {
    points
        .windows(2)
        .map(|pair| distance_to_segment(pair[0], pair[1], (px, py)))
        .reduce(f32::min)
}

fn distance_to_segment(a: (f32, f32), b: (f32, f32), p: (f32, f32)) -> f32 {
    let (abx, aby) = (b.0 - a.0, b.1 - a.1);
    let len_sq = abx * abx + aby * aby;
    let t = if len_sq <= f32::EPSILON {
        0.0
    } else {
        (((p.0 - a.0) * abx + (p.1 - a.1) * aby) / len_sq).clamp(0.0, 1.0)
    };
    let (cx, cy) = (a.0 + abx * t, a.1 + aby * t);
    ((p.0 - cx).powi(2) + (p.1 - cy).powi(2)).sqrt()
}

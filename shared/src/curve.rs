//! Cardinal spline through chart points.

/// Tension 0 gives the classic Catmull-Rom-like shape
const TENSION: f64 = 0.0;

/// Points sampled along each cubic segment
pub const SAMPLES_PER_SEGMENT: usize = 12;

/// Sample a cardinal spline passing through every point in `points`.
///
/// The first and last segments use the end point as their outer control
/// point, so the curve starts and ends tangent to its neighbours. Fewer than
/// three points are returned unchanged as a straight polyline.
pub fn cardinal(points: &[(f64, f64)]) -> Vec<(f64, f64)> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }

    let k = (1.0 - TENSION) / 6.0;
    let mut sampled = Vec::with_capacity((n - 1) * SAMPLES_PER_SEGMENT + 1);
    sampled.push(points[0]);

    for i in 0..n - 1 {
        let p1 = points[i];
        let p2 = points[i + 1];
        let p0 = if i == 0 { p2 } else { points[i - 1] };
        let p3 = if i + 2 >= n { p1 } else { points[i + 2] };

        let c1 = (p1.0 + k * (p2.0 - p0.0), p1.1 + k * (p2.1 - p0.1));
        let c2 = (p2.0 + k * (p1.0 - p3.0), p2.1 + k * (p1.1 - p3.1));

        for step in 1..SAMPLES_PER_SEGMENT {
            let t = step as f64 / SAMPLES_PER_SEGMENT as f64;
            sampled.push(bezier(p1, c1, c2, p2, t));
        }
        sampled.push(p2);
    }
    sampled
}

fn bezier(p0: (f64, f64), c1: (f64, f64), c2: (f64, f64), p1: (f64, f64), t: f64) -> (f64, f64) {
    let u = 1.0 - t;
    let a = u * u * u;
    let b = 3.0 * u * u * t;
    let c = 3.0 * u * t * t;
    let d = t * t * t;
    (
        a * p0.0 + b * c1.0 + c * c2.0 + d * p1.0,
        a * p0.1 + b * c1.1 + c * c2.1 + d * p1.1,
    )
}

//! Smallest enclosing circle (minimum bounding disc) of a planar point set.
//!
//! Implements Welzl's algorithm in its iterative move-to-front form: the
//! points are shuffled once with the caller's RNG, then grown one at a time
//! into the current disc, recomputing with the offending point pinned to the
//! boundary whenever a point falls outside. Expected running time is linear
//! in the number of points; the shuffle is what bounds the bad cases, so the
//! RNG is injected to keep tests reproducible.

#[cfg(test)]
#[path = "solver_test.rs"]
mod solver_test;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::consts::EPSILON;
use crate::vector::Vec2d;

/// What shape the solver produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveKind {
    /// No input points.
    None,
    /// Exactly one input point; the circle degenerates to it.
    Point,
    /// Two or more input points.
    Circle,
}

/// Output of [`solve`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolveResult {
    pub kind: SolveKind,
    pub center: Vec2d,
    pub radius: f64,
}

impl SolveResult {
    /// Result for an empty point set.
    #[must_use]
    pub fn none() -> Self {
        Self { kind: SolveKind::None, center: Vec2d::default(), radius: 0.0 }
    }

    /// Whether `p` lies in the closed disc, within the solver tolerance.
    #[must_use]
    pub fn contains(&self, p: Vec2d) -> bool {
        match self.kind {
            SolveKind::None => false,
            SolveKind::Point | SolveKind::Circle => Circle::new(self.center, self.radius).contains(p),
        }
    }
}

/// A disc given by center and radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Vec2d,
    pub radius: f64,
}

impl Circle {
    #[must_use]
    pub fn new(center: Vec2d, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Degenerate disc at a single point.
    #[must_use]
    pub fn from_one(a: Vec2d) -> Self {
        Self::new(a, 0.0)
    }

    /// Smallest disc with `a` and `b` on its boundary.
    #[must_use]
    pub fn from_two(a: Vec2d, b: Vec2d) -> Self {
        let center = a.midpoint(b);
        Self::new(center, center.distance(a).max(center.distance(b)))
    }

    /// Circumscribed disc of a triangle.
    ///
    /// Collinear (or nearly collinear) triples have no finite circumcircle;
    /// they fall back to the disc over the farthest pair, which encloses the
    /// third point.
    #[must_use]
    pub fn from_three(a: Vec2d, b: Vec2d, c: Vec2d) -> Self {
        let ab = b - a;
        let ac = c - a;
        let cross = ab.cross(ac);
        if cross.abs() <= EPSILON * ab.length() * ac.length() {
            return widest_pair(a, b, c);
        }

        let d = 2.0 * cross;
        let ab2 = ab.dot(ab);
        let ac2 = ac.dot(ac);
        let offset = Vec2d::new((ac.y * ab2 - ab.y * ac2) / d, (ab.x * ac2 - ac.x * ab2) / d);
        let center = a + offset;
        let radius = center.distance(a).max(center.distance(b)).max(center.distance(c));
        Self::new(center, radius)
    }

    /// Closed-disc containment with a tolerance that grows with the radius.
    #[must_use]
    pub fn contains(&self, p: Vec2d) -> bool {
        self.center.distance(p) <= self.radius + EPSILON * self.radius.max(1.0)
    }
}

fn widest_pair(a: Vec2d, b: Vec2d, c: Vec2d) -> Circle {
    let ab = a.distance(b);
    let bc = b.distance(c);
    let ac = a.distance(c);
    if ab >= bc && ab >= ac {
        Circle::from_two(a, b)
    } else if bc >= ac {
        Circle::from_two(b, c)
    } else {
        Circle::from_two(a, c)
    }
}

/// Smallest circle enclosing every point, after shuffling with `rng`.
pub fn solve<R: Rng + ?Sized>(points: &[Vec2d], rng: &mut R) -> SolveResult {
    let mut order = points.to_vec();
    order.shuffle(rng);
    solve_in_order(&order)
}

/// Smallest enclosing circle, processing points in the given order.
///
/// Correct for any order; the expected-linear bound needs a random one.
#[must_use]
pub fn solve_in_order(points: &[Vec2d]) -> SolveResult {
    match points {
        [] => SolveResult::none(),
        [p] => SolveResult { kind: SolveKind::Point, center: *p, radius: 0.0 },
        [first, ..] => {
            let circle = welzl(points, *first);
            SolveResult { kind: SolveKind::Circle, center: circle.center, radius: circle.radius }
        }
    }
}

fn welzl(points: &[Vec2d], first: Vec2d) -> Circle {
    let mut circle = Circle::from_one(first);
    for (i, &p) in points.iter().enumerate().skip(1) {
        if !circle.contains(p) {
            circle = with_one_boundary(&points[..i], p);
        }
    }
    circle
}

fn with_one_boundary(points: &[Vec2d], b1: Vec2d) -> Circle {
    let mut circle = Circle::from_one(b1);
    for (j, &p) in points.iter().enumerate() {
        if !circle.contains(p) {
            circle = with_two_boundary(&points[..j], b1, p);
        }
    }
    circle
}

fn with_two_boundary(points: &[Vec2d], b1: Vec2d, b2: Vec2d) -> Circle {
    let mut circle = Circle::from_two(b1, b2);
    for &p in points {
        if !circle.contains(p) {
            circle = Circle::from_three(b1, b2, p);
        }
    }
    circle
}

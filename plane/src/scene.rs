//! Scene model: labeled points, the viewport they are seen through, and the last solution.
//!
//! A `Scene` is the persistent document. It is created empty or seeded with
//! random points, mutated by clicks and commands, and replaced wholesale on
//! load. Every point mutation discards the cached [`SolveResult`]; viewport
//! changes do not, since the circle lives in real coordinates.

#[cfg(test)]
#[path = "scene_test.rs"]
mod scene_test;

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::camera::RealCs;
use crate::consts::RANDOM_GRID_SIZE;
use crate::solver::{self, SolveResult};
use crate::vector::Vec2d;

/// Which of the two point sets a point belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointSet {
    #[serde(rename = "FIRST_SET")]
    First,
    #[serde(rename = "SECOND_SET")]
    Second,
}

impl PointSet {
    /// Human-readable set name used in log lines.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::First => "first set",
            Self::Second => "second set",
        }
    }
}

/// A point of the scene. Immutable once created.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pos: Vec2d,
    set: PointSet,
}

impl Point {
    #[must_use]
    pub fn new(pos: Vec2d, set: PointSet) -> Self {
        Self { pos, set }
    }

    #[must_use]
    pub fn pos(&self) -> Vec2d {
        self.pos
    }

    #[must_use]
    pub fn set(&self) -> PointSet {
        self.set
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.pos, self.set.name())
    }
}

/// The document: viewport plus ordered points.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scene {
    cs: RealCs,
    points: Vec<Point>,
    solution: Option<SolveResult>,
}

impl Scene {
    /// Empty scene viewed through `cs`.
    #[must_use]
    pub fn new(cs: RealCs) -> Self {
        Self { cs, points: Vec::new(), solution: None }
    }

    /// Scene with the given points, unsolved.
    #[must_use]
    pub fn with_points(cs: RealCs, points: Vec<Point>) -> Self {
        Self { cs, points, solution: None }
    }

    /// Scene seeded with up to `count` random FIRST-set points.
    pub fn with_random<R: Rng + ?Sized>(cs: RealCs, count: usize, rng: &mut R) -> Self {
        let mut scene = Self::new(cs);
        scene.add_random(count, PointSet::First, rng);
        scene
    }

    #[must_use]
    pub fn cs(&self) -> &RealCs {
        &self.cs
    }

    /// Mutable viewport. Panning and zooming keep the solution.
    pub fn cs_mut(&mut self) -> &mut RealCs {
        &mut self.cs
    }

    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Append a point and return it.
    pub fn add_point(&mut self, pos: Vec2d, set: PointSet) -> Point {
        let point = Point::new(pos, set);
        self.points.push(point);
        self.solution = None;
        debug!(%point, total = self.points.len(), "point added");
        point
    }

    /// Remove every point.
    pub fn clear(&mut self) {
        self.points.clear();
        self.solution = None;
    }

    /// Add up to `count` points on distinct cells of a coarse lattice over the viewport.
    ///
    /// The lattice has `RANDOM_GRID_SIZE` cells per axis and each cell is used
    /// at most once per call, so the points of one call never coincide.
    /// Returns the number of points actually added, which is smaller than
    /// `count` when the lattice runs out of cells.
    pub fn add_random<R: Rng + ?Sized>(&mut self, count: usize, set: PointSet, rng: &mut R) -> usize {
        let side = RANDOM_GRID_SIZE as usize;
        let cells = side * side;
        let take = count.min(cells);
        if take < count {
            warn!(requested = count, available = cells, "random lattice exhausted");
        }

        let picked = rand::seq::index::sample(rng, cells, take);
        for cell in picked.iter() {
            let pos = self.lattice_point(cell % side, cell / side);
            self.points.push(Point::new(pos, set));
        }
        if take > 0 {
            self.solution = None;
        }
        debug!(added = take, total = self.points.len(), "random points added");
        take
    }

    /// Real position of lattice cell `(gx, gy)`; row 0 is the top of the viewport.
    fn lattice_point(&self, gx: usize, gy: usize) -> Vec2d {
        let side = f64::from(RANDOM_GRID_SIZE);
        let size = self.cs.size();
        Vec2d::new(
            self.cs.min().x + gx as f64 / side * size.x,
            self.cs.max().y - gy as f64 / side * size.y,
        )
    }

    /// Run the solver over every point and cache the result.
    pub fn solve<R: Rng + ?Sized>(&mut self, rng: &mut R) -> SolveResult {
        let positions: Vec<Vec2d> = self.points.iter().map(Point::pos).collect();
        let result = solver::solve(&positions, rng);
        self.solution = Some(result);
        result
    }

    /// Drop the cached solution, keeping the points.
    pub fn cancel(&mut self) {
        self.solution = None;
    }

    #[must_use]
    pub fn is_solved(&self) -> bool {
        self.solution.is_some()
    }

    #[must_use]
    pub fn solution(&self) -> Option<&SolveResult> {
        self.solution.as_ref()
    }
}

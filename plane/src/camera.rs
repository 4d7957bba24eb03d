//! Coordinate systems: the pixel window, the real viewport, and the map between them.
//!
//! `WindowCs` is an integer rectangle in window pixels with y growing down.
//! `RealCs` is the rectangle of the real plane currently in view, with y
//! growing up; it is the part of the scene that pans and zooms. `CsMap`
//! pairs the two and converts positions in both directions.
//!
//! Both rectangles validate their extents on construction, so a `CsMap`
//! built from them can never divide by a zero-sized axis.

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use rand::Rng;

use crate::consts::{DEFAULT_MAX, DEFAULT_MIN};
use crate::vector::{Vec2d, Vec2i};

/// Degenerate window or real rectangle, or an invalid zoom request.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum ViewportError {
    #[error("invalid viewport: window size {0} must be positive on both axes")]
    WindowSize(Vec2i),
    #[error("invalid viewport: real min {min} must be below max {max} on both axes")]
    RealBounds { min: Vec2d, max: Vec2d },
    #[error("invalid viewport: scale factor {0} must be positive and finite")]
    ScaleFactor(f64),
}

// =============================================================
// WindowCs
// =============================================================

/// Pixel rectangle of the drawing region. Origin is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowCs {
    origin: Vec2i,
    size: Vec2i,
}

impl WindowCs {
    /// Build a window rectangle.
    ///
    /// # Errors
    ///
    /// Returns [`ViewportError::WindowSize`] if either size component is not positive.
    pub fn new(origin: Vec2i, size: Vec2i) -> Result<Self, ViewportError> {
        if size.x <= 0 || size.y <= 0 {
            return Err(ViewportError::WindowSize(size));
        }
        Ok(Self { origin, size })
    }

    /// Window rectangle anchored at the pixel origin.
    ///
    /// # Errors
    ///
    /// Returns [`ViewportError::WindowSize`] if either dimension is zero or negative.
    pub fn from_size(width: i32, height: i32) -> Result<Self, ViewportError> {
        Self::new(Vec2i::new(0, 0), Vec2i::new(width, height))
    }

    #[must_use]
    pub fn origin(&self) -> Vec2i {
        self.origin
    }

    #[must_use]
    pub fn size(&self) -> Vec2i {
        self.size
    }

    /// One past the bottom-right pixel.
    #[must_use]
    pub fn max(&self) -> Vec2i {
        self.origin + self.size
    }

    /// Whether the pixel lies inside the rectangle (right/bottom edges excluded).
    #[must_use]
    pub fn contains(&self, p: Vec2i) -> bool {
        let max = self.max();
        p.x >= self.origin.x && p.y >= self.origin.y && p.x < max.x && p.y < max.y
    }

    /// Position of `p` relative to the rectangle's origin.
    #[must_use]
    pub fn relative_pos(&self, p: Vec2i) -> Vec2i {
        p - self.origin
    }
}

// =============================================================
// RealCs
// =============================================================

/// Visible rectangle of the real plane. Pan and zoom mutate it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RealCs {
    min: Vec2d,
    max: Vec2d,
}

impl Default for RealCs {
    fn default() -> Self {
        Self { min: Vec2d::new(DEFAULT_MIN, DEFAULT_MIN), max: Vec2d::new(DEFAULT_MAX, DEFAULT_MAX) }
    }
}

impl RealCs {
    /// Build a real rectangle.
    ///
    /// # Errors
    ///
    /// Returns [`ViewportError::RealBounds`] unless `min < max` on both axes
    /// and all coordinates are finite.
    pub fn new(min: Vec2d, max: Vec2d) -> Result<Self, ViewportError> {
        if !is_valid_rect(min, max) {
            return Err(ViewportError::RealBounds { min, max });
        }
        Ok(Self { min, max })
    }

    #[must_use]
    pub fn min(&self) -> Vec2d {
        self.min
    }

    #[must_use]
    pub fn max(&self) -> Vec2d {
        self.max
    }

    /// Extent of the rectangle; strictly positive on both axes.
    #[must_use]
    pub fn size(&self) -> Vec2d {
        self.max - self.min
    }

    #[must_use]
    pub fn center(&self) -> Vec2d {
        self.min.midpoint(self.max)
    }

    /// Uniformly distributed point in `[min, max)`.
    pub fn random_point<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec2d {
        Vec2d::new(rng.random_range(self.min.x..self.max.x), rng.random_range(self.min.y..self.max.y))
    }

    /// Zoom by `factor` around `anchor`, keeping `anchor` at the same pixel.
    ///
    /// Factors above one zoom out, factors below one zoom in.
    ///
    /// # Errors
    ///
    /// Returns [`ViewportError::ScaleFactor`] for non-positive or non-finite
    /// factors, and [`ViewportError::RealBounds`] if the result would
    /// collapse or overflow. The rectangle is unchanged on error.
    pub fn scale(&mut self, factor: f64, anchor: Vec2d) -> Result<(), ViewportError> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(ViewportError::ScaleFactor(factor));
        }
        let size = self.size() * factor;
        let min = anchor - (anchor - self.min) * factor;
        let max = min + size;
        if !is_valid_rect(min, max) {
            return Err(ViewportError::RealBounds { min, max });
        }
        self.min = min;
        self.max = max;
        Ok(())
    }

    /// Shift the rectangle by `delta`.
    ///
    /// # Errors
    ///
    /// Returns [`ViewportError::RealBounds`] if the shifted rectangle is not
    /// finite or has collapsed to rounding. The rectangle is unchanged on error.
    pub fn pan(&mut self, delta: Vec2d) -> Result<(), ViewportError> {
        let min = self.min + delta;
        let max = self.max + delta;
        if !is_valid_rect(min, max) {
            return Err(ViewportError::RealBounds { min, max });
        }
        self.min = min;
        self.max = max;
        Ok(())
    }
}

fn is_valid_rect(min: Vec2d, max: Vec2d) -> bool {
    min.is_finite() && max.is_finite() && min.x < max.x && min.y < max.y
}

// =============================================================
// CsMap
// =============================================================

/// Bidirectional mapping between window pixels and real coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CsMap {
    window: WindowCs,
    real: RealCs,
}

impl CsMap {
    #[must_use]
    pub fn new(window: WindowCs, real: RealCs) -> Self {
        Self { window, real }
    }

    #[must_use]
    pub fn window(&self) -> WindowCs {
        self.window
    }

    #[must_use]
    pub fn real(&self) -> RealCs {
        self.real
    }

    /// Convert a pixel to the real plane, flipping the y axis.
    #[must_use]
    pub fn to_real(&self, p: Vec2i) -> Vec2d {
        let win_size = self.window.size();
        let real_size = self.real.size();
        let rel = self.window.relative_pos(p);
        Vec2d::new(
            self.real.min().x + f64::from(rel.x) / f64::from(win_size.x) * real_size.x,
            self.real.max().y - f64::from(rel.y) / f64::from(win_size.y) * real_size.y,
        )
    }

    /// Convert a real position to the nearest pixel.
    ///
    /// Positions beyond the `i32` range saturate; use [`CsMap::to_pixel_f`]
    /// for geometry that may lie far outside the window.
    #[must_use]
    pub fn to_pixel(&self, p: Vec2d) -> Vec2i {
        let px = self.to_pixel_f(p);
        Vec2i::new(px.x.round() as i32, px.y.round() as i32)
    }

    /// Unrounded pixel position of a real point.
    #[must_use]
    pub fn to_pixel_f(&self, p: Vec2d) -> Vec2d {
        let origin = self.window.origin();
        let win_size = self.window.size();
        let real_size = self.real.size();
        Vec2d::new(
            f64::from(origin.x) + (p.x - self.real.min().x) / real_size.x * f64::from(win_size.x),
            f64::from(origin.y) + (self.real.max().y - p.y) / real_size.y * f64::from(win_size.y),
        )
    }

    /// Real units per pixel along each axis.
    #[must_use]
    pub fn similarity(&self) -> Vec2d {
        let win_size = self.window.size();
        let real_size = self.real.size();
        Vec2d::new(real_size.x / f64::from(win_size.x), real_size.y / f64::from(win_size.y))
    }
}

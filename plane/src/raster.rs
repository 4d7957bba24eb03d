//! Software `Painter` over a packed `0x00RRGGBB` pixel buffer.
//!
//! The desktop shell copies [`PixelCanvas::pixels`] straight into its
//! presentation surface. Shapes are aliased; translucent colors are
//! alpha-blended over what is already there. Text needs a font: without one,
//! `draw_text` is a no-op.
//!
//! Device coordinates saturate at the `i32` range and lines are clipped
//! before stepping, so a far-off endpoint costs no more than one that sits
//! just outside the clip.

#[cfg(test)]
#[path = "raster_test.rs"]
mod raster_test;

use std::path::Path;

use fontdue::{Font, FontSettings};

use crate::render::{Color, Painter, clip_segment};
use crate::vector::{Vec2d, Vec2i};

/// Default text size in pixels.
pub const DEFAULT_FONT_PX: f32 = 14.0;

#[derive(Debug, thiserror::Error)]
pub enum FontError {
    #[error("failed to read font {}: {source}", .path.display())]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid font data: {0}")]
    Parse(&'static str),
}

/// Parse a TTF/OTF font file.
///
/// # Errors
///
/// Returns [`FontError::Io`] if the file cannot be read and
/// [`FontError::Parse`] if it is not a usable font.
pub fn load_font(path: &Path) -> Result<Font, FontError> {
    let bytes = std::fs::read(path).map_err(|source| FontError::Io { path: path.to_path_buf(), source })?;
    Font::from_bytes(bytes, FontSettings::default()).map_err(FontError::Parse)
}

/// Device-space rectangle, `[x0, x1) x [y0, y1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Bounds {
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
}

impl Bounds {
    /// Rectangle at `origin` with `size`, saturating at the `i32` range.
    fn at(origin: Vec2i, size: Vec2i) -> Self {
        Self {
            x0: origin.x,
            y0: origin.y,
            x1: origin.x.saturating_add(size.x),
            y1: origin.y.saturating_add(size.y),
        }
    }

    fn is_empty(self) -> bool {
        self.x0 >= self.x1 || self.y0 >= self.y1
    }

    fn intersect(self, other: Self) -> Self {
        Self {
            x0: self.x0.max(other.x0),
            y0: self.y0.max(other.y0),
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct State {
    translation: Vec2i,
    clip: Bounds,
}

/// In-memory canvas implementing [`Painter`].
pub struct PixelCanvas {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
    state: State,
    stack: Vec<State>,
    font: Option<Font>,
    font_px: f32,
}

impl PixelCanvas {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let mut canvas = Self {
            width: 0,
            height: 0,
            pixels: Vec::new(),
            state: State { translation: Vec2i::default(), clip: Bounds { x0: 0, y0: 0, x1: 0, y1: 0 } },
            stack: Vec::new(),
            font: None,
            font_px: DEFAULT_FONT_PX,
        };
        canvas.resize(width, height);
        canvas
    }

    /// Attach a font for [`Painter::draw_text`].
    #[must_use]
    pub fn with_font(mut self, font: Font, px: f32) -> Self {
        self.font = Some(font);
        self.font_px = px;
        self
    }

    #[must_use]
    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Reallocate for a new size if it changed; resets state and contents.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width != self.width || height != self.height {
            self.width = width;
            self.height = height;
            self.pixels = vec![0; width as usize * height as usize];
        }
        self.stack.clear();
        self.state = State { translation: Vec2i::default(), clip: self.full_bounds() };
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major `0x00RRGGBB` pixels.
    #[must_use]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Pixel at device coordinates, or `None` outside the canvas.
    #[must_use]
    pub fn pixel(&self, x: i32, y: i32) -> Option<u32> {
        let idx = self.index(x, y)?;
        self.pixels.get(idx).copied()
    }

    fn full_bounds(&self) -> Bounds {
        Bounds { x0: 0, y0: 0, x1: clamp_dim(self.width), y1: clamp_dim(self.height) }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) else {
            return None;
        };
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    /// Blend one device pixel, honouring the clip.
    fn plot(&mut self, x: i32, y: i32, color: Color, coverage: u8) {
        let clip = self.state.clip;
        if x < clip.x0 || y < clip.y0 || x >= clip.x1 || y >= clip.y1 {
            return;
        }
        if let Some(idx) = self.index(x, y) {
            let alpha = u32::from(color.a) * u32::from(coverage) / 255;
            self.pixels[idx] = blend(self.pixels[idx], color, alpha);
        }
    }

    /// Fill a device-space rectangle, clipped.
    fn fill_device(&mut self, area: Bounds, color: Color) {
        let area = area.intersect(self.state.clip);
        for y in area.y0..area.y1 {
            for x in area.x0..area.x1 {
                self.plot(x, y, color, 255);
            }
        }
    }
}

/// `p + t` without overflow.
fn offset(p: Vec2i, t: Vec2i) -> Vec2i {
    Vec2i::new(p.x.saturating_add(t.x), p.y.saturating_add(t.y))
}

fn clamp_dim(v: u32) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}

/// Blend `color` over `dst` with `alpha` in `0..=255`.
fn blend(dst: u32, color: Color, alpha: u32) -> u32 {
    if alpha >= 255 {
        return color.to_rgb_u32();
    }
    let mix = |src: u8, shift: u32| {
        let d = (dst >> shift) & 0xFF;
        (u32::from(src) * alpha + d * (255 - alpha)) / 255
    };
    (mix(color.r, 16) << 16) | (mix(color.g, 8) << 8) | mix(color.b, 0)
}

impl Painter for PixelCanvas {
    fn save(&mut self) {
        self.stack.push(self.state);
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn translate(&mut self, delta: Vec2i) {
        self.state.translation = offset(self.state.translation, delta);
    }

    fn clip(&mut self, origin: Vec2i, size: Vec2i) {
        let rect = Bounds::at(offset(origin, self.state.translation), size);
        self.state.clip = self.state.clip.intersect(rect);
    }

    fn clear(&mut self, color: Color) {
        self.pixels.fill(color.to_rgb_u32());
    }

    fn fill_rect(&mut self, origin: Vec2i, size: Vec2i, color: Color) {
        self.fill_device(Bounds::at(offset(origin, self.state.translation), size), color);
    }

    fn draw_line(&mut self, from: Vec2i, to: Vec2i, width: f32, color: Color) {
        let clip = self.state.clip;
        if clip.is_empty() {
            return;
        }
        let thick = (width.round() as i32).clamp(1, 64);
        let lead = (thick - 1) / 2;
        let t = self.state.translation;
        let device = |p: Vec2i| Vec2d::new(f64::from(p.x) + f64::from(t.x), f64::from(p.y) + f64::from(t.y));

        // Keep only the part that can touch the clip; the brush may reach `thick` beyond it.
        let margin = f64::from(thick);
        let lo = Vec2d::new(f64::from(clip.x0) - margin, f64::from(clip.y0) - margin);
        let hi = Vec2d::new(f64::from(clip.x1) + margin, f64::from(clip.y1) + margin);
        let Some((a, b)) = clip_segment(device(from), device(to), lo, hi) else {
            return;
        };
        let a = Vec2i::new(a.x.round() as i32, a.y.round() as i32);
        let b = Vec2i::new(b.x.round() as i32, b.y.round() as i32);

        // Bresenham, stamping a `thick`-sided square at each step.
        let dx = (b.x - a.x).abs();
        let dy = -(b.y - a.y).abs();
        let sx = if a.x < b.x { 1 } else { -1 };
        let sy = if a.y < b.y { 1 } else { -1 };
        let mut err = dx + dy;
        let (mut x, mut y) = (a.x, a.y);
        loop {
            self.fill_device(Bounds { x0: x - lead, y0: y - lead, x1: x - lead + thick, y1: y - lead + thick }, color);
            if x == b.x && y == b.y {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    fn draw_text(&mut self, at: Vec2i, text: &str, color: Color) {
        let Some(font) = self.font.take() else {
            return;
        };
        let origin = offset(at, self.state.translation);
        let mut pen_x = origin.x as f32;
        for ch in text.chars() {
            let (metrics, bitmap) = font.rasterize(ch, self.font_px);
            let left = (pen_x.round() as i32).saturating_add(metrics.xmin);
            let top = origin.y.saturating_sub(metrics.ymin).saturating_sub(metrics.height as i32);
            for (row, line) in bitmap.chunks(metrics.width.max(1)).enumerate() {
                for (col, &coverage) in line.iter().enumerate() {
                    if coverage > 0 {
                        self.plot(left.saturating_add(col as i32), top.saturating_add(row as i32), color, coverage);
                    }
                }
            }
            pen_x += metrics.advance_width;
        }
        self.font = Some(font);
    }
}

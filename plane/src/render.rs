//! Rendering: draws the scene into any pixel canvas through the `Painter` trait.
//!
//! The renderer receives read-only views of the scene and the window
//! rectangle and produces drawing calls; it mutates nothing but its cached
//! [`WindowCs`], which input handlers use to convert cursor pixels into real
//! positions the same way the last frame did.
//!
//! Layers, bottom first: background, grid ticks, points, solved circle,
//! cursor crosshair with its coordinate label. The engine adds the log strip
//! and the info overlay on top.
//!
//! Geometry is culled and clipped in unrounded pixel space before it reaches
//! the painter, so painters only ever see coordinates near the window no
//! matter how far the view is zoomed or panned.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::cmp::Ordering;
use std::f64::consts::TAU;
use std::ops::{Deref, DerefMut};

use tracing::debug;

use crate::camera::{CsMap, RealCs, WindowCs};
use crate::consts::{
    CIRCLE_SEGMENTS, CURSOR_LABEL_OFFSET_X, CURSOR_LABEL_OFFSET_Y, GRID_DELIMITER, GRID_MAJOR_TICK_PX,
    GRID_MINOR_TICK_PX, MAX_GRID_TICKS, POINT_SIZE,
};
use crate::log::{LogEntry, LogLevel};
use crate::scene::{Point, PointSet, Scene};
use crate::solver::{SolveKind, SolveResult};
use crate::vector::{Vec2d, Vec2i};

/// Stroke width of the solved circle, in pixels.
const CIRCLE_STROKE_PX: f32 = 2.0;

/// Line height of overlay text, in pixels.
const INFO_LINE_HEIGHT_PX: i32 = 20;

/// Padding around the info overlay text, in pixels.
const INFO_PADDING_PX: i32 = 16;

/// Widest grid stroke, reached when zoomed far in.
const GRID_MAX_STROKE_PX: f64 = 4.0;

/// Line height of the log strip, in pixels.
const LOG_LINE_HEIGHT_PX: i32 = 16;

/// Padding inside the log strip, in pixels.
const LOG_PADDING_PX: i32 = 6;

/// 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Pack as `0x00RRGGBB`, dropping alpha.
    #[must_use]
    pub fn to_rgb_u32(self) -> u32 {
        (u32::from(self.r) << 16) | (u32::from(self.g) << 8) | u32::from(self.b)
    }
}

/// Fixed colors of the workbench.
pub mod palette {
    use super::Color;

    pub const BACKGROUND: Color = Color::rgb(0x2B, 0x2D, 0x30);
    pub const GRID: Color = Color::rgb(0x8A, 0x8F, 0x98);
    pub const FIRST_SET: Color = Color::rgb(0x4C, 0xAF, 0x50);
    pub const SECOND_SET: Color = Color::rgb(0x42, 0x8B, 0xCA);
    pub const CIRCLE: Color = Color::rgb(0xE5, 0x73, 0x73);
    pub const CURSOR: Color = Color::rgba(0xD0, 0xD3, 0xD8, 0xC0);
    pub const INFO_BACKGROUND: Color = Color::rgba(0x10, 0x10, 0x12, 0xE0);
    pub const INFO_TEXT: Color = Color::rgb(0xF0, 0xF0, 0xF0);
    pub const LOG_BACKGROUND: Color = Color::rgba(0x10, 0x10, 0x12, 0xB0);
    pub const LOG_INFO: Color = Color::rgb(0xC8, 0xCC, 0xD2);
    pub const LOG_SUCCESS: Color = Color::rgb(0x81, 0xC7, 0x84);
    pub const LOG_WARNING: Color = Color::rgb(0xFF, 0xB7, 0x4D);
    pub const LOG_ERROR: Color = Color::rgb(0xEF, 0x53, 0x50);
}

/// Color used for points of a set.
#[must_use]
pub fn set_color(set: PointSet) -> Color {
    match set {
        PointSet::First => palette::FIRST_SET,
        PointSet::Second => palette::SECOND_SET,
    }
}

// =============================================================
// Painter
// =============================================================

/// Immediate-mode pixel canvas the renderer draws into.
///
/// Coordinates are window pixels, offset by the current translation.
pub trait Painter {
    /// Push translation and clip state.
    fn save(&mut self);
    /// Pop the state pushed by the matching [`Painter::save`].
    fn restore(&mut self);
    /// Offset subsequent drawing.
    fn translate(&mut self, delta: Vec2i);
    /// Restrict subsequent drawing to a rectangle (intersected with the current clip).
    fn clip(&mut self, origin: Vec2i, size: Vec2i);
    /// Fill the whole canvas, ignoring clip and translation.
    fn clear(&mut self, color: Color);
    fn fill_rect(&mut self, origin: Vec2i, size: Vec2i, color: Color);
    fn draw_line(&mut self, from: Vec2i, to: Vec2i, width: f32, color: Color);
    /// Draw text with its baseline starting at `at`.
    fn draw_text(&mut self, at: Vec2i, text: &str, color: Color);
}

/// Saves painter state on creation and restores it when dropped.
pub struct PaintScope<'a, P: Painter + ?Sized> {
    painter: &'a mut P,
}

impl<'a, P: Painter + ?Sized> PaintScope<'a, P> {
    pub fn new(painter: &'a mut P) -> Self {
        painter.save();
        Self { painter }
    }
}

impl<P: Painter + ?Sized> Deref for PaintScope<'_, P> {
    type Target = P;

    fn deref(&self) -> &P {
        self.painter
    }
}

impl<P: Painter + ?Sized> DerefMut for PaintScope<'_, P> {
    fn deref_mut(&mut self) -> &mut P {
        self.painter
    }
}

impl<P: Painter + ?Sized> Drop for PaintScope<'_, P> {
    fn drop(&mut self) {
        self.painter.restore();
    }
}

// =============================================================
// Renderer
// =============================================================

/// Scene renderer. Caches the last window rectangle it painted into.
#[derive(Debug, Default)]
pub struct Renderer {
    last_window: Option<WindowCs>,
}

impl Renderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Window rectangle of the most recent frame, if any frame was painted.
    #[must_use]
    pub fn last_window(&self) -> Option<WindowCs> {
        self.last_window
    }

    /// Pixel mapping of the last frame for the given viewport.
    #[must_use]
    pub fn map(&self, cs: &RealCs) -> Option<CsMap> {
        self.last_window.map(|window| CsMap::new(window, *cs))
    }

    /// Paint one frame of `scene` into `window`.
    ///
    /// `cursor` is the pointer pixel; the crosshair is drawn only when it lies
    /// inside the window.
    pub fn paint<P: Painter + ?Sized>(
        &mut self,
        painter: &mut P,
        window: WindowCs,
        scene: &Scene,
        cursor: Option<Vec2i>,
    ) {
        self.last_window = Some(window);
        let map = CsMap::new(window, *scene.cs());

        let mut scope = PaintScope::new(painter);
        scope.clip(window.origin(), window.size());
        scope.fill_rect(window.origin(), window.size(), palette::BACKGROUND);

        draw_grid(&mut *scope, &map);
        draw_points(&mut *scope, &map, scene.points());
        if let Some(result) = scene.solution() {
            draw_solution(&mut *scope, &map, result);
        }
        if let Some(pos) = cursor.filter(|p| window.contains(*p)) {
            draw_cursor(&mut *scope, &map, pos);
        }
    }
}

/// Grid stroke width for the current zoom: `0.03 / similarity.y + 0.5`, kept within `[0.5, 4]`.
#[must_use]
pub fn grid_stroke_width(map: &CsMap) -> f32 {
    (0.03 / map.similarity().y + 0.5).clamp(0.5, GRID_MAX_STROKE_PX) as f32
}

/// Integer real coordinates within `[lo, hi]`, or `None` if there are too many to draw.
fn tick_range(lo: f64, hi: f64) -> Option<std::ops::RangeInclusive<i64>> {
    let first = lo.ceil();
    let last = hi.floor();
    if last - first >= MAX_GRID_TICKS as f64 {
        return None;
    }
    Some(first as i64..=last as i64)
}

fn tick_half_length(i: i64) -> i32 {
    if i % GRID_DELIMITER == 0 { GRID_MAJOR_TICK_PX } else { GRID_MINOR_TICK_PX }
}

/// Draw ticks at every integer coordinate along both axes.
pub fn draw_grid<P: Painter + ?Sized>(painter: &mut P, map: &CsMap) {
    let mut scope = PaintScope::new(painter);
    let width = grid_stroke_width(map);
    let real = map.real();
    let window = map.window();

    match tick_range(real.min().x, real.max().x) {
        Some(range) => {
            for i in range {
                let Some(at) = near_window(window, map.to_pixel_f(Vec2d::new(i as f64, 0.0)), GRID_MAJOR_TICK_PX)
                else {
                    continue;
                };
                let h = tick_half_length(i);
                scope.draw_line(Vec2i::new(at.x, at.y - h), Vec2i::new(at.x, at.y + h), width, palette::GRID);
            }
        }
        None => debug!(span = real.size().x, "x grid too dense, skipped"),
    }

    match tick_range(real.min().y, real.max().y) {
        Some(range) => {
            for i in range {
                let Some(at) = near_window(window, map.to_pixel_f(Vec2d::new(0.0, i as f64)), GRID_MAJOR_TICK_PX)
                else {
                    continue;
                };
                let h = tick_half_length(i);
                scope.draw_line(Vec2i::new(at.x - h, at.y), Vec2i::new(at.x + h, at.y), width, palette::GRID);
            }
        }
        None => debug!(span = real.size().y, "y grid too dense, skipped"),
    }
}

/// Round `p` if it lies within `margin` pixels of the window, else `None`.
fn near_window(window: WindowCs, p: Vec2d, margin: i32) -> Option<Vec2i> {
    let (lo, hi) = expanded_bounds(window, margin);
    let inside = p.x >= lo.x && p.x <= hi.x && p.y >= lo.y && p.y <= hi.y;
    inside.then(|| Vec2i::new(p.x.round() as i32, p.y.round() as i32))
}

/// Window corners grown by `margin` pixels on every side.
fn expanded_bounds(window: WindowCs, margin: i32) -> (Vec2d, Vec2d) {
    let origin = window.origin();
    let max = window.max();
    let m = f64::from(margin);
    (
        Vec2d::new(f64::from(origin.x) - m, f64::from(origin.y) - m),
        Vec2d::new(f64::from(max.x) + m, f64::from(max.y) + m),
    )
}

/// Clip segment `a`-`b` to the axis-aligned box `[lo, hi]` (Liang-Barsky).
///
/// Returns `None` when nothing of the segment lies inside the box or an
/// endpoint is not finite.
#[must_use]
pub fn clip_segment(a: Vec2d, b: Vec2d, lo: Vec2d, hi: Vec2d) -> Option<(Vec2d, Vec2d)> {
    let d = b - a;
    if !a.is_finite() || !b.is_finite() || !d.is_finite() {
        return None;
    }
    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;
    for (p, q) in [(-d.x, a.x - lo.x), (d.x, hi.x - a.x), (-d.y, a.y - lo.y), (d.y, hi.y - a.y)] {
        match p.partial_cmp(&0.0) {
            Some(Ordering::Less) => {
                let r = q / p;
                if r > t1 {
                    return None;
                }
                t0 = t0.max(r);
            }
            Some(Ordering::Greater) => {
                let r = q / p;
                if r < t0 {
                    return None;
                }
                t1 = t1.min(r);
            }
            // parallel to this edge: inside or fully outside it
            _ if q < 0.0 => return None,
            _ => {}
        }
    }
    Some((a + d * t0, a + d * t1))
}

/// Draw each point as a filled square colored by its set. Squares entirely off-window are skipped.
pub fn draw_points<P: Painter + ?Sized>(painter: &mut P, map: &CsMap, points: &[Point]) {
    let side = Vec2i::new(POINT_SIZE * 2, POINT_SIZE * 2);
    for p in points {
        if let Some(at) = near_window(map.window(), map.to_pixel_f(p.pos()), POINT_SIZE) {
            painter.fill_rect(Vec2i::new(at.x - POINT_SIZE, at.y - POINT_SIZE), side, set_color(p.set()));
        }
    }
}

/// Unrounded pixel vertices of a circle approximated by `CIRCLE_SEGMENTS` chords; first and last coincide.
#[must_use]
pub fn circle_vertices(map: &CsMap, center: Vec2d, radius: f64) -> Vec<Vec2d> {
    (0..=CIRCLE_SEGMENTS)
        .map(|i| {
            let angle = TAU * i as f64 / CIRCLE_SEGMENTS as f64;
            map.to_pixel_f(center + Vec2d::new(angle.cos(), angle.sin()) * radius)
        })
        .collect()
}

/// Draw the solved circle, clipping each chord to the window. Empty and single-point results draw nothing.
pub fn draw_solution<P: Painter + ?Sized>(painter: &mut P, map: &CsMap, result: &SolveResult) {
    if result.kind != SolveKind::Circle {
        return;
    }
    let (lo, hi) = expanded_bounds(map.window(), CIRCLE_STROKE_PX.ceil() as i32);
    let vertices = circle_vertices(map, result.center, result.radius);
    for chord in vertices.windows(2) {
        if let Some((a, b)) = clip_segment(chord[0], chord[1], lo, hi) {
            let from = Vec2i::new(a.x.round() as i32, a.y.round() as i32);
            let to = Vec2i::new(b.x.round() as i32, b.y.round() as i32);
            painter.draw_line(from, to, CIRCLE_STROKE_PX, palette::CIRCLE);
        }
    }
}

/// Crosshair through `pos` spanning the window, plus the real coordinates next to it.
pub fn draw_cursor<P: Painter + ?Sized>(painter: &mut P, map: &CsMap, pos: Vec2i) {
    let window = map.window();
    let origin = window.origin();
    let size = window.size();

    let mut scope = PaintScope::new(painter);
    scope.fill_rect(Vec2i::new(origin.x, pos.y - 1), Vec2i::new(size.x, 2), palette::CURSOR);
    scope.fill_rect(Vec2i::new(pos.x - 1, origin.y), Vec2i::new(2, size.y), palette::CURSOR);

    scope.translate(Vec2i::new(pos.x + CURSOR_LABEL_OFFSET_X, pos.y + CURSOR_LABEL_OFFSET_Y));
    let label = map.to_real(pos).to_string();
    scope.draw_text(Vec2i::new(0, 0), &label, palette::CURSOR);
}

/// Modal text panel over the window, one line per entry.
pub fn draw_info<P: Painter + ?Sized>(painter: &mut P, window: WindowCs, lines: &[&str]) {
    let mut scope = PaintScope::new(painter);
    scope.clip(window.origin(), window.size());
    scope.fill_rect(window.origin(), window.size(), palette::INFO_BACKGROUND);

    let mut baseline = window.origin().y + INFO_PADDING_PX + INFO_LINE_HEIGHT_PX;
    for line in lines {
        scope.draw_text(Vec2i::new(window.origin().x + INFO_PADDING_PX, baseline), line, palette::INFO_TEXT);
        baseline += INFO_LINE_HEIGHT_PX;
    }
}

/// Text color of a log entry.
#[must_use]
pub fn level_color(level: LogLevel) -> Color {
    match level {
        LogLevel::Info => palette::LOG_INFO,
        LogLevel::Success => palette::LOG_SUCCESS,
        LogLevel::Warning => palette::LOG_WARNING,
        LogLevel::Error => palette::LOG_ERROR,
    }
}

/// Log strip along the bottom of the window, oldest entry on top.
pub fn draw_log<P: Painter + ?Sized>(painter: &mut P, window: WindowCs, entries: &[&LogEntry]) {
    if entries.is_empty() {
        return;
    }
    let rows = i32::try_from(entries.len()).unwrap_or(i32::MAX);
    let height = rows.saturating_mul(LOG_LINE_HEIGHT_PX).saturating_add(2 * LOG_PADDING_PX).min(window.size().y);
    let top = window.max().y - height;

    let mut scope = PaintScope::new(painter);
    scope.clip(window.origin(), window.size());
    scope.fill_rect(Vec2i::new(window.origin().x, top), Vec2i::new(window.size().x, height), palette::LOG_BACKGROUND);

    let x = window.origin().x + LOG_PADDING_PX;
    let mut baseline = top + LOG_PADDING_PX + LOG_LINE_HEIGHT_PX - 4;
    for entry in entries {
        scope.draw_text(Vec2i::new(x, baseline), &entry.to_string(), level_color(entry.level));
        baseline += LOG_LINE_HEIGHT_PX;
    }
}

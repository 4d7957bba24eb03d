#![allow(clippy::float_cmp)]

use super::*;
use crate::log::{LogEntry, LogLevel};
use crate::scene::PointSet;
use crate::solver::SolveKind;

#[derive(Debug, Clone, PartialEq)]
enum Cmd {
    Save,
    Restore,
    Clip(Vec2i, Vec2i),
    Clear(Color),
    Rect(Vec2i, Vec2i, Color),
    Line(Vec2i, Vec2i, f32, Color),
    Text(Vec2i, String, Color),
}

/// Records drawing calls with translation already applied.
#[derive(Default)]
struct Recorder {
    cmds: Vec<Cmd>,
    offset: Vec2i,
    stack: Vec<Vec2i>,
}

impl Painter for Recorder {
    fn save(&mut self) {
        self.stack.push(self.offset);
        self.cmds.push(Cmd::Save);
    }

    fn restore(&mut self) {
        if let Some(offset) = self.stack.pop() {
            self.offset = offset;
        }
        self.cmds.push(Cmd::Restore);
    }

    fn translate(&mut self, delta: Vec2i) {
        self.offset = self.offset + delta;
    }

    fn clip(&mut self, origin: Vec2i, size: Vec2i) {
        self.cmds.push(Cmd::Clip(origin + self.offset, size));
    }

    fn clear(&mut self, color: Color) {
        self.cmds.push(Cmd::Clear(color));
    }

    fn fill_rect(&mut self, origin: Vec2i, size: Vec2i, color: Color) {
        self.cmds.push(Cmd::Rect(origin + self.offset, size, color));
    }

    fn draw_line(&mut self, from: Vec2i, to: Vec2i, width: f32, color: Color) {
        self.cmds.push(Cmd::Line(from + self.offset, to + self.offset, width, color));
    }

    fn draw_text(&mut self, at: Vec2i, text: &str, color: Color) {
        self.cmds.push(Cmd::Text(at + self.offset, text.to_string(), color));
    }
}

impl Recorder {
    fn lines(&self, color: Color) -> Vec<(Vec2i, Vec2i, f32)> {
        self.cmds
            .iter()
            .filter_map(|c| match c {
                Cmd::Line(a, b, w, col) if *col == color => Some((*a, *b, *w)),
                _ => None,
            })
            .collect()
    }

    fn rects(&self, color: Color) -> Vec<(Vec2i, Vec2i)> {
        self.cmds
            .iter()
            .filter_map(|c| match c {
                Cmd::Rect(o, s, col) if *col == color => Some((*o, *s)),
                _ => None,
            })
            .collect()
    }

    fn texts(&self) -> Vec<(Vec2i, String)> {
        self.cmds
            .iter()
            .filter_map(|c| match c {
                Cmd::Text(at, t, _) => Some((*at, t.clone())),
                _ => None,
            })
            .collect()
    }

    fn text_colors(&self) -> Vec<Color> {
        self.cmds
            .iter()
            .filter_map(|c| match c {
                Cmd::Text(_, _, col) => Some(*col),
                _ => None,
            })
            .collect()
    }

    fn position(&self, pred: impl Fn(&Cmd) -> bool) -> Option<usize> {
        self.cmds.iter().position(pred)
    }
}

fn window() -> WindowCs {
    WindowCs::from_size(200, 200).unwrap()
}

fn default_map() -> CsMap {
    CsMap::new(window(), RealCs::default())
}

fn solved_scene() -> Scene {
    let mut scene = Scene::default();
    scene.add_point(Vec2d::new(-1.0, 0.0), PointSet::First);
    scene.add_point(Vec2d::new(1.0, 0.0), PointSet::Second);
    scene.solve(&mut <rand::rngs::StdRng as rand::SeedableRng>::seed_from_u64(3));
    scene
}

// =============================================================
// PaintScope
// =============================================================

#[test]
fn paint_scope_restores_on_drop() {
    let mut rec = Recorder::default();
    {
        let mut scope = PaintScope::new(&mut rec);
        scope.translate(Vec2i::new(5, 5));
        scope.fill_rect(Vec2i::new(0, 0), Vec2i::new(1, 1), palette::GRID);
    }
    rec.fill_rect(Vec2i::new(0, 0), Vec2i::new(1, 1), palette::GRID);
    assert_eq!(rec.rects(palette::GRID), vec![
        (Vec2i::new(5, 5), Vec2i::new(1, 1)),
        (Vec2i::new(0, 0), Vec2i::new(1, 1)),
    ]);
    assert_eq!(rec.cmds.first(), Some(&Cmd::Save));
}

#[test]
fn paint_is_balanced() {
    let mut rec = Recorder::default();
    let scene = solved_scene();
    Renderer::new().paint(&mut rec, window(), &scene, Some(Vec2i::new(50, 60)));
    let saves = rec.cmds.iter().filter(|c| **c == Cmd::Save).count();
    let restores = rec.cmds.iter().filter(|c| **c == Cmd::Restore).count();
    assert_eq!(saves, restores);
    assert!(rec.stack.is_empty());
    assert_eq!(rec.offset, Vec2i::new(0, 0));
}

/// Every endpoint lies within `margin` pixels of the 200x200 window.
fn inside_window(lines: &[(Vec2i, Vec2i, f32)], margin: i32) -> bool {
    let ok = |p: Vec2i| (-margin..=200 + margin).contains(&p.x) && (-margin..=200 + margin).contains(&p.y);
    lines.iter().all(|(a, b, _)| ok(*a) && ok(*b))
}

// =============================================================
// Segment clipping
// =============================================================

#[test]
fn clip_segment_keeps_inside_segment() {
    let lo = Vec2d::new(0.0, 0.0);
    let hi = Vec2d::new(10.0, 10.0);
    let (a, b) = clip_segment(Vec2d::new(1.0, 2.0), Vec2d::new(8.0, 9.0), lo, hi).unwrap();
    assert_eq!(a, Vec2d::new(1.0, 2.0));
    assert_eq!(b, Vec2d::new(8.0, 9.0));
}

#[test]
fn clip_segment_cuts_crossing_segment() {
    let lo = Vec2d::new(0.0, 0.0);
    let hi = Vec2d::new(10.0, 10.0);
    let (a, b) = clip_segment(Vec2d::new(-1e12, 5.0), Vec2d::new(1e12, 5.0), lo, hi).unwrap();
    assert!((a.x - 0.0).abs() < 1e-3 && (a.y - 5.0).abs() < 1e-9);
    assert!((b.x - 10.0).abs() < 1e-3 && (b.y - 5.0).abs() < 1e-9);

    let (a, b) = clip_segment(Vec2d::new(-5.0, -5.0), Vec2d::new(15.0, 15.0), lo, hi).unwrap();
    assert!((a.x).abs() < 1e-9 && (a.y).abs() < 1e-9);
    assert!((b.x - 10.0).abs() < 1e-9 && (b.y - 10.0).abs() < 1e-9);
}

#[test]
fn clip_segment_rejects_outside_and_non_finite() {
    let lo = Vec2d::new(0.0, 0.0);
    let hi = Vec2d::new(10.0, 10.0);
    assert!(clip_segment(Vec2d::new(-5.0, 20.0), Vec2d::new(20.0, 12.0), lo, hi).is_none());
    assert!(clip_segment(Vec2d::new(-5.0, 1.0), Vec2d::new(-1.0, 9.0), lo, hi).is_none());
    assert!(clip_segment(Vec2d::new(f64::NAN, 1.0), Vec2d::new(5.0, 5.0), lo, hi).is_none());
    assert!(clip_segment(Vec2d::new(f64::MAX, 1.0), Vec2d::new(-f64::MAX, 1.0), lo, hi).is_none());
}

// =============================================================
// Grid
// =============================================================

#[test]
fn grid_stroke_width_follows_zoom() {
    // 20 units over 200 px: similarity 0.1, width 0.03 / 0.1 + 0.5.
    assert!((grid_stroke_width(&default_map()) - 0.8).abs() < 1e-6);
    let zoomed_out = CsMap::new(window(), RealCs::new(Vec2d::new(-1e4, -1e4), Vec2d::new(1e4, 1e4)).unwrap());
    assert!((grid_stroke_width(&zoomed_out) - 0.5).abs() < 1e-3);
    let zoomed_in = CsMap::new(window(), RealCs::new(Vec2d::new(-1e-7, -1e-7), Vec2d::new(1e-7, 1e-7)).unwrap());
    assert_eq!(grid_stroke_width(&zoomed_in), 4.0);
}

#[test]
fn grid_has_tick_per_integer() {
    let mut rec = Recorder::default();
    draw_grid(&mut rec, &default_map());
    assert_eq!(rec.lines(palette::GRID).len(), 42);
}

#[test]
fn grid_major_ticks_every_ten() {
    let mut rec = Recorder::default();
    draw_grid(&mut rec, &default_map());
    let lines = rec.lines(palette::GRID);
    let (x_ticks, y_ticks) = lines.split_at(21);

    // x = -10 at the left edge, x = 0 in the middle: long ticks.
    assert_eq!(x_ticks[0].0, Vec2i::new(0, 95));
    assert_eq!(x_ticks[0].1, Vec2i::new(0, 105));
    assert_eq!(x_ticks[10].0, Vec2i::new(100, 95));
    // x = -9: short tick.
    assert_eq!(x_ticks[1].0, Vec2i::new(10, 98));
    assert_eq!(x_ticks[1].1, Vec2i::new(10, 102));

    // y = -10 is the bottom edge.
    assert_eq!(y_ticks[0].0, Vec2i::new(95, 200));
    assert_eq!(y_ticks[0].1, Vec2i::new(105, 200));
}

#[test]
fn grid_ticks_stay_inside_fractional_bounds() {
    let real = RealCs::new(Vec2d::new(-0.5, -0.5), Vec2d::new(3.5, 2.5)).unwrap();
    let mut rec = Recorder::default();
    draw_grid(&mut rec, &CsMap::new(window(), real));
    // x ticks 0..=3 and y ticks 0..=2.
    assert_eq!(rec.lines(palette::GRID).len(), 7);
}

#[test]
fn grid_skips_ticks_of_off_window_axes() {
    // Neither axis crosses the view, so no tick row or column is visible.
    let real = RealCs::new(Vec2d::new(20.0, 20.0), Vec2d::new(40.0, 40.0)).unwrap();
    let mut rec = Recorder::default();
    draw_grid(&mut rec, &CsMap::new(window(), real));
    assert!(rec.lines(palette::GRID).is_empty());
}

#[test]
fn grid_under_extreme_zoom_stays_near_window() {
    let real = RealCs::new(Vec2d::new(-1e-7, 3.0 - 1e-7), Vec2d::new(1e-7, 3.0 + 1e-7)).unwrap();
    let mut rec = Recorder::default();
    draw_grid(&mut rec, &CsMap::new(window(), real));
    let lines = rec.lines(palette::GRID);
    // x = 0 crosses the view but its tick sits on the far-away y = 0 axis; y = 3 is visible.
    assert_eq!(lines.len(), 1);
    assert!(inside_window(&lines, GRID_MAJOR_TICK_PX));
}

#[test]
fn grid_skips_axis_with_too_many_ticks() {
    let real = RealCs::new(Vec2d::new(-1e7, -5.0), Vec2d::new(1e7, 5.0)).unwrap();
    let mut rec = Recorder::default();
    draw_grid(&mut rec, &CsMap::new(window(), real));
    assert_eq!(rec.lines(palette::GRID).len(), 11);
}

// =============================================================
// Points and circle
// =============================================================

#[test]
fn points_are_squares_colored_by_set() {
    let mut rec = Recorder::default();
    let points = [
        Point::new(Vec2d::new(0.0, 0.0), PointSet::First),
        Point::new(Vec2d::new(5.0, 5.0), PointSet::Second),
    ];
    draw_points(&mut rec, &default_map(), &points);
    assert_eq!(rec.rects(palette::FIRST_SET), vec![(Vec2i::new(97, 97), Vec2i::new(6, 6))]);
    assert_eq!(rec.rects(palette::SECOND_SET), vec![(Vec2i::new(147, 47), Vec2i::new(6, 6))]);
}

#[test]
fn far_points_are_skipped() {
    let mut rec = Recorder::default();
    let points = [
        Point::new(Vec2d::new(-1e12, 0.0), PointSet::First),
        Point::new(Vec2d::new(0.0, 1e300), PointSet::First),
        Point::new(Vec2d::new(0.0, 0.0), PointSet::First),
    ];
    draw_points(&mut rec, &default_map(), &points);
    assert_eq!(rec.rects(palette::FIRST_SET), vec![(Vec2i::new(97, 97), Vec2i::new(6, 6))]);
}

#[test]
fn point_straddling_the_edge_is_drawn() {
    let mut rec = Recorder::default();
    // 10.2 maps to x = 202: the square still covers columns 199..=201.
    draw_points(&mut rec, &default_map(), &[Point::new(Vec2d::new(10.2, 0.0), PointSet::Second)]);
    assert_eq!(rec.rects(palette::SECOND_SET), vec![(Vec2i::new(199, 97), Vec2i::new(6, 6))]);
}

#[test]
fn circle_vertices_close_a_hundred_chords() {
    let vertices = circle_vertices(&default_map(), Vec2d::new(0.0, 0.0), 5.0);
    assert_eq!(vertices.len(), CIRCLE_SEGMENTS + 1);
    assert!(vertices[0].distance(vertices[CIRCLE_SEGMENTS]) < 1e-9);
    for v in &vertices {
        assert!((v.distance(Vec2d::new(100.0, 100.0)) - 50.0).abs() < 1e-9);
    }
}

#[test]
fn circle_vertices_are_y_up() {
    let vertices = circle_vertices(&default_map(), Vec2d::new(0.0, 0.0), 5.0);
    // A quarter turn counterclockwise in real space points up on screen.
    let quarter = vertices[CIRCLE_SEGMENTS / 4];
    assert!((quarter.x - 100.0).abs() < 1e-9);
    assert!((quarter.y - 50.0).abs() < 1e-9);
}

#[test]
fn circle_under_extreme_zoom_is_clipped_to_window() {
    // The view is 2e-7 wide around (5, 0), where the circle of radius 5 passes vertically.
    let real = RealCs::new(Vec2d::new(5.0 - 1e-7, -1e-7), Vec2d::new(5.0 + 1e-7, 1e-7)).unwrap();
    let map = CsMap::new(window(), real);
    let circle = SolveResult { kind: SolveKind::Circle, center: Vec2d::default(), radius: 5.0 };
    let mut rec = Recorder::default();
    draw_solution(&mut rec, &map, &circle);
    let lines = rec.lines(palette::CIRCLE);
    // Only the two chords meeting at (5, 0) reach the window.
    assert!(!lines.is_empty() && lines.len() <= 2);
    assert!(inside_window(&lines, 2));
}

#[test]
fn circle_far_outside_view_draws_nothing() {
    let circle = SolveResult { kind: SolveKind::Circle, center: Vec2d::new(1e9, 1e9), radius: 3.0 };
    let mut rec = Recorder::default();
    draw_solution(&mut rec, &default_map(), &circle);
    assert!(rec.cmds.is_empty());
}

#[test]
fn solution_draws_circle_only_for_circle_kind() {
    let mut rec = Recorder::default();
    let circle = SolveResult { kind: SolveKind::Circle, center: Vec2d::default(), radius: 1.0 };
    draw_solution(&mut rec, &default_map(), &circle);
    assert_eq!(rec.lines(palette::CIRCLE).len(), CIRCLE_SEGMENTS);

    let mut rec = Recorder::default();
    let point = SolveResult { kind: SolveKind::Point, center: Vec2d::default(), radius: 0.0 };
    draw_solution(&mut rec, &default_map(), &point);
    draw_solution(&mut rec, &default_map(), &SolveResult::none());
    assert!(rec.cmds.is_empty());
}

// =============================================================
// Cursor
// =============================================================

#[test]
fn cursor_crosshair_and_label() {
    let mut rec = Recorder::default();
    draw_cursor(&mut rec, &default_map(), Vec2i::new(150, 50));
    assert_eq!(rec.rects(palette::CURSOR), vec![
        (Vec2i::new(0, 49), Vec2i::new(200, 2)),
        (Vec2i::new(149, 0), Vec2i::new(2, 200)),
    ]);
    assert_eq!(rec.texts(), vec![(Vec2i::new(153, 45), "(5.00, 5.00)".to_string())]);
    assert_eq!(rec.offset, Vec2i::new(0, 0));
}

#[test]
fn cursor_outside_window_is_not_drawn() {
    let mut rec = Recorder::default();
    Renderer::new().paint(&mut rec, window(), &Scene::default(), Some(Vec2i::new(250, 10)));
    assert!(rec.rects(palette::CURSOR).is_empty());
    assert!(rec.texts().is_empty());
}

// =============================================================
// Full frame
// =============================================================

#[test]
fn layers_are_drawn_in_order() {
    let mut rec = Recorder::default();
    let scene = solved_scene();
    Renderer::new().paint(&mut rec, window(), &scene, Some(Vec2i::new(20, 30)));

    let background = rec.position(|c| matches!(c, Cmd::Rect(_, _, col) if *col == palette::BACKGROUND)).unwrap();
    let grid = rec.position(|c| matches!(c, Cmd::Line(_, _, _, col) if *col == palette::GRID)).unwrap();
    let point = rec.position(|c| matches!(c, Cmd::Rect(_, _, col) if *col == palette::FIRST_SET)).unwrap();
    let circle = rec.position(|c| matches!(c, Cmd::Line(_, _, _, col) if *col == palette::CIRCLE)).unwrap();
    let cursor = rec.position(|c| matches!(c, Cmd::Rect(_, _, col) if *col == palette::CURSOR)).unwrap();

    assert!(background < grid);
    assert!(grid < point);
    assert!(point < circle);
    assert!(circle < cursor);
    assert_eq!(rec.cmds[1], Cmd::Clip(Vec2i::new(0, 0), Vec2i::new(200, 200)));
}

#[test]
fn unsolved_scene_draws_no_circle() {
    let mut rec = Recorder::default();
    let mut scene = solved_scene();
    scene.cancel();
    Renderer::new().paint(&mut rec, window(), &scene, None);
    assert!(rec.lines(palette::CIRCLE).is_empty());
}

#[test]
fn renderer_caches_last_window() {
    let mut renderer = Renderer::new();
    assert!(renderer.last_window().is_none());
    assert!(renderer.map(&RealCs::default()).is_none());

    let win = WindowCs::new(Vec2i::new(10, 10), Vec2i::new(300, 150)).unwrap();
    renderer.paint(&mut Recorder::default(), win, &Scene::default(), None);
    assert_eq!(renderer.last_window(), Some(win));
    assert_eq!(renderer.map(&RealCs::default()).unwrap().window(), win);
}

#[test]
fn info_overlay_draws_each_line() {
    let mut rec = Recorder::default();
    draw_info(&mut rec, window(), &["first", "second"]);
    let texts = rec.texts();
    assert_eq!(texts.len(), 2);
    assert_eq!(texts[0].1, "first");
    assert_eq!(texts[1].0.y - texts[0].0.y, 20);
}

// =============================================================
// Log strip
// =============================================================

#[test]
fn log_strip_draws_entries_oldest_first() {
    let loaded = LogEntry { level: LogLevel::Success, message: "loaded".to_string() };
    let broke = LogEntry { level: LogLevel::Error, message: "broke".to_string() };
    let mut rec = Recorder::default();
    draw_log(&mut rec, window(), &[&loaded, &broke]);

    // two rows of 16 px plus 6 px padding above and below
    assert_eq!(rec.rects(palette::LOG_BACKGROUND), vec![(Vec2i::new(0, 156), Vec2i::new(200, 44))]);
    let texts = rec.texts();
    assert_eq!(texts.len(), 2);
    assert_eq!(texts[0].1, "[OK] loaded");
    assert_eq!(texts[1].1, "[ERROR] broke");
    assert_eq!(texts[1].0.y - texts[0].0.y, 16);
    assert!(texts.iter().all(|(at, _)| at.x == 6 && at.y < 200 && at.y > 156));
    assert_eq!(rec.text_colors(), vec![palette::LOG_SUCCESS, palette::LOG_ERROR]);
    assert_eq!(rec.cmds.first(), Some(&Cmd::Save));
    assert_eq!(rec.cmds.last(), Some(&Cmd::Restore));
}

#[test]
fn log_strip_respects_window_origin_and_height() {
    let entry = LogEntry { level: LogLevel::Info, message: "x".to_string() };
    let entries = vec![&entry; 40];
    let win = WindowCs::new(Vec2i::new(10, 20), Vec2i::new(100, 50)).unwrap();
    let mut rec = Recorder::default();
    draw_log(&mut rec, win, &entries);
    assert_eq!(rec.rects(palette::LOG_BACKGROUND), vec![(Vec2i::new(10, 20), Vec2i::new(100, 50))]);
    assert_eq!(rec.cmds[1], Cmd::Clip(Vec2i::new(10, 20), Vec2i::new(100, 50)));
}

#[test]
fn empty_log_strip_draws_nothing() {
    let mut rec = Recorder::default();
    draw_log(&mut rec, window(), &[]);
    assert!(rec.cmds.is_empty());
}

#[test]
fn log_levels_have_distinct_colors() {
    let colors = [LogLevel::Info, LogLevel::Success, LogLevel::Warning, LogLevel::Error].map(level_color);
    for (i, a) in colors.iter().enumerate() {
        for b in &colors[i + 1..] {
            assert_ne!(a, b);
        }
    }
}

#[test]
fn color_packs_rgb() {
    assert_eq!(Color::rgb(0x12, 0x34, 0x56).to_rgb_u32(), 0x0012_3456);
    assert_eq!(Color::rgba(0xFF, 0, 0, 0).to_rgb_u32(), 0x00FF_0000);
}

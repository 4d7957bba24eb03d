//! Engine: owns the scene and turns input events into scene changes and host actions.
//!
//! DESIGN
//! ======
//! `EngineCore` is the application root. It owns the [`Scene`], the
//! [`Renderer`], the scene file binding, the log panel, and the RNG, and
//! never touches a native window. The shell feeds it [`Event`]s and executes
//! the returned [`Action`]s (close, minimize, redraw, ...); each frame it
//! calls [`EngineCore::frame`] with whatever [`Painter`] it presents from.
//!
//! ERROR HANDLING
//! ==============
//! Save/load failures go to the log panel and leave the scene as it was.
//! A degenerate window, zoom or pan aborts that one frame or step with a
//! warning. Nothing here returns an error to the shell.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::path::PathBuf;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use crate::camera::{CsMap, RealCs, WindowCs};
use crate::consts::{LOG_STRIP_LINES, PAN_STEP, RANDOM_BATCH, WHEEL_SENSITIVITY};
use crate::input::{Button, Event, KeyCode, Mode, Modifiers};
use crate::log::{LogEntry, LogPanel};
use crate::render::{self, Painter, Renderer, palette};
use crate::scene::{PointSet, Scene};
use crate::solver::{SolveKind, SolveResult};
use crate::store::{DEFAULT_SCENE_PATH, SceneStore};
use crate::vector::{Vec2d, Vec2i};

/// Task statement shown in INFO mode, one entry per line.
pub const TASK_TEXT: &[&str] = &[
    "A set of points is given on the plane.",
    "Find the circle of smallest area containing every point of the set.",
    "If there are several, find any.",
    "Draw the circle as the answer.",
    "",
    "Esc: back",
];

/// Window opacity while dimmed with MOD+2.
pub const DIMMED_OPACITY: f32 = 0.5;

/// Actions returned from event handlers for the host to carry out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Close,
    Minimize,
    SetMaximized(bool),
    SetOpacity(f32),
    RenderNeeded,
}

/// Startup parameters for [`EngineCore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Scene file used by the save and load shortcuts.
    pub scene_path: PathBuf,
    /// Random points placed in the initial scene.
    pub seed_points: usize,
    /// Fixed RNG seed; `None` seeds from the OS.
    pub rng_seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { scene_path: PathBuf::from(DEFAULT_SCENE_PATH), seed_points: RANDOM_BATCH, rng_seed: None }
    }
}

/// Application state and event dispatch, independent of any windowing system.
pub struct EngineCore {
    scene: Scene,
    renderer: Renderer,
    store: SceneStore,
    log: LogPanel,
    rng: StdRng,
    cursor: Option<Vec2i>,
    mode: Mode,
    maximized: bool,
    opacity: f32,
}

impl EngineCore {
    /// Build the engine with a randomly seeded initial scene over the default viewport.
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        let mut rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let scene = Scene::with_random(RealCs::default(), config.seed_points, &mut rng);
        info!(points = scene.len(), path = %config.scene_path.display(), "engine ready");
        Self {
            scene,
            renderer: Renderer::new(),
            store: SceneStore::new(config.scene_path.clone()),
            log: LogPanel::new(),
            rng,
            cursor: None,
            mode: Mode::Work,
            maximized: false,
            opacity: 1.0,
        }
    }

    // --- Queries ---

    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[must_use]
    pub fn cursor(&self) -> Option<Vec2i> {
        self.cursor
    }

    #[must_use]
    pub fn log(&self) -> &LogPanel {
        &self.log
    }

    /// Log panel for messages originating in the shell.
    pub fn log_mut(&mut self) -> &mut LogPanel {
        &mut self.log
    }

    #[must_use]
    pub fn store(&self) -> &SceneStore {
        &self.store
    }

    #[must_use]
    pub fn is_maximized(&self) -> bool {
        self.maximized
    }

    #[must_use]
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Pixel mapping of the last painted frame, if any.
    fn map(&self) -> Option<CsMap> {
        self.renderer.map(self.scene.cs())
    }

    // --- Frame ---

    /// Paint one frame of `width` x `height` pixels.
    pub fn frame<P: Painter + ?Sized>(&mut self, painter: &mut P, width: u32, height: u32) {
        let size = (i32::try_from(width), i32::try_from(height));
        let window = match size {
            (Ok(w), Ok(h)) => WindowCs::from_size(w, h),
            _ => {
                warn!(width, height, "window too large, frame skipped");
                return;
            }
        };
        let window = match window {
            Ok(window) => window,
            Err(e) => {
                debug!(error = %e, "frame skipped");
                return;
            }
        };

        painter.clear(palette::BACKGROUND);
        let cursor = self.cursor.filter(|_| self.mode == Mode::Work);
        self.renderer.paint(painter, window, &self.scene, cursor);
        match self.mode {
            Mode::Work => {
                let entries: Vec<&LogEntry> = self.log.recent(LOG_STRIP_LINES).collect();
                render::draw_log(painter, window, &entries);
            }
            Mode::Info => render::draw_info(painter, window, TASK_TEXT),
        }
    }

    // --- Events ---

    /// Dispatch one input event.
    pub fn handle(&mut self, event: Event) -> Vec<Action> {
        match event {
            Event::MouseMove { x, y } => {
                self.cursor = Some(Vec2i::new(x, y));
                self.redraw_in_work()
            }
            Event::MouseEnter => Vec::new(),
            Event::MouseLeave => {
                self.cursor = None;
                vec![Action::RenderNeeded]
            }
            Event::MouseButton { x, y, button, pressed } => {
                if pressed {
                    self.on_click(Vec2i::new(x, y), button)
                } else {
                    Vec::new()
                }
            }
            Event::MouseWheel { dy } => self.on_wheel(dy),
            Event::Key { code, modifiers, pressed } => {
                if pressed {
                    self.on_key(code, modifiers)
                } else {
                    Vec::new()
                }
            }
            Event::CloseRequest => vec![Action::Close],
        }
    }

    fn redraw_in_work(&self) -> Vec<Action> {
        if self.mode == Mode::Work { vec![Action::RenderNeeded] } else { Vec::new() }
    }

    fn on_click(&mut self, pixel: Vec2i, button: Button) -> Vec<Action> {
        if self.mode != Mode::Work {
            return Vec::new();
        }
        let set = match button {
            Button::Primary => PointSet::First,
            Button::Secondary => PointSet::Second,
            Button::Middle => return Vec::new(),
        };
        let Some(map) = self.map() else {
            debug!(%pixel, "click before first frame ignored");
            return Vec::new();
        };
        if !map.window().contains(pixel) {
            return Vec::new();
        }
        let point = self.scene.add_point(map.to_real(pixel), set);
        self.log.info(format!("Added point {point}"));
        vec![Action::RenderNeeded]
    }

    fn on_wheel(&mut self, dy: f64) -> Vec<Action> {
        if self.mode != Mode::Work {
            return Vec::new();
        }
        let anchor = match (self.map(), self.cursor) {
            (Some(map), Some(cursor)) => map.to_real(cursor),
            _ => self.scene.cs().center(),
        };
        let factor = 1.0 + dy * WHEEL_SENSITIVITY;
        match self.scene.cs_mut().scale(factor, anchor) {
            Ok(()) => vec![Action::RenderNeeded],
            Err(e) => {
                warn!(error = %e, dy, "zoom rejected");
                Vec::new()
            }
        }
    }

    fn on_key(&mut self, code: KeyCode, modifiers: Modifiers) -> Vec<Action> {
        if modifiers.has_primary() {
            return self.on_shortcut(code);
        }
        match self.mode {
            Mode::Work => self.on_work_key(code),
            Mode::Info => {
                if code == KeyCode::Escape {
                    self.mode = Mode::Work;
                    vec![Action::RenderNeeded]
                } else {
                    Vec::new()
                }
            }
        }
    }

    fn on_shortcut(&mut self, code: KeyCode) -> Vec<Action> {
        match code {
            KeyCode::W => vec![Action::Close],
            KeyCode::H => vec![Action::Minimize],
            KeyCode::S => {
                self.save();
                Vec::new()
            }
            KeyCode::O => self.load(),
            KeyCode::Digit1 => {
                self.maximized = !self.maximized;
                vec![Action::SetMaximized(self.maximized)]
            }
            KeyCode::Digit2 => {
                self.opacity = if self.opacity < 1.0 { 1.0 } else { DIMMED_OPACITY };
                vec![Action::SetOpacity(self.opacity), Action::RenderNeeded]
            }
            _ => Vec::new(),
        }
    }

    fn on_work_key(&mut self, code: KeyCode) -> Vec<Action> {
        match code {
            KeyCode::Escape => return vec![Action::Close],
            KeyCode::F1 => self.mode = Mode::Info,
            KeyCode::Enter => {
                self.solve();
            }
            KeyCode::C => self.cancel(),
            KeyCode::Delete | KeyCode::Backspace => self.clear(),
            KeyCode::R => {
                self.add_random(RANDOM_BATCH);
            }
            KeyCode::ArrowLeft | KeyCode::ArrowRight | KeyCode::ArrowUp | KeyCode::ArrowDown => {
                let (fx, fy) = match code {
                    KeyCode::ArrowLeft => (-1.0, 0.0),
                    KeyCode::ArrowRight => (1.0, 0.0),
                    KeyCode::ArrowUp => (0.0, 1.0),
                    _ => (0.0, -1.0),
                };
                if !self.pan(fx, fy) {
                    return Vec::new();
                }
            }
            _ => return Vec::new(),
        }
        vec![Action::RenderNeeded]
    }

    // --- Commands ---

    /// Solve the scene, report the outcome, and return it.
    pub fn solve(&mut self) -> SolveResult {
        let result = self.scene.solve(&mut self.rng);
        match result.kind {
            SolveKind::None => self.log.warning("Nothing to solve: the scene has no points"),
            SolveKind::Point => self.log.success(format!("Solved: single point at {}", result.center)),
            SolveKind::Circle => {
                self.log.success(format!("Solved: center {}, radius {:.2}", result.center, result.radius));
            }
        }
        result
    }

    /// Drop the solution, keeping the points.
    pub fn cancel(&mut self) {
        self.scene.cancel();
        self.log.info("Solution cancelled");
    }

    /// Remove every point.
    pub fn clear(&mut self) {
        let removed = self.scene.len();
        self.scene.clear();
        self.log.info(format!("Cleared {removed} points"));
    }

    /// Add up to `count` random FIRST-set points; returns how many were added.
    pub fn add_random(&mut self, count: usize) -> usize {
        let added = self.scene.add_random(count, PointSet::First, &mut self.rng);
        self.log.info(format!("Added {added} random points"));
        added
    }

    /// Pan by `(fx, fy)` steps of [`PAN_STEP`] times the viewport size, y up.
    /// Returns whether the view moved; a rejected pan leaves it unchanged.
    pub fn pan(&mut self, fx: f64, fy: f64) -> bool {
        let size = self.scene.cs().size();
        let delta = Vec2d::new(fx * PAN_STEP * size.x, fy * PAN_STEP * size.y);
        match self.scene.cs_mut().pan(delta) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, fx, fy, "pan rejected");
                false
            }
        }
    }

    /// Write the scene to the bound file. Returns whether it succeeded.
    pub fn save(&mut self) -> bool {
        match self.store.save(&self.scene) {
            Ok(()) => {
                self.log.success(format!("Scene saved to {}", self.store.path().display()));
                true
            }
            Err(e) => {
                self.log.error(format!("Save failed [{}]: {e}", e.error_code()));
                false
            }
        }
    }

    /// Replace the scene with the bound file's contents; on failure nothing changes.
    pub fn load(&mut self) -> Vec<Action> {
        match self.store.load() {
            Ok(scene) => {
                self.scene = scene;
                self.log.success(format!("Scene loaded from {}", self.store.path().display()));
                vec![Action::RenderNeeded]
            }
            Err(e) => {
                self.log.error(format!("Load failed [{}]: {e}", e.error_code()));
                Vec::new()
            }
        }
    }
}

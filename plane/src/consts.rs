//! Shared numeric constants for the plane crate.

// ── Geometry ────────────────────────────────────────────────────

/// Tolerance for containment and collinearity tests in the solver.
pub const EPSILON: f64 = 1e-9;

/// Side of the integer lattice used to place random points without collisions.
pub const RANDOM_GRID_SIZE: u32 = 30;

// ── Viewport ────────────────────────────────────────────────────

/// Scale change per wheel unit.
pub const WHEEL_SENSITIVITY: f64 = 0.001;

/// Fraction of the viewport size moved by one arrow-key pan.
pub const PAN_STEP: f64 = 0.05;

/// Lower corner of the default real viewport.
pub const DEFAULT_MIN: f64 = -10.0;

/// Upper corner of the default real viewport.
pub const DEFAULT_MAX: f64 = 10.0;

// ── Rendering ───────────────────────────────────────────────────

/// Half side of a rendered point square, in pixels.
pub const POINT_SIZE: i32 = 3;

/// Every `GRID_DELIMITER`-th grid tick is drawn long.
pub const GRID_DELIMITER: i64 = 10;

/// Half length of a long grid tick, in pixels.
pub const GRID_MAJOR_TICK_PX: i32 = 5;

/// Half length of a regular grid tick, in pixels.
pub const GRID_MINOR_TICK_PX: i32 = 2;

/// Per-axis cap on drawn grid ticks; denser grids are skipped.
pub const MAX_GRID_TICKS: i64 = 4096;

/// Number of chords approximating the solved circle.
pub const CIRCLE_SEGMENTS: usize = 100;

/// Cursor label offset from the cursor, in pixels.
pub const CURSOR_LABEL_OFFSET_X: i32 = 3;

/// Cursor label offset from the cursor, in pixels.
pub const CURSOR_LABEL_OFFSET_Y: i32 = -5;

// ── Engine ──────────────────────────────────────────────────────

/// Points added by one "random batch" command.
pub const RANDOM_BATCH: usize = 10;

/// Maximum entries retained by the log panel.
pub const LOG_PANEL_CAP: usize = 256;

/// Most recent log entries shown in the strip along the bottom of the window.
pub const LOG_STRIP_LINES: usize = 4;

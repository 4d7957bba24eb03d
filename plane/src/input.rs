//! Input model: events delivered by the shell, keys, modifiers, and modes.
//!
//! The shell translates its native window events into [`Event`] values and
//! hands them to [`crate::engine::EngineCore::handle`] one at a time, in
//! user order. Pixel coordinates are window-relative, y down.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

/// Keys the workbench reacts to. Everything else maps to [`KeyCode::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    W,
    H,
    S,
    O,
    R,
    C,
    Digit1,
    Digit2,
    Escape,
    Enter,
    Delete,
    Backspace,
    F1,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Other,
}

/// Keyboard modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    /// Command on macOS, the Windows/Super key elsewhere.
    pub meta: bool,
}

impl Modifiers {
    /// Only the host's shortcut modifier held.
    #[must_use]
    pub fn primary() -> Self {
        if cfg!(target_os = "macos") {
            Self { meta: true, ..Self::default() }
        } else {
            Self { ctrl: true, ..Self::default() }
        }
    }

    /// Whether the host's shortcut modifier (Command on macOS, Ctrl elsewhere) is held.
    #[must_use]
    pub fn has_primary(self) -> bool {
        if cfg!(target_os = "macos") { self.meta } else { self.ctrl }
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Primary,
    Middle,
    Secondary,
}

/// One input event from the shell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    MouseMove { x: i32, y: i32 },
    MouseEnter,
    MouseLeave,
    MouseButton { x: i32, y: i32, button: Button, pressed: bool },
    /// Vertical wheel delta in pixels; negative scrolls up.
    MouseWheel { dy: f64 },
    Key { code: KeyCode, modifiers: Modifiers, pressed: bool },
    CloseRequest,
}

/// What the main window is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Scene editing.
    #[default]
    Work,
    /// Task statement overlay.
    Info,
}

//! Desktop shell: a `winit` window presenting the engine's frames through `softbuffer`.
//!
//! DESIGN
//! ======
//! The shell is a thin adapter. It translates native window events into
//! [`plane::input::Event`]s, hands them to the engine, and carries out the
//! returned actions. Each redraw paints into an owned [`PixelCanvas`] sized
//! to the window's physical pixels, which is then copied into the surface
//! buffer. Window opacity has no `winit` API, so it is applied here by
//! dimming the copied pixels.
//!
//! ERROR HANDLING
//! ==============
//! Failing to create the event loop, the window, or the surface is fatal
//! ([`ShellError`]). Per-frame presentation failures are logged and the
//! frame is dropped.

#[cfg(test)]
#[path = "shell_test.rs"]
mod shell_test;

use std::num::NonZeroU32;
use std::sync::Arc;

use plane::engine::{Action, EngineCore};
use plane::input::{Button, Event, KeyCode, Modifiers};
use plane::raster::{self, DEFAULT_FONT_PX, PixelCanvas};
use tracing::{debug, info, warn};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{self, ModifiersState, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::config::AppConfig;

const WINDOW_TITLE: &str = "Smallest enclosing circle";

/// Pixels scrolled per wheel line.
const WHEEL_LINE_PX: f64 = 40.0;

type WindowSurface = softbuffer::Surface<Arc<Window>, Arc<Window>>;

#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("event loop unavailable: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("window creation failed: {0}")]
    Window(#[from] winit::error::OsError),
    #[error("software surface unavailable: {0}")]
    Surface(#[from] softbuffer::SoftBufferError),
}

impl ShellError {
    /// All shell failures are graphics initialisation failures.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        "E_RENDER_INIT"
    }
}

/// Open the window and run until it closes.
///
/// # Errors
///
/// Returns [`ShellError`] if no usable window or surface can be created.
pub fn run(config: AppConfig) -> Result<(), ShellError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);
    let mut shell = Shell::new(config);
    event_loop.run_app(&mut shell)?;
    match shell.failure.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

struct Shell {
    config: AppConfig,
    engine: EngineCore,
    canvas: PixelCanvas,
    window: Option<Arc<Window>>,
    surface: Option<WindowSurface>,
    modifiers: Modifiers,
    opacity: f32,
    failure: Option<ShellError>,
}

impl Shell {
    fn new(config: AppConfig) -> Self {
        let mut engine = EngineCore::new(&config.engine());
        let mut canvas = PixelCanvas::new(0, 0);
        match &config.font_path {
            Some(path) => match raster::load_font(path) {
                Ok(font) => {
                    info!(path = %path.display(), "font loaded");
                    canvas = canvas.with_font(font, DEFAULT_FONT_PX);
                }
                Err(e) => engine.log_mut().warning(format!("{e}; text labels disabled")),
            },
            None => engine.log_mut().warning("CIRCLEFIT_FONT_PATH not set; text labels disabled"),
        }
        Self {
            config,
            engine,
            canvas,
            window: None,
            surface: None,
            modifiers: Modifiers::default(),
            opacity: 1.0,
            failure: None,
        }
    }

    fn open(&mut self, event_loop: &ActiveEventLoop) -> Result<(), ShellError> {
        let attrs = Window::default_attributes()
            .with_title(WINDOW_TITLE)
            .with_inner_size(LogicalSize::new(self.config.width, self.config.height));
        let window = Arc::new(event_loop.create_window(attrs)?);
        let context = softbuffer::Context::new(window.clone())?;
        let surface = softbuffer::Surface::new(&context, window.clone())?;
        let size = window.inner_size();
        info!(width = size.width, height = size.height, "window opened");
        window.request_redraw();
        self.window = Some(window);
        self.surface = Some(surface);
        Ok(())
    }

    fn dispatch(&mut self, event_loop: &ActiveEventLoop, event: Event) {
        for action in self.engine.handle(event) {
            match action {
                Action::Close => event_loop.exit(),
                Action::Minimize => self.with_window(|w| w.set_minimized(true)),
                Action::SetMaximized(on) => self.with_window(|w| w.set_maximized(on)),
                Action::SetOpacity(opacity) => self.opacity = opacity,
                Action::RenderNeeded => self.with_window(|w| w.request_redraw()),
            }
        }
    }

    fn with_window(&self, f: impl FnOnce(&Window)) {
        if let Some(window) = &self.window {
            f(window);
        }
    }

    fn redraw(&mut self) {
        let (Some(window), Some(surface)) = (&self.window, &mut self.surface) else {
            return;
        };
        let size = window.inner_size();
        let (Some(width), Some(height)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height)) else {
            return;
        };

        self.canvas.resize(size.width, size.height);
        self.engine.frame(&mut self.canvas, size.width, size.height);

        if let Err(e) = surface.resize(width, height) {
            warn!(error = %e, "surface resize failed");
            return;
        }
        let mut buffer = match surface.buffer_mut() {
            Ok(buffer) => buffer,
            Err(e) => {
                warn!(error = %e, "surface buffer unavailable");
                return;
            }
        };
        present_pixels(self.canvas.pixels(), &mut buffer, self.opacity);
        if let Err(e) = buffer.present() {
            warn!(error = %e, "present failed");
        }
    }

    fn translate(&self, event: WindowEvent) -> Option<Event> {
        match event {
            WindowEvent::CloseRequested => Some(Event::CloseRequest),
            WindowEvent::CursorMoved { position, .. } => {
                Some(Event::MouseMove { x: position.x.round() as i32, y: position.y.round() as i32 })
            }
            WindowEvent::CursorEntered { .. } => Some(Event::MouseEnter),
            WindowEvent::CursorLeft { .. } => Some(Event::MouseLeave),
            WindowEvent::MouseInput { state, button, .. } => {
                let cursor = self.engine.cursor()?;
                let button = translate_button(button)?;
                Some(Event::MouseButton { x: cursor.x, y: cursor.y, button, pressed: state == ElementState::Pressed })
            }
            WindowEvent::MouseWheel { delta, .. } => Some(Event::MouseWheel { dy: wheel_dy(delta) }),
            WindowEvent::KeyboardInput { event, .. } => Some(Event::Key {
                code: translate_key(event.physical_key),
                modifiers: self.modifiers,
                pressed: event.state == ElementState::Pressed,
            }),
            _ => None,
        }
    }
}

impl ApplicationHandler for Shell {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.open(event_loop) {
            self.failure = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::RedrawRequested => self.redraw(),
            WindowEvent::Resized(size) => {
                debug!(width = size.width, height = size.height, "resized");
                self.with_window(|w| w.request_redraw());
            }
            WindowEvent::ModifiersChanged(mods) => self.modifiers = translate_modifiers(mods.state()),
            other => {
                if let Some(event) = self.translate(other) {
                    self.dispatch(event_loop, event);
                }
            }
        }
    }
}

/// Copy `src` into `dst`, scaling every channel by `opacity` in `[0, 1]`.
fn present_pixels(src: &[u32], dst: &mut [u32], opacity: f32) {
    if opacity >= 1.0 {
        let n = src.len().min(dst.len());
        dst[..n].copy_from_slice(&src[..n]);
        return;
    }
    let scale = (opacity.clamp(0.0, 1.0) * 256.0) as u32;
    let dim = |px: u32, shift: u32| ((((px >> shift) & 0xFF) * scale) >> 8) << shift;
    for (out, px) in dst.iter_mut().zip(src) {
        *out = dim(*px, 16) | dim(*px, 8) | dim(*px, 0);
    }
}

fn translate_modifiers(state: ModifiersState) -> Modifiers {
    Modifiers {
        shift: state.shift_key(),
        ctrl: state.control_key(),
        alt: state.alt_key(),
        meta: state.super_key(),
    }
}

fn translate_button(button: MouseButton) -> Option<Button> {
    match button {
        MouseButton::Left => Some(Button::Primary),
        MouseButton::Right => Some(Button::Secondary),
        MouseButton::Middle => Some(Button::Middle),
        _ => None,
    }
}

/// Wheel delta in pixels, negative when scrolling up.
fn wheel_dy(delta: MouseScrollDelta) -> f64 {
    match delta {
        MouseScrollDelta::LineDelta(_, lines) => -f64::from(lines) * WHEEL_LINE_PX,
        MouseScrollDelta::PixelDelta(pos) => -pos.y,
    }
}

fn translate_key(key: PhysicalKey) -> KeyCode {
    let PhysicalKey::Code(code) = key else {
        return KeyCode::Other;
    };
    match code {
        keyboard::KeyCode::KeyW => KeyCode::W,
        keyboard::KeyCode::KeyH => KeyCode::H,
        keyboard::KeyCode::KeyS => KeyCode::S,
        keyboard::KeyCode::KeyO => KeyCode::O,
        keyboard::KeyCode::KeyR => KeyCode::R,
        keyboard::KeyCode::KeyC => KeyCode::C,
        keyboard::KeyCode::Digit1 | keyboard::KeyCode::Numpad1 => KeyCode::Digit1,
        keyboard::KeyCode::Digit2 | keyboard::KeyCode::Numpad2 => KeyCode::Digit2,
        keyboard::KeyCode::Escape => KeyCode::Escape,
        keyboard::KeyCode::Enter | keyboard::KeyCode::NumpadEnter => KeyCode::Enter,
        keyboard::KeyCode::Delete => KeyCode::Delete,
        keyboard::KeyCode::Backspace => KeyCode::Backspace,
        keyboard::KeyCode::F1 => KeyCode::F1,
        keyboard::KeyCode::ArrowLeft => KeyCode::ArrowLeft,
        keyboard::KeyCode::ArrowRight => KeyCode::ArrowRight,
        keyboard::KeyCode::ArrowUp => KeyCode::ArrowUp,
        keyboard::KeyCode::ArrowDown => KeyCode::ArrowDown,
        _ => KeyCode::Other,
    }
}

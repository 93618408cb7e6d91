//! winit application handlers for the primary and secondary processes.
//!
//! Both roles use the same pump-based driving pattern: windows are created
//! inside `resumed()` (winit 0.30 requires it), which fires synchronously on
//! desktop platforms during the first pump; after that the event-loop driver
//! pumps all pending events per iteration and sleeps the poll interval.
//!
//! Everything semantic lives elsewhere — this module only adapts winit's
//! event representation to `RawEvent` and dispatches the translated actions.

use std::io::Write as _;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, info, warn};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowId};

use crate::channel::{ColorChannel, ColorMessage};
use crate::event_loop::{self, LoopControl, LoopExit, RunBudget};
use crate::input::{self, Action, KeyInput, MotionDebounce, PointerButton, RawEvent};
use crate::listener::{self, SharedHandle, SharedWindow};
use crate::palette::Palette;
use crate::render::{self, Role, WINDOW_HEIGHT, WINDOW_WIDTH, WindowState};
use crate::supervisor::ChildSupervisor;
use crate::surface::GpuSurface;

fn create_window(event_loop: &ActiveEventLoop, title: &str) -> Result<Arc<Window>> {
    let attrs = Window::default_attributes()
        .with_title(title)
        .with_inner_size(LogicalSize::new(WINDOW_WIDTH, WINDOW_HEIGHT))
        .with_resizable(false);
    let window = event_loop
        .create_window(attrs)
        .context("opening window surface")?;
    Ok(Arc::new(window))
}

fn map_key(key: &Key) -> KeyInput {
    match key {
        Key::Named(NamedKey::Escape) => KeyInput::Escape,
        Key::Character(s) => s.chars().next().map(KeyInput::Char).unwrap_or(KeyInput::Other),
        _ => KeyInput::Other,
    }
}

/// Reduce a winit window event to the toolkit-independent representation.
/// Button events carry the last observed cursor position, tracked here
/// because winit reports clicks without coordinates.
fn adapt_event(event: &WindowEvent, cursor: &mut (i32, i32)) -> Option<RawEvent> {
    match event {
        WindowEvent::CursorMoved { position, .. } => {
            *cursor = (position.x as i32, position.y as i32);
            Some(RawEvent::PointerMoved {
                x: cursor.0,
                y: cursor.1,
            })
        }
        WindowEvent::MouseInput {
            state: ElementState::Pressed,
            button,
            ..
        } => {
            let button = match button {
                MouseButton::Left => PointerButton::Left,
                MouseButton::Right => PointerButton::Right,
                _ => PointerButton::Other,
            };
            Some(RawEvent::ButtonPressed {
                button,
                x: cursor.0,
                y: cursor.1,
            })
        }
        WindowEvent::KeyboardInput {
            event:
                KeyEvent {
                    logical_key,
                    state: ElementState::Pressed,
                    ..
                },
            ..
        } => Some(RawEvent::KeyPressed(map_key(logical_key))),
        _ => None,
    }
}

/// Emit one diagnostic marker character, flushed immediately — external
/// tooling watches stdout for these.
fn emit_marker(role: Role) {
    print!("{}", input::marker_for(role));
    let _ = std::io::stdout().flush();
}

// ---------------------------------------------------------------------------
// Primary
// ---------------------------------------------------------------------------

/// The primary process: owns the swatch window, the supervisor, and the
/// sending side of the channel. Single-threaded.
pub struct PrimaryApp {
    channel: ColorChannel,
    supervisor: ChildSupervisor,
    surface: Option<GpuSurface>,
    init_error: Option<anyhow::Error>,
    state: WindowState,
    debounce: MotionDebounce,
    cursor: (i32, i32),
    done: bool,
}

impl PrimaryApp {
    pub fn new(channel: ColorChannel) -> Self {
        Self {
            channel,
            supervisor: ChildSupervisor::new(),
            surface: None,
            init_error: None,
            state: WindowState::new(Role::Primary),
            debounce: MotionDebounce::default(),
            cursor: (0, 0),
            done: false,
        }
    }

    /// Pump once to open the window, then drive the loop to termination.
    pub fn run(&mut self, event_loop: &mut EventLoop<()>, budget: RunBudget) -> Result<LoopExit> {
        // An exhausted budget terminates before even the initialization
        // pump; `window_event` dispatches actions during that pump, and an
        // expired loop must not process any input.
        if budget.is_exhausted() {
            return Ok(LoopExit::BudgetExhausted);
        }

        let status = event_loop.pump_app_events(Some(Duration::from_millis(100)), self);
        if let Some(e) = self.init_error.take() {
            return Err(e);
        }
        if matches!(status, PumpStatus::Exit(_)) {
            return Ok(LoopExit::UserQuit);
        }

        let exit = event_loop::drive(budget, || {
            let status = event_loop.pump_app_events(Some(Duration::ZERO), self);
            if matches!(status, PumpStatus::Exit(_)) || self.done {
                return LoopControl::Exit;
            }
            self.idle();
            LoopControl::Continue
        });

        info!(?exit, "primary event loop terminated");
        Ok(exit)
    }

    /// Idle-iteration work: passive child-exit detection and keeping the
    /// parent view in sync with whether a child is live.
    fn idle(&mut self) {
        self.supervisor.poll();
        let child_active = self.supervisor.has_live_child();
        if child_active != self.state.child_active {
            self.state.child_active = child_active;
            if let Some(surface) = &self.surface {
                surface.window().request_redraw();
            }
        }
    }

    /// Best-effort send: a rejected message is dropped, never retried.
    fn send(&self, msg: ColorMessage) {
        if let Err(e) = self.channel.send(msg) {
            debug!(error = %e, color = msg.color, "dropped color message");
        }
    }

    fn dispatch(&mut self, action: Action) {
        match action {
            Action::ColorSelected(index) => self.send(ColorMessage::select(index)),
            Action::CloseRequested => self.send(ColorMessage::close()),
            Action::SpawnChild => {
                if let Err(e) = self.supervisor.spawn_secondary() {
                    warn!(error = %e, "could not spawn secondary process");
                }
            }
            Action::Quit => self.done = true,
            Action::MotionMarker => emit_marker(Role::Primary),
        }
    }
}

impl ApplicationHandler for PrimaryApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.surface.is_some() || self.init_error.is_some() {
            return;
        }

        let result =
            create_window(event_loop, "swatch-relay").and_then(|window| GpuSurface::new(window));
        match result {
            Ok(surface) => {
                surface.window().request_redraw();
                self.surface = Some(surface);
            }
            Err(e) => self.init_error = Some(e),
        }
    }

    fn window_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // A quit skips everything still queued this iteration.
        if self.done {
            return;
        }

        match &event {
            WindowEvent::CloseRequested => {
                self.done = true;
                return;
            }
            WindowEvent::Resized(size) => {
                if let Some(surface) = &mut self.surface {
                    surface.resize(size.width, size.height);
                }
                return;
            }
            WindowEvent::RedrawRequested => {
                if let Some(surface) = &mut self.surface {
                    if let Err(e) = render::redraw(surface, &self.state, &Palette::default()) {
                        warn!(error = %e, "primary redraw failed");
                    }
                }
                return;
            }
            _ => {}
        }

        if let Some(raw) = adapt_event(&event, &mut self.cursor) {
            if let Some(action) = input::translate(&raw, &self.state, &mut self.debounce) {
                self.dispatch(action);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Secondary
// ---------------------------------------------------------------------------

/// The secondary process: its window state and surface live behind the
/// redraw lock shared with the listener thread.
pub struct SecondaryApp {
    channel: ColorChannel,
    shared: Option<SharedHandle<GpuSurface>>,
    init_error: Option<anyhow::Error>,
    /// Translation-only copy of the state; the authoritative copy is inside
    /// the lock, but translation never depends on `current_color`.
    view_state: WindowState,
    debounce: MotionDebounce,
    cursor: (i32, i32),
    done: bool,
}

impl SecondaryApp {
    pub fn new(channel: ColorChannel) -> Self {
        Self {
            channel,
            shared: None,
            init_error: None,
            view_state: WindowState::new(Role::Secondary),
            debounce: MotionDebounce::default(),
            cursor: (0, 0),
            done: false,
        }
    }

    /// Pump once to open the window and start the listener, then drive the
    /// loop with no budget — the secondary terminates via Escape, the close
    /// sentinel, or channel loss.
    pub fn run(&mut self, event_loop: &mut EventLoop<()>) -> Result<LoopExit> {
        let status = event_loop.pump_app_events(Some(Duration::from_millis(100)), self);
        if let Some(e) = self.init_error.take() {
            return Err(e);
        }
        if matches!(status, PumpStatus::Exit(_)) {
            return Ok(LoopExit::UserQuit);
        }
        if self.shared.is_none() {
            return Err(anyhow!("window was never created (resumed did not fire)"));
        }

        let exit = event_loop::drive(RunBudget::unlimited(), || {
            let status = event_loop.pump_app_events(Some(Duration::ZERO), self);
            if matches!(status, PumpStatus::Exit(_)) || self.done {
                return LoopControl::Exit;
            }
            LoopControl::Continue
        });

        info!(?exit, "secondary event loop terminated");
        Ok(exit)
    }

    fn dispatch(&mut self, action: Action) {
        match action {
            Action::Quit => self.done = true,
            Action::MotionMarker => emit_marker(Role::Secondary),
            // The secondary never produces messages; the channel is
            // one-directional and these actions belong to the primary.
            Action::ColorSelected(_) | Action::CloseRequested | Action::SpawnChild => {}
        }
    }
}

impl ApplicationHandler for SecondaryApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.shared.is_some() || self.init_error.is_some() {
            return;
        }

        let result =
            create_window(event_loop, "Child Window").and_then(|window| GpuSurface::new(window));
        let surface = match result {
            Ok(surface) => surface,
            Err(e) => {
                self.init_error = Some(e);
                return;
            }
        };

        let shared: SharedHandle<GpuSurface> = Arc::new(Mutex::new(SharedWindow {
            state: WindowState::new(Role::Secondary),
            surface,
            palette: Palette::default(),
        }));

        // Initial paint, then hand the listener its half of the lock.
        {
            let mut win = shared.lock().unwrap();
            if let Err(e) = win.redraw() {
                warn!(error = %e, "initial secondary redraw failed");
            }
        }
        listener::spawn_listener(self.channel, Arc::clone(&shared));
        self.shared = Some(shared);
    }

    fn window_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.done {
            return;
        }

        match &event {
            WindowEvent::CloseRequested => {
                self.done = true;
                return;
            }
            WindowEvent::Resized(size) => {
                if let Some(shared) = &self.shared {
                    shared.lock().unwrap().surface.resize(size.width, size.height);
                }
                return;
            }
            WindowEvent::RedrawRequested => {
                // Expose path of the redraw race; same lock as the listener.
                if let Some(shared) = &self.shared {
                    let mut win = shared.lock().unwrap();
                    if let Err(e) = win.redraw() {
                        warn!(error = %e, "secondary redraw failed");
                    }
                }
                return;
            }
            _ => {}
        }

        if let Some(raw) = adapt_event(&event, &mut self.cursor) {
            if let Some(action) = input::translate(&raw, &self.view_state, &mut self.debounce) {
                self.dispatch(action);
            }
        }
    }
}

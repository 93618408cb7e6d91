//! Input translation: raw pointer/keyboard events → semantic actions.
//!
//! `translate` is a pure function of the event, the window state, and an
//! explicit motion-debounce value. It never performs IO; the event loop
//! dispatches the returned action (send a message, spawn the child, quit,
//! or emit a diagnostic marker).

use crate::palette::SwatchBox;
use crate::render::{Role, WindowState};

/// Motion events accumulated before one diagnostic marker is emitted.
/// Observable contract: both the threshold and the marker characters are
/// exercised by external tests.
pub const MOTION_DEBOUNCE_THRESHOLD: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Left,
    Right,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    Char(char),
    Escape,
    Other,
}

/// Toolkit-independent representation of one raw event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawEvent {
    PointerMoved { x: i32, y: i32 },
    ButtonPressed { button: PointerButton, x: i32, y: i32 },
    KeyPressed(KeyInput),
}

/// Zero-or-one semantic action per raw event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Left click landed inside swatch `i`.
    ColorSelected(usize),
    /// Right click anywhere; the primary turns this into the close sentinel.
    CloseRequested,
    /// Key `c`.
    SpawnChild,
    /// Escape; terminates the current process's event loop.
    Quit,
    /// Debounce threshold reached; emit the role's marker character.
    MotionMarker,
}

/// Explicit debounce state threaded through the translator instead of hidden
/// static storage.
#[derive(Debug, Clone, Default)]
pub struct MotionDebounce {
    since_last_marker: u32,
    last_position: Option<(i32, i32)>,
}

/// The stdout marker character for a role's motion diagnostics.
pub fn marker_for(role: Role) -> char {
    match role {
        Role::Primary => 'm',
        Role::Secondary => 'c',
    }
}

/// Find the first swatch whose bounds contain the point.
pub fn hit_test(swatches: &[SwatchBox], x: i32, y: i32) -> Option<usize> {
    swatches.iter().position(|b| b.contains(x, y))
}

/// Map one raw event to at most one action.
pub fn translate(
    event: &RawEvent,
    state: &WindowState,
    debounce: &mut MotionDebounce,
) -> Option<Action> {
    match *event {
        RawEvent::ButtonPressed {
            button: PointerButton::Right,
            ..
        } => Some(Action::CloseRequested),

        RawEvent::ButtonPressed {
            button: PointerButton::Left,
            x,
            y,
        } => hit_test(&state.swatches, x, y).map(Action::ColorSelected),

        RawEvent::ButtonPressed { .. } => None,

        RawEvent::KeyPressed(KeyInput::Char('c')) | RawEvent::KeyPressed(KeyInput::Char('C')) => {
            Some(Action::SpawnChild)
        }
        RawEvent::KeyPressed(KeyInput::Escape) => Some(Action::Quit),
        RawEvent::KeyPressed(_) => None,

        RawEvent::PointerMoved { x, y } => {
            // The primary only counts motion that actually changed position.
            if state.role == Role::Primary {
                if debounce.last_position == Some((x, y)) {
                    return None;
                }
                debounce.last_position = Some((x, y));
            }

            debounce.since_last_marker += 1;
            if debounce.since_last_marker >= MOTION_DEBOUNCE_THRESHOLD {
                debounce.since_last_marker = 0;
                Some(Action::MotionMarker)
            } else {
                None
            }
        }
    }
}

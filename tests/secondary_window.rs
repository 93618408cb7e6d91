//! Tests for the secondary window's shared-state machinery: the background
//! listener consuming a real kernel queue, and the redraw lock that keeps the
//! listener's repaints from interleaving with the event loop's.
//!
//! A mock surface stands in for the GPU stack; `serial_test` serializes the
//! tests that touch the global System V namespace.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use serial_test::serial;
use tempfile::TempDir;

use swatch_relay::channel::{ColorChannel, ColorMessage};
use swatch_relay::listener::{ListenerExit, SharedHandle, SharedWindow, listen};
use swatch_relay::palette::{Palette, Rgb};
use swatch_relay::render::{DrawSurface, Role, WindowState};

/// Counts frames and detects interleaved `begin_frame`..`present` spans.
#[derive(Default)]
struct CountingSurface {
    frames_begun: u32,
    frames_presented: u32,
    in_frame: bool,
    violations: u32,
}

impl DrawSurface for CountingSurface {
    fn begin_frame(&mut self) {
        if self.in_frame {
            self.violations += 1;
        }
        self.in_frame = true;
        self.frames_begun += 1;
    }

    fn fill_rect(&mut self, _x: f64, _y: f64, _w: f64, _h: f64, _color: Rgb) {
        if !self.in_frame {
            self.violations += 1;
        }
    }

    fn present(&mut self) -> anyhow::Result<()> {
        if !self.in_frame {
            self.violations += 1;
        }
        self.in_frame = false;
        self.frames_presented += 1;
        Ok(())
    }
}

fn shared_secondary() -> SharedHandle<CountingSurface> {
    Arc::new(Mutex::new(SharedWindow {
        state: WindowState::new(Role::Secondary),
        surface: CountingSurface::default(),
        palette: Palette::default(),
    }))
}

// ---------------------------------------------------------------------------
// Listener behavior
// ---------------------------------------------------------------------------

#[test]
#[serial]
fn listener_applies_colors_then_stops_at_the_sentinel() {
    let dir = TempDir::new().unwrap();
    let channel = ColorChannel::create_in(dir.path()).unwrap();
    let shared = shared_secondary();

    channel.send(ColorMessage::select(1)).unwrap();
    channel.send(ColorMessage::select(4)).unwrap();
    channel.send(ColorMessage::close()).unwrap();

    let exit = listen(&channel, &shared);
    assert!(matches!(exit, ListenerExit::CloseSentinel));

    let window = shared.lock().unwrap();
    // Last accepted color wins; the sentinel changes nothing and repaints
    // nothing.
    assert_eq!(window.state.current_color, Some(4));
    assert_eq!(window.surface.frames_presented, 2);
    assert_eq!(window.surface.violations, 0);

    drop(window);
    channel.remove().unwrap();
}

#[test]
#[serial]
fn listener_ignores_out_of_range_indices() {
    let dir = TempDir::new().unwrap();
    let channel = ColorChannel::create_in(dir.path()).unwrap();
    let shared = shared_secondary();

    channel.send(ColorMessage { color: 99 }).unwrap();
    channel.send(ColorMessage { color: -7 }).unwrap();
    channel.send(ColorMessage::close()).unwrap();

    let exit = listen(&channel, &shared);
    assert!(matches!(exit, ListenerExit::CloseSentinel));

    let window = shared.lock().unwrap();
    assert_eq!(window.state.current_color, None);
    assert_eq!(window.surface.frames_presented, 0);

    drop(window);
    channel.remove().unwrap();
}

#[test]
#[serial]
fn listener_reports_channel_loss() {
    let dir = TempDir::new().unwrap();
    let channel = ColorChannel::create_in(dir.path()).unwrap();
    let shared = shared_secondary();

    let handle = thread::spawn(move || listen(&channel, &shared));

    thread::sleep(Duration::from_millis(100));
    channel.remove().unwrap();

    let exit = handle.join().unwrap();
    assert!(matches!(exit, ListenerExit::ChannelGone(_)));
}

// ---------------------------------------------------------------------------
// Redraw lock
// ---------------------------------------------------------------------------

#[test]
fn concurrent_redraws_never_interleave_frames() {
    // Two contexts race full redraws through the shared window, as the
    // listener and the event loop's repaint path do in the real secondary.
    const ITERATIONS: u32 = 200;

    let shared = shared_secondary();
    let done = Arc::new(AtomicU32::new(0));

    let mut handles = Vec::new();
    for worker in 0..2 {
        let shared = Arc::clone(&shared);
        let done = Arc::clone(&done);
        handles.push(thread::spawn(move || {
            for i in 0..ITERATIONS {
                let mut window = shared.lock().unwrap();
                window.state.current_color = Some(((worker + i) % 5) as usize);
                window.redraw().unwrap();
            }
            done.fetch_add(1, Ordering::SeqCst);
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(done.load(Ordering::SeqCst), 2);

    let window = shared.lock().unwrap();
    assert_eq!(window.surface.violations, 0);
    assert_eq!(window.surface.frames_begun, ITERATIONS * 2);
    assert_eq!(window.surface.frames_presented, ITERATIONS * 2);
}

//! Background listener for the secondary process.
//!
//! One named thread blocks on the message channel for the whole process
//! lifetime; there is no graceful shutdown — the secondary exits via
//! `std::process::exit` from whichever context decides to terminate first.
//!
//! On message arrival the listener repaints the window itself, which races
//! the event loop's Expose repaints. Both sides go through the same
//! `SharedWindow` mutex, so a `begin_frame`..`present` sequence is never
//! interleaved.

use std::sync::{Arc, Mutex};
use std::thread;

use tracing::{error, info, warn};

use crate::channel::{ChannelError, ColorChannel, Payload};
use crate::palette::Palette;
use crate::render::{self, DrawSurface, WindowState};

/// A window whose state and surface are mutated from two execution contexts.
/// The surrounding mutex is the redraw lock.
pub struct SharedWindow<S: DrawSurface> {
    pub state: WindowState,
    pub surface: S,
    pub palette: Palette,
}

impl<S: DrawSurface> SharedWindow<S> {
    pub fn redraw(&mut self) -> anyhow::Result<()> {
        render::redraw(&mut self.surface, &self.state, &self.palette)
    }
}

pub type SharedHandle<S> = Arc<Mutex<SharedWindow<S>>>;

/// Why the listener stopped consuming. Either way the process terminates.
#[derive(Debug)]
pub enum ListenerExit {
    /// The close sentinel arrived; exit cleanly, no further redraw.
    CloseSentinel,
    /// The blocking receive failed — the queue was destroyed out from under
    /// us (normally: the primary shut down and removed it).
    ChannelGone(ChannelError),
}

/// Consume the channel until a termination condition.
///
/// Valid color indices update the shared state and trigger a full redraw
/// under the lock; out-of-range indices are logged and ignored with the
/// state left unchanged.
pub fn listen<S: DrawSurface>(channel: &ColorChannel, window: &SharedHandle<S>) -> ListenerExit {
    loop {
        match channel.recv() {
            Ok(msg) => match msg.payload() {
                Payload::Close => return ListenerExit::CloseSentinel,
                Payload::Color(index) => {
                    let mut win = window.lock().unwrap();
                    win.state.current_color = Some(index);
                    if let Err(e) = win.redraw() {
                        warn!(error = %e, "redraw after color change failed");
                    }
                }
                Payload::Invalid(color) => {
                    warn!(color, "ignoring out-of-range color index");
                }
            },
            Err(e) => return ListenerExit::ChannelGone(e),
        }
    }
}

/// Start the listener thread. It holds its own channel handle and a clone of
/// the window handle, and terminates the whole process when done.
pub fn spawn_listener<S>(channel: ColorChannel, window: SharedHandle<S>) -> thread::JoinHandle<()>
where
    S: DrawSurface + Send + 'static,
{
    thread::Builder::new()
        .name("color-listener".into())
        .spawn(move || match listen(&channel, &window) {
            ListenerExit::CloseSentinel => {
                info!("close sentinel received; terminating");
                std::process::exit(0);
            }
            ListenerExit::ChannelGone(e) => {
                error!(error = %e, "message channel lost; terminating");
                std::process::exit(1);
            }
        })
        .expect("failed to spawn listener thread")
}

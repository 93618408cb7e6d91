//! swatch-relay: a two-process interactive palette demo.
//!
//! The primary process owns a window with five color swatches; pressing `c`
//! spawns an independent secondary process with its own window. Clicking a
//! swatch sends the color index through a System V message queue; the
//! secondary's background listener receives it and repaints asynchronously.
//!
//! Module map:
//! - [`channel`] — the kernel message queue (the only coordination path)
//! - [`palette`] — fixed palette and swatch geometry
//! - [`input`] — raw events → semantic actions, motion debounce
//! - [`render`] — stateless full-window redraw over the `DrawSurface` trait
//! - [`surface`] — winit + vello implementation of `DrawSurface`
//! - [`supervisor`] — at-most-one secondary process
//! - [`listener`] — the secondary's blocking receive thread
//! - [`event_loop`] — pollable, budget-bounded loop driver
//! - [`app`] — winit handlers wiring it all together

pub mod app;
pub mod channel;
pub mod event_loop;
pub mod input;
pub mod listener;
pub mod logging;
pub mod palette;
pub mod render;
pub mod supervisor;
pub mod surface;

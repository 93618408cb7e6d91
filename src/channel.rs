//! The kernel-mediated message channel between the primary and secondary
//! processes.
//!
//! Backed by a System V message queue: the key is derived with `ftok` from a
//! directory (the working directory in production) and the fixed project id
//! `'m'`, so both processes resolve the same queue without exchanging any
//! state. The primary creates the queue before opening its window and removes
//! it on exit; the secondary opens the existing queue.
//!
//! The contract is deliberately asymmetric: `send` never blocks (`IPC_NOWAIT`,
//! best effort — a full queue is a dropped message, not backpressure) while
//! `recv` blocks indefinitely and only fails once the queue is destroyed out
//! from under it.

use std::ffi::CString;
use std::io;
use std::mem;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use thiserror::Error;

/// Channel tag carried by every message; the receiver filters on it.
pub const COLOR_TAG: libc::c_long = 1;

/// Reserved color index meaning "terminate the receiving window".
pub const CLOSE_SENTINEL: i32 = -1;

/// Project id fed to `ftok` alongside the directory.
const PROJECT_ID: libc::c_int = b'm' as libc::c_int;

/// On-queue representation: a `c_long` type tag followed by the color index.
/// Fixed size, no versioning. `msgsnd`/`msgrcv` are told the payload size
/// *excluding* the tag.
#[repr(C)]
struct WireMessage {
    mtype: libc::c_long,
    color: libc::c_int,
}

const PAYLOAD_SIZE: usize = mem::size_of::<libc::c_int>();

/// A color-change message as seen by application code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorMessage {
    pub color: i32,
}

/// Classification of a received payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload {
    /// Terminate the receiving process immediately.
    Close,
    /// Repaint with the given palette entry.
    Color(usize),
    /// Out-of-range index; logged and ignored by the receiver.
    Invalid(i32),
}

impl ColorMessage {
    /// A message selecting palette entry `index`.
    pub fn select(index: usize) -> Self {
        Self {
            color: index as i32,
        }
    }

    /// The close sentinel.
    pub fn close() -> Self {
        Self {
            color: CLOSE_SENTINEL,
        }
    }

    /// Classify the payload. The sentinel check comes first so `-1` is never
    /// treated as an index.
    pub fn payload(&self) -> Payload {
        if self.color == CLOSE_SENTINEL {
            Payload::Close
        } else if self.color >= 0 && (self.color as usize) < crate::palette::PALETTE_SIZE {
            Payload::Color(self.color as usize)
        } else {
            Payload::Invalid(self.color)
        }
    }
}

#[derive(Debug, Error)]
pub enum ChannelError {
    /// The queue could not be created or opened. Fatal at startup.
    #[error("message queue unavailable: {0}")]
    Unavailable(#[source] io::Error),
    /// A non-blocking send was rejected (queue full or gone). Best effort:
    /// the caller drops the message.
    #[error("message send rejected: {0}")]
    Send(#[source] io::Error),
    /// A blocking receive failed, which only happens once the queue has been
    /// removed. Fatal to the listener.
    #[error("message receive failed: {0}")]
    Recv(#[source] io::Error),
}

/// Handle to the process-wide message queue.
///
/// Holds only the kernel queue id, so it is freely shareable across threads;
/// the queue itself outlives any handle until `remove` is called.
#[derive(Debug, Clone, Copy)]
pub struct ColorChannel {
    id: libc::c_int,
}

impl ColorChannel {
    /// Create the queue (create-if-absent) keyed off `dir`. Called by the
    /// primary before any window exists.
    pub fn create_in(dir: &Path) -> Result<Self, ChannelError> {
        Self::get(dir, libc::IPC_CREAT | 0o666)
    }

    /// Open the already-created queue keyed off `dir`. Called by the
    /// secondary, which inherits the primary's working directory.
    pub fn open_in(dir: &Path) -> Result<Self, ChannelError> {
        Self::get(dir, 0o666)
    }

    fn get(dir: &Path, flags: libc::c_int) -> Result<Self, ChannelError> {
        let path = CString::new(dir.as_os_str().as_bytes())
            .map_err(|_| ChannelError::Unavailable(io::Error::from(io::ErrorKind::InvalidInput)))?;

        let key = unsafe { libc::ftok(path.as_ptr(), PROJECT_ID) };
        if key == -1 {
            return Err(ChannelError::Unavailable(io::Error::last_os_error()));
        }

        let id = unsafe { libc::msgget(key, flags) };
        if id == -1 {
            return Err(ChannelError::Unavailable(io::Error::last_os_error()));
        }

        Ok(Self { id })
    }

    /// Non-blocking, best-effort send. A full queue yields `Err` immediately;
    /// the sender never waits.
    pub fn send(&self, msg: ColorMessage) -> Result<(), ChannelError> {
        let wire = WireMessage {
            mtype: COLOR_TAG,
            color: msg.color,
        };

        let rc = unsafe {
            libc::msgsnd(
                self.id,
                &wire as *const WireMessage as *const libc::c_void,
                PAYLOAD_SIZE,
                libc::IPC_NOWAIT,
            )
        };
        if rc == -1 {
            return Err(ChannelError::Send(io::Error::last_os_error()));
        }
        Ok(())
    }

    /// Block until a message with the color tag arrives. Retries on signal
    /// interruption; any other failure means the queue was destroyed.
    pub fn recv(&self) -> Result<ColorMessage, ChannelError> {
        loop {
            let mut wire = WireMessage {
                mtype: 0,
                color: 0,
            };

            let rc = unsafe {
                libc::msgrcv(
                    self.id,
                    &mut wire as *mut WireMessage as *mut libc::c_void,
                    PAYLOAD_SIZE,
                    COLOR_TAG,
                    0,
                )
            };
            if rc == -1 {
                let err = io::Error::last_os_error();
                if err.raw_os_error() == Some(libc::EINTR) {
                    continue;
                }
                return Err(ChannelError::Recv(err));
            }
            return Ok(ColorMessage { color: wire.color });
        }
    }

    /// Remove the queue from the kernel. Any thread blocked in `recv` fails
    /// at this point. Called by the primary on shutdown.
    pub fn remove(&self) -> Result<(), ChannelError> {
        let rc = unsafe { libc::msgctl(self.id, libc::IPC_RMID, std::ptr::null_mut()) };
        if rc == -1 {
            return Err(ChannelError::Unavailable(io::Error::last_os_error()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_classifies_as_close() {
        assert_eq!(ColorMessage::close().payload(), Payload::Close);
        assert_eq!(ColorMessage { color: -1 }.payload(), Payload::Close);
    }

    #[test]
    fn valid_indices_classify_as_color() {
        for i in 0..crate::palette::PALETTE_SIZE {
            assert_eq!(ColorMessage::select(i).payload(), Payload::Color(i));
        }
    }

    #[test]
    fn out_of_range_classifies_as_invalid() {
        assert_eq!(ColorMessage { color: 5 }.payload(), Payload::Invalid(5));
        assert_eq!(ColorMessage { color: -2 }.payload(), Payload::Invalid(-2));
        assert_eq!(
            ColorMessage { color: i32::MAX }.payload(),
            Payload::Invalid(i32::MAX)
        );
    }
}

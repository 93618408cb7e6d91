//! Process supervisor: at most one live secondary process.
//!
//! The secondary is an independent actor, not a fork: it is spawned by
//! re-executing this binary with `--secondary`, inheriting stdio (so its
//! diagnostic markers share the terminal) and the working directory (so it
//! derives the same message-queue key). It re-initializes its own window
//! surface and listener; nothing of the parent's window is inherited.
//!
//! Child exit is detected passively via `try_wait` during idle loop
//! iterations — the supervisor never blocks on the child.

use std::io;
use std::process::{Child, Command};

use anyhow::Context;
use tracing::{debug, info, warn};

/// Role flag passed to the re-executed binary.
pub const SECONDARY_FLAG: &str = "--secondary";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildStatus {
    NoChild,
    Running,
}

/// Owns the handle to the one allowed secondary process.
#[derive(Debug, Default)]
pub struct ChildSupervisor {
    child: Option<Child>,
}

impl ChildSupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> ChildStatus {
        if self.child.is_some() {
            ChildStatus::Running
        } else {
            ChildStatus::NoChild
        }
    }

    pub fn has_live_child(&self) -> bool {
        self.child.is_some()
    }

    /// Spawn the secondary process. Idempotent: a request while a child is
    /// live is silently ignored.
    pub fn spawn_secondary(&mut self) -> anyhow::Result<()> {
        if self.child.is_some() {
            debug!("spawn requested while a child is live; ignoring");
            return Ok(());
        }

        let exe = std::env::current_exe().context("resolving current executable")?;
        let mut command = Command::new(&exe);
        command.arg(SECONDARY_FLAG);

        let spawned = self
            .spawn_with(&mut command)
            .with_context(|| format!("spawning secondary process from {}", exe.display()))?;
        debug_assert!(spawned);
        Ok(())
    }

    /// Spawn an arbitrary command as the supervised child. Returns `false`
    /// when a child is already live (the idempotent no-op case).
    ///
    /// `spawn_secondary` routes through here; tests drive it directly with
    /// short-lived commands.
    pub fn spawn_with(&mut self, command: &mut Command) -> io::Result<bool> {
        if self.child.is_some() {
            return Ok(false);
        }

        let child = command.spawn()?;
        info!(pid = child.id(), "secondary process spawned");
        self.child = Some(child);
        Ok(true)
    }

    /// Passive exit detection, called once per idle loop iteration. A child
    /// that has exited (for any reason) transitions the supervisor back to
    /// `NoChild` so a new spawn is allowed.
    pub fn poll(&mut self) {
        let Some(child) = &mut self.child else {
            return;
        };

        match child.try_wait() {
            Ok(Some(status)) => {
                info!(%status, "secondary process exited");
                self.child = None;
            }
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "could not poll secondary process; dropping handle");
                self.child = None;
            }
        }
    }
}

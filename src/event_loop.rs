//! The top-level event-loop driver shared by both processes.
//!
//! Each iteration pumps every currently pending surface event, then sleeps
//! one fixed poll interval and charges it against the optional run budget.
//! The budget is how an unattended run self-terminates; an interactive run
//! ends when a pump reports a quit.
//!
//! The pump callback owns all event dispatch (winit in production, scripted
//! closures in tests); `drive` only owns timing and termination.

use std::thread;
use std::time::Duration;

use thiserror::Error;
use tracing::warn;

/// Sleep between idle iterations; also the budget decrement per iteration.
pub const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Budget applied when the CLI argument is absent or unparsable.
pub const DEFAULT_BUDGET_MS: u64 = 10_000;

/// A negative budget is a configuration error, reported before any window or
/// channel exists — never silently clamped.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("run budget cannot be negative (got {0} ms)")]
pub struct NegativeBudget(pub i64);

/// Remaining wall-clock allowance for an event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunBudget {
    remaining: Option<Duration>,
}

impl RunBudget {
    /// No self-termination; used by the secondary process.
    pub fn unlimited() -> Self {
        Self { remaining: None }
    }

    pub fn finite(ms: u64) -> Self {
        Self {
            remaining: Some(Duration::from_millis(ms)),
        }
    }

    /// Default-and-warn policy for the startup argument: absent or
    /// unparsable input falls back to `DEFAULT_BUDGET_MS`; a negative value
    /// is a hard error.
    pub fn from_arg(arg: Option<&str>) -> Result<Self, NegativeBudget> {
        match arg {
            None => {
                warn!(
                    default_ms = DEFAULT_BUDGET_MS,
                    "no run budget supplied; using default"
                );
                Ok(Self::finite(DEFAULT_BUDGET_MS))
            }
            Some(raw) => match raw.parse::<i64>() {
                Ok(ms) if ms < 0 => Err(NegativeBudget(ms)),
                Ok(ms) => Ok(Self::finite(ms as u64)),
                Err(_) => {
                    warn!(
                        raw,
                        default_ms = DEFAULT_BUDGET_MS,
                        "unparsable run budget; using default"
                    );
                    Ok(Self::finite(DEFAULT_BUDGET_MS))
                }
            },
        }
    }

    /// True when a finite budget has reached zero.
    pub fn is_exhausted(&self) -> bool {
        matches!(self.remaining, Some(d) if d.is_zero())
    }

    /// Charge one idle interval. Returns `false` when the budget just ran
    /// out and the loop must terminate.
    pub fn tick(&mut self, elapsed: Duration) -> bool {
        match &mut self.remaining {
            None => true,
            Some(rem) => {
                *rem = rem.saturating_sub(elapsed);
                !rem.is_zero()
            }
        }
    }
}

/// Outcome of one pump: keep looping or stop now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Exit,
}

/// Why the loop terminated. Both are clean exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    UserQuit,
    BudgetExhausted,
}

/// Run the loop to termination.
///
/// A zero budget terminates before the first pump — no input is processed.
pub fn drive(mut budget: RunBudget, mut pump: impl FnMut() -> LoopControl) -> LoopExit {
    if budget.is_exhausted() {
        return LoopExit::BudgetExhausted;
    }

    loop {
        if pump() == LoopControl::Exit {
            return LoopExit::UserQuit;
        }
        thread::sleep(POLL_INTERVAL);
        if !budget.tick(POLL_INTERVAL) {
            return LoopExit::BudgetExhausted;
        }
    }
}

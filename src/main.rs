//! swatch-relay entry point.
//!
//! One binary, two roles. Invoked plain it runs the primary process: create
//! the message queue, open the swatch window, drive the budgeted event loop,
//! remove the queue on the way out. Invoked with `--secondary` (done by the
//! primary's supervisor) it runs the child: open the existing queue, open its
//! own window, start the background listener, loop until terminated.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use winit::event_loop::EventLoop;

use swatch_relay::app::{PrimaryApp, SecondaryApp};
use swatch_relay::channel::ColorChannel;
use swatch_relay::event_loop::RunBudget;
use swatch_relay::logging;

/// Two-process palette demo over a kernel message queue.
#[derive(Parser, Debug)]
#[command(name = "swatch-relay", version)]
struct Args {
    /// Run budget in milliseconds; the primary loop self-terminates when it
    /// expires. Absent or unparsable falls back to the default with a
    /// warning; negative is rejected.
    #[arg(allow_negative_numbers = true)]
    budget_ms: Option<String>,

    /// Run as the secondary (child) process. Set by the supervisor when
    /// re-executing the binary; not intended for direct use.
    #[arg(long, hide = true)]
    secondary: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = logging::init();

    if args.secondary {
        run_secondary()
    } else {
        run_primary(args.budget_ms.as_deref())
    }
}

fn run_primary(budget_arg: Option<&str>) -> Result<()> {
    // A negative budget is a configuration error; it must be rejected before
    // the channel or any window exists.
    let budget = RunBudget::from_arg(budget_arg)?;

    let cwd = std::env::current_dir().context("resolving working directory")?;
    let channel = ColorChannel::create_in(&cwd).context("creating message channel")?;
    info!("message channel ready");

    // A zero budget expires before any input: no window, no event loop.
    let result = if budget.is_exhausted() {
        info!("run budget expired at startup; no input will be processed");
        Ok(())
    } else {
        (|| {
            let mut event_loop = EventLoop::new().context("creating event loop")?;
            let mut app = PrimaryApp::new(channel);
            app.run(&mut event_loop, budget)?;
            Ok(())
        })()
    };

    // The primary removes the queue on every exit path once it exists; a
    // blocked secondary listener fails out at this point and terminates.
    if let Err(e) = channel.remove() {
        warn!(error = %e, "could not remove message queue");
    }

    result
}

fn run_secondary() -> Result<()> {
    let cwd = std::env::current_dir().context("resolving working directory")?;
    let channel = ColorChannel::open_in(&cwd).context("opening message channel")?;

    let mut event_loop = EventLoop::new().context("creating event loop")?;
    let mut app = SecondaryApp::new(channel);
    app.run(&mut event_loop)?;
    Ok(())
}

//! Binary-level tests for the primary's startup contract: budget validation
//! happens before the message queue exists, a zero budget processes no input
//! at all, and the queue never outlives the process.
//!
//! Each test runs the real binary with a temporary working directory so it
//! derives a private queue key; `serial_test` keeps the runs from sharing
//! the kernel namespace.

use std::process::Command;

use serial_test::serial;
use tempfile::TempDir;

use swatch_relay::channel::{ChannelError, ColorChannel};

const BIN: &str = env!("CARGO_BIN_EXE_swatch-relay");

#[test]
#[serial]
fn negative_budget_exits_nonzero_before_creating_the_queue() {
    let dir = TempDir::new().unwrap();
    let output = Command::new(BIN)
        .arg("-5")
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert!(
        !output.status.success(),
        "negative budget must be a startup error"
    );
    // Validation rejected the argument before the queue was created.
    assert!(matches!(
        ColorChannel::open_in(dir.path()),
        Err(ChannelError::Unavailable(_))
    ));
}

#[test]
#[serial]
fn zero_budget_exits_cleanly_without_processing_input() {
    let dir = TempDir::new().unwrap();
    let output = Command::new(BIN)
        .arg("0")
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "zero budget is a clean exit; stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    // No input means no marker characters on stdout.
    assert!(output.stdout.is_empty());
    // The queue was created and removed again on the way out.
    assert!(matches!(
        ColorChannel::open_in(dir.path()),
        Err(ChannelError::Unavailable(_))
    ));
}

//! Integration tests for the message channel against a real kernel queue.
//!
//! Each test keys its queue off a fresh temporary directory and removes it
//! before returning; `serial_test` keeps tests from racing on the global
//! System V namespace.

use std::thread;
use std::time::Duration;

use serial_test::serial;
use tempfile::TempDir;

use swatch_relay::channel::{ChannelError, ColorChannel, ColorMessage, Payload};

// ---------------------------------------------------------------------------
// Create / open / round-trip
// ---------------------------------------------------------------------------

#[test]
#[serial]
fn send_then_recv_round_trips_a_color() {
    let dir = TempDir::new().unwrap();
    let channel = ColorChannel::create_in(dir.path()).unwrap();

    channel.send(ColorMessage::select(3)).unwrap();
    let received = channel.recv().unwrap();

    assert_eq!(received, ColorMessage::select(3));
    assert_eq!(received.payload(), Payload::Color(3));

    channel.remove().unwrap();
}

#[test]
#[serial]
fn open_resolves_the_queue_the_creator_made() {
    let dir = TempDir::new().unwrap();
    let creator = ColorChannel::create_in(dir.path()).unwrap();
    let opener = ColorChannel::open_in(dir.path()).unwrap();

    creator.send(ColorMessage::close()).unwrap();
    assert_eq!(opener.recv().unwrap().payload(), Payload::Close);

    creator.remove().unwrap();
}

#[test]
#[serial]
fn open_fails_when_no_queue_exists() {
    let dir = TempDir::new().unwrap();
    let result = ColorChannel::open_in(dir.path());
    assert!(matches!(result, Err(ChannelError::Unavailable(_))));
}

#[test]
#[serial]
fn messages_arrive_in_send_order() {
    let dir = TempDir::new().unwrap();
    let channel = ColorChannel::create_in(dir.path()).unwrap();

    for i in 0..5 {
        channel.send(ColorMessage::select(i)).unwrap();
    }
    for i in 0..5 {
        assert_eq!(channel.recv().unwrap(), ColorMessage::select(i));
    }

    channel.remove().unwrap();
}

// ---------------------------------------------------------------------------
// Failure behavior
// ---------------------------------------------------------------------------

#[test]
#[serial]
fn full_queue_rejects_send_without_blocking() {
    let dir = TempDir::new().unwrap();
    let channel = ColorChannel::create_in(dir.path()).unwrap();

    // Kernel queues are byte-bounded (msgmnb, typically 16 KiB), so pushing
    // non-blocking must eventually fail rather than hang this thread.
    let mut rejected = None;
    for _ in 0..1_000_000 {
        if let Err(e) = channel.send(ColorMessage::select(0)) {
            rejected = Some(e);
            break;
        }
    }

    let err = rejected.expect("queue never reported full");
    assert!(matches!(err, ChannelError::Send(_)));

    channel.remove().unwrap();
}

#[test]
#[serial]
fn blocked_recv_fails_once_the_queue_is_removed() {
    let dir = TempDir::new().unwrap();
    let channel = ColorChannel::create_in(dir.path()).unwrap();

    // Handle is Copy; one copy blocks in recv on another thread.
    let receiver = thread::spawn(move || channel.recv());

    // Give the receiver time to block before destroying the queue.
    thread::sleep(Duration::from_millis(100));
    channel.remove().unwrap();

    let result = receiver.join().unwrap();
    assert!(matches!(result, Err(ChannelError::Recv(_))));
}

#[test]
#[serial]
fn out_of_range_payload_survives_the_wire() {
    let dir = TempDir::new().unwrap();
    let channel = ColorChannel::create_in(dir.path()).unwrap();

    channel.send(ColorMessage { color: 42 }).unwrap();
    assert_eq!(channel.recv().unwrap().payload(), Payload::Invalid(42));

    channel.remove().unwrap();
}

//! Queue Handle Library properties against real kernel queues
//!
//! Every test works on its own uniquely named queue and unlinks it through
//! an UnlinkGuard, so the tests can run in parallel.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use posixmq_core::application::UnlinkGuard;
use posixmq_core::domain::{OpenOptions, QueueAttributes, QueueName};
use posixmq_core::error::Operation;
use posixmq_core::port::{MessageQueue, QueueNamespace};
use posixmq_infra_system::PosixNamespace;

fn unique_name(tag: &str) -> QueueName {
    QueueName::new(format!("/posixmq-it-{}-{}", tag, uuid::Uuid::new_v4().simple()))
}

/// A freshly opened handle reports the attributes the queue was created with
#[test]
fn test_create_then_open_attributes_match() {
    let ns = PosixNamespace::new();
    let name = unique_name("attrs");
    let _guard = UnlinkGuard::new(&ns, name.clone());

    let created = ns.create(&name, QueueAttributes::new(512, 8)).unwrap();
    let opened = ns.open(&name).unwrap();

    assert_eq!(opened.attributes().max_message_size, 512);
    assert_eq!(opened.attributes().max_queue_depth, 8);
    assert_eq!(opened.attributes(), created.attributes());

    opened.close().unwrap();
    created.close().unwrap();
}

/// Binary payload (embedded NULs included) and priority survive a round trip
#[test]
fn test_send_receive_identical_bytes_and_priority() {
    let ns = PosixNamespace::new();
    let name = unique_name("rt");
    let _guard = UnlinkGuard::new(&ns, name.clone());

    let queue = ns.create(&name, QueueAttributes::new(64, 4)).unwrap();
    let payload = [0u8, 1, 2, 255, b'x', 0];

    queue.send(&payload, 42).unwrap();
    let msg = queue.receive(64).unwrap();

    assert_eq!(msg.payload, payload);
    assert_eq!(msg.priority, 42);
}

/// A message of exactly the maximum size fits
#[test]
fn test_message_at_max_size_accepted() {
    let ns = PosixNamespace::new();
    let name = unique_name("edge");
    let _guard = UnlinkGuard::new(&ns, name.clone());

    let queue = ns.create(&name, QueueAttributes::new(32, 2)).unwrap();
    queue.send(&[7u8; 32], 0).unwrap();

    assert_eq!(queue.recv().unwrap().len(), 32);
}

/// Sending one byte over the maximum size fails
#[test]
fn test_oversized_send_fails() {
    let ns = PosixNamespace::new();
    let name = unique_name("big");
    let _guard = UnlinkGuard::new(&ns, name.clone());

    let queue = ns.create(&name, QueueAttributes::new(32, 2)).unwrap();
    let err = queue.send(&[0u8; 33], 0).unwrap_err();

    assert!(err.is_message_too_large());
    assert_eq!(err.operation(), Operation::Send);
}

/// Receive buffer smaller than the maximum message size fails
#[test]
fn test_receive_buffer_too_small_fails() {
    let ns = PosixNamespace::new();
    let name = unique_name("smallbuf");
    let _guard = UnlinkGuard::new(&ns, name.clone());

    let queue = ns.create(&name, QueueAttributes::new(64, 2)).unwrap();
    queue.send(b"hi", 0).unwrap();

    let err = queue.receive(16).unwrap_err();
    assert!(err.is_message_too_large());
    assert_eq!(queue.pending().unwrap(), 1);
}

/// Non-blocking receive on an empty queue fails immediately
#[test]
fn test_nonblocking_empty_receive_fails() {
    let ns = PosixNamespace::new();
    let name = unique_name("empty");
    let _guard = UnlinkGuard::new(&ns, name.clone());

    let queue = ns
        .create_with(
            &name,
            QueueAttributes::new(64, 2),
            OpenOptions::new().nonblocking(true),
        )
        .unwrap();

    let err = queue.recv().unwrap_err();
    assert!(err.is_would_block());
    assert_eq!(err.operation(), Operation::Receive);
}

/// Non-blocking send to a full queue fails immediately
#[test]
fn test_nonblocking_full_send_fails() {
    let ns = PosixNamespace::new();
    let name = unique_name("full");
    let _guard = UnlinkGuard::new(&ns, name.clone());

    let queue = ns
        .create_with(
            &name,
            QueueAttributes::new(16, 1),
            OpenOptions::new().nonblocking(true),
        )
        .unwrap();

    queue.send(b"one", 0).unwrap();
    assert!(queue.send(b"two", 0).unwrap_err().is_would_block());
}

/// Blocking receive parks the caller until another handle sends
#[test]
fn test_blocking_receive_waits_for_sender() {
    let ns = PosixNamespace::new();
    let name = unique_name("block");
    let _guard = UnlinkGuard::new(&ns, name.clone());

    let receiver = ns.create(&name, QueueAttributes::new(64, 2)).unwrap();
    let sender = ns.open(&name).unwrap();

    let (tx, rx) = mpsc::channel();
    let handle = thread::spawn(move || {
        let msg = receiver.recv().unwrap();
        tx.send(msg).unwrap();
    });

    assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());

    sender.send(b"wake up", 3).unwrap();
    let msg = rx.recv_timeout(Duration::from_secs(5)).unwrap();

    assert_eq!(msg.payload, b"wake up");
    assert_eq!(msg.priority, 3);
    handle.join().unwrap();
}

/// Unlink removes the name; existing handles keep working
#[test]
fn test_unlink_removes_name_keeps_handles() {
    let ns = PosixNamespace::new();
    let name = unique_name("unlink");

    let queue = ns.create(&name, QueueAttributes::new(64, 2)).unwrap();
    ns.unlink(&name).unwrap();

    let err = ns.open(&name).unwrap_err();
    assert!(err.is_not_found());
    assert!(ns.unlink(&name).unwrap_err().is_not_found());

    queue.send(b"orphan", 1).unwrap();
    assert_eq!(queue.recv().unwrap().payload, b"orphan");
    queue.close().unwrap();
}

/// Higher priority first, FIFO among equal priorities
#[test]
fn test_priority_ordering() {
    let ns = PosixNamespace::new();
    let name = unique_name("prio");
    let _guard = UnlinkGuard::new(&ns, name.clone());

    let queue = ns.create(&name, QueueAttributes::new(16, 8)).unwrap();
    queue.send(b"low-a", 1).unwrap();
    queue.send(b"low-b", 1).unwrap();
    queue.send(b"mid", 5).unwrap();
    queue.send(b"high", 10).unwrap();

    let received: Vec<(Vec<u8>, u32)> = (0..4)
        .map(|_| {
            let msg = queue.recv().unwrap();
            (msg.payload, msg.priority)
        })
        .collect();

    assert_eq!(
        received,
        vec![
            (b"high".to_vec(), 10),
            (b"mid".to_vec(), 5),
            (b"low-a".to_vec(), 1),
            (b"low-b".to_vec(), 1),
        ]
    );
}

/// Create/open split: exclusive create collides, open-or-create reuses
#[test]
fn test_create_modes_differ_on_existing_name() {
    let ns = PosixNamespace::new();
    let name = unique_name("modes");
    let _guard = UnlinkGuard::new(&ns, name.clone());

    let first = ns.create(&name, QueueAttributes::new(128, 4)).unwrap();

    let err = ns
        .create_with(&name, QueueAttributes::new(64, 2), OpenOptions::new().exclusive())
        .unwrap_err();
    assert!(err.is_already_exists());

    let reused = ns.create(&name, QueueAttributes::new(64, 2)).unwrap();
    assert_eq!(reused.attributes(), first.attributes());
}

/// Dropping a handle releases it; the queue itself survives
#[test]
fn test_drop_closes_handle_only() {
    let ns = PosixNamespace::new();
    let name = unique_name("drop");
    let _guard = UnlinkGuard::new(&ns, name.clone());

    {
        let queue = ns.create(&name, QueueAttributes::new(16, 2)).unwrap();
        queue.send(b"kept", 0).unwrap();
    }

    let reopened = ns.open(&name).unwrap();
    assert_eq!(reopened.recv().unwrap().payload, b"kept");
}

// Port Layer - Interfaces for kernel-backed queues

pub mod message_queue;

// Re-exports
pub use message_queue::{mocks, MessageQueue, QueueNamespace};

// Domain Layer - Queue and message value types

pub mod message;
pub mod queue;

// Re-exports
pub use message::{Message, Priority};
pub use queue::{CreateMode, OpenOptions, QueueAttributes, QueueName};

// posixmq Core - Domain Types, Error Model & Ports
// NO system dependencies: kernel access lives in posixmq-infra-system

pub mod application;
pub mod domain;
pub mod error;
pub mod port;

pub use domain::{CreateMode, Message, OpenOptions, Priority, QueueAttributes, QueueName};
pub use error::{Operation, QueueError, Result};
pub use port::{MessageQueue, QueueNamespace};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// posixmq Infrastructure - System Adapters
// Implements: QueueNamespace, MessageQueue over the kernel mq_* API

pub mod posix_namespace;
pub mod posix_queue;

pub use posix_namespace::PosixNamespace;
pub use posix_queue::PosixQueue;

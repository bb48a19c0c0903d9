// Queue Domain Model

use std::fmt;

/// Default maximum message size in bytes
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 4096;

/// Default maximum number of queued messages
pub const DEFAULT_MAX_QUEUE_DEPTH: usize = 10;

/// Default permission bits for newly created queues
pub const DEFAULT_PERMISSIONS: u32 = 0o644;

/// Platform queue name (e.g. "/jobs")
///
/// Not validated here; the kernel rejects malformed names with EINVAL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueueName(String);

impl QueueName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueueName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for QueueName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for QueueName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Capacity attributes, fixed at creation time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueAttributes {
    pub max_message_size: usize,
    pub max_queue_depth: usize,
}

impl QueueAttributes {
    pub fn new(max_message_size: usize, max_queue_depth: usize) -> Self {
        Self {
            max_message_size,
            max_queue_depth,
        }
    }
}

impl Default for QueueAttributes {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_MESSAGE_SIZE, DEFAULT_MAX_QUEUE_DEPTH)
    }
}

/// How `create` treats a name that already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CreateMode {
    /// Open the existing queue; its original attributes win
    #[default]
    OpenOrCreate,
    /// Fail with EEXIST
    Exclusive,
}

/// Flags applied when creating or opening a queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenOptions {
    pub mode: CreateMode,
    pub nonblocking: bool,
    pub permissions: u32,
}

impl OpenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exclusive(mut self) -> Self {
        self.mode = CreateMode::Exclusive;
        self
    }

    pub fn nonblocking(mut self, nonblocking: bool) -> Self {
        self.nonblocking = nonblocking;
        self
    }

    pub fn permissions(mut self, permissions: u32) -> Self {
        self.permissions = permissions;
        self
    }
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            mode: CreateMode::default(),
            nonblocking: false,
            permissions: DEFAULT_PERMISSIONS,
        }
    }
}

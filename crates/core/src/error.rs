// Central Error Type for queue operations

use std::fmt;
use thiserror::Error;

/// errno values surfaced by queue operations
///
/// The values shared by every Unix live here; the rest differ between
/// Linux, the BSDs and Solaris.
pub mod codes {
    pub const ENOENT: i32 = 2;
    pub const EINTR: i32 = 4;
    pub const EBADF: i32 = 9;
    pub const EACCES: i32 = 13;
    pub const EEXIST: i32 = 17;
    pub const EINVAL: i32 = 22;

    pub use self::platform::{EAGAIN, EMSGSIZE};

    #[cfg(any(
        target_os = "macos",
        target_os = "ios",
        target_os = "freebsd",
        target_os = "netbsd",
        target_os = "openbsd",
        target_os = "dragonfly"
    ))]
    mod platform {
        pub const EAGAIN: i32 = 35;
        pub const EMSGSIZE: i32 = 40;
    }

    #[cfg(any(target_os = "solaris", target_os = "illumos"))]
    mod platform {
        pub const EAGAIN: i32 = 11;
        pub const EMSGSIZE: i32 = 97;
    }

    // Linux numbering; also what the in-memory adapter reports elsewhere
    #[cfg(not(any(
        target_os = "macos",
        target_os = "ios",
        target_os = "freebsd",
        target_os = "netbsd",
        target_os = "openbsd",
        target_os = "dragonfly",
        target_os = "solaris",
        target_os = "illumos"
    )))]
    mod platform {
        pub const EAGAIN: i32 = 11;
        pub const EMSGSIZE: i32 = 90;
    }
}

/// Queue operation that produced an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Open,
    Close,
    Unlink,
    Send,
    Receive,
    GetAttributes,
    SetAttributes,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Create => "create",
            Operation::Open => "open",
            Operation::Close => "close",
            Operation::Unlink => "unlink",
            Operation::Send => "send",
            Operation::Receive => "receive",
            Operation::GetAttributes => "getattr",
            Operation::SetAttributes => "setattr",
        };
        f.write_str(name)
    }
}

/// Failure of a single queue operation, carrying the originating errno
///
/// Never retried internally; callers decide what to do with it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("queue {operation} failed: {}", describe(.code))]
pub struct QueueError {
    operation: Operation,
    code: i32,
}

impl QueueError {
    pub fn new(operation: Operation, code: i32) -> Self {
        Self { operation, code }
    }

    /// Raw errno value reported by the system
    pub fn code(&self) -> i32 {
        self.code
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// Portable classification of the errno, as std maps it on this platform
    pub fn kind(&self) -> std::io::ErrorKind {
        describe(&self.code).kind()
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == std::io::ErrorKind::NotFound
    }

    pub fn is_already_exists(&self) -> bool {
        self.kind() == std::io::ErrorKind::AlreadyExists
    }

    /// Non-blocking call on a full (send) or empty (receive) queue
    pub fn is_would_block(&self) -> bool {
        self.kind() == std::io::ErrorKind::WouldBlock
    }

    /// Blocking call cut short by a signal handler
    pub fn is_interrupted(&self) -> bool {
        self.kind() == std::io::ErrorKind::Interrupted
    }

    pub fn is_message_too_large(&self) -> bool {
        self.code == codes::EMSGSIZE
    }
}

impl From<QueueError> for std::io::Error {
    fn from(err: QueueError) -> Self {
        std::io::Error::from_raw_os_error(err.code)
    }
}

fn describe(code: &i32) -> std::io::Error {
    std::io::Error::from_raw_os_error(*code)
}

/// Result type alias using QueueError
pub type Result<T> = std::result::Result<T, QueueError>;

// Message Domain Model

use std::borrow::Cow;

/// Priority (higher number = dequeued first)
pub type Priority = u32;

/// A dequeued (or to-be-enqueued) message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub payload: Vec<u8>,
    pub priority: Priority,
}

impl Message {
    pub fn new(payload: impl Into<Vec<u8>>, priority: Priority) -> Self {
        Self {
            payload: payload.into(),
            priority,
        }
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// Payload as UTF-8, if valid
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.payload).ok()
    }

    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }
}

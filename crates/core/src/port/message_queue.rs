// Message Queue Ports
// Synchronous by nature: every call maps onto one blocking kernel call

use crate::domain::{Message, OpenOptions, Priority, QueueAttributes, QueueName};
use crate::error::Result;

/// An opened queue handle
///
/// Implementations own the underlying descriptor and release it on drop.
pub trait MessageQueue: Send {
    /// Name the handle was opened with
    fn name(&self) -> &QueueName;

    /// Attributes read when the handle was opened
    fn attributes(&self) -> QueueAttributes;

    /// Enqueue a message
    ///
    /// # Errors
    /// - EMSGSIZE if `payload` exceeds the queue's maximum message size
    /// - EAGAIN if the queue is full and the handle is non-blocking
    fn send(&self, payload: &[u8], priority: Priority) -> Result<()>;

    /// Dequeue the highest-priority message into `buffer`
    ///
    /// # Returns
    /// (bytes written, priority)
    ///
    /// # Errors
    /// - EMSGSIZE if `buffer` is smaller than the maximum message size
    /// - EAGAIN if the queue is empty and the handle is non-blocking
    fn receive_into(&self, buffer: &mut [u8]) -> Result<(usize, Priority)>;

    /// Dequeue into a freshly allocated buffer of `buffer_capacity` bytes
    fn receive(&self, buffer_capacity: usize) -> Result<Message> {
        let mut buffer = vec![0u8; buffer_capacity];
        let (len, priority) = self.receive_into(&mut buffer)?;
        buffer.truncate(len);
        Ok(Message::new(buffer, priority))
    }

    /// Dequeue using a buffer sized from the queue's attributes
    fn recv(&self) -> Result<Message> {
        self.receive(self.attributes().max_message_size)
    }

    /// Number of messages currently queued
    fn pending(&self) -> Result<usize>;

    /// Switch between blocking and non-blocking send/receive
    fn set_nonblocking(&mut self, nonblocking: bool) -> Result<()>;

    /// Release the handle, surfacing the close error
    fn close(self) -> Result<()>
    where
        Self: Sized;
}

/// Named-queue namespace: the entry points that produce handles
///
/// `create` and `open` stay separate: they differ on missing vs.
/// already-existing names.
pub trait QueueNamespace {
    type Queue: MessageQueue;

    /// Create a queue with explicit flags
    fn create_with(
        &self,
        name: &QueueName,
        attributes: QueueAttributes,
        options: OpenOptions,
    ) -> Result<Self::Queue>;

    /// Create a queue, opening it instead if the name already exists
    fn create(&self, name: &QueueName, attributes: QueueAttributes) -> Result<Self::Queue> {
        self.create_with(name, attributes, OpenOptions::default())
    }

    /// Open an existing queue; `options.mode` is ignored
    fn open_with(&self, name: &QueueName, options: OpenOptions) -> Result<Self::Queue>;

    /// Open an existing queue in blocking mode
    fn open(&self, name: &QueueName) -> Result<Self::Queue> {
        self.open_with(name, OpenOptions::default())
    }

    /// Remove the name; handles already open stay usable
    fn unlink(&self, name: &QueueName) -> Result<()>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::domain::CreateMode;
    use crate::error::{codes, Operation, QueueError};
    use std::cmp::Ordering;
    use std::collections::{BinaryHeap, HashMap};
    use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

    struct Entry {
        priority: Priority,
        seq: u64,
        payload: Vec<u8>,
    }

    // Max-heap order: higher priority first, then lower sequence (older) first
    impl Ord for Entry {
        fn cmp(&self, other: &Self) -> Ordering {
            self.priority
                .cmp(&other.priority)
                .then_with(|| other.seq.cmp(&self.seq))
        }
    }

    impl PartialOrd for Entry {
        fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
            Some(self.cmp(other))
        }
    }

    impl PartialEq for Entry {
        fn eq(&self, other: &Self) -> bool {
            self.cmp(other) == Ordering::Equal
        }
    }

    impl Eq for Entry {}

    #[derive(Default)]
    struct QueueState {
        heap: BinaryHeap<Entry>,
        next_seq: u64,
    }

    struct SharedQueue {
        attributes: QueueAttributes,
        state: Mutex<QueueState>,
        not_empty: Condvar,
        not_full: Condvar,
    }

    impl SharedQueue {
        fn lock(&self) -> MutexGuard<'_, QueueState> {
            self.state.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }

    /// In-process namespace mirroring kernel queue semantics
    #[derive(Clone, Default)]
    pub struct InMemoryNamespace {
        queues: Arc<Mutex<HashMap<QueueName, Arc<SharedQueue>>>>,
    }

    impl InMemoryNamespace {
        pub fn new() -> Self {
            Self::default()
        }

        /// Whether the name is currently linked
        pub fn contains(&self, name: &QueueName) -> bool {
            self.registry().contains_key(name)
        }

        fn registry(&self) -> MutexGuard<'_, HashMap<QueueName, Arc<SharedQueue>>> {
            self.queues.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }

    impl QueueNamespace for InMemoryNamespace {
        type Queue = InMemoryQueue;

        fn create_with(
            &self,
            name: &QueueName,
            attributes: QueueAttributes,
            options: OpenOptions,
        ) -> Result<InMemoryQueue> {
            if attributes.max_message_size == 0 || attributes.max_queue_depth == 0 {
                return Err(QueueError::new(Operation::Create, codes::EINVAL));
            }

            let mut registry = self.registry();
            let shared = match registry.get(name) {
                Some(_) if options.mode == CreateMode::Exclusive => {
                    return Err(QueueError::new(Operation::Create, codes::EEXIST));
                }
                Some(existing) => existing.clone(),
                None => {
                    let created = Arc::new(SharedQueue {
                        attributes,
                        state: Mutex::new(QueueState::default()),
                        not_empty: Condvar::new(),
                        not_full: Condvar::new(),
                    });
                    registry.insert(name.clone(), created.clone());
                    created
                }
            };

            Ok(InMemoryQueue {
                name: name.clone(),
                shared,
                nonblocking: options.nonblocking,
            })
        }

        fn open_with(&self, name: &QueueName, options: OpenOptions) -> Result<InMemoryQueue> {
            let shared = self
                .registry()
                .get(name)
                .cloned()
                .ok_or_else(|| QueueError::new(Operation::Open, codes::ENOENT))?;

            Ok(InMemoryQueue {
                name: name.clone(),
                shared,
                nonblocking: options.nonblocking,
            })
        }

        fn unlink(&self, name: &QueueName) -> Result<()> {
            self.registry()
                .remove(name)
                .map(|_| ())
                .ok_or_else(|| QueueError::new(Operation::Unlink, codes::ENOENT))
        }
    }

    /// Handle into an [`InMemoryNamespace`] queue
    pub struct InMemoryQueue {
        name: QueueName,
        shared: Arc<SharedQueue>,
        nonblocking: bool,
    }

    impl MessageQueue for InMemoryQueue {
        fn name(&self) -> &QueueName {
            &self.name
        }

        fn attributes(&self) -> QueueAttributes {
            self.shared.attributes
        }

        fn send(&self, payload: &[u8], priority: Priority) -> Result<()> {
            let attributes = self.shared.attributes;
            if payload.len() > attributes.max_message_size {
                return Err(QueueError::new(Operation::Send, codes::EMSGSIZE));
            }

            let mut state = self.shared.lock();
            while state.heap.len() >= attributes.max_queue_depth {
                if self.nonblocking {
                    return Err(QueueError::new(Operation::Send, codes::EAGAIN));
                }
                state = self
                    .shared
                    .not_full
                    .wait(state)
                    .unwrap_or_else(PoisonError::into_inner);
            }

            let seq = state.next_seq;
            state.next_seq += 1;
            state.heap.push(Entry {
                priority,
                seq,
                payload: payload.to_vec(),
            });
            drop(state);

            self.shared.not_empty.notify_one();
            Ok(())
        }

        fn receive_into(&self, buffer: &mut [u8]) -> Result<(usize, Priority)> {
            if buffer.len() < self.shared.attributes.max_message_size {
                return Err(QueueError::new(Operation::Receive, codes::EMSGSIZE));
            }

            let mut state = self.shared.lock();
            let entry = loop {
                if let Some(entry) = state.heap.pop() {
                    break entry;
                }
                if self.nonblocking {
                    return Err(QueueError::new(Operation::Receive, codes::EAGAIN));
                }
                state = self
                    .shared
                    .not_empty
                    .wait(state)
                    .unwrap_or_else(PoisonError::into_inner);
            };
            drop(state);

            self.shared.not_full.notify_one();
            buffer[..entry.payload.len()].copy_from_slice(&entry.payload);
            Ok((entry.payload.len(), entry.priority))
        }

        fn pending(&self) -> Result<usize> {
            Ok(self.shared.lock().heap.len())
        }

        fn set_nonblocking(&mut self, nonblocking: bool) -> Result<()> {
            self.nonblocking = nonblocking;
            Ok(())
        }

        fn close(self) -> Result<()> {
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "message_queue_test.rs"]
mod message_queue_test;

// POSIX message queue handle
// reason: nix::mqueue for typed mq_* calls; MqdT has no Drop, so we own release
use std::os::fd::{AsFd, BorrowedFd};

use nix::errno::Errno;
use nix::mqueue::{
    mq_close, mq_getattr, mq_receive, mq_remove_nonblock, mq_send, mq_set_nonblock, MqAttr, MqdT,
};
use tracing::{debug, warn};

use posixmq_core::domain::{Priority, QueueAttributes, QueueName};
use posixmq_core::error::{codes, Operation, QueueError, Result};
use posixmq_core::port::MessageQueue;

/// Map an errno from `operation` into the single queue error type
pub(crate) fn os_error(operation: Operation) -> impl FnOnce(Errno) -> QueueError {
    move |errno| QueueError::new(operation, errno as i32)
}

/// Convert kernel attributes into the domain pair
pub(crate) fn to_attributes(attr: &MqAttr) -> QueueAttributes {
    QueueAttributes::new(
        usize::try_from(attr.msgsize()).unwrap_or(0),
        usize::try_from(attr.maxmsg()).unwrap_or(0),
    )
}

/// Owned handle to an opened kernel queue
///
/// Closed exactly once: either through [`MessageQueue::close`], which
/// reports the error, or on drop, which only logs it.
pub struct PosixQueue {
    name: QueueName,
    mqd: Option<MqdT>,
    attributes: QueueAttributes,
}

impl PosixQueue {
    pub(crate) fn new(name: QueueName, mqd: MqdT, attributes: QueueAttributes) -> Self {
        Self {
            name,
            mqd: Some(mqd),
            attributes,
        }
    }

    /// Descriptor for readiness polling (poll/epoll report readable when a
    /// message is queued)
    pub fn borrow_fd(&self) -> Option<BorrowedFd<'_>> {
        self.mqd.as_ref().map(|mqd| mqd.as_fd())
    }

    /// Current kernel attributes, including the live message count
    pub fn kernel_attributes(&self) -> Result<MqAttr> {
        mq_getattr(self.descriptor(Operation::GetAttributes)?)
            .map_err(os_error(Operation::GetAttributes))
    }

    fn descriptor(&self, operation: Operation) -> Result<&MqdT> {
        self.mqd
            .as_ref()
            .ok_or_else(|| QueueError::new(operation, codes::EBADF))
    }
}

impl MessageQueue for PosixQueue {
    fn name(&self) -> &QueueName {
        &self.name
    }

    fn attributes(&self) -> QueueAttributes {
        self.attributes
    }

    fn send(&self, payload: &[u8], priority: Priority) -> Result<()> {
        mq_send(self.descriptor(Operation::Send)?, payload, priority)
            .map_err(os_error(Operation::Send))?;

        debug!(queue = %self.name, len = payload.len(), priority, "Sent message");
        Ok(())
    }

    fn receive_into(&self, buffer: &mut [u8]) -> Result<(usize, Priority)> {
        let mut priority: u32 = 0;
        let len = mq_receive(self.descriptor(Operation::Receive)?, buffer, &mut priority)
            .map_err(os_error(Operation::Receive))?;

        debug!(queue = %self.name, len, priority, "Received message");
        Ok((len, priority))
    }

    fn pending(&self) -> Result<usize> {
        let attr = self.kernel_attributes()?;
        Ok(usize::try_from(attr.curmsgs()).unwrap_or(0))
    }

    fn set_nonblocking(&mut self, nonblocking: bool) -> Result<()> {
        let mqd = self.descriptor(Operation::SetAttributes)?;
        if nonblocking {
            mq_set_nonblock(mqd).map_err(os_error(Operation::SetAttributes))?;
        } else {
            mq_remove_nonblock(mqd).map_err(os_error(Operation::SetAttributes))?;
        }
        Ok(())
    }

    fn close(mut self) -> Result<()> {
        let mqd = self
            .mqd
            .take()
            .ok_or_else(|| QueueError::new(Operation::Close, codes::EBADF))?;

        mq_close(mqd).map_err(os_error(Operation::Close))?;
        debug!(queue = %self.name, "Closed queue");
        Ok(())
    }
}

impl Drop for PosixQueue {
    fn drop(&mut self) {
        if let Some(mqd) = self.mqd.take() {
            if let Err(e) = mq_close(mqd) {
                warn!(queue = %self.name, error = %e, "Failed to close queue on drop");
            }
        }
    }
}

impl std::fmt::Debug for PosixQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PosixQueue")
            .field("name", &self.name)
            .field("attributes", &self.attributes)
            .field("open", &self.mqd.is_some())
            .finish()
    }
}

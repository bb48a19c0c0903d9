// POSIX message queue namespace (mq_open / mq_unlink)
use nix::mqueue::{mq_attr_member_t, mq_close, mq_getattr, mq_open, mq_unlink, MQ_OFlag, MqAttr};
use nix::sys::stat::Mode;
use tracing::debug;

use posixmq_core::domain::{CreateMode, OpenOptions, QueueAttributes, QueueName};
use posixmq_core::error::{codes, Operation, QueueError, Result};
use posixmq_core::port::QueueNamespace;

use crate::posix_queue::{os_error, to_attributes, PosixQueue};

/// Kernel-backed queue namespace
///
/// Stateless; every call goes straight to the corresponding syscall.
#[derive(Debug, Clone, Copy, Default)]
pub struct PosixNamespace;

impl PosixNamespace {
    pub fn new() -> Self {
        Self
    }

    fn flags(options: &OpenOptions) -> MQ_OFlag {
        let mut flags = MQ_OFlag::O_RDWR;
        if options.nonblocking {
            flags |= MQ_OFlag::O_NONBLOCK;
        }
        flags
    }
}

fn attr_member(value: usize) -> Result<mq_attr_member_t> {
    mq_attr_member_t::try_from(value).map_err(|_| QueueError::new(Operation::Create, codes::EINVAL))
}

impl QueueNamespace for PosixNamespace {
    type Queue = PosixQueue;

    fn create_with(
        &self,
        name: &QueueName,
        attributes: QueueAttributes,
        options: OpenOptions,
    ) -> Result<PosixQueue> {
        let mut flags = Self::flags(&options) | MQ_OFlag::O_CREAT;
        if options.mode == CreateMode::Exclusive {
            flags |= MQ_OFlag::O_EXCL;
        }

        let requested = MqAttr::new(
            0,
            attr_member(attributes.max_queue_depth)?,
            attr_member(attributes.max_message_size)?,
            0,
        );
        let mode = Mode::from_bits_truncate(options.permissions);

        let mqd = mq_open(name.as_str(), flags, mode, Some(&requested))
            .map_err(os_error(Operation::Create))?;

        // An existing queue keeps its original attributes; report what the
        // kernel actually has
        let actual = match mq_getattr(&mqd) {
            Ok(attr) => to_attributes(&attr),
            Err(errno) => {
                let _ = mq_close(mqd);
                return Err(os_error(Operation::GetAttributes)(errno));
            }
        };

        debug!(
            queue = %name,
            max_message_size = actual.max_message_size,
            max_queue_depth = actual.max_queue_depth,
            "Created queue"
        );
        Ok(PosixQueue::new(name.clone(), mqd, actual))
    }

    fn open_with(&self, name: &QueueName, options: OpenOptions) -> Result<PosixQueue> {
        let mqd = mq_open(name.as_str(), Self::flags(&options), Mode::empty(), None)
            .map_err(os_error(Operation::Open))?;

        let attributes = match mq_getattr(&mqd) {
            Ok(attr) => to_attributes(&attr),
            Err(errno) => {
                let _ = mq_close(mqd);
                return Err(os_error(Operation::GetAttributes)(errno));
            }
        };

        debug!(queue = %name, "Opened queue");
        Ok(PosixQueue::new(name.clone(), mqd, attributes))
    }

    fn unlink(&self, name: &QueueName) -> Result<()> {
        mq_unlink(name.as_str()).map_err(os_error(Operation::Unlink))?;
        debug!(queue = %name, "Unlinked queue");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use posixmq_core::port::MessageQueue;

    fn unique_name(tag: &str) -> QueueName {
        QueueName::new(format!("/posixmq-{}-{}", tag, uuid::Uuid::new_v4().simple()))
    }

    #[test]
    fn test_create_open_attributes_match() {
        let ns = PosixNamespace::new();
        let name = unique_name("attrs");

        let created = ns.create(&name, QueueAttributes::new(256, 4)).unwrap();
        let opened = ns.open(&name).unwrap();

        assert_eq!(created.attributes(), QueueAttributes::new(256, 4));
        assert_eq!(opened.attributes(), created.attributes());

        ns.unlink(&name).unwrap();
    }

    #[test]
    fn test_exclusive_create_existing_fails() {
        let ns = PosixNamespace::new();
        let name = unique_name("excl");
        let _queue = ns.create(&name, QueueAttributes::new(64, 2)).unwrap();

        let err = ns
            .create_with(&name, QueueAttributes::new(64, 2), OpenOptions::new().exclusive())
            .unwrap_err();
        assert!(err.is_already_exists());
        assert_eq!(err.operation(), Operation::Create);

        ns.unlink(&name).unwrap();
    }

    #[test]
    fn test_open_missing_fails() {
        let ns = PosixNamespace::new();
        let err = ns.open(&unique_name("missing")).unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(err.operation(), Operation::Open);
    }

    #[test]
    fn test_unlink_missing_fails() {
        let err = PosixNamespace::new().unlink(&unique_name("nope")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_pending_and_nonblocking_receive() {
        let ns = PosixNamespace::new();
        let name = unique_name("nb");
        let mut queue = ns
            .create_with(
                &name,
                QueueAttributes::new(64, 2),
                OpenOptions::new().nonblocking(true),
            )
            .unwrap();

        assert!(queue.recv().unwrap_err().is_would_block());

        queue.send(b"one", 1).unwrap();
        assert_eq!(queue.pending().unwrap(), 1);
        assert!(queue.borrow_fd().is_some());

        queue.set_nonblocking(false).unwrap();
        assert_eq!(queue.recv().unwrap().payload, b"one");
        assert_eq!(queue.pending().unwrap(), 0);

        queue.close().unwrap();
        ns.unlink(&name).unwrap();
    }
}

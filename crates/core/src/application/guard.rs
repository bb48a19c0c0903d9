// Unlink Guard - scoped ownership of a queue name

use tracing::{debug, warn};

use crate::domain::QueueName;
use crate::error::Result;
use crate::port::QueueNamespace;

/// Unlinks a queue name when dropped
///
/// Handles opened on the queue are unaffected; only the name goes away.
pub struct UnlinkGuard<'a, N: QueueNamespace + ?Sized> {
    namespace: &'a N,
    name: Option<QueueName>,
}

impl<'a, N: QueueNamespace + ?Sized> UnlinkGuard<'a, N> {
    pub fn new(namespace: &'a N, name: QueueName) -> Self {
        Self {
            namespace,
            name: Some(name),
        }
    }

    pub fn name(&self) -> Option<&QueueName> {
        self.name.as_ref()
    }

    /// Unlink now and surface the error
    pub fn unlink(mut self) -> Result<()> {
        match self.name.take() {
            Some(name) => self.namespace.unlink(&name),
            None => Ok(()),
        }
    }

    /// Give up ownership without unlinking
    pub fn disarm(mut self) -> Option<QueueName> {
        self.name.take()
    }
}

impl<N: QueueNamespace + ?Sized> Drop for UnlinkGuard<'_, N> {
    fn drop(&mut self) {
        if let Some(name) = self.name.take() {
            match self.namespace.unlink(&name) {
                Ok(()) => debug!(queue = %name, "Unlinked queue"),
                Err(e) => warn!(queue = %name, error = %e, "Failed to unlink queue"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::QueueAttributes;
    use crate::port::mocks::InMemoryNamespace;

    #[test]
    fn test_drop_unlinks() {
        let ns = InMemoryNamespace::new();
        let name = QueueName::new("/guarded");
        ns.create(&name, QueueAttributes::default()).unwrap();

        {
            let _guard = UnlinkGuard::new(&ns, name.clone());
        }

        assert!(!ns.contains(&name));
    }

    #[test]
    fn test_panic_unwind_unlinks() {
        let ns = InMemoryNamespace::new();
        let name = QueueName::new("/unwound");
        ns.create(&name, QueueAttributes::default()).unwrap();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = UnlinkGuard::new(&ns, name.clone());
            panic!("listener failed");
        }));

        assert!(result.is_err());
        assert!(!ns.contains(&name));
    }

    #[test]
    fn test_explicit_unlink_surfaces_error() {
        let ns = InMemoryNamespace::new();
        let guard = UnlinkGuard::new(&ns, QueueName::new("/never-created"));

        assert!(guard.unlink().unwrap_err().is_not_found());
    }

    #[test]
    fn test_disarm_keeps_queue() {
        let ns = InMemoryNamespace::new();
        let name = QueueName::new("/kept");
        ns.create(&name, QueueAttributes::default()).unwrap();

        let guard = UnlinkGuard::new(&ns, name.clone());
        assert_eq!(guard.disarm(), Some(name.clone()));

        assert!(ns.contains(&name));
    }
}

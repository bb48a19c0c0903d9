//! SIGINT/SIGTERM handling for blocking commands
//!
//! The handlers are installed without `SA_RESTART`, so a blocked
//! `mq_receive` fails with `EINTR` instead of the process dying inside the
//! call. The command then unwinds normally and its `UnlinkGuard` runs.

use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use nix::libc::c_int;
use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

extern "C" fn on_interrupt(_signal: c_int) {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

/// Route SIGINT and SIGTERM to a flag-setting handler
pub fn install() -> Result<()> {
    let action = SigAction::new(
        SigHandler::Handler(on_interrupt),
        SaFlags::empty(),
        SigSet::empty(),
    );

    for signal in [Signal::SIGINT, Signal::SIGTERM] {
        // SAFETY: the handler only stores to an atomic, which is async-signal-safe
        unsafe { sigaction(signal, &action) }
            .with_context(|| format!("Installing {} handler failed", signal))?;
    }
    Ok(())
}

/// Whether SIGINT or SIGTERM arrived since `install`
pub fn interrupted() -> bool {
    INTERRUPTED.load(Ordering::SeqCst)
}

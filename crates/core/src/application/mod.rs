// Application Layer - Helpers composed from the queue ports

pub mod compile_commands;
pub mod guard;
pub mod listener;

// Re-exports
pub use compile_commands::{group_by_hash, CompileCommand, TraceRecord};
pub use guard::UnlinkGuard;
pub use listener::{listen_until, send_sentinel, DEFAULT_SENTINEL, SENTINEL_PRIORITY};

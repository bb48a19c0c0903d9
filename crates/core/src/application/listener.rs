// Sentinel Listener - drain a queue until a terminating message arrives

use tracing::debug;

use crate::domain::{Message, Priority};
use crate::error::Result;
use crate::port::MessageQueue;

/// Sentinel payload that ends a listen session
pub const DEFAULT_SENTINEL: &str = "DONE";

/// Priority the sentinel is sent with; lower than any data message so that
/// everything already queued drains first
pub const SENTINEL_PRIORITY: Priority = 0;

/// Receive until a message whose payload equals `sentinel`
///
/// The sentinel itself is not returned. Any receive error ends the session
/// and is returned as-is; messages collected so far are dropped.
pub fn listen_until<Q>(queue: &Q, sentinel: &[u8]) -> Result<Vec<Message>>
where
    Q: MessageQueue + ?Sized,
{
    let mut messages = Vec::new();

    loop {
        let msg = queue.recv()?;
        if msg.payload == sentinel {
            debug!(
                queue = %queue.name(),
                collected = messages.len(),
                "Sentinel received"
            );
            return Ok(messages);
        }
        messages.push(msg);
    }
}

/// Send the sentinel at [`SENTINEL_PRIORITY`]
pub fn send_sentinel<Q>(queue: &Q, sentinel: &[u8]) -> Result<()>
where
    Q: MessageQueue + ?Sized,
{
    queue.send(sentinel, SENTINEL_PRIORITY)
}

//! Notification port invoked when a message lands in the transcript.
//!
//! Injected as a capability so tests run silent and the TUI can ring the
//! terminal bell.

use std::io::Write;
use std::sync::Arc;

use crate::core::transcript::Sender;

/// Capability notified after a message is appended to the transcript.
pub trait NotificationPort: Send + Sync {
    fn message_appended(&self, sender: Sender);
}

pub type SharedNotifier = Arc<dyn NotificationPort>;

/// No-op implementation for tests and `--no-sound`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl NotificationPort for Silent {
    fn message_appended(&self, _sender: Sender) {}
}

/// Rings the terminal bell when a bot message arrives.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalBell;

impl NotificationPort for TerminalBell {
    fn message_appended(&self, sender: Sender) {
        if sender != Sender::Bot {
            return;
        }
        let mut stdout = std::io::stdout();
        let _ = stdout.write_all(b"\x07");
        let _ = stdout.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silent_port_ignores_all_senders() {
        let port: SharedNotifier = Arc::new(Silent);
        port.message_appended(Sender::User);
        port.message_appended(Sender::Bot);
    }
}

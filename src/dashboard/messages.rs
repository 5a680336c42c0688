//! Transient error and success messages
//!
//! At most one message is visible: posting an error clears the success
//! message and vice versa. Each message clears itself after a timeout unless
//! a newer message replaced it first.

use std::time::Duration;

use tracing::debug;

use super::state::ViewStore;

#[derive(Clone)]
pub(crate) struct Messages {
    store: ViewStore,
    timeout: Duration,
}

enum Flash {
    Error(String),
    Success(String),
}

impl Messages {
    pub(crate) fn new(store: ViewStore, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    pub(crate) fn error(&self, message: impl Into<String>) {
        self.post(Flash::Error(message.into()));
    }

    pub(crate) fn success(&self, message: impl Into<String>) {
        self.post(Flash::Success(message.into()));
    }

    fn post(&self, flash: Flash) {
        let posted = self.store.update(|s| {
            s.message_seq += 1;
            match flash {
                Flash::Error(msg) => {
                    s.error = Some(msg);
                    s.success_message = None;
                }
                Flash::Success(msg) => {
                    s.success_message = Some(msg);
                    s.error = None;
                }
            }
            s.message_seq
        });
        let Some(seq) = posted else {
            return;
        };

        let store = self.store.clone();
        let timeout = self.timeout;
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            let cleared = store.update(|s| {
                if s.message_seq == seq {
                    s.error = None;
                    s.success_message = None;
                    true
                } else {
                    false
                }
            });
            if cleared == Some(true) {
                debug!(seq, "message expired");
            }
        });
    }
}

use async_trait::async_trait;

use crate::events::{Listener, SessionEvent};

/// Emits session events as `tracing` events. Requires the `tracing` feature.
pub struct TracingListener;

#[async_trait]
impl Listener for TracingListener {
    async fn handle(&self, event: &SessionEvent) {
        match event {
            SessionEvent::LoginFailed { .. } | SessionEvent::SessionCleared { .. } => {
                tracing::warn!(target: "smartfarm::events", event_name = event.name(), ?event, "session event");
            }
            _ => {
                tracing::info!(target: "smartfarm::events", event_name = event.name(), ?event, "session event");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::events::ClearReason;

    #[tokio::test]
    async fn test_handle() {
        TracingListener
            .handle(&SessionEvent::SessionCleared {
                reason: ClearReason::CorruptProfile,
                at: Utc::now(),
            })
            .await;
    }
}

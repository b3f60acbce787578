use async_trait::async_trait;

use crate::events::{Listener, SessionEvent};

/// Writes every session event to the `log` facade.
pub struct LoggingListener {
    level: log::Level,
}

impl LoggingListener {
    /// Logs at INFO.
    pub fn new() -> Self {
        Self {
            level: log::Level::Info,
        }
    }

    pub fn with_level(level: log::Level) -> Self {
        Self { level }
    }
}

impl Default for LoggingListener {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Listener for LoggingListener {
    async fn handle(&self, event: &SessionEvent) {
        log::log!(
            target: "smartfarm::events",
            self.level,
            "event={} at={} {:?}",
            event.name(),
            event.timestamp().to_rfc3339(),
            event
        );
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn test_levels() {
        assert_eq!(LoggingListener::new().level, log::Level::Info);
        assert_eq!(LoggingListener::default().level, log::Level::Info);
        assert_eq!(LoggingListener::with_level(log::Level::Debug).level, log::Level::Debug);
    }

    #[tokio::test]
    async fn test_handle() {
        let listener = LoggingListener::with_level(log::Level::Warn);
        listener
            .handle(&SessionEvent::LoginFailed {
                email: "a@b.com".to_owned(),
                reason: "invalid credentials".to_owned(),
                at: Utc::now(),
            })
            .await;
    }
}

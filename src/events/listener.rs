use async_trait::async_trait;

use super::SessionEvent;

/// Receives session events.
///
/// ```rust,ignore
/// use async_trait::async_trait;
/// use smartfarm_client::events::{Listener, SessionEvent};
///
/// struct AuditTrail;
///
/// #[async_trait]
/// impl Listener for AuditTrail {
///     async fn handle(&self, event: &SessionEvent) {
///         if let SessionEvent::LoginFailed { email, .. } = event {
///             // remember repeated failures for this operator
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait Listener: Send + Sync + 'static {
    async fn handle(&self, event: &SessionEvent);
}

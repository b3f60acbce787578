//! Session lifecycle events.
//!
//! The session manager reports every transition as a [`SessionEvent`].
//! Nothing is listening unless the application registers listeners at
//! startup, in which case they run in registration order.
//!
//! ```rust,ignore
//! use smartfarm_client::register_event_listeners;
//! use smartfarm_client::events::listeners::LoggingListener;
//!
//! register_event_listeners(|registry| {
//!     registry.listen(LoggingListener::new());
//! });
//! ```
//!
//! Events are for observability. Code that needs to react to a login or
//! logout should use [`SessionManager::subscribe`](crate::SessionManager::subscribe).

mod event;
mod listener;
mod registry;

pub mod listeners;

pub use event::{ClearReason, SessionEvent};
pub use listener::Listener;
pub use registry::{dispatch, register_event_listeners, EventRegistry};

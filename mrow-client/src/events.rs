//! Event demultiplexing to typed handlers
//!
//! Server-pushed events carry a dot-namespaced method name. The
//! dispatcher maps that name onto a closed set of known kinds, decodes
//! the payload into the kind's domain type, and invokes the registered
//! handler. Unrecognized names map to [`EventKind::Unknown`] and are
//! ignored rather than treated as errors, keeping the client
//! forward-compatible with servers that push new event types.
//!
//! Dispatch is synchronous and must not block: a handler that needs to
//! do slow work hands off to its own task.

use mrow_core::{Error, Result, RpcEvent};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Semantic classification of server event method names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// "contact.updated"
    ContactUpdated,
    /// "contact.deleted"
    ContactDeleted,
    /// Any method name not in the table; never an error
    Unknown,
}

impl EventKind {
    /// Look up the kind for a protocol method name, exact match only
    pub fn from_method(method: &str) -> Self {
        match method {
            "contact.updated" => EventKind::ContactUpdated,
            "contact.deleted" => EventKind::ContactDeleted,
            _ => EventKind::Unknown,
        }
    }
}

/// Contact entity as delivered in event payloads
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Contact {
    /// Server-assigned contact identifier
    pub id: String,
    /// Display name
    pub name: String,
}

/// Typed handler invoked with decoded contact events
///
/// Implementations run on the connection's frame-processing path and
/// must return promptly.
pub trait ContactEventHandler: Send + Sync {
    /// A contact was created or modified
    fn on_contact_updated(&self, contact: Contact);
    /// A contact was removed
    fn on_contact_deleted(&self, contact: Contact);
}

/// Routes classified events to the registered typed handler
#[derive(Clone, Default)]
pub struct EventDispatcher {
    handler: Option<Arc<dyn ContactEventHandler>>,
}

impl EventDispatcher {
    /// Create a dispatcher with no handler; known events decode but go
    /// nowhere until a handler is attached
    pub fn new() -> Self {
        Self { handler: None }
    }

    /// Create a dispatcher forwarding to the given handler
    pub fn with_handler(handler: Arc<dyn ContactEventHandler>) -> Self {
        Self {
            handler: Some(handler),
        }
    }

    /// Decode and route one event
    ///
    /// Unknown method names are ignored. A known event without params is
    /// dropped, since the protocol requires params on all known events.
    /// A known event whose params fail to decode surfaces
    /// `MalformedEventPayload`: that is a protocol or version mismatch
    /// worth logging, not a frame to swallow silently.
    pub fn dispatch(&self, event: RpcEvent) -> Result<()> {
        let kind = EventKind::from_method(&event.method);
        if kind == EventKind::Unknown {
            tracing::debug!(method = %event.method, "ignoring unknown event");
            return Ok(());
        }

        let Some(params) = event.params else {
            tracing::debug!(method = %event.method, "dropping known event without params");
            return Ok(());
        };

        let contact: Contact =
            serde_json::from_value(params).map_err(|e| Error::MalformedEventPayload {
                method: event.method.clone(),
                reason: e.to_string(),
            })?;

        if let Some(handler) = &self.handler {
            match kind {
                EventKind::ContactUpdated => handler.on_contact_updated(contact),
                EventKind::ContactDeleted => handler.on_contact_deleted(contact),
                EventKind::Unknown => unreachable!("unknown events return early"),
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recording {
        updated: Mutex<Vec<Contact>>,
        deleted: Mutex<Vec<Contact>>,
    }

    impl ContactEventHandler for Recording {
        fn on_contact_updated(&self, contact: Contact) {
            self.updated.lock().unwrap().push(contact);
        }

        fn on_contact_deleted(&self, contact: Contact) {
            self.deleted.lock().unwrap().push(contact);
        }
    }

    fn event(method: &str, params: Option<serde_json::Value>) -> RpcEvent {
        RpcEvent {
            method: method.to_string(),
            params,
        }
    }

    #[test]
    fn test_kind_lookup() {
        assert_eq!(
            EventKind::from_method("contact.updated"),
            EventKind::ContactUpdated
        );
        assert_eq!(
            EventKind::from_method("contact.deleted"),
            EventKind::ContactDeleted
        );
        assert_eq!(
            EventKind::from_method("contact.unknown.x"),
            EventKind::Unknown
        );
        assert_eq!(EventKind::from_method(""), EventKind::Unknown);
    }

    #[test]
    fn test_dispatch_updated() {
        let recording = Arc::new(Recording::default());
        let dispatcher = EventDispatcher::with_handler(recording.clone());

        dispatcher
            .dispatch(event(
                "contact.updated",
                Some(json!({"id": "7", "name": "Ada"})),
            ))
            .unwrap();

        let updated = recording.updated.lock().unwrap();
        assert_eq!(
            *updated,
            vec![Contact {
                id: "7".into(),
                name: "Ada".into()
            }]
        );
        assert!(recording.deleted.lock().unwrap().is_empty());
    }

    #[test]
    fn test_dispatch_deleted() {
        let recording = Arc::new(Recording::default());
        let dispatcher = EventDispatcher::with_handler(recording.clone());

        dispatcher
            .dispatch(event(
                "contact.deleted",
                Some(json!({"id": "9", "name": "Grace"})),
            ))
            .unwrap();

        assert_eq!(recording.deleted.lock().unwrap().len(), 1);
        assert!(recording.updated.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unknown_event_ignored() {
        let recording = Arc::new(Recording::default());
        let dispatcher = EventDispatcher::with_handler(recording.clone());

        dispatcher
            .dispatch(event("contact.unknown.x", Some(json!({"id": "1"}))))
            .unwrap();

        assert!(recording.updated.lock().unwrap().is_empty());
        assert!(recording.deleted.lock().unwrap().is_empty());
    }

    #[test]
    fn test_known_event_without_params_dropped() {
        let recording = Arc::new(Recording::default());
        let dispatcher = EventDispatcher::with_handler(recording.clone());

        dispatcher.dispatch(event("contact.updated", None)).unwrap();
        assert!(recording.updated.lock().unwrap().is_empty());
    }

    #[test]
    fn test_malformed_params_surface() {
        let recording = Arc::new(Recording::default());
        let dispatcher = EventDispatcher::with_handler(recording.clone());

        let result = dispatcher.dispatch(event("contact.updated", Some(json!({"id": 5}))));
        match result {
            Err(Error::MalformedEventPayload { method, .. }) => {
                assert_eq!(method, "contact.updated");
            }
            other => panic!("expected MalformedEventPayload, got {:?}", other),
        }
        assert!(recording.updated.lock().unwrap().is_empty());
    }

    #[test]
    fn test_contact_decode_ignores_extra_fields() {
        let dispatcher = EventDispatcher::new();
        // extra server-side fields must not break decoding
        dispatcher
            .dispatch(event(
                "contact.updated",
                Some(json!({"id": "1", "name": "Ada", "revision": 3})),
            ))
            .unwrap();
    }
}

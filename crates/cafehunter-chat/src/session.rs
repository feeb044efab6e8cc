//! Per-user dialogue sessions.
//!
//! Sessions are created on first contact and live for the lifetime of the
//! process. Each session sits behind its own async mutex so one user's
//! messages are handled one at a time while other users proceed freely.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::ChatError;
use crate::state_machine::{transition, DialogueEvent, DialogueState};

/// Conversation progress for one user.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub user_id: String,
    state: DialogueState,
    /// Last free text the user sent.
    pub last_text: Option<String>,
    pub last_message_at: DateTime<Utc>,
}

impl Session {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            state: DialogueState::Standby,
            last_text: None,
            last_message_at: Utc::now(),
        }
    }

    pub fn state(&self) -> DialogueState {
        self.state
    }

    pub fn can_fire(&self, event: DialogueEvent) -> bool {
        crate::state_machine::can_fire(self.state, event)
    }

    /// Fire `event`. A rejected event leaves the state untouched and is
    /// logged; it is never an error for the caller.
    pub fn fire(&mut self, event: DialogueEvent) -> bool {
        match transition(self.state, event) {
            Ok(next) => {
                debug!(user_id = %self.user_id, from = %self.state, to = %next, event = %event, "Session transition");
                self.state = next;
                true
            }
            Err(ChatError::InvalidTransition { state, event }) => {
                warn!(user_id = %self.user_id, state = %state, event = %event, "Ignored event not allowed in current state");
                false
            }
            Err(e) => {
                warn!(user_id = %self.user_id, error = %e, "Transition failed");
                false
            }
        }
    }

    /// Bring the session back to STANDBY through whichever event the current
    /// state allows.
    pub fn reset_to_standby(&mut self) {
        let event = match self.state {
            DialogueState::Standby => return,
            DialogueState::IntentConfirmed | DialogueState::UnsureLocation => DialogueEvent::Cancel,
            DialogueState::LocationConfirmed => DialogueEvent::RespondResult,
        };
        self.fire(event);
    }

    /// Record an inbound message, remembering `text` when there is one.
    pub fn touch(&mut self, text: Option<&str>) {
        self.last_message_at = Utc::now();
        if let Some(text) = text {
            self.last_text = Some(text.to_string());
        }
    }
}

/// In-memory map from user id to session.
#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, Arc<tokio::sync::Mutex<Session>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The session for `user_id`, created in STANDBY if absent.
    ///
    /// Lookup and insertion happen under one lock, so two first messages
    /// from the same user always share a session.
    pub fn get_or_create(&self, user_id: &str) -> Arc<tokio::sync::Mutex<Session>> {
        let mut sessions = match self.sessions.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        sessions
            .entry(user_id.to_string())
            .or_insert_with(|| {
                debug!(user_id = %user_id, "Created session");
                Arc::new(tokio::sync::Mutex::new(Session::new(user_id)))
            })
            .clone()
    }

    pub fn len(&self) -> usize {
        match self.sessions.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current state of `user_id`'s session, if it exists and is not busy.
    pub fn state_of(&self, user_id: &str) -> Option<DialogueState> {
        let session = {
            let sessions = match self.sessions.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            sessions.get(user_id)?.clone()
        };
        let guard = session.try_lock().ok()?;
        Some(guard.state())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_standby() {
        let session = Session::new("u1");
        assert_eq!(session.state(), DialogueState::Standby);
        assert!(session.last_text.is_none());
    }

    #[test]
    fn test_fire_applies_allowed_event() {
        let mut session = Session::new("u1");
        assert!(session.fire(DialogueEvent::ReceiveIntent));
        assert_eq!(session.state(), DialogueState::IntentConfirmed);
    }

    #[test]
    fn test_rejected_event_is_noop() {
        let mut session = Session::new("u1");
        assert!(!session.fire(DialogueEvent::Cancel));
        assert_eq!(session.state(), DialogueState::Standby);

        session.fire(DialogueEvent::ReceiveIntent);
        assert!(!session.fire(DialogueEvent::Greeting));
        assert_eq!(session.state(), DialogueState::IntentConfirmed);
    }

    #[test]
    fn test_reset_to_standby_from_every_state() {
        let paths: [&[DialogueEvent]; 4] = [
            &[],
            &[DialogueEvent::ReceiveIntent],
            &[DialogueEvent::GetConfusedLocation],
            &[DialogueEvent::ReceiveGeocoding],
        ];
        for path in paths {
            let mut session = Session::new("u1");
            for event in path {
                assert!(session.fire(*event));
            }
            session.reset_to_standby();
            assert_eq!(session.state(), DialogueState::Standby);
        }
    }

    #[test]
    fn test_touch_tracks_last_text() {
        let mut session = Session::new("u1");
        session.touch(Some("coffee near ximen"));
        session.touch(None);
        assert_eq!(session.last_text.as_deref(), Some("coffee near ximen"));
    }

    #[test]
    fn test_get_or_create_returns_same_session() {
        let store = SessionStore::new();
        let a = store.get_or_create("u1");
        let b = store.get_or_create("u1");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(store.len(), 1);

        store.get_or_create("u2");
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_first_contact_creates_one_session() {
        let store = Arc::new(SessionStore::new());
        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let session = store.get_or_create("same-user");
                session.lock().await.touch(Some("hi"));
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_state_of() {
        let store = SessionStore::new();
        assert!(store.state_of("nobody").is_none());

        let session = store.get_or_create("u1");
        session.lock().await.fire(DialogueEvent::ReceiveIntent);
        assert_eq!(store.state_of("u1"), Some(DialogueState::IntentConfirmed));
    }
}

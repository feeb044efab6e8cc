//! Dialogue state machine with validated transitions.
//!
//! Allowed transitions:
//! - Standby --greeting--> Standby
//! - Standby --receive_intent--> IntentConfirmed
//! - Standby, IntentConfirmed --get_confused_location--> UnsureLocation
//! - Standby, UnsureLocation --receive_geocoding/receive_address--> LocationConfirmed
//! - IntentConfirmed, UnsureLocation, LocationConfirmed --respond_result--> Standby
//! - IntentConfirmed, UnsureLocation --cancel--> Standby

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ChatError;

/// Where a user's conversation currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DialogueState {
    Standby,
    IntentConfirmed,
    UnsureLocation,
    /// Entered when a location is confirmed and left as soon as results are
    /// delivered.
    LocationConfirmed,
}

impl fmt::Display for DialogueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DialogueState::Standby => "STANDBY",
            DialogueState::IntentConfirmed => "INTENT_CONFIRMED",
            DialogueState::UnsureLocation => "UNSURE_LOCATION",
            DialogueState::LocationConfirmed => "LOCATION_CONFIRMED",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogueEvent {
    Greeting,
    ReceiveIntent,
    GetConfusedLocation,
    ReceiveGeocoding,
    ReceiveAddress,
    RespondResult,
    Cancel,
}

impl fmt::Display for DialogueEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DialogueEvent::Greeting => "greeting",
            DialogueEvent::ReceiveIntent => "receive_intent",
            DialogueEvent::GetConfusedLocation => "get_confused_location",
            DialogueEvent::ReceiveGeocoding => "receive_geocoding",
            DialogueEvent::ReceiveAddress => "receive_address",
            DialogueEvent::RespondResult => "respond_result",
            DialogueEvent::Cancel => "cancel",
        };
        f.write_str(name)
    }
}

/// Compute the state reached by firing `event` in `state`.
///
/// Returns [`ChatError::InvalidTransition`] for every pair outside the table
/// above; callers treat that as a logged no-op.
pub fn transition(
    state: DialogueState,
    event: DialogueEvent,
) -> Result<DialogueState, ChatError> {
    use DialogueEvent as E;
    use DialogueState as S;

    let next = match (state, event) {
        (S::Standby, E::Greeting) => Some(S::Standby),
        (S::Standby, E::ReceiveIntent) => Some(S::IntentConfirmed),
        (S::Standby | S::IntentConfirmed, E::GetConfusedLocation) => Some(S::UnsureLocation),
        (S::Standby | S::UnsureLocation, E::ReceiveGeocoding | E::ReceiveAddress) => {
            Some(S::LocationConfirmed)
        }
        (S::IntentConfirmed | S::UnsureLocation | S::LocationConfirmed, E::RespondResult) => {
            Some(S::Standby)
        }
        (S::IntentConfirmed | S::UnsureLocation, E::Cancel) => Some(S::Standby),
        (
            S::Standby,
            E::RespondResult | E::Cancel,
        )
        | (
            S::IntentConfirmed,
            E::Greeting | E::ReceiveIntent | E::ReceiveGeocoding | E::ReceiveAddress,
        )
        | (
            S::UnsureLocation,
            E::Greeting | E::ReceiveIntent | E::GetConfusedLocation,
        )
        | (
            S::LocationConfirmed,
            E::Greeting
            | E::ReceiveIntent
            | E::GetConfusedLocation
            | E::ReceiveGeocoding
            | E::ReceiveAddress
            | E::Cancel,
        ) => None,
    };

    next.ok_or(ChatError::InvalidTransition { state, event })
}

/// Whether `event` may be fired in `state`.
pub fn can_fire(state: DialogueState, event: DialogueEvent) -> bool {
    transition(state, event).is_ok()
}

//! Dialogue engine: routes each inbound message through the user's session.
//!
//! One call to [`DialogueEngine::handle`] handles one message to completion
//! while holding that user's session lock. Failures never escape `handle`;
//! they become canned replies and the session is brought back to STANDBY.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::{debug, error, info, warn};

use cafehunter_core::config::{CafeHunterConfig, MAX_GEOCODER_CANDIDATES};
use cafehunter_core::types::{Coordinate, Place};
use cafehunter_nlu::IntentClassifier;
use cafehunter_places::{qualify_phrase, PlaceResolver};
use cafehunter_spatial::{NeighborhoodSearch, SpatialStore};

use crate::error::{ChatError, PayloadError};
use crate::messages;
use crate::outbound::{Choice, Outbound};
use crate::payload::Command;
use crate::response::ResponseComposer;
use crate::session::{Session, SessionStore};
use crate::state_machine::{DialogueEvent, DialogueState};
use crate::types::{InboundEvent, InboundMessage};

/// Most location phrases offered when one utterance mentions several.
const MAX_PHRASE_CHOICES: usize = 8;

static GREETING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(hi|hello|get started|你好|您好)\s*[!.~！。]*\s*$")
        .expect("Invalid greeting regex")
});

/// Whether `text` is one of the recognized greetings.
pub fn is_greeting(text: &str) -> bool {
    GREETING.is_match(text)
}

pub struct DialogueEngine {
    classifier: Arc<dyn IntentClassifier>,
    resolver: Arc<dyn PlaceResolver>,
    search: NeighborhoodSearch,
    composer: ResponseComposer,
    sessions: SessionStore,
    cafe_intent: String,
    location_entity_type: String,
    default_city: String,
    max_candidates: usize,
}

impl DialogueEngine {
    pub fn new(
        config: &CafeHunterConfig,
        classifier: Arc<dyn IntentClassifier>,
        resolver: Arc<dyn PlaceResolver>,
        store: Arc<dyn SpatialStore>,
    ) -> Self {
        Self {
            classifier,
            resolver,
            search: NeighborhoodSearch::new(store, config.spatial.lookup_precision),
            composer: ResponseComposer::new(&config.response),
            sessions: SessionStore::new(),
            cafe_intent: config.classifier.cafe_intent.clone(),
            location_entity_type: config.classifier.location_entity_type.clone(),
            default_city: config.geocoder.default_city.clone(),
            max_candidates: config
                .geocoder
                .max_candidates
                .clamp(1, MAX_GEOCODER_CANDIDATES),
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Handle one message and return the replies to send, in order.
    pub async fn handle(&self, message: &InboundMessage) -> Vec<Outbound> {
        let session = self.sessions.get_or_create(&message.sender_id);
        let mut session = session.lock().await;

        let text = match &message.event {
            InboundEvent::Text(text) => Some(text.as_str()),
            _ => None,
        };
        session.touch(text);
        debug!(
            user_id = %session.user_id,
            state = %session.state(),
            event = ?message.event,
            "Handling inbound message"
        );

        match self.dispatch(&mut session, &message.event).await {
            Ok(replies) => replies,
            Err(e) => recover(&mut session, e),
        }
    }

    async fn dispatch(
        &self,
        session: &mut Session,
        event: &InboundEvent,
    ) -> Result<Vec<Outbound>, ChatError> {
        match event {
            InboundEvent::Text(text) => self.on_text(session, text).await,
            InboundEvent::Command(payload) => {
                let command: Command = payload.parse()?;
                self.on_command(session, command).await
            }
            InboundEvent::Pin(point) => self.on_pin(session, *point),
        }
    }

    async fn on_text(
        &self,
        session: &mut Session,
        text: &str,
    ) -> Result<Vec<Outbound>, ChatError> {
        match session.state() {
            DialogueState::IntentConfirmed | DialogueState::UnsureLocation => {
                self.resolve_phrase(session, text).await
            }
            DialogueState::Standby | DialogueState::LocationConfirmed => {
                self.on_standby_text(session, text).await
            }
        }
    }

    async fn on_standby_text(
        &self,
        session: &mut Session,
        text: &str,
    ) -> Result<Vec<Outbound>, ChatError> {
        if is_greeting(text) {
            session.fire(DialogueEvent::Greeting);
            return Ok(vec![Outbound::text(messages::WELCOME)?]);
        }

        let result = self.classifier.classify(text).await?;
        let phrases = result.locations(&self.location_entity_type);
        let wants_cafe = result.is_intent(&self.cafe_intent);
        debug!(
            user_id = %session.user_id,
            intent = %result.intent,
            wants_cafe,
            phrases = phrases.len(),
            "Classified utterance"
        );

        if !wants_cafe && phrases.is_empty() {
            return Ok(vec![Outbound::text(messages::DO_NOT_UNDERSTAND)?]);
        }

        session.fire(DialogueEvent::ReceiveIntent);
        self.resolve_phrases(session, &phrases).await
    }

    /// Phrase-level policy: none asks for a location, one is resolved, several
    /// are offered as choices that each re-enter single-phrase resolution.
    async fn resolve_phrases(
        &self,
        session: &mut Session,
        phrases: &[String],
    ) -> Result<Vec<Outbound>, ChatError> {
        match phrases {
            [] => Ok(vec![ask_location()?]),
            [phrase] => self.resolve_phrase(session, phrase).await,
            _ => {
                let mut choices: Vec<Choice> = phrases
                    .iter()
                    .take(MAX_PHRASE_CHOICES)
                    .map(|p| Choice::reply(p, &Command::FindCafeNear(p.clone())))
                    .collect();
                choices.push(Choice::reply(messages::CHOICE_CANCEL, &Command::Cancel));
                Ok(vec![Outbound::ask(messages::WHICH_PHRASE, choices)?])
            }
        }
    }

    /// Candidate-level policy for a single phrase.
    async fn resolve_phrase(
        &self,
        session: &mut Session,
        phrase: &str,
    ) -> Result<Vec<Outbound>, ChatError> {
        let query = qualify_phrase(phrase, &self.default_city);
        let mut places = self.resolver.resolve(&query).await?;
        places.truncate(self.max_candidates);
        info!(
            user_id = %session.user_id,
            query = %query,
            candidates = places.len(),
            "Resolved place phrase"
        );

        match places.as_slice() {
            [] => {
                finish(session);
                Ok(vec![Outbound::text(messages::PLACE_NOT_RECOGNIZED)?])
            }
            [place] => {
                if session.can_fire(DialogueEvent::ReceiveAddress) {
                    session.fire(DialogueEvent::ReceiveAddress);
                }
                self.search_and_reply(session, place.location)
            }
            candidates => {
                if session.state() != DialogueState::UnsureLocation {
                    session.fire(DialogueEvent::GetConfusedLocation);
                }
                Ok(vec![ask_candidates(candidates)?])
            }
        }
    }

    fn on_pin(
        &self,
        session: &mut Session,
        point: Coordinate,
    ) -> Result<Vec<Outbound>, ChatError> {
        if session.state() == DialogueState::IntentConfirmed {
            return self.search_and_reply(session, point);
        }

        let choices = vec![
            Choice::reply(messages::CHOICE_YES, &Command::FindCafeAt(point)),
            Choice::reply(messages::CHOICE_NO, &Command::Kidding),
        ];
        Ok(vec![Outbound::ask(messages::CONFIRM_PIN, choices)?])
    }

    async fn on_command(
        &self,
        session: &mut Session,
        command: Command,
    ) -> Result<Vec<Outbound>, ChatError> {
        debug!(user_id = %session.user_id, action = command.action(), "Dispatching command");
        match command {
            Command::FindCafeAt(point) => {
                if session.can_fire(DialogueEvent::ReceiveGeocoding) {
                    session.fire(DialogueEvent::ReceiveGeocoding);
                }
                self.search_and_reply(session, point)
            }
            Command::FindCafeNear(phrase) => self.resolve_phrase(session, &phrase).await,
            Command::FindCafe => {
                session.fire(DialogueEvent::ReceiveIntent);
                Ok(vec![ask_location()?])
            }
            Command::Cancel => {
                session.fire(DialogueEvent::Cancel);
                Ok(vec![Outbound::text(messages::CANCELLED)?])
            }
            Command::Kidding => {
                session.fire(DialogueEvent::Cancel);
                Ok(vec![Outbound::text(messages::JOKE)?])
            }
            Command::GetStarted => {
                session.fire(DialogueEvent::Greeting);
                Ok(vec![Outbound::text(messages::WELCOME)?])
            }
        }
    }

    fn search_and_reply(
        &self,
        session: &mut Session,
        point: Coordinate,
    ) -> Result<Vec<Outbound>, ChatError> {
        let cafes = self.search.find_nearby(point)?;
        info!(
            user_id = %session.user_id,
            point = %point,
            found = cafes.len(),
            "Neighbourhood search answered"
        );
        let replies = self.composer.compose(&cafes)?;
        finish(session);
        Ok(replies)
    }
}

/// Results (or a failure message) were delivered.
fn finish(session: &mut Session) {
    if session.state() != DialogueState::Standby {
        session.fire(DialogueEvent::RespondResult);
    }
}

fn recover(session: &mut Session, err: ChatError) -> Vec<Outbound> {
    let text = match &err {
        ChatError::Payload(PayloadError::UnknownAction(action)) => {
            warn!(user_id = %session.user_id, action = %action, "Unknown command, cancelling");
            if session.can_fire(DialogueEvent::Cancel) {
                session.fire(DialogueEvent::Cancel);
            }
            messages::QUERY_ERROR
        }
        ChatError::Payload(e) => {
            warn!(user_id = %session.user_id, error = %e, "Malformed command");
            messages::QUERY_ERROR
        }
        e => {
            error!(user_id = %session.user_id, state = %session.state(), error = %e, "Message handling failed");
            session.reset_to_standby();
            messages::APOLOGY
        }
    };
    vec![Outbound::Text {
        text: text.to_string(),
    }]
}

fn ask_location() -> Result<Outbound, ChatError> {
    Outbound::ask(messages::ASK_LOCATION, vec![Choice::RequestLocation])
}

/// One choice per candidate plus "none of these" and "send a pin".
fn ask_candidates(places: &[Place]) -> Result<Outbound, ChatError> {
    let mut choices: Vec<Choice> = places
        .iter()
        .map(|p| Choice::reply(&p.label, &Command::FindCafeAt(p.location)))
        .collect();
    choices.push(Choice::reply(
        messages::CHOICE_NONE_OF_THESE,
        &Command::Cancel,
    ));
    choices.push(Choice::RequestLocation);
    Outbound::ask(messages::WHICH_PLACE, choices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greetings_recognized() {
        for text in ["hi", "Hello", "HELLO!", " get started ", "你好", "您好！", "hi~"] {
            assert!(is_greeting(text), "{:?} should be a greeting", text);
        }
    }

    #[test]
    fn test_non_greetings() {
        for text in ["hi there, cafe near ximen", "high", "coffee", "", "hello world"] {
            assert!(!is_greeting(text), "{:?} should not be a greeting", text);
        }
    }

    #[test]
    fn test_recover_from_adapter_failure_resets_session() {
        let mut session = Session::new("u1");
        session.fire(DialogueEvent::ReceiveIntent);
        let err: ChatError =
            cafehunter_places::ResolverError::Unavailable("timeout".to_string()).into();

        let replies = recover(&mut session, err);
        assert_eq!(
            replies,
            vec![Outbound::Text {
                text: messages::APOLOGY.to_string()
            }]
        );
        assert_eq!(session.state(), DialogueState::Standby);
    }

    #[test]
    fn test_recover_from_malformed_command_keeps_state() {
        let mut session = Session::new("u1");
        session.fire(DialogueEvent::GetConfusedLocation);
        let err: ChatError = PayloadError::MalformedArgument {
            action: "FIND_CAFE_GEOCODING".to_string(),
            reason: "expected lat,long".to_string(),
        }
        .into();

        let replies = recover(&mut session, err);
        assert_eq!(
            replies,
            vec![Outbound::Text {
                text: messages::QUERY_ERROR.to_string()
            }]
        );
        assert_eq!(session.state(), DialogueState::UnsureLocation);
    }

    #[test]
    fn test_candidate_question_shape() {
        let places: Vec<Place> = (0..3)
            .map(|n| Place {
                label: format!("Candidate {}", n),
                address: String::new(),
                location: Coordinate::new(25.0 + n as f64, 121.5),
                source_id: String::new(),
            })
            .collect();
        match ask_candidates(&places).unwrap() {
            Outbound::Ask(question) => {
                assert_eq!(question.choices.len(), 5);
                assert_eq!(
                    question.choices[1],
                    Choice::Reply {
                        title: "Candidate 1".to_string(),
                        payload: "FIND_CAFE_GEOCODING:26,121.5".to_string()
                    }
                );
                assert_eq!(question.choices[4], Choice::RequestLocation);
            }
            other => panic!("expected question, got {:?}", other),
        }
    }
}

use std::sync::Arc;
use tracing::{debug, error, info};

use crate::dialogue::intent::{FollowUpIntent, TurnIntent, detect_follow_up_intent, detect_turn_intent};
use crate::dialogue::response::{self, FollowUpResult, TurnResult, TurnStatus};
use crate::extract::SymptomExtractor;
use crate::knowledge::{KnowledgeSnapshot, KnowledgeSource, disease_explanation, treatment_advice};
use crate::matcher::{MatchOutcome, PARTIAL_MATCH_THRESHOLD, RuleMatcher};
use crate::session::{ConversationSession, Message, SessionStore};
use crate::utils::{DiagnosisError, Result};

/// Minimum number of accumulated symptoms before rules are evaluated
pub const MIN_SYMPTOMS_FOR_DIAGNOSIS: usize = 3;

/// Minimum message length in characters, after trimming
pub const MIN_MESSAGE_LEN: usize = 3;

/// Tunables for the dialogue flow
#[derive(Debug, Clone, Copy)]
pub struct DialogueSettings {
    pub min_symptoms: usize,
    pub min_message_len: usize,
    pub partial_threshold: f64,
}

impl Default for DialogueSettings {
    fn default() -> Self {
        Self {
            min_symptoms: MIN_SYMPTOMS_FOR_DIAGNOSIS,
            min_message_len: MIN_MESSAGE_LEN,
            partial_threshold: PARTIAL_MATCH_THRESHOLD,
        }
    }
}

/// Drives one conversation turn: intent checks, symptom extraction,
/// accumulation and rule matching.
///
/// Each turn holds the session lock from start to finish and works on a copy
/// of the session that is written back only when the turn succeeds, so a
/// failed knowledge read leaves the session untouched.
pub struct DialogueController {
    store: Arc<SessionStore>,
    knowledge: Arc<dyn KnowledgeSource>,
    matcher: RuleMatcher,
    settings: DialogueSettings,
}

impl DialogueController {
    pub fn new(store: Arc<SessionStore>, knowledge: Arc<dyn KnowledgeSource>) -> Self {
        Self::with_settings(store, knowledge, DialogueSettings::default())
    }

    pub fn with_settings(
        store: Arc<SessionStore>,
        knowledge: Arc<dyn KnowledgeSource>,
        settings: DialogueSettings,
    ) -> Self {
        Self {
            store,
            knowledge,
            matcher: RuleMatcher::new(settings.partial_threshold),
            settings,
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    fn validate_message<'a>(&self, message: &'a str) -> Result<&'a str> {
        let trimmed = message.trim();
        if trimmed.chars().count() < self.settings.min_message_len {
            return Err(DiagnosisError::invalid_input(format!(
                "Message must be at least {} characters long",
                self.settings.min_message_len
            )));
        }
        Ok(trimmed)
    }

    async fn load_knowledge(&self, session_id: &str) -> Result<KnowledgeSnapshot> {
        KnowledgeSnapshot::load(self.knowledge.as_ref())
            .await
            .inspect_err(|e| {
                error!(
                    session_id = %session_id,
                    source = self.knowledge.source_name(),
                    error = %e,
                    "Failed to read knowledge"
                );
            })
    }

    /// Handles one message of the main conversation.
    ///
    /// `session_id` may be absent or unknown; a session is created either way.
    pub async fn handle_turn(&self, message: &str, session_id: Option<&str>) -> Result<TurnResult> {
        let message = self.validate_message(message)?;

        let mut session = self.store.lock_or_create(session_id).await;
        let mut draft = session.clone();
        draft.touch();
        let id = draft.session_id.clone();

        let result = match detect_turn_intent(message) {
            TurnIntent::Reset => {
                draft.reset();
                info!(session_id = %id, "Conversation reset");
                TurnResult::reply(&id, response::RESET_REPLY)
            }
            TurnIntent::Greeting => {
                draft.reset();
                info!(session_id = %id, "Conversation restarted by greeting");
                TurnResult::reply(&id, response::GREETING_REPLY)
            }
            TurnIntent::Thanks => {
                let result = TurnResult::reply(&id, response::THANKS_REPLY);
                record_exchange(&mut draft, message, &result.response);
                result
            }
            TurnIntent::Describe => {
                let knowledge = self.load_knowledge(&id).await?;
                let result = self.describe(&mut draft, message, &knowledge)?;
                record_exchange(&mut draft, message, &result.response);
                result
            }
        };

        *session = draft;
        Ok(result)
    }

    fn describe(
        &self,
        session: &mut ConversationSession,
        message: &str,
        knowledge: &KnowledgeSnapshot,
    ) -> Result<TurnResult> {
        let extractor = SymptomExtractor::new(&knowledge.symptoms)?;
        session.add_symptoms(extractor.extract(message));
        let added = session.drain_new_symptoms();
        let id = session.session_id.clone();

        debug!(
            session_id = %id,
            added = added.len(),
            total = session.symptom_count(),
            "Symptoms accumulated"
        );

        let mut text = response::recorded_prefix(&added);

        if session.symptom_count() < self.settings.min_symptoms {
            text.push_str(&response::need_more_text(session.symptom_count()));
            return Ok(TurnResult::reply(id, text).with_status(TurnStatus::NeedMoreSymptoms));
        }

        let result = match self.matcher.evaluate(&session.symptoms, &knowledge.rules) {
            MatchOutcome::Exact(best) => {
                session.set_diagnosis(&best.diagnosis, best.confidence);
                text.push_str(&response::exact_text(&session.symptoms, &best));
                info!(session_id = %id, diagnosis = %best.diagnosis, "Diagnosis complete");
                TurnResult::reply(id, text)
                    .with_status(TurnStatus::DiagnosisComplete)
                    .with_match(&best)
            }
            MatchOutcome::Partial(best) => {
                session.set_diagnosis(&best.diagnosis, best.confidence);
                text.push_str(&response::partial_text(&session.symptoms, &best));
                info!(
                    session_id = %id,
                    diagnosis = %best.diagnosis,
                    confidence = best.confidence,
                    "Partial diagnosis"
                );
                TurnResult::reply(id, text)
                    .with_status(TurnStatus::PartialDiagnosis)
                    .with_match(&best)
            }
            MatchOutcome::Inconclusive => {
                // The previously stored diagnosis is kept
                text.push_str(&response::inconclusive_text(&session.symptoms));
                TurnResult::reply(id, text).with_status(TurnStatus::Inconclusive)
            }
        };
        Ok(result)
    }

    /// Handles a follow-up question about an existing session's diagnosis
    pub async fn handle_follow_up(
        &self,
        message: &str,
        session_id: Option<&str>,
    ) -> Result<FollowUpResult> {
        let session_id = session_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(DiagnosisError::SessionRequired)?;
        let mut session = self
            .store
            .lock_existing(session_id)
            .await
            .ok_or_else(|| DiagnosisError::session_not_found(session_id))?;

        let message = message.trim();
        if message.is_empty() {
            return Err(DiagnosisError::invalid_input("Message must not be empty"));
        }

        let mut draft = session.clone();
        draft.touch();
        let id = draft.session_id.clone();

        let intent = detect_follow_up_intent(message);
        debug!(session_id = %id, intent = ?intent, "Follow-up intent");

        let result = match intent {
            FollowUpIntent::Treatment => match &draft.diagnosis {
                Some(diagnosis) => FollowUpResult::reply(
                    &id,
                    format!(
                        "For diagnosis **{}**:\n{}",
                        diagnosis,
                        treatment_advice(diagnosis)
                    ),
                ),
                None => FollowUpResult::reply(&id, response::NO_DIAGNOSIS_REPLY),
            },
            FollowUpIntent::Explanation => match &draft.diagnosis {
                Some(diagnosis) => FollowUpResult::reply(
                    &id,
                    format!("**{}**:\n{}", diagnosis, disease_explanation(diagnosis)),
                ),
                None => FollowUpResult::reply(&id, response::NO_DIAGNOSIS_REPLY),
            },
            FollowUpIntent::AddSymptoms => {
                let knowledge = self.load_knowledge(&id).await?;
                let extractor = SymptomExtractor::new(&knowledge.symptoms)?;
                draft.add_symptoms(extractor.extract(message));
                // Reported by this reply only
                let added = draft.drain_new_symptoms();
                if !added.is_empty() {
                    let mut result =
                        FollowUpResult::reply(&id, response::symptoms_added_text(added.len()));
                    result.symptoms = Some(draft.symptoms.iter().cloned().collect());
                    result
                } else {
                    FollowUpResult::reply(&id, response::NO_NEW_SYMPTOMS_REPLY)
                }
            }
            FollowUpIntent::Reanalyze => {
                let mut result = FollowUpResult::reply(&id, response::REANALYZE_REPLY);
                result.redirect = Some(true);
                result
            }
            FollowUpIntent::Unknown => FollowUpResult::reply(&id, response::FOLLOW_UP_HELP),
        };

        record_exchange(&mut draft, message, &result.response);
        *session = draft;
        Ok(result)
    }
}

fn record_exchange(session: &mut ConversationSession, user: &str, bot: &str) {
    session.add_message(Message::user(user));
    session.add_message(Message::bot(bot));
}

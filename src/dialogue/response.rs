//! Turn and follow-up results plus their response text

use serde::Serialize;
use std::collections::BTreeSet;

use crate::knowledge::Rule;
use crate::matcher::RuleMatch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TurnStatus {
    NeedMoreSymptoms,
    DiagnosisComplete,
    PartialDiagnosis,
    Inconclusive,
}

/// Outcome of one main turn
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnResult {
    pub response: String,
    pub session_id: String,
    /// Absent for reset, greeting and thanks replies
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TurnStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_rule: Option<Rule>,
}

impl TurnResult {
    pub fn reply(session_id: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            session_id: session_id.into(),
            status: None,
            diagnosis: None,
            confidence: None,
            matched_rule: None,
        }
    }

    pub fn with_status(mut self, status: TurnStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_match(mut self, best: &RuleMatch) -> Self {
        self.diagnosis = Some(best.diagnosis.clone());
        self.confidence = Some(best.confidence);
        self.matched_rule = Some(best.rule.clone());
        self
    }
}

/// Outcome of a follow-up turn
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpResult {
    pub response: String,
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symptoms: Option<Vec<String>>,
    /// Set when the caller should resubmit through the main turn handler
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<bool>,
}

impl FollowUpResult {
    pub fn reply(session_id: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            session_id: session_id.into(),
            symptoms: None,
            redirect: None,
        }
    }
}

pub const RESET_REPLY: &str =
    "Conversation has been reset. Please start by describing your symptoms.";

pub const GREETING_REPLY: &str =
    "Hello! I am your health diagnosis assistant. Please describe your first symptom.";

pub const THANKS_REPLY: &str = "You're welcome! If you have more symptoms, feel free to \
describe them. Type 'reset' to start a new conversation.";

pub const REANALYZE_REPLY: &str = "Reprocessing diagnosis with updated symptoms...";

pub const FOLLOW_UP_HELP: &str = "I didn't understand your request. You can:\n\
1. Ask for diagnosis explanation\n\
2. Ask for treatment advice\n\
3. Add symptoms\n\
4. Reset conversation";

pub const NO_DIAGNOSIS_REPLY: &str = "There is no diagnosis yet. Please describe your \
symptoms first so I can analyze them.";

pub const NO_NEW_SYMPTOMS_REPLY: &str =
    "No new symptoms found. Please describe additional symptoms you're experiencing.";

fn join(symptoms: &BTreeSet<String>) -> String {
    symptoms.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

/// Prefix acknowledging symptoms recorded this turn
pub fn recorded_prefix(added: &BTreeSet<String>) -> String {
    if added.is_empty() {
        String::new()
    } else {
        format!("Symptom(s) \"{}\" have been recorded.\n\n", join(added))
    }
}

pub fn need_more_text(count: usize) -> String {
    format!(
        "Currently, I have {} symptom(s). Please provide more symptoms for a more accurate \
         analysis.\nExample: 'I also have a fever and headache.'",
        count
    )
}

pub fn exact_text(symptoms: &BTreeSet<String>, best: &RuleMatch) -> String {
    format!(
        "Based on your symptoms: {}\n\nDiagnosis: **{}**\n\n\nWhat would you like to do next?\n\
         1. Add more symptoms\n\
         2. Learn about this diagnosis\n\
         3. Get treatment advice\n\
         4. Start a new conversation (type 'reset')",
        join(symptoms),
        best.diagnosis
    )
}

pub fn partial_text(symptoms: &BTreeSet<String>, best: &RuleMatch) -> String {
    format!(
        "Based on your symptoms: {}\n\nPossible diagnosis: **{}**\n\
         (Match level: {}% - {}/{} symptoms matched)\n\nWhat would you like to do next?\n\
         1. Add more symptoms to improve accuracy\n\
         2. Learn about this diagnosis\n\
         3. Get treatment advice\n\
         4. Start a new conversation (type 'reset')",
        join(symptoms),
        best.diagnosis,
        best.percent(),
        best.matched,
        best.total
    )
}

pub fn inconclusive_text(symptoms: &BTreeSet<String>) -> String {
    format!(
        "I can't determine an exact diagnosis yet based on your symptoms.\n\n\
         Symptoms you mentioned: {}\n\n\
         Please add any other relevant symptoms, or type 'reset' to start a new conversation.",
        join(symptoms)
    )
}

pub fn symptoms_added_text(added: usize) -> String {
    format!(
        "{} new symptom(s) added. Send 'analyze' to recheck diagnosis.",
        added
    )
}

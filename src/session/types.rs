use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Bot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn bot(content: impl Into<String>) -> Self {
        Self::new(Role::Bot, content)
    }
}

/// Per-conversation diagnosis state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSession {
    pub session_id: String,
    /// Accumulated symptoms; grows until reset
    pub symptoms: BTreeSet<String>,
    /// Symptoms added since the last drain
    pub new_symptoms: BTreeSet<String>,
    pub diagnosis: Option<String>,
    pub confidence: f64,
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

impl ConversationSession {
    pub fn new(session_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            session_id: session_id.into(),
            symptoms: BTreeSet::new(),
            new_symptoms: BTreeSet::new(),
            diagnosis: None,
            confidence: 0.0,
            messages: Vec::new(),
            created_at: now,
            last_active: now,
        }
    }

    /// Adds every token not already known; returns how many were new
    pub fn add_symptoms<I, S>(&mut self, tokens: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut added = 0;
        for token in tokens {
            let token = token.into();
            if self.symptoms.insert(token.clone()) {
                self.new_symptoms.insert(token);
                added += 1;
            }
        }
        added
    }

    /// Returns and clears the symptoms added since the previous drain
    pub fn drain_new_symptoms(&mut self) -> BTreeSet<String> {
        std::mem::take(&mut self.new_symptoms)
    }

    /// Stores the latest diagnosis and its confidence
    pub fn set_diagnosis(&mut self, diagnosis: impl Into<String>, confidence: f64) {
        self.diagnosis = Some(diagnosis.into());
        self.confidence = confidence;
    }

    /// Clears everything except identity and creation time
    pub fn reset(&mut self) {
        self.symptoms.clear();
        self.new_symptoms.clear();
        self.diagnosis = None;
        self.confidence = 0.0;
        self.messages.clear();
    }

    pub fn touch(&mut self) {
        self.last_active = Utc::now();
    }

    pub fn add_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn symptom_count(&self) -> usize {
        self.symptoms.len()
    }
}

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::dialogue::{DialogueSettings, MIN_MESSAGE_LEN, MIN_SYMPTOMS_FOR_DIAGNOSIS};
use crate::matcher::PARTIAL_MATCH_THRESHOLD;
use crate::session::SESSION_TIMEOUT_SECS;
use crate::utils::{DiagnosisError, Result};

fn default_session_timeout_secs() -> u64 {
    SESSION_TIMEOUT_SECS
}

fn default_min_symptoms() -> usize {
    MIN_SYMPTOMS_FOR_DIAGNOSIS
}

fn default_partial_threshold() -> f64 {
    PARTIAL_MATCH_THRESHOLD
}

fn default_min_message_len() -> usize {
    MIN_MESSAGE_LEN
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Known-symptom vocabulary file; derived from the rules when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symptoms_path: Option<PathBuf>,

    /// Rules file (JSON, or a `.txt` IF/THEN rule sheet)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules_path: Option<PathBuf>,

    #[serde(default = "default_session_timeout_secs")]
    pub session_timeout_secs: u64,

    #[serde(default = "default_min_symptoms")]
    pub min_symptoms: usize,

    #[serde(default = "default_partial_threshold")]
    pub partial_threshold: f64,

    #[serde(default = "default_min_message_len")]
    pub min_message_len: usize,

    /// Period of the background sweep; only the lazy sweep runs when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cleanup_interval_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            symptoms_path: None,
            rules_path: None,
            session_timeout_secs: SESSION_TIMEOUT_SECS,
            min_symptoms: MIN_SYMPTOMS_FOR_DIAGNOSIS,
            partial_threshold: PARTIAL_MATCH_THRESHOLD,
            min_message_len: MIN_MESSAGE_LEN,
            cleanup_interval_secs: None,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if !(self.partial_threshold > 0.0 && self.partial_threshold <= 1.0) {
            return Err(DiagnosisError::config(format!(
                "partial_threshold must be in (0, 1], got {}",
                self.partial_threshold
            )));
        }
        if self.session_timeout_secs == 0 {
            return Err(DiagnosisError::config("session_timeout_secs must be positive"));
        }
        if self.min_symptoms == 0 {
            return Err(DiagnosisError::config("min_symptoms must be positive"));
        }
        if self.cleanup_interval_secs == Some(0) {
            return Err(DiagnosisError::config("cleanup_interval_secs must be positive"));
        }
        Ok(())
    }

    pub fn dialogue_settings(&self) -> DialogueSettings {
        DialogueSettings {
            min_symptoms: self.min_symptoms,
            min_message_len: self.min_message_len,
            partial_threshold: self.partial_threshold,
        }
    }

    pub fn session_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.session_timeout_secs)
    }
}

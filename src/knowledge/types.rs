use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::utils::{DiagnosisError, Result};

/// Minimum length of a known-symptom name
pub const MIN_SYMPTOM_NAME_LEN: usize = 3;

/// Minimum length of a rule's diagnosis label
pub const MIN_DIAGNOSIS_LEN: usize = 3;

/// Canonical form of a symptom name.
///
/// Lowercases, turns underscores into spaces and collapses whitespace runs,
/// so `"Skin_Rash "` and `"skin   rash"` both become `"skin rash"`.
pub fn normalize_symptom(name: &str) -> String {
    name.to_lowercase()
        .replace('_', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Checks a known-symptom name after normalization
pub fn validate_symptom_name(name: &str) -> Result<String> {
    let normalized = normalize_symptom(name);
    if normalized.chars().count() < MIN_SYMPTOM_NAME_LEN {
        return Err(DiagnosisError::invalid_input(format!(
            "Symptom name must be at least {} characters: {:?}",
            MIN_SYMPTOM_NAME_LEN, name
        )));
    }
    Ok(normalized)
}

/// A symptom-set → diagnosis rule.
///
/// Symptom names are normalized and deduplicated on construction. A rule with
/// an empty symptom set can be built (e.g. from a loose data file) but never
/// matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RuleRecord")]
pub struct Rule {
    symptoms: BTreeSet<String>,
    diagnosis: String,
}

/// Wire shape of a rule as supplied by the knowledge collaborator
#[derive(Debug, Deserialize)]
struct RuleRecord {
    #[serde(default)]
    symptoms: Vec<String>,
    #[serde(default)]
    diagnosis: String,
}

impl From<RuleRecord> for Rule {
    fn from(record: RuleRecord) -> Self {
        Rule::new(record.symptoms, record.diagnosis)
    }
}

impl Rule {
    pub fn new<I, S>(symptoms: I, diagnosis: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let symptoms = symptoms
            .into_iter()
            .map(|s| normalize_symptom(s.as_ref()))
            .filter(|s| !s.is_empty())
            .collect();
        Self {
            symptoms,
            diagnosis: diagnosis.into().trim().to_string(),
        }
    }

    /// Builds a rule, rejecting an empty symptom set or a label shorter than
    /// `MIN_DIAGNOSIS_LEN`
    pub fn validated<I, S>(symptoms: I, diagnosis: impl Into<String>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rule = Self::new(symptoms, diagnosis);
        if rule.symptoms.is_empty() {
            return Err(DiagnosisError::invalid_input(
                "Rule symptom list must not be empty",
            ));
        }
        if rule.diagnosis.chars().count() < MIN_DIAGNOSIS_LEN {
            return Err(DiagnosisError::invalid_input(format!(
                "Rule diagnosis must be at least {} characters",
                MIN_DIAGNOSIS_LEN
            )));
        }
        Ok(rule)
    }

    pub fn symptoms(&self) -> &BTreeSet<String> {
        &self.symptoms
    }

    pub fn diagnosis(&self) -> &str {
        &self.diagnosis
    }

    /// Number of distinct symptoms in the rule
    pub fn len(&self) -> usize {
        self.symptoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symptoms.is_empty()
    }
}

//! Batch rule parser
//!
//! Parses plain-text rule sheets, one rule per line:
//!
//! ```text
//! IF itching AND skin rash AND nodal skin eruptions THEN diagnosis = 'Fungal infection'
//! ```
//!
//! Keywords are case-insensitive and the label may use single or double quotes.
//! A bad line is reported and skipped; it never aborts the batch.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

use crate::knowledge::types::Rule;
use crate::utils::DiagnosisError;

static RULE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)^IF\s+(.+)\s+THEN\s+diagnosis\s*=\s*['"](.+)['"]$"#)
        .expect("rule line pattern is valid")
});

static AND_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+AND\s+").expect("AND pattern is valid"));

/// A line that could not be turned into a rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleLineError {
    /// 1-based line number in the input text
    pub line: usize,
    pub text: String,
    pub error: String,
}

impl RuleLineError {
    pub fn to_error(&self) -> DiagnosisError {
        DiagnosisError::rule_parse(self.line, self.error.clone())
    }
}

/// Outcome of parsing a rule sheet
#[derive(Debug, Clone, Default, Serialize)]
pub struct RuleBatch {
    pub rules: Vec<Rule>,
    pub errors: Vec<RuleLineError>,
}

impl RuleBatch {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Parses a single `IF ... THEN diagnosis = '...'` line
pub fn parse_rule_line(line: &str) -> Result<Rule, String> {
    let captures = RULE_LINE
        .captures(line.trim())
        .ok_or_else(|| "Invalid format".to_string())?;

    let symptoms_part = captures.get(1).map_or("", |m| m.as_str());
    let diagnosis = captures.get(2).map_or("", |m| m.as_str());
    let symptoms: Vec<&str> = AND_SEPARATOR.split(symptoms_part).collect();

    Rule::validated(symptoms, diagnosis).map_err(|_| "Missing symptoms or diagnosis".to_string())
}

/// Parses every non-empty line of `text`, collecting rules and per-line errors
pub fn parse_rules_text(text: &str) -> RuleBatch {
    let mut batch = RuleBatch::default();

    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        match parse_rule_line(line) {
            Ok(rule) => batch.rules.push(rule),
            Err(error) => {
                tracing::warn!(line = index + 1, error = %error, "Skipping unparseable rule line");
                batch.errors.push(RuleLineError {
                    line: index + 1,
                    text: line.to_string(),
                    error,
                });
            }
        }
    }

    tracing::debug!(
        rules = batch.rules.len(),
        errors = batch.errors.len(),
        "Parsed rule sheet"
    );
    batch
}

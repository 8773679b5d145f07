//! Rule matching
//!
//! Two phases. A rule matches *exactly* when all of its symptoms are present
//! in the user's set; the most specific exact rule wins with confidence 1.0.
//! Only when no rule matches exactly, every rule is scored by
//! `matched / total` and the best rule at or above the partial threshold wins.
//! Ties keep the rule listed first. Rules without symptoms never match.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::knowledge::Rule;

/// Fraction of a rule's symptoms that must be present for a partial match
pub const PARTIAL_MATCH_THRESHOLD: f64 = 0.7;

/// The winning rule and how well it was satisfied
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleMatch {
    pub diagnosis: String,
    /// 1.0 for an exact match, `matched / total` otherwise
    pub confidence: f64,
    pub rule: Rule,
    pub matched: usize,
    pub total: usize,
}

impl RuleMatch {
    fn new(rule: &Rule, matched: usize) -> Self {
        let total = rule.len();
        Self {
            diagnosis: rule.diagnosis().to_string(),
            confidence: matched as f64 / total as f64,
            rule: rule.clone(),
            matched,
            total,
        }
    }

    /// Confidence as a whole percentage, for display only
    pub fn percent(&self) -> u32 {
        (self.confidence * 100.0).round() as u32
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchOutcome {
    Exact(RuleMatch),
    Partial(RuleMatch),
    Inconclusive,
}

impl MatchOutcome {
    pub fn best(&self) -> Option<&RuleMatch> {
        match self {
            MatchOutcome::Exact(m) | MatchOutcome::Partial(m) => Some(m),
            MatchOutcome::Inconclusive => None,
        }
    }

    pub fn is_exact(&self) -> bool {
        matches!(self, MatchOutcome::Exact(_))
    }
}

/// Scores a symptom set against a rule list
#[derive(Debug, Clone, Copy)]
pub struct RuleMatcher {
    threshold: f64,
}

impl Default for RuleMatcher {
    fn default() -> Self {
        Self::new(PARTIAL_MATCH_THRESHOLD)
    }
}

impl RuleMatcher {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn evaluate(&self, user_symptoms: &BTreeSet<String>, rules: &[Rule]) -> MatchOutcome {
        if let Some(exact) = Self::best_exact(user_symptoms, rules) {
            tracing::debug!(diagnosis = %exact.diagnosis, symptoms = exact.total, "Exact rule match");
            return MatchOutcome::Exact(exact);
        }

        match self.best_partial(user_symptoms, rules) {
            Some(partial) => {
                tracing::debug!(
                    diagnosis = %partial.diagnosis,
                    matched = partial.matched,
                    total = partial.total,
                    "Partial rule match"
                );
                MatchOutcome::Partial(partial)
            }
            None => MatchOutcome::Inconclusive,
        }
    }

    fn best_exact(user_symptoms: &BTreeSet<String>, rules: &[Rule]) -> Option<RuleMatch> {
        let mut best: Option<&Rule> = None;
        for rule in rules {
            if rule.is_empty() || !rule.symptoms().is_subset(user_symptoms) {
                continue;
            }
            // Strictly greater keeps the first of equally specific rules
            if best.is_none_or(|b| rule.len() > b.len()) {
                best = Some(rule);
            }
        }
        best.map(|rule| RuleMatch::new(rule, rule.len()))
    }

    fn best_partial(&self, user_symptoms: &BTreeSet<String>, rules: &[Rule]) -> Option<RuleMatch> {
        let mut best: Option<RuleMatch> = None;
        for rule in rules {
            if rule.is_empty() {
                continue;
            }
            let matched = rule.symptoms().intersection(user_symptoms).count();
            let candidate = RuleMatch::new(rule, matched);
            if candidate.confidence < self.threshold {
                continue;
            }
            if best
                .as_ref()
                .is_none_or(|b| candidate.confidence > b.confidence)
            {
                best = Some(candidate);
            }
        }
        best
    }
}

/// Matches with the default threshold
pub fn match_rules(user_symptoms: &BTreeSet<String>, rules: &[Rule]) -> MatchOutcome {
    RuleMatcher::default().evaluate(user_symptoms, rules)
}

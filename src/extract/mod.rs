//! Symptom extraction from free text
//!
//! Finds which known symptom names occur in a message. Matching is
//! case-insensitive and whole-word: `"rash"` does not match inside `"rashid"`,
//! and the spaces of a multi-word name match any whitespace run, so
//! `"skin rash"` matches `"skin   rash"`.

use regex::Regex;
use std::collections::BTreeSet;

use crate::knowledge::normalize_symptom;
use crate::utils::Result;

/// Lowercases, collapses internal whitespace and trims
pub fn normalize_text(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Builds the whole-word pattern for one symptom name
fn symptom_pattern(name: &str) -> Result<Regex> {
    let body = name
        .split(' ')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+");
    Ok(Regex::new(&format!(r"(?i)\b{}\b", body))?)
}

/// Precompiled matcher over a known-symptom vocabulary
#[derive(Debug, Clone)]
pub struct SymptomExtractor {
    patterns: Vec<(String, Regex)>,
}

impl SymptomExtractor {
    pub fn new<I, S>(vocabulary: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = BTreeSet::new();
        let mut patterns = Vec::new();
        for name in vocabulary {
            let name = normalize_symptom(name.as_ref());
            if name.is_empty() || !seen.insert(name.clone()) {
                continue;
            }
            let pattern = symptom_pattern(&name)?;
            patterns.push((name, pattern));
        }
        Ok(Self { patterns })
    }

    /// Returns every known symptom found in `text`
    pub fn extract(&self, text: &str) -> BTreeSet<String> {
        let normalized = normalize_text(text);
        self.patterns
            .iter()
            .filter(|(_, pattern)| pattern.is_match(&normalized))
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Size of the vocabulary
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// One-off extraction against `known`
pub fn extract<I, S>(text: &str, known: I) -> Result<BTreeSet<String>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Ok(SymptomExtractor::new(known)?.extract(text))
}

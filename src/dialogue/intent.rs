//! Keyword intent detection
//!
//! Plain keyword matching in English and Indonesian. Checks run in a fixed
//! order and the first hit wins.

use regex::Regex;
use std::sync::LazyLock;

static GREETING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(hi|hello|hey|halo|hai)\b").expect("greeting pattern is valid")
});

static THANKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(thanks|thank you|makasih|terima kasih)\b").expect("thanks pattern is valid")
});

static TREATMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(treatment|advice|what to do|therapy|solution)\b")
        .expect("treatment pattern is valid")
});

static EXPLANATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(what is|explain|definition|description)\b")
        .expect("explanation pattern is valid")
});

static ADD_SYMPTOMS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(symptom|add|more|also)\b").expect("add pattern is valid")
});

static REANALYZE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(analyze|diagnose|check|reanalyze)\b").expect("reanalyze pattern is valid")
});

const RESET_PHRASES: [&str; 3] = ["reset", "start over", "mulai baru"];

/// What a main-turn message asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnIntent {
    Reset,
    Greeting,
    Thanks,
    /// Anything else is treated as a symptom description
    Describe,
}

/// What a follow-up message asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUpIntent {
    Treatment,
    Explanation,
    AddSymptoms,
    Reanalyze,
    Unknown,
}

pub fn detect_turn_intent(message: &str) -> TurnIntent {
    let lower = message.to_lowercase();
    // Reset is a plain substring check, so "please reset this" counts
    if RESET_PHRASES.iter().any(|phrase| lower.contains(phrase)) {
        TurnIntent::Reset
    } else if GREETING.is_match(message) {
        TurnIntent::Greeting
    } else if THANKS.is_match(message) {
        TurnIntent::Thanks
    } else {
        TurnIntent::Describe
    }
}

pub fn detect_follow_up_intent(message: &str) -> FollowUpIntent {
    if TREATMENT.is_match(message) {
        FollowUpIntent::Treatment
    } else if EXPLANATION.is_match(message) {
        FollowUpIntent::Explanation
    } else if ADD_SYMPTOMS.is_match(message) {
        FollowUpIntent::AddSymptoms
    } else if REANALYZE.is_match(message) {
        FollowUpIntent::Reanalyze
    } else {
        FollowUpIntent::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_phrases() {
        assert_eq!(detect_turn_intent("reset"), TurnIntent::Reset);
        assert_eq!(detect_turn_intent("Let's START OVER"), TurnIntent::Reset);
        assert_eq!(detect_turn_intent("mulai baru saja"), TurnIntent::Reset);
    }

    #[test]
    fn test_reset_wins_over_greeting() {
        assert_eq!(detect_turn_intent("hello, please reset"), TurnIntent::Reset);
    }

    #[test]
    fn test_greeting_requires_whole_word() {
        assert_eq!(detect_turn_intent("Hello there"), TurnIntent::Greeting);
        assert_eq!(detect_turn_intent("hai dok"), TurnIntent::Greeting);
        assert_eq!(detect_turn_intent("this itching"), TurnIntent::Describe);
        assert_eq!(detect_turn_intent("they say chills"), TurnIntent::Describe);
    }

    #[test]
    fn test_thanks() {
        assert_eq!(detect_turn_intent("thank you so much"), TurnIntent::Thanks);
        assert_eq!(detect_turn_intent("terima kasih"), TurnIntent::Thanks);
    }

    #[test]
    fn test_follow_up_order() {
        assert_eq!(
            detect_follow_up_intent("what treatment should I add"),
            FollowUpIntent::Treatment
        );
        assert_eq!(
            detect_follow_up_intent("please explain it"),
            FollowUpIntent::Explanation
        );
        assert_eq!(
            detect_follow_up_intent("I also have a cough"),
            FollowUpIntent::AddSymptoms
        );
        assert_eq!(
            detect_follow_up_intent("check again"),
            FollowUpIntent::Reanalyze
        );
        assert_eq!(detect_follow_up_intent("ok"), FollowUpIntent::Unknown);
    }
}

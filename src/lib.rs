//! symptom-expert: a conversational rule-based symptom-to-diagnosis assistant.
//!
//! Symptoms described across turns accumulate in a per-conversation session
//! and are matched against a knowledge base of symptom-set → diagnosis rules.

pub mod config;
pub mod dialogue;
pub mod extract;
pub mod knowledge;
pub mod matcher;
pub mod session;
pub mod utils;

//! Conversation flow
//!
//! `DialogueController` runs a main turn (reset/greeting/thanks detection,
//! symptom extraction, accumulation, rule matching) and follow-up turns
//! about an already stored diagnosis.

pub mod controller;
pub mod intent;
pub mod response;

pub use controller::{
    DialogueController, DialogueSettings, MIN_MESSAGE_LEN, MIN_SYMPTOMS_FOR_DIAGNOSIS,
};
pub use intent::{FollowUpIntent, TurnIntent, detect_follow_up_intent, detect_turn_intent};
pub use response::{FollowUpResult, TurnResult, TurnStatus};

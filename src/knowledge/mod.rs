//! Knowledge model and collaborators
//!
//! Rules, symptom-name normalization, the `KnowledgeSource` seam and the
//! plain-text rule sheet parser.

pub mod advice;
pub mod parser;
pub mod source;
pub mod types;

pub use advice::{disease_explanation, treatment_advice};
pub use parser::{RuleBatch, RuleLineError, parse_rule_line, parse_rules_text};
pub use source::{FileKnowledge, KnowledgeSnapshot, KnowledgeSource, StaticKnowledge};
pub use types::{Rule, normalize_symptom, validate_symptom_name};

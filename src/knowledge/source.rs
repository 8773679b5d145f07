//! Knowledge collaborators
//!
//! The diagnosis engine only consumes plain data: a list of known symptom
//! names and a list of rules. `KnowledgeSource` is the seam where a store
//! plugs in; this module ships an in-memory source and a file-backed one.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

use crate::knowledge::parser::parse_rules_text;
use crate::knowledge::types::{Rule, validate_symptom_name};
use crate::utils::{DiagnosisError, Result};

/// Supplies the known-symptom vocabulary and the rule list
#[async_trait]
pub trait KnowledgeSource: Send + Sync {
    /// Known symptom names (lowercase, unique)
    async fn list_known_symptoms(&self) -> Result<Vec<String>>;

    /// Rules in a stable order; the matcher's tie-breaks depend on it
    async fn list_rules(&self) -> Result<Vec<Rule>>;

    /// Both lists from one consistent read of the store
    async fn list_all(&self) -> Result<(Vec<String>, Vec<Rule>)> {
        let symptoms = self.list_known_symptoms().await?;
        let rules = self.list_rules().await?;
        Ok((symptoms, rules))
    }

    /// Name used in logs and error messages
    fn source_name(&self) -> &str;
}

/// Symptoms and rules read together for one turn
#[derive(Debug, Clone, Default)]
pub struct KnowledgeSnapshot {
    pub symptoms: Vec<String>,
    pub rules: Vec<Rule>,
}

impl KnowledgeSnapshot {
    /// Reads both lists from `source`.
    ///
    /// Vocabulary names are normalized; names that are too short or repeated
    /// are dropped with a warning.
    pub async fn load(source: &dyn KnowledgeSource) -> Result<Self> {
        let (raw_symptoms, rules) = source.list_all().await?;

        let mut seen = BTreeSet::new();
        let mut symptoms = Vec::with_capacity(raw_symptoms.len());
        for name in raw_symptoms {
            match validate_symptom_name(&name) {
                Ok(normalized) => {
                    if seen.insert(normalized.clone()) {
                        symptoms.push(normalized);
                    }
                }
                Err(e) => {
                    warn!(source = source.source_name(), error = %e, "Skipping known symptom");
                }
            }
        }

        let empty_rules = rules.iter().filter(|r| r.is_empty()).count();
        if empty_rules > 0 {
            warn!(
                source = source.source_name(),
                empty_rules = empty_rules,
                "Knowledge contains rules without symptoms; they will never match"
            );
        }

        debug!(
            source = source.source_name(),
            symptoms = symptoms.len(),
            rules = rules.len(),
            "Knowledge snapshot loaded"
        );
        Ok(Self { symptoms, rules })
    }
}

/// Union of all rule symptoms, in sorted order
pub fn vocabulary_from_rules(rules: &[Rule]) -> Vec<String> {
    rules
        .iter()
        .flat_map(|r| r.symptoms().iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// In-memory knowledge, mostly for tests and embedding
#[derive(Debug, Clone, Default)]
pub struct StaticKnowledge {
    symptoms: Vec<String>,
    rules: Vec<Rule>,
}

impl StaticKnowledge {
    pub fn new(symptoms: Vec<String>, rules: Vec<Rule>) -> Self {
        Self { symptoms, rules }
    }

    /// Builds a source whose vocabulary is every symptom named by `rules`
    pub fn from_rules(rules: Vec<Rule>) -> Self {
        let symptoms = vocabulary_from_rules(&rules);
        Self { symptoms, rules }
    }
}

#[async_trait]
impl KnowledgeSource for StaticKnowledge {
    async fn list_known_symptoms(&self) -> Result<Vec<String>> {
        Ok(self.symptoms.clone())
    }

    async fn list_rules(&self) -> Result<Vec<Rule>> {
        Ok(self.rules.clone())
    }

    fn source_name(&self) -> &str {
        "static"
    }
}

/// Entry of a symptoms file: either a bare name or `{ "name": ... }`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SymptomEntry {
    Name(String),
    Record { name: String },
}

impl SymptomEntry {
    fn into_name(self) -> String {
        match self {
            SymptomEntry::Name(name) | SymptomEntry::Record { name } => name,
        }
    }
}

/// Knowledge read from disk on every call.
///
/// The rules file is either a JSON array of `{symptoms, diagnosis}` objects or,
/// with a `.txt` extension, an `IF ... THEN diagnosis = '...'` rule sheet.
/// Without a symptoms file the vocabulary is derived from the rules.
#[derive(Debug, Clone)]
pub struct FileKnowledge {
    symptoms_path: Option<PathBuf>,
    rules_path: PathBuf,
    name: String,
}

impl FileKnowledge {
    pub fn new(symptoms_path: Option<PathBuf>, rules_path: PathBuf) -> Self {
        let name = rules_path.display().to_string();
        Self {
            symptoms_path,
            rules_path,
            name,
        }
    }

    async fn read(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).await.map_err(|e| {
            DiagnosisError::knowledge(
                path.display().to_string(),
                format!("failed to read file: {}", e),
            )
        })
    }

    async fn read_rules(&self) -> Result<Vec<Rule>> {
        let content = self.read(&self.rules_path).await?;
        let is_sheet = self
            .rules_path
            .extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"));

        if is_sheet {
            let batch = parse_rules_text(&content);
            if !batch.is_clean() {
                warn!(
                    path = %self.rules_path.display(),
                    errors = batch.errors.len(),
                    "Rule sheet contains lines that were skipped"
                );
            }
            return Ok(batch.rules);
        }

        serde_json::from_str(&content).map_err(|e| {
            DiagnosisError::knowledge(
                self.rules_path.display().to_string(),
                format!("invalid rules JSON: {}", e),
            )
        })
    }

    async fn read_symptoms(&self, path: &Path) -> Result<Vec<String>> {
        let content = self.read(path).await?;
        let entries: Vec<SymptomEntry> = serde_json::from_str(&content).map_err(|e| {
            DiagnosisError::knowledge(
                path.display().to_string(),
                format!("invalid symptoms JSON: {}", e),
            )
        })?;
        Ok(entries.into_iter().map(SymptomEntry::into_name).collect())
    }
}

#[async_trait]
impl KnowledgeSource for FileKnowledge {
    async fn list_known_symptoms(&self) -> Result<Vec<String>> {
        let Some(path) = &self.symptoms_path else {
            let rules = self.read_rules().await?;
            return Ok(vocabulary_from_rules(&rules));
        };

        self.read_symptoms(path).await
    }

    async fn list_rules(&self) -> Result<Vec<Rule>> {
        let rules = self.read_rules().await?;
        debug!(path = %self.rules_path.display(), rules = rules.len(), "Loaded rules");
        Ok(rules)
    }

    /// Reads the rules file once and derives the vocabulary from that same read
    /// when no symptoms file is configured
    async fn list_all(&self) -> Result<(Vec<String>, Vec<Rule>)> {
        let rules = self.list_rules().await?;
        let symptoms = match &self.symptoms_path {
            Some(path) => self.read_symptoms(path).await?,
            None => vocabulary_from_rules(&rules),
        };
        Ok((symptoms, rules))
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fungal() -> Rule {
        Rule::new(
            ["itching", "skin rash", "nodal skin eruptions"],
            "Fungal infection",
        )
    }

    #[test]
    fn test_vocabulary_from_rules() {
        let rules = vec![fungal(), Rule::new(["itching", "sneezing"], "Allergy")];
        let vocab = vocabulary_from_rules(&rules);
        assert_eq!(
            vocab,
            vec!["itching", "nodal skin eruptions", "skin rash", "sneezing"]
        );
    }

    #[tokio::test]
    async fn test_snapshot_normalizes_and_dedups_vocabulary() {
        let source = StaticKnowledge::new(
            vec![
                "Itching".to_string(),
                "itching".to_string(),
                "ab".to_string(),
                "skin_rash".to_string(),
            ],
            vec![fungal()],
        );
        let snapshot = KnowledgeSnapshot::load(&source).await.unwrap();
        assert_eq!(snapshot.symptoms, vec!["itching", "skin rash"]);
        assert_eq!(snapshot.rules.len(), 1);
    }

    #[tokio::test]
    async fn test_file_knowledge_json() {
        let temp_dir = TempDir::new().unwrap();
        let rules_path = temp_dir.path().join("rules.json");
        let symptoms_path = temp_dir.path().join("symptoms.json");
        std::fs::write(
            &rules_path,
            r#"[{"symptoms": ["itching", "skin_rash"], "diagnosis": "Fungal infection"}]"#,
        )
        .unwrap();
        std::fs::write(&symptoms_path, r#"["itching", {"name": "skin rash"}]"#).unwrap();

        let source = FileKnowledge::new(Some(symptoms_path), rules_path);
        let symptoms = source.list_known_symptoms().await.unwrap();
        assert_eq!(symptoms, vec!["itching", "skin rash"]);

        let rules = source.list_rules().await.unwrap();
        assert_eq!(rules.len(), 1);
        assert!(rules[0].symptoms().contains("skin rash"));
    }

    #[tokio::test]
    async fn test_file_knowledge_rule_sheet_derives_vocabulary() {
        let temp_dir = TempDir::new().unwrap();
        let rules_path = temp_dir.path().join("rules.txt");
        std::fs::write(
            &rules_path,
            "IF acidity AND chest pain THEN diagnosis = 'GERD'\ngarbage line\n",
        )
        .unwrap();

        let source = FileKnowledge::new(None, rules_path);
        let rules = source.list_rules().await.unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(
            source.list_known_symptoms().await.unwrap(),
            vec!["acidity", "chest pain"]
        );
    }

    #[tokio::test]
    async fn test_file_knowledge_list_all_reads_rules_once() {
        let temp_dir = TempDir::new().unwrap();
        let rules_path = temp_dir.path().join("rules.json");
        std::fs::write(
            &rules_path,
            r#"[{"symptoms": ["acidity", "Chest_Pain"], "diagnosis": "GERD"}]"#,
        )
        .unwrap();

        let source = FileKnowledge::new(None, rules_path);
        let (symptoms, rules) = source.list_all().await.unwrap();
        assert_eq!(symptoms, vocabulary_from_rules(&rules));
        assert_eq!(symptoms, vec!["acidity", "chest pain"]);
    }

    /// Serves everything through `list_all`; the single-list reads fail
    struct SnapshotOnly;

    #[async_trait]
    impl KnowledgeSource for SnapshotOnly {
        async fn list_known_symptoms(&self) -> Result<Vec<String>> {
            Err(DiagnosisError::knowledge("snapshot-only", "separate read"))
        }

        async fn list_rules(&self) -> Result<Vec<Rule>> {
            Err(DiagnosisError::knowledge("snapshot-only", "separate read"))
        }

        async fn list_all(&self) -> Result<(Vec<String>, Vec<Rule>)> {
            Ok((vec!["itching".to_string()], vec![fungal()]))
        }

        fn source_name(&self) -> &str {
            "snapshot-only"
        }
    }

    #[tokio::test]
    async fn test_snapshot_loads_through_single_read() {
        let snapshot = KnowledgeSnapshot::load(&SnapshotOnly).await.unwrap();
        assert_eq!(snapshot.symptoms, vec!["itching"]);
        assert_eq!(snapshot.rules, vec![fungal()]);
    }

    #[tokio::test]
    async fn test_file_knowledge_missing_file_is_knowledge_error() {
        let temp_dir = TempDir::new().unwrap();
        let source = FileKnowledge::new(None, temp_dir.path().join("missing.json"));
        let err = source.list_rules().await.unwrap_err();
        assert!(matches!(err, DiagnosisError::Knowledge { .. }));
        assert_eq!(err.code(), "INTERNAL");
    }

    #[tokio::test]
    async fn test_file_knowledge_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        let rules_path = temp_dir.path().join("rules.json");
        std::fs::write(&rules_path, "not json").unwrap();
        let source = FileKnowledge::new(None, rules_path);
        assert!(source.list_rules().await.is_err());
    }
}

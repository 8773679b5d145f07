use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use symptom_expert::config::{Config, ConfigOverrides, load_config};
use symptom_expert::dialogue::DialogueController;
use symptom_expert::knowledge::{
    FileKnowledge, KnowledgeSnapshot, KnowledgeSource, normalize_symptom, parse_rules_text,
};
use symptom_expert::matcher::RuleMatcher;
use symptom_expert::session::SessionStore;

const FOLLOW_UP_PREFIX: &str = "/followup ";
const QUIT_COMMAND: &str = "/quit";

#[derive(Parser)]
#[command(name = "symptom-expert")]
#[command(about = "symptom-expert - rule-based symptom diagnosis assistant")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a config file (defaults to ~/.symptom-expert/config.json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct KnowledgeArgs {
    /// Known-symptom vocabulary (JSON)
    #[arg(long)]
    pub symptoms: Option<PathBuf>,

    /// Rules file (JSON, or .txt IF/THEN rule sheet)
    #[arg(long)]
    pub rules: Option<PathBuf>,
}

impl From<KnowledgeArgs> for ConfigOverrides {
    fn from(args: KnowledgeArgs) -> Self {
        Self {
            symptoms_path: args.symptoms,
            rules_path: args.rules,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Display version information
    Version,
    /// Start an interactive diagnosis conversation on stdin
    Chat {
        #[command(flatten)]
        knowledge: KnowledgeArgs,

        /// Resume or name a session
        #[arg(long)]
        session: Option<String>,
    },
    /// Match a list of symptoms against the rules and print the result as JSON
    Diagnose {
        #[command(flatten)]
        knowledge: KnowledgeArgs,

        /// Symptom names
        #[arg(id = "names", value_name = "SYMPTOM", required = true)]
        names: Vec<String>,
    },
    /// Convert an IF/THEN rule sheet to JSON rules
    ImportRules {
        /// Rule sheet to parse
        input: PathBuf,

        /// Write JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Version) => {
            print_version();
            Ok(())
        }
        Some(Commands::Chat { knowledge, session }) => {
            let config = load_config(knowledge.into(), cli.config)?;
            run_chat(&config, session).await
        }
        Some(Commands::Diagnose { knowledge, names }) => {
            let config = load_config(knowledge.into(), cli.config)?;
            run_diagnose(&config, &names).await
        }
        Some(Commands::ImportRules { input, output }) => run_import(&input, output.as_deref()),
        None => {
            Cli::command().print_help()?;
            println!();
            Ok(())
        }
    }
}

fn print_version() {
    println!("symptom-expert {}", env!("CARGO_PKG_VERSION"));
}

fn knowledge_source(config: &Config) -> Result<Arc<dyn KnowledgeSource>> {
    let rules_path = config
        .rules_path
        .clone()
        .context("No rules file configured; pass --rules or set SYMPTOM_EXPERT_RULES")?;
    Ok(Arc::new(FileKnowledge::new(
        config.symptoms_path.clone(),
        rules_path,
    )))
}

async fn run_chat(config: &Config, session: Option<String>) -> Result<()> {
    let knowledge = knowledge_source(config)?;
    let store = Arc::new(SessionStore::with_timeout(config.session_timeout()));
    let cleanup = config
        .cleanup_interval_secs
        .map(|secs| store.start_cleanup_task(std::time::Duration::from_secs(secs)));
    let controller = DialogueController::with_settings(
        Arc::clone(&store),
        knowledge,
        config.dialogue_settings(),
    );

    tracing::info!("Chat started");
    println!("Describe your symptoms. Prefix follow-up questions with '/followup', '/quit' to exit.");

    let mut session_id = session;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == QUIT_COMMAND {
            break;
        }

        if let Some(question) = line.strip_prefix(FOLLOW_UP_PREFIX) {
            match controller
                .handle_follow_up(question, session_id.as_deref())
                .await
            {
                Ok(result) => {
                    println!("{}", result.response);
                    if result.redirect == Some(true) {
                        // Resubmit through the main turn handler
                        match controller
                            .handle_turn(question, Some(result.session_id.as_str()))
                            .await
                        {
                            Ok(turn) => println!("{}", turn.response),
                            Err(e) => eprintln!("Error: {}", e.public_message()),
                        }
                    }
                }
                Err(e) => eprintln!("Error: {}", e.public_message()),
            }
            continue;
        }

        match controller.handle_turn(line, session_id.as_deref()).await {
            Ok(result) => {
                println!("{}", result.response);
                session_id = Some(result.session_id);
            }
            Err(e) => eprintln!("Error: {}", e.public_message()),
        }
    }

    if let Some((handle, shutdown_tx)) = cleanup {
        shutdown_tx.send(()).await.ok();
        handle.await.ok();
    }
    tracing::info!("Chat ended");
    Ok(())
}

async fn run_diagnose(config: &Config, symptoms: &[String]) -> Result<()> {
    let source = knowledge_source(config)?;
    let knowledge = KnowledgeSnapshot::load(source.as_ref())
        .await
        .context("Failed to load knowledge")?;

    let user_symptoms: BTreeSet<String> = symptoms
        .iter()
        .map(|s| normalize_symptom(s))
        .filter(|s| !s.is_empty())
        .collect();

    let outcome =
        RuleMatcher::new(config.partial_threshold).evaluate(&user_symptoms, &knowledge.rules);
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

fn run_import(input: &Path, output: Option<&Path>) -> Result<()> {
    let text = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read rule sheet: {:?}", input))?;
    let batch = parse_rules_text(&text);

    for error in &batch.errors {
        eprintln!("{}: {}", error.to_error(), error.text);
    }
    if batch.rules.is_empty() {
        anyhow::bail!("No valid rules found in {:?}", input);
    }

    let json = serde_json::to_string_pretty(&batch.rules)?;
    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write rules: {:?}", path))?;
            tracing::info!(rules = batch.rules.len(), path = %path.display(), "Rules written");
        }
        None => println!("{}", json),
    }
    Ok(())
}

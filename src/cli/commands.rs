use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::{Duration, Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::categorizer::{Categorizer, KnowledgeStore, generate_filename};
use crate::config::Config;
use crate::evaluator::{EvaluationSummary, Evaluator};
use crate::extractor::{KnowledgeExtractor, read_candidates, write_candidates};
use crate::models::{EvaluationDecision, KnowledgeRecord};
use crate::processor::BatchProcessor;
use crate::similarity::{DEFAULT_THRESHOLD, SimilarityChecker, SimilarityMethod};
use crate::trigger::DailyTrigger;
use crate::utils::{display_line, expand_tilde, format_path_with_tilde, get_projects_dir, get_state_dir};

const MAX_REASONS_SHOWN: usize = 5;

#[derive(Parser)]
#[command(name = "knowledge-sync")]
#[command(version)]
#[command(about = "Mine Claude Code conversation logs for reusable knowledge", long_about = None)]
pub struct Cli {
    /// Directory holding the four YAML configuration files (bundled defaults if omitted)
    #[arg(long, global = true, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// Per-candidate output and debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract knowledge candidates from one day of conversation logs
    Extract {
        /// Day to extract, YYYY-MM-DD (default: yesterday)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Projects directory (default: ~/.claude/projects)
        #[arg(long, value_name = "DIR")]
        projects_dir: Option<PathBuf>,

        /// Output file (default: <tmp>/knowledge_candidates_<date>.json)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Score candidates and print per-candidate decisions with statistics
    Evaluate {
        candidates: PathBuf,
    },

    /// Evaluate, deduplicate, categorize and persist candidates, then commit
    Process {
        candidates: PathBuf,
        repo: PathBuf,

        /// Don't create files or commit
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Date stamped on created records, YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Similarity at or above which a candidate is a duplicate
        #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
        threshold: f64,
    },

    /// Create knowledge files from externally produced evaluation decisions
    Create {
        candidates: PathBuf,
        decisions: PathBuf,
        repo: PathBuf,

        /// Date used in the commit message, YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Don't create files or commit
        #[arg(short = 'n', long)]
        dry_run: bool,
    },

    /// Compare two texts, or a text against the sections of a markdown file
    Similarity {
        text1: String,
        text2: Option<String>,

        /// Markdown file to check text1 against
        #[arg(long, value_name = "FILE", conflicts_with = "text2")]
        file: Option<PathBuf>,

        #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
        threshold: f64,

        #[arg(long, value_enum, default_value_t = MethodArg::Tfidf)]
        method: MethodArg,
    },

    /// Categorize a text and write it into a knowledge repository
    Categorize {
        repo: PathBuf,
        title: String,
        content: String,
        tags: Vec<String>,
    },

    /// Once-per-day run guard
    Trigger {
        #[command(subcommand)]
        action: TriggerAction,

        /// State directory (default: ~/.claude/daily_knowledge)
        #[arg(long, global = true, value_name = "DIR")]
        state_dir: Option<PathBuf>,
    },
}

#[derive(Subcommand, Clone, Copy)]
pub enum TriggerAction {
    /// Exit 0 if a run is due today, 1 if already ran
    Check,
    /// Record today as processed
    Mark,
    /// Show the last run date
    Status,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum MethodArg {
    Tfidf,
    Jaccard,
}

impl From<MethodArg> for SimilarityMethod {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::Tfidf => SimilarityMethod::TfIdf,
            MethodArg::Jaccard => SimilarityMethod::Jaccard,
        }
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_dir = cli.config_dir.as_deref();

    match cli.command {
        Commands::Extract { date, projects_dir, output } => {
            let config = load_config(config_dir)?;
            extract(&config, date, projects_dir, output)
        }
        Commands::Evaluate { candidates } => {
            let config = load_config(config_dir)?;
            evaluate(&config, &candidates)
        }
        Commands::Process { candidates, repo, dry_run, date, threshold } => {
            let config = load_config(config_dir)?;
            process(&config, &candidates, &repo, dry_run, cli.verbose, date, threshold)
        }
        Commands::Create { candidates, decisions, repo, date, dry_run } => {
            let config = load_config(config_dir)?;
            create(&config, &candidates, &decisions, &repo, date, dry_run)
        }
        Commands::Similarity { text1, text2, file, threshold, method } => {
            similarity(&text1, text2.as_deref(), file.as_deref(), threshold, method.into())
        }
        Commands::Categorize { repo, title, content, tags } => {
            let config = load_config(config_dir)?;
            categorize(&config, &repo, &title, &content, &tags)
        }
        Commands::Trigger { action, state_dir } => trigger(action, state_dir),
    }
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "knowledge_sync=debug" } else { "knowledge_sync=info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    // A subscriber may already be installed when embedded; that is fine
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn load_config(dir: Option<&Path>) -> Result<Config> {
    match dir {
        Some(dir) => {
            let dir = expand_tilde(dir);
            Config::load(&dir)
                .with_context(|| format!("Failed to load configuration from {}", dir.display()))
        }
        None => Config::bundled().context("Bundled configuration is invalid"),
    }
}

fn require_file(path: &Path, what: &str) -> Result<()> {
    if !path.is_file() {
        bail!("{} file not found: {}", what, path.display());
    }
    Ok(())
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn extract(
    config: &Config,
    date: Option<NaiveDate>,
    projects_dir: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<()> {
    let date = date.unwrap_or_else(|| today() - Duration::days(1));
    let projects_dir = match projects_dir {
        Some(dir) => expand_tilde(&dir),
        None => get_projects_dir()?,
    };
    let output = output.unwrap_or_else(|| {
        std::env::temp_dir().join(format!("knowledge_candidates_{}.json", date.format("%Y-%m-%d")))
    });

    println!("Extracting knowledge candidates for {}", date);
    println!("Projects directory: {}", format_path_with_tilde(&projects_dir));

    let extractor = KnowledgeExtractor::new(projects_dir, &config.exclusion);
    let candidates = extractor.extract_for_date(date)?;
    write_candidates(&output, &candidates)?;

    println!("Extracted {} candidates", candidates.len());
    println!("Saved to: {}", format_path_with_tilde(&output));
    Ok(())
}

fn evaluate(config: &Config, candidates_path: &Path) -> Result<()> {
    require_file(candidates_path, "Candidates")?;
    let candidates = read_candidates(candidates_path)?;
    let evaluator = Evaluator::new(config);

    let results: Vec<_> = candidates.iter().map(|c| evaluator.evaluate(c)).collect();

    for (i, (candidate, result)) in candidates.iter().zip(&results).enumerate() {
        println!(
            "[{}] {} (score: {}) {}",
            i + 1,
            result.decision.as_str().to_uppercase(),
            result.score,
            display_line(&preview(&candidate.text, 60))
        );
        for reason in result.reasons.iter().take(MAX_REASONS_SHOWN) {
            println!("    {}", reason);
        }
    }

    let summary = EvaluationSummary::from_results(&results);
    println!();
    println!("Evaluation Statistics");
    println!("=====================");
    println!("Total candidates: {}", summary.total);
    println!("  Accept: {} ({:.1}%)", summary.accept, summary.percent(summary.accept));
    println!("  Maybe:  {} ({:.1}%)", summary.maybe, summary.percent(summary.maybe));
    println!("  Reject: {} ({:.1}%)", summary.reject, summary.percent(summary.reject));
    if let (Some(min), Some(max), Some(avg)) =
        (summary.min_score, summary.max_score, summary.average_score)
    {
        println!("Score range: {} to {} (average {:.1})", min, max, avg);
    }

    Ok(())
}

fn process(
    config: &Config,
    candidates_path: &Path,
    repo: &Path,
    dry_run: bool,
    verbose: bool,
    date: Option<NaiveDate>,
    threshold: f64,
) -> Result<()> {
    require_file(candidates_path, "Candidates")?;
    let candidates = read_candidates(candidates_path)?;
    let date = date.unwrap_or_else(today).format("%Y-%m-%d").to_string();
    let repo = expand_tilde(repo);

    println!("Processing {} candidates for {}...", candidates.len(), date);

    let processor = BatchProcessor::new(config, &repo)
        .with_threshold(threshold)
        .dry_run(dry_run)
        .verbose(verbose);
    let stats = processor.process_candidates(&candidates, &date);

    println!("{}", "=".repeat(50));
    println!("SUMMARY");
    println!("{}", "=".repeat(50));
    println!("Total candidates: {}", stats.total);
    println!("  Accepted:   {}", stats.accepted);
    println!("  Rejected:   {}", stats.rejected);
    println!("  Duplicates: {}", stats.duplicates);
    println!("  Created:    {}", stats.created);
    if stats.failed > 0 {
        println!("  Failed:     {}", stats.failed);
    }
    if dry_run {
        println!();
        println!("(Dry run - no files were actually created)");
    }

    Ok(())
}

fn create(
    config: &Config,
    candidates_path: &Path,
    decisions_path: &Path,
    repo: &Path,
    date: Option<NaiveDate>,
    dry_run: bool,
) -> Result<()> {
    require_file(candidates_path, "Candidates")?;
    require_file(decisions_path, "Evaluation")?;

    let candidates = read_candidates(candidates_path)?;
    let content = fs::read_to_string(decisions_path)
        .with_context(|| format!("Failed to read {}", decisions_path.display()))?;
    let decisions: Vec<EvaluationDecision> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse decisions from {}", decisions_path.display()))?;

    let date = date.unwrap_or_else(today).format("%Y-%m-%d").to_string();
    let repo = expand_tilde(repo);

    println!("Creating knowledge files for: {}", date);
    println!("  Candidates:  {}", candidates_path.display());
    println!("  Evaluations: {}", decisions_path.display());
    println!("  Repository:  {}", format_path_with_tilde(&repo));

    let processor = BatchProcessor::new(config, &repo).dry_run(dry_run);
    let stats = processor.create_from_decisions(&candidates, &decisions, &date);

    println!();
    println!("=== Statistics ===");
    println!("Total evaluated: {}", stats.total);
    println!("Accepted: {}", stats.accepted);
    println!("Rejected: {}", stats.rejected);
    println!("Duplicates: {}", stats.duplicates);
    println!("Created: {}", stats.created);
    if stats.failed > 0 {
        println!("Failed: {}", stats.failed);
    }
    println!();
    println!("By category:");
    for (category, count) in &stats.by_category {
        println!("  {}: {}", category, count);
    }

    Ok(())
}

fn similarity(
    text1: &str,
    text2: Option<&str>,
    file: Option<&Path>,
    threshold: f64,
    method: SimilarityMethod,
) -> Result<()> {
    let checker = SimilarityChecker::new(threshold).with_method(method);

    if let Some(file) = file {
        println!("Checking against: {}", file.display());
        let matches = checker.check_knowledge_file(text1, file)?;
        if matches.is_empty() {
            println!("No duplicates found");
        } else {
            println!("Found {} potential duplicates:", matches.len());
            for m in &matches {
                println!("  - {}: {:.2}% similar", m.section, m.similarity * 100.0);
            }
        }
        return Ok(());
    }

    let Some(text2) = text2 else {
        bail!("Provide a second text or --file <FILE> to compare against");
    };

    let score = checker.calculate_similarity(text1, text2);
    println!("Similarity: {:.2}%", score * 100.0);
    if score >= threshold {
        println!("Potentially duplicate");
    } else {
        println!("Not duplicate");
    }
    Ok(())
}

fn categorize(config: &Config, repo: &Path, title: &str, content: &str, tags: &[String]) -> Result<()> {
    let categorizer = Categorizer::new(&config.categories);
    let tags_opt = (!tags.is_empty()).then_some(tags);
    let category = categorizer.categorize(content, tags_opt);
    println!("Category: {}", category);

    let date = today().format("%Y-%m-%d").to_string();
    let filename = generate_filename(title, &date, None);
    println!("Filename: {}", filename);

    let store = KnowledgeStore::new(expand_tilde(repo));
    let record = KnowledgeRecord {
        title: title.to_string(),
        category: category.to_string(),
        tags: tags.to_vec(),
        body: content.to_string(),
        metadata: vec![("date".to_string(), date)],
    };
    let path = store.create_knowledge_file(&record, &filename)?;
    println!("Created: {}", format_path_with_tilde(&path));
    Ok(())
}

fn trigger(action: TriggerAction, state_dir: Option<PathBuf>) -> Result<()> {
    let state_dir = match state_dir {
        Some(dir) => expand_tilde(&dir),
        None => get_state_dir()?,
    };
    let trigger = DailyTrigger::new(state_dir);

    match action {
        TriggerAction::Check => {
            if trigger.should_run_today()? {
                println!("Should run today");
            } else {
                println!("Already ran today");
                std::process::exit(1);
            }
        }
        TriggerAction::Mark => {
            let date = trigger.mark_as_run()?;
            info!("State written to {}", trigger.state_file().display());
            println!("Marked as run: {}", date);
        }
        TriggerAction::Status => {
            match trigger.last_run_date()? {
                Some(date) => println!("Last run: {}", date),
                None => println!("Never run"),
            }
            if trigger.should_run_today()? {
                println!("Status: Ready to run");
            } else {
                println!("Status: Already ran today");
            }
        }
    }

    Ok(())
}

/// First `max` characters of the first line
fn preview(text: &str, max: usize) -> String {
    let line = text.lines().next().unwrap_or_default();
    if line.chars().count() > max {
        format!("{}...", line.chars().take(max).collect::<String>())
    } else {
        line.to_string()
    }
}

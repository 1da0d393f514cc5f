//! Assignment Evaluator CLI
//!
//! Plagiarism-risk and feedback scoring for student submissions.

use anyhow::{Context, Result};
use assignment_evaluator::{
    config::Config,
    document::Document,
    llm::LlmClient,
    orchestrator::Orchestrator,
    scoring::{FeedbackScorer, heuristic},
    similarity::SimilarityReport,
    store::{FileStore, SubmissionStore},
    submission::{Assignment, AssignmentId, Submission, SubmissionId},
    telemetry,
    worker::WorkerPool,
};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use walkdir::WalkDir;

/// Assignment Evaluator - plagiarism risk and feedback for student submissions
#[derive(Parser)]
#[command(name = "evaluator")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Store file (overrides config and EVALUATOR_STORE)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage assignments
    Assignment {
        #[command(subcommand)]
        command: AssignmentCommands,
    },

    /// Submit a text file and evaluate it
    Submit {
        /// Assignment id
        assignment: String,

        /// Student name
        #[arg(short, long)]
        student: String,

        /// Path to the submission text
        file: PathBuf,
    },

    /// Show a submission and its feedback
    Status {
        /// Submission id
        submission: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List submissions for an assignment
    List {
        /// Assignment id
        assignment: String,
    },

    /// Evaluate submissions left pending by an interrupted run
    Recover,

    /// Score a text against an assignment description without storing anything
    Score {
        /// Path to the assignment description
        description: PathBuf,

        /// Path to the submission text
        content: PathBuf,

        /// Skip the LLM and use the rule-based scorer
        #[arg(long)]
        heuristic: bool,
    },

    /// Compare a text against a directory of prior texts
    Similarity {
        /// Path to the text to check
        target: PathBuf,

        /// Directory of prior submissions (.txt files, searched recursively)
        corpus: PathBuf,
    },

    /// Test LLM connection
    Test,
}

#[derive(Subcommand)]
enum AssignmentCommands {
    /// Create an assignment
    Add {
        /// Assignment title
        title: String,

        /// Assignment description
        #[arg(short, long, conflicts_with = "description_file")]
        description: Option<String>,

        /// Read the description from a file
        #[arg(long)]
        description_file: Option<PathBuf>,
    },

    /// List assignments
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(store) = cli.store {
        config.evaluation.store_path = store;
    }
    config.validate().context("Invalid configuration")?;
    telemetry::init(&config.logging).context("Failed to initialise logging")?;

    match cli.command {
        Commands::Assignment { command } => match command {
            AssignmentCommands::Add {
                title,
                description,
                description_file,
            } => cmd_assignment_add(&config, title, description, description_file).await,
            AssignmentCommands::List => cmd_assignment_list(&config).await,
        },
        Commands::Submit {
            assignment,
            student,
            file,
        } => cmd_submit(&config, &assignment, &student, &file).await,
        Commands::Status { submission, json } => cmd_status(&config, &submission, json).await,
        Commands::List { assignment } => cmd_list(&config, &assignment).await,
        Commands::Recover => cmd_recover(&config).await,
        Commands::Score {
            description,
            content,
            heuristic,
        } => cmd_score(&config, &description, &content, heuristic).await,
        Commands::Similarity { target, corpus } => cmd_similarity(&target, &corpus),
        Commands::Test => cmd_test(&config).await,
    }
}

fn open_store(config: &Config) -> Result<Arc<FileStore>> {
    let store = FileStore::open(&config.evaluation.store_path).with_context(|| {
        format!(
            "Failed to open store at '{}'",
            config.evaluation.store_path.display()
        )
    })?;
    Ok(Arc::new(store))
}

fn scorer(config: &Config) -> FeedbackScorer {
    if config.llm.is_configured() {
        FeedbackScorer::new(Arc::new(LlmClient::new(config.llm.clone())))
    } else {
        FeedbackScorer::heuristic_only()
    }
}

fn start_pool(config: &Config, store: Arc<FileStore>) -> WorkerPool {
    let orchestrator = Orchestrator::new(store, scorer(config));
    WorkerPool::start(
        orchestrator,
        config.evaluation.workers,
        config.evaluation.queue_capacity,
    )
}

async fn cmd_assignment_add(
    config: &Config,
    title: String,
    description: Option<String>,
    description_file: Option<PathBuf>,
) -> Result<()> {
    let description = match (description, description_file) {
        (Some(text), _) => text,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read '{}'", path.display()))?,
        (None, None) => anyhow::bail!("--description or --description-file is required"),
    };

    let assignment = Assignment::new(&title, &description)?;
    let id = assignment.id;

    let store = open_store(config)?;
    store
        .insert_assignment(assignment)
        .await
        .context("Failed to save assignment")?;

    println!("Created assignment {}", id);
    Ok(())
}

async fn cmd_assignment_list(config: &Config) -> Result<()> {
    let store = open_store(config)?;
    let assignments = store.assignments().await?;

    if assignments.is_empty() {
        println!("No assignments.");
        return Ok(());
    }

    for assignment in assignments {
        println!(
            "{}  {}  ({})",
            assignment.id,
            assignment.title,
            assignment.created_at.format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}

async fn cmd_submit(config: &Config, assignment: &str, student: &str, file: &Path) -> Result<()> {
    let assignment_id: AssignmentId = assignment.parse()?;
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read submission '{}'", file.display()))?;

    let submission = Submission::new(assignment_id, student, &content)?.with_file_path(file);
    let id = submission.id;

    let store = open_store(config)?;
    store
        .insert_submission(submission)
        .await
        .context("Failed to save submission")?;
    println!("Submission {} received (pending)", id);

    let start = Instant::now();
    let pool = start_pool(config, store.clone());
    pool.dispatch(id).await?;
    pool.shutdown().await;

    print_submission(store.as_ref(), &id).await?;
    println!("\nEvaluated in {:.2?}", start.elapsed());
    Ok(())
}

async fn cmd_status(config: &Config, submission: &str, json: bool) -> Result<()> {
    let id: SubmissionId = submission.parse()?;
    let store = open_store(config)?;

    if json {
        let submission = store
            .submission(&id)
            .await?
            .with_context(|| format!("Submission '{}' not found", id))?;
        let feedback = store.evaluation(&id).await?;
        let value = serde_json::json!({
            "submission": submission,
            "feedback": feedback,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    print_submission(store.as_ref(), &id).await
}

async fn print_submission(store: &dyn SubmissionStore, id: &SubmissionId) -> Result<()> {
    let submission = store
        .submission(id)
        .await?
        .with_context(|| format!("Submission '{}' not found", id))?;

    println!("Submission {}", submission.id);
    println!("{}", "─".repeat(60));
    println!("  Student:    {}", submission.student_name);
    println!("  Assignment: {}", submission.assignment_id);
    println!("  Submitted:  {}", submission.submitted_at.format("%Y-%m-%d %H:%M:%S"));
    println!("  Status:     {}", submission.status);

    if let Some(feedback) = store.evaluation(id).await? {
        println!("  Plagiarism: {}", feedback.plagiarism_risk);
        println!("  Score:      {}/100", feedback.score);
        println!("  Feedback:   {}", feedback.feedback_summary);
    }
    Ok(())
}

async fn cmd_list(config: &Config, assignment: &str) -> Result<()> {
    let assignment_id: AssignmentId = assignment.parse()?;
    let store = open_store(config)?;
    let submissions = store.submissions_for_assignment(&assignment_id).await?;

    if submissions.is_empty() {
        println!("No submissions.");
        return Ok(());
    }

    for submission in submissions {
        let feedback = store.evaluation(&submission.id).await?;
        let summary = feedback
            .map(|f| format!("{:>4} risk, score {:>3}", f.plagiarism_risk.to_string(), f.score))
            .unwrap_or_default();
        println!(
            "{}  {:<20} {:<9} {}",
            submission.id, submission.student_name, submission.status, summary
        );
    }
    Ok(())
}

async fn cmd_recover(config: &Config) -> Result<()> {
    let store = open_store(config)?;
    let pool = start_pool(config, store);

    let queued = pool.recover_pending().await?;
    let stats = pool.shutdown().await;

    println!(
        "Recovered {} pending submission(s): {} evaluated, {} failed",
        queued, stats.evaluated, stats.failed
    );
    Ok(())
}

async fn cmd_score(
    config: &Config,
    description_path: &Path,
    content_path: &Path,
    heuristic_only: bool,
) -> Result<()> {
    let description = Document::from_text_file(description_path)
        .context("Failed to load assignment description")?;
    let content = Document::from_text_file(content_path).context("Failed to load submission")?;

    if heuristic_only {
        let report = heuristic::analyze(&content.text, &description.text);
        println!("Words:            {}", report.word_count);
        println!("Avg sentence:     {:.1} words", report.average_sentence_length);
        if let Some((matched, total)) = report.keyword_coverage {
            println!("Keywords matched: {}/{}", matched, total);
        }
        for component in &report.components {
            println!("  {:>2} pts  {:?}", component.points, component.criterion);
        }
        println!("Score:            {}/100", report.total());
        println!("Feedback:         {}", report.summary());
        return Ok(());
    }

    let (feedback, strategy) = scorer(config)
        .evaluate_with_strategy(&content.text, &description.text)
        .await;
    println!("Score:    {}/100 ({:?})", feedback.score, strategy);
    println!("Feedback: {}", feedback.summary);
    Ok(())
}

fn cmd_similarity(target_path: &Path, corpus_dir: &Path) -> Result<()> {
    if !corpus_dir.is_dir() {
        anyhow::bail!("Corpus path '{}' is not a directory", corpus_dir.display());
    }

    let target = Document::from_text_file(target_path).context("Failed to load target")?;
    let canonical_target = target_path.canonicalize().ok();

    let mut corpus = Vec::new();
    for entry in WalkDir::new(corpus_dir).sort_by_file_name() {
        let entry = entry.context("Failed to walk corpus directory")?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().and_then(|e| e.to_str()) != Some("txt")
        {
            continue;
        }
        if canonical_target.is_some() && path.canonicalize().ok() == canonical_target {
            continue;
        }
        corpus.push(Document::from_text_file(path)?);
    }

    let texts: Vec<&str> = corpus.iter().map(|d| d.text.as_str()).collect();
    let report = SimilarityReport::compute(&target.text, &texts);

    println!("Compared '{}' against {} document(s)", target.id, corpus.len());
    if let Some(best) = report.closest_match() {
        println!(
            "Closest match: {} ({:.1}%)",
            corpus[best].id,
            report.similarities[best] * 100.0
        );
    }
    println!("Plagiarism risk: {}", report.risk());
    Ok(())
}

async fn cmd_test(config: &Config) -> Result<()> {
    println!("Testing LLM connection...\n");

    println!("Configuration:");
    println!("  API Base:  {}", config.llm.api_base);
    println!("  Model:     {}", config.llm.model);
    println!(
        "  API Key:   {}...",
        config.llm.api_key.chars().take(8).collect::<String>()
    );
    println!("  Timeout:   {}s", config.llm.timeout_secs);
    println!();

    if !config.llm.is_configured() {
        println!("LLM is not configured; submissions will be scored by the rule-based heuristic.");
        return Ok(());
    }

    let client = LlmClient::new(config.llm.clone());

    println!("Sending test request...");
    match client.test_connection().await {
        Ok(()) => println!("Connection successful!"),
        Err(e) => println!("Connection failed: {}", e),
    }

    Ok(())
}

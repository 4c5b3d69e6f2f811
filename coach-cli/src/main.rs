//! coach CLI: aggregate exercise results into session features, and generate
//! the per-session message. Config from env (plus `.env`) and CLI args.

mod config;

use anyhow::{Context, Result};
use chat_client::{ChatClient, ChatConfig, MessageGenerator};
use clap::{Parser, Subcommand};
use config::DataConfig;
use features::{aggregate, read_exercise_results, ExtraTables};
use prompt::{build_context, PromptStore, SessionContext};
use storage::FeatureRepository;

#[derive(Parser)]
#[command(name = "coach")]
#[command(about = "Session message CLI: transform features, generate messages", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate the exercise result dataset into session features
    /// (full overwrite of the feature store).
    Transform,
    /// Generate the session message for a session group.
    GetMessage { session_group: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Transform => handle_transform().await,
        Commands::GetMessage { session_group } => handle_get_message(&session_group).await,
    }
}

/// Handle the transform command: dataset → aggregator → feature store.
async fn handle_transform() -> Result<()> {
    let config = DataConfig::from_env();

    let rows = read_exercise_results(&config.exercise_results_path)
        .context("Read the exercise result dataset (COACH_DATA_DIR)")?;

    let features = aggregate(&rows, &ExtraTables::default())?;

    let repo = FeatureRepository::new(&config.database_url)
        .await
        .context("Open the feature store (COACH_DATABASE_URL)")?;
    repo.replace_all(&features).await?;

    println!(
        "Transformed {} exercise results into {} session feature rows",
        rows.len(),
        features.len()
    );
    Ok(())
}

/// Fetches the display context for one session group; empty when the group
/// is unknown.
async fn fetch_session_data(
    repo: &FeatureRepository,
    session_group: &str,
) -> Result<SessionContext> {
    let rows = repo.get_features(session_group).await?;
    Ok(build_context(rows.first()))
}

/// Handle the get-message command: features → context → scenario → prompt →
/// chat completion.
async fn handle_get_message(session_group: &str) -> Result<()> {
    let config = DataConfig::from_env();

    let repo = FeatureRepository::new(&config.database_url)
        .await
        .context("Open the feature store (run `coach transform` first)")?;

    let mut context = fetch_session_data(&repo, session_group).await?;
    if context.is_empty() {
        println!("No session data found for session_group: {session_group}");
        return Ok(());
    }

    let store = PromptStore::new(&config.prompts_dir);

    let scenario = prompt::scenario_description(&store, &context)?;
    context.insert("scenario_description", scenario);

    let user_prompt_template = store.load(prompt::USER_PROMPT)?;
    let user_prompt = prompt::render(&user_prompt_template, &context)?;

    let chat_config = ChatConfig::from_env()?;
    let system_prompt = store.load(prompt::SYSTEM_PROMPT)?;
    let generator = MessageGenerator::new(ChatClient::new(chat_config), system_prompt);

    let message = generator.generate_message(&user_prompt).await?;
    println!("{message}");
    Ok(())
}

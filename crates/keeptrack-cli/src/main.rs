//! KeepTrack CLI - project-tracking Kanban board
//!
//! Thin rendering stand-in over the board state controller: prints the board
//! grouped by column, applies drag moves, fetches single projects, and clears
//! the local cache.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use keeptrack_core::board::BoardController;
use keeptrack_core::cache::{FileStore, ProjectCache};
use keeptrack_core::config::Config;
use keeptrack_core::gateway::HttpProjectGateway;
use keeptrack_core::project::ProjectStatus;
use keeptrack_core::reorder::{DropTarget, MoveEvent};

#[derive(Parser)]
#[command(name = "keeptrack")]
#[command(author, version, about = "Project-tracking Kanban board", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,
}

#[derive(Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the board grouped by status column
    Board,

    /// Move a project card to a new column position
    Move {
        /// Project id
        id: i64,
        /// Source column (backlog, todo, in-progress, review, done, blocked)
        #[arg(long)]
        from: String,
        /// Index of the card within the source column
        #[arg(long)]
        from_index: usize,
        /// Destination column
        #[arg(long)]
        to: String,
        /// Index of the card within the destination column
        #[arg(long)]
        to_index: usize,
    },

    /// Fetch a single project from the server
    Get {
        /// Project id
        id: i64,
    },

    /// Local cache maintenance
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Remove the cached project list and the seeded flag
    Clear,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("keeptrack=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;
    tracing::debug!(base_url = %config.api.base_url, "configuration loaded");

    match cli.command {
        Commands::Board => cmd_board(&config, cli.format).await,
        Commands::Move {
            id,
            from,
            from_index,
            to,
            to_index,
        } => cmd_move(&config, cli.format, id, &from, from_index, &to, to_index).await,
        Commands::Get { id } => cmd_get(&config, cli.format, id).await,
        Commands::Cache {
            action: CacheAction::Clear,
        } => cmd_cache_clear(&config),
    }
}

fn build_controller(config: &Config) -> anyhow::Result<BoardController<FileStore>> {
    let gateway = HttpProjectGateway::builder()
        .base_url(config.api.base_url.clone())
        .timeout_secs(config.api.timeout_secs)
        .build()?;
    let cache = ProjectCache::new(FileStore::new(config.cache_dir()?));
    Ok(BoardController::new(Arc::new(gateway), cache))
}

async fn cmd_board(config: &Config, format: OutputFormat) -> anyhow::Result<()> {
    let mut board = build_controller(config)?;
    board.load().await?;
    print_board(&board, format)?;
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn cmd_move(
    config: &Config,
    format: OutputFormat,
    id: i64,
    from: &str,
    from_index: usize,
    to: &str,
    to_index: usize,
) -> anyhow::Result<()> {
    // Column names are validated here, before anything touches the network
    let source_column: ProjectStatus = from.parse()?;
    let dest_column: ProjectStatus = to.parse()?;

    let mut board = build_controller(config)?;
    board.load().await?;
    board
        .apply_move(&MoveEvent {
            dragged_id: id,
            source_column,
            source_index: from_index,
            destination: Some(DropTarget {
                column: dest_column,
                index: to_index,
            }),
        })
        .await;

    if let Some(message) = board.last_error() {
        eprintln!("error: {}", message);
    }
    print_board(&board, format)?;
    Ok(())
}

async fn cmd_get(config: &Config, format: OutputFormat, id: i64) -> anyhow::Result<()> {
    let gateway = HttpProjectGateway::builder()
        .base_url(config.api.base_url.clone())
        .timeout_secs(config.api.timeout_secs)
        .build()?;
    use keeptrack_core::gateway::ProjectGateway;
    let project = gateway.fetch_one(id).await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&project)?),
        OutputFormat::Text => {
            println!("[{}] {} ({})", project.id, project.name, project.status);
            if !project.description.is_empty() {
                println!("  {}", project.description);
            }
            println!("  budget: {}  order: {}", project.budget, project.order);
        }
    }
    Ok(())
}

fn cmd_cache_clear(config: &Config) -> anyhow::Result<()> {
    let cache = ProjectCache::new(FileStore::new(config.cache_dir()?));
    cache.clear();
    println!("Cache cleared.");
    Ok(())
}

fn print_board(board: &BoardController<FileStore>, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            let columns: serde_json::Map<String, serde_json::Value> = board
                .by_column()
                .into_iter()
                .map(|(status, projects)| {
                    Ok((status.to_string(), serde_json::to_value(projects)?))
                })
                .collect::<anyhow::Result<_>>()?;
            println!("{}", serde_json::to_string_pretty(&columns)?);
        }
        OutputFormat::Text => {
            for (status, projects) in board.by_column() {
                println!("{} ({})", status.title(), projects.len());
                for project in projects {
                    println!("  [{}] {}", project.id, project.name);
                }
            }
        }
    }
    Ok(())
}

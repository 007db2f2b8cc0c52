//! vitrine: command-line feed browser.
//!
//! Drives a [`FeedManager`](vitrine::FeedManager) against a live endpoint and
//! prints the render instructions it emits. Useful for checking an endpoint's
//! pagination behaviour without a UI.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use vitrine::{
    Config, FeedManager, FilterState, LoadOutcome, Placement, RenderInstruction, SkipReason,
    TagSet, Visibility,
};

/// Browse a paginated gallery feed from the terminal.
#[derive(Parser)]
#[command(name = "vitrine")]
#[command(version)]
#[command(about = "Gallery feed browser")]
struct Cli {
    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Feed endpoint URL (overrides config).
    #[arg(long, global = true, env = "VITRINE_ENDPOINT")]
    endpoint: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load a feed view and page through it.
    Browse {
        /// Visibility filter: public or private.
        #[arg(short, long, default_value = "public")]
        filter: Visibility,

        /// Comma-separated tag filter.
        #[arg(short, long, default_value = "")]
        tags: String,

        /// Additional pages to load after the first.
        #[arg(short, long, default_value_t = 1)]
        pages: u32,
    },
    /// Print version information.
    Version,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Version => {
            println!("vitrine {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Command::Browse {
            filter,
            tags,
            pages,
        } => {
            let mut config = Config::load(cli.config.as_deref())?;
            if let Some(endpoint) = cli.endpoint {
                config.endpoint.url = Some(endpoint);
            }
            browse(&config, filter, TagSet::parse(&tags), pages).await
        }
    }
}

async fn browse(
    config: &Config,
    visibility: Visibility,
    tags: TagSet,
    pages: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    info!(%visibility, %tags, pages, "browsing feed");
    let feed = FeedManager::builder()
        .filter(FilterState::new().with_visibility(visibility).with_tags(tags))
        .config(config)
        .observer(Arc::new(print_instruction))
        // Pages are driven explicitly below; never replay deferred triggers.
        .viewport(Arc::new(|| false))
        .build()?;

    let outcome = feed.load_initial().await;
    if !outcome.is_loaded() {
        return report(&outcome);
    }

    let mut loaded = 0;
    while loaded < pages {
        match feed.load_more().await {
            LoadOutcome::Loaded { .. } => loaded += 1,
            LoadOutcome::Skipped(SkipReason::CoolingDown) => {
                tokio::time::sleep(config.rate_limit.cooldown_duration()).await;
            }
            LoadOutcome::Skipped(SkipReason::Exhausted) => break,
            other => return report(&other),
        }
    }
    Ok(())
}

fn report(outcome: &LoadOutcome) -> Result<(), Box<dyn std::error::Error>> {
    match outcome {
        LoadOutcome::Failed(e) => Err(Box::new(Arc::clone(e))),
        _ => Ok(()),
    }
}

fn print_instruction(instruction: &RenderInstruction) {
    match instruction {
        RenderInstruction::ClearFeed => println!("--- feed cleared ---"),
        RenderInstruction::AddToFeed { image, placement } => {
            let marker = match placement {
                Placement::Append => "+",
                Placement::Prepend => "^",
            };
            println!("{marker} {} {} {}", image.id, image.url, image.prompt);
        }
        RenderInstruction::RemoveFromFeed { id } => println!("- {id}"),
        RenderInstruction::ShowNoResults => println!("(no results)"),
        RenderInstruction::ShowLoginRequired => println!("(login required)"),
        RenderInstruction::ShowError { message } => println!("(error: {message})"),
        RenderInstruction::Loading(_) => {}
        RenderInstruction::EndOfFeed => println!("--- end of feed ---"),
    }
}

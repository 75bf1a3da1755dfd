use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use guoxue::performance::{MEMORY_SAMPLE_PERIOD, ProcMemoryProbe};
use guoxue::router::{JsonFileStore, RouteSummary, ScrollPosition, classic_routes};
use guoxue::{ImageCategory, Performance, PlaceholderGenerator, Router, SessionState, Settings, StaticViewLoader};

#[derive(Parser)]
#[command(name = "guoxue")]
#[command(about = "Placeholder images and route inspection for the classics site")]
struct Cli {
    /// Settings file (TOML)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render one placeholder image
    Placeholder {
        /// book-cover, avatar, article, banner, quote or default
        #[arg(value_name = "CATEGORY", default_value = "default")]
        category: String,

        /// Text to draw instead of the category label (`\n` separates lines)
        #[arg(short, long)]
        text: Option<String>,

        /// Output PNG path (default: placeholder.png)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Print a data URL instead of writing a file
        #[arg(long, conflicts_with_all = ["output", "commands"])]
        data_url: bool,

        /// Print the drawing commands as JSON instead of writing a file
        #[arg(long, conflicts_with = "output")]
        commands: bool,
    },

    /// Render placeholders for a list of failed image URLs
    Batch {
        #[arg(value_name = "URL", required = true)]
        urls: Vec<String>,

        #[arg(short, long, default_value = "default")]
        category: String,

        /// Output directory (default: from settings)
        #[arg(long, value_name = "DIR")]
        out_dir: Option<PathBuf>,
    },

    /// List the route table as JSON
    Routes,

    /// Run a navigation through the guards and print the outcome as JSON
    Navigate {
        /// Target path, e.g. `/quiz/history` or `#/book/3?from=home`
        #[arg(value_name = "PATH")]
        path: String,

        /// JSON file holding the persisted session flags
        #[arg(long, value_name = "FILE")]
        session: Option<PathBuf>,

        /// Saved scroll offset of a back/forward navigation
        #[arg(long, value_name = "TOP")]
        saved_scroll: Option<f64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    guoxue::telemetry::init_tracing(args.verbose)?;

    let settings = Settings::load(args.config.as_deref())?;
    let performance = Arc::new(Performance::new(settings.performance_enabled()));
    performance.mark("app-init-start");
    let _memory_monitor = performance.monitor_memory_usage(ProcMemoryProbe, MEMORY_SAMPLE_PERIOD);

    match args.command {
        Command::Placeholder {
            category,
            text,
            output,
            data_url,
            commands,
        } => {
            let category = ImageCategory::from_key(&category);
            let text = text.map(|t| t.replace("\\n", "\n"));
            let generator = PlaceholderGenerator::with_font_path(settings.font.as_deref());

            if data_url {
                println!("{}", generator.data_url(category, text.as_deref()));
            } else if commands {
                let commands = generator.commands(category, text.as_deref());
                println!("{}", serde_json::to_string_pretty(&commands)?);
            } else {
                let path = generator.save(category, text.as_deref(), output.as_deref())?;
                println!("{}", path.display());
            }
        }
        Command::Batch {
            urls,
            category,
            out_dir,
        } => {
            let category = ImageCategory::from_key(&category);
            let out_dir = out_dir.unwrap_or_else(|| settings.output_dir.clone());
            let generator = PlaceholderGenerator::with_font_path(settings.font.as_deref());

            tracing::info!("Generating {} placeholders into {}", urls.len(), out_dir.display());
            for path in generator.batch_save(&urls, &out_dir, category)? {
                println!("{}", path.display());
            }
        }
        Command::Routes => {
            let summaries: Vec<RouteSummary> = classic_routes().iter().map(RouteSummary::from).collect();
            println!("{}", serde_json::to_string_pretty(&summaries)?);
        }
        Command::Navigate {
            path,
            session,
            saved_scroll,
        } => {
            let session = match session {
                Some(file) => SessionState::from_store(&JsonFileStore::open(&file)?),
                None => SessionState::anonymous(),
            };
            tracing::debug!(?session, "session flags");

            let loader = StaticViewLoader::for_routes(&classic_routes());
            let mut router = Router::classic(session, loader).with_performance(Arc::clone(&performance));
            let saved = saved_scroll.map(|top| ScrollPosition { left: 0.0, top });
            let navigation = router.navigate(&path, saved).await?;
            println!("{}", serde_json::to_string_pretty(&navigation)?);
        }
    }

    performance.mark("app-init-end");
    performance.measure("app-init", "app-init-start", "app-init-end");

    Ok(())
}

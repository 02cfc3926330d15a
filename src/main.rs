use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};

use pagesum::core::{AppConfig, DetailLevel};
use pagesum::page::{PageTab, load_page};
use pagesum::popup::{LinkOpener, Popup, PopupState, PrintOpener, SaveToDirOpener};
use pagesum::remote::SummaryClient;
use pagesum::render::TerminalSurface;
use pagesum::storage::FileStore;

#[derive(Debug, Parser)]
#[command(name = "pagesum", about = "Summarize web pages with a summarization service")]
struct Cli {
    /// Summarization service base URL
    #[arg(long, env = "PAGESUM_BASE_URL", global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Summarize a page (URL or local HTML file)
    Summarize {
        page: String,
        #[arg(long, default_value_t = DetailLevel::Standard)]
        detail: DetailLevel,
    },
    /// Show the saved summary if it belongs to the page
    Show { page: String },
    /// Open the download link of the saved summary
    Download {
        page: String,
        /// Save the file into this directory instead of printing the link
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Forget the saved summary
    Clear { page: String },
}

impl Command {
    fn page(&self) -> &str {
        match self {
            Command::Summarize { page, .. }
            | Command::Show { page }
            | Command::Download { page, .. }
            | Command::Clear { page } => page,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    pagesum::setup_logging();
    let cli = Cli::parse();

    let mut config = AppConfig::from_env()?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }

    let client = Arc::new(SummaryClient::new(&config)?);
    let page = load_page(&reqwest::Client::new(), cli.command.page())
        .await
        .with_context(|| format!("Could not open {}", cli.command.page()))?;
    info!(url = %page.tab.url, title = %page.tab.title, "Page opened");

    let opener: Arc<dyn LinkOpener> = match &cli.command {
        Command::Download {
            output: Some(dir), ..
        } => Arc::new(SaveToDirOpener::new(Arc::clone(&client), dir)),
        _ => Arc::new(PrintOpener),
    };

    let popup = Popup::new(
        Arc::new(TerminalSurface::new()),
        Arc::new(FileStore::new(&config.store_path)),
        client,
        Arc::new(PageTab::open(page, &config)),
        opener,
    )
    .with_reveal_speed(config.reveal_speed);

    let opened = popup.open().await?;

    match cli.command {
        Command::Summarize { detail, .. } => {
            let state = popup.summarize(detail).await?;
            popup.wait_for_reveal().await;
            println!();
            if state == PopupState::Error {
                std::process::exit(1);
            }
        }
        Command::Show { .. } => {}
        Command::Download { .. } => {
            if opened != PopupState::Displayed {
                error!("No summary available to download");
                std::process::exit(1);
            }
            popup.download().await?;
        }
        Command::Clear { .. } => {
            popup.clear().await?;
        }
    }

    Ok(())
}

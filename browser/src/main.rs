//! Terminal front-end for the character core.
//!
//! `list` walks pages the way the list screen does on scroll; `show` loads
//! one character the way the detail screen does on focus.

mod fetcher;

use std::path::PathBuf;

use anyhow::Result;
use character_core::{
    CharacterCard, CharacterClient, ClientConfig, DetailController, DetailView, Labels,
    ListController, ListView, RemoteSource,
};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use fetcher::ReqwestFetcher;

#[derive(Parser, Debug)]
#[command(about = "Browse characters from the terminal")]
struct Cli {
    /// TOML file with client settings.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Overrides the configured API base URL.
    #[arg(long)]
    base_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load the first page, then request more pages.
    List {
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// Load a single character.
    Show { id: u32 },
}

fn card_line(card: &CharacterCard, labels: &Labels) -> String {
    format!(
        "{}  {}: {}  {}: {}",
        card.name,
        labels.species_caption,
        card.species_label,
        labels.status_caption,
        card.status,
    )
}

fn render_list(view: &ListView, labels: &Labels) -> String {
    let mut out = String::new();
    for row in &view.rows {
        out.push_str(&format!("[{}] {}\n", row.key, card_line(&row.card, labels)));
    }
    if view.loading_footer {
        out.push_str("...\n");
    }
    out
}

fn render_detail(view: &DetailView, labels: &Labels) -> String {
    match view {
        DetailView::Loading => "...".to_string(),
        DetailView::NotFound(message) => message.to_string(),
        DetailView::Loaded(card) => format!("#{} {}\n{}", card.id, card_line(card, labels), card.image),
    }
}

/// Config file and environment first, then command-line overrides.
fn resolve_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config = ClientConfig::load(cli.config.as_deref())?;
    if let Some(base_url) = &cli.base_url {
        config.set_base_url(base_url.as_str())?;
    }
    Ok(config)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    let labels = config.labels();
    let source = RemoteSource::new(CharacterClient::new(&config.base_url), ReqwestFetcher::default());

    match cli.command {
        Command::List { pages } => {
            let list = ListController::with_threshold(source, config.end_reached_threshold);
            list.activate().await;
            for _ in 1..pages {
                list.end_reached().await;
            }
            print!("{}", render_list(&list.view(&labels), &labels));
        }
        Command::Show { id } => {
            let detail = DetailController::with_policy(source, config.stale_policy);
            detail.focus(id).await;
            println!("{}", render_detail(&detail.view(&labels), &labels));
        }
    }

    Ok(())
}

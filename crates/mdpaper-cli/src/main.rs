use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use mdpaper_core::AppConfig;
use mdpaper_science::http::ClientConfig;
use mdpaper_science::pdf::{HttpPdfFetcher, LopdfExtractor};
use mdpaper_science::{MarkerPipeline, PdfRenamer, Resolver};

// ─── CLI Definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "md-paper",
    about = "Turn literature markers in Markdown notes into citation lines and keep PDF folders tidy",
    version,
    long_about = None
)]
struct Cli {
    /// Markdown note, or a directory of notes with --output.
    #[arg(short, long)]
    input: PathBuf,

    /// Directory receiving downloaded PDFs; rewrites markers in the input.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Directory of PDFs to rename after their titles; the input note lists them.
    #[arg(short, long)]
    rename: Option<PathBuf>,

    /// Proxy for every request, e.g. 127.0.0.1:7890.
    #[arg(short, long)]
    proxy: Option<String>,

    /// Config file (default: $MDPAPER_CONFIG or ~/.config/md-paper/config.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Debug logging.
    #[arg(short, long)]
    verbose: bool,
}

// ─── Main ────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    let mut config = load_config(&cli);
    if cli.proxy.is_some() {
        config.set_proxy(cli.proxy.clone());
    }

    if cli.rename.is_none() && cli.output.is_none() {
        info!("nothing to do: pass --output to rewrite markers or --rename to rename PDFs");
        return Ok(());
    }

    let resolver = match Resolver::from_config(&config) {
        Ok(resolver) => Arc::new(resolver),
        Err(err) => {
            error!("cannot build HTTP clients: {err}");
            return Ok(());
        }
    };

    if let Some(pdf_dir) = &cli.rename {
        let renamer = PdfRenamer::new(
            resolver.clone(),
            Arc::new(LopdfExtractor),
            config.pdf.max_pages,
        );
        match renamer.reconcile(pdf_dir, &cli.input).await {
            Ok(summary) => info!(
                "rename finished: {} renamed, {} kept, {} replaced, {} appended",
                summary.renamed, summary.kept, summary.replaced, summary.appended
            ),
            Err(err) => error!("rename failed: {err}"),
        }
    }

    if let Some(pdf_dir) = &cli.output {
        let fetcher = match HttpPdfFetcher::new(&ClientConfig::from(&config.network)) {
            Ok(fetcher) => Arc::new(fetcher),
            Err(err) => {
                error!("cannot build PDF client: {err}");
                return Ok(());
            }
        };
        let pipeline = MarkerPipeline::new(resolver, fetcher);

        if cli.input.is_dir() {
            match pipeline
                .update_notes_in(&cli.input, &config.notes.extensions, pdf_dir)
                .await
            {
                Ok(reports) => {
                    let written = reports.iter().filter(|r| r.written).count();
                    info!("{written} of {} notes updated", reports.len());
                }
                Err(err) => error!("failed to scan {}: {err}", cli.input.display()),
            }
        } else if let Err(err) = pipeline.update_note(&cli.input, pdf_dir).await {
            error!("failed to update {}: {err}", cli.input.display());
        }
    }

    Ok(())
}

fn load_config(cli: &Cli) -> AppConfig {
    let loaded = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };
    loaded.unwrap_or_else(|err| {
        warn!("config not loaded, using defaults: {err}");
        AppConfig::default()
    })
}

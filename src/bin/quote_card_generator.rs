use anyhow::{Context, Result, anyhow};
use clap::Parser;
use quotecard::card::{CardRenderer, ExportStrategy};
use quotecard::theme::Theme;
use quotecard::view::{ProxyClient, QuoteView};
use std::fs;
use std::path::PathBuf;
use url::Url;

/// Generate a themed AI quote card against a running quotecard server.
///
/// Minimal UX:
///   quote_card_generator love
#[derive(Parser, Debug)]
#[command(name = "quote_card_generator")]
#[command(about = "Fetch a themed quote and background photo, then render a quote card PNG")]
struct Args {
    /// Quote theme (inspirational, love, business, humour, motivational)
    theme: Theme,

    /// Base URL of the running quotecard server
    #[arg(long, default_value = "http://127.0.0.1:9000", env = "QUOTECARD_SERVER")]
    server: String,

    /// Export strategy: "manual" draws the fixed 800x400 canvas, "snapshot"
    /// reproduces the on-screen card at 2x
    #[arg(long, default_value = "manual")]
    strategy: ExportStrategy,

    /// Output directory (the file name inside it is derived from the strategy)
    #[arg(long, default_value = "./cards", env = "QUOTECARD_OUT_DIR")]
    out_dir: PathBuf,

    /// TTF font used for the card text
    #[arg(
        long,
        default_value = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        env = "QUOTECARD_FONT"
    )]
    font_path: PathBuf,
}

/// Downloads and fully decodes the background photo before any drawing.
async fn fetch_background(raw_url: &str) -> Result<image::DynamicImage> {
    let url = Url::parse(raw_url).with_context(|| format!("Invalid background URL: {raw_url}"))?;

    let response = reqwest::get(url)
        .await
        .with_context(|| format!("Failed to download {raw_url}"))?;
    let status = response.status();
    if !status.is_success() {
        return Err(anyhow!("Background download error {status} for {raw_url}"));
    }
    let bytes = response
        .bytes()
        .await
        .context("Failed to read background image bytes")?;

    image::load_from_memory(&bytes).context("Failed to decode background image")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let renderer = CardRenderer::from_font_file(&args.font_path)?;

    let view = QuoteView::new(ProxyClient::new(&args.server), args.theme);

    view.refresh_background().await;
    view.generate().await;

    let state = view.state().await;
    if state.error {
        return Err(anyhow!("Failed to fetch quote. Please try again."));
    }
    let Some(quote) = state.quote else {
        return Err(anyhow!("No quote in view state after a successful request"));
    };

    let background = match state.background_url.as_deref() {
        Some(raw_url) => Some(fetch_background(raw_url).await?),
        None => None,
    };

    let card = renderer.export(args.strategy, &quote, state.theme, background.as_ref())?;

    let output_filename = args.out_dir.join(&card.file_name);
    if output_filename.exists() {
        return Err(anyhow!(
            "Card already exists: {}",
            output_filename.display()
        ));
    }

    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("Failed to create {}", args.out_dir.display()))?;
    fs::write(&output_filename, &card.png)
        .with_context(|| format!("Failed to write {}", output_filename.display()))?;

    eprintln!("Saved: {}", output_filename.display());
    Ok(())
}

use clap::Parser;
use quotecard::config::{AppConfig, setup_logging};
use tracing::{error, warn};

#[tokio::main(flavor = "multi_thread", worker_threads = 32)]
async fn main() {
    let cli = quotecard::cli::CliOptions::parse();

    if setup_logging(cli.debug).is_err() {
        return;
    }

    let config = AppConfig::from_env();
    if config.gemini_api_key.is_none() {
        warn!("GEMINI_API_KEY is not set; quote requests will fail");
    }
    if config.pexels_api_key.is_none() {
        warn!("PEXELS_API_KEY is not set; background image requests will fail");
    }

    if let Err(err) = quotecard::web::setup_server(&cli.listen_address, cli.port, config).await {
        error!("Application error: {}", err);
    }
}

//! Config handling

use tracing::log::LevelFilter;

use crate::constants::{GEMINI_API_BASE, PEXELS_API_BASE};

/// Sets up logging based on the debug flag
pub fn setup_logging(debug: bool) -> Result<(), Box<std::io::Error>> {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut logger = simple_logger::SimpleLogger::new().with_level(level);
    if !debug {
        logger = logger
            .with_module_level("tracing", LevelFilter::Warn)
            .with_module_level("rustls", LevelFilter::Info)
            .with_module_level("hyper_util", LevelFilter::Info)
            .with_module_level("h2", LevelFilter::Info);
    }
    logger.init().map_err(|err| {
        eprintln!("Failed to initialize logger: {}", err);
        Box::new(std::io::Error::other(err))
    })
}

/// Process-wide configuration, read from the environment once at startup and
/// immutable afterwards.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Credential for the generative-text provider, if configured.
    pub gemini_api_key: Option<String>,
    /// Credential for the photo-search provider, if configured.
    pub pexels_api_key: Option<String>,
    /// Base URL of the generative-text provider.
    pub gemini_base: String,
    /// Base URL of the photo-search provider.
    pub pexels_base: String,
}

impl AppConfig {
    /// Reads the provider credentials and optional base URL overrides from
    /// the process environment. Missing credentials are not a startup error;
    /// they surface as a 500 on the requests that need them.
    pub fn from_env() -> Self {
        Self {
            gemini_api_key: non_empty_var("GEMINI_API_KEY"),
            pexels_api_key: non_empty_var("PEXELS_API_KEY"),
            gemini_base: non_empty_var("GEMINI_API_BASE")
                .unwrap_or_else(|| GEMINI_API_BASE.to_string()),
            pexels_base: non_empty_var("PEXELS_API_BASE")
                .unwrap_or_else(|| PEXELS_API_BASE.to_string()),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

//! CLI parser
use clap::Parser;
use std::num::NonZeroU16;

#[derive(Parser, Debug)]
/// CLI Options
pub struct CliOptions {
    #[clap(long, help = "Enable debug logging", env = "QUOTECARD_DEBUG")]
    /// Enable debug logging. Env: QUOTECARD_DEBUG
    pub debug: bool,
    #[clap(long, short, default_value = "9000", env = "QUOTECARD_PORT")]
    /// http listener, defaults to `9000`.
    /// Env: QUOTECARD_PORT
    pub port: NonZeroU16,
    #[clap(
        long,
        short,
        default_value = "127.0.0.1",
        env = "QUOTECARD_LISTEN_ADDRESS"
    )]
    /// Listen address, defaults to `127.0.0.1`.
    /// Env: QUOTECARD_LISTEN_ADDRESS
    pub listen_address: String,
}

use anyhow::Result;
use clap::Parser;
use linemark::cli::{self, Cli};

fn main() -> Result<()> {
    // Process CLI arguments first (before logging init for cleaner output)
    let cli = Cli::parse();

    // Routes all log::info!() etc. to the debug log file. When RUST_LOG is
    // set, also mirrors to stderr. --log-level wins over RUST_LOG, which wins
    // over the config file (applied after the config is loaded).
    linemark::debug::init_log_bridge(cli.log_level);
    log::info!("Starting linemark {}", linemark::VERSION);

    let result = cli::run(cli);
    if let Err(e) = &result {
        log::error!("{e:#}");
    }
    log::logger().flush();
    result
}

//! Fixed-interval random-path load generator.

use std::time::Duration;

use clap::Parser;

use chaos_demo::loadgen::{self, LoadGenConfig};
use chaos_demo::observability::logging;
use chaos_demo::Shutdown;

#[derive(Parser)]
#[command(name = "loadgen")]
#[command(about = "Generate steady traffic against the demo API", long_about = None)]
struct Cli {
    /// Base URL of the target API.
    #[arg(short, long, env = "TARGET", default_value = "http://api:8080")]
    target: String,

    /// Seconds to sleep between requests.
    #[arg(short, long, env = "SLEEP", default_value_t = 0.2)]
    sleep: f64,

    /// Per-request timeout in seconds.
    #[arg(long, env = "TIMEOUT", default_value_t = 1.5)]
    timeout: f64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init_console("chaos_demo=info,loadgen=info");

    let config = LoadGenConfig {
        target: cli.target,
        interval: Duration::try_from_secs_f64(cli.sleep)?,
        timeout: Duration::try_from_secs_f64(cli.timeout)?,
    };

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    loadgen::run(config, shutdown.subscribe()).await?;
    Ok(())
}

//! Webhook receiver that logs incoming alert notifications.

use clap::Parser;
use tokio::net::TcpListener;

use chaos_demo::observability::logging;
use chaos_demo::{alerts, Shutdown};

#[derive(Parser)]
#[command(name = "alert-logger")]
#[command(about = "Log alert webhook payloads", long_about = None)]
struct Cli {
    #[arg(short, long, env = "ALERT_LOGGER_BIND", default_value = "0.0.0.0:8081")]
    bind: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init_console("chaos_demo=info,alert_logger=info");

    let listener = TcpListener::bind(&cli.bind).await?;
    tracing::info!(address = %listener.local_addr()?, "alert-logger listening");

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();
    let mut stop = shutdown.subscribe();

    axum::serve(listener, alerts::router())
        .with_graceful_shutdown(async move {
            let _ = stop.recv().await;
        })
        .await?;

    tracing::info!("alert-logger stopped");
    Ok(())
}

use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "chaos-cli")]
#[command(about = "Management CLI for the chaos demo API", long_about = None)]
struct Cli {
    #[arg(short, long, env = "CHAOS_API_URL", default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show current chaos settings
    Status,
    /// Set injected latency in milliseconds (negative values become 0)
    Latency {
        #[arg(allow_hyphen_values = true)]
        ms: i64,
    },
    /// Set injected error probability (clamped to 0..=1)
    Errors {
        #[arg(allow_hyphen_values = true)]
        rate: f64,
    },
    /// Disable all chaos
    Reset,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let res = match cli.command {
        Commands::Status => client.get(format!("{base}/api/chaos")).send().await?,
        Commands::Latency { ms } => {
            client
                .post(format!("{base}/api/chaos/latency"))
                .query(&[("ms", ms)])
                .send()
                .await?
        }
        Commands::Errors { rate } => {
            client
                .post(format!("{base}/api/chaos/errors"))
                .query(&[("rate", rate)])
                .send()
                .await?
        }
        Commands::Reset => client.delete(format!("{base}/api/chaos")).send().await?,
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

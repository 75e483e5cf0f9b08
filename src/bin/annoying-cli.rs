use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "annoying-cli")]
#[command(about = "Management CLI for the annoying-client control plane", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:9900")]
    url: String,

    #[arg(short = 'U', long, default_value = "annoying")]
    username: String,

    #[arg(short, long, env = "ANNOYING_PASSWORD", default_value = "test")]
    password: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show request statistics
    Stats,
    /// Merge a partial JSON configuration into the running one
    Configure {
        /// JSON object, e.g. '{"parallel": 20}'
        json: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Stats => {
            let res = client.get(format!("{}/", base)).send().await?;
            print_response(res).await?;
        }
        Commands::Configure { json } => {
            let body: Value = serde_json::from_str(&json)?;
            let res = client
                .put(format!("{}/config", base))
                .basic_auth(&cli.username, Some(&cli.password))
                .json(&body)
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: control plane returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "runtime-config-cli")]
#[command(about = "Inspect the runtime config served by a running daemon", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:9009")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the current runtime config
    Show,
    /// Print only the overrides that differ from the defaults
    Diff,
    /// Check whether the runtime config has loaded
    Ready,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Show => {
            let res = client.get(format!("{}/runtime_config", cli.url)).send().await?;
            print_text(res).await?;
        }
        Commands::Diff => {
            let res = client
                .get(format!("{}/runtime_config", cli.url))
                .query(&[("mode", "diff")])
                .send()
                .await?;
            print_text(res).await?;
        }
        Commands::Ready => {
            let res = client.get(format!("{}/ready", cli.url)).send().await?;
            let status = res.status();
            let json: Value = res.json().await?;
            println!("{}", serde_json::to_string_pretty(&json)?);
            if !status.is_success() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

async fn print_text(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    if !status.is_success() {
        eprintln!("Error: daemon returned status {}", status);
        eprintln!("{}", text);
        std::process::exit(1);
    }
    print!("{}", text);
    Ok(())
}

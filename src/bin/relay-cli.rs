//! Operator CLI for a running relay front end.

use clap::{Parser, Subcommand};
use serde_json::Value;
use tokio::sync::broadcast;

use relay_front::config::ClientConfig;
use relay_front::relay::RelayClient;

#[derive(Parser)]
#[command(name = "relay-cli")]
#[command(about = "Management CLI for the relay front end", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk the backend health ladder
    Status,
    /// Show the front-end host name
    Hostname,
    /// Show CPU and memory usage of the front end
    ServerStatus,
    /// Dump today's access log
    Logs,
    /// Connect to the relay endpoint and print each received frame
    Watch {
        /// Relay endpoint host
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Relay endpoint port
        #[arg(long, default_value_t = 8080)]
        port: u16,

        /// Use wss:// instead of ws://
        #[arg(long)]
        secure: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Status => {
            let res = client
                .get(format!("{}/checkServerStatus", cli.url))
                .send()
                .await?;
            print_json(res).await?;
        }
        Commands::Hostname => {
            let res = client.get(format!("{}/hostname", cli.url)).send().await?;
            print_json(res).await?;
        }
        Commands::ServerStatus => {
            let res = client
                .get(format!("{}/server-status", cli.url))
                .send()
                .await?;
            print_json(res).await?;
        }
        Commands::Logs => {
            let res = client.get(format!("{}/logs", cli.url)).send().await?;
            let status = res.status();
            let text = res.text().await?;
            if status.is_success() {
                println!("{text}");
            } else {
                eprintln!("Error: {status}: {text}");
            }
        }
        Commands::Watch { host, port, secure } => {
            watch(host, port, secure).await;
        }
    }

    Ok(())
}

/// Run the relay client and print every frame that lands in the display
/// region. Reconnects forever; stop with Ctrl+C.
async fn watch(host: String, port: u16, secure: bool) {
    let config = ClientConfig {
        secure,
        host,
        port,
        ..ClientConfig::default()
    };

    let (relay, mut display) = RelayClient::new(config);
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

    let client_task = tokio::spawn(relay.run(shutdown_rx));

    loop {
        tokio::select! {
            changed = display.changed() => {
                if changed.is_err() {
                    break;
                }
                println!("{}", display.borrow_and_update().as_str());
            }
            _ = tokio::signal::ctrl_c() => {
                let _ = shutdown_tx.send(());
                break;
            }
        }
    }

    let _ = client_task.await;
}

async fn print_json(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: front end returned status {status}");
        if let Ok(text) = res.text().await {
            eprintln!("Response: {text}");
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

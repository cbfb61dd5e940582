use std::io::Write;

use clap::{Parser, Subcommand};
use futures_util::StreamExt;
use serde_json::{Map, Value};

#[derive(Parser)]
#[command(name = "installer-cli")]
#[command(about = "Client for the installer bridge service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:5001")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the installer document as JSON
    Show,
    /// Update values, e.g. `set precheck=false controller.namespace=egs`
    Set {
        /// KEY=VALUE pairs; VALUE is read as JSON when it parses, else as text
        #[arg(required = true)]
        assignments: Vec<String>,
    },
    /// Run the install script and follow its output
    Install,
    /// Run the uninstall script and follow its output
    Uninstall,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Show => {
            let res = client.get(format!("{}/config", cli.url)).send().await?;
            print_response(res).await?;
        }
        Commands::Set { assignments } => {
            let update = parse_assignments(&assignments)?;
            let res = client
                .post(format!("{}/config", cli.url))
                .json(&update)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Install => follow(&client, &format!("{}/install", cli.url)).await?,
        Commands::Uninstall => follow(&client, &format!("{}/uninstall", cli.url)).await?,
    }

    Ok(())
}

fn parse_assignments(assignments: &[String]) -> Result<Value, Box<dyn std::error::Error>> {
    let mut update = Map::new();
    for assignment in assignments {
        let (key, raw) = assignment
            .split_once('=')
            .ok_or_else(|| format!("expected KEY=VALUE, got `{}`", assignment))?;
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        update.insert(key.to_string(), value);
    }
    Ok(Value::Object(update))
}

/// Print streamed frames as they arrive.
async fn follow(client: &reqwest::Client, url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let res = client.post(url).send().await?;
    if !res.status().is_success() {
        return print_response(res).await;
    }

    let mut stdout = std::io::stdout();
    let mut pending: Vec<u8> = Vec::new();
    let mut chunks = res.bytes_stream();
    while let Some(chunk) = chunks.next().await {
        pending.extend_from_slice(&chunk?);
        // Chunks need not end on a line boundary.
        while let Some(pos) = pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = pending.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line[..pos]);
            if !line.is_empty() && line != "data: " {
                writeln!(stdout, "{}", line.strip_prefix("data: ").unwrap_or(&line))?;
            }
        }
        stdout.flush()?;
    }
    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: service returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

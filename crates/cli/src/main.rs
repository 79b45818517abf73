// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `kari`: the operator CLI. A thin HTTP client over the brain's
//! three-endpoint surface (spec §6) — no host mutation happens here.

mod client;
mod env;
mod error;
mod output;

use clap::{Parser, Subcommand};
use client::{ActivateSiteRequest, BrainClient, OnboardServerRequest};
use error::CliError;
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "kari", about = "Operator CLI for the Karı control plane")]
struct Cli {
    /// Base URL of the brain's HTTP surface. Overrides `BRAIN_URL`.
    #[arg(long, global = true)]
    brain_url: Option<String>,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Site lifecycle commands.
    Site {
        #[command(subcommand)]
        command: SiteCommand,
    },
    /// Server lifecycle commands.
    Server {
        #[command(subcommand)]
        command: ServerCommand,
    },
    /// Check whether the brain reports itself healthy.
    Status,
}

#[derive(Subcommand)]
enum SiteCommand {
    /// Start activation for a site.
    Activate {
        #[arg(long)]
        id: String,
        #[arg(long)]
        domain: String,
        #[arg(long)]
        ipv4: Option<String>,
        #[arg(long)]
        ipv6: Option<String>,
        #[arg(long)]
        owner_uid: i64,
    },
}

#[derive(Subcommand)]
enum ServerCommand {
    /// Run eligibility checks and record a server for onboarding.
    Onboard {
        #[arg(long)]
        id: String,
        #[arg(long)]
        address: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let base_url = cli.brain_url.clone().unwrap_or_else(env::brain_url);
    let client = BrainClient::new(base_url);

    let result = match cli.command {
        Command::Site { command: SiteCommand::Activate { id, domain, ipv4, ipv6, owner_uid } } => {
            run_activate(&client, cli.format, id, domain, ipv4, ipv6, owner_uid).await
        }
        Command::Server { command: ServerCommand::Onboard { id, address } } => {
            run_onboard(&client, cli.format, id, address).await
        }
        Command::Status => run_status(&client, cli.format).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(e.exit_code());
    }
}

async fn run_activate(
    client: &BrainClient,
    format: OutputFormat,
    id: String,
    domain: String,
    ipv4: Option<String>,
    ipv6: Option<String>,
    owner_uid: i64,
) -> Result<(), CliError> {
    let response = client.activate_site(&ActivateSiteRequest { id, domain, ipv4, ipv6, owner_uid }).await?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "status": response.status })),
        OutputFormat::Text => println!("activation started: {}", response.status),
    }
    Ok(())
}

async fn run_onboard(
    client: &BrainClient,
    format: OutputFormat,
    id: String,
    address: String,
) -> Result<(), CliError> {
    let response = client.onboard_server(&OnboardServerRequest { id, address }).await?;
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::json!({ "status": response.status, "report": response.report }))
        }
        OutputFormat::Text => {
            println!("onboarded: {}", response.status);
            println!("{}", serde_json::to_string_pretty(&response.report).unwrap_or_default());
        }
    }
    Ok(())
}

async fn run_status(client: &BrainClient, format: OutputFormat) -> Result<(), CliError> {
    let healthy = client.healthy().await?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "healthy": healthy })),
        OutputFormat::Text => println!("brain: {}", if healthy { "healthy" } else { "unhealthy" }),
    }
    Ok(())
}

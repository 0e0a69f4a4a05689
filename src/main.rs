//! M2X command-line client.
//!
//! Thin wrapper around the library for quick inspection of an account.

use std::process::ExitCode;

use clap::Parser;
use serde_json::Value;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use m2x::client::request::params_from_pairs;
use m2x::config::{Args, ClientConfig, Command, TimeFormat};
use m2x::error::Result;
use m2x::{Client, RequestSpec, Response, VERSION};

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize logging
    let default_level = if args.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match execute(args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn execute(args: Args) -> Result<bool> {
    let config = ClientConfig::from(&args);
    debug!("M2X client v{} against {}", VERSION, config.api_base);

    let client = Client::new(config)?;
    run(&client, args.command).await
}

async fn run(client: &Client, command: Command) -> Result<bool> {
    match command {
        Command::Status => Ok(print_response(&client.status().await?)),
        Command::Time { format } => {
            let text = match format {
                TimeFormat::Json => serde_json::to_string_pretty(&client.time().await?)?,
                TimeFormat::Seconds => client.time_seconds().await?,
                TimeFormat::Millis => client.time_millis().await?,
                TimeFormat::Iso8601 => client.time_iso8601().await?,
            };
            println!("{}", text);
            Ok(true)
        }
        Command::Request {
            verb,
            path,
            query,
            json,
            headers,
        } => {
            let mut spec = RequestSpec::new(verb, path);
            if !query.is_empty() {
                spec = spec.query(params_from_pairs(query));
            }
            if let Some(body) = json {
                spec = spec.json(serde_json::from_str::<Value>(&body)?);
            }
            for (name, value) in headers {
                spec = spec.header(name, value);
            }
            Ok(print_response(&client.call(spec).await?))
        }
        Command::Devices { query } => {
            let devices = client.devices().list(params_from_pairs(query)).await?;
            info!("{} devices", devices.len());
            println!("{}", serde_json::to_string_pretty(&devices)?);
            Ok(true)
        }
    }
}

/// Print the body to stdout, pretty-printing JSON; report the status on stderr.
fn print_response(response: &Response) -> bool {
    info!("{} {}", response.status(), response.status_text());
    match response.json() {
        Ok(json) => match serde_json::to_string_pretty(json) {
            Ok(pretty) => println!("{}", pretty),
            Err(_) => println!("{}", response.raw()),
        },
        Err(_) => println!("{}", response.raw()),
    }
    response.is_success()
}

//! Configuration for the M2X client and the `m2x` command-line tool.

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::client::request::Verb;
use crate::error::{Error, Result};

/// Production API endpoint.
pub const DEFAULT_API_BASE: &str = "https://api-m2x.att.com";

/// API generation used for unversioned paths.
pub const DEFAULT_API_VERSION: &str = "v2";

/// Connection settings for one [`Client`](crate::Client).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// API key sent as `X-M2X-KEY`
    pub api_key: Option<String>,
    /// Root URL of the API
    pub api_base: String,
    /// Version segment injected into unversioned paths
    pub api_version: String,
    /// PEM bundle replacing the built-in trusted roots
    pub ca_file: Option<PathBuf>,
    /// Whole-request timeout; none unless set
    pub timeout_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            ca_file: None,
            timeout_secs: None,
        }
    }
}

impl ClientConfig {
    /// Defaults with the given API key.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    pub fn api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// Read `M2X_API_KEY`, `M2X_API_BASE`, `M2X_API_VERSION`, `M2X_CA_FILE`
    /// and `M2X_TIMEOUT` from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup; unset or empty variables keep
    /// their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        config.api_key = var("M2X_API_KEY");
        if let Some(base) = var("M2X_API_BASE") {
            config.api_base = base;
        }
        if let Some(version) = var("M2X_API_VERSION") {
            config.api_version = version;
        }
        config.ca_file = var("M2X_CA_FILE").map(PathBuf::from);
        config.timeout_secs = var("M2X_TIMEOUT")
            .map(|v| {
                v.trim()
                    .parse::<u64>()
                    .map_err(|_| Error::config(format!("M2X_TIMEOUT must be a number of seconds, got `{}`", v)))
            })
            .transpose()?;

        Ok(config)
    }
}

/// Command-line arguments for the `m2x` tool.
#[derive(Parser, Debug, Clone)]
#[command(name = "m2x")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Command-line access to the M2X IoT data platform API")]
pub struct Args {
    /// M2X API key
    #[arg(long, env = "M2X_API_KEY", global = true, hide_env_values = true)]
    pub api_key: Option<String>,

    /// API root URL
    #[arg(long, default_value = DEFAULT_API_BASE, env = "M2X_API_BASE", global = true)]
    pub api_base: String,

    /// API version segment for unversioned paths
    #[arg(long, default_value = DEFAULT_API_VERSION, env = "M2X_API_VERSION", global = true)]
    pub api_version: String,

    /// PEM bundle of trusted CA certificates
    #[arg(long, env = "M2X_CA_FILE", global = true)]
    pub ca_file: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, env = "M2X_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Enable debug logging
    #[arg(short, long, env = "M2X_DEBUG", global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Show the status of the M2X subsystems
    Status,

    /// Show the server time
    Time {
        #[arg(long, value_enum, default_value = "json")]
        format: TimeFormat,
    },

    /// Send an arbitrary request
    Request {
        /// HTTP verb
        #[arg(value_enum, ignore_case = true)]
        verb: Verb,

        /// Logical API path, e.g. /devices
        path: String,

        /// Query parameter as key=value; repeat a key for arrays
        #[arg(short, long = "query", value_parser = parse_key_value)]
        query: Vec<(String, String)>,

        /// JSON request body
        #[arg(long)]
        json: Option<String>,

        /// Extra header as name:value
        #[arg(short = 'H', long = "header", value_parser = parse_header)]
        headers: Vec<(String, String)>,
    },

    /// List devices visible to the API key
    Devices {
        /// Filter as key=value
        #[arg(short, long = "query", value_parser = parse_key_value)]
        query: Vec<(String, String)>,
    },
}

/// Server time representations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeFormat {
    #[default]
    Json,
    Seconds,
    Millis,
    Iso8601,
}

impl From<&Args> for ClientConfig {
    fn from(args: &Args) -> Self {
        Self {
            api_key: args.api_key.clone(),
            api_base: args.api_base.clone(),
            api_version: args.api_version.clone(),
            ca_file: args.ca_file.clone(),
            timeout_secs: args.timeout,
        }
    }
}

/// Parse `key=value`.
pub fn parse_key_value(s: &str) -> std::result::Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected key=value, got `{}`", s))
}

/// Parse `name:value`.
pub fn parse_header(s: &str) -> std::result::Result<(String, String), String> {
    s.split_once(':')
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected name:value, got `{}`", s))
}

//! M2X Client - Rust Implementation
//!
//! An async client for the M2X IoT data platform REST API: devices, streams,
//! collections, distributions, keys, commands, jobs, batches, blueprints and
//! integrations.
//!
//! # Architecture
//!
//! 1. **Client Layer** (`client`) - Request gateway, response envelope, transport
//! 2. **Resource Layer** (`resources`) - One handle per API resource family
//! 3. **Configuration** (`config`) - Client settings and CLI arguments
//!
//! # Example
//!
//! ```no_run
//! use m2x::{Client, ClientConfig, RequestSpec};
//! use serde_json::json;
//!
//! # async fn run() -> m2x::Result<()> {
//! let client = Client::new(ClientConfig::with_api_key("<API-KEY>"))?;
//!
//! let devices = client.devices().list(Default::default()).await?;
//! println!("{} devices", devices.len());
//!
//! let response = client
//!     .call(RequestSpec::put("/devices/abc/streams/temperature/value").json(json!({"value": 21.5})))
//!     .await?;
//! assert!(response.is_success());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod resources;

pub use client::{Client, Params, RequestSpec, Response, Transport, Verb};
pub use config::ClientConfig;
pub use error::{Error, Result};

/// Client version reported in the user agent.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

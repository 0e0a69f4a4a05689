//! Request gateway for the M2X API.
//!
//! Every API call funnels through [`Client::call`]: the logical path is
//! version-qualified, the query and body are encoded, default headers are
//! merged with the caller's, and the transport result is wrapped in a
//! [`Response`].

use std::sync::{Arc, Mutex, PoisonError};

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::client::request::{
    as_params, encode_body, encode_form, has_dot_segment, merge_headers, versioned_path,
    RequestSpec,
};
use crate::client::response::Response;
use crate::client::transport::{HttpRequest, ReqwestTransport, Transport};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::resources::{
    Batches, Blueprints, Collections, Commands, Devices, Distributions, Integrations, Jobs, Keys,
    Streams,
};
use crate::VERSION;

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "X-M2X-KEY";

/// User agent string identifying the client and runtime.
pub fn user_agent() -> String {
    format!(
        "M2X-Rust/{} rust ({}-{})",
        VERSION,
        std::env::consts::ARCH,
        std::env::consts::OS
    )
}

/// API client for the M2X platform.
///
/// Configuration is fixed at construction; independent clients with different
/// keys or endpoints do not share state.
#[derive(Debug, Clone)]
pub struct Client {
    config: Arc<ClientConfig>,
    transport: Arc<dyn Transport>,
    default_headers: HeaderMap,
    last_response: Arc<Mutex<Option<Response>>>,
}

impl Client {
    /// Create a client backed by [`ReqwestTransport`].
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(&config)?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Create a client against the production endpoint.
    pub fn from_api_key(api_key: impl Into<String>) -> Result<Self> {
        Self::new(ClientConfig::with_api_key(api_key))
    }

    /// Create a client with a custom transport.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        let default_headers = default_headers(&config)?;
        Ok(Self {
            config: Arc::new(config),
            transport,
            default_headers,
            last_response: Arc::new(Mutex::new(None)),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Headers sent with every request unless overridden.
    pub fn default_headers(&self) -> &HeaderMap {
        &self.default_headers
    }

    /// Envelope of the most recent completed call.
    ///
    /// Shared by clones of this client and racy under concurrent use; meant
    /// for debugging only.
    pub fn last_response(&self) -> Option<Response> {
        self.last_response
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Resolve a logical path and optional query into a full URL.
    ///
    /// Paths with `.` or `..` segments are rejected rather than resolved.
    pub fn url_for(&self, path: &str, query: Option<&Value>) -> Result<Url> {
        if has_dot_segment(path) {
            return Err(Error::config(format!(
                "Path `{}` contains a `.` or `..` segment",
                path
            )));
        }

        let base = self.config.api_base.trim_end_matches('/');
        let mut url = Url::parse(&format!(
            "{}{}",
            base,
            versioned_path(path, &self.config.api_version)
        ))?;

        if let Some(query) = as_params(query, "Query")? {
            if !query.is_empty() {
                url.set_query(Some(&encode_form(query)?));
            }
        }

        Ok(url)
    }

    /// Build the wire request for `spec` without sending it.
    pub fn prepare(&self, spec: RequestSpec) -> Result<HttpRequest> {
        let url = self.url_for(&spec.path, spec.query.as_ref())?;
        let mut headers = merge_headers(&self.default_headers, &spec.headers)?;
        let body = encode_body(spec.body.as_ref(), &mut headers)?;

        Ok(HttpRequest {
            verb: spec.verb,
            url,
            headers,
            body,
        })
    }

    /// Perform one API call.
    ///
    /// Request construction errors are returned before the transport is
    /// touched. A non-2xx status is not an error here.
    pub async fn call(&self, spec: RequestSpec) -> Result<Response> {
        let request = self.prepare(spec)?;
        let verb = request.verb;
        let url = request.url.clone();

        debug!(%verb, %url, "Sending M2X request");
        let raw = self.transport.send(request).await.map_err(|e| {
            warn!(%verb, %url, "M2X request failed: {}", e);
            e
        })?;

        let response = Response::from(raw);
        debug!(%verb, %url, status = response.status(), "Received M2X response");

        // Recover the slot if a previous holder panicked
        *self
            .last_response
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(response.clone());

        Ok(response)
    }

    // ===== System Endpoints =====

    /// Status of the M2X subsystems.
    pub async fn status(&self) -> Result<Response> {
        self.call(RequestSpec::get("/status")).await
    }

    /// Server time in all supported representations.
    pub async fn time(&self) -> Result<Value> {
        let response = self.call(RequestSpec::get("/time")).await?.error_for_status()?;
        let time = response.json()?.clone();
        Ok(time)
    }

    /// Server time as seconds since the epoch.
    pub async fn time_seconds(&self) -> Result<String> {
        self.time_raw("/time/seconds").await
    }

    /// Server time as milliseconds since the epoch.
    pub async fn time_millis(&self) -> Result<String> {
        self.time_raw("/time/millis").await
    }

    /// Server time as an ISO 8601 timestamp.
    pub async fn time_iso8601(&self) -> Result<String> {
        self.time_raw("/time/iso8601").await
    }

    async fn time_raw(&self, path: &str) -> Result<String> {
        let response = self.call(RequestSpec::get(path)).await?.error_for_status()?;
        Ok(response.raw().trim().to_string())
    }

    // ===== Resource Families =====

    pub fn devices(&self) -> Devices<'_> {
        Devices::new(self)
    }

    /// Data streams of one device.
    pub fn streams(&self, device_id: &str) -> Streams<'_> {
        Streams::new(self, device_id)
    }

    pub fn collections(&self) -> Collections<'_> {
        Collections::new(self)
    }

    pub fn distributions(&self) -> Distributions<'_> {
        Distributions::new(self)
    }

    pub fn keys(&self) -> Keys<'_> {
        Keys::new(self)
    }

    pub fn commands(&self) -> Commands<'_> {
        Commands::new(self)
    }

    pub fn jobs(&self) -> Jobs<'_> {
        Jobs::new(self)
    }

    pub fn batches(&self) -> Batches<'_> {
        Batches::new(self)
    }

    pub fn blueprints(&self) -> Blueprints<'_> {
        Blueprints::new(self)
    }

    pub fn integrations(&self) -> Integrations<'_> {
        Integrations::new(self)
    }
}

fn default_headers(config: &ClientConfig) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    let agent = HeaderValue::from_str(&user_agent())
        .map_err(|e| Error::config(format!("Invalid user agent: {}", e)))?;
    headers.insert(USER_AGENT, agent);

    if let Some(key) = &config.api_key {
        let mut value = HeaderValue::from_str(key)
            .map_err(|_| Error::config("API key contains characters not allowed in a header"))?;
        value.set_sensitive(true);
        let name = HeaderName::from_bytes(API_KEY_HEADER.as_bytes())
            .map_err(|e| Error::config(format!("Invalid API key header name: {}", e)))?;
        headers.insert(name, value);
    }

    Ok(headers)
}

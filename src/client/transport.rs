//! Transport seam between the gateway and the network.
//!
//! The gateway builds a fully qualified [`HttpRequest`] and hands it to a
//! [`Transport`]. [`ReqwestTransport`] is the production implementation;
//! tests substitute recording doubles.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Certificate, Client};
use tracing::debug;
use url::Url;

use crate::client::request::Verb;
use crate::config::ClientConfig;
use crate::error::{Error, Result};

/// A fully resolved request, ready for the wire.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub verb: Verb,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

/// A fully buffered response as received from the wire.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

/// Performs one request/response exchange.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// `reqwest` transport over rustls.
///
/// Server certificates are validated against the built-in web PKI roots, or
/// only against the PEM bundle named by [`ClientConfig::ca_file`] when set.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = Client::builder().use_rustls_tls();

        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        if let Some(path) = &config.ca_file {
            let pem = std::fs::read(path).map_err(|e| {
                Error::config(format!("Failed to read CA bundle {}: {}", path.display(), e))
            })?;
            let certs = Certificate::from_pem_bundle(&pem).map_err(|e| {
                Error::config(format!("Invalid CA bundle {}: {}", path.display(), e))
            })?;
            if certs.is_empty() {
                return Err(Error::config(format!(
                    "No certificates found in CA bundle {}",
                    path.display()
                )));
            }
            debug!("Loaded {} trusted certificates from {}", certs.len(), path.display());

            builder = builder.tls_built_in_root_certs(false);
            for cert in certs {
                builder = builder.add_root_certificate(cert);
            }
        }

        let client = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Wrap an already configured `reqwest` client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut builder = self
            .client
            .request(request.verb.method(), request.url)
            .headers(request.headers);

        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

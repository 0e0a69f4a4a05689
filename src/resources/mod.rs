//! Resource families of the M2X API.
//!
//! Each family is a lightweight handle borrowed from a [`Client`]. Operations
//! that hand back attribute maps require a 2xx status and surface anything
//! else as [`Error::Api`]; operations returning a [`Response`] leave status
//! interpretation to the caller.
//!
//! # Families
//!
//! - `devices` - Devices, their location, values, updates and keys
//! - `streams` - Data streams belonging to a device
//! - `collections`, `distributions`, `batches`, `blueprints`, `integrations`
//! - `keys` - Master and device API keys
//! - `commands`, `jobs`
//! - `metadata` - Custom metadata shared by devices, distributions and collections

pub mod batches;
pub mod blueprints;
pub mod collections;
pub mod commands;
pub mod devices;
pub mod distributions;
pub mod integrations;
pub mod jobs;
pub mod keys;
pub mod metadata;
pub mod streams;

pub use batches::Batches;
pub use blueprints::Blueprints;
pub use collections::Collections;
pub use commands::Commands;
pub use devices::Devices;
pub use distributions::Distributions;
pub use integrations::Integrations;
pub use jobs::Jobs;
pub use keys::Keys;
pub use metadata::Metadata;
pub use streams::Streams;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde_json::Value;

use crate::client::{Client, Params, RequestSpec, Response};
use crate::error::{Error, Result};

/// Attributes of one resource as returned by the API.
pub type Attributes = Params;

const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Percent-encode an identifier for use as one path segment.
///
/// Identifiers that are exactly `.` or `..` pass through unchanged and are
/// rejected later by [`Client::url_for`].
pub(crate) fn segment(value: &str) -> String {
    utf8_percent_encode(value, PATH_SEGMENT).to_string()
}

/// Attributes from a successful response whose body is a JSON object.
pub(crate) fn attributes(response: Response) -> Result<Attributes> {
    let response = response.error_for_status()?;
    match response.json()? {
        Value::Object(map) => Ok(map.clone()),
        other => Err(Error::format(format!(
            "expected a JSON object, got {}",
            other
        ))),
    }
}

/// Attribute maps from the array under `key` of a successful response.
pub(crate) fn attribute_list(response: Response, key: &str) -> Result<Vec<Attributes>> {
    let response = response.error_for_status()?;
    let items = response
        .json()?
        .get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| Error::format(format!("response has no `{}` array", key)))?;

    items
        .iter()
        .map(|item| {
            item.as_object()
                .cloned()
                .ok_or_else(|| Error::format(format!("`{}` entry is not an object", key)))
        })
        .collect()
}

/// List/create/view/update/delete shared by the top-level families.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Crud<'a> {
    client: &'a Client,
    base: &'static str,
    list_key: &'static str,
}

impl<'a> Crud<'a> {
    pub(crate) fn new(client: &'a Client, base: &'static str, list_key: &'static str) -> Self {
        Self {
            client,
            base,
            list_key,
        }
    }

    pub(crate) fn client(&self) -> &'a Client {
        self.client
    }

    /// Path of one resource.
    pub(crate) fn path(&self, id: &str) -> String {
        format!("{}/{}", self.base, segment(id))
    }

    pub(crate) async fn list(&self, query: Params) -> Result<Vec<Attributes>> {
        self.list_at(self.base, self.list_key, query).await
    }

    pub(crate) async fn list_at(
        &self,
        path: &str,
        key: &str,
        query: Params,
    ) -> Result<Vec<Attributes>> {
        let response = self.client.call(RequestSpec::get(path).query(query)).await?;
        attribute_list(response, key)
    }

    pub(crate) async fn create(&self, body: Params) -> Result<Attributes> {
        let response = self.client.call(RequestSpec::post(self.base).json(body)).await?;
        attributes(response)
    }

    pub(crate) async fn view(&self, id: &str) -> Result<Attributes> {
        let response = self.client.call(RequestSpec::get(self.path(id))).await?;
        attributes(response)
    }

    pub(crate) async fn update(&self, id: &str, body: Params) -> Result<Response> {
        self.client
            .call(RequestSpec::put(self.path(id)).json(body))
            .await
    }

    pub(crate) async fn delete(&self, id: &str) -> Result<Response> {
        self.client.call(RequestSpec::delete(self.path(id))).await
    }

    pub(crate) fn metadata(&self, id: &str) -> Metadata<'a> {
        Metadata::new(self.client, &self.path(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::MockTransport;
    use crate::config::ClientConfig;
    use reqwest::header::HeaderMap;
    use serde_json::json;

    fn response(status: u16, body: &str) -> Response {
        Response::new(status, HeaderMap::new(), body.as_bytes().to_vec())
    }

    #[test]
    fn test_segment_encoding() {
        assert_eq!(segment("abc123"), "abc123");
        assert_eq!(segment("living room"), "living%20room");
        assert_eq!(segment("a/b?c#d"), "a%2Fb%3Fc%23d");
        assert_eq!(segment("temp-1_x.y"), "temp-1_x.y");
        assert_eq!(segment("a\\b"), "a%5Cb");
    }

    #[tokio::test]
    async fn test_identifiers_cannot_reroute_requests() {
        let transport = MockTransport::new();
        let client = Client::with_transport(ClientConfig::default(), transport.clone()).unwrap();

        client.devices().delete("a\\b").await.unwrap();
        assert_eq!(transport.paths(), vec!["/v2/devices/a%5Cb"]);

        let err = client.keys().delete("..").await.unwrap_err();
        assert!(err.is_config());
        let err = client.streams("d1").delete(".").await.unwrap_err();
        assert!(err.is_config());
        // An encoded-looking identifier is escaped, not treated as a dot segment
        assert!(client.devices().view("%2e%2e").await.is_ok());

        assert_eq!(
            transport.paths(),
            vec!["/v2/devices/a%5Cb", "/v2/devices/%252e%252e"]
        );
    }

    #[test]
    fn test_attributes_requires_object() {
        let attrs = attributes(response(200, r#"{"id":"abc","name":"x"}"#)).unwrap();
        assert_eq!(attrs["id"], "abc");

        let err = attributes(response(200, "[1]")).unwrap_err();
        assert!(matches!(err, Error::Format(_)));
    }

    #[test]
    fn test_attributes_surfaces_api_errors() {
        let err = attributes(response(404, r#"{"message":"not found"}"#)).unwrap_err();
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn test_attribute_list_extracts_array() {
        let list = attribute_list(
            response(200, r#"{"devices":[{"id":"a"},{"id":"b"}],"total":2}"#),
            "devices",
        )
        .unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(Value::Object(list[1].clone()), json!({"id": "b"}));
    }

    #[test]
    fn test_attribute_list_missing_key() {
        let err = attribute_list(response(200, r#"{"items":[]}"#), "devices").unwrap_err();
        assert!(err.to_string().contains("devices"));

        let err = attribute_list(response(200, r#"{"devices":[1]}"#), "devices").unwrap_err();
        assert!(matches!(err, Error::Format(_)));
    }
}

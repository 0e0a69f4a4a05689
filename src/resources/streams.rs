//! Data streams of a device.

use serde_json::{json, Value};

use crate::client::{Client, Params, RequestSpec, Response};
use crate::error::Result;
use crate::resources::{attribute_list, attributes, segment, Attributes};

/// Streams of one device, rooted at `/devices/{id}/streams`.
#[derive(Debug, Clone)]
pub struct Streams<'a> {
    client: &'a Client,
    base: String,
}

impl<'a> Streams<'a> {
    pub(crate) fn new(client: &'a Client, device_id: &str) -> Self {
        Self {
            client,
            base: format!("/devices/{}/streams", segment(device_id)),
        }
    }

    fn path(&self, name: &str) -> String {
        format!("{}/{}", self.base, segment(name))
    }

    fn sub_path(&self, name: &str, suffix: &str) -> String {
        format!("{}/{}", self.path(name), suffix)
    }

    pub async fn list(&self) -> Result<Vec<Attributes>> {
        let response = self.client.call(RequestSpec::get(self.base.as_str())).await?;
        attribute_list(response, "streams")
    }

    pub async fn view(&self, name: &str) -> Result<Attributes> {
        let response = self.client.call(RequestSpec::get(self.path(name))).await?;
        attributes(response)
    }

    /// Create or update a stream. The service answers `201` when the stream
    /// was created.
    pub async fn update(&self, name: &str, body: Params) -> Result<Response> {
        self.client
            .call(RequestSpec::put(self.path(name)).json(body))
            .await
    }

    /// Delete the stream and all of its values.
    pub async fn delete(&self, name: &str) -> Result<Response> {
        self.client.call(RequestSpec::delete(self.path(name))).await
    }

    /// Values in reverse chronological order.
    pub async fn values(&self, name: &str, query: Params) -> Result<Response> {
        self.get(name, "values", query).await
    }

    /// Sampled values; numeric streams only.
    pub async fn sampling(&self, name: &str, query: Params) -> Result<Response> {
        self.get(name, "sampling", query).await
    }

    /// Count, min, max, average and standard deviation; numeric streams only.
    pub async fn stats(&self, name: &str, query: Params) -> Result<Response> {
        self.get(name, "stats", query).await
    }

    /// Set the current value, at `timestamp` or the server time.
    pub async fn update_value(
        &self,
        name: &str,
        value: impl Into<Value>,
        timestamp: Option<&str>,
    ) -> Result<Response> {
        let mut body = Params::new();
        body.insert("value".to_string(), value.into());
        if let Some(at) = timestamp {
            body.insert("at".to_string(), Value::String(at.to_string()));
        }

        self.client
            .call(RequestSpec::put(self.sub_path(name, "value")).json(body))
            .await
    }

    /// Post an array of `{timestamp, value}` entries.
    pub async fn post_values(&self, name: &str, values: Vec<Value>) -> Result<Response> {
        self.client
            .call(RequestSpec::post(self.sub_path(name, "values")).json(json!({ "values": values })))
            .await
    }

    /// Delete values between two ISO 8601 timestamps.
    pub async fn delete_values(&self, name: &str, from: &str, end: &str) -> Result<Response> {
        self.client
            .call(
                RequestSpec::delete(self.sub_path(name, "values"))
                    .json(json!({ "from": from, "end": end })),
            )
            .await
    }

    async fn get(&self, name: &str, suffix: &str, query: Params) -> Result<Response> {
        self.client
            .call(RequestSpec::get(self.sub_path(name, suffix)).query(query))
            .await
    }
}

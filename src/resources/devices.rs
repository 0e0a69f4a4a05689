//! Devices API.
//!
//! Besides the usual CRUD operations a device exposes its request log,
//! current location, values across all of its streams, and bulk update
//! endpoints for posting values to several streams at once.

use serde_json::Value;

use crate::client::{Client, Params, RequestSpec, Response};
use crate::error::Result;
use crate::resources::{Attributes, Crud, Metadata, Streams};

const PATH: &str = "/devices";

#[derive(Debug, Clone, Copy)]
pub struct Devices<'a> {
    crud: Crud<'a>,
}

impl<'a> Devices<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self {
            crud: Crud::new(client, PATH, "devices"),
        }
    }

    fn client(&self) -> &'a Client {
        self.crud.client()
    }

    /// Devices accessible by the API key.
    pub async fn list(&self, query: Params) -> Result<Vec<Attributes>> {
        self.crud.list(query).await
    }

    /// Devices matching the search criteria in `query`.
    pub async fn search(&self, query: Params) -> Result<Vec<Attributes>> {
        self.crud
            .list_at(&format!("{}/search", PATH), "devices", query)
            .await
    }

    /// Public devices from the catalog.
    pub async fn catalog(&self, query: Params) -> Result<Vec<Attributes>> {
        self.crud
            .list_at(&format!("{}/catalog", PATH), "devices", query)
            .await
    }

    /// Device tags of the authenticated user.
    pub async fn tags(&self) -> Result<Response> {
        self.client()
            .call(RequestSpec::get(format!("{}/tags", PATH)))
            .await
    }

    pub async fn create(&self, body: Params) -> Result<Attributes> {
        self.crud.create(body).await
    }

    pub async fn view(&self, id: &str) -> Result<Attributes> {
        self.crud.view(id).await
    }

    pub async fn update(&self, id: &str, body: Params) -> Result<Response> {
        self.crud.update(id, body).await
    }

    pub async fn delete(&self, id: &str) -> Result<Response> {
        self.crud.delete(id).await
    }

    /// Recent HTTP requests received by the device (up to 100 entries).
    pub async fn log(&self, id: &str) -> Result<Response> {
        self.get(id, "log", Params::new()).await
    }

    /// Current location. A device without one answers `204 No Content`.
    pub async fn location(&self, id: &str) -> Result<Response> {
        self.get(id, "location", Params::new()).await
    }

    pub async fn update_location(&self, id: &str, location: Params) -> Result<Response> {
        self.client()
            .call(RequestSpec::put(self.sub_path(id, "location")).json(location))
            .await
    }

    /// Post several timestamped values to several streams.
    ///
    /// `body` holds a `values` object keyed by stream name, each an array of
    /// `{timestamp, value}` entries, and optionally a `location`.
    pub async fn post_updates(&self, id: &str, body: Params) -> Result<Response> {
        self.client()
            .call(RequestSpec::post(self.sub_path(id, "updates")).json(body))
            .await
    }

    /// Post one value to several streams, with optional `location` and
    /// `timestamp`; the server time is used when the timestamp is omitted.
    pub async fn post_update(&self, id: &str, body: Params) -> Result<Response> {
        self.client()
            .call(RequestSpec::post(self.sub_path(id, "update")).json(body))
            .await
    }

    /// Values from all data streams of the device.
    pub async fn values(&self, id: &str, query: Params) -> Result<Response> {
        self.get(id, "values", query).await
    }

    /// Values from all data streams as CSV; read the body with [`Response::raw`].
    pub async fn values_export(&self, id: &str, query: Params) -> Result<Response> {
        self.get(id, "values/export.csv", query).await
    }

    /// Search values using a JSON filter sent as the request body.
    pub async fn values_search(&self, id: &str, filter: Params) -> Result<Response> {
        self.client()
            .call(RequestSpec::get(self.sub_path(id, "values/search")).json(filter))
            .await
    }

    /// Data streams of the device.
    pub fn streams(&self, id: &str) -> Streams<'a> {
        Streams::new(self.client(), id)
    }

    /// API keys bound to the device.
    pub async fn keys(&self, id: &str) -> Result<Vec<Attributes>> {
        let mut query = Params::new();
        query.insert("device".to_string(), Value::String(id.to_string()));
        self.client().keys().list(query).await
    }

    /// Create an API key bound to the device; include `stream` in `body` to
    /// restrict it to one stream.
    pub async fn create_key(&self, id: &str, mut body: Params) -> Result<Attributes> {
        body.insert("device".to_string(), Value::String(id.to_string()));
        self.client().keys().create(body).await
    }

    pub fn metadata(&self, id: &str) -> Metadata<'a> {
        self.crud.metadata(id)
    }

    async fn get(&self, id: &str, suffix: &str, query: Params) -> Result<Response> {
        self.client()
            .call(RequestSpec::get(self.sub_path(id, suffix)).query(query))
            .await
    }

    fn sub_path(&self, id: &str, suffix: &str) -> String {
        format!("{}/{}", self.crud.path(id), suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::MockTransport;
    use crate::client::{Verb, JSON};
    use crate::config::ClientConfig;
    use reqwest::header::CONTENT_TYPE;
    use serde_json::json;
    use std::sync::Arc;

    fn setup() -> (Arc<MockTransport>, Client) {
        let transport = MockTransport::new();
        let client = Client::with_transport(ClientConfig::with_api_key("k"), transport.clone()).unwrap();
        (transport, client)
    }

    fn params(value: Value) -> Params {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_list_devices() {
        let (transport, client) = setup();
        transport.respond(
            200,
            JSON,
            r#"{"devices":[{"id":"d1","name":"thermostat"},{"id":"d2","name":"meter"}]}"#,
        );

        let devices = client
            .devices()
            .list(params(json!({"visibility": "private", "tags": ["a", "b"]})))
            .await
            .unwrap();

        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0]["name"], "thermostat");
        let sent = transport.last_request().unwrap();
        assert_eq!(sent.verb, Verb::Get);
        assert_eq!(
            sent.url.as_str(),
            "https://api-m2x.att.com/v2/devices?visibility=private&tags=a&tags=b"
        );
    }

    #[tokio::test]
    async fn test_search_and_catalog_paths() {
        let (transport, client) = setup();
        transport.respond(200, JSON, r#"{"devices":[]}"#);
        transport.respond(200, JSON, r#"{"devices":[]}"#);

        assert!(client.devices().search(Params::new()).await.unwrap().is_empty());
        assert!(client.devices().catalog(Params::new()).await.unwrap().is_empty());
        assert_eq!(
            transport.paths(),
            vec!["/v2/devices/search", "/v2/devices/catalog"]
        );
    }

    #[tokio::test]
    async fn test_list_surfaces_api_error() {
        let (transport, client) = setup();
        transport.respond(401, JSON, r#"{"message":"Unauthorized"}"#);

        let err = client.devices().list(Params::new()).await.unwrap_err();
        assert_eq!(err.status(), Some(401));
    }

    #[tokio::test]
    async fn test_create_and_view() {
        let (transport, client) = setup();
        transport.respond(201, JSON, r#"{"id":"d1","name":"thermostat"}"#);
        transport.respond(200, JSON, r#"{"id":"d1","name":"thermostat","status":"enabled"}"#);

        let created = client
            .devices()
            .create(params(json!({"name": "thermostat", "visibility": "private"})))
            .await
            .unwrap();
        assert_eq!(created["id"], "d1");

        let sent = transport.last_request().unwrap();
        assert_eq!(sent.verb, Verb::Post);
        assert_eq!(sent.headers.get(CONTENT_TYPE).unwrap(), JSON);

        let viewed = client.devices().view("d1").await.unwrap();
        assert_eq!(viewed["status"], "enabled");
        assert_eq!(transport.paths(), vec!["/v2/devices", "/v2/devices/d1"]);
    }

    #[tokio::test]
    async fn test_device_sub_resources() {
        let (transport, client) = setup();
        let devices = client.devices();

        devices.tags().await.unwrap();
        devices.log("d1").await.unwrap();
        devices.location("d1").await.unwrap();
        devices
            .update_location("d1", params(json!({"latitude": -37.97, "longitude": -57.54})))
            .await
            .unwrap();
        devices
            .post_updates("d1", params(json!({"values": {"temperature": [{"timestamp": "2024-01-01T00:00:00Z", "value": 21}]}})))
            .await
            .unwrap();
        devices
            .post_update("d1", params(json!({"values": {"temperature": 30, "humidity": 80}})))
            .await
            .unwrap();
        devices.values("d1", Params::new()).await.unwrap();
        devices
            .values_export("d1", params(json!({"streams": "temperature"})))
            .await
            .unwrap();
        devices
            .values_search("d1", params(json!({"conditions": {"temperature": {"gt": 20}}})))
            .await
            .unwrap();
        devices.update("d1", params(json!({"name": "renamed"}))).await.unwrap();
        devices.delete("d1").await.unwrap();

        assert_eq!(
            transport.paths(),
            vec![
                "/v2/devices/tags",
                "/v2/devices/d1/log",
                "/v2/devices/d1/location",
                "/v2/devices/d1/location",
                "/v2/devices/d1/updates",
                "/v2/devices/d1/update",
                "/v2/devices/d1/values",
                "/v2/devices/d1/values/export.csv",
                "/v2/devices/d1/values/search",
                "/v2/devices/d1",
                "/v2/devices/d1",
            ]
        );

        let verbs: Vec<Verb> = transport.requests().iter().map(|r| r.verb).collect();
        assert_eq!(
            verbs,
            vec![
                Verb::Get,
                Verb::Get,
                Verb::Get,
                Verb::Put,
                Verb::Post,
                Verb::Post,
                Verb::Get,
                Verb::Get,
                Verb::Get,
                Verb::Put,
                Verb::Delete,
            ]
        );

        let search = &transport.requests()[8];
        assert_eq!(search.headers.get(CONTENT_TYPE).unwrap(), JSON);
        assert!(search.body.is_some());
    }

    #[tokio::test]
    async fn test_device_keys_are_filtered_by_device() {
        let (transport, client) = setup();
        transport.respond(200, JSON, r#"{"keys":[{"key":"k1","device":"d1"}]}"#);
        transport.respond(201, JSON, r#"{"key":"k2","device":"d1","stream":"temperature"}"#);

        let keys = client.devices().keys("d1").await.unwrap();
        assert_eq!(keys[0]["key"], "k1");
        assert_eq!(transport.last_request().unwrap().url.query(), Some("device=d1"));

        let key = client
            .devices()
            .create_key("d1", params(json!({"name": "sensor", "permissions": ["GET"], "stream": "temperature"})))
            .await
            .unwrap();
        assert_eq!(key["key"], "k2");

        let sent = transport.last_request().unwrap();
        let body: Value = serde_json::from_slice(sent.body.as_ref().unwrap()).unwrap();
        assert_eq!(body["device"], "d1");
        assert_eq!(body["stream"], "temperature");
    }
}

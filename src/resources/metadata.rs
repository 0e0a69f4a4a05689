//! Custom metadata of devices, distributions and collections.

use serde_json::{json, Value};

use crate::client::{Client, Params, RequestSpec, Response};
use crate::error::Result;
use crate::resources::segment;

/// Metadata of one resource, rooted at `<resource path>/metadata`.
#[derive(Debug, Clone)]
pub struct Metadata<'a> {
    client: &'a Client,
    path: String,
}

impl<'a> Metadata<'a> {
    pub(crate) fn new(client: &'a Client, resource_path: &str) -> Self {
        Self {
            client,
            path: format!("{}/metadata", resource_path),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Read all metadata fields.
    pub async fn read(&self) -> Result<Response> {
        self.client.call(RequestSpec::get(self.path.as_str())).await
    }

    /// Read a single metadata field.
    pub async fn read_field(&self, field: &str) -> Result<Response> {
        self.client
            .call(RequestSpec::get(self.field_path(field)))
            .await
    }

    /// Replace the metadata with `fields`.
    pub async fn update(&self, fields: Params) -> Result<Response> {
        self.client
            .call(RequestSpec::put(self.path.as_str()).json(fields))
            .await
    }

    /// Set a single metadata field.
    pub async fn update_field(&self, field: &str, value: impl Into<Value>) -> Result<Response> {
        self.client
            .call(RequestSpec::put(self.field_path(field)).json(json!({ "value": value.into() })))
            .await
    }

    fn field_path(&self, field: &str) -> String {
        format!("{}/{}", self.path, segment(field))
    }
}

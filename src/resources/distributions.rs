//! Distributions: templates for provisioning many identical devices.

use serde_json::json;

use crate::client::{Client, Params, RequestSpec, Response};
use crate::error::Result;
use crate::resources::{attributes, Attributes, Crud, Metadata};

const PATH: &str = "/distributions";

#[derive(Debug, Clone, Copy)]
pub struct Distributions<'a> {
    crud: Crud<'a>,
}

impl<'a> Distributions<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self {
            crud: Crud::new(client, PATH, "distributions"),
        }
    }

    /// List or search distributions.
    pub async fn list(&self, query: Params) -> Result<Vec<Attributes>> {
        self.crud.list(query).await
    }

    pub async fn search(&self, query: Params) -> Result<Vec<Attributes>> {
        self.list(query).await
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

    /// Devices provisioned from the distribution.
    pub async fn devices(&self, id: &str, query: Params) -> Result<Vec<Attributes>> {
        let path = format!("{}/devices", self.crud.path(id));
        self.crud.list_at(&path, "devices", query).await
    }

    /// Provision a device; `serial` must be unique within the distribution.
    pub async fn add_device(&self, id: &str, serial: &str) -> Result<Attributes> {
        let path = format!("{}/devices", self.crud.path(id));
        let response = self
            .crud
            .client()
            .call(RequestSpec::post(path).json(json!({ "serial": serial })))
            .await?;
        attributes(response)
    }

    pub fn metadata(&self, id: &str) -> Metadata<'a> {
        self.crud.metadata(id)
    }
}

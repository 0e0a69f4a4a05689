//! Integrations forwarding platform events to third-party services.

use crate::client::{Client, Params, RequestSpec, Response};
use crate::error::Result;
use crate::resources::{Attributes, Crud};

const PATH: &str = "/integrations";

#[derive(Debug, Clone, Copy)]
pub struct Integrations<'a> {
    crud: Crud<'a>,
}

impl<'a> Integrations<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self {
            crud: Crud::new(client, PATH, "integrations"),
        }
    }

    pub async fn list(&self, query: Params) -> Result<Vec<Attributes>> {
        self.crud.list(query).await
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

    pub async fn view_status(&self, id: &str) -> Result<Response> {
        self.crud
            .client()
            .call(RequestSpec::get(self.status_path(id)))
            .await
    }

    /// Enable or disable the integration.
    pub async fn update_status(&self, id: &str, body: Params) -> Result<Response> {
        self.crud
            .client()
            .call(RequestSpec::put(self.status_path(id)).json(body))
            .await
    }

    fn status_path(&self, id: &str) -> String {
        format!("{}/status", self.crud.path(id))
    }
}

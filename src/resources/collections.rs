//! Collections group devices for organization.

use crate::client::{Client, Params, RequestSpec, Response};
use crate::error::Result;
use crate::resources::{segment, Attributes, Crud, Metadata};

const PATH: &str = "/collections";

#[derive(Debug, Clone, Copy)]
pub struct Collections<'a> {
    crud: Crud<'a>,
}

impl<'a> Collections<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self {
            crud: Crud::new(client, PATH, "collections"),
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

    pub async fn add_device(&self, id: &str, device_id: &str) -> Result<Response> {
        self.crud
            .client()
            .call(RequestSpec::put(self.device_path(id, device_id)))
            .await
    }

    pub async fn remove_device(&self, id: &str, device_id: &str) -> Result<Response> {
        self.crud
            .client()
            .call(RequestSpec::delete(self.device_path(id, device_id)))
            .await
    }

    pub fn metadata(&self, id: &str) -> Metadata<'a> {
        self.crud.metadata(id)
    }

    fn device_path(&self, id: &str, device_id: &str) -> String {
        format!("{}/devices/{}", self.crud.path(id), segment(device_id))
    }
}

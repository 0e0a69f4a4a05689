//! Blueprints describe the streams and metadata of a device model.

use crate::client::{Client, Params, Response};
use crate::error::Result;
use crate::resources::{Attributes, Crud};

const PATH: &str = "/blueprints";

#[derive(Debug, Clone, Copy)]
pub struct Blueprints<'a> {
    crud: Crud<'a>,
}

impl<'a> Blueprints<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self {
            crud: Crud::new(client, PATH, "blueprints"),
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
}

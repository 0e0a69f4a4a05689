//! Commands sent to devices.

use crate::client::{Client, Params, RequestSpec, Response};
use crate::error::Result;
use crate::resources::{Attributes, Crud};

const PATH: &str = "/commands";

#[derive(Debug, Clone, Copy)]
pub struct Commands<'a> {
    crud: Crud<'a>,
}

impl<'a> Commands<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self {
            crud: Crud::new(client, PATH, "commands"),
        }
    }

    /// Recently sent commands.
    pub async fn list(&self, query: Params) -> Result<Vec<Attributes>> {
        self.crud.list(query).await
    }

    /// Command details including per-device delivery state.
    pub async fn view(&self, id: &str) -> Result<Attributes> {
        self.crud.view(id).await
    }

    /// Send a named command to the targeted devices.
    pub async fn send(&self, body: Params) -> Result<Response> {
        self.crud.client().call(RequestSpec::post(PATH).json(body)).await
    }
}

//! Jobs are read-only: the service supports neither updating nor deleting them.

use crate::client::Client;
use crate::error::Result;
use crate::resources::{Attributes, Crud};

const PATH: &str = "/jobs";

#[derive(Debug, Clone, Copy)]
pub struct Jobs<'a> {
    crud: Crud<'a>,
}

impl<'a> Jobs<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self {
            crud: Crud::new(client, PATH, "jobs"),
        }
    }

    pub async fn view(&self, id: &str) -> Result<Attributes> {
        self.crud.view(id).await
    }
}

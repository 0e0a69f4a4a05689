//! API keys.
//!
//! A key is either a master key for the whole account or bound to a device,
//! optionally narrowed to one of its streams.

use crate::client::{Client, Params, RequestSpec, Response};
use crate::error::Result;
use crate::resources::{attributes, Attributes, Crud};

const PATH: &str = "/keys";

#[derive(Debug, Clone, Copy)]
pub struct Keys<'a> {
    crud: Crud<'a>,
}

impl<'a> Keys<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self {
            crud: Crud::new(client, PATH, "keys"),
        }
    }

    /// Keys of the account; filter with `device` or `stream`.
    pub async fn list(&self, query: Params) -> Result<Vec<Attributes>> {
        self.crud.list(query).await
    }

    pub async fn view(&self, key: &str) -> Result<Attributes> {
        self.crud.view(key).await
    }

    /// Create a master key, or a device key when `device` is set.
    pub async fn create(&self, body: Params) -> Result<Attributes> {
        self.crud.create(body).await
    }

    /// Update key properties. The token itself cannot be changed here.
    pub async fn update(&self, key: &str, body: Params) -> Result<Response> {
        self.crud.update(key, body).await
    }

    /// Issue a new token for `key` and return the updated key.
    ///
    /// Clients authenticating with the old token stop working.
    pub async fn regenerate(&self, key: &str) -> Result<Attributes> {
        let path = format!("{}/regenerate", self.crud.path(key));
        let response = self.crud.client().call(RequestSpec::post(path)).await?;
        attributes(response)
    }

    pub async fn delete(&self, key: &str) -> Result<Response> {
        self.crud.delete(key).await
    }
}

#[cfg(test)]
mod tests {
    use crate::client::testing::MockTransport;
    use crate::client::{Client, Params, Verb, JSON};
    use crate::config::ClientConfig;
    use serde_json::json;

    #[tokio::test]
    async fn test_key_lifecycle() {
        let transport = MockTransport::new();
        transport.respond(201, JSON, r#"{"key":"abc","name":"main","master":true}"#);
        transport.respond(200, JSON, r#"{"keys":[{"key":"abc"}]}"#);
        transport.respond(200, JSON, r#"{"key":"abc","name":"main"}"#);
        transport.respond(204, JSON, "");
        transport.respond(200, JSON, r#"{"key":"def","name":"main"}"#);
        transport.respond(204, JSON, "");
        let client = Client::with_transport(ClientConfig::default(), transport.clone()).unwrap();
        let keys = client.keys();

        let created = keys
            .create(json!({"name": "main", "permissions": ["GET", "POST"]}).as_object().cloned().unwrap())
            .await
            .unwrap();
        assert_eq!(created["key"], "abc");
        assert_eq!(keys.list(Params::new()).await.unwrap().len(), 1);
        assert_eq!(keys.view("abc").await.unwrap()["name"], "main");
        assert!(keys
            .update("abc", json!({"name": "primary"}).as_object().cloned().unwrap())
            .await
            .unwrap()
            .is_success());

        let regenerated = keys.regenerate("abc").await.unwrap();
        assert_eq!(regenerated["key"], "def");
        let sent = transport.last_request().unwrap();
        assert_eq!(sent.verb, Verb::Post);
        assert!(sent.body.is_none());

        assert_eq!(keys.delete("abc").await.unwrap().status(), 204);
        assert_eq!(
            transport.paths(),
            vec![
                "/v2/keys",
                "/v2/keys",
                "/v2/keys/abc",
                "/v2/keys/abc",
                "/v2/keys/abc/regenerate",
                "/v2/keys/abc",
            ]
        );
    }
}

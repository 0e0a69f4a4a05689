//! HTTP gateway for the M2X REST API.
//!
//! # Architecture
//!
//! - `gateway` - [`Client`], the single entry point for API calls
//! - `request` - Verbs, request specs, path versioning and body encoding
//! - `response` - [`Response`] envelope with lazy JSON decoding
//! - `transport` - [`Transport`] seam and the `reqwest` implementation

pub mod gateway;
pub mod request;
pub mod response;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use gateway::{user_agent, Client, API_KEY_HEADER};
pub use request::{Params, RequestSpec, Verb, FORM, JSON};
pub use response::Response;
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};

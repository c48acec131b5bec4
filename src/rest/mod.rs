//! This module provides the core traits and helper functions for talking to the Send API.
//! It maps raw JSON responses onto the crate's public types and funnels every request
//! through one error-mapping path.

use std::fmt::Debug;

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{
    client::Client,
    error::{Error, ServiceErrorKind},
};

#[macro_use]
pub(crate) mod macros;
pub(crate) mod client;
pub(crate) mod server;

/// A trait for types that can be created from a raw, deserialized API response.
pub(crate) trait FromResponse: Sized + Send {
    /// The raw response type that will be deserialized
    type Response: DeserializeOwned + Debug + Send;

    /// Converts the raw, deserialized response into the final, high-level type.
    /// This can fail if the response data is invalid or incomplete.
    fn from_response(response: Self::Response) -> Result<Self, ServiceErrorKind>;
}

/// Sends a prepared request and maps its response.
///
/// The recorded endpoint is the URL path only; the query string carries the page
/// access token.
pub(crate) async fn fut_net_op<T: FromResponse>(request: RequestBuilder) -> Result<T, Error> {
    let response = request.send().await?;
    let endpoint = response.url().path().to_owned();
    debug!(%endpoint, status = %response.status(), "send api responded");
    Client::handle_response(response, endpoint.into()).await
}

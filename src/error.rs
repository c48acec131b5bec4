//! Error Handling
//!
//! This module defines the crate's core error types, providing a structured way to handle
//! the issues that can occur while talking to the Messenger Send API, reading configuration,
//! or decoding inbound webhook bodies.
//!
//! Field-level problems inside an otherwise valid webhook document are **not** errors: the
//! decoder skips the smallest affected unit and keeps going (see [`crate::webhook`]). Only a
//! body that is not JSON at all surfaces as a [`PayloadError`].

use std::error::Error as StdError;

use reqwest::StatusCode;

use crate::{config::ConfigError, MetaError};

/// The **top-level error enum** for the `messenger-bot-rs` crate.
///
/// This enum aggregates the error categories that can occur within the library,
/// providing a unified error handling mechanism. It uses `#[non_exhaustive]`
/// to allow for future additions of error variants without breaking client code.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Represents an error occurring during network operations (e.g., HTTP requests,
    /// connection issues, binding the webhook listener, or TLS errors).
    #[error("A network error occurred: {0}")]
    Network(#[from] BoxError),

    /// Represents an error reported by, or while talking to, the Messenger Send API.
    ///
    /// It is distinct from [`MetaError`], which describes errors *reported by Meta itself
    /// in an API response body*; a `ServiceError` may wrap one.
    #[error("An API service or data processing error occurred: {0}")]
    Service(#[from] ServiceError),

    /// Represents an **I/O error**.
    #[error("An I/O error occurred: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration could not be loaded or is incomplete.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// An inbound webhook body could not be decoded as JSON.
    #[error("Invalid webhook payload: {0}")]
    Payload(#[from] PayloadError),

    /// Represents an **internal logic error** within the crate, or an error caused
    /// by invalid input that should have been caught earlier (for example a request
    /// that could not be built).
    #[error("An internal library error occurred: {0}")]
    Internal(BoxError),
}

impl Error {
    pub(crate) fn network(err: BoxError) -> Self {
        Self::Network(err)
    }

    pub(crate) fn internal(err: BoxError) -> Self {
        Self::Internal(err)
    }
}

/// Represents **service-level errors** encountered during Send API interactions.
/// This struct provides context such as the HTTP status code, the affected endpoint,
/// and a more specific error kind.
#[derive(thiserror::Error, Debug)]
#[error("Service error at endpoint '{endpoint:?}': {kind} (HTTP status {status})")]
#[non_exhaustive]
pub struct ServiceError {
    pub(crate) status: StatusCode,
    pub(crate) kind: ServiceErrorKind,
    pub(crate) endpoint: Option<String>,
}

impl ServiceError {
    /// Returns the HTTP status code associated with this service error.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the API endpoint (if known) where this service error occurred.
    ///
    /// The access token query parameter is never part of the recorded endpoint.
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    /// Returns the specific kind of service error.
    pub fn kind(&self) -> &ServiceErrorKind {
        &self.kind
    }

    pub(crate) fn api(error: MetaError) -> ServiceErrorKind {
        ServiceErrorKind::Api(ApiError {
            error: Box::new(error),
        })
    }

    pub(crate) fn parse(source: BoxError, body: String) -> ServiceErrorKind {
        ServiceErrorKind::Parse(ParseError {
            source: Some(source),
            body,
        })
    }

    pub(crate) fn payload(source: BoxError) -> ServiceErrorKind {
        ServiceErrorKind::InvalidPayload(Some(source))
    }
}

/// This enum is a sub-category of `ServiceError`, providing more granular detail about
/// issues that arise from interacting with the Send API or processing its responses.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum ServiceErrorKind {
    /// Represents an **API-specific error**, typically indicating a problem reported
    /// by Meta's API due to an invalid request, an expired token, or a server-side issue.
    #[error("The API returned an error: {0}")]
    Api(#[from] ApiError),

    /// Represents an error occurring during the **parsing of API responses**.
    #[error("Failed to parse the API response: {0}")]
    Parse(#[from] ParseError),

    /// Indicates that an API response parsed but did not carry the expected data.
    #[error("The API response had an invalid or unexpected payload structure.")]
    InvalidPayload(#[source] Option<BoxError>),
}

impl ServiceErrorKind {
    pub(crate) fn service(self, endpoint: impl Into<String>, status: StatusCode) -> ServiceError {
        ServiceError {
            status,
            kind: self,
            endpoint: Some(endpoint.into()),
        }
    }
}

/// Represents an **API-specific error with error details**.
///
/// This struct is used within `ServiceErrorKind::Api` to provide granular details about
/// errors reported directly by the Graph API, as parsed into a [`MetaError`].
#[derive(thiserror::Error, Debug)]
#[error("Meta API error: {error}")]
#[non_exhaustive]
pub struct ApiError {
    pub error: Box<MetaError>,
}

/// Represents an error that occurred during **data parsing or deserialization**
/// of a Send API response.
///
/// # Fields
/// - `source`: An optional `BoxError` representing the underlying cause of the
///   parsing failure (e.g., a `serde_json::Error`).
/// - `body`: The original raw `String` content that could not be parsed,
///   useful for debugging.
#[derive(thiserror::Error, Debug)]
#[error("Failed to parse the response body. Raw body content was: '{}'.", body)]
#[non_exhaustive]
pub struct ParseError {
    #[source]
    pub(crate) source: Option<BoxError>,
    pub body: String,
}

/// A webhook request body that is not a sequence of JSON documents.
///
/// Documents that precede the malformed one have already been decoded and
/// dispatched when this error is returned; `document` is the zero-based index
/// of the document that failed.
#[derive(thiserror::Error, Debug)]
#[error("webhook body document #{document} is not valid JSON: {source}")]
#[non_exhaustive]
pub struct PayloadError {
    pub document: usize,
    #[source]
    pub(crate) source: serde_json::Error,
}

impl PayloadError {
    pub(crate) fn new(document: usize, source: serde_json::Error) -> Self {
        Self { document, source }
    }
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        if value.is_builder() || value.is_redirect() {
            // Builder and redirect errors point to misconfiguration or invalid input
            // rather than a transport failure.
            Self::internal(value.without_url().into())
        } else {
            // The request URL carries the page access token; keep it out of the error.
            Self::network(value.without_url().into())
        }
    }
}

/// A convenient type alias for a boxed, trait-object error that can be sent across threads.
pub type BoxError = Box<dyn StdError + Send + Sync>;

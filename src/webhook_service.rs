//! For "Bring Your Own Server" (BYOS) integrations.
//!
//! This module provides a low-level `WebhookService` that encapsulates the request
//! handling logic for the Messenger webhook. It is designed to be integrated into any
//! web server framework that uses standard `http` types, such as `axum` or `hyper`.
//!
//! For a fully managed server, see the [`crate::server`] module.
//!
//! # Key Components
//!
//! - [`WebhookServiceBuilder`]: A builder to configure the service with your
//!   `verify_token`.
//! - [`WebhookService`]: The handler service. It's `Clone`, `Send`, `Sync` and `'static`,
//!   making it suitable for use as shared state in any web framework.
//! - [`WebhookService::handle`]: The single, asynchronous method that processes an
//!   incoming `http::Request` and returns an `http::Response`.
//!
//! # Usage Example (with axum)
//!
//! ```rust,no_run
//! use axum::{routing::any, Router};
//! use messenger_bot_rs::{Handlers, WebhookService};
//!
//! #[tokio::main]
//! async fn main() {
//!     let handlers = Handlers::builder()
//!         .on_text_message(|ctx, msg| {
//!             println!("{}: {}", ctx.sender, msg.text);
//!             true
//!         })
//!         .build();
//!
//!     // 1. Build the service
//!     let service = WebhookService::builder()
//!         .verify_token("my_secret_token")
//!         .build(handlers);
//!
//!     // 2. Integrate into your router; GET and POST both go to the service
//!     let app = Router::new().route(
//!         "/messenger",
//!         any(move |req: axum::extract::Request| async move { service.handle(req).await }),
//!     );
//!
//!     // 3. Run your server
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//! ```
use crate::{
    handler::{Dispatch, Handlers},
    rest::server::{handle_verification, handle_webhook, InnerServer},
};
use axum::{
    http::{Method, Request, Response, StatusCode},
    response::IntoResponse,
};
use std::{fmt, sync::Arc};

/// A builder for creating a [`WebhookService`].
///
/// This builder is for the low-level, "Bring Your Own Server" API.
/// It does **not** configure server details like endpoint or shutdown signals.
#[derive(Default, Clone)]
#[must_use]
pub struct WebhookServiceBuilder {
    verify_token: Option<String>,
}

impl fmt::Debug for WebhookServiceBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookServiceBuilder")
            .field("verify_token", &self.verify_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl WebhookServiceBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the verification token for the webhook challenge-response handshake.
    ///
    /// See [`crate::server::ServerBuilder::verify_token`] for details.
    pub fn verify_token(mut self, verify_token: impl Into<String>) -> Self {
        self.verify_token = Some(verify_token.into());
        self
    }

    /// Builds and returns a [`WebhookService`] from the configured builder.
    ///
    /// # Arguments
    /// * `dispatcher` - Where decoded events go, usually a [`Handlers`](crate::Handlers).
    pub fn build<D: Dispatch + 'static>(self, dispatcher: D) -> WebhookService<D> {
        WebhookService {
            inner: Arc::new(InnerServer {
                dispatcher,
                verify_token: self.verify_token,
            }),
        }
    }
}

// Not stable
pub type Body = axum::body::Body;

/// A low-level service to handle Messenger webhook requests.
///
/// This struct is created using [`WebhookService::builder`] and is designed
/// to be integrated into an existing web server.
pub struct WebhookService<D: Dispatch + 'static> {
    inner: Arc<InnerServer<D>>,
}

impl<D: Dispatch + 'static> Clone for WebhookService<D> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl WebhookService<Handlers> {
    /// Returns a new builder to create a `WebhookService`.
    ///
    /// The dispatcher type is picked by [`WebhookServiceBuilder::build`]; any
    /// [`Dispatch`] works, not only [`Handlers`].
    pub fn builder() -> WebhookServiceBuilder {
        WebhookServiceBuilder::new()
    }
}

impl<D: Dispatch + 'static> WebhookService<D> {
    /// The primary request handler for your BYOS server.
    ///
    /// - `GET` answers the verification handshake: the `hub.challenge` when
    ///   `hub.mode` is `subscribe` and the token matches, `O` otherwise.
    /// - `POST` decodes and dispatches the body: `200 OK` once every document
    ///   decoded, `400` if the body is not JSON.
    /// - Anything else is `405 Method Not Allowed`.
    pub async fn handle<B>(&self, req: Request<B>) -> Response<Body>
    where
        B: Into<Body>,
    {
        let req = req.map(Into::into);
        let state = self.inner.clone();
        let response = match *req.method() {
            Method::GET => {
                <fn(_, _) -> _ as axum::handler::Handler<_, _>>::call(
                    handle_verification,
                    req,
                    state,
                )
                .await
            }
            Method::POST => {
                <fn(_, _) -> _ as axum::handler::Handler<_, _>>::call(handle_webhook, req, state)
                    .await
            }
            _ => StatusCode::METHOD_NOT_ALLOWED.into_response(),
        };
        response.map(Into::<Body>::into)
    }
}

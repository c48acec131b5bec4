//! Messenger webhook server implementation
//!
//! This module provides a high-level `Server` that handles the networking, routing
//! and lifecycle management for you. It answers Messenger's verification handshake
//! (`GET`) and decodes event deliveries (`POST`) on a single route, handing every
//! decoded event to your [`Dispatch`] implementation.
//!
//! For a more flexible, low-level integration, see the [`crate::webhook_service`] module.
//!
//! # Key Components
//! - [`ServerBuilder`]: Configure the server's endpoint, route, shutdown signal and
//!   verify token.
//! - [`Server`]: The configured server, ready to run.
//! - [`Server::serve`]: Takes your [`Dispatch`] (usually [`Handlers`]) and returns a
//!   [`Serve`] which runs the server until it's shut down.
//!
//! # Example
//! ```rust,no_run
//! use messenger_bot_rs::{Handlers, Server};
//!
//! # async fn example() -> Result<(), messenger_bot_rs::Error> {
//! let handlers = Handlers::builder()
//!     .on_postback(|ctx, postback| {
//!         println!("{} tapped {}", ctx.sender, postback.payload);
//!         true
//!     })
//!     .build();
//!
//! let mut serve = Server::builder()
//!     .endpoint("0.0.0.0:8080".parse().unwrap())
//!     .route("/webhook")
//!     .verify_token("MY_VERIFY_TOKEN")
//!     .build()
//!     .serve(handlers);
//!
//! let stop = serve.shutdown_trigger();
//! tokio::spawn(async move {
//!     let _ = tokio::signal::ctrl_c().await;
//!     stop.await;
//! });
//!
//! serve.await?;
//! # Ok(()) }
//! ```
//!
//! [`Handlers`]: crate::Handlers

use std::{fmt, future::Future, mem, net::SocketAddr, pin::Pin, sync::Arc};

use tokio::sync::Notify;

use crate::{
    config::{Config, DEFAULT_ENDPOINT, DEFAULT_ROUTE_PATH},
    error::Error,
    handler::Dispatch,
};

/// Messenger webhook server
///
/// Listens for webhook requests from Messenger and routes the decoded events to a
/// [`Dispatch`]. Create using [`Server::builder()`] or [`Server::new()`].
#[derive(Default, Debug)]
pub struct Server {
    pub(crate) config: ServerBuilder,
}

impl Server {
    /// Create a new server with default settings
    pub fn new() -> Self {
        ServerBuilder::new().build()
    }

    /// Create a server builder for custom configuration
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    /// Prepares the webhook server to start listening.
    ///
    /// The server will **not** start listening until the returned [`Serve`] is
    /// `.await`ed.
    ///
    /// # Arguments
    /// - `dispatcher`: where decoded events go. Usually a [`Handlers`](crate::Handlers)
    ///   registry; it is frozen from here on and shared by every request.
    pub fn serve<D: Dispatch + 'static>(self, dispatcher: D) -> Serve<D> {
        Serve {
            server: self,
            dispatcher,
        }
    }
}

/// A configured webhook server, bound to its dispatcher.
///
/// It implements `IntoFuture`, meaning you can `.await` an instance of `Serve`
/// directly to start the server.
#[must_use = "Serve does nothing unless you `.await` or `.execute().await` it"]
pub struct Serve<D> {
    server: Server,
    dispatcher: D,
}

impl<D: Dispatch + 'static> Serve<D> {
    /// Prepares a future that, when awaited, will signal the server to shut down.
    ///
    /// This method modifies the server's internal shutdown configuration to include
    /// a new shutdown signal. Awaiting the returned future will trigger this signal.
    /// If a previous shutdown mechanism was configured, this new signal will be
    /// combined with it, meaning either can trigger the server's shutdown.
    pub fn shutdown_trigger(&mut self) -> impl Future<Output = ()> + Send + 'static {
        let shutdown = Arc::new(Notify::new());
        let shutdown_clone = shutdown.clone();

        let old_shutdown = mem::take(&mut self.server.config.shutdown);

        self.server.config.shutdown = Some(Self::combine_shutdown(old_shutdown, async move {
            shutdown_clone.notified().await;
        }));

        async move {
            shutdown.notify_one();
        }
    }

    /// Combines an optional existing shutdown future with a new one.
    /// The returned future completes when either the old or the new shutdown future completes.
    fn combine_shutdown<S, F>(
        old_shutdown: Option<S>,
        update_shutdown: F,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'static>>
    where
        S: Future<Output = ()> + Send + 'static,
        F: Future<Output = ()> + Send + 'static,
    {
        match old_shutdown {
            Some(shutdown) => Box::pin(async {
                tokio::select! {
                    _ = shutdown => (),
                    _ = update_shutdown => (),
                }
            }),
            None => Box::pin(update_shutdown),
        }
    }

    /// Returns a signal that fires once the listener is bound.
    pub fn ready_signal(&mut self) -> Arc<Notify> {
        let ready = Arc::new(Notify::new());
        self.server.config.ready = Some(ready.clone());
        ready
    }
}

IntoFuture! {
    impl<D> Serve<D>
    [where
        D: Dispatch + 'static,]
    {
        /// Binds the listener and serves until shutdown.
        pub fn execute(mut self) -> impl Future<Output = Result<(), Error>> + 'static {
            async move {
                let ready = self.server.config.ready.take();
                self.server.serve_inner(self.dispatcher, ready).await
            }
        }
    }
}

/// Builder for creating a [`Server`]
///
/// Customize endpoint, route, shutdown signal and verify token.
///
/// # Example
/// ```rust
/// use messenger_bot_rs::Server;
///
/// let server = Server::builder()
///     .endpoint("127.0.0.1:8080".parse().unwrap())
///     .route("/messenger")
///     .verify_token("MY_VERIFY_TOKEN")
///     .build();
/// ```
#[must_use]
pub struct ServerBuilder {
    pub(crate) endpoint: SocketAddr,
    pub(crate) route_path: String,
    pub(crate) shutdown: Option<Pin<Box<dyn Future<Output = ()> + Send + 'static>>>,
    pub(crate) verify_token: Option<String>,
    pub(crate) ready: Option<Arc<Notify>>,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT,
            route_path: DEFAULT_ROUTE_PATH.to_owned(),
            shutdown: None,
            verify_token: None,
            ready: None,
        }
    }
}

impl fmt::Debug for ServerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerBuilder")
            .field("endpoint", &self.endpoint)
            .field("route_path", &self.route_path)
            .field("shutdown", &self.shutdown.is_some())
            .field("verify_token", &self.verify_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl ServerBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes endpoint, route and verify token from a loaded [`Config`].
    ///
    /// # Example
    /// ```rust
    /// use messenger_bot_rs::{Config, Server};
    ///
    /// let config = Config::default();
    /// let server = Server::builder().from_config(&config).build();
    /// ```
    pub fn from_config(self, config: &Config) -> Self {
        let builder = self.endpoint(config.endpoint).route(config.route.clone());
        if config.validation_token.is_empty() {
            builder
        } else {
            builder.verify_token(config.validation_token.clone())
        }
    }

    /// Sets the network address and port on which the webhook server will listen.
    ///
    /// For example, `127.0.0.1:8080` for local access or `0.0.0.0:8080` to listen
    /// on all available network interfaces. Defaults to `127.0.0.1:3000`.
    pub fn endpoint(mut self, endpoint: SocketAddr) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Sets the URL path Messenger calls. The default path is `/`.
    ///
    /// Both the verification handshake and event delivery are answered on it.
    pub fn route<P: Into<String>>(mut self, path: P) -> Self {
        self.route_path = path.into();
        self
    }

    /// Sets a custom `Future` that, when resolved, will trigger the server to shut down.
    ///
    /// For most common scenarios, consider using the more convenient
    /// [`Serve::shutdown_trigger`] method instead.
    ///
    /// # Example
    /// ```rust,no_run
    /// use messenger_bot_rs::server::ServerBuilder;
    ///
    /// let builder = ServerBuilder::new().shutdown(async {
    ///     let _ = tokio::signal::ctrl_c().await;
    /// });
    /// ```
    pub fn shutdown<F>(mut self, shutdown: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.shutdown = Some(Box::pin(shutdown));
        self
    }

    /// Sets the verification token for the webhook's challenge-response handshake.
    ///
    /// This is the "Verify Token" you entered when subscribing the webhook in the Meta
    /// App Dashboard. A handshake whose `hub.verify_token` matches it (and whose
    /// `hub.mode` is `subscribe`) gets its `hub.challenge` echoed back. Without a
    /// token every handshake fails.
    pub fn verify_token(mut self, verify_token: impl Into<String>) -> Self {
        self.verify_token = Some(verify_token.into());
        self
    }

    /// Builds the [`Server`].
    pub fn build(self) -> Server {
        Server { config: self }
    }
}

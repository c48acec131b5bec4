//! Messenger Send API Client
//!
//! This module provides the client for sending messages from a Facebook page through
//! Meta's Graph API. Every request is a `POST` to `/v{version}/me/messages`,
//! authenticated with the page access token.
//!
//! # Example
//! ```rust,no_run
//! use messenger_bot_rs::{message::{Draft, QuickReply, SenderAction}, Client};
//!
//! # async fn example() -> Result<(), messenger_bot_rs::Error> {
//! let client = Client::new("PAGE_ACCESS_TOKEN")?;
//!
//! client.message("USER_PSID").sender_action(SenderAction::TypingOn).await?;
//!
//! let draft = Draft::text("Pick a colour")
//!     .quick_reply(QuickReply::text("Red", "PICK_RED"))
//!     .quick_reply(QuickReply::text("Green", "PICK_GREEN"));
//! let sent = client.message("USER_PSID").send(draft).await?;
//! println!("sent {:?} to {}", sent.message_id(), sent.recipient_id());
//! # Ok(()) }
//! ```

use std::{borrow::Cow, fmt, sync::Arc, time::Duration};

use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client as HttpClient, ClientBuilder as HttpClientBuilder, RequestBuilder,
};
use tracing::debug;

use crate::{
    config::{Config, DEFAULT_API_VERSION},
    error::Error,
    message::{
        Button, ButtonTemplate, Draft, GenericTemplateElement, IntoDraft, MessageEnvelope,
        NotificationType, OutboundMessage, ReceiptTemplate, SenderAction,
    },
    rest::fut_net_op,
    Recipient, ToValue,
};

const DEFAULT_BASE_URL: &str = "https://graph.facebook.com";
const USER_AGENT: &str = "messenger-bot-rs/0.1 (Rust)";

/// A client for the Messenger Send API.
///
/// Cheap to clone; clones share one connection pool. Hand a clone to each handler
/// that needs to reply.
///
/// # Example
/// ```rust,no_run
/// use messenger_bot_rs::Client;
///
/// # async fn example() -> Result<(), messenger_bot_rs::Error> {
/// let client = Client::new("PAGE_ACCESS_TOKEN")?;
/// client.send_text("USER_PSID", "Hello from Rust!").await?;
/// # Ok(()) }
/// ```
#[derive(Clone, Debug)]
pub struct Client {
    inner: Arc<InnerClient>,
}

struct InnerClient {
    http_client: HttpClient,
    messages_url: String,
    access_token: String,
}

impl fmt::Debug for InnerClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InnerClient")
            .field("messages_url", &self.messages_url)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

impl Client {
    /// Creates a new client with default configuration.
    ///
    /// # Arguments
    /// * `access_token` - The page access token
    pub fn new(access_token: impl Into<String>) -> Result<Self, Error> {
        Self::builder().build(access_token)
    }

    /// Creates a client from a loaded [`Config`], using its page access token and
    /// API version.
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        Self::builder()
            .from_config(config)
            .build(config.page_access_token.clone())
    }

    /// Starts building a new client with custom settings.
    ///
    /// # Example
    /// ```rust,no_run
    /// use std::time::Duration;
    /// use messenger_bot_rs::Client;
    ///
    /// # fn example() -> Result<(), messenger_bot_rs::Error> {
    /// let client = Client::builder()
    ///     .timeout(Duration::from_secs(10))
    ///     .api_version("v2.6")
    ///     .build("PAGE_ACCESS_TOKEN")?;
    /// # Ok(()) }
    /// ```
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Returns a message manager addressing one recipient.
    ///
    /// # Arguments
    /// * `to` - The recipient: a [`Recipient`], an event's [`Sender`](crate::Sender),
    ///   or a plain page-scoped id.
    pub fn message<'r, R>(&self, to: R) -> MessageManager<'r>
    where
        R: ToValue<'r, Recipient>,
    {
        MessageManager {
            client: self.clone(),
            to: to.to_value(),
        }
    }

    /// Prepares to send a fully built [`MessageEnvelope`].
    pub fn send(&self, envelope: MessageEnvelope) -> SendMessage {
        SendMessage {
            request: self.post_messages(),
            envelope,
        }
    }

    /// Sends a text message to a page-scoped id.
    pub fn send_text(&self, recipient_id: &str, text: impl Into<String>) -> SendMessage {
        self.message(recipient_id).send(text.into())
    }

    /// Sends an image fetched by Messenger from `url`.
    pub fn send_image(&self, recipient_id: &str, url: impl Into<String>) -> SendMessage {
        self.message(recipient_id).send(Draft::image(url))
    }

    /// Sends a button template.
    pub fn send_buttons(
        &self,
        recipient_id: &str,
        text: impl Into<String>,
        buttons: impl IntoIterator<Item = Button>,
    ) -> SendMessage {
        let template = ButtonTemplate::new(text, buttons);
        self.message(recipient_id)
            .send(OutboundMessage::ButtonTemplate(template))
    }

    /// Sends a generic template.
    pub fn send_generic(
        &self,
        recipient_id: &str,
        elements: impl IntoIterator<Item = GenericTemplateElement>,
    ) -> SendMessage {
        self.message(recipient_id).send(Draft::generic(elements))
    }

    /// Sends a receipt template.
    pub fn send_receipt(&self, recipient_id: &str, receipt: ReceiptTemplate) -> SendMessage {
        self.message(recipient_id).send(receipt)
    }

    #[inline]
    fn post_messages(&self) -> RequestBuilder {
        self.inner
            .http_client
            .post(&self.inner.messages_url)
            .query(&[("access_token", self.inner.access_token.as_str())])
    }
}

/// A builder for configuring and creating a [`Client`].
///
/// # Example
/// ```rust
/// use messenger_bot_rs::client::ClientBuilder;
///
/// let builder = ClientBuilder::new().api_version("2.6");
/// ```
#[derive(Debug)]
#[must_use]
pub struct ClientBuilder {
    http: HttpClientBuilder,
    api_version: String,
    base_url: String,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            http: HttpClientBuilder::new(),
            api_version: DEFAULT_API_VERSION.to_owned(),
            base_url: DEFAULT_BASE_URL.to_owned(),
        }
    }
}

impl ClientBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the API version from a loaded [`Config`].
    pub fn from_config(self, config: &Config) -> Self {
        self.api_version(config.api_version.clone())
    }

    /// Sets the request timeout for all Send API calls.
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.http = self.http.timeout(duration);
        self
    }

    /// Sets the Graph API version to use (e.g. `"2.6"`). Defaults to `2.6`.
    ///
    /// If you add the `"v"` prefix, it will be removed.
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        let version = version.into();
        self.api_version = version.trim_start_matches('v').to_owned();
        self
    }

    /// Sets the Graph API base URL. Defaults to `https://graph.facebook.com`.
    ///
    /// Mostly useful to point the client at a mock server.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Finishes building the client with the given page access token.
    ///
    /// Fails if the token is empty or the HTTP client can't be set up.
    pub fn build(self, access_token: impl Into<String>) -> Result<Client, Error> {
        let access_token = access_token.into();
        if access_token.is_empty() {
            return Err(Error::internal("empty page access token".into()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            HeaderValue::from_static(USER_AGENT),
        );

        let http_client = self.http.default_headers(headers).build()?;
        let messages_url = format!(
            "{}/v{}/me/messages",
            self.base_url.trim_end_matches('/'),
            self.api_version
        );

        Ok(Client {
            inner: Arc::new(InnerClient {
                http_client,
                messages_url,
                access_token,
            }),
        })
    }
}

/// Manager for sending messages to one recipient.
///
/// Obtained via [`Client::message()`].
#[derive(Debug)]
pub struct MessageManager<'r> {
    pub(crate) client: Client,
    pub(crate) to: Cow<'r, Recipient>,
}

impl MessageManager<'_> {
    /// Prepares to send a message.
    ///
    /// Accepts anything that converts into a [`Draft`](crate::Draft): plain strings,
    /// drafts with quick replies, templates. Nothing is sent until the returned
    /// [`SendMessage`] is `.await`ed.
    pub fn send<D: IntoDraft>(&self, draft: D) -> SendMessage {
        self.client
            .send(MessageEnvelope::message(self.to.clone().into_owned(), draft))
    }

    /// Prepares to send a typing indicator or read receipt.
    pub fn sender_action(&self, action: SenderAction) -> SendMessage {
        self.client.send(MessageEnvelope::sender_action(
            self.to.clone().into_owned(),
            action,
        ))
    }
}

/// A builder for sending a message.
///
/// This struct is returned by [`MessageManager::send`] and friends. It does not perform
/// the network request until it is `.await`ed (due to its `IntoFuture` implementation)
/// or its `execute().await` method is called.
#[must_use = "SendMessage does nothing unless you `.await` or `.execute().await` it"]
pub struct SendMessage {
    request: RequestBuilder,
    envelope: MessageEnvelope,
}

impl SendMessage {
    /// Sets how the recipient is notified.
    pub fn notification_type(mut self, notification_type: NotificationType) -> Self {
        self.envelope = self.envelope.notification_type(notification_type);
        self
    }

    /// The body that will be posted.
    pub fn envelope(&self) -> &MessageEnvelope {
        &self.envelope
    }
}

IntoFuture! {
    impl SendMessage {
        /// Executes the send request.
        ///
        /// Because `SendMessage` implements `IntoFuture`, you can also simply `.await`
        /// it directly.
        ///
        /// # Returns
        /// `Ok(MessageCreate)` on success. A non-2xx answer becomes an
        /// [`Error::Service`] carrying Meta's error object when there is one.
        pub fn execute(self) -> impl Future<Output = Result<MessageCreate, Error>> + 'static {
            async move {
                debug!(recipient = %self.envelope.recipient, "sending message");
                let request = self.request.json(&self.envelope);
                fut_net_op(request).await
            }
        }
    }
}

/// What the Send API reports for an accepted request.
#[derive(PartialEq, Eq, Clone, Debug)]
#[non_exhaustive]
pub struct MessageCreate {
    /// Page-scoped id of the recipient
    pub recipient_id: String,
    /// Id of the created message; absent for sender actions
    pub message_id: Option<String>,
}

impl MessageCreate {
    /// Page-scoped id of the recipient
    pub fn recipient_id(&self) -> &str {
        &self.recipient_id
    }

    /// Id of the created message, if one was created
    pub fn message_id(&self) -> Option<&str> {
        self.message_id.as_deref()
    }
}

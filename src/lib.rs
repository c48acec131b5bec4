#![deny(clippy::future_not_send)]
#![deny(clippy::large_enum_variant)]

//! # messenger_bot_rs
//!
//! A Rust SDK for building Facebook Messenger bots.
//! This crate receives Messenger webhook notifications, decodes them into strongly typed
//! events and dispatches each event to the handler you registered for its kind. It also
//! builds and sends outbound messages through the Send API.
//!
//! ## ✨ Features
//!
//! - **Fault-isolating webhook decoding**: Messenger payloads are only loosely specified. A
//!   malformed attachment, delivery id or event is skipped on its own (with a `tracing`
//!   diagnostic) while its siblings are still delivered.
//! - **Typed dispatch**: one callback per event kind (text message, attachment, delivery,
//!   postback, opt-in, verification outcome), configured once with [`Handlers::builder`].
//! - **Webhook Server**: a ready-to-run [`Server`], or a [`WebhookService`] for bringing
//!   your own axum/hyper stack.
//! - **Send API client**: text, image, generic/button/receipt templates, quick replies and
//!   sender actions.
//!
//! ## 🚀 Examples
//!
//! ---
//!
//! ### Echo every text message back
//! ```rust,no_run
//! use messenger_bot_rs::{Client, Handlers, Server};
//!
//! # async fn example() -> Result<(), messenger_bot_rs::Error> {
//! let client = Client::new("PAGE_ACCESS_TOKEN")?;
//!
//! let handlers = Handlers::builder()
//!     .on_text_message(move |ctx, msg| {
//!         let client = client.clone();
//!         let sender = ctx.sender.clone();
//!         tokio::spawn(async move {
//!             let _ = client.message(&sender).send(msg.text).await;
//!         });
//!         true
//!     })
//!     .build();
//!
//! Server::builder()
//!     .endpoint("127.0.0.1:8080".parse().unwrap())
//!     .verify_token("MY_VERIFY_TOKEN")
//!     .build()
//!     .serve(handlers)
//!     .await?;
//! # Ok(()) }
//! ```
//!
//! ---
//!
//! ### Send a button template
//! ```rust,no_run
//! use messenger_bot_rs::{Client, message::{Button, Draft}};
//!
//! # async fn example(client: Client) -> Result<(), messenger_bot_rs::Error> {
//! let draft = Draft::buttons(
//!     "What next?",
//!     [
//!         Button::url("Open website", "https://example.com"),
//!         Button::postback("Talk to us", "TALK"),
//!     ],
//! );
//! client.message("USER_PSID").send(draft).await?;
//! # Ok(()) }
//! ```
//!
//! ---
//!
//! ### Decode a body without a server
//! ```rust
//! use messenger_bot_rs::{Handlers, webhook::process_webhook_body};
//!
//! let handlers = Handlers::builder()
//!     .on_postback(|ctx, postback| {
//!         println!("{} pressed {}", ctx.sender.id, postback.payload);
//!         true
//!     })
//!     .build();
//!
//! let body = br#"{"object":"page","entry":[{"id":"PAGE","messaging":[
//!     {"sender":{"id":"USER"},"recipient":{"id":"PAGE"},"timestamp":1458692752,
//!      "postback":{"payload":"GET_STARTED"}}]}]}"#;
//!
//! let ack = process_webhook_body(&body[..], &handlers).unwrap();
//! assert_eq!(ack.dispatched, 1);
//! ```

#[macro_use]
mod rest;
pub mod client;
pub mod config;
pub mod error;
pub mod event;
pub mod handler;
pub mod message;
pub mod server;
pub mod webhook;
pub mod webhook_service;

use serde::{Deserialize, Serialize};
use std::{
    borrow::Cow,
    fmt,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

pub use client::Client;
pub use config::Config;
pub use error::Error;
pub use event::{EventContext, EventKind, InboundEvent};
pub use handler::{Dispatch, Handlers};
pub use message::{Draft, MessageEnvelope};
pub use server::Server;
pub use webhook_service::WebhookService;

/// The user (or page) that triggered a webhook event.
///
/// The id is the page-scoped id (PSID) Messenger assigned to the user; use it as
/// the [`Recipient`] of a reply.
#[derive(Serialize, Deserialize, PartialEq, Eq, Hash, Clone, Debug)]
pub struct Sender {
    /// Page-scoped id
    pub id: String,
}

impl Sender {
    /// Creates a sender from its page-scoped id.
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// The addressee of an event or of an outbound message.
///
/// Inbound events always carry an `id`. When sending, a recipient may instead be
/// addressed by `phone_number` (customer matching), in which case `id` may be empty
/// and is not serialized.
#[derive(Serialize, Deserialize, PartialEq, Eq, Hash, Clone, Debug)]
pub struct Recipient {
    /// Page-scoped id
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    /// Phone number, used to address users without a page-scoped id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

impl Recipient {
    /// Creates a recipient from a page-scoped id.
    ///
    /// # Example
    /// ```rust
    /// use messenger_bot_rs::Recipient;
    ///
    /// let recipient = Recipient::new("1254459154682919");
    /// assert_eq!(recipient.id, "1254459154682919");
    /// assert!(recipient.phone_number.is_none());
    /// ```
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            phone_number: None,
        }
    }

    /// Creates a recipient addressed by phone number only.
    pub fn phone_number(phone_number: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            phone_number: Some(phone_number.into()),
        }
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.phone_number {
            Some(phone) if self.id.is_empty() => write!(f, "phone:{phone}"),
            _ => f.write_str(&self.id),
        }
    }
}

/// A point in time carried by a webhook event.
///
/// Messenger reports event times as numeric UNIX timestamps (seconds since epoch).
/// Fractional parts are truncated.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
pub struct Timestamp {
    pub(crate) inner: i64,
}

impl Timestamp {
    /// Creates a timestamp from seconds since the UNIX epoch.
    pub fn from_seconds(seconds: i64) -> Self {
        Self { inner: seconds }
    }

    /// Returns the raw timestamp in seconds.
    pub fn seconds(&self) -> i64 {
        self.inner
    }

    /// Converts the timestamp to an absolute [`SystemTime`].
    ///
    /// # Example
    /// ```rust
    /// use std::time::{Duration, UNIX_EPOCH};
    /// use messenger_bot_rs::Timestamp;
    ///
    /// let ts = Timestamp::from_seconds(1458692752);
    /// assert_eq!(ts.to_system_time(), UNIX_EPOCH + Duration::from_secs(1458692752));
    /// ```
    pub fn to_system_time(&self) -> SystemTime {
        let magnitude = Duration::from_secs(self.inner.unsigned_abs());
        if self.inner >= 0 {
            UNIX_EPOCH + magnitude
        } else {
            UNIX_EPOCH - magnitude
        }
    }

    pub(crate) fn from_json_number(value: f64) -> Self {
        // `as` saturates on overflow and maps NaN to zero.
        Self {
            inner: value as i64,
        }
    }
}

impl From<Timestamp> for SystemTime {
    fn from(value: Timestamp) -> Self {
        value.to_system_time()
    }
}

/// Represents an **error object returned directly by Meta's Graph API** in its responses.
///
/// It is distinct from the crate's own `Error` enum, as `MetaError` specifically describes
/// issues reported by the Meta API itself.
///
/// # Example (from Send API response)
/// ```json
/// {
///   "error": {
///     "message": "(#100) No matching user found",
///     "type": "OAuthException",
///     "code": 100,
///     "error_subcode": 2018001,
///     "fbtrace_id": "A4K..."
///   }
/// }
/// ```
#[derive(thiserror::Error, Serialize, Deserialize, PartialEq, Clone, Debug, Default)]
#[non_exhaustive]
pub struct MetaError {
    pub code: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_subcode: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fbtrace_id: Option<String>,
}

impl fmt::Display for MetaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(code: {})", self.code)?;

        if let Some(subcode) = self.error_subcode {
            write!(f, " (subcode: {subcode})")?;
        }

        if let Some(r#type) = &self.r#type {
            write!(f, " (type: {})", r#type)?;
        }

        if let Some(message) = &self.message {
            write!(f, ": {}", message)?;
        }

        if let Some(id) = &self.fbtrace_id {
            writeln!(f, "\n  Trace ID: {}", id)?;
        }

        Ok(())
    }
}

/// Trait used for recipient conversion with Cow optimization
pub trait ToValue<'a, Value>: Send + Sync
where
    Value: Clone + Send + Sync,
{
    fn to_value(self) -> Cow<'a, Value>;
}

impl<'a, Value> ToValue<'a, Value> for Cow<'a, Value>
where
    Value: Clone + Send + Sync,
{
    #[inline]
    fn to_value(self) -> Cow<'a, Value> {
        self
    }
}

impl ToValue<'static, Recipient> for Recipient {
    #[inline]
    fn to_value(self) -> Cow<'static, Recipient> {
        Cow::Owned(self)
    }
}

impl<'a> ToValue<'a, Recipient> for &'a Recipient {
    #[inline]
    fn to_value(self) -> Cow<'a, Recipient> {
        Cow::Borrowed(self)
    }
}

impl ToValue<'static, Recipient> for Sender {
    #[inline]
    fn to_value(self) -> Cow<'static, Recipient> {
        Cow::Owned(Recipient::new(self.id))
    }
}

impl ToValue<'static, Recipient> for &Sender {
    #[inline]
    fn to_value(self) -> Cow<'static, Recipient> {
        Cow::Owned(Recipient::new(self.id.clone()))
    }
}

macro_rules! impl_to_value_strings {
    ($($ty:ty),*) => {
        $(
            impl ToValue<'static, Recipient> for $ty {
                #[inline]
                fn to_value(self) -> Cow<'static, Recipient> {
                    Cow::Owned(Recipient::new(self))
                }
            }
        )*
    };
}

impl_to_value_strings!(&str, String, &String);

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn recipient_serialization_skips_empty_parts() {
        let by_id = serde_json::to_value(Recipient::new("123")).unwrap();
        assert_eq!(by_id, serde_json::json!({"id": "123"}));

        let by_phone = serde_json::to_value(Recipient::phone_number("+16505551234")).unwrap();
        assert_eq!(by_phone, serde_json::json!({"phone_number": "+16505551234"}));
    }

    #[test]
    fn recipient_display_is_plain_text() {
        assert_eq!(Recipient::new("123").to_string(), "123");
        assert_eq!(
            Recipient::phone_number("+16505551234").to_string(),
            "phone:+16505551234"
        );

        let both = Recipient {
            id: "123".into(),
            phone_number: Some("+16505551234".into()),
        };
        assert_eq!(both.to_string(), "123");
    }

    #[test]
    fn sender_converts_to_recipient() {
        let sender = Sender::new("psid");
        let recipient = (&sender).to_value();
        assert_eq!(recipient.id, "psid");
    }

    #[test]
    fn timestamps_truncate_and_convert() {
        let ts = Timestamp::from_json_number(1458692752.9);
        assert_eq!(ts.seconds(), 1458692752);

        let before_epoch = Timestamp::from_seconds(-10);
        assert_eq!(
            before_epoch.to_system_time(),
            UNIX_EPOCH - Duration::from_secs(10)
        );
    }

    #[test]
    fn meta_error_display() {
        let err: MetaError = serde_json::from_value(serde_json::json!({
            "message": "(#100) No matching user found",
            "type": "OAuthException",
            "code": 100,
            "error_subcode": 2018001,
            "fbtrace_id": "Abc"
        }))
        .unwrap();

        let rendered = err.to_string();
        assert!(rendered.starts_with("(code: 100) (subcode: 2018001) (type: OAuthException)"));
        assert!(rendered.contains("No matching user found"));
    }
}

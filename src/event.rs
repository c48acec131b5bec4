//! Typed inbound events
//!
//! Every messaging event a webhook delivers is decoded into one [`InboundEvent`]
//! (or, for a message with attachments, one event per attachment) and handed to
//! the [`Dispatch`](crate::Dispatch) implementation together with an
//! [`EventContext`].

use std::fmt;

use crate::{Recipient, Sender, Timestamp};

/// The kind of a messaging event, as decided by which keys the event carries.
///
/// See [`classify`](crate::webhook::classify) for the precedence between kinds.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub enum EventKind {
    /// The user went through the Send-to-Messenger plugin or a checkbox opt-in
    OptIn,
    /// A text or attachment message
    Message,
    /// Delivery confirmation for messages the page sent
    Delivery,
    /// A postback button, Get Started button or persistent menu item was tapped
    Postback,
    /// None of the known keys were present
    Unknown,
}

impl EventKind {
    /// The key that marks this kind in a messaging event node.
    pub fn key(&self) -> Option<&'static str> {
        match self {
            Self::OptIn => Some("optin"),
            Self::Message => Some("message"),
            Self::Delivery => Some("delivery"),
            Self::Postback => Some("postback"),
            Self::Unknown => None,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key().unwrap_or("unknown"))
    }
}

/// Where an event came from.
///
/// Built fresh for each messaging event; nothing is shared between requests.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct EventContext {
    /// Id of the page the entry belongs to
    pub page_id: String,

    /// The user that triggered the event
    pub sender: Sender,

    /// The page (or user) the event was addressed to
    pub recipient: Recipient,

    /// When the event happened.
    ///
    /// Always present for postbacks; optional for other kinds.
    pub timestamp: Option<Timestamp>,
}

/// A decoded inbound messaging event.
#[derive(PartialEq, Clone, Debug)]
#[non_exhaustive]
pub enum InboundEvent {
    /// A plain text message
    Text(IncomingTextMessage),

    /// One attachment of a message
    Attachment(IncomingAttachmentMessage),

    /// Delivery confirmation for one message id
    Delivery(Delivery),

    /// A postback
    Postback(Postback),

    /// An opt-in
    OptIn(OptIn),
}

impl InboundEvent {
    /// The registry slot this event is routed to.
    pub fn kind(&self) -> DispatchKind {
        match self {
            Self::Text(_) => DispatchKind::TextMessage,
            Self::Attachment(_) => DispatchKind::AttachmentMessage,
            Self::Delivery(_) => DispatchKind::Delivery,
            Self::Postback(_) => DispatchKind::Postback,
            Self::OptIn(_) => DispatchKind::OptIn,
        }
    }
}

/// The handler slot an [`InboundEvent`] is routed to.
///
/// A message maps to two slots: text or attachment.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub enum DispatchKind {
    TextMessage,
    AttachmentMessage,
    Delivery,
    Postback,
    OptIn,
}

impl fmt::Display for DispatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::TextMessage => "text_message",
            Self::AttachmentMessage => "attachment_message",
            Self::Delivery => "delivery",
            Self::Postback => "postback",
            Self::OptIn => "optin",
        })
    }
}

/// A text message sent by a user.
#[derive(PartialEq, Clone, Debug)]
#[non_exhaustive]
pub struct IncomingTextMessage {
    /// Message id
    pub mid: String,

    /// Sequence number
    pub seq: f64,

    /// Message text
    pub text: String,

    /// Payload of the quick reply the user tapped, if the text came from one
    pub quick_reply: Option<String>,
}

/// One attachment of a message sent by a user.
///
/// A message with N attachments produces N of these, all sharing `mid` and `seq`.
#[derive(PartialEq, Clone, Debug)]
#[non_exhaustive]
pub struct IncomingAttachmentMessage {
    /// Id of the message carrying the attachment
    pub mid: String,

    /// Sequence number of the message
    pub seq: f64,

    /// Attachment type (`image`, `audio`, `video`, `file`, ...)
    pub attachment_type: String,

    /// Where the attachment can be downloaded from
    pub attachment_url: String,
}

/// Delivery confirmation for one message.
///
/// All receipts decoded from the same delivery node share `watermark` and `seq`.
#[derive(PartialEq, Clone, Debug)]
#[non_exhaustive]
pub struct Delivery {
    /// The delivered message
    pub mid: String,

    /// All messages sent before this point were delivered
    pub watermark: f64,

    /// Sequence number
    pub seq: f64,
}

/// A postback.
#[derive(PartialEq, Eq, Clone, Debug)]
#[non_exhaustive]
pub struct Postback {
    /// Developer-defined payload of the tapped button
    pub payload: String,
}

/// An opt-in.
///
/// The node is not interpreted; `raw` holds it as received.
#[derive(PartialEq, Clone, Debug)]
#[non_exhaustive]
pub struct OptIn {
    pub raw: serde_json::Value,
}

// Constructors for code outside the crate (tests, custom dispatchers).
impl IncomingTextMessage {
    pub fn new(mid: impl Into<String>, seq: f64, text: impl Into<String>) -> Self {
        Self {
            mid: mid.into(),
            seq,
            text: text.into(),
            quick_reply: None,
        }
    }

    /// Sets the quick reply payload.
    pub fn with_quick_reply(mut self, payload: impl Into<String>) -> Self {
        self.quick_reply = Some(payload.into());
        self
    }
}

impl IncomingAttachmentMessage {
    pub fn new(
        mid: impl Into<String>,
        seq: f64,
        attachment_type: impl Into<String>,
        attachment_url: impl Into<String>,
    ) -> Self {
        Self {
            mid: mid.into(),
            seq,
            attachment_type: attachment_type.into(),
            attachment_url: attachment_url.into(),
        }
    }
}

impl Delivery {
    pub fn new(mid: impl Into<String>, watermark: f64, seq: f64) -> Self {
        Self {
            mid: mid.into(),
            watermark,
            seq,
        }
    }
}

impl Postback {
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
        }
    }
}

impl OptIn {
    pub fn new(raw: serde_json::Value) -> Self {
        Self { raw }
    }
}

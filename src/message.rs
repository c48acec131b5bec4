//! Messenger Outbound Message Types and Builders
//!
//! This module defines the building blocks for composing messages sent through the
//! Send API: plain text, images, and the generic, button and receipt templates, each
//! optionally followed by quick replies.
//!
//! ## Key Types & Features
//!
//! - [`OutboundMessage`]: Every kind of message a page can send. Serializes to the
//!   Send API's `message` object with its fixed `type` / `template_type` discriminants.
//! - [`Draft`]: A message plus its quick replies. Use its associated functions like
//!   [`Draft::text()`], [`Draft::image()`] or [`Draft::buttons()`] to start building.
//! - [`Button`]: `web_url` and `postback` buttons for templates.
//! - [`MessageEnvelope`]: The full Send API request body: a [`Recipient`] plus either a
//!   message or a [`SenderAction`], never both.
//!
//! ## Examples
//!
//! ---
//! ### Send a Simple Text Message
//! ```rust,no_run
//! use messenger_bot_rs::{message::Draft, Client};
//!
//! # async fn send_text(client: &Client) -> Result<(), messenger_bot_rs::Error> {
//! let draft = Draft::text("Hello from Rust! How can I help you today?");
//! client.message("USER_PSID").send(draft).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ---
//! ### Offer Quick Replies
//! ```rust
//! use messenger_bot_rs::message::{Draft, QuickReply};
//!
//! let draft = Draft::text("Pick a color")
//!     .quick_reply(QuickReply::text("Red", "PICK_RED"))
//!     .quick_reply(QuickReply::text("Green", "PICK_GREEN"));
//!
//! assert_eq!(
//!     serde_json::to_value(&draft).unwrap(),
//!     serde_json::json!({
//!         "text": "Pick a color",
//!         "quick_replies": [
//!             {"content_type": "text", "title": "Red", "payload": "PICK_RED"},
//!             {"content_type": "text", "title": "Green", "payload": "PICK_GREEN"}
//!         ]
//!     })
//! );
//! ```
//!
//! ---
//! ### Send a Generic Template
//! ```rust,no_run
//! use messenger_bot_rs::message::{Button, Draft, GenericTemplateElement};
//! # use messenger_bot_rs::Client;
//!
//! # async fn send_generic(client: &Client) -> Result<(), messenger_bot_rs::Error> {
//! let element = GenericTemplateElement::new("rift")
//!     .subtitle("Next-generation virtual reality")
//!     .item_url("https://www.oculus.com/en-us/rift/")
//!     .image_url("https://example.com/rift.png")
//!     .button(Button::url("Open Web URL", "https://www.oculus.com/en-us/rift/"))
//!     .button(Button::postback("Call Postback", "Payload for first bubble"));
//!
//! client.message("USER_PSID").send(Draft::generic([element])).await?;
//! # Ok(())
//! # }
//! ```

use serde::{Serialize, Serializer};

use crate::{rest::client::WireMessage, Recipient};

/// Every kind of message a page can send.
#[derive(PartialEq, Clone, Debug)]
#[non_exhaustive]
pub enum OutboundMessage {
    /// Plain text
    Text(String),

    /// An image fetched by Messenger from a URL (`type: "image"`)
    Image(ImagePayload),

    /// A horizontal carousel of bubbles (`template_type: "generic"`)
    GenericTemplate(GenericTemplate),

    /// Text with up to three buttons (`template_type: "button"`)
    ButtonTemplate(ButtonTemplate),

    /// An order confirmation (`template_type: "receipt"`)
    ReceiptTemplate(ReceiptTemplate),
}

impl Serialize for OutboundMessage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        WireMessage::from(self).serialize(serializer)
    }
}

/// Payload of an image attachment.
#[derive(Serialize, PartialEq, Eq, Clone, Debug)]
#[non_exhaustive]
pub struct ImagePayload {
    pub url: String,
}

impl ImagePayload {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// Payload of a generic template.
#[derive(Serialize, PartialEq, Clone, Debug, Default)]
#[non_exhaustive]
pub struct GenericTemplate {
    pub elements: Vec<GenericTemplateElement>,
}

/// One bubble of a generic template.
#[derive(Serialize, PartialEq, Clone, Debug)]
#[non_exhaustive]
pub struct GenericTemplateElement {
    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub buttons: Vec<Button>,
}

impl GenericTemplateElement {
    /// Creates a bubble with only a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            item_url: None,
            image_url: None,
            subtitle: None,
            buttons: Vec::new(),
        }
    }

    /// URL opened when the bubble is tapped.
    pub fn item_url(mut self, url: impl Into<String>) -> Self {
        self.item_url = Some(url.into());
        self
    }

    pub fn image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    pub fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    /// Appends a button to the bubble.
    pub fn button(mut self, button: Button) -> Self {
        self.buttons.push(button);
        self
    }
}

/// Payload of a button template.
#[derive(Serialize, PartialEq, Clone, Debug)]
#[non_exhaustive]
pub struct ButtonTemplate {
    pub text: String,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub buttons: Vec<Button>,
}

impl ButtonTemplate {
    pub fn new(text: impl Into<String>, buttons: impl IntoIterator<Item = Button>) -> Self {
        Self {
            text: text.into(),
            buttons: buttons.into_iter().collect(),
        }
    }
}

/// A template button.
///
/// # Example
/// ```rust
/// use messenger_bot_rs::message::Button;
///
/// let url = Button::url("Show Website", "https://petersapparel.parseapp.com");
/// assert_eq!(
///     serde_json::to_value(&url).unwrap(),
///     serde_json::json!({
///         "type": "web_url",
///         "title": "Show Website",
///         "url": "https://petersapparel.parseapp.com"
///     })
/// );
///
/// let postback = Button::postback("Start Chatting", "USER_DEFINED_PAYLOAD");
/// assert_eq!(
///     serde_json::to_value(&postback).unwrap(),
///     serde_json::json!({
///         "type": "postback",
///         "title": "Start Chatting",
///         "payload": "USER_DEFINED_PAYLOAD"
///     })
/// );
/// ```
#[derive(Serialize, PartialEq, Eq, Clone, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
pub enum Button {
    /// Opens a URL in the Messenger webview.
    WebUrl { title: String, url: String },

    /// Sends a postback webhook event carrying `payload`.
    Postback { title: String, payload: String },
}

impl Button {
    /// Create a URL button
    #[inline]
    pub fn url(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self::WebUrl {
            title: title.into(),
            url: url.into(),
        }
    }

    /// Create a postback button
    #[inline]
    pub fn postback(title: impl Into<String>, payload: impl Into<String>) -> Self {
        Self::Postback {
            title: title.into(),
            payload: payload.into(),
        }
    }

    /// The visible label of the button.
    pub fn title(&self) -> &str {
        match self {
            Self::WebUrl { title, .. } | Self::Postback { title, .. } => title,
        }
    }
}

/// Payload of a receipt template.
///
/// # Example
/// ```rust
/// use messenger_bot_rs::message::{Address, Adjustment, ReceiptElement, ReceiptTemplate, Summary};
///
/// let receipt = ReceiptTemplate::new(
///     "Stephane Crozatier",
///     "12345678902",
///     "USD",
///     "Visa 2345",
///     Summary::new(56.14).subtotal(75.00).shipping_cost(4.95).total_tax(6.19),
/// )
/// .order_url("http://petersapparel.parseapp.com/order?order_id=123456")
/// .timestamp("1428444852")
/// .element(ReceiptElement::new("Classic White T-Shirt", 50.0).quantity(2).currency("USD"))
/// .address(Address::new("1 Hacker Way", "Menlo Park", "94025", "CA", "US"))
/// .adjustment(Adjustment::new("New Customer Discount", 20.0));
///
/// let value = serde_json::to_value(&receipt).unwrap();
/// assert_eq!(value["summary"]["total_cost"], 56.14);
/// assert_eq!(value["address"]["street_1"], "1 Hacker Way");
/// ```
#[derive(Serialize, PartialEq, Clone, Debug)]
#[non_exhaustive]
pub struct ReceiptTemplate {
    pub recipient_name: String,
    pub order_number: String,
    pub currency: String,
    pub payment_method: String,

    /// Order time as a UNIX timestamp string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_url: Option<String>,

    pub elements: Vec<ReceiptElement>,

    /// Shipping address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,

    pub summary: Summary,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub adjustments: Vec<Adjustment>,
}

impl ReceiptTemplate {
    pub fn new(
        recipient_name: impl Into<String>,
        order_number: impl Into<String>,
        currency: impl Into<String>,
        payment_method: impl Into<String>,
        summary: Summary,
    ) -> Self {
        Self {
            recipient_name: recipient_name.into(),
            order_number: order_number.into(),
            currency: currency.into(),
            payment_method: payment_method.into(),
            timestamp: None,
            order_url: None,
            elements: Vec::new(),
            address: None,
            summary,
            adjustments: Vec::new(),
        }
    }

    pub fn timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    pub fn order_url(mut self, url: impl Into<String>) -> Self {
        self.order_url = Some(url.into());
        self
    }

    /// Appends an ordered item.
    pub fn element(mut self, element: ReceiptElement) -> Self {
        self.elements.push(element);
        self
    }

    pub fn address(mut self, address: Address) -> Self {
        self.address = Some(address);
        self
    }

    pub fn adjustment(mut self, adjustment: Adjustment) -> Self {
        self.adjustments.push(adjustment);
        self
    }
}

/// An ordered item on a receipt.
#[derive(Serialize, PartialEq, Clone, Debug)]
#[non_exhaustive]
pub struct ReceiptElement {
    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,

    pub price: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl ReceiptElement {
    pub fn new(title: impl Into<String>, price: f64) -> Self {
        Self {
            title: title.into(),
            subtitle: None,
            quantity: None,
            price,
            currency: None,
            image_url: None,
        }
    }

    pub fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn quantity(mut self, quantity: i64) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    pub fn image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }
}

/// A shipping address.
#[derive(Serialize, PartialEq, Eq, Clone, Debug)]
#[non_exhaustive]
pub struct Address {
    pub street_1: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub street_2: Option<String>,

    pub city: String,
    pub postal_code: String,
    pub state: String,

    /// Two-letter country abbreviation
    pub country: String,
}

impl Address {
    pub fn new(
        street_1: impl Into<String>,
        city: impl Into<String>,
        postal_code: impl Into<String>,
        state: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            street_1: street_1.into(),
            street_2: None,
            city: city.into(),
            postal_code: postal_code.into(),
            state: state.into(),
            country: country.into(),
        }
    }

    pub fn street_2(mut self, street_2: impl Into<String>) -> Self {
        self.street_2 = Some(street_2.into());
        self
    }
}

/// Payment summary of a receipt.
#[derive(Serialize, PartialEq, Clone, Debug)]
#[non_exhaustive]
pub struct Summary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtotal: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_cost: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_tax: Option<f64>,

    pub total_cost: f64,
}

impl Summary {
    pub fn new(total_cost: f64) -> Self {
        Self {
            subtotal: None,
            shipping_cost: None,
            total_tax: None,
            total_cost,
        }
    }

    pub fn subtotal(mut self, subtotal: f64) -> Self {
        self.subtotal = Some(subtotal);
        self
    }

    pub fn shipping_cost(mut self, shipping_cost: f64) -> Self {
        self.shipping_cost = Some(shipping_cost);
        self
    }

    pub fn total_tax(mut self, total_tax: f64) -> Self {
        self.total_tax = Some(total_tax);
        self
    }
}

/// A discount or surcharge on a receipt.
#[derive(Serialize, PartialEq, Clone, Debug)]
#[non_exhaustive]
pub struct Adjustment {
    pub name: String,
    pub amount: f64,
}

impl Adjustment {
    pub fn new(name: impl Into<String>, amount: f64) -> Self {
        Self {
            name: name.into(),
            amount,
        }
    }
}

/// Content type of a quick reply. Messenger only supports text quick replies here.
#[derive(Serialize, PartialEq, Eq, Clone, Copy, Debug, Default)]
#[serde(rename_all = "snake_case")]
pub enum QuickReplyContentType {
    #[default]
    Text,
}

/// A button shown above the composer; tapping it sends `title` as a text message
/// carrying `payload`.
#[derive(Serialize, PartialEq, Eq, Clone, Debug)]
#[non_exhaustive]
pub struct QuickReply {
    pub content_type: QuickReplyContentType,
    pub title: String,
    pub payload: String,
}

impl QuickReply {
    /// Create a text quick reply
    pub fn text(title: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            content_type: QuickReplyContentType::Text,
            title: title.into(),
            payload: payload.into(),
        }
    }
}

/// A message ready to be sent: its content plus any quick replies.
///
/// A `Draft` serializes to the Send API's `message` object.
///
/// # Example
/// ```rust
/// use messenger_bot_rs::message::Draft;
///
/// let draft = Draft::image("http://messengerdemo.parseapp.com/img/touch.png");
/// assert_eq!(
///     serde_json::to_value(&draft).unwrap(),
///     serde_json::json!({
///         "attachment": {
///             "type": "image",
///             "payload": {"url": "http://messengerdemo.parseapp.com/img/touch.png"}
///         }
///     })
/// );
/// ```
#[derive(Serialize, PartialEq, Clone, Debug)]
#[non_exhaustive]
#[must_use = "Draft is an unsent message that might need to be sent."]
pub struct Draft {
    /// The actual content of the message to be sent.
    #[serde(flatten)]
    pub message: OutboundMessage,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub quick_replies: Vec<QuickReply>,
}

impl Draft {
    /// Creates a draft for any [`OutboundMessage`].
    #[inline]
    pub fn new(message: OutboundMessage) -> Self {
        Self {
            message,
            quick_replies: Vec::new(),
        }
    }

    /// Creates a text message draft.
    #[inline]
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(OutboundMessage::Text(text.into()))
    }

    /// Creates an image message draft.
    #[inline]
    pub fn image(url: impl Into<String>) -> Self {
        Self::new(OutboundMessage::Image(ImagePayload::new(url)))
    }

    /// Creates a generic template draft from its bubbles.
    pub fn generic(elements: impl IntoIterator<Item = GenericTemplateElement>) -> Self {
        Self::new(OutboundMessage::GenericTemplate(GenericTemplate {
            elements: elements.into_iter().collect(),
        }))
    }

    /// Creates a button template draft.
    pub fn buttons(text: impl Into<String>, buttons: impl IntoIterator<Item = Button>) -> Self {
        Self::new(OutboundMessage::ButtonTemplate(ButtonTemplate::new(
            text, buttons,
        )))
    }

    /// Creates a receipt template draft.
    #[inline]
    pub fn receipt(receipt: ReceiptTemplate) -> Self {
        Self::new(OutboundMessage::ReceiptTemplate(receipt))
    }

    /// Appends a quick reply.
    pub fn quick_reply(mut self, quick_reply: QuickReply) -> Self {
        self.quick_replies.push(quick_reply);
        self
    }

    /// Appends several quick replies.
    pub fn quick_replies(mut self, quick_replies: impl IntoIterator<Item = QuickReply>) -> Self {
        self.quick_replies.extend(quick_replies);
        self
    }
}

/// Types convertible into a [`Draft`].
///
/// Lets [`MessageManager::send`](crate::client::MessageManager::send) accept a plain
/// string as well as a fully built draft.
pub trait IntoDraft: Send {
    /// Convert into a message draft
    fn into_draft(self) -> Draft;
}

impl IntoDraft for Draft {
    #[inline]
    fn into_draft(self) -> Draft {
        self
    }
}

impl IntoDraft for OutboundMessage {
    #[inline]
    fn into_draft(self) -> Draft {
        Draft::new(self)
    }
}

impl IntoDraft for ReceiptTemplate {
    #[inline]
    fn into_draft(self) -> Draft {
        Draft::receipt(self)
    }
}

macro_rules! impl_into_draft_text {
    ($($ty:ty),*) => {
        $(
            impl IntoDraft for $ty {
                #[inline]
                fn into_draft(self) -> Draft {
                    Draft::text(self)
                }
            }
        )*
    };
}

impl_into_draft_text!(&str, String, &String);

/// How the recipient is notified of a message.
#[derive(Serialize, PartialEq, Eq, Clone, Copy, Debug, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    /// Sound or vibration
    #[default]
    Regular,
    /// On-screen notification only
    SilentPush,
    /// No notification
    NoPush,
}

/// Typing indicators and read receipts.
#[derive(Serialize, PartialEq, Eq, Clone, Copy, Debug)]
#[serde(rename_all = "snake_case")]
pub enum SenderAction {
    TypingOn,
    TypingOff,
    MarkSeen,
}

/// What an envelope carries. Exactly one of the two.
#[derive(Serialize, PartialEq, Clone, Debug)]
#[serde(rename_all = "snake_case")]
pub enum EnvelopeContent {
    Message(Draft),
    SenderAction(SenderAction),
}

/// A Send API request body.
///
/// # Example
/// ```rust
/// use messenger_bot_rs::{
///     message::{MessageEnvelope, NotificationType, SenderAction},
///     Recipient,
/// };
///
/// let envelope = MessageEnvelope::sender_action(Recipient::new("USER"), SenderAction::TypingOn)
///     .notification_type(NotificationType::NoPush);
///
/// assert_eq!(
///     serde_json::to_value(&envelope).unwrap(),
///     serde_json::json!({
///         "recipient": {"id": "USER"},
///         "sender_action": "typing_on",
///         "notification_type": "NO_PUSH"
///     })
/// );
/// ```
#[derive(Serialize, PartialEq, Clone, Debug)]
#[non_exhaustive]
pub struct MessageEnvelope {
    pub recipient: Recipient,

    #[serde(flatten)]
    pub content: EnvelopeContent,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_type: Option<NotificationType>,
}

impl MessageEnvelope {
    /// An envelope carrying a message.
    pub fn message(recipient: Recipient, draft: impl IntoDraft) -> Self {
        Self {
            recipient,
            content: EnvelopeContent::Message(draft.into_draft()),
            notification_type: None,
        }
    }

    /// An envelope carrying a sender action.
    pub fn sender_action(recipient: Recipient, action: SenderAction) -> Self {
        Self {
            recipient,
            content: EnvelopeContent::SenderAction(action),
            notification_type: None,
        }
    }

    /// Sets the notification type.
    pub fn notification_type(mut self, notification_type: NotificationType) -> Self {
        self.notification_type = Some(notification_type);
        self
    }
}

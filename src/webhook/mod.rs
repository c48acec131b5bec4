//! Webhook body decoding
//!
//! [`process_webhook_body`] turns a raw webhook request body into typed events and
//! hands them to a [`Dispatch`] implementation, one at a time, in document order.
//!
//! Messenger payloads are loosely typed, so decoding is fault-isolating: a missing or
//! mistyped field skips the smallest unit that needs it (one attachment, one delivered
//! message id, one messaging event, one entry) and logs a `warn!` naming the field.
//! Everything around it is still decoded. Only a body that is not JSON at all is an
//! error.
//!
//! The pieces are exposed for custom pipelines: [`extract`] / [`Node`] read typed
//! fields out of untyped JSON, and [`classify`] decides what a messaging event is.

use std::io::Read;

use serde_json::{Deserializer, Value};
use tracing::{debug, trace, warn};

use crate::{
    error::PayloadError,
    event::EventContext,
    handler::{Dispatch, Dispatched},
    Recipient, Sender, Timestamp,
};

mod classify;
mod decode;
mod extract;

pub use classify::classify;
pub use extract::{extract, Field, FieldKind, Node};

/// Tally of one [`process_webhook_body`] pass.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
#[non_exhaustive]
pub struct Ack {
    /// Top-level JSON documents read from the body
    pub documents: usize,

    /// Events handed to the dispatcher
    pub dispatched: usize,

    /// Dispatched events no handler was registered for
    pub unhandled: usize,

    /// Units (entries, events, attachments, message ids) skipped over a missing or
    /// mistyped field
    pub skipped: usize,

    /// Messaging events of no known kind
    pub unknown: usize,
}

impl Ack {
    fn record(&mut self, outcome: Dispatched) {
        self.dispatched += 1;
        if outcome == Dispatched::Unhandled {
            self.unhandled += 1;
        }
    }
}

/// Decodes a webhook request body and dispatches every event it carries.
///
/// The body may hold several concatenated JSON documents; they are read one at a
/// time until the body is exhausted. Documents whose `object` is not `"page"` are
/// skipped. Each event is dispatched as soon as it is decoded, so when a later
/// document turns out to be malformed the events of the earlier ones have already
/// been delivered.
///
/// # Errors
/// A [`PayloadError`] if a document is not valid JSON. Field-level problems inside
/// a valid document are never errors.
///
/// # Example
/// ```rust
/// use messenger_bot_rs::{EventContext, InboundEvent, webhook::process_webhook_body};
///
/// let body = r#"{"object":"page","entry":[{"id":"PAGE","messaging":[
///     {"sender":{"id":"USER"},"recipient":{"id":"PAGE"},
///      "delivery":{"mids":["a","b"],"watermark":10,"seq":5}}]}]}"#;
///
/// let dispatcher = |_: &EventContext, event: InboundEvent| {
///     matches!(event, InboundEvent::Delivery(_))
/// };
/// let ack = process_webhook_body(body.as_bytes(), &dispatcher).unwrap();
///
/// // one receipt per delivered message id
/// assert_eq!(ack.dispatched, 2);
/// ```
pub fn process_webhook_body<R, D>(body: R, dispatcher: &D) -> Result<Ack, PayloadError>
where
    R: Read,
    D: Dispatch + ?Sized,
{
    let mut ack = Ack::default();

    let documents = Deserializer::from_reader(body).into_iter::<Value>();
    for (index, document) in documents.enumerate() {
        let document = document.map_err(|err| PayloadError::new(index, err))?;
        ack.documents += 1;
        walk_document(&document, dispatcher, &mut ack);
    }

    debug!(
        documents = ack.documents,
        dispatched = ack.dispatched,
        unhandled = ack.unhandled,
        skipped = ack.skipped,
        unknown = ack.unknown,
        "webhook body processed"
    );

    Ok(ack)
}

fn walk_document<D>(document: &Value, dispatcher: &D, ack: &mut Ack)
where
    D: Dispatch + ?Sized,
{
    let Some(root) = Node::from_value(document) else {
        trace!("webhook document is not a mapping, skipped");
        return;
    };
    if root.str("object") != Some("page") {
        trace!(object = ?root.get("object"), "not a page subscription, skipped");
        return;
    }

    let Some(entries) = root.seq("entry") else {
        warn!(field = "entry", "page document without entries, skipped");
        ack.skipped += 1;
        return;
    };

    for entry in entries {
        let Some(entry) = Node::from_value(entry) else {
            warn!(field = "entry", "entry is not a mapping, skipped");
            ack.skipped += 1;
            continue;
        };
        let Some(page_id) = entry.str("id") else {
            warn!(field = "id", "entry without page id, skipped");
            ack.skipped += 1;
            continue;
        };
        let Some(messaging) = entry.seq("messaging") else {
            warn!(field = "messaging", page_id, "entry without messaging events, skipped");
            ack.skipped += 1;
            continue;
        };

        for event in messaging {
            walk_event(page_id, event, dispatcher, ack);
        }
    }
}

fn walk_event<D>(page_id: &str, event: &Value, dispatcher: &D, ack: &mut Ack)
where
    D: Dispatch + ?Sized,
{
    let Some(event) = Node::from_value(event) else {
        warn!(field = "messaging", page_id, "messaging event is not a mapping, skipped");
        ack.skipped += 1;
        return;
    };
    let Some(sender) = event.node("sender").and_then(|s| s.str("id")) else {
        warn!(field = "sender.id", page_id, "messaging event without sender, skipped");
        ack.skipped += 1;
        return;
    };
    let Some(recipient) = event.node("recipient").and_then(|r| r.str("id")) else {
        warn!(field = "recipient.id", page_id, "messaging event without recipient, skipped");
        ack.skipped += 1;
        return;
    };

    let ctx = EventContext {
        page_id: page_id.to_owned(),
        sender: Sender::new(sender),
        recipient: Recipient::new(recipient),
        timestamp: event.number("timestamp").map(Timestamp::from_json_number),
    };

    decode::decode_event(event, &ctx, dispatcher, ack);
}

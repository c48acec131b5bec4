use serde_json::Value;
use tracing::{debug, info, warn};

use super::{classify, extract::Node, Ack};
use crate::{
    event::{
        Delivery, EventContext, EventKind, InboundEvent, IncomingAttachmentMessage,
        IncomingTextMessage, OptIn, Postback,
    },
    handler::Dispatch,
};

/// Decodes one messaging event and dispatches whatever it yields.
pub(super) fn decode_event<D>(event: Node<'_>, ctx: &EventContext, dispatcher: &D, ack: &mut Ack)
where
    D: Dispatch + ?Sized,
{
    match classify(event) {
        EventKind::OptIn => optin(event, ctx, dispatcher, ack),
        EventKind::Message => message(event, ctx, dispatcher, ack),
        EventKind::Delivery => delivery(event, ctx, dispatcher, ack),
        EventKind::Postback => postback(event, ctx, dispatcher, ack),
        EventKind::Unknown => {
            debug!(
                page_id = %ctx.page_id,
                sender = %ctx.sender,
                keys = ?event.as_map().keys().collect::<Vec<_>>(),
                "unknown messaging event, ignored"
            );
            ack.unknown += 1;
        }
    }
}

fn deliver<D>(ctx: &EventContext, event: InboundEvent, dispatcher: &D, ack: &mut Ack)
where
    D: Dispatch + ?Sized,
{
    ack.record(dispatcher.dispatch(ctx, event));
}

fn skip(ctx: &EventContext, kind: EventKind, field: &'static str, ack: &mut Ack) {
    warn!(
        %kind,
        field,
        page_id = %ctx.page_id,
        sender = %ctx.sender,
        "missing or mistyped field, event skipped"
    );
    ack.skipped += 1;
}

fn optin<D>(event: Node<'_>, ctx: &EventContext, dispatcher: &D, ack: &mut Ack)
where
    D: Dispatch + ?Sized,
{
    let raw = event.get("optin").cloned().unwrap_or_default();
    info!(page_id = %ctx.page_id, sender = %ctx.sender, %raw, "opt-in received");
    deliver(ctx, InboundEvent::OptIn(OptIn::new(raw)), dispatcher, ack);
}

fn message<D>(event: Node<'_>, ctx: &EventContext, dispatcher: &D, ack: &mut Ack)
where
    D: Dispatch + ?Sized,
{
    let Some(message) = event.node("message") else {
        return skip(ctx, EventKind::Message, "message", ack);
    };

    match message.get("attachments").and_then(Value::as_array) {
        Some(attachments) if !attachments.is_empty() => {
            for (index, element) in attachments.iter().enumerate() {
                match attachment(message, element) {
                    Ok(attachment) => {
                        deliver(ctx, InboundEvent::Attachment(attachment), dispatcher, ack)
                    }
                    Err(field) => {
                        warn!(
                            index,
                            field,
                            page_id = %ctx.page_id,
                            sender = %ctx.sender,
                            "missing or mistyped attachment field, attachment skipped"
                        );
                        ack.skipped += 1;
                    }
                }
            }
        }
        _ => match text(message) {
            Ok(text) => deliver(ctx, InboundEvent::Text(text), dispatcher, ack),
            Err(field) => skip(ctx, EventKind::Message, field, ack),
        },
    }
}

// Checks run in a fixed order; the first missing field is the one reported.
fn attachment(message: Node<'_>, element: &Value) -> Result<IncomingAttachmentMessage, &'static str> {
    let element = Node::from_value(element).ok_or("attachment")?;
    let payload = element.node("payload").ok_or("payload")?;
    let mid = message.str("mid").ok_or("mid")?;
    let seq = message.number("seq").ok_or("seq")?;
    let attachment_type = element.str("type").ok_or("type")?;
    let url = payload.str("url").ok_or("url")?;

    Ok(IncomingAttachmentMessage::new(mid, seq, attachment_type, url))
}

fn text(message: Node<'_>) -> Result<IncomingTextMessage, &'static str> {
    let mid = message.str("mid").ok_or("mid")?;
    let seq = message.number("seq").ok_or("seq")?;
    let text = message.str("text").ok_or("text")?;

    let mut decoded = IncomingTextMessage::new(mid, seq, text);
    if let Some(quick_reply) = message.node("quick_reply") {
        decoded.quick_reply = quick_reply.str("payload").map(str::to_owned);
    }
    Ok(decoded)
}

fn delivery<D>(event: Node<'_>, ctx: &EventContext, dispatcher: &D, ack: &mut Ack)
where
    D: Dispatch + ?Sized,
{
    let Some(delivery) = event.node("delivery") else {
        return skip(ctx, EventKind::Delivery, "delivery", ack);
    };
    let Some(seq) = delivery.number("seq") else {
        return skip(ctx, EventKind::Delivery, "seq", ack);
    };
    let Some(watermark) = delivery.number("watermark") else {
        return skip(ctx, EventKind::Delivery, "watermark", ack);
    };
    let Some(mids) = delivery.seq("mids") else {
        return skip(ctx, EventKind::Delivery, "mids", ack);
    };

    for (index, mid) in mids.iter().enumerate() {
        match mid.as_str() {
            Some(mid) => {
                let receipt = Delivery::new(mid, watermark, seq);
                deliver(ctx, InboundEvent::Delivery(receipt), dispatcher, ack);
            }
            None => {
                warn!(
                    index,
                    field = "mids",
                    page_id = %ctx.page_id,
                    "delivered message id is not a string, skipped"
                );
                ack.skipped += 1;
            }
        }
    }
}

fn postback<D>(event: Node<'_>, ctx: &EventContext, dispatcher: &D, ack: &mut Ack)
where
    D: Dispatch + ?Sized,
{
    let Some(payload) = event.node("postback").and_then(|p| p.str("payload")) else {
        return skip(ctx, EventKind::Postback, "payload", ack);
    };
    if ctx.timestamp.is_none() {
        return skip(ctx, EventKind::Postback, "timestamp", ack);
    }

    deliver(ctx, InboundEvent::Postback(Postback::new(payload)), dispatcher, ack);
}

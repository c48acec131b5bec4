//! Event handler registry
//!
//! Decoded events are handed to a [`Dispatch`] implementation. The usual one is
//! [`Handlers`]: a registry holding at most one callback per event kind, built once
//! with [`Handlers::builder`] before the webhook starts serving and read-only
//! afterwards. Because it never changes after `build`, it can be shared by every
//! in-flight request without locking.
//!
//! # Example
//! ```rust
//! use messenger_bot_rs::Handlers;
//!
//! let handlers = Handlers::builder()
//!     .on_text_message(|ctx, msg| {
//!         println!("{} says {}", ctx.sender, msg.text);
//!         true
//!     })
//!     .on_delivery(|_ctx, delivery| {
//!         println!("{} delivered", delivery.mid);
//!         true
//!     })
//!     .build();
//!
//! assert!(handlers.has_text_message());
//! assert!(!handlers.has_postback());
//! ```

use std::{fmt, sync::Arc};

use tracing::debug;

use crate::event::{
    Delivery, EventContext, InboundEvent, IncomingAttachmentMessage, IncomingTextMessage, OptIn,
    Postback,
};

/// What happened to an event handed to a [`Dispatch`].
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Dispatched {
    /// A handler ran and returned this value.
    ///
    /// The value is advisory: it is logged but never changes how the webhook
    /// responds or what is processed next.
    Handled(bool),

    /// No handler is registered for the event's kind; the event was dropped.
    Unhandled,
}

/// A webhook verification attempt, as seen by the verification callbacks.
#[derive(PartialEq, Eq, Clone, Debug)]
#[non_exhaustive]
pub struct Verification {
    /// `hub.mode` (Messenger sends `subscribe`)
    pub mode: String,

    /// `hub.verify_token` as sent by the caller
    pub verify_token: String,

    /// `hub.challenge`
    pub challenge: String,
}

/// Receiver of decoded webhook events.
///
/// Implemented by [`Handlers`] and by any `Fn(&EventContext, InboundEvent) -> bool`
/// closure.
///
/// Dispatch runs synchronously on the task that received the request. A slow
/// implementation holds up only that request.
pub trait Dispatch: Send + Sync {
    /// Routes one decoded event.
    fn dispatch(&self, ctx: &EventContext, event: InboundEvent) -> Dispatched;

    /// Called after a successful verification handshake.
    fn verified(&self, _verification: &Verification) -> Dispatched {
        Dispatched::Unhandled
    }

    /// Called after a rejected verification handshake.
    fn verification_failed(&self, _verification: &Verification) -> Dispatched {
        Dispatched::Unhandled
    }
}

impl<F> Dispatch for F
where
    F: Fn(&EventContext, InboundEvent) -> bool + Send + Sync,
{
    #[inline]
    fn dispatch(&self, ctx: &EventContext, event: InboundEvent) -> Dispatched {
        Dispatched::Handled(self(ctx, event))
    }
}

type Callback<T> = Arc<dyn Fn(&EventContext, T) -> bool + Send + Sync>;
type VerificationCallback = Arc<dyn Fn(&Verification) -> bool + Send + Sync>;

macro_rules! registry {
    ($(
        $(#[$doc:meta])*
        $slot:ident: $payload:ty
    ),* $(,)?) => {
        paste::paste! {
            /// One callback slot per event kind.
            ///
            /// Create with [`Handlers::builder`]. Kinds without a callback are dropped
            /// with a debug diagnostic.
            #[derive(Clone, Default)]
            pub struct Handlers {
                $($slot: Option<Callback<$payload>>,)*
                verified: Option<VerificationCallback>,
                verification_failed: Option<VerificationCallback>,
            }

            impl Handlers {
                $(
                    #[doc = "Whether a `" $slot "` callback is registered"]
                    pub fn [<has_ $slot>](&self) -> bool {
                        self.$slot.is_some()
                    }
                )*

                fn registered(&self) -> Vec<&'static str> {
                    let mut slots = Vec::new();
                    $(
                        if self.$slot.is_some() {
                            slots.push(stringify!($slot));
                        }
                    )*
                    if self.verified.is_some() {
                        slots.push("verified");
                    }
                    if self.verification_failed.is_some() {
                        slots.push("verification_failed");
                    }
                    slots
                }
            }

            impl HandlersBuilder {
                $(
                    $(#[$doc])*
                    ///
                    /// Registering again replaces the previous callback.
                    pub fn [<on_ $slot>]<F>(mut self, handler: F) -> Self
                    where
                        F: Fn(&EventContext, $payload) -> bool + Send + Sync + 'static,
                    {
                        if self.inner.$slot.replace(Arc::new(handler)).is_some() {
                            debug!(slot = stringify!($slot), "handler replaced");
                        }
                        self
                    }
                )*
            }
        }
    };
}

registry! {
    /// Registers the callback for text messages.
    text_message: IncomingTextMessage,
    /// Registers the callback for attachments. It runs once per attachment.
    attachment_message: IncomingAttachmentMessage,
    /// Registers the callback for delivery receipts. It runs once per delivered message id.
    delivery: Delivery,
    /// Registers the callback for postbacks.
    postback: Postback,
    /// Registers the callback for opt-ins.
    optin: OptIn,
}

/// Builder for [`Handlers`].
#[derive(Clone, Default)]
#[must_use]
pub struct HandlersBuilder {
    inner: Handlers,
}

impl HandlersBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the callback run after a successful verification handshake.
    pub fn on_verified<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Verification) -> bool + Send + Sync + 'static,
    {
        self.inner.verified = Some(Arc::new(handler));
        self
    }

    /// Registers the callback run after a rejected verification handshake.
    pub fn on_verification_failed<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Verification) -> bool + Send + Sync + 'static,
    {
        self.inner.verification_failed = Some(Arc::new(handler));
        self
    }

    /// Freezes the registry.
    pub fn build(self) -> Handlers {
        self.inner
    }
}

impl Handlers {
    pub fn builder() -> HandlersBuilder {
        HandlersBuilder::new()
    }
}

impl fmt::Debug for Handlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handlers")
            .field("registered", &self.registered())
            .finish()
    }
}

fn outcome(handled: Option<bool>) -> Dispatched {
    handled.map_or(Dispatched::Unhandled, Dispatched::Handled)
}

impl Dispatch for Handlers {
    fn dispatch(&self, ctx: &EventContext, event: InboundEvent) -> Dispatched {
        let kind = event.kind();
        let handled = match event {
            InboundEvent::Text(msg) => self.text_message.as_ref().map(|cb| cb(ctx, msg)),
            InboundEvent::Attachment(msg) => {
                self.attachment_message.as_ref().map(|cb| cb(ctx, msg))
            }
            InboundEvent::Delivery(delivery) => self.delivery.as_ref().map(|cb| cb(ctx, delivery)),
            InboundEvent::Postback(postback) => self.postback.as_ref().map(|cb| cb(ctx, postback)),
            InboundEvent::OptIn(optin) => self.optin.as_ref().map(|cb| cb(ctx, optin)),
        };

        match handled {
            Some(ack) => debug!(
                %kind,
                page_id = %ctx.page_id,
                sender = %ctx.sender,
                ack,
                "event dispatched"
            ),
            None => debug!(%kind, page_id = %ctx.page_id, "no handler registered, event dropped"),
        }

        outcome(handled)
    }

    fn verified(&self, verification: &Verification) -> Dispatched {
        outcome(self.verified.as_ref().map(|cb| cb(verification)))
    }

    fn verification_failed(&self, verification: &Verification) -> Dispatched {
        outcome(self.verification_failed.as_ref().map(|cb| cb(verification)))
    }
}

//! # Messenger Echo Bot
//!
//! Echoes every text message back to its sender. A few keywords answer with rich
//! content instead:
//! - `image`: an image attachment
//! - `button`: a button template
//! - `generic`: a two-bubble generic template
//! - `receipt`: an order receipt
//!
//! Run with a JSON config file (see `Config`) or the `MESSENGER_*` env-vars:
//! ```sh
//! RUST_LOG=info,messenger_bot_rs=debug cargo run --example echo_bot -- bot.json
//! ```

use std::env;

use messenger_bot_rs::{
    message::{
        Address, Adjustment, Button, Draft, GenericTemplateElement, ReceiptElement,
        ReceiptTemplate, SenderAction, Summary,
    },
    Client, Config, Handlers, Sender, Server,
};
use tracing::{error, info};

fn init_tracing() -> Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info,messenger_bot_rs=debug"))?;

    let fmt_layer = fmt::layer().with_target(true).with_line_number(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing()?;

    let config = match env::args().nth(1) {
        Some(path) => Config::load(path)?,
        None => Config::from_env()?,
    };

    // 1. The client *sends* replies.
    let client = Client::from_config(&config)?;

    // 2. The handlers *receive* events.
    let replies = client.clone();
    let handlers = Handlers::builder()
        .on_text_message(move |ctx, msg| {
            let client = replies.clone();
            let sender = ctx.sender.clone();
            tokio::spawn(async move { reply(client, sender, msg.text).await });
            true
        })
        .on_attachment_message(|ctx, msg| {
            info!(sender = %ctx.sender, kind = %msg.attachment_type, url = %msg.attachment_url, "attachment");
            true
        })
        .on_delivery(|_, delivery| {
            info!(mid = %delivery.mid, watermark = delivery.watermark, "delivered");
            true
        })
        .on_postback(move |ctx, postback| {
            let client = client.clone();
            let sender = ctx.sender.clone();
            let text = format!("Postback received: {}", postback.payload);
            tokio::spawn(async move { reply(client, sender, text).await });
            true
        })
        .on_optin(|ctx, optin| {
            info!(sender = %ctx.sender, raw = %optin.raw, "opt-in");
            true
        })
        .on_verified(|_| {
            info!("subscription confirmed");
            true
        })
        .build();

    // 3. The server ties them together.
    let mut serve = Server::builder().from_config(&config).build().serve(handlers);

    let stop = serve.shutdown_trigger();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        stop.await;
    });

    serve.await?;
    Ok(())
}

async fn reply(client: Client, sender: Sender, text: String) {
    let to = client.message(&sender);
    if let Err(err) = to.sender_action(SenderAction::TypingOn).await {
        error!(%err, "typing indicator failed");
    }

    let draft = match text.trim().to_lowercase().as_str() {
        "image" => Draft::image("https://messenger.fb.com/wp-content/uploads/2017/04/messenger-logo.png"),
        "button" => Draft::buttons(
            "What do you want to do next?",
            [
                Button::url("Show Website", "https://petersapparel.parseapp.com"),
                Button::postback("Start Chatting", "USER_DEFINED_PAYLOAD"),
            ],
        ),
        "generic" => Draft::generic([
            GenericTemplateElement::new("rift")
                .subtitle("Next-generation virtual reality")
                .item_url("https://www.oculus.com/en-us/rift/")
                .image_url("https://www.oculus.com/rift.png")
                .button(Button::url("Open Web URL", "https://www.oculus.com/en-us/rift/"))
                .button(Button::postback("Call Postback", "Payload for first bubble")),
            GenericTemplateElement::new("touch")
                .subtitle("Your Hands, Now in VR")
                .item_url("https://www.oculus.com/en-us/touch/")
                .button(Button::postback("Call Postback", "Payload for second bubble")),
        ]),
        "receipt" => Draft::receipt(
            ReceiptTemplate::new(
                "Peter Chang",
                "order1234",
                "USD",
                "Visa 1234",
                Summary::new(626.66)
                    .subtotal(698.99)
                    .shipping_cost(20.00)
                    .total_tax(57.67),
            )
            .order_url("https://petersapparel.parseapp.com/order?order_id=123456")
            .timestamp("1428444852")
            .element(
                ReceiptElement::new("Oculus Rift", 599.00)
                    .subtitle("Includes: headset, sensor, remote")
                    .quantity(1)
                    .currency("USD"),
            )
            .element(
                ReceiptElement::new("Samsung Gear VR", 99.99)
                    .subtitle("Frost White")
                    .quantity(1)
                    .currency("USD"),
            )
            .address(Address::new("1 Hacker Way", "Menlo Park", "94025", "CA", "US"))
            .adjustment(Adjustment::new("New Customer Discount", 50.0))
            .adjustment(Adjustment::new("$100 Off Coupon", 100.0)),
        ),
        _ => Draft::text(text),
    };

    match to.send(draft).await {
        Ok(sent) => info!(recipient = sent.recipient_id(), mid = ?sent.message_id(), "replied"),
        Err(err) => error!(%err, "reply failed"),
    }
}

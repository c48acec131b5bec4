use criterion::Criterion;
use messenger_bot_rs::{
    message::{Button, Draft, GenericTemplateElement, MessageEnvelope, QuickReply},
    Client, Recipient,
};

use crate::{ACCESS_TOKEN, RECIPIENT_ID};

pub fn bench_prepare_messages(c: &mut Criterion) {
    let client = Client::builder()
        .api_version("2.6")
        .build(ACCESS_TOKEN)
        .unwrap();

    let mut group = c.benchmark_group("Message Request Preparation");

    group.bench_function("text_with_quick_replies", |b| {
        b.iter(|| {
            let draft = Draft::text("Pick a color:").quick_replies([
                QuickReply::text("Red", "PICK_RED"),
                QuickReply::text("Green", "PICK_GREEN"),
            ]);
            let _prepared_request = client.message(RECIPIENT_ID).send(draft);
        });
    });

    group.bench_function("serialize_generic_template", |b| {
        let element = GenericTemplateElement::new("rift")
            .subtitle("Next-generation virtual reality")
            .item_url("https://www.oculus.com/en-us/rift/")
            .button(Button::url("Open Web URL", "https://www.oculus.com/en-us/rift/"))
            .button(Button::postback("Call Postback", "Payload for first bubble"));
        let envelope = MessageEnvelope::message(
            Recipient::new(RECIPIENT_ID),
            Draft::generic(vec![element; 4]),
        );

        b.iter(|| serde_json::to_vec(&envelope).unwrap());
    });

    group.finish();
}

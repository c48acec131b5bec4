mod common;

use common::*;
use messenger_bot_rs::{
    error::{Error, ServiceErrorKind},
    message::{
        Address, Button, Draft, GenericTemplateElement, MessageEnvelope, NotificationType,
        QuickReply, ReceiptElement, ReceiptTemplate, SenderAction, Summary,
    },
    Recipient,
};
use serde_json::json;
use wiremock::{
    matchers::{body_json, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

async fn expect_send(server: &MockServer, request_body: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/v2.6/me/messages"))
        .and(query_param("access_token", ACCESS_TOKEN))
        .and(body_json(&request_body))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "recipient_id": RECIPIENT_ID,
            "message_id": MESSAGE_ID
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_send_text_message() {
    let mock_server = MockServer::start().await;
    let client = client_for(&mock_server);

    expect_send(
        &mock_server,
        json!({
            "recipient": {"id": RECIPIENT_ID},
            "message": {"text": "hello, world!"}
        }),
    )
    .await;

    let created = client.send_text(RECIPIENT_ID, "hello, world!").await.unwrap();
    assert_eq!(created.recipient_id(), RECIPIENT_ID);
    assert_eq!(created.message_id(), Some(MESSAGE_ID));
}

#[tokio::test]
async fn test_send_text_with_quick_replies_and_notification() {
    let mock_server = MockServer::start().await;
    let client = client_for(&mock_server);

    expect_send(
        &mock_server,
        json!({
            "recipient": {"id": RECIPIENT_ID},
            "message": {
                "text": "Pick a color:",
                "quick_replies": [
                    {"content_type": "text", "title": "Red", "payload": "PICK_RED"},
                    {"content_type": "text", "title": "Green", "payload": "PICK_GREEN"}
                ]
            },
            "notification_type": "SILENT_PUSH"
        }),
    )
    .await;

    let draft = Draft::text("Pick a color:").quick_replies([
        QuickReply::text("Red", "PICK_RED"),
        QuickReply::text("Green", "PICK_GREEN"),
    ]);

    client
        .message(RECIPIENT_ID)
        .send(draft)
        .notification_type(NotificationType::SilentPush)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_send_image() {
    let mock_server = MockServer::start().await;
    let client = client_for(&mock_server);

    expect_send(
        &mock_server,
        json!({
            "recipient": {"id": RECIPIENT_ID},
            "message": {
                "attachment": {
                    "type": "image",
                    "payload": {"url": "https://petersapparel.com/img/shirt.png"}
                }
            }
        }),
    )
    .await;

    client
        .send_image(RECIPIENT_ID, "https://petersapparel.com/img/shirt.png")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_send_button_template() {
    let mock_server = MockServer::start().await;
    let client = client_for(&mock_server);

    expect_send(
        &mock_server,
        json!({
            "recipient": {"id": RECIPIENT_ID},
            "message": {
                "attachment": {
                    "type": "template",
                    "payload": {
                        "template_type": "button",
                        "text": "What do you want to do next?",
                        "buttons": [
                            {"type": "web_url", "url": "https://petersapparel.parseapp.com", "title": "Show Website"},
                            {"type": "postback", "title": "Start Chatting", "payload": "USER_DEFINED_PAYLOAD"}
                        ]
                    }
                }
            }
        }),
    )
    .await;

    client
        .send_buttons(
            RECIPIENT_ID,
            "What do you want to do next?",
            [
                Button::url("Show Website", "https://petersapparel.parseapp.com"),
                Button::postback("Start Chatting", "USER_DEFINED_PAYLOAD"),
            ],
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_send_generic_template() {
    let mock_server = MockServer::start().await;
    let client = client_for(&mock_server);

    expect_send(
        &mock_server,
        json!({
            "recipient": {"id": RECIPIENT_ID},
            "message": {
                "attachment": {
                    "type": "template",
                    "payload": {
                        "template_type": "generic",
                        "elements": [{
                            "title": "rift",
                            "subtitle": "Next-generation virtual reality",
                            "item_url": "https://www.oculus.com/en-us/rift/",
                            "buttons": [
                                {"type": "postback", "title": "Call Postback", "payload": "Payload for first bubble"}
                            ]
                        }]
                    }
                }
            }
        }),
    )
    .await;

    let element = GenericTemplateElement::new("rift")
        .subtitle("Next-generation virtual reality")
        .item_url("https://www.oculus.com/en-us/rift/")
        .button(Button::postback("Call Postback", "Payload for first bubble"));

    client.send_generic(RECIPIENT_ID, [element]).await.unwrap();
}

#[tokio::test]
async fn test_send_receipt_template() {
    let mock_server = MockServer::start().await;
    let client = client_for(&mock_server);

    expect_send(
        &mock_server,
        json!({
            "recipient": {"id": RECIPIENT_ID},
            "message": {
                "attachment": {
                    "type": "template",
                    "payload": {
                        "template_type": "receipt",
                        "recipient_name": "Stephane Crozatier",
                        "order_number": "12345678902",
                        "currency": "USD",
                        "payment_method": "Visa 2345",
                        "elements": [
                            {"title": "Classic White T-Shirt", "quantity": 2, "price": 50.0, "currency": "USD"}
                        ],
                        "address": {
                            "street_1": "1 Hacker Way",
                            "city": "Menlo Park",
                            "postal_code": "94025",
                            "state": "CA",
                            "country": "US"
                        },
                        "summary": {"subtotal": 75.0, "total_cost": 56.14}
                    }
                }
            }
        }),
    )
    .await;

    let receipt = ReceiptTemplate::new(
        "Stephane Crozatier",
        "12345678902",
        "USD",
        "Visa 2345",
        Summary::new(56.14).subtotal(75.0),
    )
    .element(
        ReceiptElement::new("Classic White T-Shirt", 50.0)
            .quantity(2)
            .currency("USD"),
    )
    .address(Address::new("1 Hacker Way", "Menlo Park", "94025", "CA", "US"));

    client.send_receipt(RECIPIENT_ID, receipt).await.unwrap();
}

#[tokio::test]
async fn test_sender_action_has_no_message_id() {
    let mock_server = MockServer::start().await;
    let client = client_for(&mock_server);

    Mock::given(method("POST"))
        .and(path("/v2.6/me/messages"))
        .and(body_json(json!({
            "recipient": {"id": RECIPIENT_ID},
            "sender_action": "typing_on"
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"recipient_id": RECIPIENT_ID})),
        )
        .mount(&mock_server)
        .await;

    let created = client
        .message(RECIPIENT_ID)
        .sender_action(SenderAction::TypingOn)
        .await
        .unwrap();
    assert_eq!(created.message_id(), None);
}

#[tokio::test]
async fn test_send_envelope_by_phone_number() {
    let mock_server = MockServer::start().await;
    let client = client_for(&mock_server);

    expect_send(
        &mock_server,
        json!({
            "recipient": {"phone_number": "+1(212)555-2368"},
            "message": {"text": "hello"},
            "notification_type": "NO_PUSH"
        }),
    )
    .await;

    let envelope = MessageEnvelope::message(Recipient::phone_number("+1(212)555-2368"), "hello")
        .notification_type(NotificationType::NoPush);
    client.send(envelope).await.unwrap();
}

#[tokio::test]
async fn test_api_error_is_mapped() {
    let mock_server = MockServer::start().await;
    let client = client_for(&mock_server);

    Mock::given(method("POST"))
        .and(path("/v2.6/me/messages"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "message": "(#100) No matching user found",
                "type": "OAuthException",
                "code": 100,
                "error_subcode": 2018001,
                "fbtrace_id": "BLBz/WZt8dN"
            }
        })))
        .mount(&mock_server)
        .await;

    let service = match client.send_text(RECIPIENT_ID, "hello").await {
        Err(Error::Service(service)) => service,
        other => panic!("expected a service error, got {other:?}"),
    };
    assert_eq!(service.status().as_u16(), 400);
    assert_eq!(service.endpoint(), Some("/v2.6/me/messages"));
    match service.kind() {
        ServiceErrorKind::Api(api) => {
            assert_eq!(api.error.code, 100);
            assert_eq!(api.error.fbtrace_id.as_deref(), Some("BLBz/WZt8dN"));
        }
        other => panic!("expected api error, got {other:?}"),
    }
    assert!(!service.to_string().contains(ACCESS_TOKEN));
}

#[tokio::test]
async fn test_unparseable_error_body() {
    let mock_server = MockServer::start().await;
    let client = client_for(&mock_server);

    Mock::given(method("POST"))
        .and(path("/v2.6/me/messages"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&mock_server)
        .await;

    let err = client.send_text(RECIPIENT_ID, "hello").await.unwrap_err();
    match err {
        Error::Service(service) => {
            assert_eq!(service.status().as_u16(), 502);
            assert!(matches!(service.kind(), ServiceErrorKind::Parse(_)));
        }
        other => panic!("expected a service error, got {other:?}"),
    }
}

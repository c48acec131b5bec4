mod common;

use std::sync::{Arc, Mutex};

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::*;
use messenger_bot_rs::{Handlers, WebhookService};
use serde_json::json;

type Log = Arc<Mutex<Vec<String>>>;

fn recording_handlers(log: &Log) -> Handlers {
    let (text, attachment, delivery, postback, optin, verified) = (
        log.clone(),
        log.clone(),
        log.clone(),
        log.clone(),
        log.clone(),
        log.clone(),
    );

    Handlers::builder()
        .on_text_message(move |ctx, msg| {
            text.lock()
                .unwrap()
                .push(format!("text {} {} {}", ctx.sender, msg.mid, msg.text));
            true
        })
        .on_attachment_message(move |_, msg| {
            attachment
                .lock()
                .unwrap()
                .push(format!("attachment {} {}", msg.attachment_type, msg.attachment_url));
            true
        })
        .on_delivery(move |_, d| {
            delivery.lock().unwrap().push(format!("delivery {}", d.mid));
            true
        })
        .on_postback(move |ctx, p| {
            let ts = ctx.timestamp.map(|t| t.seconds()).unwrap_or_default();
            postback
                .lock()
                .unwrap()
                .push(format!("postback {} {ts}", p.payload));
            true
        })
        .on_optin(move |_, o| {
            optin.lock().unwrap().push(format!("optin {}", o.raw["ref"]));
            true
        })
        .on_verified(move |v| {
            verified
                .lock()
                .unwrap()
                .push(format!("verified {}", v.challenge));
            true
        })
        .build()
}

async fn body_text(response: axum::http::Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_verification_handshake() {
    let log = Log::default();
    let service = WebhookService::builder()
        .verify_token(VERIFY_TOKEN)
        .build(recording_handlers(&log));

    let request = Request::get(format!(
        "/webhook?hub.mode=subscribe&hub.verify_token={VERIFY_TOKEN}&hub.challenge=1158201444"
    ))
    .body(Body::empty())
    .unwrap();
    let response = service.handle(request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "1158201444");

    let request = Request::get("/webhook?hub.mode=subscribe&hub.verify_token=nope&hub.challenge=x")
        .body(Body::empty())
        .unwrap();
    let response = service.handle(request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "O");

    assert_eq!(*log.lock().unwrap(), ["verified 1158201444"]);
}

#[tokio::test]
async fn test_mixed_delivery_is_dispatched_in_order() {
    let log = Log::default();
    let service = WebhookService::builder().build(recording_handlers(&log));

    let body = page_body(json!([
        {
            "sender": {"id": "USER_ID"}, "recipient": {"id": PAGE_ID}, "timestamp": 1458692752478u64,
            "message": {"mid": "mid.1457764197618:41d102a3e1ae206a38", "seq": 73, "text": "hello, world!"}
        },
        {
            "sender": {"id": "USER_ID"}, "recipient": {"id": PAGE_ID},
            "message": {"mid": "mid.2", "seq": 74, "attachments": [
                {"type": "image", "payload": {"url": "https://scontent.xx.fbcdn.net/a.jpg"}},
                {"type": "image", "payload": {}}
            ]}
        },
        {
            "sender": {"id": "USER_ID"}, "recipient": {"id": PAGE_ID},
            "delivery": {"mids": ["mid.1458668856218:ed81099e15d3f4f233", 7], "watermark": 1458668856253u64, "seq": 37}
        },
        {
            "sender": {"id": "USER_ID"}, "recipient": {"id": PAGE_ID}, "timestamp": 1458692752,
            "postback": {"payload": "USER_DEFINED_PAYLOAD"}
        },
        {
            "sender": {"id": "USER_ID"}, "recipient": {"id": PAGE_ID}, "timestamp": 1234567890,
            "optin": {"ref": "PASS_THROUGH_PARAM"}
        },
        {
            "sender": {"id": "USER_ID"}, "recipient": {"id": PAGE_ID},
            "read": {"watermark": 1458668856253u64, "seq": 38}
        }
    ]));

    let response = service
        .handle(Request::post("/webhook").body(body).unwrap())
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "OK");

    assert_eq!(
        *log.lock().unwrap(),
        [
            "text USER_ID mid.1457764197618:41d102a3e1ae206a38 hello, world!",
            "attachment image https://scontent.xx.fbcdn.net/a.jpg",
            "delivery mid.1458668856218:ed81099e15d3f4f233",
            "postback USER_DEFINED_PAYLOAD 1458692752",
            "optin \"PASS_THROUGH_PARAM\"",
        ]
    );
}

#[tokio::test]
async fn test_concatenated_documents_and_malformed_tail() {
    let log = Log::default();
    let service = WebhookService::builder().build(recording_handlers(&log));

    let first = page_body(json!([{
        "sender": {"id": "A"}, "recipient": {"id": PAGE_ID}, "timestamp": 1,
        "postback": {"payload": "FIRST"}
    }]));
    let second = page_body(json!([{
        "sender": {"id": "B"}, "recipient": {"id": PAGE_ID}, "timestamp": 2,
        "postback": {"payload": "SECOND"}
    }]));

    let response = service
        .handle(Request::post("/").body(format!("{first}\n{second}")).unwrap())
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = service
        .handle(Request::post("/").body(format!("{first}{{\"object\":")).unwrap())
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert_eq!(
        *log.lock().unwrap(),
        ["postback FIRST 1", "postback SECOND 2", "postback FIRST 1"]
    );
}

#[tokio::test]
async fn test_unregistered_kinds_are_acknowledged() {
    let service = WebhookService::builder().build(Handlers::default());

    let body = page_body(json!([{
        "sender": {"id": "USER_ID"}, "recipient": {"id": PAGE_ID},
        "message": {"mid": "m", "seq": 1, "text": "nobody listens"}
    }]));
    let response = service
        .handle(Request::post("/").body(body).unwrap())
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

use criterion::{BenchmarkId, Criterion, Throughput};
use messenger_bot_rs::{webhook::process_webhook_body, EventContext, InboundEvent};
use serde_json::json;

use crate::PAGE_ID;

fn mixed_document() -> String {
    json!({
        "object": "page",
        "entry": [{
            "id": PAGE_ID,
            "time": 1458692752478u64,
            "messaging": [
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
                    "delivery": {"mids": ["mid.1458668856218:ed81099e15d3f4f233"], "watermark": 1458668856253u64, "seq": 37}
                },
                {
                    "sender": {"id": "USER_ID"}, "recipient": {"id": PAGE_ID}, "timestamp": 1458692752,
                    "postback": {"payload": "USER_DEFINED_PAYLOAD"}
                }
            ]
        }]
    })
    .to_string()
}

fn count_all(_: &EventContext, _: InboundEvent) -> bool {
    true
}

pub fn bench_decode_mixed_body(c: &mut Criterion) {
    let body = mixed_document();

    let mut group = c.benchmark_group("Webhook Decoding");
    group.throughput(Throughput::Bytes(body.len() as u64));
    group.bench_function("mixed_body", |b| {
        b.iter(|| process_webhook_body(body.as_bytes(), &count_all).unwrap());
    });
    group.finish();
}

pub fn bench_decode_many_documents(c: &mut Criterion) {
    let document = mixed_document();

    let mut group = c.benchmark_group("Webhook Concatenated Documents");
    for documents in [1usize, 16, 128] {
        let body = document.repeat(documents);
        group.throughput(Throughput::Bytes(body.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(documents), &body, |b, body| {
            b.iter(|| process_webhook_body(body.as_bytes(), &count_all).unwrap());
        });
    }
    group.finish();
}

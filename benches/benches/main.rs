mod messages_benches;
mod webhook_benches;

// --- CONSTANTS ---
#[allow(dead_code)]
pub const PAGE_ID: &str = "PAGE_ID";
#[allow(dead_code)]
pub const ACCESS_TOKEN: &str = "EAAD...";
#[allow(dead_code)]
pub const RECIPIENT_ID: &str = "1254477777772919";

use criterion::{criterion_group, criterion_main};

use messages_benches::bench_prepare_messages;
use webhook_benches::{bench_decode_mixed_body, bench_decode_many_documents};

criterion_group!(
    benches,
    bench_decode_mixed_body,
    bench_decode_many_documents,
    bench_prepare_messages
);
criterion_main!(benches);

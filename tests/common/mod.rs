use messenger_bot_rs::Client;

// --- CONSTANTS ---
#[allow(dead_code)]
pub const PAGE_ID: &str = "PAGE_ID";
#[allow(dead_code)]
pub const ACCESS_TOKEN: &str = "EAAD...";
#[allow(dead_code)]
pub const RECIPIENT_ID: &str = "1254477777772919";
#[allow(dead_code)]
pub const MESSAGE_ID: &str = "mid.1456970487936:c34767dfe57ee6e339";
#[allow(dead_code)]
pub const VERIFY_TOKEN: &str = "my_voice_is_my_password_verify_me";

/// A client pointed at the mock server.
#[allow(dead_code)]
pub fn client_for(server: &wiremock::MockServer) -> Client {
    Client::builder()
        .api_version("2.6")
        .base_url(server.uri())
        .build(ACCESS_TOKEN)
        .unwrap()
}

/// Wraps messaging events in a page delivery document.
#[allow(dead_code)]
pub fn page_body(events: serde_json::Value) -> String {
    serde_json::json!({
        "object": "page",
        "entry": [{"id": PAGE_ID, "time": 1458692752478u64, "messaging": events}]
    })
    .to_string()
}

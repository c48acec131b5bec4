use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Router,
};
use std::{
    borrow::Cow,
    collections::HashMap,
    future::{ready, Ready},
    sync::Arc,
};
use subtle::ConstantTimeEq;
use tokio::{net::TcpListener, sync::Notify};
use tracing::{error, info, warn};

use crate::{
    error::Error,
    handler::{Dispatch, Verification},
    server::Server,
    webhook::process_webhook_body,
};

/// Body answered to a failed verification handshake.
pub(crate) const VERIFICATION_FALLBACK: &str = "O";

/// Body answered once every document of a delivery has been decoded.
pub(crate) const WEBHOOK_ACK: &str = "OK";

/// Internal shared state for the webhook logic.
/// This struct is used by both the high-level server and the low-level service.
pub(crate) struct InnerServer<D> {
    pub(crate) dispatcher: D,
    pub(crate) verify_token: Option<String>,
}

impl Server {
    pub(crate) async fn serve_inner<D>(
        self,
        dispatcher: D,
        notify: Option<Arc<Notify>>,
    ) -> Result<(), Error>
    where
        D: Dispatch + 'static,
    {
        let listener = TcpListener::bind(&self.config.endpoint)
            .await
            .map_err(|err| Error::Network(err.into()))?;

        if self.config.verify_token.is_none() {
            warn!("no verify token configured, every verification handshake will fail");
        }

        let state = Arc::new(InnerServer {
            dispatcher,
            verify_token: self.config.verify_token,
        });

        let app = Router::new()
            .route(
                &self.config.route_path,
                get(handle_verification).post(handle_webhook),
            )
            .with_state(state);

        info!(
            endpoint = %self.config.endpoint,
            route = %self.config.route_path,
            "webhook server listening"
        );

        if let Some(notify) = notify {
            notify.notify_one();
        }

        let r = if let Some(shutdown) = self.config.shutdown {
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown)
                .await
        } else {
            axum::serve(listener, app).await
        };

        r.map_err(|err| Error::Network(err.into()))
    }
}

// Verification handler
pub(crate) fn handle_verification<D>(
    State(state): State<Arc<InnerServer<D>>>,
    Query(mut query): Query<HashMap<String, String>>,
) -> Ready<(StatusCode, Cow<'static, str>)>
where
    D: Dispatch + 'static,
{
    let mut param = |key: &str| query.remove(key).unwrap_or_default();
    let verification = Verification {
        mode: param("hub.mode"),
        verify_token: param("hub.verify_token"),
        challenge: param("hub.challenge"),
    };

    if verification.mode == "subscribe" && token_matches(&state.verify_token, &verification) {
        info!("webhook verified");
        state.dispatcher.verified(&verification);
        ready((StatusCode::OK, verification.challenge.into()))
    } else {
        warn!(mode = %verification.mode, "webhook verification failed");
        state.dispatcher.verification_failed(&verification);
        ready((StatusCode::OK, VERIFICATION_FALLBACK.into()))
    }
}

fn token_matches(expected: &Option<String>, verification: &Verification) -> bool {
    match expected {
        Some(expected) => expected
            .as_bytes()
            .ct_eq(verification.verify_token.as_bytes())
            .into(),
        None => false,
    }
}

// Webhook handler
#[inline]
pub(crate) fn handle_webhook<D>(
    State(state): State<Arc<InnerServer<D>>>,
    body: Bytes,
) -> Ready<(StatusCode, Cow<'static, str>)>
where
    D: Dispatch + 'static,
{
    match process_webhook_body(&body[..], &state.dispatcher) {
        Ok(_) => ready((StatusCode::OK, WEBHOOK_ACK.into())),
        Err(err) => {
            error!(document = err.document, error = %err, "rejecting webhook body");
            ready((
                StatusCode::BAD_REQUEST,
                "Invalid JSON payload. \
                 Please ensure the body is valid JSON."
                    .into(),
            ))
        }
    }
}

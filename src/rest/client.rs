use std::borrow::Cow;

use reqwest::Response;
use serde::{Deserialize, Serialize};

use super::FromResponse;
use crate::{
    client::{Client, MessageCreate},
    error::{Error, ServiceError, ServiceErrorKind},
    message::{ButtonTemplate, GenericTemplate, ImagePayload, OutboundMessage, ReceiptTemplate},
    MetaError,
};

/// Wire shape of an outbound message body.
#[derive(Serialize, Debug)]
#[serde(untagged)]
pub(crate) enum WireMessage<'a> {
    Text { text: &'a str },
    Attachment { attachment: WireAttachment<'a> },
}

#[derive(Serialize, Debug)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub(crate) enum WireAttachment<'a> {
    Image(&'a ImagePayload),
    Template(WireTemplate<'a>),
}

#[derive(Serialize, Debug)]
#[serde(tag = "template_type", rename_all = "snake_case")]
pub(crate) enum WireTemplate<'a> {
    Generic(&'a GenericTemplate),
    Button(&'a ButtonTemplate),
    Receipt(&'a ReceiptTemplate),
}

impl<'a> From<&'a OutboundMessage> for WireMessage<'a> {
    fn from(value: &'a OutboundMessage) -> Self {
        let template = |template| WireMessage::Attachment {
            attachment: WireAttachment::Template(template),
        };

        match value {
            OutboundMessage::Text(text) => WireMessage::Text { text },
            OutboundMessage::Image(image) => WireMessage::Attachment {
                attachment: WireAttachment::Image(image),
            },
            OutboundMessage::GenericTemplate(generic) => template(WireTemplate::Generic(generic)),
            OutboundMessage::ButtonTemplate(buttons) => template(WireTemplate::Button(buttons)),
            OutboundMessage::ReceiptTemplate(receipt) => template(WireTemplate::Receipt(receipt)),
        }
    }
}

impl Client {
    /// Handles API responses with consistent error mapping
    pub(crate) async fn handle_response<T: FromResponse>(
        response: Response,
        endpoint: Cow<'_, str>,
    ) -> Result<T, Error> {
        let status = response.status();
        let body = response.bytes().await?;

        if status.is_success() {
            match serde_json::from_slice(&body) {
                Ok(response) => {
                    T::from_response(response).map_err(|err| err.service(endpoint, status).into())
                }
                Err(err) => Err(ServiceError::parse(
                    err.into(),
                    String::from_utf8_lossy(&body).to_string(),
                )
                .service(endpoint, status)
                .into()),
            }
        } else {
            Err(Self::handle_not_ok(&body).service(endpoint, status).into())
        }
    }

    #[inline(always)]
    fn handle_not_ok(body: &[u8]) -> ServiceErrorKind {
        // double error
        #[derive(Deserialize, Debug)]
        struct Error {
            error: MetaError,
        }
        match serde_json::from_slice::<Error>(body) {
            Ok(structured_error) => ServiceError::api(structured_error.error),
            Err(structured_parse) => ServiceError::parse(
                structured_parse.into(),
                String::from_utf8_lossy(body).to_string(),
            ),
        }
    }
}

/// Send API response
#[derive(Deserialize, Debug)]
pub(crate) struct SendMessageResponse {
    #[serde(default)]
    recipient_id: String,
    // Absent for sender actions
    #[serde(default)]
    message_id: Option<String>,
}

impl FromResponse for MessageCreate {
    type Response = SendMessageResponse;

    fn from_response(response: Self::Response) -> Result<Self, ServiceErrorKind> {
        if response.recipient_id.is_empty() {
            return Err(ServiceError::payload(
                "Missing recipient_id in response".into(),
            ));
        }

        Ok(MessageCreate {
            recipient_id: response.recipient_id,
            message_id: response.message_id,
        })
    }
}

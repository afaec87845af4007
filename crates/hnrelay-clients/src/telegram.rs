//! Telegram messaging sink
//!
//! Posts to a single channel through the Bot API (`sendMessage`,
//! `editMessageText`, `deleteMessage`) using HTML parse mode and an inline
//! keyboard.
//!
//! Telegram answers refusals with `ok: false`, an `error_code` and a
//! `description`. Two of those are mapped to outcomes the sync engine treats
//! as success:
//!
//! - deleting a message that is gone or too old to delete becomes
//!   [`SinkError::AlreadyGone`]
//! - editing a message to identical content ("message is not modified")
//!   succeeds

use crate::{http_client, truncate, ClientError, DEFAULT_TIMEOUT_SECS};
use async_trait::async_trait;
use hnrelay_domain::{Button, MessageHandle, MessagingSink, OutboundMessage, SinkError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default Bot API base URL
pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

const PARSE_MODE: &str = "HTML";

/// Bot API client bound to one channel
pub struct TelegramSink {
    api_base: String,
    token: String,
    chat_id: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct InlineKeyboardButton<'a> {
    text: &'a str,
    url: &'a str,
}

#[derive(Debug, Serialize)]
struct InlineKeyboardMarkup<'a> {
    inline_keyboard: Vec<Vec<InlineKeyboardButton<'a>>>,
}

impl<'a> InlineKeyboardMarkup<'a> {
    fn single_row(buttons: &'a [Button]) -> Self {
        let row = buttons
            .iter()
            .map(|b| InlineKeyboardButton {
                text: &b.text,
                url: &b.url,
            })
            .collect();
        Self {
            inline_keyboard: vec![row],
        }
    }
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
    reply_markup: InlineKeyboardMarkup<'a>,
    disable_notification: bool,
}

#[derive(Debug, Serialize)]
struct EditMessageTextRequest<'a> {
    chat_id: &'a str,
    message_id: i64,
    text: &'a str,
    parse_mode: &'a str,
    reply_markup: InlineKeyboardMarkup<'a>,
}

#[derive(Debug, Serialize)]
struct DeleteMessageRequest<'a> {
    chat_id: &'a str,
    message_id: i64,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    message_id: i64,
}

/// Envelope of every Bot API response
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    error_code: i64,
    #[serde(default)]
    description: String,
}

/// Which call produced a refusal, for classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Call {
    Send,
    Edit,
    Delete,
}

fn classify(call: Call, code: i64, description: String) -> SinkError {
    let gone = call == Call::Delete
        && code == 400
        && (description.contains("message to delete not found")
            || description.contains("message can't be deleted"));

    if gone {
        SinkError::AlreadyGone(description)
    } else {
        SinkError::Rejected { code, description }
    }
}

fn is_not_modified(err: &SinkError) -> bool {
    matches!(err, SinkError::Rejected { description, .. } if description.contains("message is not modified"))
}

impl TelegramSink {
    /// Create a sink posting to `chat_id` with the given bot token
    pub fn new(token: impl Into<String>, chat_id: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_api_base(
            DEFAULT_API_BASE,
            token,
            chat_id,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    /// Create a sink against a custom Bot API server
    pub fn with_api_base(
        api_base: impl Into<String>,
        token: impl Into<String>,
        chat_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(ClientError::MissingSetting("bot token".to_string()));
        }
        let chat_id = chat_id.into();
        if chat_id.trim().is_empty() {
            return Err(ClientError::MissingSetting("chat id".to_string()));
        }

        Ok(Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token,
            chat_id,
            client: http_client(timeout)?,
        })
    }

    /// Channel this sink posts to
    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }

    async fn call<B, T>(&self, call: Call, method: &str, body: &B) -> Result<Option<T>, SinkError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        // without_url keeps the bot token out of error messages
        let response = self
            .client
            .post(self.method_url(method))
            .json(body)
            .send()
            .await
            .map_err(|e| SinkError::Transport(format!("{} failed: {}", method, e.without_url())))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            SinkError::Transport(format!("{} response unreadable: {}", method, e.without_url()))
        })?;

        let parsed: ApiResponse<T> = match serde_json::from_str(&text) {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => {
                return Err(SinkError::Rejected {
                    code: i64::from(status.as_u16()),
                    description: truncate(&text),
                });
            }
            Err(e) => {
                return Err(SinkError::Transport(format!(
                    "{} returned an unparsable body: {}",
                    method, e
                )));
            }
        };

        if parsed.ok {
            Ok(parsed.result)
        } else {
            Err(classify(call, parsed.error_code, parsed.description))
        }
    }
}

#[async_trait]
impl MessagingSink for TelegramSink {
    async fn send(&self, message: &OutboundMessage) -> Result<MessageHandle, SinkError> {
        let request = SendMessageRequest {
            chat_id: &self.chat_id,
            text: &message.text,
            parse_mode: PARSE_MODE,
            reply_markup: InlineKeyboardMarkup::single_row(&message.buttons),
            disable_notification: true,
        };

        let sent: Option<SentMessage> = self.call(Call::Send, "sendMessage", &request).await?;
        sent.map(|m| MessageHandle::from_value(m.message_id))
            .ok_or_else(|| SinkError::Transport("sendMessage returned no message".to_string()))
    }

    async fn edit(&self, handle: MessageHandle, message: &OutboundMessage) -> Result<(), SinkError> {
        let request = EditMessageTextRequest {
            chat_id: &self.chat_id,
            message_id: handle.value(),
            text: &message.text,
            parse_mode: PARSE_MODE,
            reply_markup: InlineKeyboardMarkup::single_row(&message.buttons),
        };

        match self
            .call::<_, serde_json::Value>(Call::Edit, "editMessageText", &request)
            .await
        {
            Ok(_) => Ok(()),
            Err(e) if is_not_modified(&e) => {
                tracing::trace!(handle = %handle, "Message content unchanged");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn delete(&self, handle: MessageHandle) -> Result<(), SinkError> {
        let request = DeleteMessageRequest {
            chat_id: &self.chat_id,
            message_id: handle.value(),
        };

        self.call::<_, serde_json::Value>(Call::Delete, "deleteMessage", &request)
            .await
            .map(|_| ())
    }
}

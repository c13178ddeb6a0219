//! Minimal Telegram Bot API client and the sequential update loop.
//!
//! Talks to the Bot API directly over HTTPS: `getUpdates` long polling in,
//! `sendMessage` out. Updates are handled one at a time and every incoming
//! text message produces exactly one reply. No framework layer, no shared
//! mutable state after startup.

mod types;

use std::time::Duration;

use reqwest::Client;
use sheetfaq_resolver::{Reply, render, resolve};
use sheetfaq_shared::{MatchingConfig, MessagesConfig, QaTable, Result, SheetFaqError};
use tracing::{info, instrument, warn};

pub use types::{ApiResponse, Chat, Message, Update};

/// Production Bot API host.
const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Delay before retrying after a failed getUpdates call.
const POLL_RETRY_DELAY: Duration = Duration::from_secs(3);

/// User-Agent string for Bot API requests.
const USER_AGENT: &str = concat!("SheetFAQ/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// BotClient
// ---------------------------------------------------------------------------

/// A thin client for the two Bot API methods the bot needs.
///
/// The base URL embeds the token, so it is never logged and never appears
/// in error messages; errors name the API method instead.
pub struct BotClient {
    client: Client,
    base_url: String,
}

impl BotClient {
    /// Create a client against the production Bot API.
    pub fn new(token: &str) -> Result<Self> {
        Self::with_base_url(token, TELEGRAM_API_BASE)
    }

    /// Create a client against a different API host (integration tests).
    pub fn with_base_url(token: &str, base: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            // Must outlive the long-poll timeout or every idle poll errors
            .timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| SheetFaqError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: format!("{}/bot{token}", base.trim_end_matches('/')),
        })
    }

    /// Long-poll for updates at the given offset.
    pub async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>> {
        let body = serde_json::json!({
            "offset": offset,
            "timeout": timeout_secs,
            "allowed_updates": ["message"],
        });

        let response = self
            .client
            .post(format!("{}/getUpdates", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| SheetFaqError::Network(format!("getUpdates: {e}")))?;

        let api: ApiResponse<Vec<Update>> = response
            .json()
            .await
            .map_err(|e| SheetFaqError::Network(format!("getUpdates: bad response: {e}")))?;

        if !api.ok {
            return Err(SheetFaqError::Telegram(
                api.description
                    .unwrap_or_else(|| "getUpdates failed".into()),
            ));
        }

        Ok(api.result.unwrap_or_default())
    }

    /// Send a text reply to a chat.
    pub async fn send_message(&self, chat_id: i64, text: &str, markdown: bool) -> Result<()> {
        let mut body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
        });
        if markdown {
            body["parse_mode"] = serde_json::Value::String("Markdown".into());
        }

        let response = self
            .client
            .post(format!("{}/sendMessage", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| SheetFaqError::Network(format!("sendMessage: {e}")))?;

        let api: ApiResponse<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| SheetFaqError::Network(format!("sendMessage: bad response: {e}")))?;

        if !api.ok {
            return Err(SheetFaqError::Telegram(
                api.description
                    .unwrap_or_else(|| "sendMessage failed".into()),
            ));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Update dispatch
// ---------------------------------------------------------------------------

/// Decide the reply for a single update, if it warrants one.
///
/// Commands (`/`-prefixed, `/start` included) get the welcome message;
/// any other text goes through the resolver, so every text message gets
/// exactly one reply (whitespace-only text resolves to the no-answer
/// message). Only non-text updates (media, empty batches) are ignored.
pub fn handle_update(
    update: &Update,
    table: &QaTable,
    matching: &MatchingConfig,
    messages: &MessagesConfig,
) -> Option<(i64, Reply)> {
    let message = update.message.as_ref()?;
    let text = message.text.as_deref()?;

    let reply = if text.trim_start().starts_with('/') {
        Reply {
            text: messages.welcome.clone(),
            markdown: false,
        }
    } else {
        render(&resolve(text, table, matching), messages)
    };

    Some((message.chat.id, reply))
}

/// Run the long-poll loop until the process is stopped.
///
/// A failed poll is retried after a short delay; a failed send is logged
/// and the loop moves on. Each batch advances the offset past every update
/// it contained, replied-to or not.
#[instrument(skip_all, fields(entries = table.len()))]
pub async fn run_bot(
    client: &BotClient,
    table: &QaTable,
    matching: &MatchingConfig,
    messages: &MessagesConfig,
    poll_timeout_secs: u64,
) -> Result<()> {
    let mut offset = 0i64;
    info!("bot is running");

    loop {
        let updates = match client.get_updates(offset, poll_timeout_secs).await {
            Ok(updates) => updates,
            Err(e) => {
                warn!(error = %e, "getUpdates failed, retrying");
                tokio::time::sleep(POLL_RETRY_DELAY).await;
                continue;
            }
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);

            let Some((chat_id, reply)) = handle_update(&update, table, matching, messages) else {
                continue;
            };

            if let Err(e) = client.send_message(chat_id, &reply.text, reply.markdown).await {
                warn!(chat_id, error = %e, "failed to send reply");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> QaTable {
        let mut table = QaTable::new();
        table.insert("what is your name", "Bot");
        table.insert("how to reset password", "Go to settings");
        table
    }

    fn update_with_text(id: i64, chat_id: i64, text: &str) -> Update {
        Update {
            update_id: id,
            message: Some(Message {
                message_id: 1,
                chat: Chat { id: chat_id },
                text: Some(text.to_string()),
            }),
        }
    }

    #[test]
    fn start_command_gets_welcome() {
        let messages = MessagesConfig::default();
        let update = update_with_text(1, 55, "/start");
        let (chat_id, reply) =
            handle_update(&update, &sample_table(), &MatchingConfig::default(), &messages)
                .unwrap();
        assert_eq!(chat_id, 55);
        assert_eq!(reply.text, messages.welcome);
        assert!(!reply.markdown);
    }

    #[test]
    fn text_message_goes_through_resolver() {
        let update = update_with_text(1, 55, "What is your NAME");
        let (_, reply) = handle_update(
            &update,
            &sample_table(),
            &MatchingConfig::default(),
            &MessagesConfig::default(),
        )
        .unwrap();
        assert_eq!(reply.text, "Bot");
    }

    #[test]
    fn unanswerable_text_gets_no_answer_message() {
        let messages = MessagesConfig::default();
        let update = update_with_text(1, 55, "zzz qqq xxx");
        let (_, reply) = handle_update(
            &update,
            &sample_table(),
            &MatchingConfig::default(),
            &messages,
        )
        .unwrap();
        assert_eq!(reply.text, messages.no_answer);
    }

    #[test]
    fn non_text_updates_are_ignored() {
        let matching = MatchingConfig::default();
        let messages = MessagesConfig::default();
        let table = sample_table();

        let no_message = Update {
            update_id: 1,
            message: None,
        };
        assert!(handle_update(&no_message, &table, &matching, &messages).is_none());

        let no_text = Update {
            update_id: 2,
            message: Some(Message {
                message_id: 1,
                chat: Chat { id: 55 },
                text: None,
            }),
        };
        assert!(handle_update(&no_text, &table, &matching, &messages).is_none());
    }

    #[test]
    fn whitespace_only_text_still_gets_one_reply() {
        let messages = MessagesConfig::default();
        let blank = update_with_text(3, 55, "   ");
        let (chat_id, reply) = handle_update(
            &blank,
            &sample_table(),
            &MatchingConfig::default(),
            &messages,
        )
        .unwrap();
        assert_eq!(chat_id, 55);
        assert_eq!(reply.text, messages.no_answer);
        assert!(!reply.markdown);
    }

    #[tokio::test]
    async fn get_updates_round_trip() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path("/bottest-token/getUpdates"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(
                r#"{"ok": true, "result": [{"update_id": 10, "message": {"message_id": 1, "chat": {"id": 7}, "text": "hi"}}]}"#,
            ))
            .mount(&server)
            .await;

        let client = BotClient::with_base_url("test-token", &server.uri()).unwrap();
        let updates = client.get_updates(0, 0).await.unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].update_id, 10);
        assert_eq!(
            updates[0].message.as_ref().unwrap().text.as_deref(),
            Some("hi")
        );
    }

    #[tokio::test]
    async fn send_message_round_trip() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path("/bottest-token/sendMessage"))
            .and(wiremock::matchers::body_partial_json(
                serde_json::json!({"chat_id": 7, "text": "hello", "parse_mode": "Markdown"}),
            ))
            .respond_with(
                wiremock::ResponseTemplate::new(200)
                    .set_body_string(r#"{"ok": true, "result": {"message_id": 2}}"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = BotClient::with_base_url("test-token", &server.uri()).unwrap();
        client.send_message(7, "hello", true).await.unwrap();
    }

    #[tokio::test]
    async fn api_level_failure_surfaces_as_telegram_error() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path("/botbad-token/getUpdates"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(
                r#"{"ok": false, "error_code": 401, "description": "Unauthorized"}"#,
            ))
            .mount(&server)
            .await;

        let client = BotClient::with_base_url("bad-token", &server.uri()).unwrap();
        let err = client.get_updates(0, 0).await.unwrap_err();
        assert!(matches!(err, SheetFaqError::Telegram(_)));
        assert!(err.to_string().contains("Unauthorized"));
    }
}

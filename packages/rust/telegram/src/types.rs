//! Telegram Bot API wire types (only the subset the bot touches).

use serde::Deserialize;

/// Envelope every Bot API method returns.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the call succeeded.
    pub ok: bool,
    /// Method result when `ok` is true.
    pub result: Option<T>,
    /// Human-readable failure description when `ok` is false.
    pub description: Option<String>,
}

/// One long-poll update.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    /// Monotonic update identifier; the next poll offset is the max seen + 1.
    pub update_id: i64,
    /// The incoming message, if this update carries one.
    #[serde(default)]
    pub message: Option<Message>,
}

/// An incoming chat message.
#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    /// Text content; absent for stickers, photos, and other media.
    #[serde(default)]
    pub text: Option<String>,
}

/// The chat a message belongs to.
#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

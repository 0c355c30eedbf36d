//! Messaging transport abstraction.
//!
//! The router and the alert dispatcher only need four operations from a chat
//! service: send, reply, edit in place and answer a button press. The
//! Telegram crate implements [`ChatTransport`] on top of teloxide.

use async_trait::async_trait;
use thiserror::Error;

/// Errors reported by a chat transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// An edit whose content is identical to the current message.
    #[error("message is not modified")]
    NotModified,

    /// Any other delivery failure.
    #[error("transport error: {0}")]
    Failed(String),
}

/// A message that already exists in a chat.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub chat_id: String,
    pub message_id: i32,
}

impl MessageRef {
    pub fn new(chat_id: impl Into<String>, message_id: i32) -> Self {
        Self {
            chat_id: chat_id.into(),
            message_id,
        }
    }
}

/// How the text should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Markup {
    #[default]
    Plain,
    Html,
}

/// An inline button carrying opaque callback data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub data: String,
}

/// Rows of inline buttons.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

impl Keyboard {
    /// One button per row.
    pub fn column<I>(buttons: I) -> Self
    where
        I: IntoIterator<Item = Button>,
    {
        Self {
            rows: buttons.into_iter().map(|b| vec![b]).collect(),
        }
    }
}

/// Text plus optional markup and keyboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub text: String,
    pub markup: Markup,
    pub keyboard: Option<Keyboard>,
}

impl OutgoingMessage {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            markup: Markup::Plain,
            keyboard: None,
        }
    }

    pub fn html(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            markup: Markup::Html,
            keyboard: None,
        }
    }

    pub fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }
}

/// Operations the bot needs from a chat service.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send a new message to a chat.
    async fn send(&self, chat_id: &str, message: &OutgoingMessage) -> Result<MessageRef, TransportError>;

    /// Send a message as a reply to an existing one.
    async fn reply(&self, to: &MessageRef, message: &OutgoingMessage) -> Result<MessageRef, TransportError>;

    /// Replace the text and keyboard of an existing message.
    ///
    /// Must return [`TransportError::NotModified`] when nothing would change.
    async fn edit(&self, target: &MessageRef, message: &OutgoingMessage) -> Result<(), TransportError>;

    /// Acknowledge a button press, optionally as a modal alert.
    async fn answer_callback(&self, callback_id: &str, text: &str, show_alert: bool) -> Result<(), TransportError>;
}

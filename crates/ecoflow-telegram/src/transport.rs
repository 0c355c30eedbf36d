//! [`ChatTransport`] on top of the Telegram Bot API.

use async_trait::async_trait;
use ecoflow_core::{ChatTransport, Keyboard, Markup, MessageRef, OutgoingMessage, TransportError};
use teloxide::prelude::*;
use teloxide::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, MessageId, ParseMode, Recipient, ReplyParameters,
};
use teloxide::{ApiError, RequestError};

/// Sends, edits and acknowledges through a teloxide [`Bot`].
#[derive(Clone)]
pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn send(&self, chat_id: &str, message: &OutgoingMessage) -> Result<MessageRef, TransportError> {
        let mut request = self.bot.send_message(recipient(chat_id)?, &message.text);
        if message.markup == Markup::Html {
            request = request.parse_mode(ParseMode::Html);
        }
        if let Some(keyboard) = &message.keyboard {
            request = request.reply_markup(inline_keyboard(keyboard));
        }

        let sent = request.await.map_err(map_error)?;
        Ok(MessageRef::new(sent.chat.id.0.to_string(), sent.id.0))
    }

    async fn reply(&self, to: &MessageRef, message: &OutgoingMessage) -> Result<MessageRef, TransportError> {
        let mut request = self
            .bot
            .send_message(recipient(&to.chat_id)?, &message.text)
            .reply_parameters(ReplyParameters::new(MessageId(to.message_id)));
        if message.markup == Markup::Html {
            request = request.parse_mode(ParseMode::Html);
        }
        if let Some(keyboard) = &message.keyboard {
            request = request.reply_markup(inline_keyboard(keyboard));
        }

        let sent = request.await.map_err(map_error)?;
        Ok(MessageRef::new(sent.chat.id.0.to_string(), sent.id.0))
    }

    async fn edit(&self, target: &MessageRef, message: &OutgoingMessage) -> Result<(), TransportError> {
        let mut request = self.bot.edit_message_text(
            recipient(&target.chat_id)?,
            MessageId(target.message_id),
            &message.text,
        );
        if message.markup == Markup::Html {
            request = request.parse_mode(ParseMode::Html);
        }
        if let Some(keyboard) = &message.keyboard {
            request = request.reply_markup(inline_keyboard(keyboard));
        }

        request.await.map_err(map_error)?;
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str, text: &str, show_alert: bool) -> Result<(), TransportError> {
        self.bot
            .answer_callback_query(callback_id.to_string())
            .text(text)
            .show_alert(show_alert)
            .await
            .map_err(map_error)?;
        Ok(())
    }
}

/// Numeric chat ids address chats directly; `@name` addresses a channel.
pub fn recipient(chat_id: &str) -> Result<Recipient, TransportError> {
    if let Ok(id) = chat_id.parse::<i64>() {
        return Ok(Recipient::Id(ChatId(id)));
    }
    if chat_id.starts_with('@') && chat_id.len() > 1 {
        return Ok(Recipient::ChannelUsername(chat_id.to_string()));
    }
    Err(TransportError::Failed(format!("invalid chat id: {}", chat_id)))
}

pub fn inline_keyboard(keyboard: &Keyboard) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(keyboard.rows.iter().map(|row| {
        row.iter()
            .map(|button| InlineKeyboardButton::callback(button.label.clone(), button.data.clone()))
            .collect::<Vec<_>>()
    }))
}

/// Telegram rejects edits that would not change the message.
pub fn map_error(e: RequestError) -> TransportError {
    match e {
        RequestError::Api(ApiError::MessageNotModified) => TransportError::NotModified,
        other => TransportError::Failed(other.to_string()),
    }
}

//! Update handlers for the Telegram bot.
//!
//! These only translate teloxide updates into calls on [`CommandRouter`].

use std::sync::Arc;

use ecoflow_core::{render, Command, CommandRouter, MessageRef};
use teloxide::prelude::*;
use teloxide::types::CallbackQuery;
use teloxide::utils::command::BotCommands;
use tracing::{debug, info};

/// Bot commands that can be invoked with /.
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum BotCommand {
    #[command(description = "Check the station")]
    Start,

    #[command(description = "Same as /start")]
    Status,

    #[command(description = "Show help message")]
    Help,
}

impl From<BotCommand> for Command {
    fn from(cmd: BotCommand) -> Self {
        match cmd {
            BotCommand::Start => Command::Start,
            BotCommand::Status => Command::Status,
            BotCommand::Help => Command::Help,
        }
    }
}

/// The sender's user id, falling back to the chat id for anonymous posts.
pub fn actor(msg: &Message) -> String {
    msg.from
        .as_ref()
        .map(|user| user.id.0.to_string())
        .unwrap_or_else(|| msg.chat.id.0.to_string())
}

pub fn origin(msg: &Message) -> MessageRef {
    MessageRef::new(msg.chat.id.0.to_string(), msg.id.0)
}

/// Handle a parsed /command.
pub async fn handle_command(
    msg: Message,
    cmd: BotCommand,
    router: Arc<CommandRouter>,
) -> ResponseResult<()> {
    info!(chat_id = %msg.chat.id, command = ?cmd, "Command received");
    router
        .handle_command(&actor(&msg), &origin(&msg), cmd.into())
        .await;
    Ok(())
}

/// Handle any other text, including unrecognized commands.
pub async fn handle_message(msg: Message, router: Arc<CommandRouter>) -> ResponseResult<()> {
    debug!(chat_id = %msg.chat.id, "Text message received");
    router.handle_text(&actor(&msg), &origin(&msg)).await;
    Ok(())
}

/// Handle an inline keyboard button press.
pub async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    router: Arc<CommandRouter>,
) -> ResponseResult<()> {
    let actor = q.from.id.0.to_string();
    let data = q.data.as_deref().unwrap_or_default();

    let Some(message) = q.message.as_ref() else {
        // Buttons on inline-mode messages carry no chat to edit.
        debug!(actor = %actor, "Callback without a message");
        bot.answer_callback_query(q.id.clone())
            .text(render::ACK_ERROR)
            .await?;
        return Ok(());
    };

    let target = MessageRef::new(message.chat().id.0.to_string(), message.id().0);
    router.handle_callback(&actor, &q.id, &target, data).await;
    Ok(())
}

//! Error types for the Telegram bot.

use thiserror::Error;

/// Errors that can occur while starting or running the bot.
#[derive(Debug, Error)]
pub enum TelegramError {
    /// Bot token not provided.
    #[error("Telegram bot token not set. Set TELEGRAM_BOT_TOKEN environment variable.")]
    NoToken,

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ecoflow_core::ConfigError),

    /// The EcoFlow client could not be built.
    #[error("EcoFlow client error: {0}")]
    Api(#[from] ecoflow_api::ApiError),

    /// Failed to start the bot.
    #[error("Failed to start bot: {0}")]
    BotStartFailed(String),
}

/// Result type for Telegram operations.
pub type Result<T> = std::result::Result<T, TelegramError>;

//! Main Telegram bot implementation.

use std::sync::Arc;

use ecoflow_api::{EcoflowClient, StationSource};
use ecoflow_core::dispatch::Dispatcher as AlertDispatcher;
use ecoflow_core::{status_report, CommandRouter, Config, MonitorHandle, StatusReport, TransitionMonitor};
use teloxide::dispatching::UpdateFilterExt;
use teloxide::prelude::*;
use teloxide::types::CallbackQuery;
use teloxide::utils::command::BotCommands;
use tracing::{info, warn};

use crate::error::{Result, TelegramError};
use crate::handlers::{handle_callback, handle_command, handle_message, BotCommand};
use crate::transport::TelegramTransport;

/// Environment variable holding the bot token.
pub const BOT_TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";

/// The EcoFlow station bot.
pub struct StationBot {
    /// The teloxide bot instance.
    bot: Bot,
    /// Station API, shared by the router and the monitor.
    source: Arc<dyn StationSource>,
    config: Config,
}

impl StationBot {
    /// Create a bot from `config`.
    ///
    /// Requires `TELEGRAM_BOT_TOKEN` environment variable to be set.
    pub fn new(config: Config) -> Result<Self> {
        let token = std::env::var(BOT_TOKEN_ENV).map_err(|_| TelegramError::NoToken)?;
        Self::with_token(token, config)
    }

    /// Create a bot with an explicit token.
    pub fn with_token(token: impl Into<String>, config: Config) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(TelegramError::NoToken);
        }

        let client = EcoflowClient::new(&config.host, &config.access_key, &config.secret_key)?;

        Ok(Self {
            bot: Bot::new(token.trim()),
            source: Arc::new(client),
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the bot's username.
    pub async fn get_me(&self) -> Result<String> {
        let me = self
            .bot
            .get_me()
            .await
            .map_err(|e| TelegramError::BotStartFailed(e.to_string()))?;
        Ok(me.username().to_string())
    }

    /// Start the monitor (when enabled) and serve updates by long polling.
    ///
    /// Returns after Ctrl+C; the monitor is stopped on the way out.
    pub async fn start_polling(&self) -> Result<()> {
        info!("Starting Telegram bot in polling mode...");

        let transport = Arc::new(TelegramTransport::new(self.bot.clone()));
        let allow_list = self.config.allow_list.clone();

        if allow_list.is_open() {
            warn!("ALLOWED_USERS is empty: anyone can query the station and no alerts will be sent");
        }

        let monitor = self.spawn_monitor(transport.clone());

        if let Err(e) = self.bot.set_my_commands(BotCommand::bot_commands()).await {
            warn!(error = %e, "Failed to register bot commands");
        }

        let router = Arc::new(CommandRouter::new(Arc::clone(&self.source), transport, allow_list));
        let router_for_commands = Arc::clone(&router);
        let router_for_messages = Arc::clone(&router);
        let router_for_callbacks = Arc::clone(&router);

        let handler = dptree::entry()
            .branch(Update::filter_callback_query().endpoint(move |bot: Bot, q: CallbackQuery| {
                let router = Arc::clone(&router_for_callbacks);
                async move { handle_callback(bot, q, router).await }
            }))
            .branch(
                Update::filter_message()
                    .filter_command::<BotCommand>()
                    .endpoint(move |msg: Message, cmd: BotCommand| {
                        let router = Arc::clone(&router_for_commands);
                        async move { handle_command(msg, cmd, router).await }
                    }),
            )
            .branch(
                Update::filter_message()
                    .filter(|msg: Message| msg.text().is_some())
                    .endpoint(move |msg: Message| {
                        let router = Arc::clone(&router_for_messages);
                        async move { handle_message(msg, router).await }
                    }),
            );

        info!("Bot is running! Send /start to begin.");

        Dispatcher::builder(self.bot.clone(), handler)
            .default_handler(|upd| async move {
                tracing::debug!("Unhandled update: {:?}", upd);
            })
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        if let Some(handle) = monitor {
            handle.stop();
        }
        info!("Bot stopped");
        Ok(())
    }

    fn spawn_monitor(&self, transport: Arc<TelegramTransport>) -> Option<MonitorHandle> {
        if !self.config.monitoring {
            info!("Grid monitoring disabled");
            return None;
        }

        let dispatcher = AlertDispatcher::new(transport, self.config.allow_list.clone());
        let (monitor, handle) =
            TransitionMonitor::new(Arc::clone(&self.source), dispatcher, self.config.check_interval);
        info!(
            interval_secs = self.config.check_interval.as_secs(),
            recipients = self.config.allow_list.len(),
            "Starting grid monitor"
        );
        monitor.spawn();
        Some(handle)
    }
}

/// Query the station once without starting the bot.
pub async fn check(config: &Config) -> Result<StatusReport> {
    let client = EcoflowClient::new(&config.host, &config.access_key, &config.secret_key)?;
    Ok(status_report(&client).await)
}

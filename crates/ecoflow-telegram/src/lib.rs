//! Telegram bot for an EcoFlow power station.
//!
//! The bot answers status queries from allow-listed users and, while
//! monitoring is enabled, broadcasts an alert whenever grid power goes off
//! or comes back.
//!
//! # Environment Variables
//!
//! Required:
//! - `TELEGRAM_BOT_TOKEN`: Bot token from @BotFather
//! - `EF_ACCESS_KEY`, `EF_SECRET_KEY`: EcoFlow developer key pair
//!
//! Optional:
//! - `HOST`: EcoFlow API host (default: `https://api-e.ecoflow.com`)
//! - `ALLOWED_USERS`: comma-separated Telegram user ids
//! - `CHECK_INTERVAL`: seconds between monitor cycles (default: 60)
//! - `MONITORING_ENABLED`: set to `false` to disable grid alerts
//!
//! # Example
//!
//! ```no_run
//! use ecoflow_core::Config;
//! use ecoflow_telegram::StationBot;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bot = StationBot::new(Config::from_env()?)?;
//!     bot.start_polling().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Commands
//!
//! - `/start` - Check the station
//! - `/status` - Same as /start
//! - `/help` - Show available commands

pub mod bot;
pub mod error;
pub mod handlers;
pub mod transport;

pub use bot::{check, StationBot};
pub use error::{Result, TelegramError};
pub use transport::TelegramTransport;

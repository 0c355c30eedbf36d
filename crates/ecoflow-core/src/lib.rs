//! Power-state monitoring and chat command routing for an EcoFlow station.
//!
//! This crate holds the transport-independent parts of the bot:
//!
//! - [`power`]: classify a reading as grid on, grid off or idle
//! - [`monitor`]: background loop that alerts on grid transitions
//! - [`router`]: authorization gate and handlers for commands and buttons
//! - [`dispatch`]: best-effort fan-out of alerts to allow-listed users
//! - [`render`]: all user-facing text
//!
//! The chat service is reached through [`ChatTransport`] and the station
//! through [`ecoflow_api::StationSource`], so both can be swapped in tests.

pub mod auth;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod monitor;
pub mod power;
pub mod render;
pub mod router;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use auth::AllowList;
pub use config::Config;
pub use dispatch::{DispatchReport, Dispatcher};
pub use error::{ConfigError, Result};
pub use monitor::{step, Alert, AlertKind, Cycle, MonitorHandle, MonitorState, SkipReason, TransitionMonitor};
pub use power::{classify, PowerState};
pub use router::{status_report, Action, Command, CommandRouter, StatusReport};
pub use transport::{Button, ChatTransport, Keyboard, Markup, MessageRef, OutgoingMessage, TransportError};

//! Command and button routing.
//!
//! Text commands and button callbacks both pass the same allow-list check
//! before anything touches the station API. Each interaction is handled on
//! its own; no state is carried between them. Failures are turned into
//! user-visible messages or acknowledgements and never propagate to the
//! transport layer.

use std::sync::Arc;

use ecoflow_api::{ApiFailure, DeviceId, Reading, ReadingOutcome, StationSource};
use tracing::{debug, info, warn};

use crate::auth::AllowList;
use crate::power::PowerState;
use crate::render;
use crate::transport::{ChatTransport, MessageRef, OutgoingMessage, TransportError};

/// Text commands understood by the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Status,
    Help,
}

/// Inline keyboard actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Refresh,
    Status,
    Help,
}

impl Action {
    pub fn callback_data(&self) -> &'static str {
        match self {
            Action::Refresh => "refresh",
            Action::Status => "status",
            Action::Help => "help",
        }
    }

    pub fn from_callback_data(data: &str) -> Option<Self> {
        match data {
            "refresh" => Some(Action::Refresh),
            "status" => Some(Action::Status),
            "help" => Some(Action::Help),
            _ => None,
        }
    }
}

/// Everything the router learned from one status query.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusReport {
    Ready {
        device: DeviceId,
        reading: Reading,
        state: PowerState,
    },
    ApiFailure {
        device: DeviceId,
        failure: ApiFailure,
    },
    DeviceNotFound,
    Unreachable(String),
}

impl StatusReport {
    /// The rendered status block, if there is a device to describe.
    fn message(&self) -> Option<OutgoingMessage> {
        match self {
            StatusReport::Ready { device, reading, .. } => Some(render::status(device, reading)),
            StatusReport::ApiFailure { failure, .. } => Some(render::api_failure(failure)),
            StatusReport::DeviceNotFound | StatusReport::Unreachable(_) => None,
        }
    }
}

/// Resolve the device, fetch a reading and classify it.
pub async fn status_report(source: &dyn StationSource) -> StatusReport {
    let device = match source.resolve_device_id().await {
        Ok(Some(device)) => device,
        Ok(None) => return StatusReport::DeviceNotFound,
        Err(e) => return StatusReport::Unreachable(e.to_string()),
    };

    match source.fetch_reading(&device).await {
        Ok(ReadingOutcome::Success(reading)) => StatusReport::Ready {
            state: PowerState::of(&reading),
            device,
            reading,
        },
        Ok(ReadingOutcome::Failed(failure)) => StatusReport::ApiFailure { device, failure },
        Err(e) => StatusReport::Unreachable(e.to_string()),
    }
}

/// Handles inbound commands, plain text and button presses.
#[derive(Clone)]
pub struct CommandRouter {
    source: Arc<dyn StationSource>,
    transport: Arc<dyn ChatTransport>,
    allow_list: AllowList,
}

impl CommandRouter {
    pub fn new(
        source: Arc<dyn StationSource>,
        transport: Arc<dyn ChatTransport>,
        allow_list: AllowList,
    ) -> Self {
        Self {
            source,
            transport,
            allow_list,
        }
    }

    pub fn allow_list(&self) -> &AllowList {
        &self.allow_list
    }

    /// Query the station through this router's source.
    pub async fn status_report(&self) -> StatusReport {
        status_report(self.source.as_ref()).await
    }

    /// Handle a text command sent as `origin` by `actor`.
    pub async fn handle_command(&self, actor: &str, origin: &MessageRef, command: Command) {
        if !self.allow_list.is_authorized(actor) {
            info!(actor = %actor, command = ?command, "Rejected command from unauthorized user");
            self.reply(origin, &render::unauthorized()).await;
            return;
        }

        match command {
            Command::Start | Command::Status => self.send_status(&origin.chat_id).await,
            Command::Help => {
                if let Err(e) = self.transport.send(&origin.chat_id, &render::help()).await {
                    warn!(chat_id = %origin.chat_id, error = %e, "Failed to send help");
                }
            }
        }
    }

    /// Handle any non-command text.
    pub async fn handle_text(&self, actor: &str, origin: &MessageRef) {
        if !self.allow_list.is_authorized(actor) {
            debug!(actor = %actor, "Ignoring text from unauthorized user");
            return;
        }
        self.reply(origin, &render::usage_hint()).await;
    }

    /// Handle a button press on `message`.
    pub async fn handle_callback(&self, actor: &str, callback_id: &str, message: &MessageRef, data: &str) {
        if !self.allow_list.is_authorized(actor) {
            info!(actor = %actor, "Rejected callback from unauthorized user");
            self.answer(callback_id, render::ACK_UNAUTHORIZED, false).await;
            return;
        }

        let Some(action) = Action::from_callback_data(data) else {
            debug!(data = %data, "Unknown callback data");
            self.answer(callback_id, render::ACK_UNKNOWN_ACTION, false).await;
            return;
        };

        match action {
            Action::Refresh | Action::Status => {
                let report = self.status_report().await;
                let Some(update) = report.message() else {
                    let text = match report {
                        StatusReport::DeviceNotFound => render::ACK_DEVICE_NOT_FOUND,
                        _ => render::ACK_ERROR,
                    };
                    self.answer(callback_id, text, true).await;
                    return;
                };
                self.edit_and_ack(callback_id, message, &update, render::ACK_UPDATED).await;
            }
            Action::Help => {
                self.edit_and_ack(callback_id, message, &render::help(), render::ACK_HELP).await;
            }
        }
    }

    /// Send a "checking" notice, then replace it with the status.
    async fn send_status(&self, chat_id: &str) {
        let pending = match self.transport.send(chat_id, &render::checking()).await {
            Ok(pending) => pending,
            Err(e) => {
                warn!(chat_id = %chat_id, error = %e, "Failed to send checking notice");
                return;
            }
        };

        let report = self.status_report().await;
        let update = match &report {
            StatusReport::DeviceNotFound => render::device_not_found(),
            StatusReport::Unreachable(e) => render::unreachable(e),
            _ => report.message().unwrap_or_else(render::device_not_found),
        };

        if let Err(e) = self.transport.edit(&pending, &update).await {
            warn!(chat_id = %chat_id, error = %e, "Failed to update status message");
        } else {
            info!(chat_id = %chat_id, "Status sent");
        }
    }

    /// Edit `message` in place and acknowledge the callback.
    async fn edit_and_ack(&self, callback_id: &str, message: &MessageRef, update: &OutgoingMessage, ack: &str) {
        match self.transport.edit(message, update).await {
            Ok(()) => self.answer(callback_id, ack, false).await,
            Err(TransportError::NotModified) => {
                debug!(chat_id = %message.chat_id, "Message unchanged");
                self.answer(callback_id, render::ACK_ALREADY_UP_TO_DATE, false).await;
            }
            Err(e) => {
                warn!(chat_id = %message.chat_id, error = %e, "Failed to edit message");
                self.answer(callback_id, render::ACK_ERROR, true).await;
            }
        }
    }

    async fn reply(&self, origin: &MessageRef, message: &OutgoingMessage) {
        if let Err(e) = self.transport.reply(origin, message).await {
            warn!(chat_id = %origin.chat_id, error = %e, "Failed to reply");
        }
    }

    async fn answer(&self, callback_id: &str, text: &str, show_alert: bool) {
        if let Err(e) = self.transport.answer_callback(callback_id, text, show_alert).await {
            warn!(callback_id = %callback_id, error = %e, "Failed to answer callback");
        }
    }
}

//! Message text for chat users and the console.
//!
//! Everything user-facing is produced here from structured values, so the
//! monitor and the router never build strings themselves.

use ecoflow_api::{ApiFailure, DeviceId, Reading};

use crate::monitor::{Alert, AlertKind};
use crate::power::PowerState;
use crate::router::{Action, StatusReport};
use crate::transport::{Button, Keyboard, OutgoingMessage};

/// Callback acknowledgements.
pub const ACK_UPDATED: &str = "✅ Updated";
pub const ACK_ALREADY_UP_TO_DATE: &str = "Already up to date";
pub const ACK_HELP: &str = "ℹ️ Help";
pub const ACK_ERROR: &str = "❌ Error";
pub const ACK_DEVICE_NOT_FOUND: &str = "❌ Device not found";
pub const ACK_UNAUTHORIZED: &str = "❌ Unauthorized";
pub const ACK_UNKNOWN_ACTION: &str = "Unknown action";

/// Escape text for Telegram HTML.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Human label for a power state.
pub fn state_label(state: PowerState) -> &'static str {
    match state {
        PowerState::GridOn => "✅ Grid Power ON",
        PowerState::GridOff => "🔋😢 Running on Battery (Grid OFF)",
        PowerState::Idle => "💤 Idle/Standby",
    }
}

/// Keyboard attached to status and help messages.
pub fn keyboard() -> Keyboard {
    Keyboard::column([
        button("🔄 Refresh", Action::Refresh),
        button("📊 Status", Action::Status),
        button("❓ Help", Action::Help),
    ])
}

fn button(label: &str, action: Action) -> Button {
    Button {
        label: label.to_string(),
        data: action.callback_data().to_string(),
    }
}

/// Transient message shown while the station is queried.
pub fn checking() -> OutgoingMessage {
    OutgoingMessage::plain("⏳ Checking station...")
}

pub fn device_not_found() -> OutgoingMessage {
    OutgoingMessage::plain("❌ Device not found")
}

pub fn unauthorized() -> OutgoingMessage {
    OutgoingMessage::plain("❌ Unauthorized")
}

pub fn usage_hint() -> OutgoingMessage {
    OutgoingMessage::plain("Use /start to check your EcoFlow station")
}

/// Failure that prevented reaching the API.
pub fn unreachable(error: &str) -> OutgoingMessage {
    OutgoingMessage::plain(format!("❌ Error: {}", error))
}

pub fn help() -> OutgoingMessage {
    OutgoingMessage::html(
        "ℹ️ <b>EcoFlow bot</b>\n\n\
        /start - check the station\n\
        /status - same as /start\n\
        /help - show this message\n\n\
        You will get a message when grid power goes off or comes back.",
    )
    .with_keyboard(keyboard())
}

/// Status block for a successful reading.
pub fn status(device: &DeviceId, reading: &Reading) -> OutgoingMessage {
    let text = format!(
        "🔌 <b>EcoFlow status</b>\n\
        ━━━━━━━━━━━━━━━━━━━━\n\
        📍 SN: <code>{}</code>\n\n\
        🔋 Battery: <b>{}%</b>\n\
        ⚡ Grid input: <b>{} W</b>\n\
        📤 Load output: <b>{} W</b>\n\n\
        Status: {}",
        html_escape(device.as_str()),
        reading.battery_soc,
        reading.grid_in_power,
        reading.load_out_power,
        state_label(PowerState::of(reading)),
    );
    OutgoingMessage::html(text).with_keyboard(keyboard())
}

/// Status block when the API answered with a failure code.
pub fn api_failure(failure: &ApiFailure) -> OutgoingMessage {
    OutgoingMessage::html(format!(
        "❌ Error getting station data\n<code>{}</code>",
        html_escape(&failure.to_string())
    ))
    .with_keyboard(keyboard())
}

/// Alert broadcast on a grid transition.
pub fn alert(alert: &Alert) -> OutgoingMessage {
    let reading = &alert.reading;
    let text = match alert.kind {
        AlertKind::GridOn => format!(
            "✅ <b>Grid power is back ON!</b>\n\n\
            🔋 Battery: {}%\n\
            ⚡ Grid input: {} W",
            reading.battery_soc, reading.grid_in_power
        ),
        AlertKind::GridOff => format!(
            "🔋😢 <b>Grid power is OFF!</b>\n\n\
            🔋 Battery: {}%\n\
            📤 Load output: {} W",
            reading.battery_soc, reading.load_out_power
        ),
    };
    OutgoingMessage::html(text)
}

/// Plain-text output for the one-shot console check.
pub fn console(report: &StatusReport) -> String {
    match report {
        StatusReport::Ready { device, reading, .. } => console_report(device, reading),
        StatusReport::ApiFailure { failure, .. } => format!("Error getting data: {}", failure.payload),
        StatusReport::DeviceNotFound => "Device not found.".to_string(),
        StatusReport::Unreachable(e) => format!("Could not reach the EcoFlow API: {}", e),
    }
}

fn console_report(device: &DeviceId, reading: &Reading) -> String {
    let verdict = match PowerState::of(reading) {
        PowerState::GridOn => "✅ Grid is ON",
        PowerState::GridOff => "🔋 Grid is OFF, running on battery",
        PowerState::Idle => "💤 IDLE (station is asleep or nothing plugged in)",
    };
    format!(
        "--- Station status (sn: {}) ---\n\
        Battery: {}%\n\
        Grid Input: {} W\n\
        Load Output: {} W\n\
        {}",
        device, reading.battery_soc, reading.grid_in_power, reading.load_out_power, verdict
    )
}

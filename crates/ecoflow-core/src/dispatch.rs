//! Best-effort fan-out of alerts to allow-listed users.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::auth::AllowList;
use crate::transport::{ChatTransport, OutgoingMessage};

/// Outcome of one broadcast.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Recipients that accepted the message.
    pub delivered: Vec<String>,
    /// Recipients that failed, with the transport error text.
    pub failed: Vec<(String, String)>,
}

impl DispatchReport {
    pub fn attempted(&self) -> usize {
        self.delivered.len() + self.failed.len()
    }
}

/// Sends a message to every recipient on the allow-list.
#[derive(Clone)]
pub struct Dispatcher {
    transport: Arc<dyn ChatTransport>,
    recipients: AllowList,
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn ChatTransport>, recipients: AllowList) -> Self {
        Self {
            transport,
            recipients,
        }
    }

    /// Send `message` to all recipients concurrently.
    ///
    /// A failure for one recipient never prevents delivery to the others.
    /// In open mode there is nobody to notify and nothing is sent.
    pub async fn broadcast(&self, message: &OutgoingMessage) -> DispatchReport {
        if self.recipients.is_open() {
            debug!("No recipients configured, skipping broadcast");
            return DispatchReport::default();
        }

        let sends = self.recipients.recipients().iter().map(|recipient| async move {
            let result = self.transport.send(recipient, message).await;
            (recipient.clone(), result)
        });

        let mut report = DispatchReport::default();
        for (recipient, result) in join_all(sends).await {
            match result {
                Ok(_) => {
                    info!(recipient = %recipient, "Alert sent");
                    report.delivered.push(recipient);
                }
                Err(e) => {
                    warn!(recipient = %recipient, error = %e, "Failed to send alert");
                    report.failed.push((recipient, e.to_string()));
                }
            }
        }
        report
    }
}

//! In-memory fakes shared by the unit tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use ecoflow_api::{ApiError, ApiFailure, DeviceId, Reading, ReadingOutcome, StationSource};

use crate::transport::{ChatTransport, MessageRef, OutgoingMessage, TransportError};

pub(crate) const SERIAL: &str = "R331ZEB4ZEAL0528";

/// What the fake station does for one resolve/fetch pair.
#[derive(Debug, Clone)]
pub(crate) enum Step {
    Reading(Reading),
    ApiFailure,
    NoDevice,
    Unreachable,
    FetchUnreachable,
}

/// Scripted station. Each `resolve_device_id` call advances the script; the
/// last step repeats once the script runs out.
#[derive(Default)]
pub(crate) struct FakeSource {
    script: Mutex<VecDeque<Step>>,
    current: Mutex<Option<Step>>,
    resolve_calls: AtomicUsize,
    fetch_calls: AtomicUsize,
}

impl FakeSource {
    pub(crate) fn scripted(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            script: Mutex::new(steps.into_iter().collect()),
            ..Default::default()
        }
    }

    pub(crate) fn always(step: Step) -> Self {
        Self::scripted([step])
    }

    pub(crate) fn calls(&self) -> usize {
        self.resolve_calls.load(Ordering::SeqCst) + self.fetch_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn resolve_calls(&self) -> usize {
        self.resolve_calls.load(Ordering::SeqCst)
    }
}

fn unreachable_error() -> ApiError {
    ApiError::Status {
        status: 503,
        body: "service unavailable".to_string(),
    }
}

#[async_trait]
impl StationSource for FakeSource {
    async fn resolve_device_id(&self) -> ecoflow_api::Result<Option<DeviceId>> {
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);

        let step = {
            let mut current = self.current.lock().unwrap();
            if let Some(next) = self.script.lock().unwrap().pop_front() {
                *current = Some(next);
            }
            current.clone()
        };

        match step {
            Some(Step::NoDevice) | None => Ok(None),
            Some(Step::Unreachable) => Err(unreachable_error()),
            Some(_) => Ok(Some(DeviceId::new(SERIAL))),
        }
    }

    async fn fetch_reading(&self, _device: &DeviceId) -> ecoflow_api::Result<ReadingOutcome> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);

        let step = self.current.lock().unwrap().clone();
        match step {
            Some(Step::Reading(reading)) => Ok(ReadingOutcome::Success(reading)),
            Some(Step::ApiFailure) => Ok(ReadingOutcome::Failed(ApiFailure {
                code: "6012".to_string(),
                message: Some("device offline".to_string()),
                payload: serde_json::Value::Null,
            })),
            _ => Err(unreachable_error()),
        }
    }
}

/// A recorded transport call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Send(String, OutgoingMessage),
    Reply(MessageRef, OutgoingMessage),
    Edit(MessageRef, OutgoingMessage),
    Answer { callback_id: String, text: String, show_alert: bool },
}

/// Chat service that keeps messages in memory.
///
/// Edits with identical content fail with [`TransportError::NotModified`],
/// matching what Telegram does.
#[derive(Default)]
pub(crate) struct FakeTransport {
    calls: Mutex<Vec<Call>>,
    messages: Mutex<HashMap<MessageRef, OutgoingMessage>>,
    failing_chats: Mutex<HashSet<String>>,
    next_id: AtomicUsize,
}

impl FakeTransport {
    pub(crate) fn fail_sends_to(&self, chat_id: &str) {
        self.failing_chats.lock().unwrap().insert(chat_id.to_string());
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn sent(&self) -> Vec<(String, OutgoingMessage)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Send(chat, message) => Some((chat, message)),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn answers(&self) -> Vec<(String, bool)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Answer { text, show_alert, .. } => Some((text, show_alert)),
                _ => None,
            })
            .collect()
    }

    /// Current content of a message.
    pub(crate) fn message(&self, target: &MessageRef) -> Option<OutgoingMessage> {
        self.messages.lock().unwrap().get(target).cloned()
    }

    /// Place an existing message in the chat, as if sent earlier.
    pub(crate) fn seed(&self, target: &MessageRef, message: OutgoingMessage) {
        self.messages.lock().unwrap().insert(target.clone(), message);
    }

    fn store(&self, chat_id: &str, message: &OutgoingMessage) -> MessageRef {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) as i32 + 100;
        let target = MessageRef::new(chat_id, id);
        self.messages.lock().unwrap().insert(target.clone(), message.clone());
        target
    }
}

#[async_trait]
impl ChatTransport for FakeTransport {
    async fn send(&self, chat_id: &str, message: &OutgoingMessage) -> Result<MessageRef, TransportError> {
        self.calls.lock().unwrap().push(Call::Send(chat_id.to_string(), message.clone()));
        if self.failing_chats.lock().unwrap().contains(chat_id) {
            return Err(TransportError::Failed("chat not found".to_string()));
        }
        Ok(self.store(chat_id, message))
    }

    async fn reply(&self, to: &MessageRef, message: &OutgoingMessage) -> Result<MessageRef, TransportError> {
        self.calls.lock().unwrap().push(Call::Reply(to.clone(), message.clone()));
        Ok(self.store(&to.chat_id, message))
    }

    async fn edit(&self, target: &MessageRef, message: &OutgoingMessage) -> Result<(), TransportError> {
        self.calls.lock().unwrap().push(Call::Edit(target.clone(), message.clone()));
        let mut messages = self.messages.lock().unwrap();
        let unchanged = messages.get(target).map(|existing| existing == message);
        match unchanged {
            Some(true) => Err(TransportError::NotModified),
            Some(false) => {
                messages.insert(target.clone(), message.clone());
                Ok(())
            }
            None => Err(TransportError::Failed("message to edit not found".to_string())),
        }
    }

    async fn answer_callback(&self, callback_id: &str, text: &str, show_alert: bool) -> Result<(), TransportError> {
        self.calls.lock().unwrap().push(Call::Answer {
            callback_id: callback_id.to_string(),
            text: text.to_string(),
            show_alert,
        });
        Ok(())
    }
}

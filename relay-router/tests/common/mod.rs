//! Shared helpers for relay-router integration tests: a recording [`MockMessagingApi`] and event builders.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use relay_core::{
    ChatKind, Destination, InboundEvent, MessagingApi, PhotoVariant, RelayError, ReplyContext,
    Result, SelfInfo, Sender, ThreadId,
};
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicUsize, Ordering};
use std::sync::{Mutex, Once};
use std::time::Duration;

pub const GROUP_ID: i64 = -1001234567890;

/// One recorded outbound call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateThread { group_id: i64, name: String },
    Text { destination: Destination, text: String },
    Photo {
        destination: Destination,
        photo_ref: String,
        caption: Option<String>,
    },
}

/// Mock messaging API that records every call. Thread ids are handed out from 100 upwards.
pub struct MockMessagingApi {
    calls: Mutex<Vec<Call>>,
    next_thread: AtomicI32,
    self_info_calls: AtomicUsize,
    create_delay: Duration,
    fail_create: AtomicBool,
    fail_sends: AtomicBool,
    fail_self_info: AtomicBool,
}

impl MockMessagingApi {
    pub fn new() -> Self {
        Self::with_create_delay(Duration::ZERO)
    }

    /// `create_thread` sleeps for `delay` before answering, widening race windows.
    pub fn with_create_delay(delay: Duration) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            next_thread: AtomicI32::new(100),
            self_info_calls: AtomicUsize::new(0),
            create_delay: delay,
            fail_create: AtomicBool::new(false),
            fail_sends: AtomicBool::new(false),
            fail_self_info: AtomicBool::new(false),
        }
    }

    pub fn fail_create(&self, fail: bool) {
        self.fail_create.store(fail, Ordering::SeqCst);
    }

    pub fn fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    pub fn fail_self_info(&self, fail: bool) {
        self.fail_self_info.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn create_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::CreateThread { .. }))
            .count()
    }

    pub fn sends(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, Call::CreateThread { .. }))
            .collect()
    }

    /// Texts sent to `destination`, in order.
    pub fn texts_to(&self, destination: Destination) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Text { destination: d, text } if d == destination => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn self_info_calls(&self) -> usize {
        self.self_info_calls.load(Ordering::SeqCst)
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl MessagingApi for MockMessagingApi {
    async fn create_thread(&self, group_id: i64, name: &str) -> Result<ThreadId> {
        self.record(Call::CreateThread {
            group_id,
            name: name.to_string(),
        });
        if !self.create_delay.is_zero() {
            tokio::time::sleep(self.create_delay).await;
        }
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(RelayError::Api("Bad Request: not enough rights".into()));
        }
        Ok(ThreadId(self.next_thread.fetch_add(1, Ordering::SeqCst)))
    }

    async fn send_text(&self, destination: &Destination, text: &str) -> Result<()> {
        self.record(Call::Text {
            destination: *destination,
            text: text.to_string(),
        });
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(RelayError::Api("Forbidden: bot was blocked by the user".into()));
        }
        Ok(())
    }

    async fn send_photo(
        &self,
        destination: &Destination,
        photo_ref: &str,
        caption: Option<&str>,
    ) -> Result<()> {
        self.record(Call::Photo {
            destination: *destination,
            photo_ref: photo_ref.to_string(),
            caption: caption.map(str::to_string),
        });
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(RelayError::Api("Forbidden: bot was blocked by the user".into()));
        }
        Ok(())
    }

    async fn get_self_info(&self) -> Result<SelfInfo> {
        self.self_info_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_self_info.load(Ordering::SeqCst) {
            return Err(RelayError::Api("getMe timed out".into()));
        }
        Ok(SelfInfo {
            username: Some("relaybot".to_string()),
            first_name: "Relay".to_string(),
        })
    }
}

/// Private text message from `user_id`.
pub fn private_text(user_id: i64, username: Option<&str>, text: &str) -> InboundEvent {
    InboundEvent {
        message_id: 1,
        chat_id: user_id,
        chat_kind: ChatKind::Private,
        sender: Some(Sender {
            id: user_id,
            username: username.map(str::to_string),
            first_name: Some("Ana".to_string()),
            is_bot: false,
        }),
        text: Some(text.to_string()),
        caption: None,
        photo: Vec::new(),
        has_document: false,
        reply_to: None,
        thread_id: None,
        received_at: Utc::now(),
    }
}

/// Operator message in the operator group, optionally inside `thread`.
pub fn operator_text(text: &str, thread: Option<ThreadId>) -> InboundEvent {
    InboundEvent {
        message_id: 50,
        chat_id: GROUP_ID,
        chat_kind: ChatKind::Supergroup,
        sender: Some(Sender {
            id: 900,
            username: Some("agent".to_string()),
            first_name: Some("Agent".to_string()),
            is_bot: false,
        }),
        text: Some(text.to_string()),
        caption: None,
        photo: Vec::new(),
        has_document: false,
        reply_to: None,
        thread_id: thread,
        received_at: Utc::now(),
    }
}

/// Marks `event` as a reply to a message with `text`.
pub fn replying_to(mut event: InboundEvent, text: &str) -> InboundEvent {
    event.reply_to = Some(ReplyContext {
        message_id: 7,
        text: Some(text.to_string()),
        from_bot: true,
    });
    event
}

/// Replaces the event's text with a photo in three resolutions; the largest is `"{prefix}-large"`.
pub fn with_photo(mut event: InboundEvent, prefix: &str, caption: Option<&str>) -> InboundEvent {
    event.text = None;
    event.caption = caption.map(str::to_string);
    event.photo = vec![
        PhotoVariant {
            file_id: format!("{prefix}-small"),
            width: 90,
            height: 67,
            file_size: 1_200,
        },
        PhotoVariant {
            file_id: format!("{prefix}-large"),
            width: 1280,
            height: 960,
            file_size: 120_000,
        },
        PhotoVariant {
            file_id: format!("{prefix}-medium"),
            width: 320,
            height: 240,
            file_size: 14_000,
        },
    ];
    event
}

static TRACING_INIT: Once = Once::new();

/// Test tracing; `RUST_LOG` controls the level.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .with_test_writer()
            .try_init();
    });
}

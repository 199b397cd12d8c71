//! Core types: end user, thread, chat kind, inbound event, destination.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of an end user, as assigned by the messaging provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EndUserId(pub i64);

impl fmt::Display for EndUserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a thread (forum topic) inside the operator group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ThreadId(pub i32);

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Customer-side party of a private conversation with the bot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndUser {
    pub id: EndUserId,
    pub username: Option<String>,
    pub first_name: Option<String>,
}

impl EndUser {
    /// `@username` when the user has one.
    pub fn handle(&self) -> Option<String> {
        self.username
            .as_deref()
            .filter(|u| !u.is_empty())
            .map(|u| format!("@{}", u))
    }

    /// Handle, or `placeholder` for users without a username.
    pub fn handle_or(&self, placeholder: &str) -> String {
        self.handle().unwrap_or_else(|| placeholder.to_string())
    }
}

/// Author of an inbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub is_bot: bool,
}

/// Chat kind as reported by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatKind {
    Private,
    Group,
    Supergroup,
    Channel,
}

/// Routing class of an inbound event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    Private,
    OperatorGroup,
    Other,
}

/// One resolution of a photo. Transports deliver several per photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoVariant {
    pub file_id: String,
    pub width: u32,
    pub height: u32,
    pub file_size: u32,
}

impl PhotoVariant {
    fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// The message an inbound message replies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyContext {
    pub message_id: i32,
    /// Text of the replied-to message, or its caption when it carries media.
    pub text: Option<String>,
    pub from_bot: bool,
}

/// A decoded inbound message, independent of the transport it came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundEvent {
    pub message_id: i32,
    pub chat_id: i64,
    pub chat_kind: ChatKind,
    pub sender: Option<Sender>,
    pub text: Option<String>,
    pub caption: Option<String>,
    /// Photo resolutions in the order the transport delivered them.
    pub photo: Vec<PhotoVariant>,
    /// A generic attachment (document) is present.
    pub has_document: bool,
    pub reply_to: Option<ReplyContext>,
    pub thread_id: Option<ThreadId>,
    pub received_at: DateTime<Utc>,
}

impl InboundEvent {
    /// Classifies the event by chat kind. Events without a sender are never routed.
    pub fn route_class(&self) -> RouteClass {
        if self.sender.is_none() {
            return RouteClass::Other;
        }
        match self.chat_kind {
            ChatKind::Private => RouteClass::Private,
            ChatKind::Group | ChatKind::Supergroup => RouteClass::OperatorGroup,
            ChatKind::Channel => RouteClass::Other,
        }
    }

    /// The sender as an end user, for private events.
    pub fn end_user(&self) -> Option<EndUser> {
        self.sender.as_ref().map(|s| EndUser {
            id: EndUserId(s.id),
            username: s.username.clone(),
            first_name: s.first_name.clone(),
        })
    }

    pub fn sender_is_bot(&self) -> bool {
        self.sender.as_ref().map(|s| s.is_bot).unwrap_or(false)
    }

    /// Non-empty text body, if any.
    pub fn text_body(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.is_empty())
    }

    /// Highest-resolution photo variant. Ties keep the later entry.
    pub fn largest_photo(&self) -> Option<&PhotoVariant> {
        self.photo.iter().max_by_key(|p| p.area())
    }

    pub fn has_photo(&self) -> bool {
        !self.photo.is_empty()
    }
}

/// Converts a transport-specific message into an [`InboundEvent`].
pub trait ToInboundEvent: Send + Sync {
    fn to_inbound(&self) -> InboundEvent;
}

/// Where an outbound message goes: a chat, optionally a thread inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    pub chat_id: i64,
    pub thread_id: Option<ThreadId>,
}

impl Destination {
    /// The private chat with an end user (private chat id equals the user id).
    pub fn private(user: EndUserId) -> Self {
        Self {
            chat_id: user.0,
            thread_id: None,
        }
    }

    pub fn group(chat_id: i64, thread_id: Option<ThreadId>) -> Self {
        Self { chat_id, thread_id }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.thread_id {
            Some(t) => write!(f, "{}#{}", self.chat_id, t),
            None => write!(f, "{}", self.chat_id),
        }
    }
}

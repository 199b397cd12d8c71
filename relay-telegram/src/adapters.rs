//! Adapters from Telegram (teloxide) types to relay_core types.
//! Depends only on teloxide and relay_core type definitions.

use relay_core::{
    ChatKind, InboundEvent, PhotoVariant, ReplyContext, Sender, ThreadId, ToInboundEvent,
};

/// Wraps a teloxide Message for conversion to [`InboundEvent`].
pub struct TelegramMessageWrapper<'a>(pub &'a teloxide::types::Message);

impl<'a> ToInboundEvent for TelegramMessageWrapper<'a> {
    fn to_inbound(&self) -> InboundEvent {
        let msg = self.0;
        InboundEvent {
            message_id: msg.id.0,
            chat_id: msg.chat.id.0,
            chat_kind: self.chat_kind(),
            sender: msg.from.as_ref().map(|u| Sender {
                id: u.id.0 as i64,
                username: u.username.clone(),
                first_name: Some(u.first_name.clone()),
                is_bot: u.is_bot,
            }),
            text: msg.text().map(str::to_string),
            caption: msg.caption().map(str::to_string),
            photo: self.photo_variants(),
            has_document: msg.document().is_some(),
            reply_to: self.reply_context(),
            thread_id: self.thread_id(),
            received_at: chrono::Utc::now(),
        }
    }
}

impl<'a> TelegramMessageWrapper<'a> {
    fn chat_kind(&self) -> ChatKind {
        let chat = &self.0.chat;
        if chat.is_private() {
            ChatKind::Private
        } else if chat.is_supergroup() {
            ChatKind::Supergroup
        } else if chat.is_group() {
            ChatKind::Group
        } else {
            ChatKind::Channel
        }
    }

    fn photo_variants(&self) -> Vec<PhotoVariant> {
        self.0
            .photo()
            .map(|sizes| {
                sizes
                    .iter()
                    .map(|p| PhotoVariant {
                        file_id: p.file.id.to_string(),
                        width: p.width,
                        height: p.height,
                        file_size: p.file.size,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Replied-to message; its caption stands in for text when it carries media.
    fn reply_context(&self) -> Option<ReplyContext> {
        self.0.reply_to_message().map(|m| ReplyContext {
            message_id: m.id.0,
            text: m.text().or(m.caption()).map(str::to_string),
            from_bot: m.from.as_ref().map(|u| u.is_bot).unwrap_or(false),
        })
    }

    /// Forum thread id. Telegram also sets a thread id on plain reply chains, so only topic
    /// messages count.
    fn thread_id(&self) -> Option<ThreadId> {
        if !self.0.is_topic_message {
            return None;
        }
        self.0.thread_id.map(|t| ThreadId(t.0 .0))
    }
}

//! Wraps teloxide::Bot and implements [`relay_core::MessagingApi`]. Production code talks to the
//! Telegram Bot API; tests substitute another MessagingApi impl.

use async_trait::async_trait;
use relay_core::{Destination, MessagingApi, RelayError, Result, SelfInfo, ThreadId};
use teloxide::{
    prelude::*,
    types::{ChatId, FileId, InputFile, MessageId, ThreadId as TopicThreadId},
};

/// Thin wrapper around teloxide::Bot that implements relay-core's MessagingApi.
#[derive(Clone)]
pub struct TelegramApiAdapter {
    bot: teloxide::Bot,
}

impl TelegramApiAdapter {
    /// Creates an adapter from an existing teloxide Bot.
    pub fn new(bot: teloxide::Bot) -> Self {
        Self { bot }
    }

    /// Returns the underlying teloxide::Bot for direct API use when needed.
    pub fn inner(&self) -> &teloxide::Bot {
        &self.bot
    }
}

fn topic_thread(thread: ThreadId) -> TopicThreadId {
    TopicThreadId(MessageId(thread.0))
}

#[async_trait]
impl MessagingApi for TelegramApiAdapter {
    async fn create_thread(&self, group_id: i64, name: &str) -> Result<ThreadId> {
        let topic = self
            .bot
            .create_forum_topic(ChatId(group_id), name)
            .await
            .map_err(|e| RelayError::ThreadCreation(e.to_string()))?;
        Ok(ThreadId(topic.thread_id.0 .0))
    }

    async fn send_text(&self, destination: &Destination, text: &str) -> Result<()> {
        let mut request = self.bot.send_message(ChatId(destination.chat_id), text);
        if let Some(thread) = destination.thread_id {
            request = request.message_thread_id(topic_thread(thread));
        }
        request
            .await
            .map_err(|e| RelayError::Api(e.to_string()))?;
        Ok(())
    }

    async fn send_photo(
        &self,
        destination: &Destination,
        photo_ref: &str,
        caption: Option<&str>,
    ) -> Result<()> {
        let photo = InputFile::file_id(FileId(photo_ref.to_string()));
        let mut request = self.bot.send_photo(ChatId(destination.chat_id), photo);
        if let Some(thread) = destination.thread_id {
            request = request.message_thread_id(topic_thread(thread));
        }
        if let Some(caption) = caption.filter(|c| !c.is_empty()) {
            request = request.caption(caption);
        }
        request
            .await
            .map_err(|e| RelayError::Api(e.to_string()))?;
        Ok(())
    }

    async fn get_self_info(&self) -> Result<SelfInfo> {
        let me = self
            .bot
            .get_me()
            .await
            .map_err(|e| RelayError::Api(e.to_string()))?;
        Ok(SelfInfo {
            username: me.user.username.clone(),
            first_name: me.user.first_name.clone(),
        })
    }
}

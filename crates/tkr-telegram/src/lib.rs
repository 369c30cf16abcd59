//! Telegram adapter (teloxide).
//!
//! This crate implements the `tkr-core` MessagingPort over Telegram Bot API
//! and routes incoming updates to the link dispatcher.

use async_trait::async_trait;

use teloxide::{prelude::*, types::InputFile};

use tokio::time::sleep;

pub mod handlers;
pub mod router;

use tkr_core::{
    domain::{ChatId, MessageId, MessageRef},
    errors::Error,
    ports::MessagingPort,
    Result,
};

#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    fn tg_chat(chat_id: ChatId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat_id.0)
    }

    fn map_err(e: teloxide::RequestError) -> Error {
        Error::External(format!("telegram error: {e}"))
    }

    async fn with_retry<T, Fut>(&self, mut op: impl FnMut() -> Fut) -> Result<T>
    where
        Fut: std::future::IntoFuture<Output = std::result::Result<T, teloxide::RequestError>>,
        Fut::IntoFuture: Send,
    {
        const MAX_RETRIES: usize = 1;
        let mut attempts = 0usize;
        loop {
            match op().await {
                Ok(v) => return Ok(v),
                Err(e) => match e {
                    teloxide::RequestError::RetryAfter(d) if attempts < MAX_RETRIES => {
                        attempts += 1;
                        sleep(d).await;
                        continue;
                    }
                    other => return Err(Self::map_err(other)),
                },
            }
        }
    }
}

#[async_trait]
impl MessagingPort for TelegramMessenger {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageRef> {
        let msg = self
            .with_retry(|| self.bot.send_message(Self::tg_chat(chat_id), text.to_string()))
            .await?;

        Ok(MessageRef {
            chat_id,
            message_id: MessageId(msg.id.0),
        })
    }

    async fn send_video(
        &self,
        chat_id: ChatId,
        media_url: &str,
        caption: &str,
    ) -> Result<MessageRef> {
        // Telegram downloads the video itself; we only hand over the URL.
        let url = reqwest::Url::parse(media_url)
            .map_err(|e| Error::External(format!("invalid media url {media_url}: {e}")))?;

        let msg = self
            .with_retry(|| {
                self.bot
                    .send_video(Self::tg_chat(chat_id), InputFile::url(url.clone()))
                    .caption(caption.to_string())
            })
            .await?;

        Ok(MessageRef {
            chat_id,
            message_id: MessageId(msg.id.0),
        })
    }
}

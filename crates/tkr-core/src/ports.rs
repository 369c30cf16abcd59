use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageRef},
    Result,
};

/// Hexagonal port for the outbound chat side (Telegram today).
///
/// Both calls may fault on transport errors; the dispatcher decides what a
/// fault means for the user.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageRef>;

    /// Send a video by URL; the messenger fetches the media itself.
    async fn send_video(
        &self,
        chat_id: ChatId,
        media_url: &str,
        caption: &str,
    ) -> Result<MessageRef>;
}

/// Hexagonal port for the video extraction service.
///
/// `Ok(None)` is an ordinary failure (private video, dead link, service said
/// no). `Err` is reserved for transport faults and malformed responses.
#[async_trait]
pub trait VideoResolver: Send + Sync {
    async fn resolve(&self, url: &str) -> Result<Option<String>>;
}

use std::{sync::Arc, time::Instant};

use tracing::{debug, info, warn};

use crate::{
    domain::{ChatId, UserId},
    link::{supported_link, LinkRequest},
    ports::{MessagingPort, VideoResolver},
    rate_limit::RateLimiter,
    replies, Result,
};

/// Terminal classification of one handled message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Video resolved and sent.
    Delivered,
    /// Too many admitted requests in the trailing window.
    RateLimited,
    /// Admitted, but the text is not a supported link.
    InvalidLink,
    /// The resolver found nothing playable.
    ResolutionFailed,
    /// Resolver or messenger faulted; carries the error text shown to the user.
    ResolutionError(String),
}

/// Per-message orchestration: admission, validation, resolution, delivery.
///
/// `handle` is the fault boundary for one message. It never returns an error;
/// every failure ends up as an [`Outcome`] plus a reply to the chat.
pub struct LinkDispatcher {
    limiter: RateLimiter,
    resolver: Arc<dyn VideoResolver>,
    messenger: Arc<dyn MessagingPort>,
}

impl LinkDispatcher {
    pub fn new(
        limiter: RateLimiter,
        resolver: Arc<dyn VideoResolver>,
        messenger: Arc<dyn MessagingPort>,
    ) -> Self {
        Self {
            limiter,
            resolver,
            messenger,
        }
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub async fn handle_request(&self, req: &LinkRequest) -> Outcome {
        self.handle(req.user_id, req.chat_id, &req.raw_text, req.received_at)
            .await
    }

    pub async fn handle(
        &self,
        user_id: UserId,
        chat_id: ChatId,
        raw_text: &str,
        now: Instant,
    ) -> Outcome {
        if !self.limiter.admit(user_id, now) {
            info!(user_id = user_id.0, "rate limited");
            self.reply(chat_id, replies::RATE_LIMITED).await;
            return Outcome::RateLimited;
        }

        let Some(url) = supported_link(raw_text) else {
            debug!(user_id = user_id.0, "unsupported link");
            self.reply(chat_id, replies::INVALID_LINK).await;
            return Outcome::InvalidLink;
        };

        match self.deliver(chat_id, url).await {
            Ok(true) => {
                info!(user_id = user_id.0, chat_id = chat_id.0, url, "video delivered");
                Outcome::Delivered
            }
            Ok(false) => {
                info!(user_id = user_id.0, url, "resolver returned no media");
                self.reply(chat_id, replies::RESOLUTION_FAILED).await;
                Outcome::ResolutionFailed
            }
            Err(e) => {
                warn!(
                    user_id = user_id.0,
                    chat_id = chat_id.0,
                    url,
                    error = %e,
                    "failed to relay video"
                );
                let detail = e.to_string();
                self.reply(chat_id, &replies::resolution_error(&detail)).await;
                Outcome::ResolutionError(detail)
            }
        }
    }

    /// `Ok(false)` when the resolver has no media for `url`.
    async fn deliver(&self, chat_id: ChatId, url: &str) -> Result<bool> {
        self.messenger
            .send_text(chat_id, replies::DOWNLOADING)
            .await?;

        let Some(media_url) = self.resolver.resolve(url).await? else {
            return Ok(false);
        };

        self.messenger
            .send_video(chat_id, &media_url, replies::VIDEO_CAPTION)
            .await?;
        Ok(true)
    }

    // Reply failures are logged only; there is nowhere left to report them.
    async fn reply(&self, chat_id: ChatId, text: &str) {
        if let Err(e) = self.messenger.send_text(chat_id, text).await {
            warn!(chat_id = chat_id.0, error = %e, "failed to send reply");
        }
    }
}

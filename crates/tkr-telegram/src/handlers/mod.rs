//! Telegram update handlers.
//!
//! Commands get canned replies; every other text message goes through the
//! link dispatcher. Non-text updates are ignored.

use std::sync::Arc;

use teloxide::{prelude::*, types::Message};
use tracing::debug;

use crate::router::AppState;

mod commands;
mod text;

pub async fn handle_message(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        debug!(chat_id = msg.chat.id.0, "ignoring non-text message");
        return Ok(());
    };

    if text.starts_with('/') {
        return commands::handle_command(msg, state).await;
    }

    text::handle_text(msg, state).await
}

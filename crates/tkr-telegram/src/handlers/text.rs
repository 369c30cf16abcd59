use std::{sync::Arc, time::Instant};

use teloxide::prelude::*;
use tracing::{debug, warn};

use tkr_core::{
    domain::{ChatId, UserId},
    link::LinkRequest,
};

use crate::router::AppState;

pub async fn handle_text(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let Some(text) = msg.text() else {
        return Ok(());
    };

    let Some(user_id) = user_id_from(user.id.0) else {
        warn!(telegram_user_id = user.id.0, "user id out of range; ignoring message");
        return Ok(());
    };

    let req = LinkRequest {
        user_id,
        chat_id: ChatId(msg.chat.id.0),
        raw_text: text.to_string(),
        received_at: Instant::now(),
    };

    let outcome = state.dispatcher.handle_request(&req).await;
    debug!(user_id = user_id.0, ?outcome, "message handled");

    Ok(())
}

fn user_id_from(raw: u64) -> Option<UserId> {
    i64::try_from(raw).ok().map(UserId)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_ids_convert_without_truncation() {
        assert_eq!(user_id_from(123_456_789), Some(UserId(123_456_789)));
        assert_eq!(user_id_from(i64::MAX as u64), Some(UserId(i64::MAX)));
        assert_eq!(user_id_from(i64::MAX as u64 + 1), None);
        assert_eq!(user_id_from(u64::MAX), None);
    }
}

use std::sync::Arc;

use teloxide::prelude::*;
use tracing::{debug, warn};

use tkr_core::{domain::ChatId, replies};

use crate::router::AppState;

/// Command name, lowercased. Telegram may send `/cmd@botname arg1 ...`;
/// arguments are ignored since neither command takes any.
fn parse_command(text: &str) -> String {
    let first = text.split_whitespace().next().unwrap_or("");

    first
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase()
}

fn reply_for(cmd: &str) -> Option<&'static str> {
    match cmd {
        "start" => Some(replies::START),
        "help" => Some(replies::HELP),
        _ => None,
    }
}

pub async fn handle_command(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };

    let cmd = parse_command(text);
    let Some(reply) = reply_for(&cmd) else {
        debug!(command = %cmd, "ignoring unknown command");
        return Ok(());
    };

    let chat_id = ChatId(msg.chat.id.0);
    if let Err(e) = state.messenger.send_text(chat_id, reply).await {
        warn!(chat_id = chat_id.0, command = %cmd, error = %e, "failed to answer command");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_command_name_only() {
        assert_eq!(parse_command("/Help@tiktok_bot  extra words"), "help");
        assert_eq!(parse_command("  /start\n"), "start");
        assert_eq!(parse_command("/"), "");
    }

    #[test]
    fn only_start_and_help_have_replies() {
        assert_eq!(reply_for("start"), Some(replies::START));
        assert_eq!(reply_for("help"), Some(replies::HELP));
        assert_eq!(reply_for("download"), None);
        assert_eq!(reply_for(""), None);
    }

    #[test]
    fn help_lists_example_links() {
        assert!(replies::HELP.contains("https://tiktok.com/@user/video/123456789"));
        assert!(replies::HELP.contains("https://www.tiktok.com/t/abcdefghijk/"));
    }
}

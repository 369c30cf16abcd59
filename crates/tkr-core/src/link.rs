use std::time::Instant;

use crate::domain::{ChatId, UserId};

/// Accepted link prefixes. Matching is exact and case-sensitive.
pub const SUPPORTED_PREFIXES: [&str; 3] = [
    "https://www.tiktok.com",
    "https://tiktok.com",
    "https://vt.tiktok.com",
];

/// One inbound message as handed to the dispatcher. Never stored.
#[derive(Clone, Debug)]
pub struct LinkRequest {
    pub user_id: UserId,
    pub chat_id: ChatId,
    pub raw_text: String,
    pub received_at: Instant,
}

pub fn is_supported_link(raw: &str) -> bool {
    supported_link(raw).is_some()
}

/// Trim surrounding whitespace and return the link if it starts with one of
/// [`SUPPORTED_PREFIXES`].
pub fn supported_link(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    SUPPORTED_PREFIXES
        .iter()
        .any(|p| trimmed.starts_with(p))
        .then_some(trimmed)
}

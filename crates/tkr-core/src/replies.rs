//! User-facing reply texts.

pub const START: &str = "Send me a TikTok link and I'll fetch it without the watermark!";

pub const HELP: &str = "\
📺 TikTok Downloader Bot Help:

1. Send any TikTok video link
2. I'll return it without watermark

Example links:
https://tiktok.com/@user/video/123456789
https://www.tiktok.com/t/abcdefghijk/";

pub const RATE_LIMITED: &str = "🚫 Too many requests! Please wait a minute.";

pub const INVALID_LINK: &str =
    "⚠️ Please send a valid TikTok URL starting with https://tiktok.com";

pub const DOWNLOADING: &str = "⏳ Downloading your video...";

pub const RESOLUTION_FAILED: &str =
    "❌ Failed to download video. The link may be invalid or private.";

pub const VIDEO_CAPTION: &str = "✅ Here's your TikTok without watermark!";

pub fn resolution_error(detail: &str) -> String {
    format!("⚠️ Error: {detail}")
}

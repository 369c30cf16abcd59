//! tikwm adapter (watermark-free TikTok media URLs).
//!
//! Implements the `tkr-core` VideoResolver port over `GET {base}/api/?url=...`.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use tkr_core::{errors::Error, ports::VideoResolver, Result};

/// Response envelope. Only the fields we read are modelled.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    code: i64,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    data: Option<ApiData>,
}

#[derive(Debug, Deserialize)]
struct ApiData {
    #[serde(default)]
    play: Option<String>,
}

#[derive(Clone, Debug)]
pub struct TikwmClient {
    api_base: String,
    http: reqwest::Client,
}

impl TikwmClient {
    pub fn new(api_base: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::External(format!("tikwm client build error: {e}")))?;
        Ok(Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/api/", self.api_base)
    }
}

#[async_trait]
impl VideoResolver for TikwmClient {
    async fn resolve(&self, url: &str) -> Result<Option<String>> {
        let resp = self
            .http
            .get(self.endpoint())
            .query(&[("url", url)])
            .send()
            .await
            .map_err(|e| Error::External(format!("tikwm request error: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::External(format!(
                "tikwm request failed: {status} {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| Error::External(format!("tikwm read error: {e}")))?;

        parse_play_url(&body)
    }
}

/// Pull the play URL out of a tikwm response body.
///
/// A non-zero `code` means the service could not serve the link; that is an
/// ordinary `None`. Bodies that are not the expected envelope are errors.
fn parse_play_url(body: &str) -> Result<Option<String>> {
    let resp: ApiResponse = serde_json::from_str(body)?;

    if resp.code != 0 {
        debug!(
            code = resp.code,
            msg = resp.msg.as_deref().unwrap_or(""),
            "tikwm returned no media"
        );
        return Ok(None);
    }

    let play = resp
        .data
        .and_then(|d| d.play)
        .filter(|p| !p.trim().is_empty());

    Ok(play)
}

use std::sync::Arc;

use tkr_core::{config::Config, ports::VideoResolver};
use tkr_tikwm::TikwmClient;

#[tokio::main]
async fn main() -> Result<(), tkr_core::Error> {
    tkr_core::logging::init("tkr")?;

    let cfg = Arc::new(Config::load()?);
    tracing::info!(
        api_base = %cfg.tikwm_api_base,
        max_requests = cfg.rate_limit.max_requests,
        window_secs = cfg.rate_limit.window.as_secs(),
        "starting TikTok relay bot"
    );

    let resolver: Arc<dyn VideoResolver> = Arc::new(TikwmClient::new(
        cfg.tikwm_api_base.clone(),
        cfg.resolver_timeout,
    )?);

    tkr_telegram::router::run_polling(cfg, resolver)
        .await
        .map_err(|e| tkr_core::Error::External(format!("telegram bot failed: {e}")))?;

    Ok(())
}

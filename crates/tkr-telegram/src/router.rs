use std::{sync::Arc, time::Duration};

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};
use tracing::{debug, info, warn};

use tkr_core::{
    config::Config,
    dispatcher::LinkDispatcher,
    ports::{MessagingPort, VideoResolver},
    rate_limit::RateLimiter,
};

use crate::handlers;
use crate::TelegramMessenger;

#[derive(Clone)]
pub struct AppState {
    pub messenger: Arc<dyn MessagingPort>,
    pub dispatcher: Arc<LinkDispatcher>,
}

/// Build the bot and run the long-polling loop until it stops.
pub async fn run_polling(
    cfg: Arc<Config>,
    resolver: Arc<dyn VideoResolver>,
) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());

    match bot.get_me().await {
        Ok(me) => info!(username = %me.username(), "bot is running"),
        Err(e) => warn!(error = %e, "getMe failed; continuing with polling"),
    }

    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let dispatcher = Arc::new(LinkDispatcher::new(
        RateLimiter::new(cfg.rate_limit),
        resolver,
        messenger.clone(),
    ));

    if let Some(every) = cfg.rate_limit_sweep_interval {
        tokio::spawn(sweep_idle_users(dispatcher.clone(), every));
    }

    let state = Arc::new(AppState {
        messenger,
        dispatcher,
    });

    let handler =
        dptree::entry().branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .build()
        .dispatch()
        .await;

    Ok(())
}

async fn sweep_idle_users(dispatcher: Arc<LinkDispatcher>, every: Duration) {
    let mut ticker = tokio::time::interval(every);
    // The first tick completes immediately; nothing to evict yet.
    ticker.tick().await;
    loop {
        ticker.tick().await;
        let evicted = dispatcher.limiter().evict_idle(std::time::Instant::now());
        if evicted > 0 {
            debug!(
                evicted,
                remaining = dispatcher.limiter().tracked_users(),
                "evicted idle rate-limit entries"
            );
        }
    }
}

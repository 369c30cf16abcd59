use std::{env, fs, path::Path, time::Duration};

use crate::{errors::Error, rate_limit::RateLimitPolicy, Result};

/// Typed configuration for the relay bot.
#[derive(Clone, Debug)]
pub struct Config {
    // Telegram
    pub telegram_bot_token: String,

    // Resolver (tikwm)
    pub tikwm_api_base: String,
    pub resolver_timeout: Duration,

    // Rate limiting
    pub rate_limit: RateLimitPolicy,
    /// Interval of the idle-user eviction sweep. `None` disables the sweep.
    pub rate_limit_sweep_interval: Option<Duration>,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(env_str)
    }

    /// Build the config from a key lookup (the process env in production).
    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get_u64 = |key: &str| get(key).and_then(|s| s.trim().parse::<u64>().ok());

        // The original deployment used `BOT_TOKEN`; accept both.
        let telegram_bot_token = get("TELEGRAM_BOT_TOKEN")
            .and_then(non_empty)
            .or_else(|| get("BOT_TOKEN").and_then(non_empty))
            .ok_or_else(|| {
                Error::Config("TELEGRAM_BOT_TOKEN environment variable is required".to_string())
            })?;

        let tikwm_api_base = get("TIKWM_API_BASE")
            .and_then(non_empty)
            .unwrap_or_else(|| "https://tikwm.com".to_string())
            .trim_end_matches('/')
            .to_string();
        let resolver_timeout =
            Duration::from_millis(get_u64("RESOLVER_TIMEOUT_MS").unwrap_or(15_000));

        let defaults = RateLimitPolicy::default();
        let rate_limit = RateLimitPolicy {
            max_requests: get("RATE_LIMIT_REQUESTS")
                .and_then(|s| s.trim().parse::<usize>().ok())
                .unwrap_or(defaults.max_requests),
            window: get_u64("RATE_LIMIT_WINDOW")
                .map(Duration::from_secs)
                .unwrap_or(defaults.window),
            retention: get_u64("RATE_LIMIT_RETENTION")
                .map(Duration::from_secs)
                .unwrap_or(defaults.retention),
        };
        if rate_limit.max_requests == 0 {
            return Err(Error::Config("RATE_LIMIT_REQUESTS must be at least 1".to_string()));
        }
        if rate_limit.retention < rate_limit.window {
            return Err(Error::Config(
                "RATE_LIMIT_RETENTION must not be shorter than RATE_LIMIT_WINDOW".to_string(),
            ));
        }

        let sweep_secs = get_u64("RATE_LIMIT_SWEEP_INTERVAL").unwrap_or(600);
        let rate_limit_sweep_interval = (sweep_secs > 0).then(|| Duration::from_secs(sweep_secs));

        Ok(Self {
            telegram_bot_token,
            tikwm_api_base,
            resolver_timeout,
            rate_limit,
            rate_limit_sweep_interval,
        })
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let Some((key, val)) = parse_dotenv_line(raw) else {
            continue;
        };
        if env::var_os(&key).is_some() {
            continue; // do not override existing env
        }
        env::set_var(key, val);
    }
}

fn parse_dotenv_line(raw: &str) -> Option<(String, String)> {
    let line = raw.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let (k, v) = line.split_once('=')?;
    let key = k.trim().trim_start_matches("export ").trim();
    if key.is_empty() {
        return None;
    }

    let mut val = v.trim().to_string();
    // Strip optional surrounding quotes.
    if val.len() >= 2
        && ((val.starts_with('"') && val.ends_with('"'))
            || (val.starts_with('\'') && val.ends_with('\'')))
    {
        val = val[1..val.len() - 1].to_string();
    }

    Some((key.to_string(), val))
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

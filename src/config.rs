//! Server configuration, loaded from environment variables.

use std::time::Duration;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_IDLE_SESSION_TIMEOUT_SECS: u64 = 0;
const DEFAULT_IDLE_SESSION_SWEEP_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// `None` disables idle-session reaping; turns may then wait forever.
    pub idle_session_timeout: Option<Duration>,
    pub idle_sweep_interval: Duration,
}

impl ServerConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.into()),
            port: env_parse("PORT", DEFAULT_PORT),
            idle_session_timeout: timeout_from_secs(env_parse(
                "IDLE_SESSION_TIMEOUT_SECS",
                DEFAULT_IDLE_SESSION_TIMEOUT_SECS,
            )),
            idle_sweep_interval: Duration::from_secs(env_parse(
                "IDLE_SESSION_SWEEP_SECS",
                DEFAULT_IDLE_SESSION_SWEEP_SECS,
            )),
        }
    }
}

/// Zero means "never reap".
fn timeout_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

use std::env;
use std::time::Duration;

use crate::catalog::DEFAULT_INSTRUMENTS;

#[derive(Debug, Clone)]
pub struct Settings {
    pub api_base_url: String,
    pub request_timeout: Duration,

    // how long a notification stays visible
    pub notification_ttl: Duration,

    pub instruments: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "https://alert-backend-i0wx.onrender.com".to_string(),
            request_timeout: Duration::from_secs(30),
            notification_ttl: Duration::from_millis(2000),
            instruments: DEFAULT_INSTRUMENTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

pub fn load() -> Settings {
    // Loads .env if present (no crash if missing)
    dotenvy::dotenv().ok();

    let defaults = Settings::default();

    let api_base_url = env::var("ALERT_API_BASE_URL")
        .ok()
        .map(|s| s.trim().trim_end_matches('/').to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or(defaults.api_base_url);

    let request_timeout = env::var("ALERT_API_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(defaults.request_timeout);

    let notification_ttl = env::var("NOTIFICATION_TTL_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(defaults.notification_ttl);

    let instruments = env::var("ALERT_INSTRUMENTS")
        .ok()
        .map(|s| parse_instruments(&s))
        .filter(|v| !v.is_empty())
        .unwrap_or(defaults.instruments);

    Settings {
        api_base_url,
        request_timeout,
        notification_ttl,
        instruments,
    }
}

fn parse_instruments(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}

use std::env;
use std::time::Duration;

use crate::irristrat::types::Granularity;

#[derive(Clone, Debug)]
pub struct Config {
    pub bind_addr: String,
    pub irristrat_base_url: String,
    pub irristrat_api_token: Option<String>,
    pub irristrat_stations_path: String,
    pub irristrat_daily_path: String,
    pub irristrat_hourly_path: String,
    pub irristrat_ten_minute_path: String,
    pub irristrat_timeout: Duration,
    pub station_timezone: chrono_tz::Tz,
    pub fallback_messages: FallbackMessages,
}

/// Localized error text used when an upstream failure carries no message.
#[derive(Clone, Debug)]
pub struct FallbackMessages {
    pub stations: String,
    pub daily: String,
    pub hourly: String,
    pub ten_minute: String,
}

impl FallbackMessages {
    pub fn for_granularity(&self, granularity: Granularity) -> &str {
        match granularity {
            Granularity::Daily => &self.daily,
            Granularity::Hourly => &self.hourly,
            Granularity::TenMinute => &self.ten_minute,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    pub fn from_vars<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let timeout_ms = or("IRRISTRAT_TIMEOUT_MS", "30000");
        let timeout_ms: u64 = timeout_ms
            .parse()
            .map_err(|_| anyhow::anyhow!("IRRISTRAT_TIMEOUT_MS is not a number: {}", timeout_ms))?;

        let timezone = or("STATION_TIMEZONE", "Europe/Lisbon");
        let station_timezone = timezone
            .parse::<chrono_tz::Tz>()
            .map_err(|_| anyhow::anyhow!("Invalid STATION_TIMEZONE: {}", timezone))?;

        Ok(Config {
            bind_addr: or("BIND_ADDR", "0.0.0.0:8080"),
            irristrat_base_url: or("IRRISTRAT_BASE_URL", "https://irristrat.com/api")
                .trim_end_matches('/')
                .to_string(),
            irristrat_api_token: lookup("IRRISTRAT_API_TOKEN").filter(|token| !token.is_empty()),
            irristrat_stations_path: or("IRRISTRAT_STATIONS_PATH", "/stations"),
            irristrat_daily_path: or("IRRISTRAT_DAILY_PATH", "/stations/{station}/daily"),
            irristrat_hourly_path: or("IRRISTRAT_HOURLY_PATH", "/stations/{station}/hourly"),
            irristrat_ten_minute_path: or("IRRISTRAT_TEN_MINUTE_PATH", "/stations/{station}/10min"),
            irristrat_timeout: Duration::from_millis(timeout_ms),
            station_timezone,
            fallback_messages: FallbackMessages {
                stations: or("FALLBACK_ERROR_STATIONS", "Erro estações"),
                daily: or("FALLBACK_ERROR_DAILY", "Erro diários"),
                hourly: or("FALLBACK_ERROR_HOURLY", "Erro horários"),
                ten_minute: or("FALLBACK_ERROR_TEN_MINUTE", "Erro 10 minutos"),
            },
        })
    }

    pub fn observation_path(&self, granularity: Granularity) -> &str {
        match granularity {
            Granularity::Daily => &self.irristrat_daily_path,
            Granularity::Hourly => &self.irristrat_hourly_path,
            Granularity::TenMinute => &self.irristrat_ten_minute_path,
        }
    }
}

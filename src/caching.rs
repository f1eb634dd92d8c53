use std::time::Duration;

use crate::irristrat::types::Granularity;

/// Cache contract declared to shared HTTP caches in front of the gateway.
/// The process itself never stores responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    pub s_maxage: Duration,
    pub stale_while_revalidate: Duration,
}

/// How a shared cache treats a stored response of a given age.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Fresh,
    Stale,
    Expired,
}

impl CachePolicy {
    pub const DAILY: Self = Self::new(6 * 60 * 60, 60 * 60); // 6 hours, 1 hour stale
    pub const HOURLY: Self = Self::new(60 * 60, 30 * 60); // 1 hour, 30 minutes stale
    pub const TEN_MINUTE: Self = Self::new(10 * 60, 5 * 60);
    pub const STATIONS: Self = Self::new(24 * 60 * 60, 60 * 60);

    pub const fn new(s_maxage_secs: u64, stale_while_revalidate_secs: u64) -> Self {
        Self {
            s_maxage: Duration::from_secs(s_maxage_secs),
            stale_while_revalidate: Duration::from_secs(stale_while_revalidate_secs),
        }
    }

    pub fn for_granularity(granularity: Granularity) -> Self {
        match granularity {
            Granularity::Daily => Self::DAILY,
            Granularity::Hourly => Self::HOURLY,
            Granularity::TenMinute => Self::TEN_MINUTE,
        }
    }

    pub fn header_value(&self) -> String {
        format!(
            "public, s-maxage={}, stale-while-revalidate={}",
            self.s_maxage.as_secs(),
            self.stale_while_revalidate.as_secs()
        )
    }

    pub fn freshness(&self, age: Duration) -> Freshness {
        if age < self.s_maxage {
            Freshness::Fresh
        } else if age < self.s_maxage + self.stale_while_revalidate {
            Freshness::Stale
        } else {
            Freshness::Expired
        }
    }
}

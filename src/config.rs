//! Service configuration from the environment.
//!
//! `.env` is loaded by `main` through dotenvy before [`Config::from_env`] runs.
//! Keys are the upper-cased [`Settings`] field names, e.g. `BOOKING_API_URL`.

use std::net::SocketAddr;
use std::time::Duration;

use serde::Deserialize;

use crate::pricing::models::{EgpDiscountPolicy, MissingPricePolicy, PricingOptions};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Load(#[from] ::config::ConfigError),

    #[error("missing required setting: {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Settings as read from the environment, before validation
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
    /// Base url of the booking API, e.g. `https://api.example.com/api/v1`
    #[serde(default)]
    pub booking_api_url: String,
    #[serde(default = "default_api_timeout_secs")]
    pub api_timeout_secs: u64,
    #[serde(default = "default_trip_cache_ttl_secs")]
    pub trip_cache_ttl_secs: u64,
    #[serde(default = "default_rate_cache_ttl_secs")]
    pub rate_cache_ttl_secs: u64,
    #[serde(default = "default_rate_refresh_secs")]
    pub rate_refresh_secs: u64,
    #[serde(default)]
    pub egp_discount_policy: EgpDiscountPolicy,
    #[serde(default)]
    pub missing_price_policy: MissingPricePolicy,
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

fn default_api_timeout_secs() -> u64 {
    10
}

fn default_trip_cache_ttl_secs() -> u64 {
    5 * 60
}

fn default_rate_cache_ttl_secs() -> u64 {
    15 * 60
}

fn default_rate_refresh_secs() -> u64 {
    10 * 60
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub booking_api_url: String,
    pub api_timeout: Duration,
    pub trip_cache_ttl: Duration,
    pub rate_cache_ttl: Duration,
    pub rate_refresh_interval: Duration,
    pub egp_discount: EgpDiscountPolicy,
    pub missing_price: MissingPricePolicy,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(None)
    }

    /// Load from `vars` instead of the process environment when given
    fn load(vars: Option<::config::Map<String, String>>) -> Result<Self, ConfigError> {
        let settings: Settings = ::config::Config::builder()
            .add_source(
                ::config::Environment::default()
                    .try_parsing(true)
                    .ignore_empty(true)
                    .source(vars),
            )
            .build()?
            .try_deserialize()?;

        Self::try_from(settings)
    }

    pub fn pricing_options(&self) -> PricingOptions {
        PricingOptions {
            egp_discount: self.egp_discount,
            missing_price: self.missing_price,
        }
    }
}

impl TryFrom<Settings> for Config {
    type Error = ConfigError;

    fn try_from(settings: Settings) -> Result<Self, Self::Error> {
        let booking_api_url = settings.booking_api_url.trim().to_string();
        if booking_api_url.is_empty() {
            return Err(ConfigError::Missing("BOOKING_API_URL"));
        }
        if !booking_api_url.starts_with("http://") && !booking_api_url.starts_with("https://") {
            return Err(ConfigError::Invalid {
                key: "BOOKING_API_URL",
                reason: format!("'{}' is not an http(s) url", booking_api_url),
            });
        }

        Ok(Self {
            bind_addr: settings.bind_addr,
            booking_api_url,
            api_timeout: non_zero_secs("API_TIMEOUT_SECS", settings.api_timeout_secs)?,
            trip_cache_ttl: non_zero_secs("TRIP_CACHE_TTL_SECS", settings.trip_cache_ttl_secs)?,
            rate_cache_ttl: non_zero_secs("RATE_CACHE_TTL_SECS", settings.rate_cache_ttl_secs)?,
            rate_refresh_interval: non_zero_secs("RATE_REFRESH_SECS", settings.rate_refresh_secs)?,
            egp_discount: settings.egp_discount_policy,
            missing_price: settings.missing_price_policy,
        })
    }
}

fn non_zero_secs(key: &'static str, secs: u64) -> Result<Duration, ConfigError> {
    if secs == 0 {
        return Err(ConfigError::Invalid {
            key,
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: ::config::Map<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::load(Some(vars))
    }

    #[test]
    fn test_defaults() {
        let config = config(&[("BOOKING_API_URL", "https://api.example.com/api/v1")]).unwrap();
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.api_timeout, Duration::from_secs(10));
        assert_eq!(config.trip_cache_ttl, Duration::from_secs(300));
        assert_eq!(config.rate_refresh_interval, Duration::from_secs(600));
        assert_eq!(config.egp_discount, EgpDiscountPolicy::Proportional);
        assert_eq!(config.missing_price, MissingPricePolicy::Reject);
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("BOOKING_API_URL", "http://localhost:5000/api"),
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("API_TIMEOUT_SECS", "3"),
            ("EGP_DISCOUNT_POLICY", "undiscounted"),
            ("MISSING_PRICE_POLICY", "zero"),
        ])
        .unwrap();
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.api_timeout, Duration::from_secs(3));
        assert_eq!(
            config.pricing_options(),
            PricingOptions {
                egp_discount: EgpDiscountPolicy::Undiscounted,
                missing_price: MissingPricePolicy::TreatAsZero,
            }
        );
    }

    #[test]
    fn test_missing_api_url() {
        assert!(matches!(
            config(&[]),
            Err(ConfigError::Missing("BOOKING_API_URL"))
        ));
        assert!(matches!(
            config(&[("BOOKING_API_URL", "  ")]),
            Err(ConfigError::Missing("BOOKING_API_URL"))
        ));
    }

    #[test]
    fn test_empty_values_fall_back_to_defaults() {
        let config = config(&[
            ("BOOKING_API_URL", "https://api.example.com"),
            ("API_TIMEOUT_SECS", ""),
        ])
        .unwrap();
        assert_eq!(config.api_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_invalid_values() {
        let err = config(&[
            ("BOOKING_API_URL", "https://api.example.com"),
            ("API_TIMEOUT_SECS", "soon"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));

        let err = config(&[
            ("BOOKING_API_URL", "https://api.example.com"),
            ("EGP_DISCOUNT_POLICY", "half"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));

        let err = config(&[
            ("BOOKING_API_URL", "https://api.example.com"),
            ("RATE_REFRESH_SECS", "0"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("greater than zero"));

        assert!(matches!(
            config(&[("BOOKING_API_URL", "ftp://files.example.com")]),
            Err(ConfigError::Invalid { key: "BOOKING_API_URL", .. })
        ));
    }
}

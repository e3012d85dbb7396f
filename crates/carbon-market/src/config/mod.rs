use std::env;
use std::net::{IpAddr, SocketAddr};

use crate::workflows::projects::ListingTerms;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the marketplace service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub marketplace: MarketplaceConfig,
    pub ledger: LedgerConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let price_per_credit = parse_var("MARKET_PRICE_PER_CREDIT", 25.0_f64)?;
        if !(price_per_credit.is_finite() && price_per_credit >= 0.0) {
            return Err(ConfigError::InvalidNumber {
                key: "MARKET_PRICE_PER_CREDIT",
            });
        }
        let rating = parse_var("MARKET_DEFAULT_RATING", 4.7_f32)?;
        let reviews = parse_var("MARKET_DEFAULT_REVIEWS", 15_u32)?;

        let chain_id = parse_var("LEDGER_CHAIN_ID", 80002_u64)?;
        let token_contract = env::var("LEDGER_TOKEN_CONTRACT")
            .unwrap_or_else(|_| DEFAULT_TOKEN_CONTRACT.to_string());
        let token_price_usd = parse_var("LEDGER_TOKEN_PRICE_USD", 25.5_f64)?;
        let pin_url = env::var("IPFS_PIN_URL")
            .ok()
            .filter(|value| !value.trim().is_empty());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            marketplace: MarketplaceConfig {
                price_per_credit,
                rating,
                reviews,
            },
            ledger: LedgerConfig {
                chain_id,
                token_contract,
                token_price_usd,
                pin_url,
            },
        })
    }
}

const DEFAULT_TOKEN_CONTRACT: &str = "0xf84473cbC4dB118348d1d07414Cd98987750428e";

fn parse_var<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { key }),
        _ => Ok(default),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Listing terms applied when a project has no per-listing override.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketplaceConfig {
    pub price_per_credit: f64,
    pub rating: f32,
    pub reviews: u32,
}

impl MarketplaceConfig {
    pub fn listing_terms(&self) -> ListingTerms {
        ListingTerms {
            price_per_credit: self.price_per_credit,
            rating: self.rating,
            reviews: self.reviews,
        }
    }
}

/// Chain and pinning settings for the ledger pass-through endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerConfig {
    pub chain_id: u64,
    pub token_contract: String,
    pub token_price_usd: f64,
    pub pin_url: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("APP_PORT must be a valid u16")]
    InvalidPort,
    #[error("APP_HOST must parse to an IPv4 or IPv6 address")]
    InvalidHost {
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("{key} must be a valid non-negative number")]
    InvalidNumber { key: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "MARKET_PRICE_PER_CREDIT",
            "MARKET_DEFAULT_RATING",
            "MARKET_DEFAULT_REVIEWS",
            "LEDGER_CHAIN_ID",
            "LEDGER_TOKEN_CONTRACT",
            "LEDGER_TOKEN_PRICE_USD",
            "IPFS_PIN_URL",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.marketplace.price_per_credit, 25.0);
        assert_eq!(config.marketplace.reviews, 15);
        assert_eq!(config.ledger.chain_id, 80002);
        assert!(config.ledger.pin_url.is_none());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn marketplace_overrides_feed_listing_terms() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("MARKET_PRICE_PER_CREDIT", "31.5");
        env::set_var("MARKET_DEFAULT_REVIEWS", "3");
        let config = AppConfig::load().expect("config loads");
        let terms = config.marketplace.listing_terms();
        assert_eq!(terms.price_per_credit, 31.5);
        assert_eq!(terms.reviews, 3);
        reset_env();
    }

    #[test]
    fn rejects_negative_price() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("MARKET_PRICE_PER_CREDIT", "-4");
        let err = AppConfig::load().expect_err("negative price rejected");
        assert!(matches!(
            err,
            ConfigError::InvalidNumber {
                key: "MARKET_PRICE_PER_CREDIT"
            }
        ));
        reset_env();
    }
}

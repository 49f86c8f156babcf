//! Runtime configuration loaded from environment variables.

use {
    crate::{
        adapters::{http::HttpLimits, images::DEFAULT_MAX_LOGO_BYTES},
        domain::policy::FieldPolicy,
        services::payment_pipeline::PipelineSettings,
    },
    std::{str::FromStr, time::Duration},
    thiserror::Error,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} is not valid: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Reads from environment variables:
/// - `BIND_ADDR`: listen address (default: `"0.0.0.0:3000"`)
/// - `DATABASE_URL`: Postgres; in-memory storage when unset
/// - `BASE_URL`: prefix for invoice links (default: `"http://localhost:3000"`)
/// - `STRIPE_SECRET_KEY`: Stripe; sandbox processor when unset
/// - `CHARGE_TIMEOUT_SECS`: bound on one charge attempt (default: `30`)
/// - `REQUEST_TIMEOUT_SECS`: bound on one HTTP request (default: `60`)
/// - `MAX_BODY_BYTES`: request body cap (default: 2 MiB)
/// - `MAX_LOGO_BYTES`: promotion logo cap (default: 256 KiB)
/// - `MIN_AMOUNT`: smallest accepted donation in dollars (default: `10`)
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub database_url: Option<String>,
    pub stripe_secret_key: Option<String>,
    pub max_logo_bytes: usize,
    pub http: HttpLimits,
    pub pipeline: PipelineSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            database_url: None,
            stripe_secret_key: None,
            max_logo_bytes: DEFAULT_MAX_LOGO_BYTES,
            http: HttpLimits::default(),
            pipeline: PipelineSettings::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Builds the config from any variable source; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let policy = FieldPolicy {
            min_amount: parse_or(&get, "MIN_AMOUNT", defaults.pipeline.policy.min_amount)?,
            ..FieldPolicy::default()
        };

        Ok(Self {
            bind_addr: get("BIND_ADDR").unwrap_or(defaults.bind_addr),
            database_url: get("DATABASE_URL"),
            stripe_secret_key: get("STRIPE_SECRET_KEY"),
            max_logo_bytes: parse_or(&get, "MAX_LOGO_BYTES", defaults.max_logo_bytes)?,
            http: HttpLimits {
                max_body_bytes: parse_or(&get, "MAX_BODY_BYTES", defaults.http.max_body_bytes)?,
                request_timeout: Duration::from_secs(parse_or(
                    &get,
                    "REQUEST_TIMEOUT_SECS",
                    defaults.http.request_timeout.as_secs(),
                )?),
            },
            pipeline: PipelineSettings {
                policy,
                charge_timeout: Duration::from_secs(parse_or(
                    &get,
                    "CHARGE_TIMEOUT_SECS",
                    defaults.pipeline.charge_timeout.as_secs(),
                )?),
                base_url: get("BASE_URL")
                    .map(|url| url.trim_end_matches('/').to_string())
                    .unwrap_or(defaults.pipeline.base_url),
            },
        })
    }
}

fn parse_or<T: FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match get(var) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
    }
}

use chrono::NaiveDate;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub enum Deployment {
    Local,
    Dev,
    Stage,
    Prod,
}

impl Deployment {
    #[must_use]
    pub fn from_label(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Self::Dev,
            "stage" | "staging" => Self::Stage,
            "prod" | "production" => Self::Prod,
            _ => Self::Local,
        }
    }
}

/// How ingested records are written when their `id` already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Plain insert; rows whose `id` already exists are left untouched.
    Insert,
    /// Insert or overwrite every non-key column of the existing row.
    Upsert,
}

impl FromStr for WriteMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "insert" => Ok(Self::Insert),
            "upsert" => Ok(Self::Upsert),
            other => Err(ConfigError::Invalid {
                name: "WRITE_MODE",
                value: other.to_string(),
            }),
        }
    }
}

/// Whether the process syncs once and exits, or stays up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Once,
    Serve,
}

impl FromStr for RunMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "once" => Ok(Self::Once),
            "serve" => Ok(Self::Serve),
            other => Err(ConfigError::Invalid {
                name: "RUN_MODE",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    #[must_use]
    pub fn from_label(s: &str) -> Self {
        if s.eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Pretty
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    // Database
    pub database_url: String,
    pub run_migrations: bool,

    // Oura API
    pub oura_base_url: String,
    pub oura_token: String,
    pub oura_timeout_seconds: u64,

    // Ingestion
    pub write_mode: WriteMode,
    pub run_mode: RunMode,
    pub sync_start_date: Option<NaiveDate>,
    pub sync_end_date: Option<NaiveDate>,
    pub sync_lookback_days: i64,
    pub sync_overlap_days: i64,
    pub sync_interval_seconds: u64,
    pub sync_retry_max: u32,
    pub sync_retry_delay_seconds: u64,

    // API settings
    pub api_host: String,
    pub api_port: u16,

    // Rate limiting
    pub disable_rate_limiting: bool,
    pub rate_limit_per_second: u64,
    pub rate_limit_burst: u32,

    // Caching
    pub cache_ttl_seconds: u64,
    pub cache_max_bytes: u64,

    // Application metadata
    pub log_format: LogFormat,
    pub deployment: Deployment,
}

impl Config {
    /// Configuration with every optional knob at its default.
    #[must_use]
    pub fn new(database_url: impl Into<String>, oura_token: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            run_migrations: true,

            oura_base_url: "https://api.ouraring.com".to_string(),
            oura_token: oura_token.into(),
            oura_timeout_seconds: 60,

            write_mode: WriteMode::Upsert,
            run_mode: RunMode::Once,
            sync_start_date: None,
            sync_end_date: None,
            sync_lookback_days: 7,
            sync_overlap_days: 1,
            sync_interval_seconds: 21_600, // 6 hours
            sync_retry_max: 3,
            sync_retry_delay_seconds: 60,

            api_host: "0.0.0.0".to_string(),
            api_port: 3000,

            disable_rate_limiting: false,
            rate_limit_per_second: 5,
            rate_limit_burst: 60,

            cache_ttl_seconds: 300,
            cache_max_bytes: 52_428_800, // 50MB

            log_format: LogFormat::Pretty,
            deployment: Deployment::Local,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if required environment variables are not set,
    /// and `ConfigError::Invalid` if a mode or date variable cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let d = Self::new(
            env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?,
            env::var("OURA_TOKEN").map_err(|_| ConfigError::Missing("OURA_TOKEN"))?,
        );

        Ok(Self {
            // Database
            run_migrations: parse_or("RUN_MIGRATIONS", d.run_migrations),

            // Oura API
            oura_base_url: env::var("OURA_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| d.oura_base_url.clone()),
            oura_timeout_seconds: parse_or("OURA_TIMEOUT_SECONDS", d.oura_timeout_seconds),

            // Ingestion
            write_mode: match env::var("WRITE_MODE") {
                Ok(v) => v.parse()?,
                Err(_) => d.write_mode,
            },
            run_mode: match env::var("RUN_MODE") {
                Ok(v) => v.parse()?,
                Err(_) => d.run_mode,
            },
            sync_start_date: optional_date("SYNC_START_DATE")?,
            sync_end_date: optional_date("SYNC_END_DATE")?,
            sync_lookback_days: parse_or("SYNC_LOOKBACK_DAYS", d.sync_lookback_days),
            sync_overlap_days: parse_or("SYNC_OVERLAP_DAYS", d.sync_overlap_days),
            sync_interval_seconds: parse_or("SYNC_INTERVAL_SECONDS", d.sync_interval_seconds),
            sync_retry_max: parse_or("SYNC_RETRY_MAX", d.sync_retry_max),
            sync_retry_delay_seconds: parse_or("SYNC_RETRY_DELAY_SECONDS", d.sync_retry_delay_seconds),

            // API settings
            api_host: env::var("API_HOST").unwrap_or_else(|_| d.api_host.clone()),
            api_port: parse_or("API_PORT", d.api_port),

            // Rate limiting
            disable_rate_limiting: parse_or("DISABLE_RATE_LIMITING", d.disable_rate_limiting),
            rate_limit_per_second: parse_or("RATE_LIMIT_PER_SECOND", d.rate_limit_per_second),
            rate_limit_burst: parse_or("RATE_LIMIT_BURST", d.rate_limit_burst),

            // Caching
            cache_ttl_seconds: parse_or("CACHE_TTL_SECONDS", d.cache_ttl_seconds),
            cache_max_bytes: parse_or("CACHE_MAX_BYTES", d.cache_max_bytes),

            // Application metadata
            log_format: env::var("LOG_FORMAT")
                .map(|v| LogFormat::from_label(&v))
                .unwrap_or(d.log_format),
            deployment: env::var("DEPLOYMENT")
                .map(|v| Deployment::from_label(&v))
                .unwrap_or_else(|_| d.deployment.clone()),

            ..d
        })
    }

    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }
}

/// Read a numeric or boolean variable, falling back to `default` when unset or unparseable.
fn parse_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn optional_date(name: &'static str) -> Result<Option<NaiveDate>, ConfigError> {
    match env::var(name) {
        Ok(v) if !v.trim().is_empty() => parse_date(name, &v).map(Some),
        _ => Ok(None),
    }
}

fn parse_date(name: &'static str, value: &str) -> Result<NaiveDate, ConfigError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| ConfigError::Invalid {
        name,
        value: value.to_string(),
    })
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

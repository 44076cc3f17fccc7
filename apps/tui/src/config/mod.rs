use crate::domain::Coordinates;
use color_eyre::eyre::eyre;
use dotenv::dotenv;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_ANALYSIS_URL: &str = "http://localhost:8005";
pub const DEFAULT_HISTORY_URL: &str = "http://127.0.0.1:8004";
pub const DEFAULT_DETECT_URL: &str = "http://127.0.0.1:8001";
pub const DEFAULT_DATABASE_NAME: &str = "civic_dash.db";
pub const DEFAULT_LOG_FILE: &str = "civic_dash.log";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Hubli–Dharwad, where the backend's sample data lives.
pub const DEFAULT_CITY_CENTER: Coordinates = Coordinates {
    latitude: 15.3647,
    longitude: 75.1239,
};

/// Base URLs of the backend services. They are configured independently
/// because the services are deployed on different hosts and ports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub analysis: String,
    pub hotspots: String,
    pub map: String,
    pub history: String,
    pub detect: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            analysis: DEFAULT_ANALYSIS_URL.to_string(),
            hotspots: DEFAULT_ANALYSIS_URL.to_string(),
            map: DEFAULT_ANALYSIS_URL.to_string(),
            history: DEFAULT_HISTORY_URL.to_string(),
            detect: DEFAULT_DETECT_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub endpoints: Endpoints,
    pub database_url: String,
    pub request_timeout: Duration,
    pub city_center: Coordinates,
    pub log_level: String,
    pub log_file: PathBuf,
}

impl AppConfig {
    /// Builds the configuration from a variable lookup. Unparsable numeric
    /// values fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = |key: &str, default: &str| {
            lookup(key)
                .map(|value| value.trim().trim_end_matches('/').to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let endpoints = Endpoints {
            analysis: url("ANALYSIS_URL", DEFAULT_ANALYSIS_URL),
            hotspots: url("HOTSPOTS_URL", DEFAULT_ANALYSIS_URL),
            map: url("MAP_URL", DEFAULT_ANALYSIS_URL),
            history: url("HISTORY_URL", DEFAULT_HISTORY_URL),
            detect: url("DETECT_URL", DEFAULT_DETECT_URL),
        };

        let request_timeout = lookup("REQUEST_TIMEOUT_SECS")
            .and_then(|value| {
                let parsed = value.trim().parse::<u64>().ok().filter(|secs| *secs > 0);
                if parsed.is_none() {
                    tracing::warn!(value, "invalid REQUEST_TIMEOUT_SECS, using default");
                }
                parsed
            })
            .map_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS), Duration::from_secs);

        let city_center = lookup("CITY_CENTER")
            .and_then(|value| {
                let parsed = parse_center(&value);
                if parsed.is_none() {
                    tracing::warn!(value, "invalid CITY_CENTER, using default");
                }
                parsed
            })
            .unwrap_or(DEFAULT_CITY_CENTER);

        let log_level = lookup("LOG_LEVEL")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| {
                if lookup("DEBUG").is_some() {
                    "debug".to_string()
                } else {
                    "info".to_string()
                }
            });

        let log_file = lookup("LOG_FILE").map_or_else(|| PathBuf::from(DEFAULT_LOG_FILE), PathBuf::from);

        let db_name =
            lookup("DATABASE_NAME").unwrap_or_else(|| DEFAULT_DATABASE_NAME.to_string());

        Self {
            endpoints,
            database_url: database_url_for(&PathBuf::from(db_name)),
            request_timeout,
            city_center,
            log_level,
            log_file,
        }
    }
}

/// Loads `.env` and reads the configuration from the process environment.
pub fn init_app_config() -> color_eyre::eyre::Result<AppConfig> {
    dotenv().ok();

    let mut config = AppConfig::from_lookup(|key| env::var(key).ok());

    // Relative database paths resolve against the working directory.
    let base_dir: PathBuf = env::current_dir()?;
    let db_name = env::var("DATABASE_NAME").unwrap_or_else(|_| DEFAULT_DATABASE_NAME.to_string());
    let database_path = base_dir.join(&db_name);

    if let Some(parent) = database_path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    if database_path.to_str().is_none() {
        return Err(eyre!("Invalid database path"));
    }
    config.database_url = database_url_for(&database_path);

    Ok(config)
}

/// SQLx wants three slashes for absolute paths and two for relative ones.
fn database_url_for(path: &std::path::Path) -> String {
    let path_str = path.to_string_lossy();
    let clean_path = path_str.trim_start_matches('/');
    if path.is_absolute() {
        format!("sqlite:///{clean_path}")
    } else {
        format!("sqlite://{clean_path}")
    }
}

fn parse_center(value: &str) -> Option<Coordinates> {
    let (lat, lng) = value.split_once(',')?;
    Coordinates::new(lat.trim().parse().ok()?, lng.trim().parse().ok()?)
}

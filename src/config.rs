use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

const DEFAULT_LOG_LEVEL: &str = "kpi_rca=info,tower_http=info";
const MAX_CACHE_ENTRIES: usize = 10_000;

/// Main configuration structure loaded from kpi_rca.toml and environment variables
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub data: DataConfig,
    pub rca: RcaConfig,
    /// Runtime configuration loaded from environment variables
    #[serde(skip)]
    pub runtime: RuntimeConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub request_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 5000)),
            request_timeout_ms: 10_000,
        }
    }
}

/// Where KPI time series are read from
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DataConfig {
    /// SQLite database with a `kpi_data(date, kpi, geo, value)` table; preferred when present
    pub sqlite_path: PathBuf,
    /// Flat `date,kpi,geo,value` file used when the database is absent
    pub csv_path: PathBuf,
    /// Number of prompt responses memoized per intent
    pub cache_max: usize,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            sqlite_path: PathBuf::from("kpi.db"),
            csv_path: PathBuf::from("sample_kpi.csv"),
            cache_max: 128,
        }
    }
}

/// Root cause analysis settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RcaConfig {
    /// Optional TOML rule catalog replacing the built-in rules
    pub rules_path: Option<PathBuf>,
}

/// Runtime configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub log_level: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Load runtime configuration from environment variables
    pub fn load_from_env() -> Self {
        Self {
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string()),
        }
    }
}

impl Config {
    /// Load configuration from TOML file and environment variables
    /// Uses KPI_RCA_CONFIG environment variable or defaults to "kpi_rca.toml"
    pub fn load() -> anyhow::Result<Self> {
        if let Ok(env_path) = std::env::var("KPI_ENV_FILE") {
            let _ = dotenvy::from_path(env_path);
        } else {
            let _ = dotenvy::dotenv();
        }

        let config_path =
            std::env::var("KPI_RCA_CONFIG").unwrap_or_else(|_| "kpi_rca.toml".to_string());

        let mut config: Config = if let Ok(content) = std::fs::read_to_string(&config_path) {
            Self::from_toml_str(&content)?
        } else {
            tracing::warn!("Config file {} not found, using defaults", config_path);
            Self::default()
        };

        config.apply_env_overrides();
        config.runtime = RuntimeConfig::load_from_env();
        config.validate()?;

        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply env overrides (env-first)
    pub fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("KPI_HTTP_BIND") {
            match v.parse::<SocketAddr>() {
                Ok(bind) => {
                    self.server.bind = bind;
                    tracing::debug!("KPI_HTTP_BIND env override applied");
                }
                Err(_) => tracing::warn!("Ignoring unparseable KPI_HTTP_BIND '{}'", v),
            }
        }
        if let Some(timeout) = std::env::var("KPI_REQUEST_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            self.server.request_timeout_ms = timeout;
            tracing::debug!("KPI_REQUEST_TIMEOUT_MS env override applied");
        }
        if let Ok(path) = std::env::var("KPI_DB_PATH") {
            self.data.sqlite_path = PathBuf::from(path);
            tracing::debug!("KPI_DB_PATH env override applied");
        }
        if let Ok(path) = std::env::var("KPI_CSV_PATH") {
            self.data.csv_path = PathBuf::from(path);
            tracing::debug!("KPI_CSV_PATH env override applied");
        }
        if let Some(max) = std::env::var("KPI_CACHE_MAX")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
        {
            self.data.cache_max = max;
            tracing::debug!("KPI_CACHE_MAX env override applied");
        }
        if let Ok(path) = std::env::var("KPI_RULES_PATH") {
            self.rca.rules_path = Some(PathBuf::from(path));
            tracing::debug!("KPI_RULES_PATH env override applied");
        }
    }

    /// Validate the configuration, clamping soft limits
    pub fn validate(&mut self) -> anyhow::Result<()> {
        if self.server.request_timeout_ms == 0 {
            anyhow::bail!("server.request_timeout_ms must be > 0");
        }
        if self.data.cache_max == 0 {
            self.data.cache_max = 1;
        } else if self.data.cache_max > MAX_CACHE_ENTRIES {
            tracing::warn!(
                "cache_max {} exceeds max {}, clamping",
                self.data.cache_max,
                MAX_CACHE_ENTRIES
            );
            self.data.cache_max = MAX_CACHE_ENTRIES;
        }
        if let Some(path) = &self.rca.rules_path
            && !path.exists()
        {
            anyhow::bail!("rules file {} does not exist", path.display());
        }
        Ok(())
    }
}

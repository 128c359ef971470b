use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_secs: u64,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default)]
    pub sqlx_logging: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            max_lifetime_secs: default_max_lifetime(),
            acquire_timeout_secs: default_acquire_timeout(),
            sqlx_logging: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { namespace: default_namespace() }
    }
}

fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 2 }
fn default_connect_timeout() -> u64 { 30 }
fn default_idle_timeout() -> u64 { 600 }
fn default_max_lifetime() -> u64 { 3600 }
fn default_acquire_timeout() -> u64 { 30 }
fn default_namespace() -> String { "cake_manager".to_string() }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    load_from_str(&content)
}

pub fn load_from_str(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Config built purely from the environment, used when no file is present.
    pub fn from_env() -> Result<Self> {
        let mut cfg = AppConfig { database: DatabaseConfig::from_env(), ..Default::default() };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.database.normalize_from_env();
        self.database.validate()?;
        self.metrics.validate()?;
        Ok(())
    }
}

impl DatabaseConfig {
    /// Defaults for every pool setting, URL taken from `DATABASE_URL`.
    pub fn from_env() -> Self {
        let mut cfg = DatabaseConfig::default();
        cfg.normalize_from_env();
        cfg
    }

    pub fn normalize_from_env(&mut self) {
        if self.url.trim().is_empty() {
            if let Ok(url) = std::env::var("DATABASE_URL") {
                self.url = url;
            }
        }
    }

    pub fn is_in_memory_sqlite(&self) -> bool {
        let lower = self.url.to_lowercase();
        lower.starts_with("sqlite") && lower.contains(":memory:")
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(anyhow!("database.url is empty; set it in config.toml or DATABASE_URL"));
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("postgresql://") || lower.starts_with("postgres://") || lower.starts_with("sqlite:")) {
            return Err(anyhow!("database.url must start with postgres://, postgresql:// or sqlite:"));
        }
        if self.min_connections == 0 {
            return Err(anyhow!("database.min_connections must be >= 1"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("database.max_connections must be >= min_connections"));
        }
        if self.connect_timeout_secs == 0 || self.acquire_timeout_secs == 0 {
            return Err(anyhow!("database timeouts must be positive seconds"));
        }
        Ok(())
    }
}

impl MetricsConfig {
    fn validate(&self) -> Result<()> {
        let ns = self.namespace.as_str();
        let valid = !ns.is_empty()
            && !ns.starts_with(|c: char| c.is_ascii_digit())
            && ns.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid {
            return Err(anyhow!("metrics.namespace must match [a-zA-Z_][a-zA-Z0-9_]*"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db(url: &str) -> DatabaseConfig {
        DatabaseConfig { url: url.into(), ..DatabaseConfig::default() }
    }

    #[test]
    fn parses_full_file() {
        let cfg = load_from_str(
            r#"
            [database]
            url = "postgres://u:p@localhost:5432/cakes"
            max_connections = 5
            min_connections = 1

            [logging]
            format = "json"

            [metrics]
            namespace = "bakery"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.database.max_connections, 5);
        assert_eq!(cfg.database.acquire_timeout_secs, 30);
        assert_eq!(cfg.logging.format, LogFormat::Json);
        assert_eq!(cfg.metrics.namespace, "bakery");
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let cfg = load_from_str("").unwrap();
        assert_eq!(cfg.logging.format, LogFormat::Compact);
        assert_eq!(cfg.metrics.namespace, "cake_manager");
        assert_eq!(cfg.database.max_connections, 10);
        assert_eq!(cfg.database.min_connections, 2);
    }

    #[test]
    fn accepts_postgres_and_sqlite_urls() {
        assert!(db("postgres://localhost/cakes").validate().is_ok());
        assert!(db("postgresql://localhost/cakes").validate().is_ok());
        assert!(db("sqlite::memory:").validate().is_ok());
        assert!(db("mysql://localhost/cakes").validate().is_err());
    }

    #[test]
    fn rejects_bad_pool_bounds() {
        let mut cfg = db("sqlite::memory:");
        cfg.min_connections = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = db("sqlite::memory:");
        cfg.min_connections = 4;
        cfg.max_connections = 2;
        assert!(cfg.validate().is_err());

        let mut cfg = db("sqlite::memory:");
        cfg.acquire_timeout_secs = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn detects_in_memory_sqlite() {
        assert!(db("sqlite::memory:").is_in_memory_sqlite());
        assert!(!db("sqlite://data/cakes.db").is_in_memory_sqlite());
        assert!(!db("postgres://localhost/cakes").is_in_memory_sqlite());
    }

    #[test]
    fn rejects_invalid_metrics_namespace() {
        let mut cfg = AppConfig { database: db("sqlite::memory:"), ..Default::default() };
        cfg.metrics.namespace = "cake-manager".into();
        assert!(cfg.normalize_and_validate().is_err());
        cfg.metrics.namespace = "9cakes".into();
        assert!(cfg.normalize_and_validate().is_err());
    }
}

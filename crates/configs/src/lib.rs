use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub mail: MailConfig,
    #[serde(default)]
    pub renewal: RenewalConfig,
    #[serde(default)]
    pub geo: GeoConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080, worker_threads: Some(4) }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
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

fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 2 }
fn default_connect_timeout() -> u64 { 30 }
fn default_idle_timeout() -> u64 { 600 }
fn default_max_lifetime() -> u64 { 3600 }
fn default_acquire_timeout() -> u64 { 30 }

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,
}

fn default_token_ttl_hours() -> i64 { 12 }

impl Default for AuthConfig {
    fn default() -> Self {
        Self { jwt_secret: String::new(), token_ttl_hours: default_token_ttl_hours() }
    }
}

/// Where uploaded task and project documents are kept on disk.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_upload_dir() -> String { "uploads".into() }
fn default_max_upload_bytes() -> usize { 20 * 1024 * 1024 }

impl Default for StorageConfig {
    fn default() -> Self {
        Self { upload_dir: default_upload_dir(), max_upload_bytes: default_max_upload_bytes() }
    }
}

/// SMTP settings. An empty host disables outgoing mail.
#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    #[serde(default)]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_from_address")]
    pub from_address: String,
    #[serde(default)]
    pub use_tls: bool,
}

fn default_smtp_port() -> u16 { 587 }
fn default_from_address() -> String { "noreply@licensing.local".into() }

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            smtp_host: String::new(),
            smtp_port: default_smtp_port(),
            username: String::new(),
            password: String::new(),
            from_address: default_from_address(),
            use_tls: false,
        }
    }
}

impl MailConfig {
    pub fn is_enabled(&self) -> bool { !self.smtp_host.trim().is_empty() }
}

/// Daily license renewal planner.
#[derive(Debug, Clone, Deserialize)]
pub struct RenewalConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_run_hour")]
    pub run_hour: u32,
    #[serde(default = "default_lookahead_months")]
    pub lookahead_months: u32,
}

fn default_true() -> bool { true }
fn default_run_hour() -> u32 { 9 }
fn default_lookahead_months() -> u32 { 3 }

impl Default for RenewalConfig {
    fn default() -> Self {
        Self { enabled: true, run_hour: default_run_hour(), lookahead_months: default_lookahead_months() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeoConfig {
    #[serde(default = "default_nominatim_url")]
    pub nominatim_url: String,
    #[serde(default = "default_overpass_url")]
    pub overpass_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_geo_timeout")]
    pub timeout_secs: u64,
}

fn default_nominatim_url() -> String { "https://nominatim.openstreetmap.org".into() }
fn default_overpass_url() -> String { "https://overpass-api.de/api/interpreter".into() }
fn default_user_agent() -> String { "licensing-portal/0.1".into() }
fn default_geo_timeout() -> u64 { 15 }

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            nominatim_url: default_nominatim_url(),
            overpass_url: default_overpass_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_geo_timeout(),
        }
    }
}

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Config file if present, otherwise defaults filled from the environment.
    pub fn load_or_env() -> Result<Self> {
        let mut cfg = load_default().unwrap_or_default();
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.database.normalize_from_env();
        self.database.validate()?;
        self.auth.normalize_from_env();
        self.renewal.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = std::env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }
}

impl DatabaseConfig {
    pub fn normalize_from_env(&mut self) {
        if self.url.trim().is_empty() {
            if let Ok(url) = std::env::var("DATABASE_URL") {
                self.url = url;
            }
        }
        if self.min_connections == 0 && self.max_connections == 0 {
            self.min_connections = default_min_connections();
            self.max_connections = default_max_connections();
        }
        if self.connect_timeout_secs == 0 { self.connect_timeout_secs = default_connect_timeout(); }
        if self.acquire_timeout_secs == 0 { self.acquire_timeout_secs = default_acquire_timeout(); }
        if self.idle_timeout_secs == 0 { self.idle_timeout_secs = default_idle_timeout(); }
        if self.max_lifetime_secs == 0 { self.max_lifetime_secs = default_max_lifetime(); }
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(anyhow!("database.url is empty; set it in config.toml or DATABASE_URL"));
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("postgresql://") || lower.starts_with("postgres://")) {
            return Err(anyhow!("database.url must start with postgresql:// or postgres://"));
        }
        if self.min_connections == 0 {
            return Err(anyhow!("database.min_connections must be >= 1"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("database.max_connections must be >= min_connections"));
        }
        Ok(())
    }
}

impl AuthConfig {
    pub fn normalize_from_env(&mut self) {
        if self.jwt_secret.trim().is_empty() {
            self.jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".to_string());
        }
        if self.token_ttl_hours <= 0 {
            self.token_ttl_hours = default_token_ttl_hours();
        }
    }
}

impl RenewalConfig {
    fn validate(&self) -> Result<()> {
        if self.run_hour > 23 {
            return Err(anyhow!("renewal.run_hour must be within 0..=23"));
        }
        if self.lookahead_months == 0 {
            return Err(anyhow!("renewal.lookahead_months must be >= 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_toml_with_defaults() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [server]
            host = "0.0.0.0"
            port = 9000

            [database]
            url = "postgres://u:p@localhost/licensing"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.database.max_connections, 10);
        assert_eq!(cfg.storage.upload_dir, "uploads");
        assert_eq!(cfg.renewal.run_hour, 9);
        assert_eq!(cfg.renewal.lookahead_months, 3);
        assert!(!cfg.mail.is_enabled());
    }

    #[test]
    fn rejects_non_postgres_url() {
        let db = DatabaseConfig { url: "mysql://x".into(), min_connections: 1, max_connections: 2, ..Default::default() };
        assert!(db.validate().is_err());
    }

    #[test]
    fn rejects_pool_bounds_inverted() {
        let db = DatabaseConfig { url: "postgres://x".into(), min_connections: 5, max_connections: 2, ..Default::default() };
        assert!(db.validate().is_err());
    }

    #[test]
    fn renewal_hour_out_of_range_is_rejected() {
        let r = RenewalConfig { enabled: true, run_hour: 24, lookahead_months: 3 };
        assert!(r.validate().is_err());
    }

    #[test]
    fn zero_worker_threads_normalized() {
        let mut s = ServerConfig { host: "h".into(), port: 1, worker_threads: Some(0) };
        s.normalize().unwrap();
        assert_eq!(s.worker_threads, Some(4));
    }
}

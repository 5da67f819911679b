use crate::error::ConfigError;

#[derive(serde::Deserialize, Clone, Debug)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub application: ApplicationSettings,
    pub jwt: JwtSettings,
    pub billing: BillingSettings,
    #[serde(default)]
    pub maintenance: MaintenanceSettings,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
    /// `dev` unlocks the admin reset endpoint
    pub platform: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationSettings {
    pub fn is_dev(&self) -> bool {
        self.platform == "dev"
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub port: u16,
    pub host: String,
    pub database_name: String,
    /// Keep everything in process memory instead of Postgres
    #[serde(default)]
    pub in_memory: bool,
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name
        )
    }
}

/// Access/refresh token settings.
///
/// `secret` is the one key that signs every access token. It is read once
/// at startup and never changes afterwards.
#[derive(serde::Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub issuer: String,
    pub access_token_expiry_secs: i64,
    pub refresh_token_expiry_days: i64,
}

impl JwtSettings {
    pub fn access_token_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.access_token_expiry_secs)
    }

    pub fn refresh_token_ttl(&self) -> chrono::Duration {
        chrono::Duration::days(self.refresh_token_expiry_days)
    }
}

impl std::fmt::Debug for JwtSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSettings")
            .field("secret", &"[redacted]")
            .field("issuer", &self.issuer)
            .field("access_token_expiry_secs", &self.access_token_expiry_secs)
            .field("refresh_token_expiry_days", &self.refresh_token_expiry_days)
            .finish()
    }
}

#[derive(serde::Deserialize, Clone)]
pub struct BillingSettings {
    pub webhook_key: String,
}

impl std::fmt::Debug for BillingSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BillingSettings")
            .field("webhook_key", &"[redacted]")
            .finish()
    }
}

#[derive(serde::Deserialize, Clone, Debug, Default)]
pub struct MaintenanceSettings {
    /// Sweep expired refresh tokens on this interval. Unset means never.
    pub refresh_token_cleanup_interval_secs: Option<u64>,
}

/// Load settings from `configuration.yaml` (optional) and `APP_*` env vars.
///
/// Nested keys use `__`, e.g. `APP_JWT__SECRET`.
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .set_default("application.host", "127.0.0.1")?
        .set_default("application.port", 8080)?
        .set_default("application.platform", "prod")?
        .set_default("jwt.issuer", "postboard")?
        .set_default("jwt.access_token_expiry_secs", 3600)?
        .set_default("jwt.refresh_token_expiry_days", 60)?
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    let settings = settings.try_deserialize::<Settings>()?;
    validate(&settings)?;
    Ok(settings)
}

fn validate(settings: &Settings) -> Result<(), ConfigError> {
    if settings.jwt.secret.trim().is_empty() {
        return Err(ConfigError::MissingRequired("jwt.secret".to_string()));
    }
    if settings.billing.webhook_key.trim().is_empty() {
        return Err(ConfigError::MissingRequired("billing.webhook_key".to_string()));
    }
    if settings.jwt.access_token_expiry_secs <= 0 {
        return Err(ConfigError::Load(
            "jwt.access_token_expiry_secs must be positive".to_string(),
        ));
    }
    if settings.jwt.refresh_token_expiry_days <= 0 {
        return Err(ConfigError::Load(
            "jwt.refresh_token_expiry_days must be positive".to_string(),
        ));
    }
    Ok(())
}

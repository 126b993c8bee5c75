use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub cookie_secure: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub session: SessionConfig,
    /// Prefix for links printed to the console (password reset).
    pub public_base_url: String,
    pub reset_token_ttl_minutes: i64,
    pub tariff_inr_per_kwh: f64,
    pub static_dir: String,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://smart_tiles.db?mode=rwc".into());
        let session = SessionConfig {
            secret: std::env::var("SECRET_KEY")?,
            issuer: std::env::var("SESSION_ISSUER").unwrap_or_else(|_| "smart-tile".into()),
            audience: std::env::var("SESSION_AUDIENCE")
                .unwrap_or_else(|_| "smart-tile-users".into()),
            ttl_minutes: env_or("SESSION_TTL_MINUTES", 60 * 24),
            cookie_secure: env_or("SESSION_COOKIE_SECURE", false),
        };
        Ok(Self {
            database_url,
            session,
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".into())
                .trim_end_matches('/')
                .to_string(),
            reset_token_ttl_minutes: env_or("RESET_TOKEN_TTL_MINUTES", 60),
            tariff_inr_per_kwh: env_or("ENERGY_TARIFF_INR_PER_KWH", 8.0),
            static_dir: std::env::var("STATIC_DIR").unwrap_or_else(|_| "static".into()),
        })
    }
}

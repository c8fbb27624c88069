//! Server configuration
//!
//! All settings can be overridden through environment variables:
//!
//! | Variable | Default | Purpose |
//! |----------|---------|---------|
//! | WORK_DIR | /var/lib/nostra | Work directory (database, logs) |
//! | HTTP_PORT | 3000 | HTTP API port |
//! | REQUEST_TIMEOUT_MS | 30000 | Inbound request deadline |
//! | ENVIRONMENT | development | development \| staging \| production |
//! | DELIVERY_FEE_CENTS | 500 | Flat delivery fee in centavos |
//! | ESTIMATED_TIME_MIN | 45 | Default delivery estimate (minutes) |
//! | MP_MODE | sandbox | Mercado Pago mode (prod \| sandbox) |
//! | MP_ACCESS_TOKEN / MP_ACCESS_TOKEN_PROD | (unset) | Gateway credentials; unset runs the gateway in degraded offline mode |
//! | MP_BASE_URL | https://api.mercadopago.com | Gateway base URL |
//! | GATEWAY_TIMEOUT_MS | 5000 | Outbound call timeout |
//! | WEBHOOK_SECRET | (unset) | Webhook signature secret (validation is advisory) |
//! | MAIL_API_URL / MAIL_API_KEY | (unset) | Transactional mail API; unset disables mail |
//! | MAIL_FROM | pedidos@massanostra.com.br | Sender address |
//! | ADMIN_EMAIL | (unset) | Back-office alert recipient |

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    /// Work directory for database and log files
    pub work_dir: String,
    /// HTTP API port
    pub http_port: u16,
    /// Inbound request deadline in milliseconds
    pub request_timeout_ms: u64,
    /// Runtime environment: development | staging | production
    pub environment: String,

    // === Checkout ===
    /// Flat delivery fee in minor units
    pub delivery_fee_cents: i64,
    /// Default delivery estimate in minutes
    pub estimated_time_min: i64,

    // === Payment gateway ===
    pub mp_mode: String,
    pub mp_access_token: Option<String>,
    pub mp_base_url: String,
    pub gateway_timeout_ms: u64,
    pub webhook_secret: Option<String>,

    // === Mail ===
    pub mail_api_url: Option<String>,
    pub mail_api_key: Option<String>,
    pub mail_from: String,
    pub admin_email: Option<String>,
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Self {
        let mp_mode = std::env::var("MP_MODE").unwrap_or_else(|_| "sandbox".into());
        // Production mode reads the dedicated token variable
        let mp_access_token = if mp_mode == "prod" {
            std::env::var("MP_ACCESS_TOKEN_PROD").ok()
        } else {
            std::env::var("MP_ACCESS_TOKEN").ok()
        };

        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/nostra".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            request_timeout_ms: std::env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),

            delivery_fee_cents: std::env::var("DELIVERY_FEE_CENTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(500),
            estimated_time_min: std::env::var("ESTIMATED_TIME_MIN")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(45),

            mp_mode,
            mp_access_token,
            mp_base_url: std::env::var("MP_BASE_URL")
                .unwrap_or_else(|_| "https://api.mercadopago.com".into()),
            gateway_timeout_ms: std::env::var("GATEWAY_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5000),
            webhook_secret: std::env::var("WEBHOOK_SECRET").ok(),

            mail_api_url: std::env::var("MAIL_API_URL").ok(),
            mail_api_key: std::env::var("MAIL_API_KEY").ok(),
            mail_from: std::env::var("MAIL_FROM")
                .unwrap_or_else(|_| "pedidos@massanostra.com.br".into()),
            admin_email: std::env::var("ADMIN_EMAIL").ok(),
        }
    }

    /// Override work dir and port, keeping the rest from the environment.
    /// Used by tests and local tooling.
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// `work_dir/database` directory
    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    /// Path of the SQLite database file
    pub fn database_path(&self) -> PathBuf {
        self.database_dir().join("nostra.db")
    }

    /// `work_dir/logs` directory
    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    /// Create the work directory layout if missing
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())?;
        std::fs::create_dir_all(self.log_dir())?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

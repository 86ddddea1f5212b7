use std::net::IpAddr;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub max_body_size: usize,
    pub secure_cookies: bool,
    pub session_hours: i64,
    pub tickets_path: PathBuf,
    pub bootstrap_admin: Option<BootstrapAdmin>,
    pub properfy: ProperfyConfig,
}

/// Super-admin account created at startup when no user owns the e-mail yet.
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct ProperfyConfig {
    pub base_url: String,
    pub token: String,
    pub timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_or("DATABASE_URL", "sqlite://portal.db?mode=rwc");
        let jwt_secret = env_required("JWT_SECRET")?;

        let host: IpAddr = env_or("PORTAL_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid PORTAL_HOST: {e}"))?;

        // Hosting platforms hand out the port through PORT.
        let port_raw = std::env::var("PORTAL_PORT")
            .or_else(|_| std::env::var("PORT"))
            .unwrap_or_else(|_| "5000".to_string());
        let port: u16 = port_raw
            .parse()
            .map_err(|e| format!("Invalid PORTAL_PORT: {e}"))?;

        let log_level = env_or("PORTAL_LOG_LEVEL", "info");

        let max_body_size: usize = env_or("PORTAL_MAX_BODY_SIZE", "16777216")
            .parse()
            .map_err(|e| format!("Invalid PORTAL_MAX_BODY_SIZE: {e}"))?;

        let secure_cookies = parse_bool("PORTAL_SECURE_COOKIES", &env_or("PORTAL_SECURE_COOKIES", "true"))?;

        let session_hours: i64 = env_or("PORTAL_SESSION_HOURS", "12")
            .parse()
            .map_err(|e| format!("Invalid PORTAL_SESSION_HOURS: {e}"))?;
        if session_hours <= 0 {
            return Err("PORTAL_SESSION_HOURS must be positive".to_string());
        }

        let tickets_path = PathBuf::from(env_or("PORTAL_TICKETS_PATH", "data/tickets.json"));

        let bootstrap_admin = match (
            std::env::var("PORTAL_ADMIN_EMAIL").ok(),
            std::env::var("PORTAL_ADMIN_PASSWORD").ok(),
        ) {
            (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
                Some(BootstrapAdmin { email, password })
            }
            _ => None,
        };

        let properfy = ProperfyConfig {
            base_url: env_or("PROPERFY_API_URL", "https://sandbox.properfy.com.br/api"),
            token: env_required("PROPERFY_API_TOKEN")?,
            timeout_secs: env_or("PROPERFY_TIMEOUT_SECS", "30")
                .parse()
                .map_err(|e| format!("Invalid PROPERFY_TIMEOUT_SECS: {e}"))?,
        };

        Ok(Config {
            database_url,
            jwt_secret,
            host,
            port,
            log_level,
            max_body_size,
            secure_cookies,
            session_hours,
            tickets_path,
            bootstrap_admin,
            properfy,
        })
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(format!("Invalid {key}: expected a boolean, got '{other}'")),
    }
}

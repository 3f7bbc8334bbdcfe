use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub remember_ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub users_file: String,
    pub ledger_file: String,
    pub initial_credit: f64,
    pub alert_threshold: f64,
    pub jwt: JwtConfig,
    pub smtp: Option<SmtpConfig>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let users_file = std::env::var("USERS_FILE").unwrap_or_else(|_| "users.csv".into());
        let ledger_file =
            std::env::var("LEDGER_FILE").unwrap_or_else(|_| "transactions.csv".into());
        let initial_credit = std::env::var("INITIAL_CREDIT")
            .ok()
            .and_then(|v| v.parse::<f64>().ok())
            .unwrap_or(1000.0);
        let alert_threshold = std::env::var("ALERT_THRESHOLD")
            .ok()
            .and_then(|v| v.parse::<f64>().ok())
            .unwrap_or(20.0);
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "dinetrack".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "dinetrack-students".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
            remember_ttl_minutes: std::env::var("JWT_REMEMBER_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24 * 14),
        };
        Ok(Self {
            users_file,
            ledger_file,
            initial_credit,
            alert_threshold,
            jwt,
            smtp: SmtpConfig::from_env(),
        })
    }
}

impl SmtpConfig {
    // Host, username, password and sender must all be present; otherwise the
    // relay counts as unconfigured and alerts are dropped with a log.
    fn from_env() -> Option<Self> {
        let host = std::env::var("SMTP_HOST").ok()?;
        let username = std::env::var("SMTP_USERNAME").ok()?;
        let password = std::env::var("SMTP_PASSWORD").ok()?;
        let from = std::env::var("SMTP_FROM").ok()?;
        let port = std::env::var("SMTP_PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(587);
        Some(Self {
            host,
            port,
            username,
            password,
            from,
        })
    }
}

use std::sync::Arc;

use tracing::warn;

use crate::config::AppConfig;
use crate::notify::{smtp::SmtpMailer, Mailer, NoopMailer};
use crate::session::SessionRegistry;
use crate::store::ledger::Ledger;
use crate::store::users::UserStore;

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<UserStore>,
    pub ledger: Arc<Ledger>,
    pub sessions: Arc<SessionRegistry>,
    pub mailer: Arc<dyn Mailer>,
    pub config: Arc<AppConfig>,
    // Keeps fake()'s store directory alive; removed with the last clone.
    #[cfg(test)]
    _users_dir: Option<Arc<tempfile::TempDir>>,
}

impl AppState {
    pub fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let users = Arc::new(UserStore::open(&config.users_file)?);
        let ledger = Arc::new(Ledger::load(&config.ledger_file)?);

        let mailer: Arc<dyn Mailer> = match &config.smtp {
            Some(smtp) => Arc::new(SmtpMailer::from_config(smtp)?),
            None => {
                warn!("SMTP_* not configured; low-balance alerts will be dropped");
                Arc::new(NoopMailer)
            }
        };

        Ok(Self {
            users,
            ledger,
            sessions: Arc::new(SessionRegistry::new()),
            mailer,
            config,
            #[cfg(test)]
            _users_dir: None,
        })
    }

    pub fn from_parts(
        users: Arc<UserStore>,
        ledger: Arc<Ledger>,
        mailer: Arc<dyn Mailer>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            users,
            ledger,
            sessions: Arc::new(SessionRegistry::new()),
            mailer,
            config,
            #[cfg(test)]
            _users_dir: None,
        }
    }

    /// State over a throwaway user store and an empty ledger, for unit tests.
    /// The store lives in a temp directory that is removed with the state.
    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::config::JwtConfig;

        let dir = tempfile::tempdir().expect("temp store dir");
        let path = dir.path().join("users.csv");
        let users = Arc::new(UserStore::open(&path).expect("temp user store"));

        let config = Arc::new(AppConfig {
            users_file: path.display().to_string(),
            ledger_file: "unused".into(),
            initial_credit: 1000.0,
            alert_threshold: 20.0,
            jwt: JwtConfig {
                secret: "test".into(),
                issuer: "test".into(),
                audience: "test".into(),
                ttl_minutes: 5,
                remember_ttl_minutes: 60,
            },
            smtp: None,
        });

        Self {
            users,
            ledger: Arc::new(Ledger::from_rows(Vec::new())),
            sessions: Arc::new(SessionRegistry::new()),
            mailer: Arc::new(NoopMailer),
            config,
            _users_dir: Some(Arc::new(dir)),
        }
    }
}

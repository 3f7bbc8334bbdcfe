use axum::async_trait;
use tracing::warn;

pub mod alert;
pub mod smtp;

/// Outbound mail capability injected into application state; the SMTP detail
/// stays swappable behind it.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()>;
}

/// Installed when SMTP is unconfigured; drops mail with a log line.
pub struct NoopMailer;

#[async_trait]
impl Mailer for NoopMailer {
    async fn send(&self, to: &str, subject: &str, _body: &str) -> anyhow::Result<()> {
        warn!(to, subject, "SMTP not configured; dropping outbound mail");
        Ok(())
    }
}

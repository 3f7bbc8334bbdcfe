use tracing::{error, info, instrument, warn};

use crate::session::SessionContext;
use crate::state::AppState;

/// Fires the low-balance mail at most once per session. The flag flips
/// before the send, so concurrent requests and failed deliveries both count
/// as the one attempt; delivery failure is logged, never surfaced or retried.
#[instrument(skip(state, ctx), fields(student_id = %ctx.student_id))]
pub async fn maybe_send_low_balance_alert(state: &AppState, ctx: &SessionContext, balance: f64) {
    let threshold = state.config.alert_threshold;
    if balance >= threshold {
        return;
    }
    if !state.sessions.try_mark_alert_sent(ctx.session_id) {
        return;
    }

    let Some(user) = state.users.find(&ctx.student_id) else {
        warn!("no user record for session; alert dropped");
        return;
    };

    let subject = "Low dining dollars balance".to_string();
    let body = format!(
        "Hi {},\n\n\
         Your dining dollars balance has dropped to {:.2}, below the {:.2} alert \
         threshold. You may want to top up your account or slow down your spending.\n\n\
         This is an automated message from your dining dashboard.\n",
        ctx.student_id, balance, threshold
    );

    match state.mailer.send(&user.email, &subject, &body).await {
        Ok(()) => info!(to = %user.email, balance, "low-balance alert sent"),
        Err(e) => error!(error = %e, to = %user.email, "low-balance alert delivery failed"),
    }
}

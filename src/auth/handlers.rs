use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse, PublicStudent, RegisterRequest},
        jwt::JwtKeys,
        password::{hash_password, verify_password},
    },
    session::SessionContext,
    state::AppState,
    store::StoreError,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(get_me))
}

/// local-part@domain.tld, no whitespace, alphanumeric TLD.
pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[a-zA-Z0-9]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<PublicStudent>), (StatusCode, String)> {
    payload.student_id = payload.student_id.trim().to_string();
    payload.email = payload.email.trim().to_lowercase();

    if payload.student_id.is_empty() || payload.email.is_empty() || payload.password.is_empty() {
        warn!("registration with missing fields");
        return Err((StatusCode::BAD_REQUEST, "All fields are required".into()));
    }

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err((StatusCode::BAD_REQUEST, "Invalid email".into()));
    }

    if payload.password.len() < 8 {
        warn!("password too short");
        return Err((StatusCode::BAD_REQUEST, "Password too short".into()));
    }

    if payload.password != payload.confirm_password {
        warn!("password confirmation mismatch");
        return Err((StatusCode::BAD_REQUEST, "Passwords do not match".into()));
    }

    let hash = match hash_password(&payload.password) {
        Ok(h) => h,
        Err(e) => {
            error!(error = %e, "hash_password failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
        }
    };

    let user = match state.users.create(&payload.student_id, &payload.email, &hash) {
        Ok(u) => u,
        Err(StoreError::DuplicateId) => {
            warn!(student_id = %payload.student_id, "student ID already registered");
            return Err((
                StatusCode::CONFLICT,
                "Student ID already registered".into(),
            ));
        }
        Err(e) => {
            error!(error = %e, "create user failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
        }
    };

    info!(student_id = %user.student_id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(PublicStudent {
            student_id: user.student_id,
            email: user.email,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, (StatusCode, String)> {
    payload.student_id = payload.student_id.trim().to_string();

    // Unknown id and wrong password look identical to the caller.
    let Some(user) = state.users.find(&payload.student_id) else {
        warn!(student_id = %payload.student_id, "login unknown student ID");
        return Err((StatusCode::UNAUTHORIZED, "Invalid credentials".into()));
    };

    let ok = match verify_password(&payload.password, &user.password_hash) {
        Ok(v) => v,
        Err(e) => {
            error!(error = %e, "verify_password failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
        }
    };
    if !ok {
        warn!(student_id = %payload.student_id, "login invalid password");
        return Err((StatusCode::UNAUTHORIZED, "Invalid credentials".into()));
    }

    let keys = JwtKeys::from_ref(&state);
    let ttl = keys.session_ttl(payload.remember_me);
    let session = state.sessions.create(
        &user.student_id,
        payload.remember_me,
        time::Duration::seconds(ttl.as_secs() as i64),
    );
    let token = match keys.sign(&user.student_id, session.id, payload.remember_me) {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "jwt sign failed");
            state.sessions.remove(session.id);
            return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
        }
    };

    info!(student_id = %user.student_id, session_id = %session.id, "user logged in");
    Ok(Json(LoginResponse {
        token,
        student: PublicStudent {
            student_id: user.student_id,
            email: user.email,
        },
    }))
}

#[instrument(skip(state))]
pub async fn logout(
    State(state): State<AppState>,
    ctx: SessionContext,
) -> Result<StatusCode, (StatusCode, String)> {
    state.sessions.remove(ctx.session_id);
    info!(student_id = %ctx.student_id, session_id = %ctx.session_id, "user logged out");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    ctx: SessionContext,
) -> Result<Json<PublicStudent>, (StatusCode, String)> {
    let Some(user) = state.users.find(&ctx.student_id) else {
        error!(student_id = %ctx.student_id, "session user not found in store");
        return Err((StatusCode::UNAUTHORIZED, "User not found".into()));
    };
    Ok(Json(PublicStudent {
        student_id: user.student_id,
        email: user.email,
    }))
}

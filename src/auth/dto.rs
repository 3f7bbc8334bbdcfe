use serde::{Deserialize, Serialize};

/// Request body for account registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub student_id: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub student_id: String,
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
}

/// Response returned after login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub student: PublicStudent,
}

/// Public part of a user record returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicStudent {
    pub student_id: String,
    pub email: String,
}

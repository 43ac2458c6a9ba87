//! Authentication endpoints: register, login, token refresh, and the
//! password lifecycle.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use vocabase_core::defaults::{MAX_NAME_LEN, MIN_PASSWORD_LEN};
use vocabase_core::{CreateUserRequest, Role, User, UserPublic, UserRepository};

use crate::auth::{self, RequireAuth};
use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    #[serde(rename = "currentPassword")]
    pub current_password: String,
    #[serde(rename = "newPassword")]
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// Login/register payload: the public profile plus a fresh token pair.
#[derive(Debug, Serialize)]
pub struct AuthPayload {
    pub user: UserPublic,
    pub access_token: String,
    pub refresh_token: String,
}

fn issue_token_pair(state: &AppState, user: &User) -> Result<(String, String), ApiError> {
    let access = auth::sign(user, &state.config.jwt_secret, state.config.jwt_expire_secs)?;
    let refresh = auth::sign(
        user,
        &state.config.jwt_refresh_secret,
        state.config.jwt_refresh_expire_secs,
    )?;
    Ok((access, refresh))
}

/// Password rule: minimum length plus at least one uppercase letter, one
/// lowercase letter, and one digit.
pub(crate) fn password_policy_error(password: &str) -> Option<String> {
    if password.len() < MIN_PASSWORD_LEN {
        return Some(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        ));
    }
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !(has_upper && has_lower && has_digit) {
        return Some(
            "Password must contain at least one uppercase letter, one lowercase letter, and one number"
                .to_string(),
        );
    }
    None
}

fn validate_registration(req: &RegisterRequest) -> Result<(), ApiError> {
    let mut fields: Vec<(&str, String)> = Vec::new();
    if !req.email.contains('@') || req.email.trim().is_empty() {
        fields.push(("email", "A valid email address is required".to_string()));
    }
    if let Some(message) = password_policy_error(&req.password) {
        fields.push(("password", message));
    }
    if req.first_name.trim().is_empty() || req.first_name.len() > MAX_NAME_LEN {
        fields.push(("firstName", "First name is required".to_string()));
    }
    if req.last_name.trim().is_empty() || req.last_name.len() > MAX_NAME_LEN {
        fields.push(("lastName", "Last name is required".to_string()));
    }
    if fields.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation_fields("Validation failed", fields))
    }
}

/// Register a new account and sign the caller in.
///
/// # Returns
/// - 201 Created with user profile and token pair
/// - 400 Bad Request with per-field details on validation failure
/// - 409 Conflict if the email is already registered
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthPayload>>), ApiError> {
    validate_registration(&req)?;

    let password_hash = auth::hash_password(&req.password)?;
    let user = state
        .db
        .users
        .insert(CreateUserRequest {
            email: req.email.trim().to_string(),
            password_hash,
            first_name: req.first_name.trim().to_string(),
            last_name: req.last_name.trim().to_string(),
            role: Role::User,
        })
        .await?;

    info!(
        subsystem = "auth",
        component = "register",
        user_id = %user.id,
        "Account registered"
    );

    let (access_token, refresh_token) = issue_token_pair(&state, &user)?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(AuthPayload {
            user: UserPublic::from(user),
            access_token,
            refresh_token,
        })),
    ))
}

/// Log in with email and password.
///
/// Unknown email and wrong password answer identically so accounts cannot
/// be enumerated. Deactivated accounts are rejected distinctly.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthPayload>>, ApiError> {
    let invalid = || ApiError::InvalidCredential("Invalid email or password".to_string());

    let user = state
        .db
        .users
        .find_by_email(req.email.trim())
        .await?
        .ok_or_else(invalid)?;

    if !auth::verify_password(&req.password, &user.password_hash)? {
        return Err(invalid());
    }
    if !user.is_active {
        return Err(ApiError::AccountDeactivated);
    }

    info!(
        subsystem = "auth",
        component = "login",
        user_id = %user.id,
        "Login succeeded"
    );

    let (access_token, refresh_token) = issue_token_pair(&state, &user)?;
    Ok(Json(ApiResponse::ok(AuthPayload {
        user: UserPublic::from(user),
        access_token,
        refresh_token,
    })))
}

/// Exchange a refresh token, sent as the bearer credential, for a fresh
/// token pair.
///
/// Rotation issues a new pair; the old refresh token stays valid until it
/// expires (no server-side revocation).
pub async fn refresh_token(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<AuthPayload>>, ApiError> {
    let token = auth::bearer_token(&headers)?;
    let claims = auth::verify(token, &state.config.jwt_refresh_secret)?;

    let user = state
        .db
        .users
        .find_by_id(claims.sub)
        .await?
        .ok_or_else(|| ApiError::InvalidCredential("Unknown account".to_string()))?;
    if !user.is_active {
        return Err(ApiError::AccountDeactivated);
    }

    let (access_token, refresh_token) = issue_token_pair(&state, &user)?;
    Ok(Json(ApiResponse::ok(AuthPayload {
        user: UserPublic::from(user),
        access_token,
        refresh_token,
    })))
}

/// Change the caller's password after verifying the current one.
pub async fn change_password(
    auth: RequireAuth,
    State(state): State<AppState>,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    if !auth::verify_password(&req.current_password, &auth.user.password_hash)? {
        return Err(ApiError::InvalidCredential(
            "Current password is incorrect".to_string(),
        ));
    }
    if let Some(message) = password_policy_error(&req.new_password) {
        return Err(ApiError::validation_fields(
            "Validation failed",
            vec![("newPassword", message)],
        ));
    }

    let password_hash = auth::hash_password(&req.new_password)?;
    state
        .db
        .users
        .set_password_hash(auth.user.id, &password_hash)
        .await?;

    info!(
        subsystem = "auth",
        component = "change_password",
        user_id = %auth.user.id,
        "Password changed"
    );
    Ok(Json(ApiResponse::message_only("Password updated")))
}

/// Server-side logout hook. Tokens are stateless, so this only logs.
pub async fn logout(auth: RequireAuth) -> Json<ApiResponse<()>> {
    info!(
        subsystem = "auth",
        component = "logout",
        user_id = %auth.user.id,
        "Logout"
    );
    Json(ApiResponse::message_only("Logged out"))
}

/// Answer uniformly whether or not the email exists.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    // The lookup result only affects logging, never the response.
    if let Some(user) = state.db.users.find_by_email(req.email.trim()).await? {
        info!(
            subsystem = "auth",
            component = "forgot_password",
            user_id = %user.id,
            "Password reset requested"
        );
    }
    Ok(Json(ApiResponse::message_only(
        "If the account exists, reset instructions have been sent",
    )))
}

/// Password reset by token is not available on this deployment.
pub async fn reset_password() -> ApiError {
    ApiError::validation("Password reset is not implemented")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;
    use vocabase_core::Role;

    #[test]
    fn test_password_policy_requires_character_mix() {
        assert!(password_policy_error("Sh0rt").is_some());
        assert!(password_policy_error("alllowercase1").is_some());
        assert!(password_policy_error("ALLUPPERCASE1").is_some());
        assert!(password_policy_error("NoDigitsHere").is_some());
        assert!(password_policy_error("Passw0rdOk").is_none());
    }

    #[test]
    fn test_auth_payload_wire_field_names() {
        let payload = AuthPayload {
            user: UserPublic::from(User {
                id: Uuid::new_v4(),
                email: "a@b.c".to_string(),
                password_hash: String::new(),
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                role: Role::User,
                is_active: true,
                created_at: Utc::now(),
            }),
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("access_token").is_some());
        assert!(json.get("refresh_token").is_some());
        assert!(json.get("token").is_none());
    }
}

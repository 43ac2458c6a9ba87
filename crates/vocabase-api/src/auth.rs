//! Authentication: JWT issuance/verification, password hashing, and the
//! request extractors that gate protected routes.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
    RequestPartsExt,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use vocabase_core::policy::AuthContext;
use vocabase_core::{Error, Result, Role, User, UserRepository};

use crate::error::ApiError;
use crate::state::AppState;

/// JWT claims shared by access and refresh tokens. The two classes are told
/// apart by signing secret, not by payload.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: Uuid,
    pub email: String,
    pub role: Role,
    /// Expiration as a Unix timestamp.
    pub exp: usize,
}

/// Sign a token for a user with the given secret and lifetime.
pub fn sign(user: &User, secret: &str, ttl_secs: i64) -> Result<String> {
    let expiration = chrono::Utc::now()
        .checked_add_signed(chrono::Duration::seconds(ttl_secs))
        .ok_or_else(|| Error::Internal("token expiry overflow".to_string()))?
        .timestamp();

    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        role: user.role,
        exp: expiration as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| Error::Internal(format!("token signing failed: {e}")))
}

/// Verify and decode a token. Expiry is enforced by the default validation.
pub fn verify(token: &str, secret: &str) -> Result<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| Error::InvalidCredential("Invalid or expired token".to_string()))
}

/// Hash a password with argon2id and a fresh random salt.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::Internal(format!("password hashing failed: {e}")))
}

/// Constant-time password verification against a stored PHC string.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| Error::Internal(format!("stored password hash is malformed: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Pull the token out of `Authorization: Bearer <token>`. Shared by the
/// extractors and the refresh endpoint, which carries the refresh token in
/// the same header.
pub(crate) fn bearer_token(headers: &HeaderMap) -> std::result::Result<&str, ApiError> {
    headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| ApiError::InvalidCredential("Missing bearer token".to_string()))
}

/// Authenticated caller extracted from `Authorization: Bearer <token>`.
///
/// Verifies the access token, loads the account, and rejects deactivated
/// accounts. Add as a handler parameter to require authentication.
pub struct RequireAuth {
    pub user: User,
    pub ctx: AuthContext,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;
        let claims = verify(token, &state.config.jwt_secret)?;

        // The account is re-read on every request; a deleted user's token is
        // useless immediately.
        let user = state
            .db
            .users
            .find_by_id(claims.sub)
            .await?
            .ok_or_else(|| ApiError::InvalidCredential("Unknown account".to_string()))?;

        if !user.is_active {
            return Err(ApiError::AccountDeactivated);
        }

        let ctx = AuthContext {
            user_id: user.id,
            role: user.role,
        };
        Ok(RequireAuth { user, ctx })
    }
}

/// Authenticated admin caller. Wraps [`RequireAuth`] with a role gate.
pub struct RequireAdmin {
    pub user: User,
    pub ctx: AuthContext,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, Self::Rejection> {
        let auth = parts
            .extract_with_state::<RequireAuth, _>(state)
            .await?;
        auth.ctx.require_admin().map_err(ApiError::from)?;
        Ok(RequireAdmin {
            user: auth.user,
            ctx: auth.ctx,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "a@b.c".to_string(),
            password_hash: String::new(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            role: Role::User,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_sign_verify_round_trip() {
        let user = sample_user();
        let token = sign(&user, "secret", 60).unwrap();
        let claims = verify(&token, "secret").unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, user.email);
        assert_eq!(claims.role, Role::User);
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let token = sign(&sample_user(), "access-secret", 60).unwrap();
        assert!(verify(&token, "refresh-secret").is_err());
    }

    #[test]
    fn test_verify_rejects_expired_token() {
        let token = sign(&sample_user(), "secret", -60).unwrap();
        assert!(verify(&token, "secret").is_err());
    }

    #[test]
    fn test_password_hash_round_trip() {
        let hash = hash_password("hunter2hunter2").unwrap();
        assert!(verify_password("hunter2hunter2", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }
}

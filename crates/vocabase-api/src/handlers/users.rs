//! User profile and admin account management endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use vocabase_core::defaults::{MAX_NAME_LEN, MAX_PAGE_LIMIT, PAGE_LIMIT_SMALL};
use vocabase_core::{
    authorize, ListUsersRequest, PageRequest, Role, UpdateUserRequest, UserPublic, UserRepository,
    UserStats,
};

use crate::auth::{self, RequireAdmin, RequireAuth};
use crate::handlers::auth::password_policy_error;
use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateProfileBody {
    #[serde(rename = "firstName")]
    pub first_name: Option<String>,
    #[serde(rename = "lastName")]
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
}

#[derive(Debug, Deserialize)]
pub struct AdminChangePasswordBody {
    #[serde(rename = "newPassword")]
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub role: Option<Role>,
    #[serde(rename = "isActive")]
    pub is_active: Option<bool>,
}

fn validate_names(
    first_name: &Option<String>,
    last_name: &Option<String>,
) -> Result<(), ApiError> {
    let mut fields: Vec<(&str, String)> = Vec::new();
    if let Some(name) = first_name {
        if name.trim().is_empty() || name.len() > MAX_NAME_LEN {
            fields.push(("firstName", "First name must be 1-50 characters".to_string()));
        }
    }
    if let Some(name) = last_name {
        if name.trim().is_empty() || name.len() > MAX_NAME_LEN {
            fields.push(("lastName", "Last name must be 1-50 characters".to_string()));
        }
    }
    if fields.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation_fields("Validation failed", fields))
    }
}

/// Get the caller's own profile.
pub async fn get_profile(auth: RequireAuth) -> Json<ApiResponse<UserPublic>> {
    Json(ApiResponse::ok(UserPublic::from(auth.user)))
}

/// Update the caller's own profile.
///
/// Email and role changes are admin-only; for regular callers those fields
/// are silently dropped rather than rejected.
pub async fn update_profile(
    auth: RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<UpdateProfileBody>,
) -> Result<Json<ApiResponse<UserPublic>>, ApiError> {
    validate_names(&body.first_name, &body.last_name)?;

    let is_admin = auth.ctx.is_admin();
    let req = UpdateUserRequest {
        first_name: body.first_name,
        last_name: body.last_name,
        email: body.email.filter(|_| is_admin),
        role: body.role.filter(|_| is_admin),
    };

    let user = state.db.users.update(auth.user.id, req).await?;
    Ok(Json(ApiResponse::ok(UserPublic::from(user))))
}

/// Cross-resource roll-up for the caller's account.
pub async fn my_stats(
    auth: RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<UserStats>>, ApiError> {
    let stats = state.db.users.stats(auth.user.id).await?;
    Ok(Json(ApiResponse::ok(stats)))
}

/// Deactivate the caller's own account. Data is kept; the account simply
/// stops authenticating.
pub async fn deactivate_profile(
    auth: RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.db.users.set_active(auth.user.id, false).await?;
    info!(
        subsystem = "api",
        component = "users",
        op = "deactivate_self",
        user_id = %auth.user.id,
        "Account deactivated by owner"
    );
    Ok(Json(ApiResponse::message_only(
        "Account deactivated successfully",
    )))
}

/// Admin: list accounts with optional search and filters.
pub async fn list_users(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<ApiResponse<Vec<UserPublic>>>, ApiError> {
    let page = PageRequest::new(query.page, query.limit, PAGE_LIMIT_SMALL, MAX_PAGE_LIMIT);
    let result = state
        .db
        .users
        .list(
            ListUsersRequest {
                search: query.search,
                role: query.role,
                is_active: query.is_active,
            },
            page,
        )
        .await?;
    Ok(Json(ApiResponse::paginated(result)))
}

/// Admin: get any account by id.
pub async fn get_user(
    admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<UserPublic>>, ApiError> {
    authorize(&admin.ctx, id)?;
    let user = state
        .db
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User {} not found", id)))?;
    Ok(Json(ApiResponse::ok(UserPublic::from(user))))
}

/// Admin: update any account, including email and role.
pub async fn update_user(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateProfileBody>,
) -> Result<Json<ApiResponse<UserPublic>>, ApiError> {
    validate_names(&body.first_name, &body.last_name)?;

    let user = state
        .db
        .users
        .update(
            id,
            UpdateUserRequest {
                first_name: body.first_name,
                last_name: body.last_name,
                email: body.email,
                role: body.role,
            },
        )
        .await?;
    Ok(Json(ApiResponse::ok(UserPublic::from(user))))
}

/// Admin: hard-delete an account and everything it owns.
pub async fn delete_user(
    admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    if admin.user.id == id {
        return Err(ApiError::validation("Admins cannot delete their own account"));
    }
    state.db.users.delete_cascade(id).await?;
    info!(
        subsystem = "api",
        component = "users",
        op = "delete",
        user_id = %id,
        "Account deleted by admin"
    );
    Ok(Json(ApiResponse::message_only("User deleted")))
}

/// Admin: set a new password on any account. The usual password rule
/// applies; the current password is not required.
pub async fn change_user_password(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<AdminChangePasswordBody>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    if let Some(message) = password_policy_error(&body.new_password) {
        return Err(ApiError::validation_fields(
            "Validation failed",
            vec![("newPassword", message)],
        ));
    }

    let password_hash = auth::hash_password(&body.new_password)?;
    state.db.users.set_password_hash(id, &password_hash).await?;
    info!(
        subsystem = "api",
        component = "users",
        op = "change_password",
        user_id = %id,
        "Password changed by admin"
    );
    Ok(Json(ApiResponse::message_only("User password changed")))
}

/// Admin: deactivate an account without deleting its data.
pub async fn deactivate_user(
    admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    if admin.user.id == id {
        return Err(ApiError::validation(
            "Admins cannot deactivate their own account",
        ));
    }
    state.db.users.set_active(id, false).await?;
    info!(
        subsystem = "api",
        component = "users",
        op = "deactivate",
        user_id = %id,
        "Account deactivated"
    );
    Ok(Json(ApiResponse::message_only("User deactivated")))
}

use crate::audit;
use crate::auth;
use crate::auth::AuthUser;
use crate::db::users::User;
use crate::error::ServiceError;
use crate::routes::with_conn;
use crate::routes::AppState;
use crate::AppError;
use axum::extract::State;
use axum::Json;
use fuelops_commons::requests::ChangePasswordRequest;
use fuelops_commons::requests::LoginRequest;
use fuelops_commons::ApiResponse;
use fuelops_commons::Role;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user: UserSummary,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub station_id: Option<Uuid>,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, AppError> {
    let jwt_secret = state.jwt_secret.clone();
    let expires_in = state.jwt_expires_in_secs;

    let response = with_conn(&state, move |conn| {
        let user = match User::by_email(conn, &request.email)? {
            Some(user) if user.is_active => user,
            Some(_) => {
                audit::record_auth_failure(conn, &request.email, "account disabled");
                return Err(ServiceError::Unauthenticated(
                    "invalid credentials".to_string(),
                ));
            }
            None => {
                audit::record_auth_failure(conn, &request.email, "unknown email");
                return Err(ServiceError::Unauthenticated(
                    "invalid credentials".to_string(),
                ));
            }
        };

        if !auth::verify_password(&request.password, &user.password_hash) {
            audit::record_auth_failure(conn, &request.email, "wrong password");
            return Err(ServiceError::Unauthenticated(
                "invalid credentials".to_string(),
            ));
        }

        let token = auth::issue_token(&user, &jwt_secret, expires_in)?;

        Ok(LoginResponse {
            token,
            user: UserSummary {
                id: user.id,
                email: user.email,
                name: user.name,
                role: user.role.into(),
                station_id: user.station_id,
            },
        })
    })
    .await?;

    Ok(Json(ApiResponse::ok(response)))
}

pub async fn change_password(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    if request.new_password.len() < 8 {
        return Err(AppError(ServiceError::Validation(
            "new password must be at least 8 characters".to_string(),
        )));
    }

    with_conn(&state, move |conn| {
        let user = User::by_id(conn, caller.id)?
            .ok_or_else(|| ServiceError::NotFound("user".to_string()))?;

        if !auth::verify_password(&request.current_password, &user.password_hash) {
            return Err(ServiceError::Unauthenticated(
                "current password is wrong".to_string(),
            ));
        }

        let hash = auth::hash_password(&request.new_password)?;
        User::update_password(conn, user.id, &hash)
            .map_err(|e| ServiceError::Internal(anyhow::anyhow!(e)))?;

        Ok(())
    })
    .await?;

    Ok(Json(ApiResponse::ok(())))
}

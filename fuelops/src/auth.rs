use crate::db::stations::Station;
use crate::db::users::User;
use crate::error::ServiceError;
use crate::routes::AppState;
use crate::AppError;
use anyhow::Context;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use argon2::Argon2;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use diesel::PgConnection;
use fuelops_commons::Role;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde::Deserialize;
use serde::Serialize;
use std::sync::Arc;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: Role,
    pub station_id: Option<Uuid>,
    pub iat: i64,
    pub exp: i64,
}

/// The authenticated caller, decoded from the bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: Role,
    pub station_id: Option<Uuid>,
}

/// The set of stations a caller may touch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StationScope {
    All,
    Stations(Vec<Uuid>),
}

impl StationScope {
    pub fn contains(&self, station_id: Uuid) -> bool {
        match self {
            StationScope::All => true,
            StationScope::Stations(ids) => ids.contains(&station_id),
        }
    }
}

pub fn hash_password(password: &str) -> Result<String, ServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ServiceError::Internal(anyhow::anyhow!("failed to hash password: {e}")))?;

    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

pub fn issue_token(
    user: &User,
    secret: &str,
    expires_in_secs: i64,
) -> Result<String, ServiceError> {
    let now = OffsetDateTime::now_utc().unix_timestamp();
    let claims = Claims {
        sub: user.id,
        role: user.role.into(),
        station_id: user.station_id,
        iat: now,
        exp: now + expires_in_secs,
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .context("failed to sign token")
    .map_err(ServiceError::Internal)
}

pub fn decode_token(token: &str, secret: &str) -> Result<Claims, ServiceError> {
    jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| ServiceError::Unauthenticated(format!("invalid bearer token: {e}")))
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError(ServiceError::Unauthenticated(
                    "missing Authorization header".to_string(),
                ))
            })?;

        let token = header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError(ServiceError::Unauthenticated(
                "expected a bearer token".to_string(),
            ))
        })?;

        let claims = decode_token(token, &state.jwt_secret)?;

        Ok(AuthUser {
            id: claims.sub,
            role: claims.role,
            station_id: claims.station_id,
        })
    }
}

/// `station_scope(user)` of the authorization fabric.
pub fn station_scope(conn: &mut PgConnection, user: &AuthUser) -> Result<StationScope, ServiceError> {
    match user.role {
        Role::SuperAdmin => Ok(StationScope::All),
        Role::Owner => {
            let stations = Station::owned_by(conn, user.id)?;
            Ok(StationScope::Stations(
                stations.into_iter().map(|s| s.id).collect(),
            ))
        }
        Role::Manager | Role::Employee => Ok(StationScope::Stations(
            user.station_id.into_iter().collect(),
        )),
    }
}

/// `assert_station(user, stationId)`: every write re-verifies the resolved
/// station of its target entity through this.
pub fn assert_station(
    conn: &mut PgConnection,
    user: &AuthUser,
    station_id: Uuid,
) -> Result<(), ServiceError> {
    match user.role {
        Role::SuperAdmin => Ok(()),
        Role::Owner => {
            let station = Station::by_id(conn, station_id)?
                .ok_or_else(|| ServiceError::NotFound("station".to_string()))?;
            if station.owner_id == user.id {
                Ok(())
            } else {
                Err(ServiceError::forbidden_station())
            }
        }
        Role::Manager | Role::Employee => {
            if user.station_id == Some(station_id) {
                Ok(())
            } else {
                Err(ServiceError::forbidden_station())
            }
        }
    }
}

/// Resolves the station a station-bound caller acts on, or validates the
/// explicitly requested one.
pub fn resolve_station(
    conn: &mut PgConnection,
    user: &AuthUser,
    requested: Option<Uuid>,
) -> Result<Uuid, ServiceError> {
    let station_id = match (requested, user.station_id) {
        (Some(id), _) => id,
        (None, Some(id)) => id,
        (None, None) => {
            return Err(ServiceError::Validation(
                "stationId is required for this caller".to_string(),
            ))
        }
    };

    assert_station(conn, user, station_id)?;
    Ok(station_id)
}

/// The owner whose plan governs quota decisions at a station.
pub fn station_owner(conn: &mut PgConnection, station_id: Uuid) -> Result<User, ServiceError> {
    let station = Station::by_id(conn, station_id)?
        .ok_or_else(|| ServiceError::NotFound("station".to_string()))?;

    User::by_id(conn, station.owner_id)?
        .ok_or_else(|| ServiceError::NotFound("station owner".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_round_trip() {
        let hash = hash_password("hunter2").unwrap();
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("hunter3", &hash));
    }

    #[test]
    fn scope_contains() {
        let id = Uuid::new_v4();
        assert!(StationScope::All.contains(id));
        assert!(StationScope::Stations(vec![id]).contains(id));
        assert!(!StationScope::Stations(vec![]).contains(id));
    }
}

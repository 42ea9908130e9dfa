use axum::http::StatusCode;

/// Typed failure of a domain operation.
///
/// Inner layers return these; the HTTP boundary maps them onto status codes
/// and the JSON failure envelope. The `code` exposed on the wire is
/// surface-stable: clients branch on it, so variants must not be renamed
/// casually.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    BackdatedExceeded(String),

    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{message}")]
    Conflict {
        code: &'static str,
        message: String,
    },

    #[error("{0}")]
    QuotaExceeded(String),

    #[error("no fuel price effective for {0}")]
    NoPrice(String),

    #[error("{0}")]
    TankInsufficient(String),

    #[error("{0}")]
    External(String),

    #[error(transparent)]
    Database(#[from] diesel::result::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ServiceError {
    pub fn conflict(code: &'static str, message: impl Into<String>) -> Self {
        ServiceError::Conflict {
            code,
            message: message.into(),
        }
    }

    pub fn forbidden_station() -> Self {
        ServiceError::Forbidden("station is outside the caller's scope".to_string())
    }

    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Validation(_) => "VALIDATION",
            ServiceError::BackdatedExceeded(_) => "BACKDATED_EXCEEDED",
            ServiceError::Unauthenticated(_) => "UNAUTHENTICATED",
            ServiceError::Forbidden(_) => "FORBIDDEN",
            ServiceError::NotFound(_) => "NOT_FOUND",
            ServiceError::Conflict { code, .. } => code,
            ServiceError::QuotaExceeded(_) => "QUOTA_EXCEEDED",
            ServiceError::NoPrice(_) => "NO_PRICE",
            ServiceError::TankInsufficient(_) => "TANK_INSUFFICIENT",
            ServiceError::External(_) => "EXTERNAL",
            ServiceError::Database(diesel::result::Error::NotFound) => "NOT_FOUND",
            ServiceError::Database(_) | ServiceError::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) | ServiceError::BackdatedExceeded(_) => {
                StatusCode::BAD_REQUEST
            }
            ServiceError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Conflict { .. }
            | ServiceError::NoPrice(_)
            | ServiceError::TankInsufficient(_) => StatusCode::CONFLICT,
            ServiceError::QuotaExceeded(_) => StatusCode::TOO_MANY_REQUESTS,
            ServiceError::External(_) => StatusCode::BAD_GATEWAY,
            ServiceError::Database(diesel::result::Error::NotFound) => StatusCode::NOT_FOUND,
            ServiceError::Database(_) | ServiceError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<diesel::r2d2::PoolError> for ServiceError {
    fn from(e: diesel::r2d2::PoolError) -> Self {
        ServiceError::Internal(anyhow::anyhow!("failed to acquire db connection: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_surface_stable() {
        assert_eq!(ServiceError::NoPrice("petrol".to_string()).code(), "NO_PRICE");
        assert_eq!(
            ServiceError::conflict("SEQUENCE_VIOLATION", "out of order").code(),
            "SEQUENCE_VIOLATION"
        );
        assert_eq!(
            ServiceError::QuotaExceeded("monthly exports".to_string()).status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            ServiceError::Database(diesel::result::Error::NotFound).status(),
            StatusCode::NOT_FOUND
        );
    }
}

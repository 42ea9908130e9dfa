pub mod fuel;
pub mod requests;
pub mod serde_fmt;
pub mod status;

use serde::Deserialize;
use serde::Serialize;

/// The JSON envelope every endpoint responds with.
///
/// Success and failure are distinguished by the `success` flag rather than a
/// serde tag so that clients in other languages can branch on a single
/// boolean field.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApiResponse<T> {
    Ok(ApiOk<T>),
    Err(ApiErr),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiOk<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErr {
    pub success: bool,
    pub error: ErrorPayload,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub message: String,
    /// Surface-stable machine identifier, e.g. `NO_PRICE` or
    /// `SEQUENCE_VIOLATION`. Absent for plain validation messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        ApiResponse::Ok(ApiOk {
            success: true,
            data,
            pagination: None,
        })
    }

    pub fn ok_paged(data: T, pagination: Pagination) -> Self {
        ApiResponse::Ok(ApiOk {
            success: true,
            data,
            pagination: Some(pagination),
        })
    }

    pub fn err(message: impl Into<String>, code: Option<String>) -> Self {
        ApiResponse::Err(ApiErr {
            success: false,
            error: ErrorPayload {
                message: message.into(),
                code,
                details: None,
            },
        })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

impl Pagination {
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let limit = limit.max(1);
        Self {
            page,
            limit,
            total,
            pages: (total + limit - 1) / limit,
        }
    }
}

/// Role hierarchy of the authorization fabric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    Owner,
    Manager,
    Employee,
}

impl Role {
    /// Whether the role is pinned to a single station.
    pub fn is_station_bound(&self) -> bool {
        matches!(self, Role::Manager | Role::Employee)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::Owner => "owner",
            Role::Manager => "manager",
            Role::Employee => "employee",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_rounds_up() {
        let p = Pagination::new(1, 20, 41);
        assert_eq!(p.pages, 3);

        let p = Pagination::new(1, 20, 40);
        assert_eq!(p.pages, 2);

        let p = Pagination::new(1, 20, 0);
        assert_eq!(p.pages, 0);
    }

    #[test]
    fn envelope_serializes_success_flag() {
        let ok = ApiResponse::ok(42u32);
        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"], 42);

        let err: ApiResponse<u32> =
            ApiResponse::err("boom", Some("CONFLICT".to_string()));
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["message"], "boom");
        assert_eq!(json["error"]["code"], "CONFLICT");
    }

    #[test]
    fn role_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&Role::SuperAdmin).unwrap(),
            "\"super_admin\""
        );
    }
}

use crate::auth::AuthUser;
use crate::db::audit_logs::AuditCategory;
use crate::db::audit_logs::AuditLog;
use crate::db::audit_logs::AuditSeverity;
use crate::db::audit_logs::NewAuditLog;
use crate::error::ServiceError;
use diesel::PgConnection;
use serde_json::Value;
use uuid::Uuid;

const SENSITIVE_KEYS: [&str; 5] = [
    "password",
    "password_hash",
    "passwordHash",
    "token",
    "secret",
];

/// Strips credentials from a snapshot before it is persisted. Applied to
/// nested objects as well; array elements are sanitized in place.
pub fn sanitize(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(k, _)| !SENSITIVE_KEYS.contains(&k.as_str()))
                .map(|(k, v)| (k, sanitize(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(sanitize).collect()),
        other => other,
    }
}

pub struct AuditEntry<'a> {
    pub user: Option<&'a AuthUser>,
    pub user_email: Option<String>,
    pub station_id: Option<Uuid>,
    pub action: &'a str,
    pub entity_type: &'a str,
    pub entity_id: Option<String>,
    pub old_values: Option<Value>,
    pub new_values: Option<Value>,
    pub description: Option<String>,
    pub severity: AuditSeverity,
    pub category: AuditCategory,
    pub success: bool,
    pub error_message: Option<String>,
}

impl<'a> AuditEntry<'a> {
    pub fn new(action: &'a str, entity_type: &'a str) -> Self {
        Self {
            user: None,
            user_email: None,
            station_id: None,
            action,
            entity_type,
            entity_id: None,
            old_values: None,
            new_values: None,
            description: None,
            severity: AuditSeverity::Info,
            category: AuditCategory::General,
            success: true,
            error_message: None,
        }
    }

    pub fn by(mut self, user: &'a AuthUser) -> Self {
        self.user = Some(user);
        self
    }

    pub fn station(mut self, station_id: Uuid) -> Self {
        self.station_id = Some(station_id);
        self
    }

    pub fn entity(mut self, id: impl ToString) -> Self {
        self.entity_id = Some(id.to_string());
        self
    }

    pub fn old(mut self, values: Value) -> Self {
        self.old_values = Some(sanitize(values));
        self
    }

    pub fn new_values(mut self, values: Value) -> Self {
        self.new_values = Some(sanitize(values));
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn severity(mut self, severity: AuditSeverity) -> Self {
        self.severity = severity;
        self
    }

    pub fn category(mut self, category: AuditCategory) -> Self {
        self.category = category;
        self
    }

    pub fn failed(mut self, error: impl Into<String>) -> Self {
        self.success = false;
        self.error_message = Some(error.into());
        self
    }

    /// Inserts the entry. Callers invoke this inside the same transaction
    /// as the write the entry describes.
    pub fn emit(self, conn: &mut PgConnection) -> Result<(), ServiceError> {
        AuditLog::insert(
            conn,
            NewAuditLog {
                id: Uuid::new_v4(),
                user_id: self.user.map(|u| u.id),
                user_email: self.user_email,
                user_role: self.user.map(|u| u.role.as_str().to_string()),
                station_id: self.station_id,
                action: self.action.to_string(),
                entity_type: self.entity_type.to_string(),
                entity_id: self.entity_id,
                old_values: self.old_values,
                new_values: self.new_values,
                description: self.description,
                ip_address: None,
                user_agent: None,
                severity: self.severity,
                category: self.category,
                success: self.success,
                error_message: self.error_message,
            },
        )?;

        Ok(())
    }
}

/// Failed authentication attempts are recorded outside any business
/// transaction; the write itself failed, there is nothing to roll back.
pub fn record_auth_failure(conn: &mut PgConnection, email: &str, reason: &str) {
    let result = AuditLog::insert(
        conn,
        NewAuditLog {
            id: Uuid::new_v4(),
            user_id: None,
            user_email: Some(email.to_string()),
            user_role: None,
            station_id: None,
            action: "login".to_string(),
            entity_type: "user".to_string(),
            entity_id: None,
            old_values: None,
            new_values: None,
            description: None,
            ip_address: None,
            user_agent: None,
            severity: AuditSeverity::Warning,
            category: AuditCategory::Auth,
            success: false,
            error_message: Some(reason.to_string()),
        },
    );

    if let Err(e) = result {
        tracing::error!("Failed to record auth failure: {e:#}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sanitize_strips_credentials_recursively() {
        let value = json!({
            "email": "a@b.c",
            "password": "hunter2",
            "nested": { "token": "t", "ok": 1 },
            "list": [{ "secret": "s", "keep": true }],
        });

        let clean = sanitize(value);
        assert_eq!(clean["email"], "a@b.c");
        assert!(clean.get("password").is_none());
        assert!(clean["nested"].get("token").is_none());
        assert_eq!(clean["nested"]["ok"], 1);
        assert!(clean["list"][0].get("secret").is_none());
        assert_eq!(clean["list"][0]["keep"], true);
    }
}

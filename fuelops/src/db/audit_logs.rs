use crate::schema::audit_logs;
use crate::schema::sql_types::AuditCategoryType;
use crate::schema::sql_types::AuditSeverityType;
use autometrics::autometrics;
use diesel::prelude::*;
use diesel::result::QueryResult;
use diesel::AsExpression;
use diesel::FromSqlRow;
use time::Date;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromSqlRow, AsExpression)]
#[diesel(sql_type = AuditSeverityType)]
pub enum AuditSeverity {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromSqlRow, AsExpression)]
#[diesel(sql_type = AuditCategoryType)]
pub enum AuditCategory {
    Auth,
    Data,
    Finance,
    System,
    General,
}

impl From<AuditSeverity> for fuelops_commons::status::AuditSeverity {
    fn from(value: AuditSeverity) -> Self {
        match value {
            AuditSeverity::Info => fuelops_commons::status::AuditSeverity::Info,
            AuditSeverity::Warning => fuelops_commons::status::AuditSeverity::Warning,
            AuditSeverity::Critical => fuelops_commons::status::AuditSeverity::Critical,
        }
    }
}

impl From<AuditCategory> for fuelops_commons::status::AuditCategory {
    fn from(value: AuditCategory) -> Self {
        match value {
            AuditCategory::Auth => fuelops_commons::status::AuditCategory::Auth,
            AuditCategory::Data => fuelops_commons::status::AuditCategory::Data,
            AuditCategory::Finance => fuelops_commons::status::AuditCategory::Finance,
            AuditCategory::System => fuelops_commons::status::AuditCategory::System,
            AuditCategory::General => fuelops_commons::status::AuditCategory::General,
        }
    }
}

/// Append-only; there are deliberately no update functions in this module.
#[derive(Queryable, Debug, Clone)]
pub struct AuditLog {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub user_email: Option<String>,
    pub user_role: Option<String>,
    pub station_id: Option<Uuid>,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<String>,
    pub old_values: Option<serde_json::Value>,
    pub new_values: Option<serde_json::Value>,
    pub description: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub severity: AuditSeverity,
    pub category: AuditCategory,
    pub success: bool,
    pub error_message: Option<String>,
    pub created_at: OffsetDateTime,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = audit_logs)]
pub struct NewAuditLog {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub user_email: Option<String>,
    pub user_role: Option<String>,
    pub station_id: Option<Uuid>,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<String>,
    pub old_values: Option<serde_json::Value>,
    pub new_values: Option<serde_json::Value>,
    pub description: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub severity: AuditSeverity,
    pub category: AuditCategory,
    pub success: bool,
    pub error_message: Option<String>,
}

impl AuditLog {
    #[autometrics]
    pub fn insert(conn: &mut PgConnection, entry: NewAuditLog) -> QueryResult<AuditLog> {
        diesel::insert_into(audit_logs::table)
            .values(entry)
            .get_result(conn)
    }

    pub fn for_station(
        conn: &mut PgConnection,
        station_id: Uuid,
        from: Option<Date>,
        limit: i64,
    ) -> QueryResult<Vec<AuditLog>> {
        let mut query = audit_logs::table
            .filter(audit_logs::station_id.eq(station_id))
            .into_boxed();

        if let Some(from) = from {
            let from = from.midnight().assume_utc();
            query = query.filter(audit_logs::created_at.ge(from));
        }

        query
            .order(audit_logs::created_at.desc())
            .limit(limit)
            .load(conn)
    }

    /// Retention purge. Critical entries are never deleted.
    pub fn purge_older_than(conn: &mut PgConnection, cutoff: OffsetDateTime) -> QueryResult<usize> {
        diesel::delete(
            audit_logs::table
                .filter(audit_logs::created_at.lt(cutoff))
                .filter(audit_logs::severity.ne(AuditSeverity::Critical)),
        )
        .execute(conn)
    }
}

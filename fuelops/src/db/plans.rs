use crate::schema::plans;
use autometrics::autometrics;
use diesel::prelude::*;
use diesel::result::QueryResult;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Queryable, Debug, Clone)]
pub struct Plan {
    pub id: Uuid,
    pub name: String,
    pub max_stations: i32,
    pub max_pumps_per_station: i32,
    pub max_nozzles_per_pump: i32,
    pub max_employees: i32,
    pub max_creditors: i32,
    pub monthly_exports: i32,
    pub monthly_reports: i32,
    pub monthly_manual_entries: i32,
    pub sales_retention_days: i32,
    pub profit_retention_days: i32,
    pub analytics_retention_days: i32,
    pub audit_retention_days: i32,
    pub transactions_retention_days: i32,
    pub backdated_days: i32,
    pub can_export: bool,
    pub can_track_expenses: bool,
    pub can_track_credits: bool,
    pub can_view_profit_loss: bool,
    pub created_at: OffsetDateTime,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = plans)]
pub struct NewPlan {
    pub id: Uuid,
    pub name: String,
    pub max_stations: i32,
    pub max_pumps_per_station: i32,
    pub max_nozzles_per_pump: i32,
    pub max_employees: i32,
    pub max_creditors: i32,
    pub monthly_exports: i32,
    pub monthly_reports: i32,
    pub monthly_manual_entries: i32,
    pub sales_retention_days: i32,
    pub profit_retention_days: i32,
    pub analytics_retention_days: i32,
    pub audit_retention_days: i32,
    pub transactions_retention_days: i32,
    pub backdated_days: i32,
    pub can_export: bool,
    pub can_track_expenses: bool,
    pub can_track_credits: bool,
    pub can_view_profit_loss: bool,
}

impl Plan {
    #[autometrics]
    pub fn insert(conn: &mut PgConnection, new_plan: NewPlan) -> QueryResult<Plan> {
        diesel::insert_into(plans::table)
            .values(new_plan)
            .get_result(conn)
    }

    pub fn by_id(conn: &mut PgConnection, id: Uuid) -> QueryResult<Option<Plan>> {
        plans::table.find(id).first::<Plan>(conn).optional()
    }

    pub fn by_name(conn: &mut PgConnection, name: &str) -> QueryResult<Option<Plan>> {
        plans::table
            .filter(plans::name.eq(name))
            .first::<Plan>(conn)
            .optional()
    }

    pub fn all(conn: &mut PgConnection) -> QueryResult<Vec<Plan>> {
        plans::table.order(plans::name.asc()).load(conn)
    }
}

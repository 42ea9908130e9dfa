use crate::auth;
use crate::db::plans::NewPlan;
use crate::db::plans::Plan;
use crate::db::users::NewUser;
use crate::db::users::User;
use crate::db::users::UserRole;
use anyhow::Context;
use anyhow::Result;
use diesel::PgConnection;
use uuid::Uuid;

struct PlanSpec {
    name: &'static str,
    max_stations: i32,
    max_pumps_per_station: i32,
    max_nozzles_per_pump: i32,
    max_employees: i32,
    max_creditors: i32,
    monthly_exports: i32,
    monthly_reports: i32,
    monthly_manual_entries: i32,
    retention_days: i32,
    audit_retention_days: i32,
    backdated_days: i32,
    can_export: bool,
    can_track_expenses: bool,
    can_track_credits: bool,
    can_view_profit_loss: bool,
}

const PLANS: [PlanSpec; 3] = [
    PlanSpec {
        name: "starter",
        max_stations: 1,
        max_pumps_per_station: 4,
        max_nozzles_per_pump: 4,
        max_employees: 5,
        max_creditors: 10,
        monthly_exports: 5,
        monthly_reports: 30,
        monthly_manual_entries: 500,
        retention_days: 90,
        audit_retention_days: 90,
        backdated_days: 3,
        can_export: false,
        can_track_expenses: false,
        can_track_credits: true,
        can_view_profit_loss: false,
    },
    PlanSpec {
        name: "standard",
        max_stations: 3,
        max_pumps_per_station: 8,
        max_nozzles_per_pump: 6,
        max_employees: 20,
        max_creditors: 50,
        monthly_exports: 50,
        monthly_reports: 200,
        monthly_manual_entries: 3000,
        retention_days: 365,
        audit_retention_days: 365,
        backdated_days: 7,
        can_export: true,
        can_track_expenses: true,
        can_track_credits: true,
        can_view_profit_loss: false,
    },
    PlanSpec {
        name: "premium",
        max_stations: -1,
        max_pumps_per_station: -1,
        max_nozzles_per_pump: -1,
        max_employees: -1,
        max_creditors: -1,
        monthly_exports: -1,
        monthly_reports: -1,
        monthly_manual_entries: -1,
        retention_days: -1,
        audit_retention_days: -1,
        backdated_days: 30,
        can_export: true,
        can_track_expenses: true,
        can_track_credits: true,
        can_view_profit_loss: true,
    },
];

/// Inserts the default plans and the super-admin account. Idempotent: rows
/// that already exist are left untouched.
pub fn run(conn: &mut PgConnection) -> Result<()> {
    for spec in &PLANS {
        if Plan::by_name(conn, spec.name)?.is_some() {
            continue;
        }

        Plan::insert(
            conn,
            NewPlan {
                id: Uuid::new_v4(),
                name: spec.name.to_string(),
                max_stations: spec.max_stations,
                max_pumps_per_station: spec.max_pumps_per_station,
                max_nozzles_per_pump: spec.max_nozzles_per_pump,
                max_employees: spec.max_employees,
                max_creditors: spec.max_creditors,
                monthly_exports: spec.monthly_exports,
                monthly_reports: spec.monthly_reports,
                monthly_manual_entries: spec.monthly_manual_entries,
                sales_retention_days: spec.retention_days,
                profit_retention_days: spec.retention_days,
                analytics_retention_days: spec.retention_days,
                audit_retention_days: spec.audit_retention_days,
                transactions_retention_days: spec.retention_days,
                backdated_days: spec.backdated_days,
                can_export: spec.can_export,
                can_track_expenses: spec.can_track_expenses,
                can_track_credits: spec.can_track_credits,
                can_view_profit_loss: spec.can_view_profit_loss,
            },
        )?;

        tracing::info!(plan = spec.name, "Seeded plan");
    }

    let email =
        std::env::var("SUPERADMIN_EMAIL").unwrap_or_else(|_| "admin@fuelops.local".to_string());

    if User::by_email(conn, &email)?.is_none() {
        let password = std::env::var("SUPERADMIN_PASSWORD")
            .context("SUPERADMIN_PASSWORD must be set to seed the super-admin account")?;

        let password_hash = auth::hash_password(&password)
            .map_err(|e| anyhow::anyhow!("failed to hash password: {e}"))?;

        User::insert(
            conn,
            NewUser {
                id: Uuid::new_v4(),
                email: email.clone(),
                password_hash,
                name: "Super Admin".to_string(),
                role: UserRole::SuperAdmin,
                station_id: None,
                plan_id: None,
                created_by: None,
            },
        )?;

        tracing::info!(%email, "Seeded super-admin account");
    }

    Ok(())
}

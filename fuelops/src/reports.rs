//! Report read paths. Retention clamping and the monthly report counter
//! are applied by the routes before these run.

use crate::db::audit_logs::AuditLog;
use crate::db::daily_transactions::DailyTransaction;
use crate::db::daily_transactions::TransactionStatus;
use crate::db::expenses::Expense;
use crate::db::fuel_prices::FuelPrice;
use crate::db::readings::ApprovalStatus;
use crate::db::readings::Reading;
use crate::db::readings::ReadingFilter;
use crate::db::shifts::Shift;
use crate::error::ServiceError;
use diesel::PgConnection;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use time::Date;
use time::Duration;
use uuid::Uuid;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesReportRow {
    pub reading_id: Uuid,
    #[serde(with = "fuelops_commons::serde_fmt::ymd")]
    pub date: Date,
    pub pump_id: Uuid,
    pub nozzle_id: Uuid,
    pub fuel_type: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub litres: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub price_per_litre: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesReport {
    pub rows: Vec<SalesReportRow>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_litres: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
}

pub fn sales(
    conn: &mut PgConnection,
    station_id: Uuid,
    from: Option<Date>,
    to: Option<Date>,
) -> Result<SalesReport, ServiceError> {
    let readings = Reading::list(
        conn,
        &ReadingFilter {
            station_id: Some(station_id),
            from,
            to,
            ..Default::default()
        },
    )?;

    let rows: Vec<SalesReportRow> = readings
        .into_iter()
        .filter(|r| r.approval_status != ApprovalStatus::Rejected)
        .map(|r| SalesReportRow {
            reading_id: r.id,
            date: r.reading_date,
            pump_id: r.pump_id,
            nozzle_id: r.nozzle_id,
            fuel_type: r.fuel_type,
            litres: r.litres_sold,
            price_per_litre: r.price_per_litre,
            amount: r.total_amount,
        })
        .collect();

    let total_litres = rows.iter().map(|r| r.litres).sum();
    let total_amount = rows.iter().map(|r| r.amount).sum();

    Ok(SalesReport {
        rows,
        total_litres,
        total_amount,
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySalesRow {
    #[serde(with = "fuelops_commons::serde_fmt::ymd")]
    pub date: Date,
    #[serde(with = "rust_decimal::serde::float")]
    pub litres: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub revenue: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub cash: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub online: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub credit: Decimal,
}

pub fn daily_sales(
    conn: &mut PgConnection,
    station_id: Uuid,
    from: Option<Date>,
    to: Option<Date>,
) -> Result<Vec<DailySalesRow>, ServiceError> {
    let transactions = DailyTransaction::for_station(conn, station_id, from, to)?;

    let mut by_date: BTreeMap<Date, DailySalesRow> = BTreeMap::new();
    for t in transactions
        .into_iter()
        .filter(|t| t.status != TransactionStatus::Cancelled)
    {
        let entry = by_date.entry(t.transaction_date).or_insert(DailySalesRow {
            date: t.transaction_date,
            litres: Decimal::ZERO,
            revenue: Decimal::ZERO,
            cash: Decimal::ZERO,
            online: Decimal::ZERO,
            credit: Decimal::ZERO,
        });
        entry.litres += t.total_litres;
        entry.revenue += t.total_sale_value;
        entry.cash += t.payment_cash;
        entry.online += t.payment_online;
        entry.credit += t.payment_credit;
    }

    Ok(by_date.into_values().collect())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftReportRow {
    pub shift_id: Uuid,
    pub employee_id: Uuid,
    #[serde(with = "fuelops_commons::serde_fmt::ymd")]
    pub date: Date,
    pub status: fuelops_commons::status::ShiftStatus,
    pub readings_count: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_litres: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_sales: Decimal,
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub expected_cash: Option<Decimal>,
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub cash_difference: Option<Decimal>,
}

pub fn shifts(
    conn: &mut PgConnection,
    station_id: Uuid,
    from: Date,
    to: Date,
) -> Result<Vec<ShiftReportRow>, ServiceError> {
    let mut rows = Vec::new();

    let mut date = from;
    while date <= to {
        for shift in Shift::for_station_on(conn, station_id, date)? {
            rows.push(ShiftReportRow {
                shift_id: shift.id,
                employee_id: shift.employee_id,
                date: shift.shift_date,
                status: shift.status.into(),
                readings_count: shift.readings_count,
                total_litres: shift.total_litres_sold,
                total_sales: shift.total_sales_amount,
                expected_cash: shift.expected_cash,
                cash_difference: shift.cash_difference,
            });
        }

        date = date
            .next_day()
            .ok_or_else(|| ServiceError::Validation("date range overflow".to_string()))?;
    }

    Ok(rows)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitReport {
    #[serde(with = "rust_decimal::serde::float")]
    pub revenue: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub cost_of_fuel: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub gross_profit: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub expenses: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub net_profit: Decimal,
}

/// Revenue minus fuel cost (litres priced at the cost price effective on
/// each reading's date) minus recorded expenses.
pub fn profit(
    conn: &mut PgConnection,
    station_id: Uuid,
    from: Date,
    to: Date,
) -> Result<ProfitReport, ServiceError> {
    let readings = Reading::list(
        conn,
        &ReadingFilter {
            station_id: Some(station_id),
            from: Some(from),
            to: Some(to),
            ..Default::default()
        },
    )?;

    let mut revenue = Decimal::ZERO;
    let mut cost_of_fuel = Decimal::ZERO;

    for reading in readings
        .iter()
        .filter(|r| r.approval_status != ApprovalStatus::Rejected)
    {
        revenue += reading.total_amount;

        let price = FuelPrice::effective(
            conn,
            station_id,
            &reading.fuel_type,
            reading.reading_date,
        )?;
        if let Some(cost_price) = price.and_then(|p| p.cost_price) {
            cost_of_fuel += (reading.litres_sold * cost_price).round_dp(2);
        }
    }

    let expenses = Expense::total_between(conn, station_id, from, to)?;
    let gross_profit = revenue - cost_of_fuel;

    Ok(ProfitReport {
        revenue,
        cost_of_fuel,
        gross_profit,
        expenses,
        net_profit: gross_profit - expenses,
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReportRow {
    pub id: Uuid,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<String>,
    pub user_email: Option<String>,
    pub severity: fuelops_commons::status::AuditSeverity,
    pub category: fuelops_commons::status::AuditCategory,
    pub success: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: time::OffsetDateTime,
}

pub fn audit_trail(
    conn: &mut PgConnection,
    station_id: Uuid,
    from: Option<Date>,
    limit: i64,
) -> Result<Vec<AuditReportRow>, ServiceError> {
    let rows = AuditLog::for_station(conn, station_id, from, limit)?;

    Ok(rows
        .into_iter()
        .map(|log| AuditReportRow {
            id: log.id,
            action: log.action,
            entity_type: log.entity_type,
            entity_id: log.entity_id,
            user_email: log.user_email,
            severity: log.severity.into(),
            category: log.category.into(),
            success: log.success,
            created_at: log.created_at,
        })
        .collect())
}

/// Guards against unbounded shift report scans.
pub fn clamp_range(from: Date, to: Date, max_days: i64) -> (Date, Date) {
    if (to - from).whole_days() > max_days {
        (to - Duration::days(max_days), to)
    } else {
        (from, to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn range_is_clamped_to_max_days() {
        let (from, to) = clamp_range(date!(2023 - 01 - 01), date!(2024 - 06 - 30), 90);
        assert_eq!(to, date!(2024 - 06 - 30));
        assert_eq!((to - from).whole_days(), 90);

        let (from, to) = clamp_range(date!(2024 - 06 - 01), date!(2024 - 06 - 30), 90);
        assert_eq!(from, date!(2024 - 06 - 01));
        assert_eq!(to, date!(2024 - 06 - 30));
    }
}

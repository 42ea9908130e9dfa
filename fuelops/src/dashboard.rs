//! Dashboard read paths: in-memory aggregation over the station's rows.

use crate::db::creditors::Creditor;
use crate::db::handovers::CashHandover;
use crate::db::handovers::HandoverStatus;
use crate::db::pumps::Pump;
use crate::db::readings::ApprovalStatus;
use crate::db::readings::Reading;
use crate::db::readings::ReadingFilter;
use crate::db::shifts::Shift;
use crate::db::stations::Station;
use crate::db::tanks::Tank;
use crate::db::users::User;
use crate::error::ServiceError;
use crate::sales;
use crate::tank;
use diesel::PgConnection;
use fuelops_commons::status::TankLevelStatus;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use time::Date;
use uuid::Uuid;

fn sales_readings(
    conn: &mut PgConnection,
    station_id: Uuid,
    from: Option<Date>,
    to: Option<Date>,
) -> Result<Vec<Reading>, ServiceError> {
    let readings = Reading::list(
        conn,
        &ReadingFilter {
            station_id: Some(station_id),
            from,
            to,
            ..Default::default()
        },
    )?;

    Ok(readings
        .into_iter()
        .filter(|r| r.approval_status != ApprovalStatus::Rejected)
        .collect())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    #[serde(with = "rust_decimal::serde::float")]
    pub total_litres: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_revenue: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub cash: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub online: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub credit: Decimal,
    pub reading_count: usize,
    pub transaction_count: usize,
    pub pending_handovers: usize,
    pub disputed_handovers: usize,
    #[serde(with = "rust_decimal::serde::float")]
    pub outstanding_credit: Decimal,
    pub tanks: Vec<TankStatus>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TankStatus {
    pub tank_id: Uuid,
    pub fuel_type: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub current_level: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub capacity: Decimal,
    pub status: TankLevelStatus,
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub since_last_refill: Option<Decimal>,
}

pub fn summary(
    conn: &mut PgConnection,
    station_id: Uuid,
    from: Option<Date>,
    to: Option<Date>,
) -> Result<DashboardSummary, ServiceError> {
    let readings = sales_readings(conn, station_id, from, to)?;
    let totals = sales::summarize(conn, station_id, from, to)?;

    let handovers = CashHandover::for_station(conn, station_id, from, to, None)?;
    let pending = handovers
        .iter()
        .filter(|h| h.status == HandoverStatus::Pending)
        .count();
    let disputed = handovers
        .iter()
        .filter(|h| h.status == HandoverStatus::Disputed)
        .count();

    let outstanding: Decimal = Creditor::list_for_station(conn, station_id, true)?
        .iter()
        .map(|c| c.current_balance)
        .sum();

    let tanks = Tank::list_for_station(conn, station_id)?
        .into_iter()
        .map(|t| TankStatus {
            tank_id: t.id,
            fuel_type: t.fuel_type.clone(),
            current_level: t.current_level,
            capacity: t.capacity,
            status: tank::classify(&t),
            since_last_refill: tank::since_last_refill(&t),
        })
        .collect();

    Ok(DashboardSummary {
        total_litres: readings.iter().map(|r| r.litres_sold).sum(),
        total_revenue: readings.iter().map(|r| r.total_amount).sum(),
        cash: totals.cash,
        online: totals.online,
        credit: totals.credit,
        reading_count: readings.len(),
        transaction_count: totals.transaction_count,
        pending_handovers: pending,
        disputed_handovers: disputed,
        outstanding_credit: outstanding,
        tanks,
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    #[serde(with = "fuelops_commons::serde_fmt::ymd")]
    pub date: Date,
    #[serde(with = "rust_decimal::serde::float")]
    pub litres: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub revenue: Decimal,
}

pub fn trends(
    conn: &mut PgConnection,
    station_id: Uuid,
    from: Option<Date>,
    to: Option<Date>,
) -> Result<Vec<TrendPoint>, ServiceError> {
    let readings = sales_readings(conn, station_id, from, to)?;

    let mut by_date: BTreeMap<Date, (Decimal, Decimal)> = BTreeMap::new();
    for reading in readings {
        let entry = by_date
            .entry(reading.reading_date)
            .or_insert((Decimal::ZERO, Decimal::ZERO));
        entry.0 += reading.litres_sold;
        entry.1 += reading.total_amount;
    }

    Ok(by_date
        .into_iter()
        .map(|(date, (litres, revenue))| TrendPoint {
            date,
            litres,
            revenue,
        })
        .collect())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FuelBreakdownRow {
    pub fuel_type: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub litres: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub revenue: Decimal,
    pub reading_count: usize,
}

pub fn fuel_breakdown(
    conn: &mut PgConnection,
    station_id: Uuid,
    from: Option<Date>,
    to: Option<Date>,
) -> Result<Vec<FuelBreakdownRow>, ServiceError> {
    let readings = sales_readings(conn, station_id, from, to)?;

    let mut by_fuel: BTreeMap<String, FuelBreakdownRow> = BTreeMap::new();
    for reading in readings {
        let entry = by_fuel
            .entry(reading.fuel_type.clone())
            .or_insert(FuelBreakdownRow {
                fuel_type: reading.fuel_type.clone(),
                litres: Decimal::ZERO,
                revenue: Decimal::ZERO,
                reading_count: 0,
            });
        entry.litres += reading.litres_sold;
        entry.revenue += reading.total_amount;
        entry.reading_count += 1;
    }

    Ok(by_fuel.into_values().collect())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PumpPerformanceRow {
    pub pump_id: Uuid,
    pub pump_name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub litres: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub revenue: Decimal,
    pub reading_count: usize,
}

pub fn pump_performance(
    conn: &mut PgConnection,
    station_id: Uuid,
    from: Option<Date>,
    to: Option<Date>,
) -> Result<Vec<PumpPerformanceRow>, ServiceError> {
    let readings = sales_readings(conn, station_id, from, to)?;
    let pumps = Pump::list_for_station(conn, station_id)?;
    let names: BTreeMap<Uuid, String> = pumps.into_iter().map(|p| (p.id, p.name)).collect();

    let mut by_pump: BTreeMap<Uuid, PumpPerformanceRow> = BTreeMap::new();
    for reading in readings {
        let entry = by_pump.entry(reading.pump_id).or_insert(PumpPerformanceRow {
            pump_id: reading.pump_id,
            pump_name: names
                .get(&reading.pump_id)
                .cloned()
                .unwrap_or_else(|| "unknown".to_string()),
            litres: Decimal::ZERO,
            revenue: Decimal::ZERO,
            reading_count: 0,
        });
        entry.litres += reading.litres_sold;
        entry.revenue += reading.total_amount;
        entry.reading_count += 1;
    }

    Ok(by_pump.into_values().collect())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NozzleBreakdownRow {
    pub nozzle_id: Uuid,
    pub pump_id: Uuid,
    pub fuel_type: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub litres: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub revenue: Decimal,
    pub reading_count: usize,
}

pub fn nozzle_breakdown(
    conn: &mut PgConnection,
    station_id: Uuid,
    from: Option<Date>,
    to: Option<Date>,
) -> Result<Vec<NozzleBreakdownRow>, ServiceError> {
    let readings = sales_readings(conn, station_id, from, to)?;

    let mut by_nozzle: BTreeMap<Uuid, NozzleBreakdownRow> = BTreeMap::new();
    for reading in readings {
        let entry = by_nozzle
            .entry(reading.nozzle_id)
            .or_insert(NozzleBreakdownRow {
                nozzle_id: reading.nozzle_id,
                pump_id: reading.pump_id,
                fuel_type: reading.fuel_type.clone(),
                litres: Decimal::ZERO,
                revenue: Decimal::ZERO,
                reading_count: 0,
            });
        entry.litres += reading.litres_sold;
        entry.revenue += reading.total_amount;
        entry.reading_count += 1;
    }

    Ok(by_nozzle.into_values().collect())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftBreakdownRow {
    pub shift_id: Uuid,
    pub employee_id: Uuid,
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
    pub cash_difference: Option<Decimal>,
}

pub fn shift_breakdown(
    conn: &mut PgConnection,
    station_id: Uuid,
    date: Date,
) -> Result<Vec<ShiftBreakdownRow>, ServiceError> {
    let shifts = Shift::for_station_on(conn, station_id, date)?;

    Ok(shifts
        .into_iter()
        .map(|s| ShiftBreakdownRow {
            shift_id: s.id,
            employee_id: s.employee_id,
            status: s.status.into(),
            readings_count: s.readings_count,
            total_litres: s.total_litres_sold,
            total_sales: s.total_sales_amount,
            cash_difference: s.cash_difference,
        })
        .collect())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminOverview {
    pub station_count: usize,
    pub stations: Vec<AdminStationRow>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStationRow {
    pub station_id: Uuid,
    pub name: String,
    pub code: String,
    pub owner_email: String,
}

/// Cross-station view for the super admin only; scope checks happen in the
/// route.
pub fn admin_overview(conn: &mut PgConnection) -> Result<AdminOverview, ServiceError> {
    let stations = Station::all_active(conn)?;

    let mut rows = Vec::with_capacity(stations.len());
    for station in &stations {
        let owner_email = User::by_id(conn, station.owner_id)?
            .map(|u| u.email)
            .unwrap_or_else(|| "unknown".to_string());

        rows.push(AdminStationRow {
            station_id: station.id,
            name: station.name.clone(),
            code: station.code.clone(),
            owner_email,
        });
    }

    Ok(AdminOverview {
        station_count: rows.len(),
        stations: rows,
    })
}

pub mod models;

use crate::audit::AuditEntry;
use crate::auth;
use crate::auth::AuthUser;
use crate::db::audit_logs::AuditCategory;
use crate::db::audit_logs::AuditSeverity;
use crate::db::fuel_prices::FuelPrice;
use crate::db::nozzles::Nozzle;
use crate::db::readings::ApprovalStatus;
use crate::db::readings::NewReading;
use crate::db::readings::Reading;
use crate::db::readings::ReadingSource;
use crate::db::stations::Station;
use crate::error::ServiceError;
use crate::quota;
use crate::quota::MonthlyKind;
use crate::tank;
use diesel::Connection;
use diesel::PgConnection;
use fuelops_commons::Role;
use crate::reading::models::litres_sold;
use crate::reading::models::round2;
use crate::reading::models::CreatedReading;
use rust_decimal::Decimal;
use serde_json::json;
use time::Date;
use time::Duration;
use time::Time;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct CreateReading {
    pub nozzle_id: Uuid,
    pub reading_date: Date,
    pub reading_time: Option<Time>,
    pub reading_value: Decimal,
    pub shift_id: Option<Uuid>,
    pub notes: Option<String>,
    pub is_sample: bool,
    /// Callers cannot create initial readings through the sales path; an
    /// attempt is rewritten to false and logged.
    pub attempted_initial: bool,
    pub source: fuelops_commons::status::ReadingSource,
}

/// Converts a cumulative meter entry into a sale record. Runs under the
/// nozzle's row lock so that baseline lookup and insert are linearizable
/// per nozzle; idempotent on (nozzle, date, time, value).
pub fn create_reading(
    conn: &mut PgConnection,
    caller: &AuthUser,
    input: CreateReading,
    today: Date,
    grace_days: i64,
) -> Result<CreatedReading, ServiceError> {
    if input.reading_value < Decimal::ZERO {
        return Err(ServiceError::Validation(
            "readingValue must not be negative".to_string(),
        ));
    }
    if input.reading_date > today {
        return Err(ServiceError::Validation(
            "readingDate must not be in the future".to_string(),
        ));
    }

    conn.transaction::<_, ServiceError, _>(|conn| {
        let nozzle = Nozzle::by_id_locked(conn, input.nozzle_id)?
            .ok_or_else(|| ServiceError::NotFound("nozzle".to_string()))?;

        auth::assert_station(conn, caller, nozzle.station_id)?;

        let station = Station::by_id(conn, nozzle.station_id)?
            .ok_or_else(|| ServiceError::NotFound("station".to_string()))?;

        let owner = auth::station_owner(conn, station.id)?;
        let plan = quota::effective_plan(conn, &owner, grace_days)?;

        if input.reading_date < today - Duration::days(i64::from(plan.backdated_days)) {
            return Err(ServiceError::BackdatedExceeded(format!(
                "readings may be backdated at most {} days",
                plan.backdated_days
            )));
        }

        if station.shift_required_for_reading
            && input.shift_id.is_none()
            && caller.role == Role::Employee
        {
            return Err(ServiceError::Validation(
                "this station requires an open shift to enter readings".to_string(),
            ));
        }

        // Identical input returns the already-persisted row.
        if let Some(existing) = Reading::find_identical(
            conn,
            nozzle.id,
            input.reading_date,
            input.reading_time,
            input.reading_value,
        )? {
            return Ok(CreatedReading {
                reading: existing.into(),
                warnings: Vec::new(),
                created: false,
            });
        }

        if !input.is_sample
            && Reading::approved_non_sample_exists(conn, nozzle.id, input.reading_date)?
        {
            return Err(ServiceError::conflict(
                "DUPLICATE_READING",
                format!(
                    "an approved reading already exists for nozzle {} on {}",
                    nozzle.nozzle_number, input.reading_date
                ),
            ));
        }

        let price = FuelPrice::effective(conn, station.id, &nozzle.fuel_type, input.reading_date)?
            .ok_or_else(|| {
                ServiceError::NoPrice(format!(
                    "{} at station {} on {}",
                    nozzle.fuel_type, station.code, input.reading_date
                ))
            })?;

        let mut warnings = Vec::new();

        let previous = Reading::latest_on_or_before(conn, nozzle.id, input.reading_date)?;
        let (previous_reading_id, previous_reading_value, mut litres, meter_reset) =
            match &previous {
                Some(prev) => {
                    let (litres, reset) = litres_sold(input.reading_value, prev.reading_value);
                    (Some(prev.id), Some(prev.reading_value), litres, reset)
                }
                None => match nozzle.initial_reading {
                    // No history, but the meter start is known.
                    Some(initial) => {
                        let (litres, reset) = litres_sold(input.reading_value, initial);
                        (None, Some(initial), litres, reset)
                    }
                    // First ever snapshot only establishes the baseline.
                    None => (None, None, Decimal::ZERO, false),
                },
            };

        if meter_reset {
            warnings.push("meter_reset: meter value decreased; litres recorded as 0".to_string());
        }

        // Sample readings move the baseline but never revenue or stock.
        if input.is_sample {
            litres = Decimal::ZERO;
        }

        let total_amount = round2(litres * price.selling_price);

        let reading = Reading::insert(
            conn,
            NewReading {
                id: Uuid::new_v4(),
                nozzle_id: nozzle.id,
                station_id: nozzle.station_id,
                pump_id: nozzle.pump_id,
                fuel_type: nozzle.fuel_type.clone(),
                entered_by: caller.id,
                reading_date: input.reading_date,
                reading_time: input.reading_time,
                reading_value: input.reading_value,
                previous_reading_id,
                previous_reading_value,
                litres_sold: litres,
                price_per_litre: price.selling_price,
                total_amount,
                is_initial_reading: false,
                is_sample: input.is_sample,
                meter_reset,
                source: ReadingSource::from(input.source),
                approval_status: ApprovalStatus::Pending,
                shift_id: input.shift_id,
                notes: input.notes.clone(),
            },
        )?;

        if input.attempted_initial {
            AuditEntry::new("reading_initial_flag_rewritten", "nozzle_reading")
                .by(caller)
                .station(station.id)
                .entity(reading.id)
                .describe("isInitialReading=true was requested on a sales reading and forced to false")
                .severity(AuditSeverity::Warning)
                .category(AuditCategory::Data)
                .emit(conn)?;
        }

        let cache_stale = nozzle
            .last_reading_date
            .map(|d| d <= input.reading_date)
            .unwrap_or(true);
        if cache_stale {
            Nozzle::update_last_reading(
                conn,
                nozzle.id,
                input.reading_value,
                input.reading_date,
            )?;
        }

        if !input.is_sample {
            let tank_warnings =
                tank::dispense(conn, station.id, &nozzle.fuel_type, litres)?;
            warnings.extend(tank_warnings);
        }

        AuditEntry::new("reading_create", "nozzle_reading")
            .by(caller)
            .station(station.id)
            .entity(reading.id)
            .new_values(json!({
                "nozzleId": nozzle.id,
                "readingDate": input.reading_date.to_string(),
                "readingValue": input.reading_value,
                "litresSold": litres,
                "totalAmount": total_amount,
                "isSample": input.is_sample,
            }))
            .category(AuditCategory::Data)
            .emit(conn)?;

        if input.source == fuelops_commons::status::ReadingSource::Manual {
            quota::record_monthly_use(conn, owner.id, MonthlyKind::ManualEntries, today)?;
        }

        Ok(CreatedReading {
            reading: reading.into(),
            warnings,
            created: true,
        })
    })
}

/// Checks the monthly manual-entry counter before the expensive path runs.
pub fn ensure_manual_entry_allowed(
    conn: &mut PgConnection,
    nozzle_id: Uuid,
    today: Date,
    grace_days: i64,
) -> Result<(), ServiceError> {
    let nozzle = Nozzle::by_id(conn, nozzle_id)?
        .ok_or_else(|| ServiceError::NotFound("nozzle".to_string()))?;
    let owner = auth::station_owner(conn, nozzle.station_id)?;
    let plan = quota::effective_plan(conn, &owner, grace_days)?;

    quota::ensure_monthly_allowed(conn, owner.id, &plan, MonthlyKind::ManualEntries, today)
}

pub fn approve_reading(
    conn: &mut PgConnection,
    caller: &AuthUser,
    reading_id: Uuid,
) -> Result<models::Reading, ServiceError> {
    conn.transaction::<_, ServiceError, _>(|conn| {
        let reading = Reading::by_id(conn, reading_id)?
            .ok_or_else(|| ServiceError::NotFound("reading".to_string()))?;

        auth::assert_station(conn, caller, reading.station_id)?;

        if reading.approval_status != ApprovalStatus::Pending {
            return Err(ServiceError::conflict(
                "INVALID_STATE",
                "only pending readings can be approved",
            ));
        }

        if !reading.is_sample
            && Reading::approved_non_sample_exists(conn, reading.nozzle_id, reading.reading_date)?
        {
            return Err(ServiceError::conflict(
                "DUPLICATE_READING",
                "another approved reading exists for this nozzle and day",
            ));
        }

        let reading =
            Reading::set_approval(conn, reading_id, ApprovalStatus::Approved, caller.id, None)?;

        AuditEntry::new("reading_approve", "nozzle_reading")
            .by(caller)
            .station(reading.station_id)
            .entity(reading.id)
            .category(AuditCategory::Data)
            .emit(conn)?;

        Ok(reading.into())
    })
}

/// Rejection reverses any stock decrement the reading caused.
pub fn reject_reading(
    conn: &mut PgConnection,
    caller: &AuthUser,
    reading_id: Uuid,
    reason: String,
) -> Result<models::Reading, ServiceError> {
    conn.transaction::<_, ServiceError, _>(|conn| {
        let reading = Reading::by_id(conn, reading_id)?
            .ok_or_else(|| ServiceError::NotFound("reading".to_string()))?;

        auth::assert_station(conn, caller, reading.station_id)?;

        if reading.approval_status == ApprovalStatus::Rejected {
            return Err(ServiceError::conflict(
                "INVALID_STATE",
                "reading is already rejected",
            ));
        }
        if reading.settlement_id.is_some() {
            return Err(ServiceError::conflict(
                "SETTLEMENT_LOCKED",
                "reading is linked to a settlement and cannot be rejected",
            ));
        }

        let reading = Reading::set_approval(
            conn,
            reading_id,
            ApprovalStatus::Rejected,
            caller.id,
            Some(reason.clone()),
        )?;

        if !reading.is_sample && reading.litres_sold > Decimal::ZERO {
            tank::reverse_dispense(conn, reading.station_id, &reading.fuel_type, reading.litres_sold)?;
        }

        AuditEntry::new("reading_reject", "nozzle_reading")
            .by(caller)
            .station(reading.station_id)
            .entity(reading.id)
            .describe(reason)
            .severity(AuditSeverity::Warning)
            .category(AuditCategory::Data)
            .emit(conn)?;

        Ok(reading.into())
    })
}

/// Read-only; used by the UI to prefill the expected baseline.
pub fn get_previous_reading(
    conn: &mut PgConnection,
    nozzle_id: Uuid,
    before: Date,
) -> Result<Option<models::Reading>, ServiceError> {
    let reading = Reading::latest_before(conn, nozzle_id, before)?;
    Ok(reading.map(Into::into))
}

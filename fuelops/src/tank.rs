use crate::audit::AuditEntry;
use crate::auth::AuthUser;
use crate::db::audit_logs::AuditCategory;
use crate::db::audit_logs::AuditSeverity;
use crate::db::tank_refills::NewTankRefill;
use crate::db::tank_refills::RefillEntryType;
use crate::db::tank_refills::TankRefill;
use crate::db::tanks::Tank;
use crate::db::tanks::TrackingMode;
use crate::error::ServiceError;
use diesel::Connection;
use diesel::PgConnection;
use fuelops_commons::requests::CreateRefillRequest;
use fuelops_commons::status::TankLevelStatus;
use rust_decimal::Decimal;
use serde_json::json;
use time::Date;
use uuid::Uuid;

const DEFAULT_LOW_PERCENT: Decimal = Decimal::from_parts(20, 0, 0, false, 0);
const DEFAULT_CRITICAL_PERCENT: Decimal = Decimal::from_parts(10, 0, 0, false, 0);
const HUNDRED: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

pub fn low_threshold(tank: &Tank) -> Decimal {
    tank.low_level_warning.unwrap_or_else(|| {
        let pct = tank.low_level_percent.unwrap_or(DEFAULT_LOW_PERCENT);
        tank.capacity * pct / HUNDRED
    })
}

pub fn critical_threshold(tank: &Tank) -> Decimal {
    tank.critical_level.unwrap_or_else(|| {
        let pct = tank
            .critical_level_percent
            .unwrap_or(DEFAULT_CRITICAL_PERCENT);
        tank.capacity * pct / HUNDRED
    })
}

pub fn classify(tank: &Tank) -> TankLevelStatus {
    let level = tank.current_level;

    if level < Decimal::ZERO {
        return TankLevelStatus::Negative;
    }
    if level == Decimal::ZERO {
        return TankLevelStatus::Empty;
    }
    if level <= critical_threshold(tank) {
        return TankLevelStatus::Critical;
    }
    if level <= low_threshold(tank) {
        return TankLevelStatus::Low;
    }
    if level > tank.capacity {
        return TankLevelStatus::Overflow;
    }

    TankLevelStatus::Normal
}

/// `max(0, levelAfterLastRefill - currentLevel)` when the baseline is known.
pub fn since_last_refill(tank: &Tank) -> Option<Decimal> {
    tank.level_after_last_refill
        .map(|baseline| (baseline - tank.current_level).max(Decimal::ZERO))
}

/// Applies a sale to the tank backing a fuel at a station. Returns the
/// warnings to surface alongside the reading. Absence of a tank never
/// blocks a sale.
pub fn dispense(
    conn: &mut PgConnection,
    station_id: Uuid,
    fuel_type: &str,
    litres: Decimal,
) -> Result<Vec<String>, ServiceError> {
    if litres <= Decimal::ZERO {
        return Ok(Vec::new());
    }

    let Some(tank) = Tank::by_fuel_locked(conn, station_id, fuel_type)? else {
        return Ok(Vec::new());
    };

    if tank.tracking_mode == TrackingMode::Disabled {
        return Ok(Vec::new());
    }

    let result_level = tank.current_level - litres;

    if tank.tracking_mode == TrackingMode::Strict
        && result_level < Decimal::ZERO
        && !tank.allow_negative
    {
        return Err(ServiceError::TankInsufficient(format!(
            "tank for {fuel_type} holds {} l, sale of {litres} l would overdraw it",
            tank.current_level
        )));
    }

    Tank::set_level(conn, tank.id, result_level)?;

    let mut warnings = Vec::new();
    if result_level < Decimal::ZERO {
        warnings.push(format!(
            "tank level for {fuel_type} is negative ({result_level} l); a refill was likely not recorded"
        ));
    } else if result_level <= critical_threshold(&tank) {
        warnings.push(format!(
            "tank level for {fuel_type} is critical ({result_level} l)"
        ));
    } else if result_level <= low_threshold(&tank) {
        warnings.push(format!("tank level for {fuel_type} is low ({result_level} l)"));
    }

    Ok(warnings)
}

/// Undoes the level effect of a sale, e.g. when a reading is rejected
/// after creation.
pub fn reverse_dispense(
    conn: &mut PgConnection,
    station_id: Uuid,
    fuel_type: &str,
    litres: Decimal,
) -> Result<(), ServiceError> {
    if litres <= Decimal::ZERO {
        return Ok(());
    }

    if let Some(tank) = Tank::by_fuel_locked(conn, station_id, fuel_type)? {
        if tank.tracking_mode != TrackingMode::Disabled {
            Tank::set_level(conn, tank.id, tank.current_level + litres)?;
        }
    }

    Ok(())
}

pub fn record_refill(
    conn: &mut PgConnection,
    caller: &AuthUser,
    tank_id: Uuid,
    request: CreateRefillRequest,
    today: Date,
) -> Result<TankRefill, ServiceError> {
    if request.litres == Decimal::ZERO {
        return Err(ServiceError::Validation(
            "refill litres must be non-zero".to_string(),
        ));
    }

    let entry_type = request
        .entry_type
        .map(RefillEntryType::from)
        .unwrap_or(RefillEntryType::Refill);

    if request.litres < Decimal::ZERO && entry_type != RefillEntryType::Correction {
        return Err(ServiceError::Validation(
            "negative litres are only valid for corrections".to_string(),
        ));
    }

    conn.transaction::<_, ServiceError, _>(|conn| {
        let tank = Tank::by_id_locked(conn, tank_id)?
            .ok_or_else(|| ServiceError::NotFound("tank".to_string()))?;

        let level_before = tank.current_level;
        let level_after = level_before + request.litres;
        let total_cost = request
            .cost_per_litre
            .map(|cost| (cost * request.litres).round_dp(2));

        let refill = TankRefill::insert(
            conn,
            NewTankRefill {
                id: Uuid::new_v4(),
                tank_id: tank.id,
                station_id: tank.station_id,
                litres: request.litres,
                refill_date: request.refill_date,
                refill_time: request.refill_time,
                cost_per_litre: request.cost_per_litre,
                total_cost,
                supplier: request.supplier,
                invoice_number: request.invoice_number,
                vehicle_number: request.vehicle_number,
                driver_name: request.driver_name,
                tank_level_before: level_before,
                tank_level_after: level_after,
                entry_type,
                is_backdated: request.refill_date < today,
                entered_by: caller.id,
            },
        )?;

        Tank::apply_refill(
            conn,
            tank.id,
            level_after,
            level_after,
            request.refill_date,
            request.litres,
        )?;

        AuditEntry::new("tank_refill", "tank_refill")
            .by(caller)
            .station(tank.station_id)
            .entity(refill.id)
            .new_values(json!({
                "tankId": tank.id,
                "litres": refill.litres,
                "levelBefore": level_before,
                "levelAfter": level_after,
            }))
            .category(AuditCategory::Data)
            .emit(conn)?;

        Ok(refill)
    })
}

/// Deleting a refill reverses its level effect.
pub fn delete_refill(
    conn: &mut PgConnection,
    caller: &AuthUser,
    refill_id: Uuid,
) -> Result<(), ServiceError> {
    conn.transaction::<_, ServiceError, _>(|conn| {
        let refill = TankRefill::by_id(conn, refill_id)?
            .ok_or_else(|| ServiceError::NotFound("tank refill".to_string()))?;

        let tank = Tank::by_id_locked(conn, refill.tank_id)?
            .ok_or_else(|| ServiceError::NotFound("tank".to_string()))?;

        TankRefill::delete(conn, refill.id)?;
        Tank::set_level(conn, tank.id, tank.current_level - refill.litres)?;

        AuditEntry::new("tank_refill_delete", "tank_refill")
            .by(caller)
            .station(tank.station_id)
            .entity(refill.id)
            .old(json!({ "litres": refill.litres, "refillDate": refill.refill_date.to_string() }))
            .severity(AuditSeverity::Warning)
            .category(AuditCategory::Data)
            .emit(conn)?;

        Ok(())
    })
}

/// Calibrates the level from a physical dip reading.
pub fn calibrate(
    conn: &mut PgConnection,
    caller: &AuthUser,
    tank_id: Uuid,
    dip_level: Decimal,
    dip_date: Date,
) -> Result<Tank, ServiceError> {
    conn.transaction::<_, ServiceError, _>(|conn| {
        let tank = Tank::by_id_locked(conn, tank_id)?
            .ok_or_else(|| ServiceError::NotFound("tank".to_string()))?;

        let old_level = tank.current_level;
        Tank::calibrate(conn, tank.id, dip_level, dip_date)?;

        AuditEntry::new("tank_calibrate", "tank")
            .by(caller)
            .station(tank.station_id)
            .entity(tank.id)
            .old(json!({ "currentLevel": old_level }))
            .new_values(json!({ "currentLevel": dip_level }))
            .category(AuditCategory::Data)
            .emit(conn)?;

        let tank = Tank::by_id(conn, tank_id)?
            .ok_or_else(|| ServiceError::NotFound("tank".to_string()))?;

        Ok(tank)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use time::OffsetDateTime;

    fn tank(level: Decimal, capacity: Decimal) -> Tank {
        Tank {
            id: Uuid::new_v4(),
            station_id: Uuid::new_v4(),
            fuel_type: "petrol".to_string(),
            name: None,
            fuel_display_name: None,
            capacity,
            current_level: level,
            low_level_warning: None,
            low_level_percent: None,
            critical_level: None,
            critical_level_percent: None,
            level_after_last_refill: None,
            last_refill_date: None,
            last_refill_amount: None,
            last_dip_reading: None,
            last_dip_date: None,
            tracking_mode: TrackingMode::Warning,
            allow_negative: false,
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn default_thresholds_follow_capacity() {
        let t = tank(dec!(5000), dec!(10000));
        assert_eq!(low_threshold(&t), dec!(2000));
        assert_eq!(critical_threshold(&t), dec!(1000));
    }

    #[test]
    fn absolute_thresholds_win_over_percentages() {
        let mut t = tank(dec!(5000), dec!(10000));
        t.low_level_warning = Some(dec!(1500));
        t.critical_level = Some(dec!(400));
        assert_eq!(low_threshold(&t), dec!(1500));
        assert_eq!(critical_threshold(&t), dec!(400));
    }

    #[test]
    fn classification_ladder() {
        assert_eq!(classify(&tank(dec!(-5), dec!(10000))), TankLevelStatus::Negative);
        assert_eq!(classify(&tank(dec!(0), dec!(10000))), TankLevelStatus::Empty);
        assert_eq!(classify(&tank(dec!(900), dec!(10000))), TankLevelStatus::Critical);
        assert_eq!(classify(&tank(dec!(1500), dec!(10000))), TankLevelStatus::Low);
        assert_eq!(
            classify(&tank(dec!(10500), dec!(10000))),
            TankLevelStatus::Overflow
        );
        assert_eq!(classify(&tank(dec!(6000), dec!(10000))), TankLevelStatus::Normal);
    }

    #[test]
    fn since_last_refill_floors_at_zero() {
        let mut t = tank(dec!(4000), dec!(10000));
        assert_eq!(since_last_refill(&t), None);

        t.level_after_last_refill = Some(dec!(9000));
        assert_eq!(since_last_refill(&t), Some(dec!(5000)));

        // A dip calibration above the refill baseline must not go negative.
        t.current_level = dec!(9500);
        assert_eq!(since_last_refill(&t), Some(dec!(0)));
    }
}

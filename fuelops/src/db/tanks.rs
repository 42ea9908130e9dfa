use crate::schema::tanks;
use crate::schema::sql_types::TrackingModeType;
use anyhow::bail;
use anyhow::Result;
use autometrics::autometrics;
use diesel::prelude::*;
use diesel::result::QueryResult;
use diesel::AsExpression;
use diesel::FromSqlRow;
use rust_decimal::Decimal;
use time::Date;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromSqlRow, AsExpression)]
#[diesel(sql_type = TrackingModeType)]
pub enum TrackingMode {
    Strict,
    Warning,
    Disabled,
}

impl From<TrackingMode> for fuelops_commons::status::TrackingMode {
    fn from(value: TrackingMode) -> Self {
        match value {
            TrackingMode::Strict => fuelops_commons::status::TrackingMode::Strict,
            TrackingMode::Warning => fuelops_commons::status::TrackingMode::Warning,
            TrackingMode::Disabled => fuelops_commons::status::TrackingMode::Disabled,
        }
    }
}

impl From<fuelops_commons::status::TrackingMode> for TrackingMode {
    fn from(value: fuelops_commons::status::TrackingMode) -> Self {
        match value {
            fuelops_commons::status::TrackingMode::Strict => TrackingMode::Strict,
            fuelops_commons::status::TrackingMode::Warning => TrackingMode::Warning,
            fuelops_commons::status::TrackingMode::Disabled => TrackingMode::Disabled,
        }
    }
}

#[derive(Queryable, Debug, Clone)]
pub struct Tank {
    pub id: Uuid,
    pub station_id: Uuid,
    pub fuel_type: String,
    pub name: Option<String>,
    pub fuel_display_name: Option<String>,
    pub capacity: Decimal,
    pub current_level: Decimal,
    pub low_level_warning: Option<Decimal>,
    pub low_level_percent: Option<Decimal>,
    pub critical_level: Option<Decimal>,
    pub critical_level_percent: Option<Decimal>,
    pub level_after_last_refill: Option<Decimal>,
    pub last_refill_date: Option<Date>,
    pub last_refill_amount: Option<Decimal>,
    pub last_dip_reading: Option<Decimal>,
    pub last_dip_date: Option<Date>,
    pub tracking_mode: TrackingMode,
    pub allow_negative: bool,
    pub created_at: OffsetDateTime,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = tanks)]
pub struct NewTank {
    pub id: Uuid,
    pub station_id: Uuid,
    pub fuel_type: String,
    pub name: Option<String>,
    pub fuel_display_name: Option<String>,
    pub capacity: Decimal,
    pub current_level: Decimal,
    pub low_level_warning: Option<Decimal>,
    pub low_level_percent: Option<Decimal>,
    pub critical_level: Option<Decimal>,
    pub critical_level_percent: Option<Decimal>,
    pub tracking_mode: TrackingMode,
    pub allow_negative: bool,
}

impl Tank {
    #[autometrics]
    pub fn insert(conn: &mut PgConnection, new_tank: NewTank) -> QueryResult<Tank> {
        diesel::insert_into(tanks::table)
            .values(new_tank)
            .get_result(conn)
    }

    pub fn by_id(conn: &mut PgConnection, id: Uuid) -> QueryResult<Option<Tank>> {
        tanks::table.find(id).first::<Tank>(conn).optional()
    }

    /// Level updates are serialized per tank via a row lock.
    pub fn by_id_locked(conn: &mut PgConnection, id: Uuid) -> QueryResult<Option<Tank>> {
        tanks::table
            .find(id)
            .for_update()
            .first::<Tank>(conn)
            .optional()
    }

    pub fn by_fuel_locked(
        conn: &mut PgConnection,
        station_id: Uuid,
        fuel_type: &str,
    ) -> QueryResult<Option<Tank>> {
        tanks::table
            .filter(tanks::station_id.eq(station_id))
            .filter(tanks::fuel_type.eq(fuel_type))
            .for_update()
            .first::<Tank>(conn)
            .optional()
    }

    pub fn list_for_station(conn: &mut PgConnection, station_id: Uuid) -> QueryResult<Vec<Tank>> {
        tanks::table
            .filter(tanks::station_id.eq(station_id))
            .order(tanks::fuel_type.asc())
            .load(conn)
    }

    pub fn set_level(conn: &mut PgConnection, id: Uuid, level: Decimal) -> Result<()> {
        let affected = diesel::update(tanks::table.find(id))
            .set(tanks::current_level.eq(level))
            .execute(conn)?;

        if affected == 0 {
            bail!("Could not set level for tank {id}")
        }

        Ok(())
    }

    pub fn apply_refill(
        conn: &mut PgConnection,
        id: Uuid,
        new_level: Decimal,
        level_after_refill: Decimal,
        refill_date: Date,
        refill_amount: Decimal,
    ) -> Result<()> {
        let affected = diesel::update(tanks::table.find(id))
            .set((
                tanks::current_level.eq(new_level),
                tanks::level_after_last_refill.eq(Some(level_after_refill)),
                tanks::last_refill_date.eq(Some(refill_date)),
                tanks::last_refill_amount.eq(Some(refill_amount)),
            ))
            .execute(conn)?;

        if affected == 0 {
            bail!("Could not apply refill to tank {id}")
        }

        Ok(())
    }

    pub fn calibrate(
        conn: &mut PgConnection,
        id: Uuid,
        dip_level: Decimal,
        dip_date: Date,
    ) -> Result<()> {
        let affected = diesel::update(tanks::table.find(id))
            .set((
                tanks::current_level.eq(dip_level),
                tanks::last_dip_reading.eq(Some(dip_level)),
                tanks::last_dip_date.eq(Some(dip_date)),
            ))
            .execute(conn)?;

        if affected == 0 {
            bail!("Could not calibrate tank {id}")
        }

        Ok(())
    }
}

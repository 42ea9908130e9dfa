use crate::db::pumps::EquipmentStatus;
use crate::schema::nozzles;
use anyhow::bail;
use anyhow::Result;
use autometrics::autometrics;
use diesel::prelude::*;
use diesel::result::QueryResult;
use rust_decimal::Decimal;
use time::Date;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Queryable, Debug, Clone)]
pub struct Nozzle {
    pub id: Uuid,
    pub pump_id: Uuid,
    pub station_id: Uuid,
    pub nozzle_number: i32,
    pub fuel_type: String,
    pub status: EquipmentStatus,
    pub initial_reading: Option<Decimal>,
    pub last_reading: Option<Decimal>,
    pub last_reading_date: Option<Date>,
    pub created_at: OffsetDateTime,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = nozzles)]
pub struct NewNozzle {
    pub id: Uuid,
    pub pump_id: Uuid,
    pub station_id: Uuid,
    pub nozzle_number: i32,
    pub fuel_type: String,
    pub status: EquipmentStatus,
    pub initial_reading: Option<Decimal>,
}

impl Nozzle {
    #[autometrics]
    pub fn insert(conn: &mut PgConnection, new_nozzle: NewNozzle) -> QueryResult<Nozzle> {
        diesel::insert_into(nozzles::table)
            .values(new_nozzle)
            .get_result(conn)
    }

    #[autometrics]
    pub fn by_id(conn: &mut PgConnection, id: Uuid) -> QueryResult<Option<Nozzle>> {
        nozzles::table.find(id).first::<Nozzle>(conn).optional()
    }

    /// Loads the nozzle row with a row-level lock so that previous-reading
    /// lookup and reading insert are linearizable per nozzle.
    pub fn by_id_locked(conn: &mut PgConnection, id: Uuid) -> QueryResult<Option<Nozzle>> {
        nozzles::table
            .find(id)
            .for_update()
            .first::<Nozzle>(conn)
            .optional()
    }

    pub fn by_number(
        conn: &mut PgConnection,
        pump_id: Uuid,
        nozzle_number: i32,
    ) -> QueryResult<Option<Nozzle>> {
        nozzles::table
            .filter(nozzles::pump_id.eq(pump_id))
            .filter(nozzles::nozzle_number.eq(nozzle_number))
            .first::<Nozzle>(conn)
            .optional()
    }

    pub fn list_for_pump(conn: &mut PgConnection, pump_id: Uuid) -> QueryResult<Vec<Nozzle>> {
        nozzles::table
            .filter(nozzles::pump_id.eq(pump_id))
            .order(nozzles::nozzle_number.asc())
            .load(conn)
    }

    pub fn list_for_station(conn: &mut PgConnection, station_id: Uuid) -> QueryResult<Vec<Nozzle>> {
        nozzles::table
            .filter(nozzles::station_id.eq(station_id))
            .order((nozzles::pump_id.asc(), nozzles::nozzle_number.asc()))
            .load(conn)
    }

    pub fn count_for_pump(conn: &mut PgConnection, pump_id: Uuid) -> QueryResult<i64> {
        nozzles::table
            .filter(nozzles::pump_id.eq(pump_id))
            .count()
            .get_result(conn)
    }

    pub fn update_last_reading(
        conn: &mut PgConnection,
        id: Uuid,
        last_reading: Decimal,
        last_reading_date: Date,
    ) -> Result<()> {
        let affected = diesel::update(nozzles::table.find(id))
            .set((
                nozzles::last_reading.eq(last_reading),
                nozzles::last_reading_date.eq(last_reading_date),
            ))
            .execute(conn)?;

        if affected == 0 {
            bail!("Could not update last reading for nozzle {id}")
        }

        Ok(())
    }
}

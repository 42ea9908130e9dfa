use crate::schema::pumps;
use crate::schema::sql_types::EquipmentStatusType;
use anyhow::bail;
use anyhow::Result;
use autometrics::autometrics;
use diesel::prelude::*;
use diesel::result::QueryResult;
use diesel::AsExpression;
use diesel::FromSqlRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Shared by pumps and nozzles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromSqlRow, AsExpression)]
#[diesel(sql_type = EquipmentStatusType)]
pub enum EquipmentStatus {
    Active,
    Repair,
    Inactive,
}

impl From<EquipmentStatus> for fuelops_commons::status::PumpStatus {
    fn from(value: EquipmentStatus) -> Self {
        match value {
            EquipmentStatus::Active => fuelops_commons::status::PumpStatus::Active,
            EquipmentStatus::Repair => fuelops_commons::status::PumpStatus::Repair,
            EquipmentStatus::Inactive => fuelops_commons::status::PumpStatus::Inactive,
        }
    }
}

impl From<fuelops_commons::status::PumpStatus> for EquipmentStatus {
    fn from(value: fuelops_commons::status::PumpStatus) -> Self {
        match value {
            fuelops_commons::status::PumpStatus::Active => EquipmentStatus::Active,
            fuelops_commons::status::PumpStatus::Repair => EquipmentStatus::Repair,
            fuelops_commons::status::PumpStatus::Inactive => EquipmentStatus::Inactive,
        }
    }
}

#[derive(Queryable, Debug, Clone)]
pub struct Pump {
    pub id: Uuid,
    pub station_id: Uuid,
    pub name: String,
    pub pump_number: i32,
    pub serial_number: Option<String>,
    pub status: EquipmentStatus,
    pub created_at: OffsetDateTime,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = pumps)]
pub struct NewPump {
    pub id: Uuid,
    pub station_id: Uuid,
    pub name: String,
    pub pump_number: i32,
    pub serial_number: Option<String>,
    pub status: EquipmentStatus,
}

impl Pump {
    #[autometrics]
    pub fn insert(conn: &mut PgConnection, new_pump: NewPump) -> QueryResult<Pump> {
        diesel::insert_into(pumps::table)
            .values(new_pump)
            .get_result(conn)
    }

    pub fn by_id(conn: &mut PgConnection, id: Uuid) -> QueryResult<Option<Pump>> {
        pumps::table.find(id).first::<Pump>(conn).optional()
    }

    pub fn by_serial(
        conn: &mut PgConnection,
        station_id: Uuid,
        serial_number: &str,
    ) -> QueryResult<Option<Pump>> {
        pumps::table
            .filter(pumps::station_id.eq(station_id))
            .filter(pumps::serial_number.eq(serial_number))
            .first::<Pump>(conn)
            .optional()
    }

    pub fn list_for_station(conn: &mut PgConnection, station_id: Uuid) -> QueryResult<Vec<Pump>> {
        pumps::table
            .filter(pumps::station_id.eq(station_id))
            .order(pumps::pump_number.asc())
            .load(conn)
    }

    pub fn count_for_station(conn: &mut PgConnection, station_id: Uuid) -> QueryResult<i64> {
        pumps::table
            .filter(pumps::station_id.eq(station_id))
            .count()
            .get_result(conn)
    }

    pub fn next_pump_number(conn: &mut PgConnection, station_id: Uuid) -> QueryResult<i32> {
        let max: Option<i32> = pumps::table
            .filter(pumps::station_id.eq(station_id))
            .select(diesel::dsl::max(pumps::pump_number))
            .first(conn)?;

        Ok(max.unwrap_or(0) + 1)
    }

    pub fn set_status(conn: &mut PgConnection, id: Uuid, status: EquipmentStatus) -> Result<()> {
        let affected = diesel::update(pumps::table.find(id))
            .set(pumps::status.eq(status))
            .execute(conn)?;

        if affected == 0 {
            bail!("Could not update status for pump {id}")
        }

        Ok(())
    }
}

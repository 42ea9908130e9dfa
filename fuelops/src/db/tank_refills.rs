use crate::schema::tank_refills;
use crate::schema::sql_types::RefillEntryTypeType;
use autometrics::autometrics;
use diesel::prelude::*;
use diesel::result::QueryResult;
use diesel::AsExpression;
use diesel::FromSqlRow;
use rust_decimal::Decimal;
use time::Date;
use time::OffsetDateTime;
use time::Time;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromSqlRow, AsExpression)]
#[diesel(sql_type = RefillEntryTypeType)]
pub enum RefillEntryType {
    Refill,
    Adjustment,
    Correction,
    Initial,
}

impl From<fuelops_commons::status::RefillEntryType> for RefillEntryType {
    fn from(value: fuelops_commons::status::RefillEntryType) -> Self {
        match value {
            fuelops_commons::status::RefillEntryType::Refill => RefillEntryType::Refill,
            fuelops_commons::status::RefillEntryType::Adjustment => RefillEntryType::Adjustment,
            fuelops_commons::status::RefillEntryType::Correction => RefillEntryType::Correction,
            fuelops_commons::status::RefillEntryType::Initial => RefillEntryType::Initial,
        }
    }
}

impl From<RefillEntryType> for fuelops_commons::status::RefillEntryType {
    fn from(value: RefillEntryType) -> Self {
        match value {
            RefillEntryType::Refill => fuelops_commons::status::RefillEntryType::Refill,
            RefillEntryType::Adjustment => fuelops_commons::status::RefillEntryType::Adjustment,
            RefillEntryType::Correction => fuelops_commons::status::RefillEntryType::Correction,
            RefillEntryType::Initial => fuelops_commons::status::RefillEntryType::Initial,
        }
    }
}

#[derive(Queryable, Debug, Clone)]
pub struct TankRefill {
    pub id: Uuid,
    pub tank_id: Uuid,
    pub station_id: Uuid,
    pub litres: Decimal,
    pub refill_date: Date,
    pub refill_time: Option<Time>,
    pub cost_per_litre: Option<Decimal>,
    pub total_cost: Option<Decimal>,
    pub supplier: Option<String>,
    pub invoice_number: Option<String>,
    pub vehicle_number: Option<String>,
    pub driver_name: Option<String>,
    pub tank_level_before: Decimal,
    pub tank_level_after: Decimal,
    pub entry_type: RefillEntryType,
    pub is_backdated: bool,
    pub is_verified: bool,
    pub verified_by: Option<Uuid>,
    pub verified_at: Option<OffsetDateTime>,
    pub entered_by: Uuid,
    pub created_at: OffsetDateTime,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = tank_refills)]
pub struct NewTankRefill {
    pub id: Uuid,
    pub tank_id: Uuid,
    pub station_id: Uuid,
    pub litres: Decimal,
    pub refill_date: Date,
    pub refill_time: Option<Time>,
    pub cost_per_litre: Option<Decimal>,
    pub total_cost: Option<Decimal>,
    pub supplier: Option<String>,
    pub invoice_number: Option<String>,
    pub vehicle_number: Option<String>,
    pub driver_name: Option<String>,
    pub tank_level_before: Decimal,
    pub tank_level_after: Decimal,
    pub entry_type: RefillEntryType,
    pub is_backdated: bool,
    pub entered_by: Uuid,
}

impl TankRefill {
    #[autometrics]
    pub fn insert(conn: &mut PgConnection, new_refill: NewTankRefill) -> QueryResult<TankRefill> {
        diesel::insert_into(tank_refills::table)
            .values(new_refill)
            .get_result(conn)
    }

    pub fn by_id(conn: &mut PgConnection, id: Uuid) -> QueryResult<Option<TankRefill>> {
        tank_refills::table
            .find(id)
            .first::<TankRefill>(conn)
            .optional()
    }

    pub fn for_tank(conn: &mut PgConnection, tank_id: Uuid) -> QueryResult<Vec<TankRefill>> {
        tank_refills::table
            .filter(tank_refills::tank_id.eq(tank_id))
            .order((
                tank_refills::refill_date.desc(),
                tank_refills::created_at.desc(),
            ))
            .load(conn)
    }

    pub fn for_station_between(
        conn: &mut PgConnection,
        station_id: Uuid,
        from: Date,
        to: Date,
    ) -> QueryResult<Vec<TankRefill>> {
        tank_refills::table
            .filter(tank_refills::station_id.eq(station_id))
            .filter(tank_refills::refill_date.ge(from))
            .filter(tank_refills::refill_date.le(to))
            .order(tank_refills::refill_date.asc())
            .load(conn)
    }

    pub fn mark_verified(conn: &mut PgConnection, id: Uuid, verified_by: Uuid) -> QueryResult<usize> {
        diesel::update(tank_refills::table.find(id))
            .set((
                tank_refills::is_verified.eq(true),
                tank_refills::verified_by.eq(Some(verified_by)),
                tank_refills::verified_at.eq(Some(OffsetDateTime::now_utc())),
            ))
            .execute(conn)
    }

    pub fn delete(conn: &mut PgConnection, id: Uuid) -> QueryResult<usize> {
        diesel::delete(tank_refills::table.find(id)).execute(conn)
    }
}

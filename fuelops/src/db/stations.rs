use crate::schema::stations;
use anyhow::bail;
use anyhow::Result;
use autometrics::autometrics;
use diesel::prelude::*;
use diesel::result::QueryResult;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Queryable, Debug, Clone)]
pub struct Station {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub owner_id: Uuid,
    pub brand: Option<String>,
    pub shift_required_for_reading: bool,
    pub missed_reading_alert_days: Option<i32>,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = stations)]
pub struct NewStation {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub owner_id: Uuid,
    pub brand: Option<String>,
    pub shift_required_for_reading: bool,
    pub missed_reading_alert_days: Option<i32>,
}

impl Station {
    #[autometrics]
    pub fn insert(conn: &mut PgConnection, new_station: NewStation) -> QueryResult<Station> {
        diesel::insert_into(stations::table)
            .values(new_station)
            .get_result(conn)
    }

    #[autometrics]
    pub fn by_id(conn: &mut PgConnection, id: Uuid) -> QueryResult<Option<Station>> {
        stations::table.find(id).first::<Station>(conn).optional()
    }

    /// Station-day writes (transaction grouping, handover sequencing) are
    /// serialized by taking the station row lock first.
    pub fn by_id_locked(conn: &mut PgConnection, id: Uuid) -> QueryResult<Option<Station>> {
        stations::table
            .find(id)
            .for_update()
            .first::<Station>(conn)
            .optional()
    }

    pub fn by_code(conn: &mut PgConnection, code: &str) -> QueryResult<Option<Station>> {
        stations::table
            .filter(stations::code.eq(code))
            .first::<Station>(conn)
            .optional()
    }

    pub fn owned_by(conn: &mut PgConnection, owner_id: Uuid) -> QueryResult<Vec<Station>> {
        stations::table
            .filter(stations::owner_id.eq(owner_id))
            .order(stations::created_at.asc())
            .load(conn)
    }

    pub fn all_active(conn: &mut PgConnection) -> QueryResult<Vec<Station>> {
        stations::table
            .filter(stations::is_active.eq(true))
            .order(stations::created_at.asc())
            .load(conn)
    }

    pub fn count_for_owner(conn: &mut PgConnection, owner_id: Uuid) -> QueryResult<i64> {
        stations::table
            .filter(stations::owner_id.eq(owner_id))
            .filter(stations::is_active.eq(true))
            .count()
            .get_result(conn)
    }

    pub fn set_active(conn: &mut PgConnection, id: Uuid, active: bool) -> Result<()> {
        let affected = diesel::update(stations::table.find(id))
            .set(stations::is_active.eq(active))
            .execute(conn)?;

        if affected == 0 {
            bail!("Could not set active = {active} for station {id}")
        }

        Ok(())
    }
}

use crate::schema::creditors;
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
pub struct Creditor {
    pub id: Uuid,
    pub station_id: Uuid,
    pub name: String,
    pub business_name: Option<String>,
    pub contact: Option<String>,
    pub credit_limit: Decimal,
    pub credit_period_days: i32,
    pub current_balance: Decimal,
    pub aging_0_30: Decimal,
    pub aging_31_60: Decimal,
    pub aging_61_90: Decimal,
    pub aging_over_90: Decimal,
    pub last_transaction_date: Option<Date>,
    pub last_payment_date: Option<Date>,
    pub is_flagged: bool,
    pub flag_reason: Option<String>,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = creditors)]
pub struct NewCreditor {
    pub id: Uuid,
    pub station_id: Uuid,
    pub name: String,
    pub business_name: Option<String>,
    pub contact: Option<String>,
    pub credit_limit: Decimal,
    pub credit_period_days: i32,
}

pub struct AgingUpdate {
    pub aging_0_30: Decimal,
    pub aging_31_60: Decimal,
    pub aging_61_90: Decimal,
    pub aging_over_90: Decimal,
}

impl Creditor {
    #[autometrics]
    pub fn insert(conn: &mut PgConnection, new_creditor: NewCreditor) -> QueryResult<Creditor> {
        diesel::insert_into(creditors::table)
            .values(new_creditor)
            .get_result(conn)
    }

    pub fn by_id(conn: &mut PgConnection, id: Uuid) -> QueryResult<Option<Creditor>> {
        creditors::table.find(id).first::<Creditor>(conn).optional()
    }

    /// Locks the creditor row; balance updates must be serialized per
    /// creditor.
    pub fn by_id_locked(conn: &mut PgConnection, id: Uuid) -> QueryResult<Option<Creditor>> {
        creditors::table
            .find(id)
            .for_update()
            .first::<Creditor>(conn)
            .optional()
    }

    pub fn list_for_station(
        conn: &mut PgConnection,
        station_id: Uuid,
        only_active: bool,
    ) -> QueryResult<Vec<Creditor>> {
        let mut query = creditors::table
            .filter(creditors::station_id.eq(station_id))
            .into_boxed();

        if only_active {
            query = query.filter(creditors::is_active.eq(true));
        }

        query.order(creditors::name.asc()).load(conn)
    }

    pub fn count_for_owner(conn: &mut PgConnection, owner_id: Uuid) -> QueryResult<i64> {
        use crate::schema::stations;

        creditors::table
            .inner_join(stations::table.on(stations::id.eq(creditors::station_id)))
            .filter(stations::owner_id.eq(owner_id))
            .filter(creditors::is_active.eq(true))
            .count()
            .get_result(conn)
    }

    pub fn update_balance(
        conn: &mut PgConnection,
        id: Uuid,
        balance: Decimal,
        last_transaction_date: Option<Date>,
        last_payment_date: Option<Date>,
    ) -> Result<()> {
        let affected = diesel::update(creditors::table.find(id))
            .set((
                creditors::current_balance.eq(balance),
                creditors::last_transaction_date.eq(last_transaction_date),
                creditors::last_payment_date.eq(last_payment_date),
            ))
            .execute(conn)?;

        if affected == 0 {
            bail!("Could not update balance for creditor {id}")
        }

        Ok(())
    }

    pub fn update_aging(conn: &mut PgConnection, id: Uuid, aging: AgingUpdate) -> Result<()> {
        let affected = diesel::update(creditors::table.find(id))
            .set((
                creditors::aging_0_30.eq(aging.aging_0_30),
                creditors::aging_31_60.eq(aging.aging_31_60),
                creditors::aging_61_90.eq(aging.aging_61_90),
                creditors::aging_over_90.eq(aging.aging_over_90),
            ))
            .execute(conn)?;

        if affected == 0 {
            bail!("Could not update aging for creditor {id}")
        }

        Ok(())
    }

    pub fn set_flag(
        conn: &mut PgConnection,
        id: Uuid,
        flagged: bool,
        reason: Option<String>,
    ) -> Result<()> {
        let affected = diesel::update(creditors::table.find(id))
            .set((
                creditors::is_flagged.eq(flagged),
                creditors::flag_reason.eq(reason),
            ))
            .execute(conn)?;

        if affected == 0 {
            bail!("Could not flag creditor {id}")
        }

        Ok(())
    }

    pub fn all_with_balance(conn: &mut PgConnection) -> QueryResult<Vec<Creditor>> {
        creditors::table
            .filter(creditors::current_balance.gt(Decimal::ZERO))
            .load(conn)
    }
}

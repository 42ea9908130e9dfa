use crate::schema::settlement_shortfalls;
use crate::schema::settlements;
use crate::schema::sql_types::SettlementStatusType;
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
#[diesel(sql_type = SettlementStatusType)]
pub enum SettlementStatus {
    Draft,
    Final,
    Locked,
}

impl From<SettlementStatus> for fuelops_commons::status::SettlementStatus {
    fn from(value: SettlementStatus) -> Self {
        match value {
            SettlementStatus::Draft => fuelops_commons::status::SettlementStatus::Draft,
            SettlementStatus::Final => fuelops_commons::status::SettlementStatus::Final,
            SettlementStatus::Locked => fuelops_commons::status::SettlementStatus::Locked,
        }
    }
}

#[derive(Queryable, Debug, Clone)]
pub struct Settlement {
    pub id: Uuid,
    pub station_id: Uuid,
    pub settlement_date: Date,
    pub expected_cash: Decimal,
    pub actual_cash: Option<Decimal>,
    pub variance: Option<Decimal>,
    pub reported_cash: Decimal,
    pub reported_online: Decimal,
    pub reported_credit: Decimal,
    pub confirmed_online: Option<Decimal>,
    pub confirmed_credit: Option<Decimal>,
    pub variance_online: Option<Decimal>,
    pub variance_credit: Option<Decimal>,
    pub status: SettlementStatus,
    pub finalized_at: Option<OffsetDateTime>,
    pub created_by: Uuid,
    pub created_at: OffsetDateTime,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = settlements)]
pub struct NewSettlement {
    pub id: Uuid,
    pub station_id: Uuid,
    pub settlement_date: Date,
    pub expected_cash: Decimal,
    pub reported_cash: Decimal,
    pub reported_online: Decimal,
    pub reported_credit: Decimal,
    pub status: SettlementStatus,
    pub created_by: Uuid,
}

#[derive(Queryable, Debug, Clone)]
pub struct SettlementShortfall {
    pub id: Uuid,
    pub settlement_id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub shortfall: Decimal,
    pub reading_count: i32,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = settlement_shortfalls)]
pub struct NewSettlementShortfall {
    pub id: Uuid,
    pub settlement_id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub shortfall: Decimal,
    pub reading_count: i32,
}

impl Settlement {
    #[autometrics]
    pub fn insert(conn: &mut PgConnection, new_settlement: NewSettlement) -> QueryResult<Settlement> {
        diesel::insert_into(settlements::table)
            .values(new_settlement)
            .get_result(conn)
    }

    pub fn by_id(conn: &mut PgConnection, id: Uuid) -> QueryResult<Option<Settlement>> {
        settlements::table
            .find(id)
            .first::<Settlement>(conn)
            .optional()
    }

    pub fn by_station_date(
        conn: &mut PgConnection,
        station_id: Uuid,
        date: Date,
    ) -> QueryResult<Option<Settlement>> {
        settlements::table
            .filter(settlements::station_id.eq(station_id))
            .filter(settlements::settlement_date.eq(date))
            .first::<Settlement>(conn)
            .optional()
    }

    pub fn for_station(
        conn: &mut PgConnection,
        station_id: Uuid,
        from: Option<Date>,
        to: Option<Date>,
    ) -> QueryResult<Vec<Settlement>> {
        let mut query = settlements::table
            .filter(settlements::station_id.eq(station_id))
            .into_boxed();

        if let Some(from) = from {
            query = query.filter(settlements::settlement_date.ge(from));
        }
        if let Some(to) = to {
            query = query.filter(settlements::settlement_date.le(to));
        }

        query.order(settlements::settlement_date.desc()).load(conn)
    }

    pub fn finalize(
        conn: &mut PgConnection,
        id: Uuid,
        actual_cash: Decimal,
        variance: Decimal,
        confirmed_online: Option<Decimal>,
        confirmed_credit: Option<Decimal>,
        variance_online: Option<Decimal>,
        variance_credit: Option<Decimal>,
    ) -> Result<Settlement> {
        let settlement = diesel::update(settlements::table.find(id))
            .set((
                settlements::actual_cash.eq(Some(actual_cash)),
                settlements::variance.eq(Some(variance)),
                settlements::confirmed_online.eq(confirmed_online),
                settlements::confirmed_credit.eq(confirmed_credit),
                settlements::variance_online.eq(variance_online),
                settlements::variance_credit.eq(variance_credit),
                settlements::status.eq(SettlementStatus::Final),
                settlements::finalized_at.eq(Some(OffsetDateTime::now_utc())),
            ))
            .get_result(conn)?;

        Ok(settlement)
    }

    pub fn lock(conn: &mut PgConnection, id: Uuid) -> Result<()> {
        let affected = diesel::update(settlements::table.find(id))
            .filter(settlements::status.eq(SettlementStatus::Final))
            .set(settlements::status.eq(SettlementStatus::Locked))
            .execute(conn)?;

        if affected == 0 {
            bail!("Settlement {id} is not final; cannot lock")
        }

        Ok(())
    }
}

impl SettlementShortfall {
    pub fn insert(
        conn: &mut PgConnection,
        row: NewSettlementShortfall,
    ) -> QueryResult<SettlementShortfall> {
        diesel::insert_into(settlement_shortfalls::table)
            .values(row)
            .get_result(conn)
    }

    pub fn for_settlement(
        conn: &mut PgConnection,
        settlement_id: Uuid,
    ) -> QueryResult<Vec<SettlementShortfall>> {
        settlement_shortfalls::table
            .filter(settlement_shortfalls::settlement_id.eq(settlement_id))
            .load(conn)
    }
}

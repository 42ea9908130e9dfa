use crate::schema::daily_transactions;
use crate::schema::transaction_credit_allocations;
use crate::schema::sql_types::TransactionStatusType;
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
#[diesel(sql_type = TransactionStatusType)]
pub enum TransactionStatus {
    Draft,
    Submitted,
    Settled,
    Cancelled,
}

impl From<TransactionStatus> for fuelops_commons::status::TransactionStatus {
    fn from(value: TransactionStatus) -> Self {
        match value {
            TransactionStatus::Draft => fuelops_commons::status::TransactionStatus::Draft,
            TransactionStatus::Submitted => fuelops_commons::status::TransactionStatus::Submitted,
            TransactionStatus::Settled => fuelops_commons::status::TransactionStatus::Settled,
            TransactionStatus::Cancelled => fuelops_commons::status::TransactionStatus::Cancelled,
        }
    }
}

#[derive(Queryable, Debug, Clone)]
pub struct DailyTransaction {
    pub id: Uuid,
    pub station_id: Uuid,
    pub transaction_date: Date,
    pub total_litres: Decimal,
    pub total_sale_value: Decimal,
    pub payment_cash: Decimal,
    pub payment_online: Decimal,
    pub payment_credit: Decimal,
    pub status: TransactionStatus,
    pub settlement_id: Option<Uuid>,
    pub notes: Option<String>,
    pub created_by: Uuid,
    pub created_at: OffsetDateTime,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = daily_transactions)]
pub struct NewDailyTransaction {
    pub id: Uuid,
    pub station_id: Uuid,
    pub transaction_date: Date,
    pub total_litres: Decimal,
    pub total_sale_value: Decimal,
    pub payment_cash: Decimal,
    pub payment_online: Decimal,
    pub payment_credit: Decimal,
    pub status: TransactionStatus,
    pub notes: Option<String>,
    pub created_by: Uuid,
}

#[derive(Queryable, Debug, Clone)]
pub struct CreditAllocationRow {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub creditor_id: Uuid,
    pub amount: Decimal,
    pub seq: i32,
    pub credit_transaction_id: Option<Uuid>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = transaction_credit_allocations)]
pub struct NewCreditAllocationRow {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub creditor_id: Uuid,
    pub amount: Decimal,
    pub seq: i32,
    pub credit_transaction_id: Option<Uuid>,
}

impl DailyTransaction {
    #[autometrics]
    pub fn insert(
        conn: &mut PgConnection,
        new_transaction: NewDailyTransaction,
    ) -> QueryResult<DailyTransaction> {
        diesel::insert_into(daily_transactions::table)
            .values(new_transaction)
            .get_result(conn)
    }

    pub fn by_id(conn: &mut PgConnection, id: Uuid) -> QueryResult<Option<DailyTransaction>> {
        daily_transactions::table
            .find(id)
            .first::<DailyTransaction>(conn)
            .optional()
    }

    pub fn for_station(
        conn: &mut PgConnection,
        station_id: Uuid,
        from: Option<Date>,
        to: Option<Date>,
    ) -> QueryResult<Vec<DailyTransaction>> {
        let mut query = daily_transactions::table
            .filter(daily_transactions::station_id.eq(station_id))
            .into_boxed();

        if let Some(from) = from {
            query = query.filter(daily_transactions::transaction_date.ge(from));
        }
        if let Some(to) = to {
            query = query.filter(daily_transactions::transaction_date.le(to));
        }

        query
            .order(daily_transactions::transaction_date.desc())
            .load(conn)
    }

    /// Active (non-cancelled) transactions for a station day; used to guard
    /// against double-attaching readings.
    pub fn active_for_station_date(
        conn: &mut PgConnection,
        station_id: Uuid,
        date: Date,
    ) -> QueryResult<Vec<DailyTransaction>> {
        daily_transactions::table
            .filter(daily_transactions::station_id.eq(station_id))
            .filter(daily_transactions::transaction_date.eq(date))
            .filter(daily_transactions::status.ne(TransactionStatus::Cancelled))
            .load(conn)
    }

    pub fn update_payments(
        conn: &mut PgConnection,
        id: Uuid,
        payment_cash: Decimal,
        payment_online: Decimal,
        payment_credit: Decimal,
        notes: Option<String>,
    ) -> Result<DailyTransaction> {
        let transaction = diesel::update(daily_transactions::table.find(id))
            .set((
                daily_transactions::payment_cash.eq(payment_cash),
                daily_transactions::payment_online.eq(payment_online),
                daily_transactions::payment_credit.eq(payment_credit),
                daily_transactions::notes.eq(notes),
            ))
            .get_result(conn)?;

        Ok(transaction)
    }

    pub fn set_status(
        conn: &mut PgConnection,
        id: Uuid,
        status: TransactionStatus,
    ) -> Result<()> {
        let affected = diesel::update(daily_transactions::table.find(id))
            .set(daily_transactions::status.eq(status))
            .execute(conn)?;

        if affected == 0 {
            bail!("Could not update status for transaction {id}")
        }

        Ok(())
    }

    pub fn set_settlement(
        conn: &mut PgConnection,
        id: Uuid,
        settlement_id: Uuid,
    ) -> Result<()> {
        let affected = diesel::update(daily_transactions::table.find(id))
            .set((
                daily_transactions::settlement_id.eq(Some(settlement_id)),
                daily_transactions::status.eq(TransactionStatus::Settled),
            ))
            .execute(conn)?;

        if affected == 0 {
            bail!("Could not link transaction {id} to settlement {settlement_id}")
        }

        Ok(())
    }
}

impl CreditAllocationRow {
    pub fn insert(
        conn: &mut PgConnection,
        row: NewCreditAllocationRow,
    ) -> QueryResult<CreditAllocationRow> {
        diesel::insert_into(transaction_credit_allocations::table)
            .values(row)
            .get_result(conn)
    }

    pub fn for_transaction(
        conn: &mut PgConnection,
        transaction_id: Uuid,
    ) -> QueryResult<Vec<CreditAllocationRow>> {
        transaction_credit_allocations::table
            .filter(transaction_credit_allocations::transaction_id.eq(transaction_id))
            .order(transaction_credit_allocations::seq.asc())
            .load(conn)
    }

    pub fn delete_for_transaction(conn: &mut PgConnection, transaction_id: Uuid) -> Result<usize> {
        let affected = diesel::delete(
            transaction_credit_allocations::table
                .filter(transaction_credit_allocations::transaction_id.eq(transaction_id)),
        )
        .execute(conn)?;

        Ok(affected)
    }
}

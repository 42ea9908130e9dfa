use crate::schema::credit_settlement_links;
use crate::schema::credit_transactions;
use crate::schema::sql_types::CreditEntryTypeType;
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
#[diesel(sql_type = CreditEntryTypeType)]
pub enum CreditEntryType {
    Credit,
    Settlement,
}

impl From<CreditEntryType> for fuelops_commons::status::CreditTransactionType {
    fn from(value: CreditEntryType) -> Self {
        match value {
            CreditEntryType::Credit => fuelops_commons::status::CreditTransactionType::Credit,
            CreditEntryType::Settlement => {
                fuelops_commons::status::CreditTransactionType::Settlement
            }
        }
    }
}

#[derive(Queryable, Debug, Clone)]
pub struct CreditTransaction {
    pub id: Uuid,
    pub station_id: Uuid,
    pub creditor_id: Uuid,
    pub transaction_type: CreditEntryType,
    pub amount: Decimal,
    pub fuel_type: Option<String>,
    pub litres: Option<Decimal>,
    pub price_per_litre: Option<Decimal>,
    pub reading_id: Option<Uuid>,
    pub invoice_number: Option<String>,
    pub vehicle_number: Option<String>,
    pub transaction_date: Date,
    pub entered_by: Uuid,
    pub created_at: OffsetDateTime,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = credit_transactions)]
pub struct NewCreditTransaction {
    pub id: Uuid,
    pub station_id: Uuid,
    pub creditor_id: Uuid,
    pub transaction_type: CreditEntryType,
    pub amount: Decimal,
    pub fuel_type: Option<String>,
    pub litres: Option<Decimal>,
    pub price_per_litre: Option<Decimal>,
    pub reading_id: Option<Uuid>,
    pub invoice_number: Option<String>,
    pub vehicle_number: Option<String>,
    pub transaction_date: Date,
    pub entered_by: Uuid,
}

#[derive(Queryable, Debug, Clone)]
pub struct SettlementLink {
    pub id: Uuid,
    pub settlement_transaction_id: Uuid,
    pub credit_transaction_id: Uuid,
    pub amount: Decimal,
    pub created_at: OffsetDateTime,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = credit_settlement_links)]
pub struct NewSettlementLink {
    pub id: Uuid,
    pub settlement_transaction_id: Uuid,
    pub credit_transaction_id: Uuid,
    pub amount: Decimal,
}

impl CreditTransaction {
    #[autometrics]
    pub fn insert(
        conn: &mut PgConnection,
        new_transaction: NewCreditTransaction,
    ) -> QueryResult<CreditTransaction> {
        diesel::insert_into(credit_transactions::table)
            .values(new_transaction)
            .get_result(conn)
    }

    pub fn by_id(conn: &mut PgConnection, id: Uuid) -> QueryResult<Option<CreditTransaction>> {
        credit_transactions::table
            .find(id)
            .first::<CreditTransaction>(conn)
            .optional()
    }

    pub fn for_creditor(
        conn: &mut PgConnection,
        creditor_id: Uuid,
    ) -> QueryResult<Vec<CreditTransaction>> {
        credit_transactions::table
            .filter(credit_transactions::creditor_id.eq(creditor_id))
            .order((
                credit_transactions::transaction_date.asc(),
                credit_transactions::created_at.asc(),
            ))
            .load(conn)
    }

    /// Outstanding `credit` rows for a creditor, oldest first, for the
    /// FIFO allocation policy.
    pub fn credits_oldest_first(
        conn: &mut PgConnection,
        creditor_id: Uuid,
    ) -> QueryResult<Vec<CreditTransaction>> {
        credit_transactions::table
            .filter(credit_transactions::creditor_id.eq(creditor_id))
            .filter(credit_transactions::transaction_type.eq(CreditEntryType::Credit))
            .order((
                credit_transactions::transaction_date.asc(),
                credit_transactions::created_at.asc(),
            ))
            .load(conn)
    }

    pub fn sum_by_type(
        conn: &mut PgConnection,
        creditor_id: Uuid,
        transaction_type: CreditEntryType,
    ) -> QueryResult<Decimal> {
        let total: Option<Decimal> = credit_transactions::table
            .filter(credit_transactions::creditor_id.eq(creditor_id))
            .filter(credit_transactions::transaction_type.eq(transaction_type))
            .select(diesel::dsl::sum(credit_transactions::amount))
            .first(conn)?;

        Ok(total.unwrap_or(Decimal::ZERO))
    }

    pub fn delete(conn: &mut PgConnection, id: Uuid) -> QueryResult<usize> {
        diesel::delete(credit_transactions::table.find(id)).execute(conn)
    }
}

impl SettlementLink {
    pub fn insert(conn: &mut PgConnection, link: NewSettlementLink) -> QueryResult<SettlementLink> {
        diesel::insert_into(credit_settlement_links::table)
            .values(link)
            .get_result(conn)
    }

    pub fn for_settlement_transaction(
        conn: &mut PgConnection,
        settlement_transaction_id: Uuid,
    ) -> QueryResult<Vec<SettlementLink>> {
        credit_settlement_links::table
            .filter(
                credit_settlement_links::settlement_transaction_id.eq(settlement_transaction_id),
            )
            .load(conn)
    }

    pub fn for_credit_transaction(
        conn: &mut PgConnection,
        credit_transaction_id: Uuid,
    ) -> QueryResult<Vec<SettlementLink>> {
        credit_settlement_links::table
            .filter(credit_settlement_links::credit_transaction_id.eq(credit_transaction_id))
            .load(conn)
    }

    /// Total already allocated against a credit invoice.
    pub fn allocated_against(
        conn: &mut PgConnection,
        credit_transaction_id: Uuid,
    ) -> QueryResult<Decimal> {
        let total: Option<Decimal> = credit_settlement_links::table
            .filter(credit_settlement_links::credit_transaction_id.eq(credit_transaction_id))
            .select(diesel::dsl::sum(credit_settlement_links::amount))
            .first(conn)?;

        Ok(total.unwrap_or(Decimal::ZERO))
    }

    pub fn delete_for_settlement_transaction(
        conn: &mut PgConnection,
        settlement_transaction_id: Uuid,
    ) -> QueryResult<usize> {
        diesel::delete(
            credit_settlement_links::table.filter(
                credit_settlement_links::settlement_transaction_id.eq(settlement_transaction_id),
            ),
        )
        .execute(conn)
    }
}

use crate::schema::expenses;
use autometrics::autometrics;
use diesel::prelude::*;
use diesel::result::QueryResult;
use rust_decimal::Decimal;
use time::Date;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Queryable, Debug, Clone)]
pub struct Expense {
    pub id: Uuid,
    pub station_id: Uuid,
    pub category: String,
    pub description: Option<String>,
    pub amount: Decimal,
    pub expense_date: Date,
    pub expense_month: String,
    pub receipt_number: Option<String>,
    pub payment_method: Option<String>,
    pub entered_by: Uuid,
    pub created_at: OffsetDateTime,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = expenses)]
pub struct NewExpense {
    pub id: Uuid,
    pub station_id: Uuid,
    pub category: String,
    pub description: Option<String>,
    pub amount: Decimal,
    pub expense_date: Date,
    pub expense_month: String,
    pub receipt_number: Option<String>,
    pub payment_method: Option<String>,
    pub entered_by: Uuid,
}

impl Expense {
    #[autometrics]
    pub fn insert(conn: &mut PgConnection, new_expense: NewExpense) -> QueryResult<Expense> {
        diesel::insert_into(expenses::table)
            .values(new_expense)
            .get_result(conn)
    }

    pub fn by_id(conn: &mut PgConnection, id: Uuid) -> QueryResult<Option<Expense>> {
        expenses::table.find(id).first::<Expense>(conn).optional()
    }

    pub fn for_station(
        conn: &mut PgConnection,
        station_id: Uuid,
        from: Option<Date>,
        to: Option<Date>,
    ) -> QueryResult<Vec<Expense>> {
        let mut query = expenses::table
            .filter(expenses::station_id.eq(station_id))
            .into_boxed();

        if let Some(from) = from {
            query = query.filter(expenses::expense_date.ge(from));
        }
        if let Some(to) = to {
            query = query.filter(expenses::expense_date.le(to));
        }

        query.order(expenses::expense_date.desc()).load(conn)
    }

    pub fn total_between(
        conn: &mut PgConnection,
        station_id: Uuid,
        from: Date,
        to: Date,
    ) -> QueryResult<Decimal> {
        let total: Option<Decimal> = expenses::table
            .filter(expenses::station_id.eq(station_id))
            .filter(expenses::expense_date.ge(from))
            .filter(expenses::expense_date.le(to))
            .select(diesel::dsl::sum(expenses::amount))
            .first(conn)?;

        Ok(total.unwrap_or(Decimal::ZERO))
    }

    pub fn delete(conn: &mut PgConnection, id: Uuid) -> QueryResult<usize> {
        diesel::delete(expenses::table.find(id)).execute(conn)
    }
}

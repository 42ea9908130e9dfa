use crate::schema::shifts;
use crate::schema::sql_types::ShiftStatusType;
use crate::schema::sql_types::ShiftTypeType;
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
use time::Time;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromSqlRow, AsExpression)]
#[diesel(sql_type = ShiftTypeType)]
pub enum ShiftType {
    Morning,
    Afternoon,
    Night,
    FullDay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromSqlRow, AsExpression)]
#[diesel(sql_type = ShiftStatusType)]
pub enum ShiftStatus {
    Active,
    Ended,
    Cancelled,
}

impl From<fuelops_commons::status::ShiftType> for ShiftType {
    fn from(value: fuelops_commons::status::ShiftType) -> Self {
        match value {
            fuelops_commons::status::ShiftType::Morning => ShiftType::Morning,
            fuelops_commons::status::ShiftType::Afternoon => ShiftType::Afternoon,
            fuelops_commons::status::ShiftType::Night => ShiftType::Night,
            fuelops_commons::status::ShiftType::FullDay => ShiftType::FullDay,
        }
    }
}

impl From<ShiftType> for fuelops_commons::status::ShiftType {
    fn from(value: ShiftType) -> Self {
        match value {
            ShiftType::Morning => fuelops_commons::status::ShiftType::Morning,
            ShiftType::Afternoon => fuelops_commons::status::ShiftType::Afternoon,
            ShiftType::Night => fuelops_commons::status::ShiftType::Night,
            ShiftType::FullDay => fuelops_commons::status::ShiftType::FullDay,
        }
    }
}

impl From<ShiftStatus> for fuelops_commons::status::ShiftStatus {
    fn from(value: ShiftStatus) -> Self {
        match value {
            ShiftStatus::Active => fuelops_commons::status::ShiftStatus::Active,
            ShiftStatus::Ended => fuelops_commons::status::ShiftStatus::Ended,
            ShiftStatus::Cancelled => fuelops_commons::status::ShiftStatus::Cancelled,
        }
    }
}

#[derive(Queryable, Debug, Clone)]
pub struct Shift {
    pub id: Uuid,
    pub station_id: Uuid,
    pub employee_id: Uuid,
    pub shift_date: Date,
    pub start_time: Time,
    pub end_time: Option<Time>,
    pub shift_type: ShiftType,
    pub opening_cash: Decimal,
    pub cash_collected: Option<Decimal>,
    pub online_collected: Option<Decimal>,
    pub expected_cash: Option<Decimal>,
    pub cash_difference: Option<Decimal>,
    pub readings_count: i32,
    pub total_litres_sold: Decimal,
    pub total_sales_amount: Decimal,
    pub status: ShiftStatus,
    pub ended_by: Option<Uuid>,
    pub notes: Option<String>,
    pub end_notes: Option<String>,
    pub created_at: OffsetDateTime,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = shifts)]
pub struct NewShift {
    pub id: Uuid,
    pub station_id: Uuid,
    pub employee_id: Uuid,
    pub shift_date: Date,
    pub start_time: Time,
    pub shift_type: ShiftType,
    pub opening_cash: Decimal,
    pub status: ShiftStatus,
    pub notes: Option<String>,
}

pub struct ShiftTotals {
    pub end_time: Time,
    pub cash_collected: Decimal,
    pub online_collected: Decimal,
    pub expected_cash: Decimal,
    pub cash_difference: Decimal,
    pub readings_count: i32,
    pub total_litres_sold: Decimal,
    pub total_sales_amount: Decimal,
    pub ended_by: Uuid,
    pub end_notes: Option<String>,
}

impl Shift {
    #[autometrics]
    pub fn insert(conn: &mut PgConnection, new_shift: NewShift) -> QueryResult<Shift> {
        diesel::insert_into(shifts::table)
            .values(new_shift)
            .get_result(conn)
    }

    pub fn by_id(conn: &mut PgConnection, id: Uuid) -> QueryResult<Option<Shift>> {
        shifts::table.find(id).first::<Shift>(conn).optional()
    }

    pub fn active_for_employee(
        conn: &mut PgConnection,
        employee_id: Uuid,
    ) -> QueryResult<Option<Shift>> {
        shifts::table
            .filter(shifts::employee_id.eq(employee_id))
            .filter(shifts::status.eq(ShiftStatus::Active))
            .first::<Shift>(conn)
            .optional()
    }

    pub fn for_station_on(
        conn: &mut PgConnection,
        station_id: Uuid,
        date: Date,
    ) -> QueryResult<Vec<Shift>> {
        shifts::table
            .filter(shifts::station_id.eq(station_id))
            .filter(shifts::shift_date.eq(date))
            .order(shifts::start_time.asc())
            .load(conn)
    }

    pub fn end(conn: &mut PgConnection, id: Uuid, totals: ShiftTotals) -> Result<Shift> {
        let shift: Shift = diesel::update(shifts::table.find(id))
            .filter(shifts::status.eq(ShiftStatus::Active))
            .set((
                shifts::end_time.eq(Some(totals.end_time)),
                shifts::cash_collected.eq(Some(totals.cash_collected)),
                shifts::online_collected.eq(Some(totals.online_collected)),
                shifts::expected_cash.eq(Some(totals.expected_cash)),
                shifts::cash_difference.eq(Some(totals.cash_difference)),
                shifts::readings_count.eq(totals.readings_count),
                shifts::total_litres_sold.eq(totals.total_litres_sold),
                shifts::total_sales_amount.eq(totals.total_sales_amount),
                shifts::status.eq(ShiftStatus::Ended),
                shifts::ended_by.eq(Some(totals.ended_by)),
                shifts::end_notes.eq(totals.end_notes),
            ))
            .get_result(conn)?;

        Ok(shift)
    }

    pub fn cancel(conn: &mut PgConnection, id: Uuid, cancelled_by: Uuid) -> Result<()> {
        let affected = diesel::update(shifts::table.find(id))
            .filter(shifts::status.eq(ShiftStatus::Active))
            .set((
                shifts::status.eq(ShiftStatus::Cancelled),
                shifts::ended_by.eq(Some(cancelled_by)),
            ))
            .execute(conn)?;

        if affected == 0 {
            bail!("Shift {id} is not active; cannot cancel")
        }

        Ok(())
    }
}

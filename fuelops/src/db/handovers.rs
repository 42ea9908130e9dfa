use crate::schema::cash_handovers;
use crate::schema::sql_types::HandoverStatusType;
use crate::schema::sql_types::HandoverTypeType;
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
#[diesel(sql_type = HandoverTypeType)]
pub enum HandoverType {
    ShiftCollection,
    EmployeeToManager,
    ManagerToOwner,
    DepositToBank,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromSqlRow, AsExpression)]
#[diesel(sql_type = HandoverStatusType)]
pub enum HandoverStatus {
    Pending,
    Confirmed,
    Disputed,
    Resolved,
}

impl From<HandoverType> for fuelops_commons::status::HandoverType {
    fn from(value: HandoverType) -> Self {
        match value {
            HandoverType::ShiftCollection => {
                fuelops_commons::status::HandoverType::ShiftCollection
            }
            HandoverType::EmployeeToManager => {
                fuelops_commons::status::HandoverType::EmployeeToManager
            }
            HandoverType::ManagerToOwner => fuelops_commons::status::HandoverType::ManagerToOwner,
            HandoverType::DepositToBank => fuelops_commons::status::HandoverType::DepositToBank,
        }
    }
}

impl From<fuelops_commons::status::HandoverType> for HandoverType {
    fn from(value: fuelops_commons::status::HandoverType) -> Self {
        match value {
            fuelops_commons::status::HandoverType::ShiftCollection => {
                HandoverType::ShiftCollection
            }
            fuelops_commons::status::HandoverType::EmployeeToManager => {
                HandoverType::EmployeeToManager
            }
            fuelops_commons::status::HandoverType::ManagerToOwner => HandoverType::ManagerToOwner,
            fuelops_commons::status::HandoverType::DepositToBank => HandoverType::DepositToBank,
        }
    }
}

impl From<HandoverStatus> for fuelops_commons::status::HandoverStatus {
    fn from(value: HandoverStatus) -> Self {
        match value {
            HandoverStatus::Pending => fuelops_commons::status::HandoverStatus::Pending,
            HandoverStatus::Confirmed => fuelops_commons::status::HandoverStatus::Confirmed,
            HandoverStatus::Disputed => fuelops_commons::status::HandoverStatus::Disputed,
            HandoverStatus::Resolved => fuelops_commons::status::HandoverStatus::Resolved,
        }
    }
}

#[derive(Queryable, Debug, Clone)]
pub struct CashHandover {
    pub id: Uuid,
    pub station_id: Uuid,
    pub handover_type: HandoverType,
    pub handover_date: Date,
    pub from_user_id: Option<Uuid>,
    pub to_user_id: Option<Uuid>,
    pub expected_amount: Decimal,
    pub actual_amount: Option<Decimal>,
    pub difference: Option<Decimal>,
    pub previous_handover_id: Option<Uuid>,
    pub status: HandoverStatus,
    pub shift_id: Option<Uuid>,
    pub bank_name: Option<String>,
    pub deposit_reference: Option<String>,
    pub deposit_receipt_url: Option<String>,
    pub confirmed_by: Option<Uuid>,
    pub confirmed_at: Option<OffsetDateTime>,
    pub dispute_notes: Option<String>,
    pub resolution_notes: Option<String>,
    pub resolved_by: Option<Uuid>,
    pub notes: Option<String>,
    pub created_at: OffsetDateTime,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = cash_handovers)]
pub struct NewCashHandover {
    pub id: Uuid,
    pub station_id: Uuid,
    pub handover_type: HandoverType,
    pub handover_date: Date,
    pub from_user_id: Option<Uuid>,
    pub to_user_id: Option<Uuid>,
    pub expected_amount: Decimal,
    pub previous_handover_id: Option<Uuid>,
    pub status: HandoverStatus,
    pub shift_id: Option<Uuid>,
    pub bank_name: Option<String>,
    pub deposit_reference: Option<String>,
    pub deposit_receipt_url: Option<String>,
    pub notes: Option<String>,
}

impl CashHandover {
    #[autometrics]
    pub fn insert(
        conn: &mut PgConnection,
        new_handover: NewCashHandover,
    ) -> QueryResult<CashHandover> {
        diesel::insert_into(cash_handovers::table)
            .values(new_handover)
            .get_result(conn)
    }

    pub fn by_id(conn: &mut PgConnection, id: Uuid) -> QueryResult<Option<CashHandover>> {
        cash_handovers::table
            .find(id)
            .first::<CashHandover>(conn)
            .optional()
    }

    /// The most recent confirmed handover of a type for a station,
    /// optionally pinned to a from-user. Sequence validation reads this
    /// under the caller's station lock.
    pub fn latest_confirmed(
        conn: &mut PgConnection,
        station_id: Uuid,
        handover_type: HandoverType,
        from_user_id: Option<Uuid>,
    ) -> QueryResult<Option<CashHandover>> {
        let mut query = cash_handovers::table
            .filter(cash_handovers::station_id.eq(station_id))
            .filter(cash_handovers::handover_type.eq(handover_type))
            .filter(
                cash_handovers::status
                    .eq(HandoverStatus::Confirmed)
                    .or(cash_handovers::status.eq(HandoverStatus::Resolved)),
            )
            .into_boxed();

        if let Some(from_user_id) = from_user_id {
            query = query.filter(cash_handovers::from_user_id.eq(from_user_id));
        }

        query
            .order(cash_handovers::created_at.desc())
            .first::<CashHandover>(conn)
            .optional()
    }

    pub fn pending_for_user(conn: &mut PgConnection, user_id: Uuid) -> QueryResult<Vec<CashHandover>> {
        cash_handovers::table
            .filter(cash_handovers::to_user_id.eq(user_id))
            .filter(cash_handovers::status.eq(HandoverStatus::Pending))
            .order(cash_handovers::created_at.asc())
            .load(conn)
    }

    pub fn unconfirmed_between(
        conn: &mut PgConnection,
        station_id: Uuid,
        from: Date,
        to: Date,
    ) -> QueryResult<Vec<CashHandover>> {
        cash_handovers::table
            .filter(cash_handovers::station_id.eq(station_id))
            .filter(cash_handovers::handover_date.ge(from))
            .filter(cash_handovers::handover_date.le(to))
            .filter(
                cash_handovers::status
                    .eq(HandoverStatus::Pending)
                    .or(cash_handovers::status.eq(HandoverStatus::Disputed)),
            )
            .order(cash_handovers::handover_date.asc())
            .load(conn)
    }

    pub fn for_station(
        conn: &mut PgConnection,
        station_id: Uuid,
        from: Option<Date>,
        to: Option<Date>,
        handover_type: Option<HandoverType>,
    ) -> QueryResult<Vec<CashHandover>> {
        let mut query = cash_handovers::table
            .filter(cash_handovers::station_id.eq(station_id))
            .into_boxed();

        if let Some(from) = from {
            query = query.filter(cash_handovers::handover_date.ge(from));
        }
        if let Some(to) = to {
            query = query.filter(cash_handovers::handover_date.le(to));
        }
        if let Some(handover_type) = handover_type {
            query = query.filter(cash_handovers::handover_type.eq(handover_type));
        }

        query.order(cash_handovers::created_at.desc()).load(conn)
    }

    pub fn confirm(
        conn: &mut PgConnection,
        id: Uuid,
        status: HandoverStatus,
        actual_amount: Decimal,
        difference: Decimal,
        confirmed_by: Uuid,
        dispute_notes: Option<String>,
    ) -> QueryResult<CashHandover> {
        diesel::update(cash_handovers::table.find(id))
            .set((
                cash_handovers::status.eq(status),
                cash_handovers::actual_amount.eq(Some(actual_amount)),
                cash_handovers::difference.eq(Some(difference)),
                cash_handovers::confirmed_by.eq(Some(confirmed_by)),
                cash_handovers::confirmed_at.eq(Some(OffsetDateTime::now_utc())),
                cash_handovers::dispute_notes.eq(dispute_notes),
            ))
            .get_result(conn)
    }

    pub fn resolve(
        conn: &mut PgConnection,
        id: Uuid,
        resolution_notes: String,
        resolved_by: Uuid,
    ) -> QueryResult<CashHandover> {
        diesel::update(cash_handovers::table.find(id))
            .set((
                cash_handovers::status.eq(HandoverStatus::Resolved),
                cash_handovers::resolution_notes.eq(Some(resolution_notes)),
                cash_handovers::resolved_by.eq(Some(resolved_by)),
            ))
            .get_result(conn)
    }
}

use crate::schema::nozzle_readings;
use crate::schema::sql_types::ApprovalStatusType;
use crate::schema::sql_types::FlowStatusType;
use crate::schema::sql_types::ReadingSourceType;
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
#[diesel(sql_type = ReadingSourceType)]
pub enum ReadingSource {
    Manual,
    Ocr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromSqlRow, AsExpression)]
#[diesel(sql_type = ApprovalStatusType)]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromSqlRow, AsExpression)]
#[diesel(sql_type = FlowStatusType)]
pub enum FlowStatus {
    Unsettled,
    PendingSettlement,
    Settled,
    CarriedForward,
}

impl From<ReadingSource> for fuelops_commons::status::ReadingSource {
    fn from(value: ReadingSource) -> Self {
        match value {
            ReadingSource::Manual => fuelops_commons::status::ReadingSource::Manual,
            ReadingSource::Ocr => fuelops_commons::status::ReadingSource::Ocr,
        }
    }
}

impl From<fuelops_commons::status::ReadingSource> for ReadingSource {
    fn from(value: fuelops_commons::status::ReadingSource) -> Self {
        match value {
            fuelops_commons::status::ReadingSource::Manual => ReadingSource::Manual,
            fuelops_commons::status::ReadingSource::Ocr => ReadingSource::Ocr,
        }
    }
}

impl From<ApprovalStatus> for fuelops_commons::status::ApprovalStatus {
    fn from(value: ApprovalStatus) -> Self {
        match value {
            ApprovalStatus::Pending => fuelops_commons::status::ApprovalStatus::Pending,
            ApprovalStatus::Approved => fuelops_commons::status::ApprovalStatus::Approved,
            ApprovalStatus::Rejected => fuelops_commons::status::ApprovalStatus::Rejected,
        }
    }
}

impl From<FlowStatus> for fuelops_commons::status::FlowStatus {
    fn from(value: FlowStatus) -> Self {
        match value {
            FlowStatus::Unsettled => fuelops_commons::status::FlowStatus::Unsettled,
            FlowStatus::PendingSettlement => {
                fuelops_commons::status::FlowStatus::PendingSettlement
            }
            FlowStatus::Settled => fuelops_commons::status::FlowStatus::Settled,
            FlowStatus::CarriedForward => fuelops_commons::status::FlowStatus::CarriedForward,
        }
    }
}

#[derive(Queryable, Debug, Clone)]
pub struct Reading {
    pub id: Uuid,
    pub nozzle_id: Uuid,
    pub station_id: Uuid,
    pub pump_id: Uuid,
    pub fuel_type: String,
    pub entered_by: Uuid,
    pub reading_date: Date,
    pub reading_time: Option<Time>,
    pub reading_value: Decimal,
    pub previous_reading_id: Option<Uuid>,
    pub previous_reading_value: Option<Decimal>,
    pub litres_sold: Decimal,
    pub price_per_litre: Decimal,
    pub total_amount: Decimal,
    pub is_initial_reading: bool,
    pub is_sample: bool,
    pub meter_reset: bool,
    pub source: ReadingSource,
    pub approval_status: ApprovalStatus,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<OffsetDateTime>,
    pub rejection_reason: Option<String>,
    pub shift_id: Option<Uuid>,
    pub settlement_id: Option<Uuid>,
    pub transaction_id: Option<Uuid>,
    pub flow_status: FlowStatus,
    pub notes: Option<String>,
    pub created_at: OffsetDateTime,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = nozzle_readings)]
pub struct NewReading {
    pub id: Uuid,
    pub nozzle_id: Uuid,
    pub station_id: Uuid,
    pub pump_id: Uuid,
    pub fuel_type: String,
    pub entered_by: Uuid,
    pub reading_date: Date,
    pub reading_time: Option<Time>,
    pub reading_value: Decimal,
    pub previous_reading_id: Option<Uuid>,
    pub previous_reading_value: Option<Decimal>,
    pub litres_sold: Decimal,
    pub price_per_litre: Decimal,
    pub total_amount: Decimal,
    pub is_initial_reading: bool,
    pub is_sample: bool,
    pub meter_reset: bool,
    pub source: ReadingSource,
    pub approval_status: ApprovalStatus,
    pub shift_id: Option<Uuid>,
    pub notes: Option<String>,
}

#[derive(Debug, Default)]
pub struct ReadingFilter {
    pub station_id: Option<Uuid>,
    pub nozzle_id: Option<Uuid>,
    pub pump_id: Option<Uuid>,
    pub from: Option<Date>,
    pub to: Option<Date>,
    pub approval_status: Option<ApprovalStatus>,
    pub include_samples: bool,
}

impl Reading {
    #[autometrics]
    pub fn insert(conn: &mut PgConnection, new_reading: NewReading) -> QueryResult<Reading> {
        diesel::insert_into(nozzle_readings::table)
            .values(new_reading)
            .get_result(conn)
    }

    pub fn by_id(conn: &mut PgConnection, id: Uuid) -> QueryResult<Option<Reading>> {
        nozzle_readings::table
            .find(id)
            .first::<Reading>(conn)
            .optional()
    }

    pub fn by_ids(conn: &mut PgConnection, ids: &[Uuid]) -> QueryResult<Vec<Reading>> {
        nozzle_readings::table
            .filter(nozzle_readings::id.eq_any(ids))
            .order((
                nozzle_readings::reading_date.asc(),
                nozzle_readings::created_at.asc(),
            ))
            .load(conn)
    }

    /// The baseline for a difference computation: the latest non-rejected
    /// reading on or before `date`. Same-date rows necessarily have an
    /// earlier creation instant than the reading being created.
    #[autometrics]
    pub fn latest_on_or_before(
        conn: &mut PgConnection,
        nozzle_id: Uuid,
        date: Date,
    ) -> QueryResult<Option<Reading>> {
        nozzle_readings::table
            .filter(nozzle_readings::nozzle_id.eq(nozzle_id))
            .filter(nozzle_readings::reading_date.le(date))
            .filter(nozzle_readings::approval_status.ne(ApprovalStatus::Rejected))
            .order((
                nozzle_readings::reading_date.desc(),
                nozzle_readings::created_at.desc(),
            ))
            .first::<Reading>(conn)
            .optional()
    }

    pub fn latest_before(
        conn: &mut PgConnection,
        nozzle_id: Uuid,
        date: Date,
    ) -> QueryResult<Option<Reading>> {
        nozzle_readings::table
            .filter(nozzle_readings::nozzle_id.eq(nozzle_id))
            .filter(nozzle_readings::reading_date.lt(date))
            .filter(nozzle_readings::approval_status.ne(ApprovalStatus::Rejected))
            .order((
                nozzle_readings::reading_date.desc(),
                nozzle_readings::created_at.desc(),
            ))
            .first::<Reading>(conn)
            .optional()
    }

    /// Idempotency probe: same nozzle, date, time and meter value.
    pub fn find_identical(
        conn: &mut PgConnection,
        nozzle_id: Uuid,
        date: Date,
        reading_time: Option<Time>,
        value: Decimal,
    ) -> QueryResult<Option<Reading>> {
        let mut query = nozzle_readings::table
            .filter(nozzle_readings::nozzle_id.eq(nozzle_id))
            .filter(nozzle_readings::reading_date.eq(date))
            .filter(nozzle_readings::reading_value.eq(value))
            .into_boxed();

        query = match reading_time {
            Some(t) => query.filter(nozzle_readings::reading_time.eq(t)),
            None => query.filter(nozzle_readings::reading_time.is_null()),
        };

        query.first::<Reading>(conn).optional()
    }

    pub fn approved_non_sample_exists(
        conn: &mut PgConnection,
        nozzle_id: Uuid,
        date: Date,
    ) -> QueryResult<bool> {
        let count: i64 = nozzle_readings::table
            .filter(nozzle_readings::nozzle_id.eq(nozzle_id))
            .filter(nozzle_readings::reading_date.eq(date))
            .filter(nozzle_readings::is_sample.eq(false))
            .filter(nozzle_readings::approval_status.eq(ApprovalStatus::Approved))
            .count()
            .get_result(conn)?;

        Ok(count > 0)
    }

    pub fn list(conn: &mut PgConnection, filter: &ReadingFilter) -> QueryResult<Vec<Reading>> {
        let mut query = nozzle_readings::table.into_boxed();

        if let Some(station_id) = filter.station_id {
            query = query.filter(nozzle_readings::station_id.eq(station_id));
        }
        if let Some(nozzle_id) = filter.nozzle_id {
            query = query.filter(nozzle_readings::nozzle_id.eq(nozzle_id));
        }
        if let Some(pump_id) = filter.pump_id {
            query = query.filter(nozzle_readings::pump_id.eq(pump_id));
        }
        if let Some(from) = filter.from {
            query = query.filter(nozzle_readings::reading_date.ge(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(nozzle_readings::reading_date.le(to));
        }
        if let Some(status) = filter.approval_status {
            query = query.filter(nozzle_readings::approval_status.eq(status));
        }
        if !filter.include_samples {
            query = query.filter(nozzle_readings::is_sample.eq(false));
        }

        query
            .order((
                nozzle_readings::reading_date.desc(),
                nozzle_readings::created_at.desc(),
            ))
            .load(conn)
    }

    /// Non-sample readings a given employee entered at a station within a
    /// date window, for shift aggregation.
    pub fn for_employee_between(
        conn: &mut PgConnection,
        station_id: Uuid,
        employee_id: Uuid,
        date: Date,
    ) -> QueryResult<Vec<Reading>> {
        nozzle_readings::table
            .filter(nozzle_readings::station_id.eq(station_id))
            .filter(nozzle_readings::entered_by.eq(employee_id))
            .filter(nozzle_readings::reading_date.eq(date))
            .filter(nozzle_readings::is_sample.eq(false))
            .filter(nozzle_readings::approval_status.ne(ApprovalStatus::Rejected))
            .order(nozzle_readings::created_at.asc())
            .load(conn)
    }

    pub fn for_station_on(
        conn: &mut PgConnection,
        station_id: Uuid,
        date: Date,
    ) -> QueryResult<Vec<Reading>> {
        nozzle_readings::table
            .filter(nozzle_readings::station_id.eq(station_id))
            .filter(nozzle_readings::reading_date.eq(date))
            .filter(nozzle_readings::is_sample.eq(false))
            .order(nozzle_readings::created_at.asc())
            .load(conn)
    }

    pub fn set_approval(
        conn: &mut PgConnection,
        id: Uuid,
        status: ApprovalStatus,
        approved_by: Uuid,
        rejection_reason: Option<String>,
    ) -> Result<Reading> {
        let reading: Reading = diesel::update(nozzle_readings::table.find(id))
            .set((
                nozzle_readings::approval_status.eq(status),
                nozzle_readings::approved_by.eq(Some(approved_by)),
                nozzle_readings::approved_at.eq(Some(OffsetDateTime::now_utc())),
                nozzle_readings::rejection_reason.eq(rejection_reason),
            ))
            .get_result(conn)?;

        Ok(reading)
    }

    pub fn attach_to_transaction(
        conn: &mut PgConnection,
        ids: &[Uuid],
        transaction_id: Uuid,
    ) -> Result<()> {
        let affected = diesel::update(
            nozzle_readings::table.filter(nozzle_readings::id.eq_any(ids)),
        )
        .set((
            nozzle_readings::transaction_id.eq(Some(transaction_id)),
            nozzle_readings::flow_status.eq(FlowStatus::PendingSettlement),
        ))
        .execute(conn)?;

        if affected != ids.len() {
            bail!(
                "Attached {affected} of {} readings to transaction {transaction_id}",
                ids.len()
            )
        }

        Ok(())
    }

    pub fn detach_from_transaction(conn: &mut PgConnection, transaction_id: Uuid) -> Result<()> {
        diesel::update(
            nozzle_readings::table
                .filter(nozzle_readings::transaction_id.eq(transaction_id)),
        )
        .set((
            nozzle_readings::transaction_id.eq(None::<Uuid>),
            nozzle_readings::flow_status.eq(FlowStatus::Unsettled),
        ))
        .execute(conn)?;

        Ok(())
    }

    pub fn attach_to_settlement(
        conn: &mut PgConnection,
        ids: &[Uuid],
        settlement_id: Uuid,
        flow_status: FlowStatus,
    ) -> Result<()> {
        diesel::update(nozzle_readings::table.filter(nozzle_readings::id.eq_any(ids)))
            .set((
                nozzle_readings::settlement_id.eq(Some(settlement_id)),
                nozzle_readings::flow_status.eq(flow_status),
            ))
            .execute(conn)?;

        Ok(())
    }

    pub fn mark_settled_for_settlement(
        conn: &mut PgConnection,
        settlement_id: Uuid,
    ) -> Result<usize> {
        let affected = diesel::update(
            nozzle_readings::table
                .filter(nozzle_readings::settlement_id.eq(settlement_id)),
        )
        .set(nozzle_readings::flow_status.eq(FlowStatus::Settled))
        .execute(conn)?;

        Ok(affected)
    }

    pub fn carry_forward_unsettled(
        conn: &mut PgConnection,
        station_id: Uuid,
        before: Date,
    ) -> Result<usize> {
        let affected = diesel::update(
            nozzle_readings::table
                .filter(nozzle_readings::station_id.eq(station_id))
                .filter(nozzle_readings::reading_date.lt(before))
                .filter(nozzle_readings::flow_status.eq(FlowStatus::Unsettled)),
        )
        .set(nozzle_readings::flow_status.eq(FlowStatus::CarriedForward))
        .execute(conn)?;

        Ok(affected)
    }
}

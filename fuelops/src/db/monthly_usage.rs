use crate::schema::monthly_usage;
use diesel::prelude::*;
use diesel::result::QueryResult;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Queryable, Debug, Clone)]
pub struct MonthlyUsage {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub month: String,
    pub kind: String,
    pub used: i32,
    pub updated_at: OffsetDateTime,
}

impl MonthlyUsage {
    pub fn current(
        conn: &mut PgConnection,
        owner_id: Uuid,
        month: &str,
        kind: &str,
    ) -> QueryResult<i32> {
        let row: Option<MonthlyUsage> = monthly_usage::table
            .filter(monthly_usage::owner_id.eq(owner_id))
            .filter(monthly_usage::month.eq(month))
            .filter(monthly_usage::kind.eq(kind))
            .first::<MonthlyUsage>(conn)
            .optional()?;

        Ok(row.map(|r| r.used).unwrap_or(0))
    }

    /// Upsert-increment of the (owner, month, kind) counter.
    pub fn increment(
        conn: &mut PgConnection,
        owner_id: Uuid,
        month: &str,
        kind: &str,
    ) -> QueryResult<i32> {
        let row: MonthlyUsage = diesel::insert_into(monthly_usage::table)
            .values((
                monthly_usage::id.eq(Uuid::new_v4()),
                monthly_usage::owner_id.eq(owner_id),
                monthly_usage::month.eq(month),
                monthly_usage::kind.eq(kind),
                monthly_usage::used.eq(1),
            ))
            .on_conflict((
                monthly_usage::owner_id,
                monthly_usage::month,
                monthly_usage::kind,
            ))
            .do_update()
            .set((
                monthly_usage::used.eq(monthly_usage::used + 1),
                monthly_usage::updated_at.eq(OffsetDateTime::now_utc()),
            ))
            .get_result(conn)?;

        Ok(row.used)
    }
}

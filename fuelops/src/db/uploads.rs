use crate::schema::uploads;
use crate::schema::sql_types::UploadStatusType;
use diesel::prelude::*;
use diesel::result::QueryResult;
use diesel::AsExpression;
use diesel::FromSqlRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromSqlRow, AsExpression)]
#[diesel(sql_type = UploadStatusType)]
pub enum UploadStatus {
    Processing,
    Success,
    Failed,
}

impl From<UploadStatus> for fuelops_commons::status::UploadStatus {
    fn from(value: UploadStatus) -> Self {
        match value {
            UploadStatus::Processing => fuelops_commons::status::UploadStatus::Processing,
            UploadStatus::Success => fuelops_commons::status::UploadStatus::Success,
            UploadStatus::Failed => fuelops_commons::status::UploadStatus::Failed,
        }
    }
}

#[derive(Queryable, Debug, Clone)]
pub struct Upload {
    pub id: Uuid,
    pub station_id: Uuid,
    pub uploaded_by: Uuid,
    pub file_url: Option<String>,
    pub pump_serial: Option<String>,
    pub status: UploadStatus,
    pub error_message: Option<String>,
    pub readings_created: i32,
    pub created_at: OffsetDateTime,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = uploads)]
pub struct NewUpload {
    pub id: Uuid,
    pub station_id: Uuid,
    pub uploaded_by: Uuid,
    pub file_url: Option<String>,
    pub pump_serial: Option<String>,
    pub status: UploadStatus,
}

impl Upload {
    pub fn insert(conn: &mut PgConnection, new_upload: NewUpload) -> QueryResult<Upload> {
        diesel::insert_into(uploads::table)
            .values(new_upload)
            .get_result(conn)
    }

    pub fn by_id(conn: &mut PgConnection, id: Uuid) -> QueryResult<Option<Upload>> {
        uploads::table.find(id).first::<Upload>(conn).optional()
    }

    pub fn for_station(conn: &mut PgConnection, station_id: Uuid) -> QueryResult<Vec<Upload>> {
        uploads::table
            .filter(uploads::station_id.eq(station_id))
            .order(uploads::created_at.desc())
            .load(conn)
    }

    pub fn mark_success(
        conn: &mut PgConnection,
        id: Uuid,
        pump_serial: &str,
        readings_created: i32,
    ) -> QueryResult<usize> {
        diesel::update(uploads::table.find(id))
            .set((
                uploads::status.eq(UploadStatus::Success),
                uploads::pump_serial.eq(Some(pump_serial.to_string())),
                uploads::readings_created.eq(readings_created),
            ))
            .execute(conn)
    }

    pub fn mark_failed(conn: &mut PgConnection, id: Uuid, error: &str) -> QueryResult<usize> {
        diesel::update(uploads::table.find(id))
            .set((
                uploads::status.eq(UploadStatus::Failed),
                uploads::error_message.eq(Some(error.to_string())),
            ))
            .execute(conn)
    }

    pub fn set_file_url(conn: &mut PgConnection, id: Uuid, url: &str) -> QueryResult<usize> {
        diesel::update(uploads::table.find(id))
            .set(uploads::file_url.eq(Some(url.to_string())))
            .execute(conn)
    }
}

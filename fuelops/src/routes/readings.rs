use crate::auth;
use crate::auth::AuthUser;
use crate::db::readings::Reading;
use crate::db::readings::ReadingFilter;
use crate::db::uploads::Upload;
use crate::error::ServiceError;
use crate::ocr;
use crate::reading;
use crate::reading::models::CreatedReading;
use crate::routes::with_conn;
use crate::routes::AppState;
use crate::AppError;
use axum::extract::Multipart;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use fuelops_commons::requests::CreateReadingRequest;
use fuelops_commons::status::ApprovalStatus;
use fuelops_commons::status::FlowStatus;
use fuelops_commons::status::ReadingSource;
use fuelops_commons::status::UploadStatus;
use fuelops_commons::ApiResponse;
use fuelops_commons::Pagination;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::Serialize;
use std::sync::Arc;
use time::Date;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingDto {
    pub id: Uuid,
    pub nozzle_id: Uuid,
    pub station_id: Uuid,
    pub pump_id: Uuid,
    pub fuel_type: String,
    #[serde(with = "fuelops_commons::serde_fmt::ymd")]
    pub reading_date: Date,
    #[serde(
        with = "fuelops_commons::serde_fmt::hms::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub reading_time: Option<time::Time>,
    #[serde(with = "rust_decimal::serde::float")]
    pub reading_value: Decimal,
    pub previous_reading_id: Option<Uuid>,
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub previous_reading_value: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float")]
    pub litres_sold: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub price_per_litre: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub is_sample: bool,
    pub meter_reset: bool,
    pub source: ReadingSource,
    pub approval_status: ApprovalStatus,
    pub flow_status: FlowStatus,
    pub shift_id: Option<Uuid>,
    pub transaction_id: Option<Uuid>,
    pub settlement_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl From<reading::models::Reading> for ReadingDto {
    fn from(r: reading::models::Reading) -> Self {
        ReadingDto {
            id: r.id,
            nozzle_id: r.nozzle_id,
            station_id: r.station_id,
            pump_id: r.pump_id,
            fuel_type: r.fuel_type,
            reading_date: r.reading_date,
            reading_time: r.reading_time,
            reading_value: r.reading_value,
            previous_reading_id: r.previous_reading_id,
            previous_reading_value: r.previous_reading_value,
            litres_sold: r.litres_sold,
            price_per_litre: r.price_per_litre,
            total_amount: r.total_amount,
            is_sample: r.is_sample,
            meter_reset: r.meter_reset,
            source: r.source,
            approval_status: r.approval_status,
            flow_status: r.flow_status,
            shift_id: r.shift_id,
            transaction_id: r.transaction_id,
            settlement_id: r.settlement_id,
            warnings: Vec::new(),
        }
    }
}

impl From<Reading> for ReadingDto {
    fn from(r: Reading) -> Self {
        reading::models::Reading::from(r).into()
    }
}

impl From<CreatedReading> for ReadingDto {
    fn from(created: CreatedReading) -> Self {
        let mut dto = ReadingDto::from(created.reading);
        dto.warnings = created.warnings;
        dto
    }
}

pub async fn create_reading(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Json(request): Json<CreateReadingRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ReadingDto>>), AppError> {
    let grace_days = state.settings.plan_downgrade_grace_days;
    let today = OffsetDateTime::now_utc().date();

    let created = with_conn(&state, move |conn| {
        reading::ensure_manual_entry_allowed(conn, request.nozzle_id, today, grace_days)?;

        reading::create_reading(
            conn,
            &caller,
            reading::CreateReading {
                nozzle_id: request.nozzle_id,
                reading_date: request.reading_date,
                reading_time: request.reading_time,
                reading_value: request.reading_value,
                shift_id: request.shift_id,
                notes: request.notes,
                is_sample: request.is_sample,
                attempted_initial: request.is_initial_reading,
                source: ReadingSource::Manual,
            },
            today,
            grace_days,
        )
    })
    .await?;

    let status = if created.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((status, Json(ApiResponse::ok(created.into()))))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListReadingsQuery {
    pub station_id: Option<Uuid>,
    pub nozzle_id: Option<Uuid>,
    pub pump_id: Option<Uuid>,
    #[serde(default, with = "fuelops_commons::serde_fmt::ymd::option")]
    pub from: Option<Date>,
    #[serde(default, with = "fuelops_commons::serde_fmt::ymd::option")]
    pub to: Option<Date>,
    #[serde(default, with = "fuelops_commons::serde_fmt::ymd::option")]
    pub date: Option<Date>,
    pub include_samples: Option<bool>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

pub async fn list_readings(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Query(query): Query<ListReadingsQuery>,
) -> Result<Json<ApiResponse<Vec<ReadingDto>>>, AppError> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(50).clamp(1, 500);

    let readings = with_conn(&state, move |conn| {
        let station_id = auth::resolve_station(conn, &caller, query.station_id)?;

        Reading::list(
            conn,
            &ReadingFilter {
                station_id: Some(station_id),
                nozzle_id: query.nozzle_id,
                pump_id: query.pump_id,
                from: query.from.or(query.date),
                to: query.to.or(query.date),
                approval_status: None,
                include_samples: query.include_samples.unwrap_or(false),
            },
        )
        .map_err(ServiceError::from)
    })
    .await?;

    let total = readings.len() as i64;
    let offset = ((page - 1) * limit) as usize;
    let rows: Vec<ReadingDto> = readings
        .into_iter()
        .skip(offset)
        .take(limit as usize)
        .map(Into::into)
        .collect();

    Ok(Json(ApiResponse::ok_paged(
        rows,
        Pagination::new(page, limit, total),
    )))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastReadingQuery {
    pub nozzle_id: Uuid,
    #[serde(default, with = "fuelops_commons::serde_fmt::ymd::option")]
    pub before: Option<Date>,
}

pub async fn last_reading(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Query(query): Query<LastReadingQuery>,
) -> Result<Json<ApiResponse<Option<ReadingDto>>>, AppError> {
    let reading = with_conn(&state, move |conn| {
        let nozzle = crate::db::nozzles::Nozzle::by_id(conn, query.nozzle_id)?
            .ok_or_else(|| ServiceError::NotFound("nozzle".to_string()))?;
        auth::assert_station(conn, &caller, nozzle.station_id)?;

        let before = query
            .before
            .unwrap_or_else(|| OffsetDateTime::now_utc().date() + time::Duration::days(1));
        reading::get_previous_reading(conn, query.nozzle_id, before)
    })
    .await?;

    Ok(Json(ApiResponse::ok(reading.map(Into::into))))
}

pub async fn approve(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ReadingDto>>, AppError> {
    require_supervisor(&caller)?;

    let reading =
        with_conn(&state, move |conn| reading::approve_reading(conn, &caller, id)).await?;

    Ok(Json(ApiResponse::ok(reading.into())))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectRequest {
    pub reason: String,
}

pub async fn reject(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<RejectRequest>,
) -> Result<Json<ApiResponse<ReadingDto>>, AppError> {
    require_supervisor(&caller)?;

    let reading = with_conn(&state, move |conn| {
        reading::reject_reading(conn, &caller, id, request.reason)
    })
    .await?;

    Ok(Json(ApiResponse::ok(reading.into())))
}

fn require_supervisor(caller: &AuthUser) -> Result<(), AppError> {
    if caller.role == fuelops_commons::Role::Employee {
        return Err(AppError(ServiceError::Forbidden(
            "approval requires a manager or owner".to_string(),
        )));
    }

    Ok(())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadDto {
    pub id: Uuid,
    pub station_id: Uuid,
    pub file_url: Option<String>,
    pub pump_serial: Option<String>,
    pub status: UploadStatus,
    pub error_message: Option<String>,
    pub readings_created: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<Upload> for UploadDto {
    fn from(u: Upload) -> Self {
        UploadDto {
            id: u.id,
            station_id: u.station_id,
            file_url: u.file_url,
            pump_serial: u.pump_serial,
            status: u.status.into(),
            error_message: u.error_message,
            readings_created: u.readings_created,
            created_at: u.created_at,
        }
    }
}

/// Multipart receipt upload: `image` part carries the bytes, optional
/// `stationId` and `pumpSerial` parts scope the parse.
pub async fn upload_receipt(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<UploadDto>>), AppError> {
    let mut image: Option<Vec<u8>> = None;
    let mut station_id: Option<Uuid> = None;
    let mut pump_serial: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError(ServiceError::Validation(format!("bad multipart body: {e}"))))?
    {
        let name = field.name().map(|n| n.to_string());
        match name.as_deref() {
            Some("image") | Some("file") => {
                let bytes = field.bytes().await.map_err(|e| {
                    AppError(ServiceError::Validation(format!("bad image part: {e}")))
                })?;
                image = Some(bytes.to_vec());
            }
            Some("stationId") => {
                let text = field.text().await.map_err(|e| {
                    AppError(ServiceError::Validation(format!("bad stationId part: {e}")))
                })?;
                station_id = Some(text.parse().map_err(|_| {
                    AppError(ServiceError::Validation("stationId is not a uuid".to_string()))
                })?);
            }
            Some("pumpSerial") => {
                let text = field.text().await.map_err(|e| {
                    AppError(ServiceError::Validation(format!("bad pumpSerial part: {e}")))
                })?;
                pump_serial = Some(text);
            }
            _ => {}
        }
    }

    let image = image.ok_or_else(|| {
        AppError(ServiceError::Validation(
            "multipart body must include an image part".to_string(),
        ))
    })?;

    let resolved_station = {
        let caller = caller.clone();
        with_conn(&state, move |conn| {
            auth::resolve_station(conn, &caller, station_id)
        })
        .await?
    };

    let upload = ocr::process_upload(
        state.pool.clone(),
        state.ocr.clone(),
        state.blob.clone(),
        caller,
        resolved_station,
        image,
        pump_serial,
        OffsetDateTime::now_utc().date(),
        state.settings.plan_downgrade_grace_days,
    )
    .await
    .map_err(AppError)?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(upload.into()))))
}

pub async fn list_uploads(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(station_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<UploadDto>>>, AppError> {
    let uploads = with_conn(&state, move |conn| {
        auth::assert_station(conn, &caller, station_id)?;
        Upload::for_station(conn, station_id).map_err(ServiceError::from)
    })
    .await?;

    Ok(Json(ApiResponse::ok(
        uploads.into_iter().map(Into::into).collect(),
    )))
}

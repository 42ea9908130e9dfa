//! Receipt OCR: ships image bytes to the remote text extractor, polls the
//! operation to a terminal state, and parses the returned text into meter
//! readings.

use crate::error::ServiceError;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;
use time::macros::format_description;
use time::Date;

#[derive(Clone)]
pub struct OcrClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    pub poll_attempts: u32,
    pub poll_interval: Duration,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitResponse {
    operation_id: String,
}

#[derive(Deserialize)]
struct OperationResponse {
    status: String,
    text: Option<String>,
    error: Option<String>,
}

impl OcrClient {
    pub fn new(
        http: reqwest::Client,
        endpoint: String,
        api_key: String,
        poll_attempts: u32,
        poll_interval: Duration,
    ) -> Self {
        Self {
            http,
            endpoint,
            api_key,
            poll_attempts,
            poll_interval,
        }
    }

    /// Submits the image and polls until the operation is terminal. A poll
    /// budget overrun is an `External` failure the caller records on the
    /// Upload, never a 500.
    pub async fn extract_text(&self, image: Vec<u8>) -> Result<String, ServiceError> {
        let submit_url = format!("{}/v1/analyze", self.endpoint.trim_end_matches('/'));

        let response = self
            .http
            .post(&submit_url)
            .header("x-api-key", &self.api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(image)
            .send()
            .await
            .map_err(|e| ServiceError::External(format!("text extractor unreachable: {e}")))?;

        if !response.status().is_success() {
            return Err(ServiceError::External(format!(
                "text extractor rejected the image: {}",
                response.status()
            )));
        }

        let submitted: SubmitResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::External(format!("bad submit response: {e}")))?;

        let poll_url = format!(
            "{}/v1/operations/{}",
            self.endpoint.trim_end_matches('/'),
            submitted.operation_id
        );

        for attempt in 1..=self.poll_attempts {
            tokio::time::sleep(self.poll_interval).await;

            let operation: OperationResponse = self
                .http
                .get(&poll_url)
                .header("x-api-key", &self.api_key)
                .send()
                .await
                .map_err(|e| ServiceError::External(format!("poll failed: {e}")))?
                .json()
                .await
                .map_err(|e| ServiceError::External(format!("bad poll response: {e}")))?;

            match operation.status.as_str() {
                "succeeded" => {
                    return operation.text.ok_or_else(|| {
                        ServiceError::External("operation succeeded without text".to_string())
                    });
                }
                "failed" => {
                    return Err(ServiceError::External(format!(
                        "text extraction failed: {}",
                        operation.error.unwrap_or_else(|| "unknown error".to_string())
                    )));
                }
                _ => {
                    tracing::debug!(attempt, status = %operation.status, "OCR operation still running");
                }
            }
        }

        Err(ServiceError::External(format!(
            "text extraction did not finish within {} attempts",
            self.poll_attempts
        )))
    }
}

/// Drives one receipt upload end to end: blob upload, text extraction,
/// parsing, pump/nozzle auto-creation and reading creation. Collaborator
/// failures land on the Upload record, not on the HTTP status.
pub async fn process_upload(
    pool: crate::PgPool,
    ocr: OcrClient,
    blob: crate::blob::BlobStore,
    caller: crate::auth::AuthUser,
    station_id: uuid::Uuid,
    image: Vec<u8>,
    expected_pump_serial: Option<String>,
    today: Date,
    grace_days: i64,
) -> Result<crate::db::uploads::Upload, ServiceError> {
    use crate::db::uploads::NewUpload;
    use crate::db::uploads::Upload;
    use crate::db::uploads::UploadStatus;

    let upload = {
        let pool = pool.clone();
        let caller = caller.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            Upload::insert(
                &mut conn,
                NewUpload {
                    id: uuid::Uuid::new_v4(),
                    station_id,
                    uploaded_by: caller.id,
                    file_url: None,
                    pump_serial: None,
                    status: UploadStatus::Processing,
                },
            )
            .map_err(ServiceError::from)
        })
        .await
        .map_err(|e| ServiceError::Internal(anyhow::anyhow!("upload task panicked: {e}")))??
    };

    // The stored receipt is best-effort; extraction continues without it.
    match blob.put(image.clone(), "image/jpeg").await {
        Ok(url) => {
            let pool = pool.clone();
            let upload_id = upload.id;
            let _ = tokio::task::spawn_blocking(move || {
                let mut conn = pool.get()?;
                Upload::set_file_url(&mut conn, upload_id, &url).map_err(ServiceError::from)
            })
            .await;
        }
        Err(e) => tracing::warn!("Failed to store receipt image: {e:#}"),
    }

    let failed = |pool: crate::PgPool, upload_id: uuid::Uuid, error: String| async move {
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            Upload::mark_failed(&mut conn, upload_id, &error)?;
            Upload::by_id(&mut conn, upload_id)?
                .ok_or_else(|| ServiceError::NotFound("upload".to_string()))
        })
        .await
        .map_err(|e| ServiceError::Internal(anyhow::anyhow!("upload task panicked: {e}")))?
    };

    let text = match ocr.extract_text(image).await {
        Ok(text) => text,
        Err(e) => return failed(pool, upload.id, e.to_string()).await,
    };

    let parsed = match parse_receipt_text(&text) {
        Ok(parsed) => parsed,
        Err(e) => return failed(pool, upload.id, e.to_string()).await,
    };

    if let Some(expected) = &expected_pump_serial {
        if !parsed.pump_serial.eq_ignore_ascii_case(expected) {
            return failed(
                pool,
                upload.id,
                format!(
                    "receipt names pump {}, expected {expected}",
                    parsed.pump_serial
                ),
            )
            .await;
        }
    }

    let upload_id = upload.id;
    tokio::task::spawn_blocking(move || {
        let mut conn = pool.get()?;
        match ingest_parsed_receipt(&mut conn, &caller, station_id, &parsed, today, grace_days) {
            Ok(created) => {
                Upload::mark_success(&mut conn, upload_id, &parsed.pump_serial, created)?;
            }
            Err(e) => {
                Upload::mark_failed(&mut conn, upload_id, &e.to_string())?;
            }
        }

        Upload::by_id(&mut conn, upload_id)?
            .ok_or_else(|| ServiceError::NotFound("upload".to_string()))
    })
    .await
    .map_err(|e| ServiceError::Internal(anyhow::anyhow!("upload task panicked: {e}")))?
}

/// Creates missing pumps/nozzles within the caller's station and one
/// reading per parsed nozzle value, relying on reading idempotency to skip
/// duplicates. Returns how many new readings were created.
fn ingest_parsed_receipt(
    conn: &mut diesel::PgConnection,
    caller: &crate::auth::AuthUser,
    station_id: uuid::Uuid,
    parsed: &ParsedReceipt,
    today: Date,
    grace_days: i64,
) -> Result<i32, ServiceError> {
    use crate::db::nozzles::NewNozzle;
    use crate::db::nozzles::Nozzle;
    use crate::db::pumps::EquipmentStatus;
    use crate::db::pumps::NewPump;
    use crate::db::pumps::Pump;

    crate::auth::assert_station(conn, caller, station_id)?;

    let owner = crate::auth::station_owner(conn, station_id)?;
    let plan = crate::quota::effective_plan(conn, &owner, grace_days)?;

    let pump = match Pump::by_serial(conn, station_id, &parsed.pump_serial)? {
        Some(pump) => pump,
        None => {
            crate::quota::ensure_pump_allowed(conn, station_id, &plan)?;
            let pump_number = Pump::next_pump_number(conn, station_id)?;
            Pump::insert(
                conn,
                NewPump {
                    id: uuid::Uuid::new_v4(),
                    station_id,
                    name: format!("Pump {}", parsed.pump_serial),
                    pump_number,
                    serial_number: Some(parsed.pump_serial.clone()),
                    status: EquipmentStatus::Active,
                },
            )?
        }
    };

    let mut created = 0;
    for reading in &parsed.readings {
        let nozzle = match Nozzle::by_number(conn, pump.id, reading.nozzle_number)? {
            Some(nozzle) => nozzle,
            None => {
                crate::quota::ensure_nozzle_allowed(conn, pump.id, &plan)?;
                Nozzle::insert(
                    conn,
                    NewNozzle {
                        id: uuid::Uuid::new_v4(),
                        pump_id: pump.id,
                        station_id,
                        nozzle_number: reading.nozzle_number,
                        fuel_type: fuelops_commons::fuel::FuelType::default_for_nozzle(
                            reading.nozzle_number,
                        )
                        .to_string(),
                        status: EquipmentStatus::Active,
                        initial_reading: None,
                    },
                )?
            }
        };

        let outcome = crate::reading::create_reading(
            conn,
            caller,
            crate::reading::CreateReading {
                nozzle_id: nozzle.id,
                reading_date: parsed.reading_date.unwrap_or(today),
                reading_time: None,
                reading_value: reading.cumulative_volume,
                shift_id: None,
                notes: None,
                is_sample: false,
                attempted_initial: false,
                source: fuelops_commons::status::ReadingSource::Ocr,
            },
            today,
            grace_days,
        )?;

        if outcome.created {
            created += 1;
        }
    }

    Ok(created)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReading {
    pub nozzle_number: i32,
    pub cumulative_volume: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReceipt {
    pub pump_serial: String,
    pub reading_date: Option<Date>,
    pub readings: Vec<ParsedReading>,
}

/// Parses the extractor's free text into a pump serial and per-nozzle
/// cumulative volumes.
///
/// Accepted shapes, case-insensitively:
///   PUMP: TEST001        (or "PUMP SERIAL TEST001")
///   NOZZLE 1: 123456.789 (or "N1 123456.789")
///   DATE: 2024-06-01
pub fn parse_receipt_text(text: &str) -> Result<ParsedReceipt, ServiceError> {
    let mut pump_serial = None;
    let mut reading_date = None;
    let mut readings = Vec::new();

    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        let lower = line.to_lowercase();
        let value_part = line
            .split_once(':')
            .map(|(_, v)| v.trim())
            .unwrap_or_else(|| line.split_whitespace().last().unwrap_or(""));

        if lower.starts_with("pump") {
            if !value_part.is_empty() {
                pump_serial = Some(value_part.to_string());
            }
            continue;
        }

        if lower.starts_with("date") {
            let format = format_description!("[year]-[month]-[day]");
            if let Ok(date) = Date::parse(value_part, format) {
                reading_date = Some(date);
            }
            continue;
        }

        if let Some(rest) = lower
            .strip_prefix("nozzle")
            .or_else(|| lower.strip_prefix('n'))
        {
            let rest = rest.trim_start();
            let number_token: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
            let Ok(nozzle_number) = number_token.parse::<i32>() else {
                continue;
            };

            let Ok(volume) = Decimal::from_str(value_part) else {
                continue;
            };
            if volume < Decimal::ZERO {
                continue;
            }

            readings.push(ParsedReading {
                nozzle_number,
                cumulative_volume: volume,
            });
        }
    }

    let pump_serial = pump_serial.ok_or_else(|| {
        ServiceError::Validation("no pump serial found in extracted text".to_string())
    })?;

    if readings.is_empty() {
        return Err(ServiceError::Validation(
            "no nozzle readings found in extracted text".to_string(),
        ));
    }

    Ok(ParsedReceipt {
        pump_serial,
        reading_date,
        readings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use time::macros::date;

    #[test]
    fn parses_a_typical_receipt() {
        let text = "\
            PUMP: TEST001\n\
            DATE: 2024-06-01\n\
            NOZZLE 1: 123456.789\n\
            NOZZLE 2: 98765.432\n";

        let parsed = parse_receipt_text(text).unwrap();
        assert_eq!(parsed.pump_serial, "TEST001");
        assert_eq!(parsed.reading_date, Some(date!(2024 - 06 - 01)));
        assert_eq!(
            parsed.readings,
            vec![
                ParsedReading {
                    nozzle_number: 1,
                    cumulative_volume: dec!(123456.789),
                },
                ParsedReading {
                    nozzle_number: 2,
                    cumulative_volume: dec!(98765.432),
                },
            ]
        );
    }

    #[test]
    fn tolerates_noise_lines() {
        let text = "\
            STATION COPY\n\
            PUMP SERIAL P-77\n\
            N1 100.000\n\
            thank you, visit again\n";

        let parsed = parse_receipt_text(text).unwrap();
        assert_eq!(parsed.pump_serial, "P-77");
        assert_eq!(parsed.readings.len(), 1);
        assert_eq!(parsed.readings[0].cumulative_volume, dec!(100.000));
    }

    #[test]
    fn missing_pump_serial_is_a_validation_error() {
        let err = parse_receipt_text("NOZZLE 1: 100.000").unwrap_err();
        assert_eq!(err.code(), "VALIDATION");
    }

    #[test]
    fn missing_readings_is_a_validation_error() {
        let err = parse_receipt_text("PUMP: X").unwrap_err();
        assert_eq!(err.code(), "VALIDATION");
    }

    #[tokio::test]
    async fn polls_until_succeeded() {
        let mut server = mockito::Server::new_async().await;

        let submit = server
            .mock("POST", "/v1/analyze")
            .with_status(200)
            .with_body(r#"{"operationId": "op-1"}"#)
            .create_async()
            .await;

        let poll = server
            .mock("GET", "/v1/operations/op-1")
            .with_status(200)
            .with_body(r#"{"status": "succeeded", "text": "PUMP: A\nNOZZLE 1: 10.000"}"#)
            .create_async()
            .await;

        let client = OcrClient::new(
            reqwest::Client::new(),
            server.url(),
            "test-key".to_string(),
            3,
            Duration::from_millis(1),
        );

        let text = client.extract_text(vec![1, 2, 3]).await.unwrap();
        assert!(text.contains("NOZZLE 1"));

        submit.assert_async().await;
        poll.assert_async().await;
    }

    #[tokio::test]
    async fn failed_operation_is_external_error() {
        let mut server = mockito::Server::new_async().await;

        server
            .mock("POST", "/v1/analyze")
            .with_status(200)
            .with_body(r#"{"operationId": "op-2"}"#)
            .create_async()
            .await;

        server
            .mock("GET", "/v1/operations/op-2")
            .with_status(200)
            .with_body(r#"{"status": "failed", "error": "blurry image"}"#)
            .create_async()
            .await;

        let client = OcrClient::new(
            reqwest::Client::new(),
            server.url(),
            "test-key".to_string(),
            3,
            Duration::from_millis(1),
        );

        let err = client.extract_text(vec![1]).await.unwrap_err();
        assert_eq!(err.code(), "EXTERNAL");
    }
}

//! Request bodies accepted by the API.
//!
//! Wire fields are camelCase; money carries two fractional digits and
//! volume three, both as JSON numbers.

use crate::fuel::FuelType;
use crate::status::HandoverType;
use crate::status::RefillEntryType;
use crate::status::ShiftType;
use crate::status::TrackingMode;
use crate::Role;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::Serialize;
use time::Date;
use time::Time;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReadingRequest {
    pub nozzle_id: Uuid,
    #[serde(with = "crate::serde_fmt::ymd")]
    pub reading_date: Date,
    #[serde(default, with = "crate::serde_fmt::hms::option")]
    pub reading_time: Option<Time>,
    #[serde(with = "rust_decimal::serde::float")]
    pub reading_value: Decimal,
    #[serde(default)]
    pub shift_id: Option<Uuid>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub is_sample: bool,
    /// Accepted for compatibility and force-rewritten to `false` on the
    /// server; an attempt to set it is logged at warning severity.
    #[serde(default)]
    pub is_initial_reading: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentBreakdown {
    #[serde(with = "rust_decimal::serde::float")]
    pub cash: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub online: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub credit: Decimal,
}

impl PaymentBreakdown {
    pub fn total(&self) -> Decimal {
        self.cash + self.online + self.credit
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditAllocation {
    pub creditor_id: Uuid,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionRequest {
    #[serde(default)]
    pub station_id: Option<Uuid>,
    #[serde(with = "crate::serde_fmt::ymd")]
    pub date: Date,
    pub reading_ids: Vec<Uuid>,
    pub payment_breakdown: PaymentBreakdown,
    #[serde(default)]
    pub credit_allocations: Vec<CreditAllocation>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTransactionRequest {
    #[serde(default)]
    pub payment_breakdown: Option<PaymentBreakdown>,
    #[serde(default)]
    pub credit_allocations: Option<Vec<CreditAllocation>>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateHandoverRequest {
    pub handover_type: HandoverType,
    #[serde(default)]
    pub station_id: Option<Uuid>,
    #[serde(default)]
    pub to_user_id: Option<Uuid>,
    #[serde(default, with = "crate::serde_fmt::ymd::option")]
    pub handover_date: Option<Date>,
    #[serde(with = "rust_decimal::serde::float")]
    pub expected_amount: Decimal,
    #[serde(default)]
    pub previous_handover_id: Option<Uuid>,
    #[serde(default)]
    pub shift_id: Option<Uuid>,
    #[serde(default)]
    pub bank_name: Option<String>,
    #[serde(default)]
    pub deposit_reference: Option<String>,
    #[serde(default)]
    pub deposit_receipt_url: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmHandoverRequest {
    #[serde(with = "rust_decimal::serde::float")]
    pub actual_amount: Decimal,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveDisputeRequest {
    pub resolution_notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartShiftRequest {
    #[serde(default, with = "crate::serde_fmt::ymd::option")]
    pub shift_date: Option<Date>,
    #[serde(default, with = "crate::serde_fmt::hms::option")]
    pub start_time: Option<Time>,
    #[serde(default)]
    pub shift_type: Option<ShiftType>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub opening_cash: Option<Decimal>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndShiftRequest {
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub cash_collected: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub online_collected: Option<Decimal>,
    #[serde(default, with = "crate::serde_fmt::hms::option")]
    pub end_time: Option<Time>,
    #[serde(default)]
    pub end_notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCreditorRequest {
    pub name: String,
    #[serde(default)]
    pub business_name: Option<String>,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub credit_limit: Option<Decimal>,
    #[serde(default)]
    pub credit_period_days: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCreditRequest {
    pub creditor_id: Uuid,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(default)]
    pub fuel_type: Option<FuelType>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub litres: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price_per_litre: Option<Decimal>,
    #[serde(default)]
    pub reading_id: Option<Uuid>,
    #[serde(default)]
    pub invoice_number: Option<String>,
    #[serde(default)]
    pub vehicle_number: Option<String>,
    #[serde(with = "crate::serde_fmt::ymd")]
    pub transaction_date: Date,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementLinkRequest {
    pub credit_transaction_id: Uuid,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCreditSettlementRequest {
    pub creditor_id: Uuid,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(with = "crate::serde_fmt::ymd")]
    pub transaction_date: Date,
    #[serde(default)]
    pub invoice_number: Option<String>,
    /// Explicit invoice allocation. When empty the server allocates
    /// oldest-invoice-first.
    #[serde(default)]
    pub links: Vec<SettlementLinkRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSettlementRequest {
    #[serde(with = "crate::serde_fmt::ymd")]
    pub settlement_date: Date,
    #[serde(with = "rust_decimal::serde::float")]
    pub reported_cash: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub reported_online: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub reported_credit: Decimal,
    #[serde(default)]
    pub reading_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeSettlementRequest {
    #[serde(with = "rust_decimal::serde::float")]
    pub actual_cash: Decimal,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub confirmed_online: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub confirmed_credit: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTankRequest {
    pub fuel_type: FuelType,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub fuel_display_name: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub capacity: Decimal,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub current_level: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub low_level_warning: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub low_level_percent: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub critical_level: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub critical_level_percent: Option<Decimal>,
    #[serde(default)]
    pub tracking_mode: Option<TrackingMode>,
    #[serde(default)]
    pub allow_negative: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRefillRequest {
    #[serde(with = "rust_decimal::serde::float")]
    pub litres: Decimal,
    #[serde(with = "crate::serde_fmt::ymd")]
    pub refill_date: Date,
    #[serde(default, with = "crate::serde_fmt::hms::option")]
    pub refill_time: Option<Time>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub cost_per_litre: Option<Decimal>,
    #[serde(default)]
    pub supplier: Option<String>,
    #[serde(default)]
    pub invoice_number: Option<String>,
    #[serde(default)]
    pub vehicle_number: Option<String>,
    #[serde(default)]
    pub driver_name: Option<String>,
    #[serde(default)]
    pub entry_type: Option<RefillEntryType>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DipCalibrationRequest {
    #[serde(with = "rust_decimal::serde::float")]
    pub dip_level: Decimal,
    #[serde(default, with = "crate::serde_fmt::ymd::option")]
    pub reading_date: Option<Date>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStationRequest {
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub owner_id: Option<Uuid>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub shift_required_for_reading: bool,
    #[serde(default)]
    pub missed_reading_alert_days: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePumpRequest {
    pub name: String,
    pub pump_number: i32,
    #[serde(default)]
    pub serial_number: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNozzleRequest {
    pub pump_id: Uuid,
    pub nozzle_number: i32,
    pub fuel_type: FuelType,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub initial_reading: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFuelPriceRequest {
    pub fuel_type: FuelType,
    #[serde(with = "rust_decimal::serde::float")]
    pub selling_price: Decimal,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub cost_price: Option<Decimal>,
    #[serde(with = "crate::serde_fmt::ymd")]
    pub effective_from: Date,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: Role,
    #[serde(default)]
    pub station_id: Option<Uuid>,
    #[serde(default)]
    pub plan_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateExpenseRequest {
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(with = "crate::serde_fmt::ymd")]
    pub expense_date: Date,
    #[serde(default)]
    pub receipt_number: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reading_request_parses_wire_casing() {
        let json = r#"{
            "nozzleId": "7f2c1e7e-9f3a-4a0e-b9a2-2b6d3e5f8a10",
            "readingDate": "2024-06-01",
            "readingTime": "08:00:00",
            "readingValue": 1050.5,
            "isSample": false
        }"#;

        let req: CreateReadingRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.reading_value.to_string(), "1050.5");
        assert!(!req.is_initial_reading);
        assert!(req.shift_id.is_none());
    }

    #[test]
    fn payment_breakdown_totals() {
        let json = r#"{"cash": 3000.0, "online": 1550.0, "credit": 500.0}"#;
        let b: PaymentBreakdown = serde_json::from_str(json).unwrap();
        assert_eq!(b.total().to_string(), "5050");
    }
}

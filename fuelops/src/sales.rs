//! Daily transaction aggregation: grouping a day's readings into an
//! envelope that declares how the sales were paid.

use crate::audit::AuditEntry;
use crate::auth::AuthUser;
use crate::credit;
use crate::credit::CreditInput;
use crate::db::audit_logs::AuditCategory;
use crate::db::audit_logs::AuditSeverity;
use crate::db::daily_transactions::CreditAllocationRow;
use crate::db::daily_transactions::DailyTransaction;
use crate::db::daily_transactions::NewCreditAllocationRow;
use crate::db::daily_transactions::NewDailyTransaction;
use crate::db::daily_transactions::TransactionStatus;
use crate::db::readings::ApprovalStatus;
use crate::db::readings::Reading;
use crate::db::settlements::Settlement;
use crate::db::settlements::SettlementStatus;
use crate::db::stations::Station;
use crate::error::ServiceError;
use diesel::Connection;
use diesel::PgConnection;
use fuelops_commons::requests::CreditAllocation;
use fuelops_commons::requests::PaymentBreakdown;
use rust_decimal::Decimal;
use serde_json::json;
use time::Date;
use uuid::Uuid;

const BALANCE_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

pub struct CreateTransaction {
    pub station_id: Uuid,
    pub date: Date,
    pub reading_ids: Vec<Uuid>,
    pub breakdown: PaymentBreakdown,
    pub credit_allocations: Vec<CreditAllocation>,
    pub notes: Option<String>,
}

/// Validates that the declared payment channels balance against the
/// aggregated sale value (I4).
fn check_balance(
    breakdown: &PaymentBreakdown,
    allocations: &[CreditAllocation],
    total_sale_value: Decimal,
) -> Result<(), ServiceError> {
    let channel_sum = breakdown.total();
    if (channel_sum - total_sale_value).abs() > BALANCE_TOLERANCE {
        return Err(ServiceError::Validation(format!(
            "payment breakdown ({channel_sum}) does not balance against sales ({total_sale_value})"
        )));
    }

    let allocated: Decimal = allocations.iter().map(|a| a.amount).sum();
    if allocated != breakdown.credit {
        return Err(ServiceError::Validation(format!(
            "credit allocations ({allocated}) must equal the credit channel ({})",
            breakdown.credit
        )));
    }

    Ok(())
}

pub fn create_transaction(
    conn: &mut PgConnection,
    caller: &AuthUser,
    input: CreateTransaction,
) -> Result<DailyTransaction, ServiceError> {
    if input.reading_ids.is_empty() {
        return Err(ServiceError::Validation(
            "a transaction needs at least one reading".to_string(),
        ));
    }

    conn.transaction::<_, ServiceError, _>(|conn| {
        // Station row lock serializes concurrent grouping for the same
        // station day.
        let station = Station::by_id_locked(conn, input.station_id)?
            .ok_or_else(|| ServiceError::NotFound("station".to_string()))?;

        let readings = Reading::by_ids(conn, &input.reading_ids)?;
        if readings.len() != input.reading_ids.len() {
            return Err(ServiceError::NotFound("reading".to_string()));
        }

        for reading in &readings {
            if reading.station_id != station.id {
                return Err(ServiceError::forbidden_station());
            }
            if reading.reading_date != input.date {
                return Err(ServiceError::Validation(format!(
                    "reading {} is dated {}, not {}",
                    reading.id, reading.reading_date, input.date
                )));
            }
            if reading.is_sample {
                return Err(ServiceError::Validation(format!(
                    "sample reading {} cannot enter a transaction",
                    reading.id
                )));
            }
            if reading.approval_status == ApprovalStatus::Rejected {
                return Err(ServiceError::conflict(
                    "INVALID_STATE",
                    format!("reading {} was rejected", reading.id),
                ));
            }
            if reading.transaction_id.is_some() {
                return Err(ServiceError::conflict(
                    "READING_ALREADY_GROUPED",
                    format!("reading {} already belongs to a transaction", reading.id),
                ));
            }
            if let Some(settlement_id) = reading.settlement_id {
                let settlement = Settlement::by_id(conn, settlement_id)?;
                if matches!(
                    settlement.map(|s| s.status),
                    Some(SettlementStatus::Final) | Some(SettlementStatus::Locked)
                ) {
                    return Err(ServiceError::conflict(
                        "SETTLEMENT_LOCKED",
                        format!("reading {} is settled and immutable", reading.id),
                    ));
                }
            }
        }

        let total_litres: Decimal = readings.iter().map(|r| r.litres_sold).sum();
        let total_sale_value: Decimal = readings.iter().map(|r| r.total_amount).sum();

        check_balance(&input.breakdown, &input.credit_allocations, total_sale_value)?;

        let transaction = DailyTransaction::insert(
            conn,
            NewDailyTransaction {
                id: Uuid::new_v4(),
                station_id: station.id,
                transaction_date: input.date,
                total_litres,
                total_sale_value,
                payment_cash: input.breakdown.cash,
                payment_online: input.breakdown.online,
                payment_credit: input.breakdown.credit,
                status: TransactionStatus::Submitted,
                notes: input.notes,
                created_by: caller.id,
            },
        )?;

        Reading::attach_to_transaction(conn, &input.reading_ids, transaction.id)?;

        apply_allocations(
            conn,
            caller,
            &transaction,
            &input.credit_allocations,
            input.date,
        )?;

        AuditEntry::new("transaction_create", "daily_transaction")
            .by(caller)
            .station(station.id)
            .entity(transaction.id)
            .new_values(json!({
                "date": input.date.to_string(),
                "totalLitres": total_litres,
                "totalSaleValue": total_sale_value,
                "cash": input.breakdown.cash,
                "online": input.breakdown.online,
                "credit": input.breakdown.credit,
                "readings": input.reading_ids.len(),
            }))
            .category(AuditCategory::Finance)
            .emit(conn)?;

        Ok(transaction)
    })
}

fn apply_allocations(
    conn: &mut PgConnection,
    caller: &AuthUser,
    transaction: &DailyTransaction,
    allocations: &[CreditAllocation],
    date: Date,
) -> Result<(), ServiceError> {
    for (seq, allocation) in allocations.iter().enumerate() {
        let entry = credit::record_credit(
            conn,
            caller,
            transaction.station_id,
            CreditInput {
                creditor_id: allocation.creditor_id,
                amount: allocation.amount,
                fuel_type: None,
                litres: None,
                price_per_litre: None,
                reading_id: None,
                invoice_number: None,
                vehicle_number: None,
                transaction_date: date,
            },
        )?;

        CreditAllocationRow::insert(
            conn,
            NewCreditAllocationRow {
                id: Uuid::new_v4(),
                transaction_id: transaction.id,
                creditor_id: allocation.creditor_id,
                amount: allocation.amount,
                seq: seq as i32,
                credit_transaction_id: Some(entry.id),
            },
        )?;
    }

    Ok(())
}

fn reverse_allocations(
    conn: &mut PgConnection,
    caller: &AuthUser,
    transaction_id: Uuid,
    today: Date,
) -> Result<(), ServiceError> {
    for allocation in CreditAllocationRow::for_transaction(conn, transaction_id)? {
        if let Some(credit_transaction_id) = allocation.credit_transaction_id {
            credit::delete_transaction(conn, caller, credit_transaction_id, today)?;
        }
    }

    CreditAllocationRow::delete_for_transaction(conn, transaction_id)?;
    Ok(())
}

pub fn update_transaction(
    conn: &mut PgConnection,
    caller: &AuthUser,
    transaction_id: Uuid,
    breakdown: Option<PaymentBreakdown>,
    allocations: Option<Vec<CreditAllocation>>,
    notes: Option<String>,
    today: Date,
) -> Result<DailyTransaction, ServiceError> {
    conn.transaction::<_, ServiceError, _>(|conn| {
        let transaction = DailyTransaction::by_id(conn, transaction_id)?
            .ok_or_else(|| ServiceError::NotFound("transaction".to_string()))?;

        if !matches!(
            transaction.status,
            TransactionStatus::Draft | TransactionStatus::Submitted
        ) {
            return Err(ServiceError::conflict(
                "INVALID_STATE",
                "only draft or submitted transactions can be edited",
            ));
        }

        let breakdown = breakdown.unwrap_or(PaymentBreakdown {
            cash: transaction.payment_cash,
            online: transaction.payment_online,
            credit: transaction.payment_credit,
        });

        let allocations = match allocations {
            Some(allocations) => {
                reverse_allocations(conn, caller, transaction.id, today)?;
                apply_allocations(
                    conn,
                    caller,
                    &transaction,
                    &allocations,
                    transaction.transaction_date,
                )?;
                allocations
            }
            None => CreditAllocationRow::for_transaction(conn, transaction.id)?
                .into_iter()
                .map(|row| CreditAllocation {
                    creditor_id: row.creditor_id,
                    amount: row.amount,
                })
                .collect(),
        };

        check_balance(&breakdown, &allocations, transaction.total_sale_value)?;

        let updated = DailyTransaction::update_payments(
            conn,
            transaction.id,
            breakdown.cash,
            breakdown.online,
            breakdown.credit,
            notes.or(transaction.notes.clone()),
        )?;

        AuditEntry::new("transaction_update", "daily_transaction")
            .by(caller)
            .station(transaction.station_id)
            .entity(transaction.id)
            .old(json!({
                "cash": transaction.payment_cash,
                "online": transaction.payment_online,
                "credit": transaction.payment_credit,
            }))
            .new_values(json!({
                "cash": breakdown.cash,
                "online": breakdown.online,
                "credit": breakdown.credit,
            }))
            .category(AuditCategory::Finance)
            .emit(conn)?;

        Ok(updated)
    })
}

pub fn cancel_transaction(
    conn: &mut PgConnection,
    caller: &AuthUser,
    transaction_id: Uuid,
    today: Date,
) -> Result<(), ServiceError> {
    conn.transaction::<_, ServiceError, _>(|conn| {
        let transaction = DailyTransaction::by_id(conn, transaction_id)?
            .ok_or_else(|| ServiceError::NotFound("transaction".to_string()))?;

        if !matches!(
            transaction.status,
            TransactionStatus::Draft | TransactionStatus::Submitted
        ) {
            return Err(ServiceError::conflict(
                "INVALID_STATE",
                "only draft or submitted transactions can be cancelled",
            ));
        }

        reverse_allocations(conn, caller, transaction.id, today)?;
        Reading::detach_from_transaction(conn, transaction.id)?;
        DailyTransaction::set_status(conn, transaction.id, TransactionStatus::Cancelled)?;

        AuditEntry::new("transaction_cancel", "daily_transaction")
            .by(caller)
            .station(transaction.station_id)
            .entity(transaction.id)
            .severity(AuditSeverity::Warning)
            .category(AuditCategory::Finance)
            .emit(conn)?;

        Ok(())
    })
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SalesSummary {
    pub transaction_count: usize,
    pub total_litres: Decimal,
    pub total_sale_value: Decimal,
    pub cash: Decimal,
    pub online: Decimal,
    pub credit: Decimal,
}

pub fn summarize(
    conn: &mut PgConnection,
    station_id: Uuid,
    from: Option<Date>,
    to: Option<Date>,
) -> Result<SalesSummary, ServiceError> {
    let transactions = DailyTransaction::for_station(conn, station_id, from, to)?;

    let mut summary = SalesSummary::default();
    for t in transactions
        .iter()
        .filter(|t| t.status != TransactionStatus::Cancelled)
    {
        summary.transaction_count += 1;
        summary.total_litres += t.total_litres;
        summary.total_sale_value += t.total_sale_value;
        summary.cash += t.payment_cash;
        summary.online += t.payment_online;
        summary.credit += t.payment_credit;
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn breakdown(cash: Decimal, online: Decimal, credit: Decimal) -> PaymentBreakdown {
        PaymentBreakdown {
            cash,
            online,
            credit,
        }
    }

    #[test]
    fn balanced_breakdown_passes() {
        let allocations = vec![CreditAllocation {
            creditor_id: Uuid::new_v4(),
            amount: dec!(500),
        }];

        check_balance(
            &breakdown(dec!(3000), dec!(1550), dec!(500)),
            &allocations,
            dec!(5050.00),
        )
        .unwrap();
    }

    #[test]
    fn tolerance_is_one_paisa() {
        check_balance(&breakdown(dec!(3000), dec!(1550.01), dec!(0)), &[], dec!(4550.00)).unwrap();

        let err = check_balance(
            &breakdown(dec!(3000), dec!(1550.02), dec!(0)),
            &[],
            dec!(4550.00),
        )
        .unwrap_err();
        assert_eq!(err.code(), "VALIDATION");
    }

    #[test]
    fn allocations_must_match_credit_channel() {
        let allocations = vec![CreditAllocation {
            creditor_id: Uuid::new_v4(),
            amount: dec!(400),
        }];

        let err = check_balance(
            &breakdown(dec!(3000), dec!(1550), dec!(500)),
            &allocations,
            dec!(5050.00),
        )
        .unwrap_err();
        assert_eq!(err.code(), "VALIDATION");
    }
}

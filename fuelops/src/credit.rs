use crate::audit::AuditEntry;
use crate::auth::AuthUser;
use crate::db::audit_logs::AuditCategory;
use crate::db::audit_logs::AuditSeverity;
use crate::db::credit_transactions::CreditEntryType;
use crate::db::credit_transactions::CreditTransaction;
use crate::db::credit_transactions::NewCreditTransaction;
use crate::db::credit_transactions::NewSettlementLink;
use crate::db::credit_transactions::SettlementLink;
use crate::db::creditors::AgingUpdate;
use crate::db::creditors::Creditor;
use crate::error::ServiceError;
use diesel::Connection;
use diesel::PgConnection;
use fuelops_commons::requests::SettlementLinkRequest;
use rust_decimal::Decimal;
use serde_json::json;
use time::Date;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AgingBuckets {
    pub b0_30: Decimal,
    pub b31_60: Decimal,
    pub b61_90: Decimal,
    pub over_90: Decimal,
}

impl AgingBuckets {
    pub fn total(&self) -> Decimal {
        self.b0_30 + self.b31_60 + self.b61_90 + self.over_90
    }

    fn add(&mut self, age_days: i64, amount: Decimal) {
        match age_days {
            i64::MIN..=30 => self.b0_30 += amount,
            31..=60 => self.b31_60 += amount,
            61..=90 => self.b61_90 += amount,
            _ => self.over_90 += amount,
        }
    }

    fn scale(&self, factor: Decimal) -> AgingBuckets {
        AgingBuckets {
            b0_30: (self.b0_30 * factor).round_dp(2),
            b31_60: (self.b31_60 * factor).round_dp(2),
            b61_90: (self.b61_90 * factor).round_dp(2),
            over_90: (self.over_90 * factor).round_dp(2),
        }
    }
}

/// Distributes outstanding credit across age buckets.
///
/// `credits` carries (transactionDate, originalAmount, allocatedAmount).
/// When settlement links exist the remaining amount per invoice is exact;
/// otherwise the raw buckets are scaled by balance over total credit, which
/// is the documented dashboard approximation.
pub fn compute_aging(
    credits: &[(Date, Decimal, Decimal)],
    balance: Decimal,
    any_links: bool,
    today: Date,
) -> AgingBuckets {
    let mut buckets = AgingBuckets::default();

    if any_links {
        for (date, amount, allocated) in credits {
            let remaining = (*amount - *allocated).max(Decimal::ZERO);
            if remaining > Decimal::ZERO {
                buckets.add((today - *date).whole_days(), remaining);
            }
        }
        return buckets;
    }

    let mut raw_total = Decimal::ZERO;
    for (date, amount, _) in credits {
        raw_total += *amount;
        buckets.add((today - *date).whole_days(), *amount);
    }

    if raw_total.is_zero() || balance >= raw_total {
        return buckets;
    }

    buckets.scale(balance / raw_total)
}

/// `currentBalance > 0` and the last movement is older than the credit
/// period.
pub fn is_overdue(creditor: &Creditor, today: Date) -> bool {
    if creditor.current_balance <= Decimal::ZERO {
        return false;
    }

    match creditor.last_transaction_date {
        Some(last) => (today - last).whole_days() > i64::from(creditor.credit_period_days),
        None => false,
    }
}

/// The derived balance rule: Σ credit − Σ settlement.
pub fn recompute_balance(conn: &mut PgConnection, creditor_id: Uuid) -> Result<Decimal, ServiceError> {
    let credits = CreditTransaction::sum_by_type(conn, creditor_id, CreditEntryType::Credit)?;
    let settlements =
        CreditTransaction::sum_by_type(conn, creditor_id, CreditEntryType::Settlement)?;

    Ok(credits - settlements)
}

pub struct CreditInput {
    pub creditor_id: Uuid,
    pub amount: Decimal,
    pub fuel_type: Option<String>,
    pub litres: Option<Decimal>,
    pub price_per_litre: Option<Decimal>,
    pub reading_id: Option<Uuid>,
    pub invoice_number: Option<String>,
    pub vehicle_number: Option<String>,
    pub transaction_date: Date,
}

/// Records a deferred-payment sale against a creditor, guarding the credit
/// limit and the flag. Balance recomputation happens inside the same
/// transaction as the insert.
pub fn record_credit(
    conn: &mut PgConnection,
    caller: &AuthUser,
    station_id: Uuid,
    input: CreditInput,
) -> Result<CreditTransaction, ServiceError> {
    if input.amount <= Decimal::ZERO {
        return Err(ServiceError::Validation(
            "credit amount must be positive".to_string(),
        ));
    }

    conn.transaction::<_, ServiceError, _>(|conn| {
        let creditor = lock_station_creditor(conn, input.creditor_id, station_id)?;

        if creditor.is_flagged {
            return Err(ServiceError::conflict(
                "CREDITOR_FLAGGED",
                format!(
                    "creditor {} is flagged: {}",
                    creditor.name,
                    creditor.flag_reason.as_deref().unwrap_or("no reason recorded")
                ),
            ));
        }

        if creditor.credit_limit > Decimal::ZERO
            && creditor.current_balance + input.amount > creditor.credit_limit
        {
            return Err(ServiceError::conflict(
                "CREDIT_LIMIT_EXCEEDED",
                format!(
                    "credit of {} would push {} past the limit of {}",
                    input.amount, creditor.name, creditor.credit_limit
                ),
            ));
        }

        let entry = CreditTransaction::insert(
            conn,
            NewCreditTransaction {
                id: Uuid::new_v4(),
                station_id,
                creditor_id: creditor.id,
                transaction_type: CreditEntryType::Credit,
                amount: input.amount,
                fuel_type: input.fuel_type,
                litres: input.litres,
                price_per_litre: input.price_per_litre,
                reading_id: input.reading_id,
                invoice_number: input.invoice_number,
                vehicle_number: input.vehicle_number,
                transaction_date: input.transaction_date,
                entered_by: caller.id,
            },
        )?;

        let balance = recompute_balance(conn, creditor.id)?;
        Creditor::update_balance(
            conn,
            creditor.id,
            balance,
            Some(input.transaction_date),
            creditor.last_payment_date,
        )?;

        AuditEntry::new("credit_create", "credit_transaction")
            .by(caller)
            .station(station_id)
            .entity(entry.id)
            .new_values(json!({
                "creditorId": creditor.id,
                "amount": entry.amount,
                "balance": balance,
            }))
            .category(AuditCategory::Finance)
            .emit(conn)?;

        Ok(entry)
    })
}

pub struct SettlementInput {
    pub creditor_id: Uuid,
    pub amount: Decimal,
    pub transaction_date: Date,
    pub invoice_number: Option<String>,
    pub links: Vec<SettlementLinkRequest>,
}

/// Records a payment and allocates it to outstanding invoices, either via
/// the caller's explicit links or oldest-invoice-first. Any residual stays
/// as unallocated settlement credit on the creditor.
pub fn record_settlement(
    conn: &mut PgConnection,
    caller: &AuthUser,
    station_id: Uuid,
    input: SettlementInput,
    today: Date,
) -> Result<CreditTransaction, ServiceError> {
    if input.amount <= Decimal::ZERO {
        return Err(ServiceError::Validation(
            "settlement amount must be positive".to_string(),
        ));
    }

    let linked_total: Decimal = input.links.iter().map(|l| l.amount).sum();
    if linked_total > input.amount {
        return Err(ServiceError::Validation(
            "settlement links exceed the settlement amount".to_string(),
        ));
    }

    conn.transaction::<_, ServiceError, _>(|conn| {
        let creditor = lock_station_creditor(conn, input.creditor_id, station_id)?;

        let entry = CreditTransaction::insert(
            conn,
            NewCreditTransaction {
                id: Uuid::new_v4(),
                station_id,
                creditor_id: creditor.id,
                transaction_type: CreditEntryType::Settlement,
                amount: input.amount,
                fuel_type: None,
                litres: None,
                price_per_litre: None,
                reading_id: None,
                invoice_number: input.invoice_number,
                vehicle_number: None,
                transaction_date: input.transaction_date,
                entered_by: caller.id,
            },
        )?;

        if input.links.is_empty() {
            allocate_oldest_first(conn, &creditor, entry.id, input.amount)?;
        } else {
            apply_explicit_links(conn, &creditor, entry.id, &input.links)?;
        }

        let balance = recompute_balance(conn, creditor.id)?;
        Creditor::update_balance(
            conn,
            creditor.id,
            balance,
            creditor.last_transaction_date,
            Some(input.transaction_date),
        )?;

        recompute_aging(conn, creditor.id, today)?;

        AuditEntry::new("credit_settle", "credit_transaction")
            .by(caller)
            .station(station_id)
            .entity(entry.id)
            .new_values(json!({
                "creditorId": creditor.id,
                "amount": entry.amount,
                "balance": balance,
            }))
            .category(AuditCategory::Finance)
            .emit(conn)?;

        Ok(entry)
    })
}

fn lock_station_creditor(
    conn: &mut PgConnection,
    creditor_id: Uuid,
    station_id: Uuid,
) -> Result<Creditor, ServiceError> {
    let creditor = Creditor::by_id_locked(conn, creditor_id)?
        .ok_or_else(|| ServiceError::NotFound("creditor".to_string()))?;

    if creditor.station_id != station_id {
        return Err(ServiceError::forbidden_station());
    }
    if !creditor.is_active {
        return Err(ServiceError::conflict(
            "CREDITOR_INACTIVE",
            format!("creditor {} is inactive", creditor.name),
        ));
    }

    Ok(creditor)
}

fn allocate_oldest_first(
    conn: &mut PgConnection,
    creditor: &Creditor,
    settlement_transaction_id: Uuid,
    amount: Decimal,
) -> Result<(), ServiceError> {
    let mut left = amount;

    for credit in CreditTransaction::credits_oldest_first(conn, creditor.id)? {
        if left <= Decimal::ZERO {
            break;
        }

        let allocated = SettlementLink::allocated_against(conn, credit.id)?;
        let open = credit.amount - allocated;
        if open <= Decimal::ZERO {
            continue;
        }

        let take = open.min(left);
        SettlementLink::insert(
            conn,
            NewSettlementLink {
                id: Uuid::new_v4(),
                settlement_transaction_id,
                credit_transaction_id: credit.id,
                amount: take,
            },
        )?;
        left -= take;
    }

    Ok(())
}

fn apply_explicit_links(
    conn: &mut PgConnection,
    creditor: &Creditor,
    settlement_transaction_id: Uuid,
    links: &[SettlementLinkRequest],
) -> Result<(), ServiceError> {
    for link in links {
        if link.amount <= Decimal::ZERO {
            return Err(ServiceError::Validation(
                "settlement link amounts must be positive".to_string(),
            ));
        }

        let credit = CreditTransaction::by_id(conn, link.credit_transaction_id)?
            .ok_or_else(|| ServiceError::NotFound("credit transaction".to_string()))?;

        if credit.creditor_id != creditor.id
            || credit.transaction_type != CreditEntryType::Credit
        {
            return Err(ServiceError::Validation(
                "settlement links must reference this creditor's credit invoices".to_string(),
            ));
        }

        let allocated = SettlementLink::allocated_against(conn, credit.id)?;
        if allocated + link.amount > credit.amount {
            return Err(ServiceError::conflict(
                "OVER_ALLOCATED",
                format!(
                    "allocation of {} exceeds the open amount on invoice {}",
                    link.amount,
                    credit.invoice_number.as_deref().unwrap_or("(unnumbered)")
                ),
            ));
        }

        SettlementLink::insert(
            conn,
            NewSettlementLink {
                id: Uuid::new_v4(),
                settlement_transaction_id,
                credit_transaction_id: credit.id,
                amount: link.amount,
            },
        )?;
    }

    Ok(())
}

/// Recomputes and caches the aging buckets for one creditor.
pub fn recompute_aging(
    conn: &mut PgConnection,
    creditor_id: Uuid,
    today: Date,
) -> Result<AgingBuckets, ServiceError> {
    let creditor = Creditor::by_id(conn, creditor_id)?
        .ok_or_else(|| ServiceError::NotFound("creditor".to_string()))?;

    let credits = CreditTransaction::credits_oldest_first(conn, creditor_id)?;
    let mut rows = Vec::with_capacity(credits.len());
    let mut any_links = false;

    for credit in &credits {
        let allocated = SettlementLink::allocated_against(conn, credit.id)?;
        if allocated > Decimal::ZERO {
            any_links = true;
        }
        rows.push((credit.transaction_date, credit.amount, allocated));
    }

    let buckets = compute_aging(&rows, creditor.current_balance, any_links, today);

    Creditor::update_aging(
        conn,
        creditor_id,
        AgingUpdate {
            aging_0_30: buckets.b0_30,
            aging_31_60: buckets.b31_60,
            aging_61_90: buckets.b61_90,
            aging_over_90: buckets.over_90,
        },
    )?;

    Ok(buckets)
}

/// Removing a ledger entry recomputes the balance in the same transaction.
pub fn delete_transaction(
    conn: &mut PgConnection,
    caller: &AuthUser,
    transaction_id: Uuid,
    today: Date,
) -> Result<(), ServiceError> {
    conn.transaction::<_, ServiceError, _>(|conn| {
        let entry = CreditTransaction::by_id(conn, transaction_id)?
            .ok_or_else(|| ServiceError::NotFound("credit transaction".to_string()))?;

        let creditor = Creditor::by_id_locked(conn, entry.creditor_id)?
            .ok_or_else(|| ServiceError::NotFound("creditor".to_string()))?;

        match entry.transaction_type {
            CreditEntryType::Settlement => {
                SettlementLink::delete_for_settlement_transaction(conn, entry.id)?;
            }
            CreditEntryType::Credit => {
                let allocated = SettlementLink::allocated_against(conn, entry.id)?;
                if allocated > Decimal::ZERO {
                    return Err(ServiceError::conflict(
                        "INVOICE_SETTLED",
                        "credit invoice already has settlements allocated against it",
                    ));
                }
            }
        }

        CreditTransaction::delete(conn, entry.id)?;

        let balance = recompute_balance(conn, creditor.id)?;
        Creditor::update_balance(
            conn,
            creditor.id,
            balance,
            creditor.last_transaction_date,
            creditor.last_payment_date,
        )?;
        recompute_aging(conn, creditor.id, today)?;

        AuditEntry::new("credit_delete", "credit_transaction")
            .by(caller)
            .station(entry.station_id)
            .entity(entry.id)
            .old(json!({ "amount": entry.amount, "type": format!("{:?}", entry.transaction_type) }))
            .severity(AuditSeverity::Warning)
            .category(AuditCategory::Finance)
            .emit(conn)?;

        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use time::macros::date;

    #[test]
    fn buckets_split_by_age() {
        let today = date!(2024 - 06 - 30);
        let credits = vec![
            (date!(2024 - 06 - 20), dec!(100), dec!(0)), // 10 days
            (date!(2024 - 05 - 15), dec!(200), dec!(0)), // 46 days
            (date!(2024 - 04 - 10), dec!(300), dec!(0)), // 81 days
            (date!(2024 - 01 - 01), dec!(400), dec!(0)), // 181 days
        ];

        let buckets = compute_aging(&credits, dec!(1000), false, today);
        assert_eq!(buckets.b0_30, dec!(100));
        assert_eq!(buckets.b31_60, dec!(200));
        assert_eq!(buckets.b61_90, dec!(300));
        assert_eq!(buckets.over_90, dec!(400));
    }

    #[test]
    fn buckets_scale_without_links() {
        let today = date!(2024 - 06 - 30);
        let credits = vec![
            (date!(2024 - 06 - 20), dec!(100), dec!(0)),
            (date!(2024 - 05 - 15), dec!(300), dec!(0)),
        ];

        // Half the credit has been settled without per-invoice links.
        let buckets = compute_aging(&credits, dec!(200), false, today);
        assert_eq!(buckets.b0_30, dec!(50));
        assert_eq!(buckets.b31_60, dec!(150));
        assert_eq!(buckets.total(), dec!(200));
    }

    #[test]
    fn buckets_are_exact_with_links() {
        let today = date!(2024 - 06 - 30);
        let credits = vec![
            (date!(2024 - 06 - 20), dec!(100), dec!(100)), // fully settled
            (date!(2024 - 05 - 15), dec!(300), dec!(50)),
        ];

        let buckets = compute_aging(&credits, dec!(250), true, today);
        assert_eq!(buckets.b0_30, dec!(0));
        assert_eq!(buckets.b31_60, dec!(250));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn amount() -> impl Strategy<Value = Decimal> {
            (1i64..10_000_000).prop_map(|paise| Decimal::new(paise, 2))
        }

        fn day_offset() -> impl Strategy<Value = i64> {
            0i64..400
        }

        proptest! {
            #[test]
            fn scaled_buckets_sum_to_balance(
                entries in proptest::collection::vec((day_offset(), amount()), 1..20),
                settled_fraction in 0u32..100,
            ) {
                let today = date!(2024 - 06 - 30);
                let credits: Vec<(Date, Decimal, Decimal)> = entries
                    .iter()
                    .map(|(age, amount)| (today - time::Duration::days(*age), *amount, Decimal::ZERO))
                    .collect();

                let raw_total: Decimal = credits.iter().map(|(_, a, _)| *a).sum();
                let balance = (raw_total * Decimal::from(settled_fraction) / Decimal::from(100u32))
                    .round_dp(2);

                let buckets = compute_aging(&credits, balance, false, today);

                // Scaling keeps the bucket total within rounding of the
                // balance (four buckets, half a paisa each).
                prop_assert!((buckets.total() - balance).abs() <= Decimal::new(2, 2));
            }

            #[test]
            fn exact_buckets_sum_to_open_amounts(
                entries in proptest::collection::vec((day_offset(), amount()), 1..20),
            ) {
                let today = date!(2024 - 06 - 30);
                let credits: Vec<(Date, Decimal, Decimal)> = entries
                    .iter()
                    .map(|(age, amount)| {
                        let allocated = (*amount / Decimal::from(2u32)).round_dp(2);
                        (today - time::Duration::days(*age), *amount, allocated)
                    })
                    .collect();

                let open: Decimal = credits
                    .iter()
                    .map(|(_, amount, allocated)| *amount - *allocated)
                    .sum();

                let buckets = compute_aging(&credits, open, true, today);
                prop_assert_eq!(buckets.total(), open);
            }
        }
    }

    #[test]
    fn overdue_needs_balance_and_age() {
        let mut creditor = Creditor {
            id: Uuid::new_v4(),
            station_id: Uuid::new_v4(),
            name: "Acme Haulage".to_string(),
            business_name: None,
            contact: None,
            credit_limit: dec!(10000),
            credit_period_days: 30,
            current_balance: dec!(500),
            aging_0_30: Decimal::ZERO,
            aging_31_60: Decimal::ZERO,
            aging_61_90: Decimal::ZERO,
            aging_over_90: Decimal::ZERO,
            last_transaction_date: Some(date!(2024 - 05 - 01)),
            last_payment_date: None,
            is_flagged: false,
            flag_reason: None,
            is_active: true,
            created_at: time::OffsetDateTime::UNIX_EPOCH,
        };

        assert!(is_overdue(&creditor, date!(2024 - 06 - 15)));
        assert!(!is_overdue(&creditor, date!(2024 - 05 - 20)));

        creditor.current_balance = Decimal::ZERO;
        assert!(!is_overdue(&creditor, date!(2024 - 06 - 15)));
    }
}

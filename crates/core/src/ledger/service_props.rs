//! Property-based tests for PostingService.

use chrono::NaiveDate;
use koperasi_shared::types::{AccountId, PeriodId, TenantId, UserId};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::error::LedgerError;
use super::service::{AccountInfo, PostingService};
use super::types::{JournalLineInput, PostJournalInput};

/// Strategy to generate positive amounts in whole rupiah (1 to 10,000,000).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(Decimal::from)
}

fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (0u64..1000).prop_map(|d| NaiveDate::from_ymd_opt(2023, 1, 1).unwrap() + chrono::Days::new(d))
}

fn postable(tenant_id: TenantId) -> impl Fn(AccountId) -> Option<AccountInfo> {
    move |id| {
        Some(AccountInfo {
            id,
            tenant_id,
            is_active: true,
            is_header: false,
        })
    }
}

/// Builds a journal that debits each amount to its own account and credits
/// the total to one account.
fn balanced_input(tenant_id: TenantId, date: NaiveDate, amounts: &[Decimal]) -> PostJournalInput {
    let mut lines: Vec<JournalLineInput> = amounts
        .iter()
        .map(|a| JournalLineInput::debit(AccountId::new(), *a))
        .collect();
    lines.push(JournalLineInput::credit(AccountId::new(), amounts.iter().copied().sum()));
    PostJournalInput {
        tenant_id,
        business_unit: "simpan-pinjam".into(),
        transaction_date: date,
        description: "generated".into(),
        reference_id: None,
        reference_type: None,
        lines,
        created_by: UserId::new(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_balanced_journals_validate_with_equal_totals(
        amounts in prop::collection::vec(positive_amount(), 1..8),
        date in date_strategy(),
    ) {
        let tenant_id = TenantId::new();
        let input = balanced_input(tenant_id, date, &amounts);
        let validated = PostingService::validate(&input, 0, postable(tenant_id), |_| None).unwrap();
        prop_assert_eq!(validated.totals.total_debit, validated.totals.total_credit);
        prop_assert_eq!(validated.lines.len(), amounts.len() + 1);
    }

    #[test]
    fn prop_any_imbalance_is_rejected(
        amounts in prop::collection::vec(positive_amount(), 1..8),
        skew in positive_amount(),
        date in date_strategy(),
    ) {
        let tenant_id = TenantId::new();
        let mut input = balanced_input(tenant_id, date, &amounts);
        input.lines[0].debit += skew;
        let result = PostingService::validate(&input, 0, postable(tenant_id), |_| None);
        let is_unbalanced = matches!(result, Err(LedgerError::UnbalancedEntry { .. }));
        prop_assert!(is_unbalanced);
    }

    #[test]
    fn prop_closed_period_rejects_regardless_of_balance(
        amounts in prop::collection::vec(positive_amount(), 1..8),
        skew in 0i64..1000,
        date in date_strategy(),
    ) {
        let tenant_id = TenantId::new();
        let mut input = balanced_input(tenant_id, date, &amounts);
        input.lines[0].debit += Decimal::from(skew);
        let period_id = PeriodId::new();

        let result = PostingService::validate(&input, 0, postable(tenant_id), |_| Some(period_id));
        prop_assert_eq!(result, Err(LedgerError::PeriodClosed { date, period_id }));
    }

    #[test]
    fn prop_validated_amounts_fit_currency_scale(
        raw in prop::collection::vec(1i64..100_000_000i64, 1..6),
        scale in 0u32..4,
    ) {
        let tenant_id = TenantId::new();
        let amounts: Vec<Decimal> = raw.iter().map(|v| Decimal::new(*v, 4)).collect();
        let input = balanced_input(tenant_id, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(), &amounts);

        if let Ok(validated) = PostingService::validate(&input, scale, postable(tenant_id), |_| None) {
            for line in &validated.lines {
                prop_assert!(line.debit.scale() <= scale);
                prop_assert!(line.credit.scale() <= scale);
            }
        }
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_foreign_tenant_account_never_validates() {
        let tenant_id = TenantId::new();
        let input = balanced_input(
            tenant_id,
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            &[Decimal::from(10)],
        );
        let result = PostingService::validate(&input, 2, postable(TenantId::new()), |_| None);
        assert!(matches!(result, Err(LedgerError::UnknownAccount { .. })));
    }
}

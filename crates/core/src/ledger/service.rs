//! Posting service: the validation half of the single ledger write path.
//!
//! Pure business logic. The persistence layer resolves accounts and periods
//! inside its transaction, calls [`PostingService::validate`], and inserts the
//! returned [`ValidatedJournal`] atomically.

use chrono::NaiveDate;
use koperasi_shared::config::MAX_CURRENCY_SCALE;
use koperasi_shared::types::{AccountId, PeriodId, TenantId};
use rust_decimal::{Decimal, RoundingStrategy};

use super::error::{LedgerError, UnknownAccountReason};
use super::types::{
    JournalLineInput, JournalTotals, MAX_LINE_AMOUNT, PostJournalInput, ValidatedJournal, ValidatedLine,
};
use crate::coa::Account;

/// What posting needs to know about a referenced account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountInfo {
    /// The account ID.
    pub id: AccountId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Whether the account is active.
    pub is_active: bool,
    /// Whether the account is an aggregation header.
    pub is_header: bool,
}

impl From<&Account> for AccountInfo {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            tenant_id: account.tenant_id,
            is_active: account.is_active,
            is_header: account.is_header,
        }
    }
}

/// Stateless journal posting rules.
pub struct PostingService;

impl PostingService {
    /// Validates a journal before it is persisted.
    ///
    /// Steps, fail-fast:
    /// 1. at least one line
    /// 2. every account resolves to an active, non-header account of the
    ///    tenant; amounts are non-negative, rounded to `currency_scale` and
    ///    below [`MAX_LINE_AMOUNT`]
    /// 3. the transaction date is not inside a closed period
    /// 4. total debit equals total credit exactly
    ///
    /// The period check runs before the balance check, so a journal dated in
    /// a closed period is rejected with `PeriodClosed` whatever its amounts.
    ///
    /// # Arguments
    ///
    /// * `input` - The journal to validate
    /// * `currency_scale` - Decimal places of the smallest currency unit,
    ///   capped at [`MAX_CURRENCY_SCALE`]
    /// * `account_lookup` - Resolves an account id within the tenant
    /// * `closed_period_lookup` - Returns the closed period containing a date
    pub fn validate<A, P>(
        input: &PostJournalInput,
        currency_scale: u32,
        account_lookup: A,
        closed_period_lookup: P,
    ) -> Result<ValidatedJournal, LedgerError>
    where
        A: Fn(AccountId) -> Option<AccountInfo>,
        P: Fn(NaiveDate) -> Option<PeriodId>,
    {
        if input.lines.is_empty() {
            return Err(LedgerError::EmptyJournal);
        }

        let lines = input
            .lines
            .iter()
            .map(|line| Self::validate_line(input.tenant_id, line, currency_scale, &account_lookup))
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(period_id) = closed_period_lookup(input.transaction_date) {
            return Err(LedgerError::PeriodClosed {
                date: input.transaction_date,
                period_id,
            });
        }

        let totals = JournalTotals::from_lines(&lines)
            .ok_or(LedgerError::AmountOutOfRange { account_id: None })?;
        if !totals.is_balanced {
            return Err(LedgerError::UnbalancedEntry {
                debit: totals.total_debit,
                credit: totals.total_credit,
            });
        }

        Ok(ValidatedJournal { lines, totals })
    }

    fn validate_line<A>(
        tenant_id: TenantId,
        line: &JournalLineInput,
        currency_scale: u32,
        account_lookup: &A,
    ) -> Result<ValidatedLine, LedgerError>
    where
        A: Fn(AccountId) -> Option<AccountInfo>,
    {
        Self::check_account(tenant_id, line.account_id, account_lookup)?;

        if line.debit < Decimal::ZERO || line.credit < Decimal::ZERO {
            return Err(LedgerError::NegativeAmount {
                account_id: line.account_id,
            });
        }

        let debit = Self::round_amount(line.debit, currency_scale);
        let credit = Self::round_amount(line.credit, currency_scale);
        if debit >= MAX_LINE_AMOUNT || credit >= MAX_LINE_AMOUNT {
            return Err(LedgerError::AmountOutOfRange {
                account_id: Some(line.account_id),
            });
        }

        Ok(ValidatedLine {
            account_id: line.account_id,
            debit,
            credit,
            description: line.description.clone(),
        })
    }

    /// Resolves an account and checks it can receive postings for the tenant.
    pub fn check_account<A>(
        tenant_id: TenantId,
        account_id: AccountId,
        account_lookup: &A,
    ) -> Result<AccountInfo, LedgerError>
    where
        A: Fn(AccountId) -> Option<AccountInfo>,
    {
        let reject = |reason| LedgerError::UnknownAccount { account_id, reason };

        let info = account_lookup(account_id).ok_or_else(|| reject(UnknownAccountReason::NotFound))?;
        if info.tenant_id != tenant_id {
            return Err(reject(UnknownAccountReason::OtherTenant));
        }
        if !info.is_active {
            return Err(reject(UnknownAccountReason::Inactive));
        }
        if info.is_header {
            return Err(reject(UnknownAccountReason::Header));
        }
        Ok(info)
    }

    /// Rounds an amount to the currency scale with banker's rounding.
    ///
    /// Scales finer than the store keeps are capped at
    /// [`MAX_CURRENCY_SCALE`], so a validated total is the total committed.
    #[must_use]
    pub fn round_amount(amount: Decimal, currency_scale: u32) -> Decimal {
        amount.round_dp_with_strategy(
            currency_scale.min(MAX_CURRENCY_SCALE),
            RoundingStrategy::MidpointNearestEven,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use koperasi_shared::types::UserId;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    struct Fixture {
        tenant_id: TenantId,
        cash: AccountId,
        capital: AccountId,
        accounts: HashMap<AccountId, AccountInfo>,
    }

    impl Fixture {
        fn new() -> Self {
            let tenant_id = TenantId::new();
            let cash = AccountId::new();
            let capital = AccountId::new();
            let mut accounts = HashMap::new();
            for id in [cash, capital] {
                accounts.insert(
                    id,
                    AccountInfo {
                        id,
                        tenant_id,
                        is_active: true,
                        is_header: false,
                    },
                );
            }
            Self {
                tenant_id,
                cash,
                capital,
                accounts,
            }
        }

        fn add(&mut self, info: AccountInfo) {
            self.accounts.insert(info.id, info);
        }

        fn lookup(&self) -> impl Fn(AccountId) -> Option<AccountInfo> + '_ {
            |id| self.accounts.get(&id).copied()
        }

        fn input(&self, date: NaiveDate, lines: Vec<JournalLineInput>) -> PostJournalInput {
            PostJournalInput {
                tenant_id: self.tenant_id,
                business_unit: "simpan-pinjam".into(),
                transaction_date: date,
                description: "Setoran simpanan pokok".into(),
                reference_id: None,
                reference_type: None,
                lines,
                created_by: UserId::new(),
            }
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn no_closed_period(_: NaiveDate) -> Option<PeriodId> {
        None
    }

    #[test]
    fn test_balanced_journal_validates() {
        let fx = Fixture::new();
        let input = fx.input(
            date(2025, 1, 2),
            vec![
                JournalLineInput::debit(fx.cash, dec!(1000000)),
                JournalLineInput::credit(fx.capital, dec!(1000000)),
            ],
        );

        let validated = PostingService::validate(&input, 2, fx.lookup(), no_closed_period).unwrap();
        assert_eq!(validated.lines.len(), 2);
        assert_eq!(validated.totals.total_debit, dec!(1000000));
        assert_eq!(validated.totals.total_credit, dec!(1000000));
        assert!(validated.totals.is_balanced);
    }

    #[test]
    fn test_empty_journal_rejected() {
        let fx = Fixture::new();
        let input = fx.input(date(2025, 1, 2), vec![]);
        assert_eq!(
            PostingService::validate(&input, 2, fx.lookup(), no_closed_period),
            Err(LedgerError::EmptyJournal)
        );
    }

    #[test]
    fn test_unbalanced_journal_rejected() {
        let fx = Fixture::new();
        let input = fx.input(
            date(2025, 1, 2),
            vec![
                JournalLineInput::debit(fx.cash, dec!(1000)),
                JournalLineInput::credit(fx.capital, dec!(500)),
            ],
        );
        assert_eq!(
            PostingService::validate(&input, 2, fx.lookup(), no_closed_period),
            Err(LedgerError::UnbalancedEntry {
                debit: dec!(1000),
                credit: dec!(500),
            })
        );
    }

    #[test]
    fn test_closed_period_wins_over_unbalanced() {
        let fx = Fixture::new();
        let closed = PeriodId::new();
        let december = |d: NaiveDate| (d >= date(2024, 12, 1) && d <= date(2024, 12, 31)).then_some(closed);

        let unbalanced = fx.input(
            date(2024, 12, 15),
            vec![
                JournalLineInput::debit(fx.cash, dec!(1000)),
                JournalLineInput::credit(fx.capital, dec!(500)),
            ],
        );
        assert_eq!(
            PostingService::validate(&unbalanced, 2, fx.lookup(), december),
            Err(LedgerError::PeriodClosed {
                date: date(2024, 12, 15),
                period_id: closed,
            })
        );

        let balanced_next_year = fx.input(
            date(2025, 1, 2),
            vec![
                JournalLineInput::debit(fx.cash, dec!(1000)),
                JournalLineInput::credit(fx.capital, dec!(1000)),
            ],
        );
        assert!(PostingService::validate(&balanced_next_year, 2, fx.lookup(), december).is_ok());
    }

    #[test]
    fn test_account_rejections() {
        let mut fx = Fixture::new();
        let header = AccountId::new();
        let inactive = AccountId::new();
        let foreign = AccountId::new();
        fx.add(AccountInfo {
            id: header,
            tenant_id: fx.tenant_id,
            is_active: true,
            is_header: true,
        });
        fx.add(AccountInfo {
            id: inactive,
            tenant_id: fx.tenant_id,
            is_active: false,
            is_header: false,
        });
        fx.add(AccountInfo {
            id: foreign,
            tenant_id: TenantId::new(),
            is_active: true,
            is_header: false,
        });

        let cases = [
            (AccountId::new(), UnknownAccountReason::NotFound),
            (header, UnknownAccountReason::Header),
            (inactive, UnknownAccountReason::Inactive),
            (foreign, UnknownAccountReason::OtherTenant),
        ];
        for (account_id, reason) in cases {
            let input = fx.input(
                date(2025, 1, 2),
                vec![
                    JournalLineInput::debit(account_id, dec!(10)),
                    JournalLineInput::credit(fx.capital, dec!(10)),
                ],
            );
            assert_eq!(
                PostingService::validate(&input, 2, fx.lookup(), no_closed_period),
                Err(LedgerError::UnknownAccount { account_id, reason })
            );
        }
    }

    #[test]
    fn test_negative_amount_rejected() {
        let fx = Fixture::new();
        let input = fx.input(
            date(2025, 1, 2),
            vec![
                JournalLineInput::debit(fx.cash, dec!(-10)),
                JournalLineInput::credit(fx.capital, dec!(-10)),
            ],
        );
        assert_eq!(
            PostingService::validate(&input, 2, fx.lookup(), no_closed_period),
            Err(LedgerError::NegativeAmount { account_id: fx.cash })
        );
    }

    #[test]
    fn test_amounts_rounded_to_currency_scale_before_balance_check() {
        let fx = Fixture::new();
        let input = fx.input(
            date(2025, 1, 2),
            vec![
                JournalLineInput::debit(fx.cash, dec!(100.005)),
                JournalLineInput::credit(fx.capital, dec!(100.00)),
            ],
        );
        let validated = PostingService::validate(&input, 2, fx.lookup(), no_closed_period).unwrap();
        assert_eq!(validated.lines[0].debit, dec!(100.00));

        let input = fx.input(
            date(2025, 1, 2),
            vec![
                JournalLineInput::debit(fx.cash, dec!(100.015)),
                JournalLineInput::credit(fx.capital, dec!(100.01)),
            ],
        );
        assert!(matches!(
            PostingService::validate(&input, 2, fx.lookup(), no_closed_period),
            Err(LedgerError::UnbalancedEntry { .. })
        ));
    }

    #[test]
    fn test_overflowing_totals_are_rejected_not_panicking() {
        let fx = Fixture::new();
        let input = fx.input(
            date(2025, 1, 2),
            vec![
                JournalLineInput::debit(fx.cash, Decimal::MAX),
                JournalLineInput::debit(fx.cash, Decimal::MAX),
                JournalLineInput::credit(fx.capital, Decimal::MAX),
                JournalLineInput::credit(fx.capital, Decimal::MAX),
            ],
        );
        assert_eq!(
            PostingService::validate(&input, 2, fx.lookup(), no_closed_period),
            Err(LedgerError::AmountOutOfRange {
                account_id: Some(fx.cash)
            })
        );
    }

    #[test]
    fn test_totals_overflow_is_detected() {
        let line = |debit, credit| ValidatedLine {
            account_id: AccountId::new(),
            debit,
            credit,
            description: None,
        };
        let lines = [line(Decimal::MAX, Decimal::ZERO), line(Decimal::MAX, Decimal::ZERO)];
        assert_eq!(JournalTotals::from_lines(&lines), None);

        let lines = [line(dec!(10), dec!(0)), line(dec!(0), dec!(10))];
        assert!(JournalTotals::from_lines(&lines).unwrap().is_balanced);
    }

    #[test]
    fn test_line_amount_must_fit_the_store() {
        let fx = Fixture::new();
        assert_eq!(MAX_LINE_AMOUNT, dec!(1000000000000000));

        let too_large = fx.input(
            date(2025, 1, 2),
            vec![
                JournalLineInput::debit(fx.cash, dec!(1000000000000000)),
                JournalLineInput::credit(fx.capital, dec!(1000000000000000)),
            ],
        );
        assert_eq!(
            PostingService::validate(&too_large, 2, fx.lookup(), no_closed_period),
            Err(LedgerError::AmountOutOfRange {
                account_id: Some(fx.cash)
            })
        );

        // Rounds up to the limit.
        let rounds_over = fx.input(
            date(2025, 1, 2),
            vec![
                JournalLineInput::debit(fx.cash, dec!(999999999999999.999)),
                JournalLineInput::credit(fx.capital, dec!(999999999999999.999)),
            ],
        );
        assert!(matches!(
            PostingService::validate(&rounds_over, 2, fx.lookup(), no_closed_period),
            Err(LedgerError::AmountOutOfRange { .. })
        ));

        let largest = fx.input(
            date(2025, 1, 2),
            vec![
                JournalLineInput::debit(fx.cash, dec!(999999999999999.99)),
                JournalLineInput::credit(fx.capital, dec!(999999999999999.99)),
            ],
        );
        assert!(PostingService::validate(&largest, 2, fx.lookup(), no_closed_period).is_ok());
    }

    #[test]
    fn test_scale_finer_than_store_is_capped() {
        let fx = Fixture::new();
        assert_eq!(PostingService::round_amount(dec!(0.00005), 6), dec!(0.0000));
        assert_eq!(PostingService::round_amount(dec!(0.00015), 6), dec!(0.0002));

        // Balances at six places but not at the stored four.
        let input = fx.input(
            date(2025, 1, 2),
            vec![
                JournalLineInput::debit(fx.cash, dec!(0.00005)),
                JournalLineInput::debit(fx.cash, dec!(0.00005)),
                JournalLineInput::credit(fx.capital, dec!(0.0001)),
            ],
        );
        assert!(matches!(
            PostingService::validate(&input, 6, fx.lookup(), no_closed_period),
            Err(LedgerError::UnbalancedEntry { .. })
        ));
    }

    #[test]
    fn test_round_amount_uses_bankers_rounding() {
        assert_eq!(PostingService::round_amount(dec!(2.345), 2), dec!(2.34));
        assert_eq!(PostingService::round_amount(dec!(2.355), 2), dec!(2.36));
        assert_eq!(PostingService::round_amount(dec!(1500.5), 0), dec!(1500));
        assert_eq!(PostingService::round_amount(dec!(1501.5), 0), dec!(1502));
    }
}

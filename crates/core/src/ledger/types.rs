//! Domain types for journal posting.

use chrono::{DateTime, NaiveDate, Utc};
use koperasi_shared::types::{AccountId, JournalId, JournalLineId, TenantId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// `reference_type` used by reversing journals.
pub const REVERSAL_REFERENCE_TYPE: &str = "reversal";

/// Exclusive upper bound of a line amount (10^15). Amounts are stored as
/// `NUMERIC(19, 4)`, which keeps 15 integer digits.
pub const MAX_LINE_AMOUNT: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

/// One requested journal line.
///
/// By convention exactly one of `debit`/`credit` is non-zero, but only the
/// journal-level balance is enforced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalLineInput {
    /// Account to post to.
    pub account_id: AccountId,
    /// Debit amount (>= 0).
    #[serde(default)]
    pub debit: Decimal,
    /// Credit amount (>= 0).
    #[serde(default)]
    pub credit: Decimal,
    /// Optional line memo.
    #[serde(default)]
    pub description: Option<String>,
}

impl JournalLineInput {
    /// A debit-only line.
    #[must_use]
    pub fn debit(account_id: AccountId, amount: Decimal) -> Self {
        Self {
            account_id,
            debit: amount,
            credit: Decimal::ZERO,
            description: None,
        }
    }

    /// A credit-only line.
    #[must_use]
    pub fn credit(account_id: AccountId, amount: Decimal) -> Self {
        Self {
            account_id,
            debit: Decimal::ZERO,
            credit: amount,
            description: None,
        }
    }
}

/// Input to the single ledger write path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostJournalInput {
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Producing business unit (e.g. "simpan-pinjam", "toko").
    pub business_unit: String,
    /// Accounting date of the journal.
    pub transaction_date: NaiveDate,
    /// Narrative.
    pub description: String,
    /// Producer-side identifier used for idempotent retries.
    #[serde(default)]
    pub reference_id: Option<String>,
    /// Producer-side reference kind.
    #[serde(default)]
    pub reference_type: Option<String>,
    /// At least one line.
    pub lines: Vec<JournalLineInput>,
    /// Author.
    pub created_by: UserId,
}

/// A line after amount normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedLine {
    /// Account posted to.
    pub account_id: AccountId,
    /// Debit rounded to currency scale.
    pub debit: Decimal,
    /// Credit rounded to currency scale.
    pub credit: Decimal,
    /// Optional line memo.
    pub description: Option<String>,
}

/// Journal totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalTotals {
    /// Sum of debits.
    pub total_debit: Decimal,
    /// Sum of credits.
    pub total_credit: Decimal,
    /// Whether debits equal credits exactly.
    pub is_balanced: bool,
}

impl JournalTotals {
    /// Sums the lines, or `None` if a total overflows.
    #[must_use]
    pub fn from_lines(lines: &[ValidatedLine]) -> Option<Self> {
        Self::sum(lines.iter().map(|l| (l.debit, l.credit)))
    }

    fn sum<I>(amounts: I) -> Option<Self>
    where
        I: IntoIterator<Item = (Decimal, Decimal)>,
    {
        let (total_debit, total_credit) = amounts.into_iter().try_fold(
            (Decimal::ZERO, Decimal::ZERO),
            |(debit, credit), (d, c)| Some((debit.checked_add(d)?, credit.checked_add(c)?)),
        )?;
        Some(Self {
            total_debit,
            total_credit,
            is_balanced: total_debit == total_credit,
        })
    }
}

/// A journal that passed every posting rule and may be persisted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedJournal {
    /// Normalized lines, in input order.
    pub lines: Vec<ValidatedLine>,
    /// Totals (always balanced).
    pub totals: JournalTotals,
}

/// Outcome of a successful post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingReceipt {
    /// Id of the posted journal.
    pub journal_id: JournalId,
    /// True if an earlier journal with the same reference was returned
    /// instead of posting a new one.
    pub replayed: bool,
}

/// A persisted journal line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalLine {
    /// Line id.
    pub id: JournalLineId,
    /// Owning journal.
    pub journal_id: JournalId,
    /// Account posted to.
    pub account_id: AccountId,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Optional line memo.
    pub description: Option<String>,
}

/// A persisted, immutable journal with its lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Journal {
    /// Journal id.
    pub id: JournalId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Producing business unit.
    pub business_unit: String,
    /// Accounting date.
    pub transaction_date: NaiveDate,
    /// Narrative.
    pub description: String,
    /// Producer reference id.
    pub reference_id: Option<String>,
    /// Producer reference kind.
    pub reference_type: Option<String>,
    /// Journal this one reverses, if it is a reversal.
    pub reverses_journal_id: Option<JournalId>,
    /// Author.
    pub created_by: UserId,
    /// Commit timestamp.
    pub created_at: DateTime<Utc>,
    /// Lines in insertion order.
    pub lines: Vec<JournalLine>,
}

impl Journal {
    /// Sums the persisted lines, or `None` if a total overflows.
    #[must_use]
    pub fn totals(&self) -> Option<JournalTotals> {
        JournalTotals::sum(self.lines.iter().map(|l| (l.debit, l.credit)))
    }
}

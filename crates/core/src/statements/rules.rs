//! Code-prefix classification rules.
//!
//! Which statement bucket an account lands in (cash, current vs non-current,
//! operating vs other) is data: an ordered table of `code_prefix -> bucket`
//! rows. The longest prefix whose bucket matches the account's type wins;
//! accounts no rule covers fall back to a per-type default.

use std::fmt;
use std::str::FromStr;

use koperasi_shared::config::ClassificationRuleConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coa::AccountType;

/// Statement bucket an account is classified into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    /// Cash and bank; reconciled by the cash flow statement.
    Cash,
    /// Member and trade receivables.
    Receivable,
    /// Other current assets (inventory, prepaid).
    OtherCurrentAsset,
    /// Fixed and other non-current assets.
    NonCurrentAsset,
    /// Obligations due within a year.
    CurrentLiability,
    /// Obligations due after a year.
    LongTermLiability,
    /// Member capital (simpanan pokok, simpanan wajib, donations).
    PaidInCapital,
    /// Reserves and retained surplus.
    RetainedEarnings,
    /// Revenue from the cooperative's core business.
    OperatingRevenue,
    /// Non-operating revenue.
    OtherRevenue,
    /// Expenses of the core business.
    OperatingExpense,
    /// Non-operating expenses.
    OtherExpense,
}

impl Bucket {
    /// Every bucket.
    pub const ALL: [Self; 12] = [
        Self::Cash,
        Self::Receivable,
        Self::OtherCurrentAsset,
        Self::NonCurrentAsset,
        Self::CurrentLiability,
        Self::LongTermLiability,
        Self::PaidInCapital,
        Self::RetainedEarnings,
        Self::OperatingRevenue,
        Self::OtherRevenue,
        Self::OperatingExpense,
        Self::OtherExpense,
    ];

    /// The account type this bucket belongs to.
    #[must_use]
    pub const fn account_type(self) -> AccountType {
        match self {
            Self::Cash | Self::Receivable | Self::OtherCurrentAsset | Self::NonCurrentAsset => {
                AccountType::Asset
            }
            Self::CurrentLiability | Self::LongTermLiability => AccountType::Liability,
            Self::PaidInCapital | Self::RetainedEarnings => AccountType::Equity,
            Self::OperatingRevenue | Self::OtherRevenue => AccountType::Revenue,
            Self::OperatingExpense | Self::OtherExpense => AccountType::Expense,
        }
    }

    /// Bucket for accounts no rule covers.
    #[must_use]
    pub const fn fallback(account_type: AccountType) -> Self {
        match account_type {
            AccountType::Asset => Self::NonCurrentAsset,
            AccountType::Liability => Self::LongTermLiability,
            AccountType::Equity => Self::RetainedEarnings,
            AccountType::Revenue => Self::OtherRevenue,
            AccountType::Expense => Self::OtherExpense,
        }
    }

    /// True for cash, receivable and other current assets.
    #[must_use]
    pub const fn is_current_asset(self) -> bool {
        matches!(self, Self::Cash | Self::Receivable | Self::OtherCurrentAsset)
    }

    /// Snake-case name as configured.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Receivable => "receivable",
            Self::OtherCurrentAsset => "other_current_asset",
            Self::NonCurrentAsset => "non_current_asset",
            Self::CurrentLiability => "current_liability",
            Self::LongTermLiability => "long_term_liability",
            Self::PaidInCapital => "paid_in_capital",
            Self::RetainedEarnings => "retained_earnings",
            Self::OperatingRevenue => "operating_revenue",
            Self::OtherRevenue => "other_revenue",
            Self::OperatingExpense => "operating_expense",
            Self::OtherExpense => "other_expense",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Bucket {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|b| b.as_str() == s)
            .ok_or_else(|| RuleError::UnknownBucket(s.to_string()))
    }
}

/// Errors in a classification table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    /// A rule has an empty code prefix.
    #[error("Classification rule has an empty code prefix")]
    EmptyPrefix,

    /// A rule names a bucket that does not exist.
    #[error("Unknown classification bucket: {0}")]
    UnknownBucket(String),

    /// Two rules map the same prefix for the same account type.
    #[error("Duplicate classification prefix {0}")]
    DuplicatePrefix(String),
}

/// One row of the classification table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationRule {
    /// Account code prefix.
    pub code_prefix: String,
    /// Target bucket.
    pub bucket: Bucket,
}

impl ClassificationRule {
    fn new(code_prefix: &str, bucket: Bucket) -> Self {
        Self {
            code_prefix: code_prefix.to_string(),
            bucket,
        }
    }
}

/// Validated classification table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationRules {
    /// Sorted by prefix length, longest first.
    rules: Vec<ClassificationRule>,
}

impl ClassificationRules {
    /// Validates and indexes a rule table.
    pub fn new(mut rules: Vec<ClassificationRule>) -> Result<Self, RuleError> {
        for (i, rule) in rules.iter().enumerate() {
            if rule.code_prefix.trim().is_empty() {
                return Err(RuleError::EmptyPrefix);
            }
            if rules[..i].iter().any(|r| {
                r.code_prefix == rule.code_prefix
                    && r.bucket.account_type() == rule.bucket.account_type()
            }) {
                return Err(RuleError::DuplicatePrefix(rule.code_prefix.clone()));
            }
        }
        rules.sort_by(|a, b| b.code_prefix.len().cmp(&a.code_prefix.len()));
        Ok(Self { rules })
    }

    /// The built-in cooperative table matching the default chart.
    #[must_use]
    pub fn cooperative_default() -> Self {
        let mut rules = vec![
            ClassificationRule::new("1-10", Bucket::Cash),
            ClassificationRule::new("1-11", Bucket::Receivable),
            ClassificationRule::new("1-1", Bucket::OtherCurrentAsset),
            ClassificationRule::new("1-2", Bucket::NonCurrentAsset),
            ClassificationRule::new("2-1", Bucket::CurrentLiability),
            ClassificationRule::new("2-2", Bucket::LongTermLiability),
            ClassificationRule::new("3-1", Bucket::PaidInCapital),
            ClassificationRule::new("3-2", Bucket::RetainedEarnings),
            ClassificationRule::new("4-1", Bucket::OperatingRevenue),
            ClassificationRule::new("4-2", Bucket::OtherRevenue),
            ClassificationRule::new("5-1", Bucket::OperatingExpense),
            ClassificationRule::new("5-2", Bucket::OtherExpense),
        ];
        rules.sort_by(|a, b| b.code_prefix.len().cmp(&a.code_prefix.len()));
        Self { rules }
    }

    /// Builds the table from configuration. An empty list selects the
    /// built-in table.
    pub fn from_config(rows: &[ClassificationRuleConfig]) -> Result<Self, RuleError> {
        if rows.is_empty() {
            return Ok(Self::cooperative_default());
        }
        let rules = rows
            .iter()
            .map(|row| {
                Ok(ClassificationRule {
                    code_prefix: row.code_prefix.trim().to_string(),
                    bucket: row.bucket.trim().parse()?,
                })
            })
            .collect::<Result<Vec<_>, RuleError>>()?;
        Self::new(rules)
    }

    /// The rules, longest prefix first.
    #[must_use]
    pub fn rules(&self) -> &[ClassificationRule] {
        &self.rules
    }

    /// Classifies an account by code and type.
    #[must_use]
    pub fn classify(&self, code: &str, account_type: AccountType) -> Bucket {
        self.rules
            .iter()
            .find(|r| r.bucket.account_type() == account_type && code.starts_with(&r.code_prefix))
            .map_or_else(|| Bucket::fallback(account_type), |r| r.bucket)
    }
}

impl Default for ClassificationRules {
    fn default() -> Self {
        Self::cooperative_default()
    }
}

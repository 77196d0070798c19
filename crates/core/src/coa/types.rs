//! Chart of accounts domain types.

use std::fmt;
use std::str::FromStr;

use koperasi_shared::types::{AccountId, TenantId};
use serde::{Deserialize, Serialize};

/// The five account classes of double-entry bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Resources owned by the cooperative.
    Asset,
    /// Obligations to members and third parties.
    Liability,
    /// Members' capital and retained surplus.
    Equity,
    /// Income earned.
    Revenue,
    /// Costs incurred.
    Expense,
}

impl AccountType {
    /// All account types in statement order.
    pub const ALL: [Self; 5] = [
        Self::Asset,
        Self::Liability,
        Self::Equity,
        Self::Revenue,
        Self::Expense,
    ];

    /// The normal balance implied by this type.
    ///
    /// Asset and expense accounts grow with debits; liability, equity and
    /// revenue accounts grow with credits.
    #[must_use]
    pub const fn normal_balance(self) -> NormalBalance {
        match self {
            Self::Asset | Self::Expense => NormalBalance::Debit,
            Self::Liability | Self::Equity | Self::Revenue => NormalBalance::Credit,
        }
    }

    /// Lowercase name as stored and serialized.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
            Self::Revenue => "revenue",
            Self::Expense => "expense",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asset" => Ok(Self::Asset),
            "liability" => Ok(Self::Liability),
            "equity" => Ok(Self::Equity),
            "revenue" => Ok(Self::Revenue),
            "expense" => Ok(Self::Expense),
            other => Err(format!("unknown account type: {other}")),
        }
    }
}

/// Side on which an account's balance naturally increases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalBalance {
    /// Grows with debits.
    Debit,
    /// Grows with credits.
    Credit,
}

impl NormalBalance {
    /// Lowercase name as stored and serialized.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
        }
    }
}

impl fmt::Display for NormalBalance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A ledger account owned by one tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Immutable identifier.
    pub id: AccountId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Hierarchical code, e.g. `"1-1001"`. Prefix-meaningful and lexically sortable.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Account class.
    pub account_type: AccountType,
    /// Always equal to `account_type.normal_balance()`.
    pub normal_balance: NormalBalance,
    /// Code of the parent header account, if any.
    pub parent_code: Option<String>,
    /// Depth in the tree, 1 for roots.
    pub level: i16,
    /// Aggregation node that never receives postings.
    pub is_header: bool,
    /// Inactive accounts reject new postings.
    pub is_active: bool,
}

impl Account {
    /// True if lines may be posted to this account.
    #[must_use]
    pub const fn is_postable(&self) -> bool {
        self.is_active && !self.is_header
    }
}

/// Request to add an account to a tenant's chart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAccount {
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Hierarchical code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Account class.
    pub account_type: AccountType,
    /// Optional explicit normal balance; must agree with the type when given.
    #[serde(default)]
    pub normal_balance: Option<NormalBalance>,
    /// Parent header code.
    #[serde(default)]
    pub parent_code: Option<String>,
    /// Aggregation node flag.
    #[serde(default)]
    pub is_header: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AccountType::Asset, NormalBalance::Debit)]
    #[case(AccountType::Expense, NormalBalance::Debit)]
    #[case(AccountType::Liability, NormalBalance::Credit)]
    #[case(AccountType::Equity, NormalBalance::Credit)]
    #[case(AccountType::Revenue, NormalBalance::Credit)]
    fn test_normal_balance_is_implied_by_type(
        #[case] account_type: AccountType,
        #[case] expected: NormalBalance,
    ) {
        assert_eq!(account_type.normal_balance(), expected);
    }

    #[test]
    fn test_account_type_round_trips_through_str() {
        for account_type in AccountType::ALL {
            assert_eq!(account_type.as_str().parse::<AccountType>(), Ok(account_type));
        }
        assert_eq!("ASSET".parse::<AccountType>(), Ok(AccountType::Asset));
        assert!("income".parse::<AccountType>().is_err());
    }

    #[test]
    fn test_serde_uses_lowercase_names() {
        let json = serde_json::to_string(&AccountType::Liability).unwrap();
        assert_eq!(json, "\"liability\"");
        let json = serde_json::to_string(&NormalBalance::Credit).unwrap();
        assert_eq!(json, "\"credit\"");
    }
}

//! Built-in cooperative chart of accounts.
//!
//! Codes follow `<class>-<group><serial>`: the first digit is the account
//! class (1 asset .. 5 expense), the group digit separates current from
//! non-current and operating from other items.

use koperasi_shared::types::TenantId;

use super::error::CoaError;
use super::types::AccountType::{Asset, Equity, Expense, Liability, Revenue};
use super::types::{Account, AccountType, NewAccount};
use super::validation::validate_new_account;

/// One row of the seed chart.
#[derive(Debug, Clone, Copy)]
pub struct ChartTemplate {
    /// Account code.
    pub code: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Account class.
    pub account_type: AccountType,
    /// Parent header code.
    pub parent_code: Option<&'static str>,
    /// Aggregation node flag.
    pub is_header: bool,
}

const fn header(
    code: &'static str,
    name: &'static str,
    account_type: AccountType,
    parent_code: Option<&'static str>,
) -> ChartTemplate {
    ChartTemplate {
        code,
        name,
        account_type,
        parent_code,
        is_header: true,
    }
}

const fn leaf(
    code: &'static str,
    name: &'static str,
    account_type: AccountType,
    parent_code: &'static str,
) -> ChartTemplate {
    ChartTemplate {
        code,
        name,
        account_type,
        parent_code: Some(parent_code),
        is_header: false,
    }
}

/// Parents always precede their children.
const DEFAULT_CHART: &[ChartTemplate] = &[
    header("1", "Aset", Asset, None),
    header("1-1", "Aset Lancar", Asset, Some("1")),
    leaf("1-1001", "Kas", Asset, "1-1"),
    leaf("1-1002", "Bank", Asset, "1-1"),
    leaf("1-1101", "Piutang Pinjaman Anggota", Asset, "1-1"),
    leaf("1-1102", "Piutang Usaha", Asset, "1-1"),
    leaf("1-1201", "Persediaan Barang", Asset, "1-1"),
    leaf("1-1301", "Biaya Dibayar di Muka", Asset, "1-1"),
    header("1-2", "Aset Tetap", Asset, Some("1")),
    leaf("1-2001", "Tanah", Asset, "1-2"),
    leaf("1-2002", "Bangunan", Asset, "1-2"),
    leaf("1-2003", "Peralatan Kantor", Asset, "1-2"),
    header("2", "Kewajiban", Liability, None),
    header("2-1", "Kewajiban Jangka Pendek", Liability, Some("2")),
    leaf("2-1001", "Simpanan Sukarela", Liability, "2-1"),
    leaf("2-1002", "Utang Usaha", Liability, "2-1"),
    leaf("2-1003", "Dana SHU Belum Dibagikan", Liability, "2-1"),
    header("2-2", "Kewajiban Jangka Panjang", Liability, Some("2")),
    leaf("2-2001", "Pinjaman Bank", Liability, "2-2"),
    header("3", "Ekuitas", Equity, None),
    header("3-1", "Modal Anggota", Equity, Some("3")),
    leaf("3-1001", "Simpanan Pokok", Equity, "3-1"),
    leaf("3-1002", "Simpanan Wajib", Equity, "3-1"),
    leaf("3-1003", "Modal Donasi", Equity, "3-1"),
    header("3-2", "Cadangan dan SHU", Equity, Some("3")),
    leaf("3-2001", "Cadangan Koperasi", Equity, "3-2"),
    leaf("3-2002", "SHU Ditahan", Equity, "3-2"),
    header("4", "Pendapatan", Revenue, None),
    header("4-1", "Pendapatan Usaha", Revenue, Some("4")),
    leaf("4-1001", "Pendapatan Jasa Pinjaman", Revenue, "4-1"),
    leaf("4-1002", "Penjualan Barang", Revenue, "4-1"),
    leaf("4-1003", "Pendapatan Administrasi", Revenue, "4-1"),
    header("4-2", "Pendapatan Lain-lain", Revenue, Some("4")),
    leaf("4-2001", "Pendapatan Bunga Bank", Revenue, "4-2"),
    header("5", "Beban", Expense, None),
    header("5-1", "Beban Operasional", Expense, Some("5")),
    leaf("5-1001", "Harga Pokok Penjualan", Expense, "5-1"),
    leaf("5-1002", "Beban Gaji", Expense, "5-1"),
    leaf("5-1003", "Beban Listrik dan Air", Expense, "5-1"),
    leaf("5-1004", "Beban Penyusutan", Expense, "5-1"),
    header("5-2", "Beban Lain-lain", Expense, Some("5")),
    leaf("5-2001", "Beban Administrasi Bank", Expense, "5-2"),
];

/// The seed chart rows, parents first.
#[must_use]
pub fn default_chart() -> &'static [ChartTemplate] {
    DEFAULT_CHART
}

/// Builds the default chart for a tenant, validating every row against the
/// rows before it.
pub fn instantiate_default_chart(tenant_id: TenantId) -> Result<Vec<Account>, CoaError> {
    let mut accounts: Vec<Account> = Vec::with_capacity(DEFAULT_CHART.len());
    for template in DEFAULT_CHART {
        let input = NewAccount {
            tenant_id,
            code: template.code.to_string(),
            name: template.name.to_string(),
            account_type: template.account_type,
            normal_balance: None,
            parent_code: template.parent_code.map(str::to_string),
            is_header: template.is_header,
        };
        let account = validate_new_account(&input, &accounts)?;
        accounts.push(account);
    }
    Ok(accounts)
}

//! Conversions between `SeaORM` models and core domain types.

use chrono::Utc;
use koperasi_core::coa::{self, Account};
use koperasi_core::ledger::{Journal, JournalLine};
use koperasi_core::period::AccountingPeriod;
use koperasi_shared::types::{AccountId, JournalId, JournalLineId, PeriodId, TenantId, UserId};

use crate::entities::{accounting_periods, accounts, journal_lines, journals, sea_orm_active_enums};

impl From<coa::AccountType> for sea_orm_active_enums::AccountType {
    fn from(value: coa::AccountType) -> Self {
        match value {
            coa::AccountType::Asset => Self::Asset,
            coa::AccountType::Liability => Self::Liability,
            coa::AccountType::Equity => Self::Equity,
            coa::AccountType::Revenue => Self::Revenue,
            coa::AccountType::Expense => Self::Expense,
        }
    }
}

impl From<sea_orm_active_enums::AccountType> for coa::AccountType {
    fn from(value: sea_orm_active_enums::AccountType) -> Self {
        match value {
            sea_orm_active_enums::AccountType::Asset => Self::Asset,
            sea_orm_active_enums::AccountType::Liability => Self::Liability,
            sea_orm_active_enums::AccountType::Equity => Self::Equity,
            sea_orm_active_enums::AccountType::Revenue => Self::Revenue,
            sea_orm_active_enums::AccountType::Expense => Self::Expense,
        }
    }
}

impl From<coa::NormalBalance> for sea_orm_active_enums::NormalBalance {
    fn from(value: coa::NormalBalance) -> Self {
        match value {
            coa::NormalBalance::Debit => Self::Debit,
            coa::NormalBalance::Credit => Self::Credit,
        }
    }
}

impl From<sea_orm_active_enums::NormalBalance> for coa::NormalBalance {
    fn from(value: sea_orm_active_enums::NormalBalance) -> Self {
        match value {
            sea_orm_active_enums::NormalBalance::Debit => Self::Debit,
            sea_orm_active_enums::NormalBalance::Credit => Self::Credit,
        }
    }
}

impl From<accounts::Model> for Account {
    fn from(model: accounts::Model) -> Self {
        Self {
            id: AccountId::from_uuid(model.id),
            tenant_id: TenantId::from_uuid(model.tenant_id),
            code: model.code,
            name: model.name,
            account_type: model.account_type.into(),
            normal_balance: model.normal_balance.into(),
            parent_code: model.parent_code,
            level: model.level,
            is_header: model.is_header,
            is_active: model.is_active,
        }
    }
}

impl From<accounting_periods::Model> for AccountingPeriod {
    fn from(model: accounting_periods::Model) -> Self {
        Self {
            id: PeriodId::from_uuid(model.id),
            tenant_id: TenantId::from_uuid(model.tenant_id),
            name: model.name,
            start_date: model.start_date,
            end_date: model.end_date,
            is_closed: model.is_closed,
            closed_at: model.closed_at.map(|at| at.with_timezone(&Utc)),
            closed_by: model.closed_by.map(UserId::from_uuid),
        }
    }
}

impl From<journal_lines::Model> for JournalLine {
    fn from(model: journal_lines::Model) -> Self {
        Self {
            id: JournalLineId::from_uuid(model.id),
            journal_id: JournalId::from_uuid(model.journal_id),
            account_id: AccountId::from_uuid(model.account_id),
            debit: model.debit,
            credit: model.credit,
            description: model.description,
        }
    }
}

/// Assembles a journal from its header and lines (already ordered by `line_no`).
pub(crate) fn journal_from_models(header: journals::Model, lines: Vec<journal_lines::Model>) -> Journal {
    Journal {
        id: JournalId::from_uuid(header.id),
        tenant_id: TenantId::from_uuid(header.tenant_id),
        business_unit: header.business_unit,
        transaction_date: header.transaction_date,
        description: header.description,
        reference_id: header.reference_id,
        reference_type: header.reference_type,
        reverses_journal_id: header.reverses_journal_id.map(JournalId::from_uuid),
        created_by: UserId::from_uuid(header.created_by),
        created_at: header.created_at.with_timezone(&Utc),
        lines: lines.into_iter().map(JournalLine::from).collect(),
    }
}

//! Integration tests for the period manager and chart of accounts.

mod common;

use common::{Ledger, connect, date};
use koperasi_core::coa::{AccountType, CoaError, NewAccount};
use koperasi_core::period::{NewPeriod, PeriodError};
use koperasi_db::{AccountRepoError, PeriodRepoError};
use koperasi_shared::types::PeriodId;

#[tokio::test]
async fn test_fiscal_year_generates_monthly_periods() {
    let db = connect().await;
    let ledger = Ledger::new(&db).await;

    let periods = ledger
        .periods
        .create_fiscal_year(ledger.tenant_id, date(2025, 1, 1), date(2025, 12, 31))
        .await
        .unwrap();
    assert_eq!(periods.len(), 12);
    assert_eq!(periods[1].end_date, date(2025, 2, 28));

    let found = ledger
        .periods
        .find_period_for_date(ledger.tenant_id, date(2025, 6, 15))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.start_date, date(2025, 6, 1));
    assert!(
        ledger
            .periods
            .find_period_for_date(ledger.tenant_id, date(2026, 1, 1))
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_overlapping_period_is_rejected() {
    let db = connect().await;
    let ledger = Ledger::new(&db).await;

    ledger
        .periods
        .create_fiscal_year(ledger.tenant_id, date(2025, 1, 1), date(2025, 12, 31))
        .await
        .unwrap();

    let err = ledger
        .periods
        .create_period(NewPeriod {
            tenant_id: ledger.tenant_id,
            name: "Kuartal I".to_string(),
            start_date: date(2025, 1, 15),
            end_date: date(2025, 3, 31),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, PeriodRepoError::Period(PeriodError::Overlapping(_))));

    let err = ledger
        .periods
        .create_fiscal_year(ledger.tenant_id, date(2025, 12, 1), date(2026, 11, 30))
        .await
        .unwrap_err();
    assert!(matches!(err, PeriodRepoError::Period(PeriodError::Overlapping(_))));
    assert_eq!(ledger.periods.list_periods(ledger.tenant_id).await.unwrap().len(), 12);
}

#[tokio::test]
async fn test_close_is_one_way() {
    let db = connect().await;
    let ledger = Ledger::new(&db).await;

    let period = ledger
        .periods
        .create_period(NewPeriod {
            tenant_id: ledger.tenant_id,
            name: "Januari 2025".to_string(),
            start_date: date(2025, 1, 1),
            end_date: date(2025, 1, 31),
        })
        .await
        .unwrap();

    let closed = ledger
        .periods
        .close_period(ledger.tenant_id, period.id, ledger.user_id)
        .await
        .unwrap();
    assert!(closed.is_closed);
    assert_eq!(closed.closed_by, Some(ledger.user_id));

    let err = ledger
        .periods
        .close_period(ledger.tenant_id, period.id, ledger.user_id)
        .await
        .unwrap_err();
    assert!(matches!(err, PeriodRepoError::Period(PeriodError::AlreadyClosed(id)) if id == period.id));

    let missing = PeriodId::new();
    let err = ledger
        .periods
        .close_period(ledger.tenant_id, missing, ledger.user_id)
        .await
        .unwrap_err();
    assert!(matches!(err, PeriodRepoError::Period(PeriodError::NotFound(id)) if id == missing));
}

#[tokio::test]
async fn test_account_creation_and_deactivation() {
    let db = connect().await;
    let ledger = Ledger::new(&db).await;

    let account = ledger
        .accounts
        .create_account(NewAccount {
            tenant_id: ledger.tenant_id,
            code: "1-1003".to_string(),
            name: "Kas Kecil".to_string(),
            account_type: AccountType::Asset,
            normal_balance: None,
            parent_code: Some("1-1".to_string()),
            is_header: false,
        })
        .await
        .unwrap();
    assert_eq!(account.level, 3);

    let err = ledger
        .accounts
        .create_account(NewAccount {
            tenant_id: ledger.tenant_id,
            code: "1-1003".to_string(),
            name: "Kas Kecil 2".to_string(),
            account_type: AccountType::Asset,
            normal_balance: None,
            parent_code: Some("1-1".to_string()),
            is_header: false,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AccountRepoError::Coa(CoaError::DuplicateCode(_))));

    let deactivated = ledger
        .accounts
        .deactivate_account(ledger.tenant_id, account.id)
        .await
        .unwrap();
    assert!(!deactivated.is_active);

    let active = ledger.accounts.list_accounts(ledger.tenant_id, false).await.unwrap();
    assert!(active.iter().all(|a| a.id != account.id));

    // Seeding again keeps the chart as is.
    let reseeded = ledger.accounts.seed_default_chart(ledger.tenant_id).await.unwrap();
    assert_eq!(reseeded.len(), ledger.chart.len() + 1);
}

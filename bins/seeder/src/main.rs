//! Demo data seeder for the Koperasi ledger.
//!
//! Seeds one cooperative with the default chart of accounts, monthly
//! periods for the current year and an opening-balance journal. Safe to
//! run repeatedly: existing accounts and periods are kept and the opening
//! journal is replayed through its reference.
//!
//! Usage: cargo run --bin seeder

use std::collections::HashMap;

use anyhow::Context;
use chrono::{Datelike, NaiveDate, Utc};
use koperasi_core::coa::Account;
use koperasi_core::ledger::{JournalLineInput, PostJournalInput};
use koperasi_db::{AccountRepository, JournalRepository, PeriodRepository};
use koperasi_shared::types::{TenantId, UserId};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Demo cooperative (consistent across runs).
const DEMO_TENANT_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_0001);
/// Demo author recorded on seeded journals.
const DEMO_USER_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_0002);
/// Currency scale for IDR.
const CURRENCY_SCALE: u32 = 2;

/// Opening balances as `(code, debit, credit)`.
const OPENING_BALANCES: &[(&str, i64, i64)] = &[
    ("1-1001", 15_000_000, 0),
    ("1-1002", 85_000_000, 0),
    ("1-1101", 120_000_000, 0),
    ("1-2003", 30_000_000, 0),
    ("2-1001", 0, 90_000_000),
    ("3-1001", 0, 50_000_000),
    ("3-1002", 0, 110_000_000),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;

    println!("Connecting to database...");
    let db = koperasi_db::connect(&database_url).await?;

    let tenant_id = TenantId::from_uuid(DEMO_TENANT_ID);
    let user_id = UserId::from_uuid(DEMO_USER_ID);

    println!("Seeding chart of accounts...");
    let accounts = AccountRepository::new(db.clone())
        .seed_default_chart(tenant_id)
        .await?;
    println!("  {} accounts", accounts.len());

    let year = Utc::now().year();
    println!("Seeding fiscal year {year}...");
    seed_fiscal_year(&PeriodRepository::new(db.clone()), tenant_id, year).await?;

    println!("Posting opening balances...");
    let by_code: HashMap<&str, &Account> =
        accounts.iter().map(|a| (a.code.as_str(), a)).collect();
    let mut lines = Vec::with_capacity(OPENING_BALANCES.len());
    for (code, debit, credit) in OPENING_BALANCES {
        let account = by_code
            .get(code)
            .with_context(|| format!("account {code} missing from seeded chart"))?;
        lines.push(JournalLineInput {
            account_id: account.id,
            debit: Decimal::from(*debit),
            credit: Decimal::from(*credit),
            description: None,
        });
    }

    let opening_date = NaiveDate::from_ymd_opt(year, 1, 1).context("invalid year")?;
    let receipt = JournalRepository::new(db, CURRENCY_SCALE)
        .post_journal(PostJournalInput {
            tenant_id,
            business_unit: "accounting".to_string(),
            transaction_date: opening_date,
            description: "Saldo awal".to_string(),
            reference_id: Some(format!("opening-{year}")),
            reference_type: Some("opening_balance".to_string()),
            lines,
            created_by: user_id,
        })
        .await?;

    if receipt.replayed {
        println!("  Opening journal already posted ({}), skipping...", receipt.journal_id);
    } else {
        println!("  Opening journal {}", receipt.journal_id);
    }

    println!("Seeding complete! Tenant: {tenant_id}");
    Ok(())
}

async fn seed_fiscal_year(
    repo: &PeriodRepository,
    tenant_id: TenantId,
    year: i32,
) -> anyhow::Result<()> {
    let start = NaiveDate::from_ymd_opt(year, 1, 1).context("invalid year")?;
    let end = NaiveDate::from_ymd_opt(year, 12, 31).context("invalid year")?;

    if repo.find_period_for_date(tenant_id, start).await?.is_some() {
        println!("  Periods already exist, skipping...");
        return Ok(());
    }

    let periods = repo.create_fiscal_year(tenant_id, start, end).await?;
    println!("  {} periods", periods.len());
    Ok(())
}

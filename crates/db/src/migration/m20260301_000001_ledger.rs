//! Ledger schema: chart of accounts, accounting periods, journals and lines.
//!
//! The tables are append-only where the ledger requires it. Triggers repeat
//! the core posting rules so that a write bypassing the repositories still
//! cannot corrupt the books.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: TABLES
        // ============================================================
        db.execute_unprepared(ACCOUNTS_SQL).await?;
        db.execute_unprepared(ACCOUNTING_PERIODS_SQL).await?;
        db.execute_unprepared(JOURNALS_SQL).await?;
        db.execute_unprepared(JOURNAL_LINES_SQL).await?;

        // ============================================================
        // PART 3: TRIGGERS & FUNCTIONS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

        // ============================================================
        // PART 4: ROW-LEVEL SECURITY
        // ============================================================
        db.execute_unprepared(RLS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
CREATE TYPE account_type AS ENUM ('asset', 'liability', 'equity', 'revenue', 'expense');

CREATE TYPE normal_balance AS ENUM ('debit', 'credit');
";

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL,
    code VARCHAR(32) NOT NULL,
    name VARCHAR(255) NOT NULL,
    account_type account_type NOT NULL,
    normal_balance normal_balance NOT NULL,
    parent_code VARCHAR(32),
    level SMALLINT NOT NULL DEFAULT 1,
    is_header BOOLEAN NOT NULL DEFAULT FALSE,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT uq_accounts_tenant_code UNIQUE (tenant_id, code),
    CONSTRAINT uq_accounts_tenant_id UNIQUE (tenant_id, id),
    CONSTRAINT chk_accounts_level CHECK (level >= 1),
    CONSTRAINT chk_accounts_normal_balance CHECK (
        (account_type IN ('asset', 'expense') AND normal_balance = 'debit')
        OR (account_type IN ('liability', 'equity', 'revenue') AND normal_balance = 'credit')
    ),
    CONSTRAINT fk_accounts_parent FOREIGN KEY (tenant_id, parent_code)
        REFERENCES accounts(tenant_id, code)
);

CREATE INDEX idx_accounts_tenant_type ON accounts(tenant_id, account_type);
";

const ACCOUNTING_PERIODS_SQL: &str = r"
CREATE TABLE accounting_periods (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL,
    name VARCHAR(100) NOT NULL,
    start_date DATE NOT NULL,
    end_date DATE NOT NULL,
    is_closed BOOLEAN NOT NULL DEFAULT FALSE,
    closed_at TIMESTAMPTZ,
    closed_by UUID,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_period_dates CHECK (start_date <= end_date),
    CONSTRAINT chk_period_closed_fields CHECK (
        (is_closed AND closed_at IS NOT NULL) OR (NOT is_closed AND closed_at IS NULL)
    )
);

CREATE INDEX idx_periods_tenant_dates ON accounting_periods(tenant_id, start_date, end_date);
";

const JOURNALS_SQL: &str = r"
CREATE TABLE journals (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL,
    business_unit VARCHAR(64) NOT NULL,
    transaction_date DATE NOT NULL,
    description TEXT NOT NULL,
    reference_id VARCHAR(255),
    reference_type VARCHAR(64),
    reverses_journal_id UUID REFERENCES journals(id),
    created_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT uq_journals_tenant_id UNIQUE (tenant_id, id)
);

-- Retried producer requests resolve to the journal already posted
CREATE UNIQUE INDEX uq_journals_reference
    ON journals(tenant_id, COALESCE(reference_type, ''), reference_id)
    WHERE reference_id IS NOT NULL;

CREATE INDEX idx_journals_tenant_date ON journals(tenant_id, transaction_date, created_at);
CREATE INDEX idx_journals_business_unit ON journals(tenant_id, business_unit);
";

const JOURNAL_LINES_SQL: &str = r"
CREATE TABLE journal_lines (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL,
    journal_id UUID NOT NULL,
    line_no INTEGER NOT NULL,
    account_id UUID NOT NULL,
    debit NUMERIC(19, 4) NOT NULL DEFAULT 0,
    credit NUMERIC(19, 4) NOT NULL DEFAULT 0,
    description TEXT,

    CONSTRAINT fk_lines_journal FOREIGN KEY (tenant_id, journal_id)
        REFERENCES journals(tenant_id, id),
    CONSTRAINT fk_lines_account FOREIGN KEY (tenant_id, account_id)
        REFERENCES accounts(tenant_id, id),
    CONSTRAINT uq_lines_journal_line_no UNIQUE (journal_id, line_no),
    CONSTRAINT chk_lines_non_negative CHECK (debit >= 0 AND credit >= 0)
);

CREATE INDEX idx_lines_account ON journal_lines(tenant_id, account_id);
";

const TRIGGERS_SQL: &str = r"
-- ============================================================
-- FUNCTION: check_journal_balance
-- Total debit must equal total credit for every journal at commit
-- ============================================================
CREATE OR REPLACE FUNCTION check_journal_balance()
RETURNS TRIGGER AS $$
DECLARE
    total_debit NUMERIC(19, 4);
    total_credit NUMERIC(19, 4);
BEGIN
    SELECT
        COALESCE(SUM(debit), 0),
        COALESCE(SUM(credit), 0)
    INTO total_debit, total_credit
    FROM journal_lines
    WHERE journal_id = NEW.journal_id;

    IF total_debit <> total_credit THEN
        RAISE EXCEPTION 'Journal % is not balanced. Debit: %, Credit: %',
            NEW.journal_id, total_debit, total_credit;
    END IF;

    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE CONSTRAINT TRIGGER trg_check_journal_balance
AFTER INSERT ON journal_lines
DEFERRABLE INITIALLY DEFERRED
FOR EACH ROW
EXECUTE FUNCTION check_journal_balance();

-- ============================================================
-- FUNCTION: prevent_journal_mutation
-- Journals and their lines are append-only
-- ============================================================
CREATE OR REPLACE FUNCTION prevent_journal_mutation()
RETURNS TRIGGER AS $$
BEGIN
    RAISE EXCEPTION 'Posted journals are immutable. Post a reversing journal instead.';
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_journals_immutable
BEFORE UPDATE OR DELETE ON journals
FOR EACH ROW
EXECUTE FUNCTION prevent_journal_mutation();

CREATE TRIGGER trg_journal_lines_immutable
BEFORE UPDATE OR DELETE ON journal_lines
FOR EACH ROW
EXECUTE FUNCTION prevent_journal_mutation();

-- ============================================================
-- FUNCTION: reject_closed_period_posting
-- No journal may be dated inside a closed period
-- ============================================================
CREATE OR REPLACE FUNCTION reject_closed_period_posting()
RETURNS TRIGGER AS $$
BEGIN
    IF EXISTS (
        SELECT 1 FROM accounting_periods
        WHERE tenant_id = NEW.tenant_id
          AND is_closed
          AND NEW.transaction_date BETWEEN start_date AND end_date
    ) THEN
        RAISE EXCEPTION 'Cannot post to closed accounting period (date %)', NEW.transaction_date;
    END IF;

    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_journals_closed_period
BEFORE INSERT ON journals
FOR EACH ROW
EXECUTE FUNCTION reject_closed_period_posting();

-- ============================================================
-- FUNCTION: guard_account_update
-- Type, normal balance and tenant never change; code is frozen once used
-- ============================================================
CREATE OR REPLACE FUNCTION guard_account_update()
RETURNS TRIGGER AS $$
BEGIN
    IF NEW.tenant_id <> OLD.tenant_id THEN
        RAISE EXCEPTION 'Account tenant cannot change';
    END IF;

    IF NEW.account_type <> OLD.account_type OR NEW.normal_balance <> OLD.normal_balance THEN
        RAISE EXCEPTION 'Account type and normal balance are immutable';
    END IF;

    IF NEW.code <> OLD.code AND EXISTS (
        SELECT 1 FROM journal_lines WHERE account_id = OLD.id
    ) THEN
        RAISE EXCEPTION 'Account code % is referenced by journal lines', OLD.code;
    END IF;

    NEW.updated_at := NOW();
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_accounts_guard
BEFORE UPDATE ON accounts
FOR EACH ROW
EXECUTE FUNCTION guard_account_update();

-- ============================================================
-- FUNCTION: guard_period_update
-- Closing is one-way and a closed period keeps its range
-- ============================================================
CREATE OR REPLACE FUNCTION guard_period_update()
RETURNS TRIGGER AS $$
BEGIN
    IF OLD.is_closed AND NOT NEW.is_closed THEN
        RAISE EXCEPTION 'Closed accounting periods cannot be reopened';
    END IF;

    IF OLD.is_closed AND (NEW.start_date <> OLD.start_date OR NEW.end_date <> OLD.end_date) THEN
        RAISE EXCEPTION 'Closed accounting periods cannot change their dates';
    END IF;

    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_periods_guard
BEFORE UPDATE ON accounting_periods
FOR EACH ROW
EXECUTE FUNCTION guard_period_update();

CREATE OR REPLACE FUNCTION prevent_period_delete()
RETURNS TRIGGER AS $$
BEGIN
    IF OLD.is_closed THEN
        RAISE EXCEPTION 'Closed accounting periods cannot be deleted';
    END IF;
    RETURN OLD;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_periods_no_delete
BEFORE DELETE ON accounting_periods
FOR EACH ROW
EXECUTE FUNCTION prevent_period_delete();
";

const RLS_SQL: &str = r"
ALTER TABLE accounts ENABLE ROW LEVEL SECURITY;
ALTER TABLE accounting_periods ENABLE ROW LEVEL SECURITY;
ALTER TABLE journals ENABLE ROW LEVEL SECURITY;
ALTER TABLE journal_lines ENABLE ROW LEVEL SECURITY;

-- Repositories run every statement after: SET LOCAL app.current_tenant_id = '<uuid>';
CREATE POLICY tenant_isolation ON accounts
    USING (tenant_id = NULLIF(current_setting('app.current_tenant_id', true), '')::UUID);

CREATE POLICY tenant_isolation ON accounting_periods
    USING (tenant_id = NULLIF(current_setting('app.current_tenant_id', true), '')::UUID);

CREATE POLICY tenant_isolation ON journals
    USING (tenant_id = NULLIF(current_setting('app.current_tenant_id', true), '')::UUID);

CREATE POLICY tenant_isolation ON journal_lines
    USING (tenant_id = NULLIF(current_setting('app.current_tenant_id', true), '')::UUID);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS journal_lines CASCADE;
DROP TABLE IF EXISTS journals CASCADE;
DROP TABLE IF EXISTS accounting_periods CASCADE;
DROP TABLE IF EXISTS accounts CASCADE;

DROP FUNCTION IF EXISTS check_journal_balance();
DROP FUNCTION IF EXISTS prevent_journal_mutation();
DROP FUNCTION IF EXISTS reject_closed_period_posting();
DROP FUNCTION IF EXISTS guard_account_update();
DROP FUNCTION IF EXISTS guard_period_update();
DROP FUNCTION IF EXISTS prevent_period_delete();

DROP TYPE IF EXISTS normal_balance;
DROP TYPE IF EXISTS account_type;
";

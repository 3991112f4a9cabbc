use std::path::Path;

use rusqlite::Connection;

use crate::error::Result;
use crate::models::normalize_name;

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS bank_accounts (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    bank_name TEXT NOT NULL,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS banks (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    delimiter TEXT NOT NULL DEFAULT ',',
    date_format TEXT NOT NULL DEFAULT '',
    date_col INTEGER NOT NULL DEFAULT 0,
    description_col INTEGER NOT NULL DEFAULT 0,
    debit_col INTEGER NOT NULL DEFAULT 0,
    credit_col INTEGER NOT NULL DEFAULT 0,
    ignore_startswith TEXT NOT NULL DEFAULT '[]',
    ignore_contains TEXT NOT NULL DEFAULT '[]'
);

CREATE TABLE IF NOT EXISTS properties (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    cost REAL NOT NULL DEFAULT 0,
    land_value REAL NOT NULL DEFAULT 0,
    renovation REAL NOT NULL DEFAULT 0,
    loan_closing_cost REAL NOT NULL DEFAULT 0,
    owner_count INTEGER NOT NULL DEFAULT 1,
    purchase_date TEXT NOT NULL DEFAULT '',
    mgmt_company TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS companies (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    rent_percentage INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS groups (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    property_list TEXT NOT NULL DEFAULT '[]'
);

CREATE TABLE IF NOT EXISTS owners (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    bank_accounts TEXT NOT NULL DEFAULT '[]',
    properties TEXT NOT NULL DEFAULT '[]',
    companies TEXT NOT NULL DEFAULT '[]'
);

CREATE TABLE IF NOT EXISTS tax_categories (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS transaction_types (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS bank_rules (
    id INTEGER PRIMARY KEY,
    account_id INTEGER NOT NULL,
    rule_order INTEGER NOT NULL,
    pattern TEXT NOT NULL,
    transaction_type TEXT NOT NULL,
    tax_category TEXT NOT NULL,
    property TEXT NOT NULL DEFAULT '',
    grp TEXT NOT NULL DEFAULT '',
    company TEXT NOT NULL DEFAULT '',
    other_entity TEXT NOT NULL DEFAULT '',
    comment TEXT NOT NULL DEFAULT '',
    used_count INTEGER NOT NULL DEFAULT 0,
    UNIQUE (account_id, rule_order),
    FOREIGN KEY (account_id) REFERENCES bank_accounts(id)
);

CREATE TABLE IF NOT EXISTS common_rules (
    id INTEGER PRIMARY KEY,
    transaction_type TEXT NOT NULL,
    pattern TEXT NOT NULL,
    UNIQUE (transaction_type, pattern)
);

CREATE TABLE IF NOT EXISTS inherit_rules (
    id INTEGER PRIMARY KEY,
    account_id INTEGER NOT NULL UNIQUE,
    tax_category TEXT NOT NULL DEFAULT '',
    property TEXT NOT NULL DEFAULT '',
    grp TEXT NOT NULL DEFAULT '',
    other_entity TEXT NOT NULL DEFAULT '',
    FOREIGN KEY (account_id) REFERENCES bank_accounts(id)
);

CREATE TABLE IF NOT EXISTS transactions (
    id INTEGER PRIMARY KEY,
    account_id INTEGER NOT NULL,
    tr_id TEXT,
    date TEXT NOT NULL,
    description TEXT NOT NULL,
    credit REAL NOT NULL,
    rule_order INTEGER,
    comment TEXT NOT NULL DEFAULT '',
    transaction_type TEXT NOT NULL DEFAULT '',
    tax_category TEXT NOT NULL DEFAULT '',
    property TEXT NOT NULL DEFAULT '',
    grp TEXT NOT NULL DEFAULT '',
    company TEXT NOT NULL DEFAULT '',
    other_entity TEXT NOT NULL DEFAULT '',
    from_addendum INTEGER NOT NULL DEFAULT 0,
    created_at TEXT DEFAULT (datetime('now')),
    FOREIGN KEY (account_id) REFERENCES bank_accounts(id)
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_transactions_tr_id
    ON transactions(account_id, tr_id) WHERE tr_id IS NOT NULL;

CREATE TABLE IF NOT EXISTS imports (
    id INTEGER PRIMARY KEY,
    filename TEXT NOT NULL,
    account_id INTEGER NOT NULL,
    import_date TEXT DEFAULT (datetime('now')),
    record_count INTEGER,
    checksum TEXT,
    FOREIGN KEY (account_id) REFERENCES bank_accounts(id)
);
";

const DEFAULT_TAX_CATEGORIES: &[&str] = &["personal", "rental", "company"];

const DEFAULT_TRANSACTION_TYPES: &[&str] = &[
    "rent",
    "tenantfees",
    "repairs",
    "insurance",
    "mortgage",
    "utilities",
    "management",
    "transfer",
    "other",
];

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;

    let count: i64 = conn.query_row("SELECT count(*) FROM tax_categories", [], |row| row.get(0))?;
    if count == 0 {
        for name in DEFAULT_TAX_CATEGORIES {
            conn.execute("INSERT INTO tax_categories (name) VALUES (?1)", [name])?;
        }
    }

    let count: i64 = conn.query_row("SELECT count(*) FROM transaction_types", [], |row| {
        row.get(0)
    })?;
    if count == 0 {
        for name in DEFAULT_TRANSACTION_TYPES {
            conn.execute("INSERT INTO transaction_types (name) VALUES (?1)", [name])?;
        }
    }
    Ok(())
}

/// Resolve a bank account name to its row id.
pub fn account_id(conn: &Connection, name: &str) -> Result<i64> {
    let key = normalize_name(name);
    conn.query_row("SELECT id FROM bank_accounts WHERE name = ?1", [&key], |row| {
        row.get(0)
    })
    .map_err(|_| crate::error::RentbooksError::UnknownAccount(name.to_string()))
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Fundledger", "fundledger"));

pub const DB_ENV: &str = "FUNDLEDGER_DB";

/// Resolves the database file: explicit path, then `FUNDLEDGER_DB`, then the
/// platform data dir.
pub fn db_path(explicit: Option<&str>) -> Result<PathBuf> {
    if let Some(p) = explicit.map(str::trim).filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(p));
    }
    if let Ok(p) = std::env::var(DB_ENV) {
        if !p.trim().is_empty() {
            return Ok(PathBuf::from(p.trim()));
        }
    }
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("fundledger.sqlite"))
}

pub fn open_or_init(explicit: Option<&str>) -> Result<Connection> {
    let path = db_path(explicit)?;
    open_at(&path)
}

pub fn open_at(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Create directory {}", parent.display()))?;
    }
    let conn =
        Connection::open(path).with_context(|| format!("Open DB at {}", path.display()))?;
    conn.busy_timeout(std::time::Duration::from_secs(5))?;
    init_schema(&conn)?;
    tracing::debug!(path = %path.display(), "database ready");
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS contributors(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        category TEXT NOT NULL DEFAULT '',
        login TEXT UNIQUE,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE IF NOT EXISTS trades(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        date TEXT NOT NULL,
        asset TEXT NOT NULL,
        pnl TEXT NOT NULL,
        charges TEXT NOT NULL DEFAULT '0',
        commission TEXT NOT NULL,
        net_pnl TEXT NOT NULL,
        net_profit_after_commission TEXT NOT NULL,
        comment TEXT NOT NULL DEFAULT '',
        side TEXT CHECK(side IS NULL OR side IN ('long','short')),
        quantity TEXT,
        entry_price TEXT,
        exit_price TEXT,
        instrument TEXT,
        broker TEXT,
        trade_ref TEXT,
        strategy TEXT,
        tags TEXT
    );
    CREATE INDEX IF NOT EXISTS idx_trades_date ON trades(date);

    CREATE TABLE IF NOT EXISTS withdrawal_requests(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        contributor_id INTEGER NOT NULL,
        requested_on TEXT NOT NULL,
        amount TEXT NOT NULL,
        comment TEXT NOT NULL DEFAULT '',
        status TEXT NOT NULL DEFAULT 'pending'
            CHECK(status IN ('pending','approved','rejected')),
        resolved_on TEXT,
        admin_comment TEXT,
        resolved_by TEXT,
        FOREIGN KEY(contributor_id) REFERENCES contributors(id) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_requests_status ON withdrawal_requests(status);

    CREATE TABLE IF NOT EXISTS ledger_entries(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        contributor_id INTEGER NOT NULL,
        date TEXT NOT NULL,
        kind TEXT NOT NULL CHECK(kind IN ('deposit','trade','withdrawal')),
        amount TEXT NOT NULL,
        asset TEXT,
        allocated_charges TEXT NOT NULL DEFAULT '0',
        comment TEXT NOT NULL DEFAULT '',
        trade_id INTEGER,
        request_id INTEGER,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        FOREIGN KEY(contributor_id) REFERENCES contributors(id) ON DELETE CASCADE,
        FOREIGN KEY(trade_id) REFERENCES trades(id) ON DELETE SET NULL,
        FOREIGN KEY(request_id) REFERENCES withdrawal_requests(id) ON DELETE SET NULL
    );
    CREATE INDEX IF NOT EXISTS idx_ledger_contributor_date ON ledger_entries(contributor_id, date);
    CREATE INDEX IF NOT EXISTS idx_ledger_trade ON ledger_entries(trade_id);
    "#,
    )?;
    Ok(())
}

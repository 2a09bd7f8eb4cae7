// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::{FundError, Result};
use crate::ledger::{query_entries, record_deposit, LedgerFilter};
use crate::models::{Contributor, ContributorStats, EntryKind};
use crate::utils::non_empty;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use rust_decimal::Decimal;

fn contributor_from_row(r: &Row<'_>) -> rusqlite::Result<Contributor> {
    Ok(Contributor {
        id: r.get(0)?,
        name: r.get(1)?,
        category: r.get(2)?,
        login: r.get(3)?,
    })
}

pub fn add_contributor(
    conn: &Connection,
    name: &str,
    category: &str,
    login: Option<&str>,
) -> Result<i64> {
    let name = name.trim();
    if name.is_empty() {
        return Err(FundError::validation("Contributor name is required"));
    }
    let login = non_empty(login);
    conn.execute(
        "INSERT INTO contributors(name, category, login) VALUES (?1, ?2, ?3)",
        params![name, category.trim(), login],
    )
    .map_err(|e| {
        FundError::from_unique(e, format!("Contributor '{}' or its login already exists", name))
    })?;
    let id = conn.last_insert_rowid();
    tracing::info!(id, name, category = category.trim(), ?login, "contributor added");
    Ok(id)
}

/// Adds a contributor and books its first deposit in one transaction.
pub fn add_contributor_with_deposit(
    conn: &mut Connection,
    name: &str,
    category: &str,
    login: Option<&str>,
    date: NaiveDate,
    amount: Decimal,
) -> Result<i64> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let id = add_contributor(&tx, name, category, login)?;
    record_deposit(&tx, id, date, amount, Some("Initial Deposit"))?;
    tx.commit()?;
    Ok(id)
}

pub fn update_contributor(
    conn: &Connection,
    id: i64,
    name: Option<&str>,
    category: Option<&str>,
) -> Result<Contributor> {
    let mut c = get_contributor(conn, id)?;
    if let Some(n) = name.map(str::trim) {
        if n.is_empty() {
            return Err(FundError::validation("Contributor name cannot be empty"));
        }
        c.name = n.to_string();
    }
    if let Some(cat) = category {
        c.category = cat.trim().to_string();
    }
    conn.execute(
        "UPDATE contributors SET name=?1, category=?2 WHERE id=?3",
        params![c.name, c.category, id],
    )
    .map_err(|e| FundError::from_unique(e, format!("Contributor '{}' already exists", c.name)))?;
    tracing::info!(id, name = %c.name, "contributor updated");
    Ok(c)
}

/// Binds a login identity to a contributor; one login per contributor.
pub fn link_login(conn: &Connection, id: i64, login: &str) -> Result<()> {
    let login = login.trim();
    if login.is_empty() {
        return Err(FundError::validation("Login is required"));
    }
    let n = conn
        .execute(
            "UPDATE contributors SET login=?1 WHERE id=?2",
            params![login, id],
        )
        .map_err(|e| {
            FundError::from_unique(e, format!("Login '{}' is already linked", login))
        })?;
    if n == 0 {
        return Err(FundError::NotFound(format!("Contributor {}", id)));
    }
    tracing::info!(id, login, "login linked");
    Ok(())
}

pub fn get_contributor(conn: &Connection, id: i64) -> Result<Contributor> {
    conn.query_row(
        "SELECT id, name, category, login FROM contributors WHERE id=?1",
        params![id],
        contributor_from_row,
    )
    .optional()?
    .ok_or_else(|| FundError::NotFound(format!("Contributor {}", id)))
}

pub fn get_contributor_by_login(conn: &Connection, login: &str) -> Result<Option<Contributor>> {
    let c = conn
        .query_row(
            "SELECT id, name, category, login FROM contributors WHERE login=?1",
            params![login.trim()],
            contributor_from_row,
        )
        .optional()?;
    Ok(c)
}

pub fn list_contributors(conn: &Connection) -> Result<Vec<Contributor>> {
    let mut stmt =
        conn.prepare("SELECT id, name, category, login FROM contributors ORDER BY name")?;
    let rows = stmt.query_map([], contributor_from_row)?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    Ok(data)
}

/// Purges a contributor; its ledger entries and requests go with it.
pub fn delete_contributor(conn: &mut Connection, id: i64) -> Result<()> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    get_contributor(&tx, id)?;
    let entries = tx.execute(
        "DELETE FROM ledger_entries WHERE contributor_id=?1",
        params![id],
    )?;
    let requests = tx.execute(
        "DELETE FROM withdrawal_requests WHERE contributor_id=?1",
        params![id],
    )?;
    tx.execute("DELETE FROM contributors WHERE id=?1", params![id])?;
    tx.commit()?;
    tracing::info!(id, entries, requests, "contributor deleted");
    Ok(())
}

pub fn contributor_stats(conn: &Connection, id: i64) -> Result<ContributorStats> {
    let contributor = get_contributor(conn, id)?;
    let entries = query_entries(conn, &LedgerFilter::contributor(id))?;

    let mut total_deposits = Decimal::ZERO;
    let mut total_withdrawals = Decimal::ZERO;
    let mut trade_total = Decimal::ZERO;
    let mut current_balance = Decimal::ZERO;
    for e in &entries {
        match e.kind {
            EntryKind::Deposit => total_deposits += e.amount,
            EntryKind::Withdrawal => total_withdrawals += e.amount.abs(),
            EntryKind::Trade => trade_total += e.amount,
        }
        current_balance += e.amount;
    }
    let roi_pct = if total_deposits > Decimal::ZERO {
        (current_balance + total_withdrawals - total_deposits) / total_deposits
            * Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    };

    Ok(ContributorStats {
        contributor,
        entry_count: entries.len(),
        total_deposits,
        total_withdrawals,
        trade_total,
        current_balance,
        roi_pct,
    })
}

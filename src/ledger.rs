// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Ledger store: append-only per-contributor entries.
//!
//! Entries are only rewritten through [`correct_entry`] and [`delete_entry`],
//! which are administrative paths outside of allocation.

use crate::error::{FundError, Result};
use crate::models::{EntryKind, EntryUpdate, LedgerEntry, NewEntry};
use crate::utils::{decimal_col, ensure_positive, non_empty};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row, ToSql};
use rust_decimal::Decimal;

const ENTRY_COLUMNS: &str = "id, contributor_id, date, kind, amount, asset, allocated_charges, comment, trade_id, request_id";

/// Row filter for [`query_entries`]. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct LedgerFilter {
    pub contributor_id: Option<i64>,
    pub as_of: Option<NaiveDate>,
    pub kind: Option<EntryKind>,
    pub trade_id: Option<i64>,
}

impl LedgerFilter {
    pub fn contributor(id: i64) -> Self {
        Self {
            contributor_id: Some(id),
            ..Self::default()
        }
    }

    pub fn as_of(mut self, date: NaiveDate) -> Self {
        self.as_of = Some(date);
        self
    }
}

pub(crate) fn entry_from_row(r: &Row<'_>) -> rusqlite::Result<LedgerEntry> {
    Ok(LedgerEntry {
        id: r.get(0)?,
        contributor_id: r.get(1)?,
        date: r.get(2)?,
        kind: r.get(3)?,
        amount: decimal_col(r, 4)?,
        asset: r.get(5)?,
        allocated_charges: decimal_col(r, 6)?,
        comment: r.get(7)?,
        trade_id: r.get(8)?,
        request_id: r.get(9)?,
    })
}

pub(crate) fn contributor_exists(conn: &Connection, contributor_id: i64) -> Result<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM contributors WHERE id=?1",
            params![contributor_id],
            |r| r.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

/// Raw insert, no existence checks. Callers inside a transaction have
/// already validated the contributor set.
pub(crate) fn insert_entry(conn: &Connection, e: &NewEntry) -> Result<i64> {
    conn.execute(
        "INSERT INTO ledger_entries(contributor_id, date, kind, amount, asset, allocated_charges, comment, trade_id, request_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            e.contributor_id,
            e.date,
            e.kind,
            e.amount.to_string(),
            e.asset,
            e.allocated_charges.to_string(),
            e.comment,
            e.trade_id,
            e.request_id,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Appends a single entry and returns its id.
pub fn append_entry(conn: &Connection, entry: &NewEntry) -> Result<i64> {
    if !contributor_exists(conn, entry.contributor_id)? {
        return Err(FundError::NotFound(format!(
            "Contributor {}",
            entry.contributor_id
        )));
    }
    let id = insert_entry(conn, entry)?;
    tracing::debug!(
        id,
        contributor_id = entry.contributor_id,
        kind = %entry.kind,
        amount = %entry.amount,
        date = %entry.date,
        "ledger entry appended"
    );
    Ok(id)
}

/// Inserts a fan-out batch and returns the ids in input order. Callers hold
/// the immediate transaction, so the batch lands together or not at all.
pub(crate) fn append_entries(conn: &Connection, entries: &[NewEntry]) -> Result<Vec<i64>> {
    let mut ids = Vec::with_capacity(entries.len());
    for e in entries {
        ids.push(insert_entry(conn, e)?);
    }
    tracing::debug!(count = ids.len(), "ledger entries appended");
    Ok(ids)
}

/// Entries matching `filter`, oldest first; same-day entries keep insertion
/// order.
pub fn query_entries(conn: &Connection, filter: &LedgerFilter) -> Result<Vec<LedgerEntry>> {
    let mut sql = format!("SELECT {} FROM ledger_entries WHERE 1=1", ENTRY_COLUMNS);
    let mut params_vec: Vec<Box<dyn ToSql>> = Vec::new();

    if let Some(cid) = filter.contributor_id {
        sql.push_str(" AND contributor_id=?");
        params_vec.push(Box::new(cid));
    }
    if let Some(as_of) = filter.as_of {
        sql.push_str(" AND date<=?");
        params_vec.push(Box::new(as_of));
    }
    if let Some(kind) = filter.kind {
        sql.push_str(" AND kind=?");
        params_vec.push(Box::new(kind));
    }
    if let Some(tid) = filter.trade_id {
        sql.push_str(" AND trade_id=?");
        params_vec.push(Box::new(tid));
    }
    sql.push_str(" ORDER BY date ASC, id ASC");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(params_vec.iter()), entry_from_row)?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    Ok(data)
}

pub fn get_entry(conn: &Connection, id: i64) -> Result<LedgerEntry> {
    let sql = format!("SELECT {} FROM ledger_entries WHERE id=?1", ENTRY_COLUMNS);
    conn.query_row(&sql, params![id], entry_from_row)
        .optional()?
        .ok_or_else(|| FundError::NotFound(format!("Ledger entry {}", id)))
}

pub fn correct_entry(conn: &Connection, id: i64, update: &EntryUpdate) -> Result<LedgerEntry> {
    let mut entry = get_entry(conn, id)?;
    if update.is_empty() {
        return Ok(entry);
    }
    if let Some(date) = update.date {
        entry.date = date;
    }
    if let Some(kind) = update.kind {
        entry.kind = kind;
    }
    if let Some(amount) = update.amount {
        entry.amount = amount;
    }
    if let Some(asset) = &update.asset {
        entry.asset = non_empty(Some(asset));
    }
    if let Some(charges) = update.allocated_charges {
        if charges < Decimal::ZERO {
            return Err(FundError::validation("Allocated charges cannot be negative"));
        }
        entry.allocated_charges = charges;
    }
    if let Some(comment) = &update.comment {
        entry.comment = comment.trim().to_string();
    }

    conn.execute(
        "UPDATE ledger_entries SET date=?1, kind=?2, amount=?3, asset=?4, allocated_charges=?5, comment=?6 WHERE id=?7",
        params![
            entry.date,
            entry.kind,
            entry.amount.to_string(),
            entry.asset,
            entry.allocated_charges.to_string(),
            entry.comment,
            id
        ],
    )?;
    tracing::info!(id, "ledger entry corrected");
    Ok(entry)
}

pub fn delete_entry(conn: &Connection, id: i64) -> Result<()> {
    let n = conn.execute("DELETE FROM ledger_entries WHERE id=?1", params![id])?;
    if n == 0 {
        return Err(FundError::NotFound(format!("Ledger entry {}", id)));
    }
    tracing::info!(id, "ledger entry deleted");
    Ok(())
}

/// Books a deposit straight to one contributor; no allocation involved.
pub fn record_deposit(
    conn: &Connection,
    contributor_id: i64,
    date: NaiveDate,
    amount: Decimal,
    comment: Option<&str>,
) -> Result<i64> {
    ensure_positive(amount, "Deposit amount")?;
    let comment = non_empty(comment).unwrap_or_else(|| "Additional Deposit".to_string());
    let entry = NewEntry::new(contributor_id, date, EntryKind::Deposit, amount).comment(comment);
    let id = append_entry(conn, &entry)?;
    tracing::info!(contributor_id, %amount, %date, "deposit recorded");
    Ok(id)
}

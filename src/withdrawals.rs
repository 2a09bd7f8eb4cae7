// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Two withdrawal paths with different rules:
//!
//! * [`record_admin_withdrawal`] takes money out of the whole fund and debits
//!   every contributor in proportion to its balance.
//! * An approved [`WithdrawalRequest`] debits only the requester, for the
//!   full requested amount, dated on the approval day.

use crate::allocation::{distribute_withdrawal, Share};
use crate::error::{FundError, Result};
use crate::ledger::{contributor_exists, insert_entry};
use crate::models::{EntryKind, NewEntry, RequestStatus, Resolution, WithdrawalRequest};
use crate::utils::{decimal_col, ensure_positive, non_empty};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use rust_decimal::Decimal;

const REQUEST_COLUMNS: &str = "id, contributor_id, requested_on, amount, comment, status, resolved_on, admin_comment, resolved_by";

fn request_from_row(r: &Row<'_>) -> rusqlite::Result<WithdrawalRequest> {
    Ok(WithdrawalRequest {
        id: r.get(0)?,
        contributor_id: r.get(1)?,
        requested_on: r.get(2)?,
        amount: decimal_col(r, 3)?,
        comment: r.get(4)?,
        status: r.get(5)?,
        resolved_on: r.get(6)?,
        admin_comment: r.get(7)?,
        resolved_by: r.get(8)?,
    })
}

pub fn record_admin_withdrawal(
    conn: &mut Connection,
    date: NaiveDate,
    amount: Decimal,
    comment: &str,
) -> Result<Vec<Share>> {
    ensure_positive(amount, "Withdrawal amount")?;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let shares = match distribute_withdrawal(&tx, date, amount, comment.trim()) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(%date, %amount, error = %e, "fund withdrawal refused");
            return Err(e);
        }
    };
    tx.commit()?;
    Ok(shares)
}

pub fn submit_request(
    conn: &Connection,
    contributor_id: i64,
    requested_on: NaiveDate,
    amount: Decimal,
    comment: &str,
) -> Result<i64> {
    ensure_positive(amount, "Withdrawal amount")?;
    if !contributor_exists(conn, contributor_id)? {
        return Err(FundError::NotFound(format!("Contributor {}", contributor_id)));
    }
    conn.execute(
        "INSERT INTO withdrawal_requests(contributor_id, requested_on, amount, comment, status)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            contributor_id,
            requested_on,
            amount.to_string(),
            comment.trim(),
            RequestStatus::Pending
        ],
    )?;
    let id = conn.last_insert_rowid();
    tracing::info!(id, contributor_id, %amount, %requested_on, "withdrawal request submitted");
    Ok(id)
}

pub fn get_request(conn: &Connection, id: i64) -> Result<WithdrawalRequest> {
    let sql = format!(
        "SELECT {} FROM withdrawal_requests WHERE id=?1",
        REQUEST_COLUMNS
    );
    conn.query_row(&sql, params![id], request_from_row)
        .optional()?
        .ok_or_else(|| FundError::NotFound(format!("Withdrawal request {}", id)))
}

/// Requests in submission order, optionally restricted to one status.
pub fn list_requests(
    conn: &Connection,
    status: Option<RequestStatus>,
) -> Result<Vec<WithdrawalRequest>> {
    let mut data = Vec::new();
    match status {
        Some(s) => {
            let sql = format!(
                "SELECT {} FROM withdrawal_requests WHERE status=?1 ORDER BY requested_on, id",
                REQUEST_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            for row in stmt.query_map(params![s], request_from_row)? {
                data.push(row?);
            }
        }
        None => {
            let sql = format!(
                "SELECT {} FROM withdrawal_requests ORDER BY requested_on, id",
                REQUEST_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            for row in stmt.query_map([], request_from_row)? {
                data.push(row?);
            }
        }
    }
    Ok(data)
}

pub fn list_pending_requests(conn: &Connection) -> Result<Vec<WithdrawalRequest>> {
    list_requests(conn, Some(RequestStatus::Pending))
}

pub fn requests_for_contributor(
    conn: &Connection,
    contributor_id: i64,
) -> Result<Vec<WithdrawalRequest>> {
    let sql = format!(
        "SELECT {} FROM withdrawal_requests WHERE contributor_id=?1 ORDER BY requested_on, id",
        REQUEST_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![contributor_id], request_from_row)?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    Ok(data)
}

/// Moves a pending request to approved or rejected. Approval books one
/// withdrawal entry of the full amount against the requester, dated
/// `resolved_on`. Resolved requests are terminal.
pub fn resolve_request(
    conn: &mut Connection,
    id: i64,
    resolution: Resolution,
    resolved_on: NaiveDate,
    admin_comment: Option<&str>,
    resolved_by: Option<&str>,
) -> Result<WithdrawalRequest> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let mut req = get_request(&tx, id)?;
    if req.status != RequestStatus::Pending {
        return Err(FundError::Integrity(format!(
            "Withdrawal request {} is already {}",
            id, req.status
        )));
    }

    req.status = match resolution {
        Resolution::Approve => RequestStatus::Approved,
        Resolution::Reject => RequestStatus::Rejected,
    };
    req.resolved_on = Some(resolved_on);
    req.admin_comment = non_empty(admin_comment);
    req.resolved_by = non_empty(resolved_by);
    tx.execute(
        "UPDATE withdrawal_requests SET status=?1, resolved_on=?2, admin_comment=?3, resolved_by=?4 WHERE id=?5",
        params![
            req.status,
            req.resolved_on,
            req.admin_comment,
            req.resolved_by,
            id
        ],
    )?;

    if resolution == Resolution::Approve {
        let mut entry = NewEntry::new(
            req.contributor_id,
            resolved_on,
            EntryKind::Withdrawal,
            -req.amount,
        )
        .comment("Withdrawal Approved");
        entry.request_id = Some(id);
        insert_entry(&tx, &entry)?;
    }
    tx.commit()?;
    tracing::info!(
        id,
        contributor_id = req.contributor_id,
        status = %req.status,
        resolved_by = ?req.resolved_by,
        "withdrawal request resolved"
    );
    Ok(req)
}

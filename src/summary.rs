// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Read-only aggregations over the ledger.

use crate::contributors::get_contributor;
use crate::eligibility::total_fund;
use crate::error::{FundError, Result};
use crate::ledger::{query_entries, LedgerFilter};
use crate::models::{Contributor, EntryKind, LedgerEntry};
use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelinePoint {
    pub date: NaiveDate,
    pub balance: Decimal,
}

/// Cumulative balance at each distinct entry date, for one contributor or
/// the whole fund.
pub fn balance_timeline(conn: &Connection, contributor_id: Option<i64>) -> Result<Vec<TimelinePoint>> {
    let filter = LedgerFilter {
        contributor_id,
        ..LedgerFilter::default()
    };
    let mut out: Vec<TimelinePoint> = Vec::new();
    let mut running = Decimal::ZERO;
    for e in query_entries(conn, &filter)? {
        running += e.amount;
        match out.last_mut() {
            Some(p) if p.date == e.date => p.balance = running,
            _ => out.push(TimelinePoint {
                date: e.date,
                balance: running,
            }),
        }
    }
    Ok(out)
}

#[derive(Debug, Clone, Serialize)]
pub struct StatementLine {
    #[serde(flatten)]
    pub entry: LedgerEntry,
    pub running_total: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct Statement {
    pub contributor: Contributor,
    pub lines: Vec<StatementLine>,
    pub current_balance: Decimal,
    pub fund_share_pct: Decimal,
}

/// Every entry of a contributor up to `as_of` with running totals, and the
/// contributor's share of the whole fund on that date.
pub fn statement(conn: &Connection, contributor_id: i64, as_of: NaiveDate) -> Result<Statement> {
    let contributor = get_contributor(conn, contributor_id)?;
    let entries = query_entries(conn, &LedgerFilter::contributor(contributor_id).as_of(as_of))?;
    let mut running = Decimal::ZERO;
    let lines: Vec<StatementLine> = entries
        .into_iter()
        .map(|entry| {
            running += entry.amount;
            StatementLine {
                entry,
                running_total: running,
            }
        })
        .collect();

    let fund = total_fund(conn, as_of)?;
    let fund_share_pct = if fund > Decimal::ZERO {
        running
            .checked_div(fund)
            .and_then(|f| f.checked_mul(Decimal::ONE_HUNDRED))
            .ok_or_else(|| FundError::validation("Fund share is out of range"))?
    } else {
        Decimal::ZERO
    };
    Ok(Statement {
        contributor,
        lines,
        current_balance: running,
        fund_share_pct,
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Breakdown {
    pub deposits: Decimal,
    pub trades: Decimal,
    pub withdrawals: Decimal,
    pub charges: Decimal,
    pub balance: Decimal,
}

/// Totals per entry kind. Withdrawals are reported as a positive amount.
pub fn breakdown(conn: &Connection, contributor_id: Option<i64>) -> Result<Breakdown> {
    let filter = LedgerFilter {
        contributor_id,
        ..LedgerFilter::default()
    };
    let mut b = Breakdown::default();
    for e in query_entries(conn, &filter)? {
        match e.kind {
            EntryKind::Deposit => b.deposits += e.amount,
            EntryKind::Trade => b.trades += e.amount,
            EntryKind::Withdrawal => b.withdrawals -= e.amount,
        }
        b.charges += e.allocated_charges;
        b.balance += e.amount;
    }
    Ok(b)
}

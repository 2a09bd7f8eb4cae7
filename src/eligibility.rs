// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! As-of balances. A contributor's eligibility on a date is its entire net
//! ledger position up to and including that date.

use crate::error::{FundError, Result};
use crate::utils::decimal_col;
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use rust_decimal::Decimal;

fn add_checked(total: Decimal, amount: Decimal) -> Result<Decimal> {
    total
        .checked_add(amount)
        .ok_or_else(|| FundError::validation("Ledger balance is out of range"))
}

pub fn eligible_balance(conn: &Connection, contributor_id: i64, as_of: NaiveDate) -> Result<Decimal> {
    let mut stmt = conn.prepare_cached(
        "SELECT amount FROM ledger_entries WHERE contributor_id=?1 AND date<=?2",
    )?;
    let rows = stmt.query_map(params![contributor_id, as_of], |r| decimal_col(r, 0))?;
    let mut total = Decimal::ZERO;
    for amount in rows {
        total = add_checked(total, amount?)?;
    }
    Ok(total)
}

pub fn total_fund(conn: &Connection, as_of: NaiveDate) -> Result<Decimal> {
    let mut stmt = conn.prepare_cached("SELECT amount FROM ledger_entries WHERE date<=?1")?;
    let rows = stmt.query_map(params![as_of], |r| decimal_col(r, 0))?;
    let mut total = Decimal::ZERO;
    for amount in rows {
        total = add_checked(total, amount?)?;
    }
    Ok(total)
}

/// Every contributor's as-of balance in contributor id order, including
/// contributors with no entries (balance 0).
pub fn eligible_balances(conn: &Connection, as_of: NaiveDate) -> Result<Vec<(i64, Decimal)>> {
    let mut stmt = conn.prepare_cached(
        "SELECT c.id, l.amount FROM contributors c
         LEFT JOIN ledger_entries l ON l.contributor_id=c.id AND l.date<=?1
         ORDER BY c.id",
    )?;
    let mut cur = stmt.query(params![as_of])?;
    let mut out: Vec<(i64, Decimal)> = Vec::new();
    while let Some(r) = cur.next()? {
        let id: i64 = r.get(0)?;
        let amount: Option<String> = r.get(1)?;
        let amount = match amount {
            Some(_) => decimal_col(r, 1)?,
            None => Decimal::ZERO,
        };
        match out.last_mut() {
            Some((last, sum)) if *last == id => *sum = add_checked(*sum, amount)?,
            _ => out.push((id, amount)),
        }
    }
    Ok(out)
}

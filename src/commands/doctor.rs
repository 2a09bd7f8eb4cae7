// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::{query_entries, LedgerFilter};
use crate::trades::list_trades;
use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::{Connection, OptionalExtension};
use rust_decimal::Decimal;

pub fn find_issues(conn: &Connection) -> Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();

    // 1) Trades whose fan-out does not add back up to the trade
    for t in list_trades(conn)? {
        let filter = LedgerFilter {
            trade_id: Some(t.id),
            ..LedgerFilter::default()
        };
        let entries = query_entries(conn, &filter)?;
        if entries.is_empty() {
            rows.push(vec!["trade_not_distributed".into(), format!("trade {}", t.id)]);
            continue;
        }
        let shares: Decimal = entries.iter().map(|e| e.amount).sum();
        let charges: Decimal = entries.iter().map(|e| e.allocated_charges).sum();
        if shares != t.net_profit_after_commission {
            rows.push(vec![
                "trade_shares_mismatch".into(),
                format!(
                    "trade {}: entries {} vs distributed {}",
                    t.id, shares, t.net_profit_after_commission
                ),
            ]);
        }
        if charges != t.charges {
            rows.push(vec![
                "trade_charges_mismatch".into(),
                format!("trade {}: entries {} vs charges {}", t.id, charges, t.charges),
            ]);
        }
    }

    // 2) Trade entries that lost their trade link
    let mut stmt = conn.prepare(
        "SELECT id FROM ledger_entries WHERE kind='trade' AND trade_id IS NULL ORDER BY id",
    )?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let id: i64 = r.get(0)?;
        rows.push(vec!["unlinked_trade_entry".into(), format!("entry {}", id)]);
    }

    // 3) Approved requests without their withdrawal entry
    let mut stmt2 = conn
        .prepare("SELECT id FROM withdrawal_requests WHERE status='approved' ORDER BY id")?;
    let mut cur2 = stmt2.query([])?;
    while let Some(r) = cur2.next()? {
        let id: i64 = r.get(0)?;
        let mut st = conn.prepare_cached(
            "SELECT 1 FROM ledger_entries WHERE request_id=?1 AND kind='withdrawal' LIMIT 1",
        )?;
        let ok: Option<i32> = st.query_row([id], |r| r.get(0)).optional()?;
        if ok.is_none() {
            rows.push(vec!["approved_request_unbooked".into(), format!("request {}", id)]);
        }
    }
    Ok(rows)
}

pub fn handle(conn: &Connection) -> Result<()> {
    let rows = find_issues(conn)?;
    if rows.is_empty() {
        println!("doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{optional, optional_date};
use crate::contributors::list_contributors;
use crate::summary::{breakdown, statement, Statement};
use crate::utils::{fmt_money, id_for_contributor, maybe_print_json, pretty_table, today};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let as_of = optional_date(sub, "as-of")?.unwrap_or_else(today);
    let ids: Vec<i64> = match optional(sub, "contributor") {
        Some(name) => vec![id_for_contributor(conn, name)?],
        None => list_contributors(conn)?.into_iter().map(|c| c.id).collect(),
    };
    let mut statements: Vec<Statement> = Vec::with_capacity(ids.len());
    for id in ids {
        statements.push(statement(conn, id, as_of)?);
    }
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &statements)? {
        return Ok(());
    }

    for s in &statements {
        println!(
            "{}: balance {} ({}% of fund)",
            s.contributor.name,
            fmt_money(&s.current_balance),
            fmt_money(&s.fund_share_pct)
        );
        let rows = s
            .lines
            .iter()
            .map(|l| {
                vec![
                    l.entry.date.to_string(),
                    l.entry.kind.to_string(),
                    l.entry.asset.clone().unwrap_or_default(),
                    fmt_money(&l.entry.amount),
                    fmt_money(&l.entry.allocated_charges),
                    l.entry.comment.clone(),
                    fmt_money(&l.running_total),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Date", "Kind", "Asset", "Amount", "Charges", "Comment", "Running"],
                rows
            )
        );
    }

    if optional(sub, "contributor").is_none() {
        let b = breakdown(conn, None)?;
        println!(
            "{}",
            pretty_table(
                &["Deposits", "Trade P&L", "Withdrawals", "Charges", "Fund"],
                vec![vec![
                    fmt_money(&b.deposits),
                    fmt_money(&b.trades),
                    fmt_money(&b.withdrawals),
                    fmt_money(&b.charges),
                    fmt_money(&b.balance),
                ]],
            )
        );
    }
    Ok(())
}

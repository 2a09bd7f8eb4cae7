// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{id_of, optional, optional_date, optional_decimal};
use crate::error::FundError;
use crate::ledger::{correct_entry, delete_entry, query_entries, LedgerFilter};
use crate::models::{EntryKind, EntryUpdate};
use crate::utils::{fmt_money, id_for_contributor, maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::{params, Connection};
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => list(conn, sub)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("rm", sub)) => {
            let id = id_of(sub)?;
            delete_entry(conn, id)?;
            println!("Removed ledger entry {}", id);
        }
        _ => {}
    }
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_rows(conn, sub)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    r.date.clone(),
                    r.contributor.clone(),
                    r.kind.clone(),
                    r.amount.clone(),
                    r.allocated_charges.clone(),
                    r.asset.clone(),
                    r.comment.clone(),
                    r.running_total.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Date", "Contributor", "Kind", "Amount", "Charges", "Asset", "Comment", "Running"],
                rows,
            )
        );
    }
    Ok(())
}

#[derive(Serialize)]
pub struct LedgerRow {
    pub id: i64,
    pub date: String,
    pub contributor: String,
    pub kind: String,
    pub amount: String,
    pub allocated_charges: String,
    pub asset: String,
    pub comment: String,
    pub running_total: String,
}

pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<LedgerRow>> {
    let filter = LedgerFilter {
        contributor_id: optional(sub, "contributor")
            .map(|name| id_for_contributor(conn, name))
            .transpose()?,
        as_of: optional_date(sub, "as-of")?,
        ..LedgerFilter::default()
    };

    let mut names = conn.prepare_cached("SELECT name FROM contributors WHERE id=?1")?;
    let mut running = rust_decimal::Decimal::ZERO;
    let mut data = Vec::new();
    for e in query_entries(conn, &filter)? {
        running += e.amount;
        let contributor: String = names.query_row(params![e.contributor_id], |r| r.get(0))?;
        data.push(LedgerRow {
            id: e.id,
            date: e.date.to_string(),
            contributor,
            kind: e.kind.to_string(),
            amount: fmt_money(&e.amount),
            allocated_charges: fmt_money(&e.allocated_charges),
            asset: e.asset.unwrap_or_default(),
            comment: e.comment,
            running_total: fmt_money(&running),
        });
    }
    Ok(data)
}

fn edit(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = id_of(sub)?;
    let update = EntryUpdate {
        date: optional_date(sub, "date")?,
        kind: optional(sub, "kind")
            .map(|k| k.parse::<EntryKind>().map_err(FundError::Validation))
            .transpose()?,
        amount: optional_decimal(sub, "amount")?,
        asset: sub.get_one::<String>("asset").cloned(),
        allocated_charges: optional_decimal(sub, "charges")?,
        comment: sub.get_one::<String>("comment").cloned(),
    };
    let e = correct_entry(conn, id, &update)?;
    println!(
        "Ledger entry {} now {} {} on {}",
        e.id,
        e.kind,
        fmt_money(&e.amount),
        e.date
    );
    Ok(())
}

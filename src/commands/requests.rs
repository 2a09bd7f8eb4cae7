// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{id_of, optional, optional_date, required};
use crate::contributors::list_contributors;
use crate::models::{RequestStatus, Resolution};
use crate::utils::{
    fmt_money, id_for_contributor, maybe_print_json, parse_date, parse_decimal, pretty_table,
    today,
};
use crate::withdrawals::{list_requests, requests_for_contributor, resolve_request, submit_request};
use anyhow::Result;
use rusqlite::Connection;
use std::collections::HashMap;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("submit", sub)) => {
            let name = required(sub, "contributor")?;
            let date = parse_date(required(sub, "date")?)?;
            let amount = parse_decimal(required(sub, "amount")?)?;
            let id = submit_request(
                conn,
                id_for_contributor(conn, name)?,
                date,
                amount,
                optional(sub, "comment").unwrap_or_default(),
            )?;
            println!(
                "Request #{} for {} on {} submitted for '{}' and pending approval",
                id,
                fmt_money(&amount),
                date,
                name
            );
        }
        Some(("list", sub)) => list(conn, sub)?,
        Some(("approve", sub)) => resolve(conn, sub, Resolution::Approve)?,
        Some(("reject", sub)) => resolve(conn, sub, Resolution::Reject)?,
        _ => {}
    }
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let data = match optional(sub, "contributor") {
        Some(name) => requests_for_contributor(conn, id_for_contributor(conn, name)?)?,
        None if sub.get_flag("all") => list_requests(conn, None)?,
        None => list_requests(conn, Some(RequestStatus::Pending))?,
    };
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let names: HashMap<i64, String> = list_contributors(conn)?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect();
        let rows = data
            .into_iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    names.get(&r.contributor_id).cloned().unwrap_or_else(|| "Unknown".into()),
                    r.requested_on.to_string(),
                    fmt_money(&r.amount),
                    r.status.to_string(),
                    r.resolved_on.map(|d| d.to_string()).unwrap_or_default(),
                    r.comment,
                    r.admin_comment.unwrap_or_default(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Contributor", "Requested", "Amount", "Status", "Resolved", "Comment", "Admin Comment"],
                rows,
            )
        );
    }
    Ok(())
}

fn resolve(conn: &mut Connection, sub: &clap::ArgMatches, resolution: Resolution) -> Result<()> {
    let id = id_of(sub)?;
    let date = optional_date(sub, "date")?.unwrap_or_else(today);
    let req = resolve_request(
        conn,
        id,
        resolution,
        date,
        optional(sub, "note"),
        optional(sub, "by"),
    )?;
    println!("Withdrawal request #{} {} on {}", req.id, req.status, date);
    Ok(())
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{optional, optional_date};
use crate::eligibility::{eligible_balance, total_fund};
use crate::summary::balance_timeline;
use crate::utils::{fmt_money, id_for_contributor, maybe_print_json, pretty_table, today};
use anyhow::Result;
use rusqlite::Connection;
use serde_json::json;

pub fn handle(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let as_of = optional_date(sub, "as-of")?.unwrap_or_else(today);
    let contributor = optional(sub, "contributor")
        .map(|name| id_for_contributor(conn, name).map(|id| (name, id)))
        .transpose()?;

    if sub.get_flag("timeline") {
        let points: Vec<_> = balance_timeline(conn, contributor.map(|(_, id)| id))?
            .into_iter()
            .filter(|p| p.date <= as_of)
            .collect();
        if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &points)? {
            let rows = points
                .iter()
                .map(|p| vec![p.date.to_string(), fmt_money(&p.balance)])
                .collect();
            println!("{}", pretty_table(&["Date", "Balance"], rows));
        }
        return Ok(());
    }

    let (label, balance) = match contributor {
        Some((name, id)) => (name.to_string(), eligible_balance(conn, id, as_of)?),
        None => ("fund".to_string(), total_fund(conn, as_of)?),
    };
    let v = json!({ "name": label, "as_of": as_of, "balance": balance });
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &v)? {
        println!("{} balance as of {}: {}", label, as_of, fmt_money(&balance));
    }
    Ok(())
}

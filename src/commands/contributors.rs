// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{optional, optional_date, optional_decimal, required};
use crate::contributors::{
    add_contributor, add_contributor_with_deposit, contributor_stats, delete_contributor,
    link_login, list_contributors, update_contributor,
};
use crate::utils::{fmt_money, id_for_contributor, maybe_print_json, pretty_table, today};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("show", sub)) => show(conn, sub)?,
        Some(("edit", sub)) => {
            let id = id_for_contributor(conn, required(sub, "name")?)?;
            let c = update_contributor(
                conn,
                id,
                optional(sub, "new-name"),
                sub.get_one::<String>("category").map(|s| s.as_str()),
            )?;
            println!("Updated contributor '{}' ({})", c.name, c.category);
        }
        Some(("link", sub)) => {
            let name = required(sub, "name")?;
            let login = required(sub, "login")?;
            link_login(conn, id_for_contributor(conn, name)?, login)?;
            println!("Linked login '{}' to '{}'", login, name);
        }
        Some(("rm", sub)) => {
            let name = required(sub, "name")?;
            let id = id_for_contributor(conn, name)?;
            delete_contributor(conn, id)?;
            println!("Removed contributor '{}' and all of its entries", name);
        }
        _ => {}
    }
    Ok(())
}

fn add(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = required(sub, "name")?;
    let category = optional(sub, "category").unwrap_or("external");
    let login = optional(sub, "login");
    match optional_decimal(sub, "deposit")? {
        Some(amount) => {
            let date = optional_date(sub, "date")?.unwrap_or_else(today);
            add_contributor_with_deposit(conn, name, category, login, date, amount)?;
            println!(
                "Added contributor '{}' ({}) with deposit {} on {}",
                name,
                category,
                fmt_money(&amount),
                date
            );
        }
        None => {
            add_contributor(conn, name, category, login)?;
            println!("Added contributor '{}' ({})", name, category);
        }
    }
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let data = list_contributors(conn)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .into_iter()
            .map(|c| {
                vec![
                    c.id.to_string(),
                    c.name,
                    c.category,
                    c.login.unwrap_or_default(),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["ID", "Name", "Category", "Login"], rows));
    }
    Ok(())
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = id_for_contributor(conn, required(sub, "name")?)?;
    let stats = contributor_stats(conn, id)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &stats)? {
        let rows = vec![
            vec!["Name".into(), stats.contributor.name.clone()],
            vec!["Category".into(), stats.contributor.category.clone()],
            vec![
                "Login".into(),
                stats.contributor.login.clone().unwrap_or_default(),
            ],
            vec!["Entries".into(), stats.entry_count.to_string()],
            vec!["Deposits".into(), fmt_money(&stats.total_deposits)],
            vec!["Withdrawals".into(), fmt_money(&stats.total_withdrawals)],
            vec!["Trade P&L".into(), fmt_money(&stats.trade_total)],
            vec!["Balance".into(), fmt_money(&stats.current_balance)],
            vec!["ROI %".into(), fmt_money(&stats.roi_pct)],
        ];
        println!("{}", pretty_table(&["Field", "Value"], rows));
    }
    Ok(())
}

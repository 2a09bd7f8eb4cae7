// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod contributors;
pub mod deposits;
pub mod trades;
pub mod withdrawals;
pub mod requests;
pub mod ledger;
pub mod balance;
pub mod summary;
pub mod doctor;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::utils::{parse_date, parse_decimal};

pub(crate) fn required<'a>(m: &'a clap::ArgMatches, name: &str) -> Result<&'a str> {
    m.get_one::<String>(name)
        .map(|s| s.trim())
        .with_context(|| format!("--{} is required", name))
}

pub(crate) fn id_of(m: &clap::ArgMatches) -> Result<i64> {
    m.get_one::<i64>("id").copied().context("--id is required")
}

pub(crate) fn optional<'a>(m: &'a clap::ArgMatches, name: &str) -> Option<&'a str> {
    m.get_one::<String>(name)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
}

pub(crate) fn optional_date(m: &clap::ArgMatches, name: &str) -> Result<Option<NaiveDate>> {
    Ok(optional(m, name).map(parse_date).transpose()?)
}

pub(crate) fn optional_decimal(m: &clap::ArgMatches, name: &str) -> Result<Option<Decimal>> {
    Ok(optional(m, name).map(parse_decimal).transpose()?)
}

/// Per-contributor breakdown of a fan-out, by contributor name.
pub(crate) fn shares_table(
    conn: &rusqlite::Connection,
    shares: &[crate::allocation::Share],
) -> Result<comfy_table::Table> {
    let names: std::collections::HashMap<i64, String> =
        crate::contributors::list_contributors(conn)?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect();
    let rows = shares
        .iter()
        .map(|s| {
            vec![
                names.get(&s.contributor_id).cloned().unwrap_or_default(),
                crate::utils::fmt_money(&s.eligible),
                crate::utils::fmt_money(&s.amount),
                crate::utils::fmt_money(&s.charges),
            ]
        })
        .collect();
    Ok(crate::utils::pretty_table(
        &["Contributor", "Eligible", "Share", "Charges"],
        rows,
    ))
}

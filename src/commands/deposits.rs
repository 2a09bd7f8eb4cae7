// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{optional, required};
use crate::ledger::record_deposit;
use crate::utils::{fmt_money, id_for_contributor, parse_date, parse_decimal};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = required(sub, "contributor")?;
    let date = parse_date(required(sub, "date")?)?;
    let amount = parse_decimal(required(sub, "amount")?)?;
    let id = id_for_contributor(conn, name)?;
    record_deposit(conn, id, date, amount, optional(sub, "comment"))?;
    println!("Added {} to '{}' on {}", fmt_money(&amount), name, date);
    Ok(())
}

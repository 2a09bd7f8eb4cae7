// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{optional, required, shares_table};
use crate::utils::{fmt_money, parse_date, parse_decimal};
use crate::withdrawals::record_admin_withdrawal;
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let date = parse_date(required(sub, "date")?)?;
    let amount = parse_decimal(required(sub, "amount")?)?;
    let comment = optional(sub, "comment").unwrap_or_default();
    let shares = record_admin_withdrawal(conn, date, amount, comment)?;
    println!("Withdrawal on {} for {} processed.", date, fmt_money(&amount));
    println!("{}", shares_table(conn, &shares)?);
    Ok(())
}

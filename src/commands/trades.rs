// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{id_of, optional, optional_date, optional_decimal, required, shares_table};
use crate::error::FundError;
use crate::models::{NewTrade, Side, TradeDetails, TradeUpdate};
use crate::trades::{correct_trade, list_trades, record_trade, trades_for_contributor};
use crate::utils::{fmt_money, id_for_contributor, maybe_print_json, parse_date, pretty_table};
use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("record", sub)) => record(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn side_arg(sub: &clap::ArgMatches) -> Result<Option<Side>> {
    Ok(optional(sub, "side")
        .map(|s| s.parse::<Side>().map_err(FundError::Validation))
        .transpose()?)
}

fn details_from(sub: &clap::ArgMatches) -> Result<TradeDetails> {
    Ok(TradeDetails {
        side: side_arg(sub)?,
        quantity: optional_decimal(sub, "quantity")?,
        entry_price: optional_decimal(sub, "entry")?,
        exit_price: optional_decimal(sub, "exit")?,
        instrument: optional(sub, "instrument").map(str::to_string),
        broker: optional(sub, "broker").map(str::to_string),
        trade_ref: optional(sub, "ref").map(str::to_string),
        strategy: optional(sub, "strategy").map(str::to_string),
        tags: optional(sub, "tags").map(str::to_string),
    })
}

fn record(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let input = NewTrade {
        date: parse_date(required(sub, "date")?)?,
        asset: required(sub, "asset")?.to_string(),
        pnl: optional_decimal(sub, "pnl")?,
        charges: optional_decimal(sub, "charges")?.unwrap_or(Decimal::ZERO),
        comment: optional(sub, "comment").unwrap_or_default().to_string(),
        details: details_from(sub)?,
    };
    let (trade, shares) = record_trade(conn, &input)?;
    println!(
        "Trade recorded on {} for '{}'. Commission: {}, net profit distributed: {}",
        trade.date,
        trade.asset,
        fmt_money(&trade.commission),
        fmt_money(&trade.net_profit_after_commission)
    );
    println!("{}", shares_table(conn, &shares)?);
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let data = match optional(sub, "contributor") {
        Some(name) => trades_for_contributor(conn, id_for_contributor(conn, name)?)?,
        None => list_trades(conn)?,
    };
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .into_iter()
            .map(|t| {
                vec![
                    t.id.to_string(),
                    t.date.to_string(),
                    t.asset,
                    t.details.side.map(|s| s.to_string()).unwrap_or_default(),
                    fmt_money(&t.pnl),
                    fmt_money(&t.charges),
                    fmt_money(&t.commission),
                    fmt_money(&t.net_profit_after_commission),
                    t.comment,
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Date", "Asset", "Side", "P&L", "Charges", "Commission", "Distributed", "Comment"],
                rows,
            )
        );
    }
    Ok(())
}

fn edit(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = id_of(sub)?;
    let details = details_from(sub)?;
    let update = TradeUpdate {
        date: optional_date(sub, "date")?,
        asset: optional(sub, "asset").map(str::to_string),
        pnl: optional_decimal(sub, "pnl")?,
        charges: optional_decimal(sub, "charges")?,
        comment: sub.get_one::<String>("comment").cloned(),
        side: details.side,
        quantity: details.quantity,
        entry_price: details.entry_price,
        exit_price: details.exit_price,
        instrument: details.instrument,
        broker: details.broker,
        trade_ref: details.trade_ref,
        strategy: details.strategy,
        tags: details.tags,
    };
    let (trade, rebooked) = correct_trade(conn, id, &update)?;
    println!("Trade {} updated", trade.id);
    if let Some(shares) = rebooked {
        println!("Re-distributed {}:", fmt_money(&trade.net_profit_after_commission));
        println!("{}", shares_table(conn, &shares)?);
    }
    Ok(())
}

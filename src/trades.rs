// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Trade records and their fan-out.
//!
//! A trade and its per-contributor entries are written in one immediate
//! transaction; when no contributor holds funds on the trade date the whole
//! write is rolled back and the trade is not kept.

use crate::allocation::{distribute_trade, trade_outcome, Share};
use crate::error::{FundError, Result};
use crate::models::{NewTrade, Trade, TradeDetails, TradeUpdate};
use crate::utils::{decimal_col, non_empty, opt_decimal_col};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use rust_decimal::Decimal;

const TRADE_COLUMNS: &str = "t.id, t.date, t.asset, t.pnl, t.charges, t.commission, t.net_pnl, t.net_profit_after_commission, t.comment, \
     t.side, t.quantity, t.entry_price, t.exit_price, t.instrument, t.broker, t.trade_ref, t.strategy, t.tags";

fn trade_from_row(r: &Row<'_>) -> rusqlite::Result<Trade> {
    Ok(Trade {
        id: r.get(0)?,
        date: r.get(1)?,
        asset: r.get(2)?,
        pnl: decimal_col(r, 3)?,
        charges: decimal_col(r, 4)?,
        commission: decimal_col(r, 5)?,
        net_pnl: decimal_col(r, 6)?,
        net_profit_after_commission: decimal_col(r, 7)?,
        comment: r.get(8)?,
        details: TradeDetails {
            side: r.get(9)?,
            quantity: opt_decimal_col(r, 10)?,
            entry_price: opt_decimal_col(r, 11)?,
            exit_price: opt_decimal_col(r, 12)?,
            instrument: r.get(13)?,
            broker: r.get(14)?,
            trade_ref: r.get(15)?,
            strategy: r.get(16)?,
            tags: r.get(17)?,
        },
    })
}

/// P&L given directly, or derived from side, quantity, entry and exit.
pub fn resolve_pnl(pnl: Option<Decimal>, details: &TradeDetails) -> Result<Decimal> {
    if let Some(p) = pnl {
        return Ok(p);
    }
    let has_execution = details.quantity.is_some()
        && details.entry_price.is_some()
        && details.exit_price.is_some();
    if !has_execution {
        return Err(FundError::validation(
            "Provide a P&L or side, quantity, entry and exit to compute it",
        ));
    }
    if details.side.is_none() {
        return Err(FundError::validation(
            "Choose a side (long/short) when using entry, exit and quantity",
        ));
    }
    details
        .implied_pnl()
        .ok_or_else(|| FundError::validation("P&L implied by quantity, entry and exit is out of range"))
}

fn validate_common(asset: &str, charges: Decimal) -> Result<()> {
    if asset.trim().is_empty() {
        return Err(FundError::validation("Asset is required"));
    }
    if charges < Decimal::ZERO {
        return Err(FundError::validation(format!(
            "Charges cannot be negative (got {})",
            charges
        )));
    }
    Ok(())
}

fn write_trade(conn: &Connection, t: &Trade) -> Result<()> {
    let d = &t.details;
    conn.execute(
        "UPDATE trades SET date=?1, asset=?2, pnl=?3, charges=?4, commission=?5, net_pnl=?6,
            net_profit_after_commission=?7, comment=?8, side=?9, quantity=?10, entry_price=?11,
            exit_price=?12, instrument=?13, broker=?14, trade_ref=?15, strategy=?16, tags=?17
         WHERE id=?18",
        params![
            t.date,
            t.asset,
            t.pnl.to_string(),
            t.charges.to_string(),
            t.commission.to_string(),
            t.net_pnl.to_string(),
            t.net_profit_after_commission.to_string(),
            t.comment,
            d.side,
            d.quantity.map(|v| v.to_string()),
            d.entry_price.map(|v| v.to_string()),
            d.exit_price.map(|v| v.to_string()),
            d.instrument,
            d.broker,
            d.trade_ref,
            d.strategy,
            d.tags,
            t.id
        ],
    )?;
    Ok(())
}

/// Records a trade and distributes its net profit after commission (and its
/// charges) across every contributor as of the trade date.
pub fn record_trade(conn: &mut Connection, input: &NewTrade) -> Result<(Trade, Vec<Share>)> {
    validate_common(&input.asset, input.charges)?;
    let pnl = resolve_pnl(input.pnl, &input.details)?;

    let outcome = trade_outcome(pnl, input.charges)?;

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    tx.execute(
        "INSERT INTO trades(date, asset, pnl, charges, commission, net_pnl, net_profit_after_commission, comment)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            input.date,
            input.asset.trim(),
            outcome.pnl.to_string(),
            outcome.charges.to_string(),
            outcome.commission.to_string(),
            outcome.net_pnl.to_string(),
            outcome.net_profit_after_commission.to_string(),
            input.comment.trim()
        ],
    )?;
    let d = &input.details;
    let trade = Trade {
        id: tx.last_insert_rowid(),
        date: input.date,
        asset: input.asset.trim().to_string(),
        pnl: outcome.pnl,
        charges: outcome.charges,
        commission: outcome.commission,
        net_pnl: outcome.net_pnl,
        net_profit_after_commission: outcome.net_profit_after_commission,
        comment: input.comment.trim().to_string(),
        details: TradeDetails {
            side: d.side,
            quantity: d.quantity,
            entry_price: d.entry_price,
            exit_price: d.exit_price,
            instrument: non_empty(d.instrument.as_deref()),
            broker: non_empty(d.broker.as_deref()),
            trade_ref: non_empty(d.trade_ref.as_deref()),
            strategy: non_empty(d.strategy.as_deref()),
            tags: non_empty(d.tags.as_deref()),
        },
    };
    write_trade(&tx, &trade)?;

    let shares = match distribute_trade(&tx, &trade) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(date = %trade.date, asset = %trade.asset, error = %e, "trade abandoned");
            return Err(e);
        }
    };
    tx.commit()?;
    tracing::info!(
        id = trade.id,
        date = %trade.date,
        asset = %trade.asset,
        commission = %trade.commission,
        net_profit_after_commission = %trade.net_profit_after_commission,
        "trade recorded"
    );
    Ok((trade, shares))
}

pub fn get_trade(conn: &Connection, id: i64) -> Result<Trade> {
    let sql = format!("SELECT {} FROM trades t WHERE t.id=?1", TRADE_COLUMNS);
    conn.query_row(&sql, params![id], trade_from_row)
        .optional()?
        .ok_or_else(|| FundError::NotFound(format!("Trade {}", id)))
}

pub fn list_trades(conn: &Connection) -> Result<Vec<Trade>> {
    let sql = format!("SELECT {} FROM trades t ORDER BY t.date, t.id", TRADE_COLUMNS);
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], trade_from_row)?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    Ok(data)
}

/// Trades that booked at least one entry for the contributor.
pub fn trades_for_contributor(conn: &Connection, contributor_id: i64) -> Result<Vec<Trade>> {
    let sql = format!(
        "SELECT {} FROM trades t WHERE t.id IN
            (SELECT trade_id FROM ledger_entries WHERE contributor_id=?1 AND trade_id IS NOT NULL)
         ORDER BY t.date, t.id",
        TRADE_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![contributor_id], trade_from_row)?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    Ok(data)
}

/// Overwrites a trade in place. When the date or the distributed figures
/// change, the trade's entries are rebooked as of the (new) date; otherwise
/// only their asset and comment follow the trade.
pub fn correct_trade(
    conn: &mut Connection,
    id: i64,
    update: &TradeUpdate,
) -> Result<(Trade, Option<Vec<Share>>)> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let old = get_trade(&tx, id)?;
    let mut t = old.clone();

    if let Some(date) = update.date {
        t.date = date;
    }
    if let Some(asset) = &update.asset {
        t.asset = asset.trim().to_string();
    }
    if let Some(comment) = &update.comment {
        t.comment = comment.trim().to_string();
    }
    let charges = update.charges.unwrap_or(old.charges);
    validate_common(&t.asset, charges)?;

    let d = &mut t.details;
    if update.side.is_some() {
        d.side = update.side;
    }
    if update.quantity.is_some() {
        d.quantity = update.quantity;
    }
    if update.entry_price.is_some() {
        d.entry_price = update.entry_price;
    }
    if update.exit_price.is_some() {
        d.exit_price = update.exit_price;
    }
    for (slot, value) in [
        (&mut d.instrument, &update.instrument),
        (&mut d.broker, &update.broker),
        (&mut d.trade_ref, &update.trade_ref),
        (&mut d.strategy, &update.strategy),
        (&mut d.tags, &update.tags),
    ] {
        if let Some(v) = value {
            *slot = non_empty(Some(v));
        }
    }

    // Execution edits without an explicit P&L must still imply one
    let execution_changed = update.side.is_some()
        || update.quantity.is_some()
        || update.entry_price.is_some()
        || update.exit_price.is_some();
    let pnl = match update.pnl {
        Some(p) => p,
        None if execution_changed => resolve_pnl(None, &t.details)?,
        None => old.pnl,
    };

    let outcome = trade_outcome(pnl, charges)?;
    t.pnl = outcome.pnl;
    t.charges = outcome.charges;
    t.commission = outcome.commission;
    t.net_pnl = outcome.net_pnl;
    t.net_profit_after_commission = outcome.net_profit_after_commission;
    write_trade(&tx, &t)?;

    let rebook = t.date != old.date
        || t.charges != old.charges
        || t.net_profit_after_commission != old.net_profit_after_commission;
    let shares = if rebook {
        let removed = tx.execute("DELETE FROM ledger_entries WHERE trade_id=?1", params![id])?;
        tracing::debug!(trade_id = id, removed, "previous trade entries removed");
        Some(distribute_trade(&tx, &t)?)
    } else {
        tx.execute(
            "UPDATE ledger_entries SET asset=?1, comment=?2 WHERE trade_id=?3",
            params![t.asset, t.comment, id],
        )?;
        None
    };
    tx.commit()?;
    tracing::info!(id, rebooked = rebook, "trade corrected");
    Ok((t, shares))
}

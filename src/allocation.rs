// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Proportional fan-out of fund-level events.
//!
//! A trade outcome or a fund-wide withdrawal is split across every
//! contributor by `eligible / total`, where eligibility is the as-of ledger
//! balance (see [`crate::eligibility`]). Negative balances take part with
//! their sign.
//!
//! Rounding: each share is rounded to cents (half away from zero) and the
//! residual left between the rounded shares and the event amount is booked
//! to the contributor with the largest absolute unrounded share (lowest
//! contributor id on ties). Shares therefore always sum exactly to the event
//! amount.
//!
//! All arithmetic is checked; figures too large for a `Decimal` are refused
//! with a validation error instead of overflowing.
//!
//! The fan-out functions here write through the connection they are given
//! and expect the caller to hold an immediate transaction around the
//! balance read and the inserts.

use crate::eligibility::eligible_balances;
use crate::error::{FundError, Result};
use crate::ledger::append_entries;
use crate::models::{EntryKind, NewEntry, Trade};
use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::Serialize;

pub const MONEY_DP: u32 = 2;

/// Performance fee taken from net trading profit.
pub const COMMISSION_RATE: Decimal = dec!(0.30);

fn out_of_range(what: &str) -> FundError {
    FundError::validation(format!("{} is out of range", what))
}

/// Derived figures of a trade before any fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TradeOutcome {
    pub pnl: Decimal,
    pub charges: Decimal,
    pub commission: Decimal,
    pub net_pnl: Decimal,
    pub net_profit_after_commission: Decimal,
}

/// Commission is charged on net profit only; a net loss pays none.
pub fn trade_outcome(pnl: Decimal, charges: Decimal) -> Result<TradeOutcome> {
    let net_pnl = pnl
        .checked_sub(charges)
        .ok_or_else(|| out_of_range("Net P&L"))?;
    let commission = if net_pnl > Decimal::ZERO {
        COMMISSION_RATE
            .checked_mul(net_pnl)
            .ok_or_else(|| out_of_range("Commission"))?
    } else {
        Decimal::ZERO
    };
    Ok(TradeOutcome {
        pnl,
        charges,
        commission,
        net_pnl,
        net_profit_after_commission: net_pnl - commission,
    })
}

/// Splits `amount` over `weights` in proportion to each weight's part of the
/// weight total. Returns `Ok(None)` when the total is not positive.
pub fn split_proportionally(
    weights: &[(i64, Decimal)],
    amount: Decimal,
) -> Result<Option<Vec<(i64, Decimal)>>> {
    let total = weights
        .iter()
        .try_fold(Decimal::ZERO, |acc, (_, w)| acc.checked_add(*w))
        .ok_or_else(|| out_of_range("Fund total"))?;
    if total <= Decimal::ZERO {
        return Ok(None);
    }

    let mut raw = Vec::with_capacity(weights.len());
    for (_, w) in weights {
        let share = w
            .checked_div(total)
            .and_then(|fraction| fraction.checked_mul(amount))
            .ok_or_else(|| out_of_range("Allocated share"))?;
        raw.push(share);
    }
    let mut shares: Vec<(i64, Decimal)> = weights
        .iter()
        .zip(&raw)
        .map(|((id, _), r)| {
            (
                *id,
                r.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero),
            )
        })
        .collect();

    let booked = shares
        .iter()
        .try_fold(Decimal::ZERO, |acc, (_, s)| acc.checked_add(*s))
        .ok_or_else(|| out_of_range("Allocated total"))?;
    let residual = amount
        .checked_sub(booked)
        .ok_or_else(|| out_of_range("Rounding residual"))?;
    if !residual.is_zero() {
        let mut largest = 0;
        for (i, r) in raw.iter().enumerate() {
            if r.abs() > raw[largest].abs() {
                largest = i;
            }
        }
        shares[largest].1 = shares[largest]
            .1
            .checked_add(residual)
            .ok_or_else(|| out_of_range("Allocated share"))?;
    }
    Ok(Some(shares))
}

/// One contributor's part of a fan-out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Share {
    pub contributor_id: i64,
    pub eligible: Decimal,
    pub amount: Decimal,
    pub charges: Decimal,
    pub entry_id: i64,
}

/// Books `trade.net_profit_after_commission` and `trade.charges` across all
/// contributors as of the trade date, one `trade` entry each, linked to the
/// trade id.
pub fn distribute_trade(conn: &Connection, trade: &Trade) -> Result<Vec<Share>> {
    let balances = eligible_balances(conn, trade.date)?;
    let no_funds = || {
        FundError::Allocation(format!(
            "No eligible funds available as of the trade date {}",
            trade.date
        ))
    };
    let profit = split_proportionally(&balances, trade.net_profit_after_commission)?
        .ok_or_else(no_funds)?;
    let charges = split_proportionally(&balances, trade.charges)?.ok_or_else(no_funds)?;

    let entries: Vec<NewEntry> = profit
        .iter()
        .zip(&charges)
        .map(|((cid, amount), (_, charge))| NewEntry {
            contributor_id: *cid,
            date: trade.date,
            kind: EntryKind::Trade,
            amount: *amount,
            asset: Some(trade.asset.clone()),
            allocated_charges: *charge,
            comment: trade.comment.clone(),
            trade_id: Some(trade.id),
            request_id: None,
        })
        .collect();
    let ids = append_entries(conn, &entries)?;

    let out: Vec<Share> = balances
        .iter()
        .zip(&entries)
        .zip(ids)
        .map(|(((cid, eligible), e), entry_id)| Share {
            contributor_id: *cid,
            eligible: *eligible,
            amount: e.amount,
            charges: e.allocated_charges,
            entry_id,
        })
        .collect();
    tracing::info!(
        trade_id = trade.id,
        contributors = out.len(),
        distributed = %trade.net_profit_after_commission,
        charges = %trade.charges,
        "trade distributed"
    );
    Ok(out)
}

/// Withdraws `amount` from the whole fund: every contributor is debited in
/// proportion to its as-of balance. Share amounts are positive; the booked
/// entries carry the negated share.
pub fn distribute_withdrawal(
    conn: &Connection,
    date: NaiveDate,
    amount: Decimal,
    comment: &str,
) -> Result<Vec<Share>> {
    let balances = eligible_balances(conn, date)?;
    let shares = split_proportionally(&balances, amount)?.ok_or_else(|| {
        FundError::Allocation(format!("No funds available for withdrawal as of {}", date))
    })?;

    let entries: Vec<NewEntry> = shares
        .iter()
        .map(|(cid, share)| {
            NewEntry::new(*cid, date, EntryKind::Withdrawal, -*share).comment(comment.to_string())
        })
        .collect();
    let ids = append_entries(conn, &entries)?;

    let out: Vec<Share> = balances
        .iter()
        .zip(&shares)
        .zip(ids)
        .map(|(((cid, eligible), (_, share)), entry_id)| Share {
            contributor_id: *cid,
            eligible: *eligible,
            amount: *share,
            charges: Decimal::ZERO,
            entry_id,
        })
        .collect();
    tracing::info!(%date, %amount, contributors = out.len(), "fund withdrawal distributed");
    Ok(out)
}

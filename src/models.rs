// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Implements text round-tripping (Display, FromStr, SQLite) for a fieldless
/// enum stored as a lowercase TEXT column.
macro_rules! text_enum {
    ($ty:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok($ty::$variant),)+
                    other => Err(format!(
                        concat!("unknown ", stringify!($ty), " '{}'"),
                        other
                    )),
                }
            }
        }

        impl ToSql for $ty {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $ty {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|e: String| FromSqlError::Other(e.into()))
            }
        }
    };
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Contributor {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub login: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Deposit,
    Trade,
    Withdrawal,
}

text_enum!(EntryKind {
    Deposit => "deposit",
    Trade => "trade",
    Withdrawal => "withdrawal",
});

/// One immutable, dated, signed movement attributed to a single contributor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LedgerEntry {
    pub id: i64,
    pub contributor_id: i64,
    pub date: NaiveDate,
    pub kind: EntryKind,
    pub amount: Decimal,
    pub asset: Option<String>,
    pub allocated_charges: Decimal,
    pub comment: String,
    pub trade_id: Option<i64>,
    pub request_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewEntry {
    pub contributor_id: i64,
    pub date: NaiveDate,
    pub kind: EntryKind,
    pub amount: Decimal,
    pub asset: Option<String>,
    pub allocated_charges: Decimal,
    pub comment: String,
    pub trade_id: Option<i64>,
    pub request_id: Option<i64>,
}

impl NewEntry {
    pub fn new(contributor_id: i64, date: NaiveDate, kind: EntryKind, amount: Decimal) -> Self {
        Self {
            contributor_id,
            date,
            kind,
            amount,
            asset: None,
            allocated_charges: Decimal::ZERO,
            comment: String::new(),
            trade_id: None,
            request_id: None,
        }
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }
}

/// Administrative correction of a ledger entry. `None` leaves a field as is.
#[derive(Debug, Clone, Default)]
pub struct EntryUpdate {
    pub date: Option<NaiveDate>,
    pub kind: Option<EntryKind>,
    pub amount: Option<Decimal>,
    pub asset: Option<String>,
    pub allocated_charges: Option<Decimal>,
    pub comment: Option<String>,
}

impl EntryUpdate {
    pub fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.kind.is_none()
            && self.amount.is_none()
            && self.asset.is_none()
            && self.allocated_charges.is_none()
            && self.comment.is_none()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Long,
    Short,
}

text_enum!(Side {
    Long => "long",
    Short => "short",
});

/// Optional execution details kept alongside a trade.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TradeDetails {
    pub side: Option<Side>,
    pub quantity: Option<Decimal>,
    pub entry_price: Option<Decimal>,
    pub exit_price: Option<Decimal>,
    pub instrument: Option<String>,
    pub broker: Option<String>,
    pub trade_ref: Option<String>,
    pub strategy: Option<String>,
    pub tags: Option<String>,
}

impl TradeDetails {
    /// P&L implied by side, quantity, entry and exit. `None` when a field is
    /// missing or the product does not fit a `Decimal`.
    pub fn implied_pnl(&self) -> Option<Decimal> {
        let (side, qty, entry, exit) = (
            self.side?,
            self.quantity?,
            self.entry_price?,
            self.exit_price?,
        );
        let move_per_unit = match side {
            Side::Long => exit.checked_sub(entry)?,
            Side::Short => entry.checked_sub(exit)?,
        };
        move_per_unit.checked_mul(qty)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Trade {
    pub id: i64,
    pub date: NaiveDate,
    pub asset: String,
    pub pnl: Decimal,
    pub charges: Decimal,
    pub commission: Decimal,
    pub net_pnl: Decimal,
    pub net_profit_after_commission: Decimal,
    pub comment: String,
    #[serde(flatten)]
    pub details: TradeDetails,
}

/// Input for recording a trade. Either `pnl` is given, or `details` carries
/// side, quantity, entry and exit so the P&L can be derived.
#[derive(Debug, Clone)]
pub struct NewTrade {
    pub date: NaiveDate,
    pub asset: String,
    pub pnl: Option<Decimal>,
    pub charges: Decimal,
    pub comment: String,
    pub details: TradeDetails,
}

/// Typed correction of a trade. `None` leaves a field as is; derived figures
/// are always recomputed.
#[derive(Debug, Clone, Default)]
pub struct TradeUpdate {
    pub date: Option<NaiveDate>,
    pub asset: Option<String>,
    pub pnl: Option<Decimal>,
    pub charges: Option<Decimal>,
    pub comment: Option<String>,
    pub side: Option<Side>,
    pub quantity: Option<Decimal>,
    pub entry_price: Option<Decimal>,
    pub exit_price: Option<Decimal>,
    pub instrument: Option<String>,
    pub broker: Option<String>,
    pub trade_ref: Option<String>,
    pub strategy: Option<String>,
    pub tags: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

text_enum!(RequestStatus {
    Pending => "pending",
    Approved => "approved",
    Rejected => "rejected",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Approve,
    Reject,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WithdrawalRequest {
    pub id: i64,
    pub contributor_id: i64,
    pub requested_on: NaiveDate,
    pub amount: Decimal,
    pub comment: String,
    pub status: RequestStatus,
    pub resolved_on: Option<NaiveDate>,
    pub admin_comment: Option<String>,
    pub resolved_by: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContributorStats {
    pub contributor: Contributor,
    pub entry_count: usize,
    pub total_deposits: Decimal,
    pub total_withdrawals: Decimal,
    pub trade_total: Decimal,
    pub current_balance: Decimal,
    pub roi_pct: Decimal,
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Error taxonomy for the ledger core.
//!
//! Every variant aborts the operation that raised it before any state becomes
//! visible: validation runs before writes, and allocations run inside a
//! single transaction that is rolled back on drop.

use rusqlite::ErrorCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FundError>;

#[derive(Error, Debug)]
pub enum FundError {
    /// Malformed or missing input; nothing was written.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// No positive fund balance to split an event over.
    #[error("Allocation refused: {0}")]
    Allocation(String),

    /// Uniqueness or lifecycle conflict (duplicate name, resolved request).
    #[error("Conflict: {0}")]
    Integrity(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Store operation failed: {0}")]
    Store(#[from] rusqlite::Error),
}

impl FundError {
    pub fn validation(msg: impl Into<String>) -> Self {
        FundError::Validation(msg.into())
    }

    /// Maps UNIQUE violations to [`FundError::Integrity`] with `what` as the
    /// message; everything else stays a store error.
    pub fn from_unique(err: rusqlite::Error, what: impl Into<String>) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation => {
                FundError::Integrity(what.into())
            }
            _ => FundError::Store(err),
        }
    }
}

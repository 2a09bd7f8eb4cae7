// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod cli;
pub mod db;
pub mod error;
pub mod models;
pub mod utils;
pub mod ledger;
pub mod eligibility;
pub mod allocation;
pub mod contributors;
pub mod trades;
pub mod withdrawals;
pub mod summary;
pub mod commands;

pub use error::{FundError, Result};

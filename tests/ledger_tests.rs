// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use fundledger::contributors::add_contributor;
use fundledger::eligibility::{eligible_balance, eligible_balances, total_fund};
use fundledger::ledger::{
    append_entry, correct_entry, delete_entry, get_entry, query_entries, record_deposit,
    LedgerFilter,
};
use fundledger::models::{EntryKind, EntryUpdate, NewEntry};
use fundledger::{db, FundError};
use rusqlite::Connection;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

#[test]
fn entries_come_back_in_date_then_insertion_order() {
    let conn = setup();
    let a = add_contributor(&conn, "Asha", "internal", None).unwrap();
    let late = record_deposit(&conn, a, d("2025-03-01"), dec!(30), None).unwrap();
    let first = record_deposit(&conn, a, d("2025-01-01"), dec!(10), Some("seed")).unwrap();
    let second = record_deposit(&conn, a, d("2025-01-01"), dec!(20), None).unwrap();

    let ids: Vec<i64> = query_entries(&conn, &LedgerFilter::contributor(a))
        .unwrap()
        .iter()
        .map(|e| e.id)
        .collect();
    assert_eq!(ids, vec![first, second, late]);

    assert_eq!(get_entry(&conn, first).unwrap().comment, "seed");
    assert_eq!(get_entry(&conn, second).unwrap().comment, "Additional Deposit");

    let upto = query_entries(&conn, &LedgerFilter::contributor(a).as_of(d("2025-02-01"))).unwrap();
    assert_eq!(upto.len(), 2);
}

#[test]
fn deposits_must_be_positive_and_owned() {
    let conn = setup();
    let a = add_contributor(&conn, "Asha", "internal", None).unwrap();
    assert!(matches!(
        record_deposit(&conn, a, d("2025-01-01"), dec!(0), None),
        Err(FundError::Validation(_))
    ));
    assert!(matches!(
        record_deposit(&conn, a, d("2025-01-01"), dec!(-1), None),
        Err(FundError::Validation(_))
    ));
    assert!(matches!(
        record_deposit(&conn, 404, d("2025-01-01"), dec!(1), None),
        Err(FundError::NotFound(_))
    ));
}

#[test]
fn eligibility_is_an_as_of_sum() {
    let conn = setup();
    let a = add_contributor(&conn, "Asha", "internal", None).unwrap();
    let b = add_contributor(&conn, "Bilal", "external", None).unwrap();
    let c = add_contributor(&conn, "Chen", "external", None).unwrap();
    record_deposit(&conn, a, d("2025-01-01"), dec!(100), None).unwrap();
    record_deposit(&conn, b, d("2025-01-10"), dec!(50), None).unwrap();
    append_entry(
        &conn,
        &NewEntry::new(a, d("2025-01-10"), EntryKind::Withdrawal, dec!(-30)),
    )
    .unwrap();

    assert_eq!(eligible_balance(&conn, a, d("2024-12-31")).unwrap(), Decimal::ZERO);
    assert_eq!(eligible_balance(&conn, a, d("2025-01-09")).unwrap(), dec!(100));
    assert_eq!(eligible_balance(&conn, a, d("2025-01-10")).unwrap(), dec!(70));
    assert_eq!(total_fund(&conn, d("2025-01-09")).unwrap(), dec!(100));
    assert_eq!(total_fund(&conn, d("2025-01-10")).unwrap(), dec!(120));

    let all = eligible_balances(&conn, d("2025-01-10")).unwrap();
    assert_eq!(all, vec![(a, dec!(70)), (b, dec!(50)), (c, Decimal::ZERO)]);
    let sum: Decimal = all.iter().map(|(_, v)| *v).sum();
    assert_eq!(sum, total_fund(&conn, d("2025-01-10")).unwrap());
}

#[test]
fn later_entries_do_not_change_earlier_eligibility() {
    let conn = setup();
    let a = add_contributor(&conn, "Asha", "internal", None).unwrap();
    record_deposit(&conn, a, d("2025-01-01"), dec!(100), None).unwrap();
    let before = eligible_balance(&conn, a, d("2025-01-05")).unwrap();
    record_deposit(&conn, a, d("2025-01-06"), dec!(900), None).unwrap();
    assert_eq!(eligible_balance(&conn, a, d("2025-01-05")).unwrap(), before);
}

#[test]
fn corrections_and_deletions() {
    let conn = setup();
    let a = add_contributor(&conn, "Asha", "internal", None).unwrap();
    let id = record_deposit(&conn, a, d("2025-01-01"), dec!(100), None).unwrap();

    let untouched = correct_entry(&conn, id, &EntryUpdate::default()).unwrap();
    assert_eq!(untouched.amount, dec!(100));

    let update = EntryUpdate {
        date: Some(d("2025-01-03")),
        amount: Some(dec!(125.50)),
        comment: Some("bank transfer".into()),
        ..EntryUpdate::default()
    };
    let e = correct_entry(&conn, id, &update).unwrap();
    assert_eq!(e.amount, dec!(125.50));
    assert_eq!(get_entry(&conn, id).unwrap(), e);
    assert_eq!(eligible_balance(&conn, a, d("2025-01-02")).unwrap(), Decimal::ZERO);

    let bad = EntryUpdate {
        allocated_charges: Some(dec!(-1)),
        ..EntryUpdate::default()
    };
    assert!(matches!(
        correct_entry(&conn, id, &bad),
        Err(FundError::Validation(_))
    ));

    delete_entry(&conn, id).unwrap();
    assert!(matches!(get_entry(&conn, id), Err(FundError::NotFound(_))));
    assert!(matches!(delete_entry(&conn, id), Err(FundError::NotFound(_))));
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use fundledger::contributors::add_contributor;
use fundledger::eligibility::{eligible_balance, total_fund};
use fundledger::ledger::{query_entries, record_deposit, LedgerFilter};
use fundledger::models::{EntryKind, RequestStatus, Resolution};
use fundledger::withdrawals::{
    get_request, list_pending_requests, list_requests, record_admin_withdrawal,
    requests_for_contributor, resolve_request, submit_request,
};
use fundledger::{db, FundError};
use rusqlite::Connection;
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
fn approved_request_debits_only_the_requester() {
    let mut conn = setup();
    let a = add_contributor(&conn, "Asha", "internal", Some("asha@fund")).unwrap();
    let b = add_contributor(&conn, "Bilal", "external", None).unwrap();
    record_deposit(&conn, a, d("2025-01-01"), dec!(600), None).unwrap();
    record_deposit(&conn, b, d("2025-01-01"), dec!(400), None).unwrap();

    let id = submit_request(&conn, a, d("2025-02-01"), dec!(150), "school fees").unwrap();
    let pending = get_request(&conn, id).unwrap();
    assert_eq!(pending.status, RequestStatus::Pending);
    assert_eq!(pending.resolved_on, None);
    assert_eq!(list_pending_requests(&conn).unwrap().len(), 1);

    let req = resolve_request(
        &mut conn,
        id,
        Resolution::Approve,
        d("2025-02-03"),
        Some("paid out"),
        Some("admin@fund"),
    )
    .unwrap();
    assert_eq!(req.status, RequestStatus::Approved);
    assert_eq!(req.resolved_on, Some(d("2025-02-03")));
    assert_eq!(req.admin_comment.as_deref(), Some("paid out"));
    assert_eq!(req.resolved_by.as_deref(), Some("admin@fund"));
    assert_eq!(get_request(&conn, id).unwrap(), req);

    let withdrawals = query_entries(
        &conn,
        &LedgerFilter {
            kind: Some(EntryKind::Withdrawal),
            ..LedgerFilter::default()
        },
    )
    .unwrap();
    assert_eq!(withdrawals.len(), 1);
    let w = &withdrawals[0];
    assert_eq!(w.contributor_id, a);
    assert_eq!(w.amount, dec!(-150));
    assert_eq!(w.date, d("2025-02-03"));
    assert_eq!(w.request_id, Some(id));
    assert_eq!(w.comment, "Withdrawal Approved");

    assert_eq!(eligible_balance(&conn, a, d("2025-02-03")).unwrap(), dec!(450));
    assert_eq!(eligible_balance(&conn, b, d("2025-02-03")).unwrap(), dec!(400));
    // Booked on the approval day, not the request day
    assert_eq!(eligible_balance(&conn, a, d("2025-02-02")).unwrap(), dec!(600));
    assert!(list_pending_requests(&conn).unwrap().is_empty());
}

#[test]
fn resolved_requests_are_terminal() {
    let mut conn = setup();
    let a = add_contributor(&conn, "Asha", "internal", None).unwrap();
    record_deposit(&conn, a, d("2025-01-01"), dec!(600), None).unwrap();
    let id = submit_request(&conn, a, d("2025-02-01"), dec!(100), "").unwrap();

    resolve_request(&mut conn, id, Resolution::Approve, d("2025-02-02"), None, None).unwrap();
    let again = resolve_request(&mut conn, id, Resolution::Approve, d("2025-02-03"), None, None);
    assert!(matches!(again, Err(FundError::Integrity(_))));
    let flip = resolve_request(&mut conn, id, Resolution::Reject, d("2025-02-03"), None, None);
    assert!(matches!(flip, Err(FundError::Integrity(_))));

    let booked = query_entries(&conn, &LedgerFilter::contributor(a)).unwrap();
    assert_eq!(booked.len(), 2);
    assert_eq!(
        get_request(&conn, id).unwrap().resolved_on,
        Some(d("2025-02-02"))
    );
}

#[test]
fn rejected_request_writes_nothing_to_the_ledger() {
    let mut conn = setup();
    let a = add_contributor(&conn, "Asha", "internal", None).unwrap();
    record_deposit(&conn, a, d("2025-01-01"), dec!(600), None).unwrap();
    let id = submit_request(&conn, a, d("2025-02-01"), dec!(100), "car").unwrap();

    let req = resolve_request(
        &mut conn,
        id,
        Resolution::Reject,
        d("2025-02-02"),
        Some("  "),
        Some("admin"),
    )
    .unwrap();
    assert_eq!(req.status, RequestStatus::Rejected);
    assert_eq!(req.admin_comment, None);
    assert_eq!(query_entries(&conn, &LedgerFilter::default()).unwrap().len(), 1);
    assert_eq!(
        list_requests(&conn, Some(RequestStatus::Rejected)).unwrap().len(),
        1
    );
    assert!(matches!(
        resolve_request(&mut conn, 42, Resolution::Reject, d("2025-02-02"), None, None),
        Err(FundError::NotFound(_))
    ));
}

#[test]
fn invalid_requests_are_refused() {
    let conn = setup();
    let a = add_contributor(&conn, "Asha", "internal", None).unwrap();
    assert!(matches!(
        submit_request(&conn, a, d("2025-02-01"), dec!(0), ""),
        Err(FundError::Validation(_))
    ));
    assert!(matches!(
        submit_request(&conn, a, d("2025-02-01"), dec!(-5), ""),
        Err(FundError::Validation(_))
    ));
    assert!(matches!(
        submit_request(&conn, 99, d("2025-02-01"), dec!(5), ""),
        Err(FundError::NotFound(_))
    ));
    assert!(list_requests(&conn, None).unwrap().is_empty());
}

#[test]
fn requests_listed_in_submission_order() {
    let conn = setup();
    let a = add_contributor(&conn, "Asha", "internal", None).unwrap();
    let b = add_contributor(&conn, "Bilal", "external", None).unwrap();
    let late = submit_request(&conn, a, d("2025-03-01"), dec!(10), "").unwrap();
    let early = submit_request(&conn, b, d("2025-01-01"), dec!(20), "").unwrap();
    let same_day = submit_request(&conn, a, d("2025-03-01"), dec!(30), "").unwrap();

    let ids: Vec<i64> = list_requests(&conn, None)
        .unwrap()
        .iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(ids, vec![early, late, same_day]);

    let mine: Vec<i64> = requests_for_contributor(&conn, a)
        .unwrap()
        .iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(mine, vec![late, same_day]);
}

#[test]
fn fund_withdrawal_is_shared_by_balance() {
    let mut conn = setup();
    let a = add_contributor(&conn, "Asha", "internal", None).unwrap();
    let b = add_contributor(&conn, "Bilal", "external", None).unwrap();
    record_deposit(&conn, a, d("2025-01-01"), dec!(700), None).unwrap();
    record_deposit(&conn, b, d("2025-01-01"), dec!(300), None).unwrap();

    let shares = record_admin_withdrawal(&mut conn, d("2025-04-01"), dec!(300), "audit fee").unwrap();
    assert_eq!(shares.len(), 2);
    assert_eq!(shares[0].contributor_id, a);
    assert_eq!(shares[0].amount, dec!(210));
    assert_eq!(shares[1].amount, dec!(90));

    let entries = query_entries(
        &conn,
        &LedgerFilter {
            kind: Some(EntryKind::Withdrawal),
            ..LedgerFilter::default()
        },
    )
    .unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| e.comment == "audit fee"));
    assert!(entries.iter().all(|e| e.request_id.is_none()));
    assert_eq!(eligible_balance(&conn, a, d("2025-04-01")).unwrap(), dec!(490));
    assert_eq!(eligible_balance(&conn, b, d("2025-04-01")).unwrap(), dec!(210));
    assert_eq!(total_fund(&conn, d("2025-04-01")).unwrap(), dec!(700));
}

#[test]
fn fund_withdrawal_needs_funds() {
    let mut conn = setup();
    let a = add_contributor(&conn, "Asha", "internal", None).unwrap();
    record_deposit(&conn, a, d("2025-05-01"), dec!(700), None).unwrap();

    assert!(matches!(
        record_admin_withdrawal(&mut conn, d("2025-04-01"), dec!(100), ""),
        Err(FundError::Allocation(_))
    ));
    assert!(matches!(
        record_admin_withdrawal(&mut conn, d("2025-06-01"), dec!(0), ""),
        Err(FundError::Validation(_))
    ));
    assert_eq!(query_entries(&conn, &LedgerFilter::default()).unwrap().len(), 1);
}

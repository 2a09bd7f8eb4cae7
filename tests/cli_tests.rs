// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use fundledger::commands::{
    balance, contributors, deposits, doctor, ledger, requests, summary, trades,
    withdrawals,
};
use fundledger::eligibility::{eligible_balance, total_fund};
use fundledger::utils::id_for_contributor;
use fundledger::withdrawals::list_requests;
use fundledger::{cli, db};
use rusqlite::Connection;
use rust_decimal_macros::dec;
use tempfile::tempdir;

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// Parses a command line and routes it the way the binary does.
fn run(conn: &mut Connection, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["fundledger"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().try_get_matches_from(argv)?;
    match matches.subcommand() {
        Some(("contributor", sub)) => contributors::handle(conn, sub),
        Some(("deposit", sub)) => deposits::handle(conn, sub),
        Some(("trade", sub)) => trades::handle(conn, sub),
        Some(("withdraw", sub)) => withdrawals::handle(conn, sub),
        Some(("request", sub)) => requests::handle(conn, sub),
        Some(("ledger", sub)) => ledger::handle(conn, sub),
        Some(("balance", sub)) => balance::handle(conn, sub),
        Some(("summary", sub)) => summary::handle(conn, sub),
        Some(("doctor", _)) => doctor::handle(conn),
        _ => Ok(()),
    }
}

fn seeded(conn: &mut Connection) {
    run(conn, &["contributor", "add", "--name", "Asha", "--category", "internal", "--deposit", "600", "--date", "2025-01-01"]).unwrap();
    run(conn, &["contributor", "add", "--name", "Bilal", "--login", "bilal@fund"]).unwrap();
    run(conn, &["deposit", "--contributor", "Bilal", "--date", "2025-01-01", "--amount", "400"]).unwrap();
}

#[test]
fn full_flow_through_the_command_line() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("fund.sqlite");
    let mut conn = db::open_at(&path).unwrap();
    seeded(&mut conn);

    run(&mut conn, &["trade", "record", "--date", "2025-01-10", "--asset", "NIFTY", "--pnl", "1010", "--charges", "10"]).unwrap();
    let asha = id_for_contributor(&conn, "Asha").unwrap();
    let bilal = id_for_contributor(&conn, "Bilal").unwrap();
    assert_eq!(eligible_balance(&conn, asha, d("2025-01-10")).unwrap(), dec!(1020));
    assert_eq!(eligible_balance(&conn, bilal, d("2025-01-10")).unwrap(), dec!(680));

    run(&mut conn, &["request", "submit", "--contributor", "Bilal", "--date", "2025-02-01", "--amount", "80"]).unwrap();
    let req = list_requests(&conn, None).unwrap()[0].id.to_string();
    run(&mut conn, &["request", "approve", "--id", &req, "--date", "2025-02-02", "--by", "ops"]).unwrap();
    assert_eq!(eligible_balance(&conn, bilal, d("2025-02-02")).unwrap(), dec!(600));
    assert!(run(&mut conn, &["request", "reject", "--id", &req]).is_err());

    run(&mut conn, &["withdraw", "--date", "2025-03-01", "--amount", "162", "--comment", "audit"]).unwrap();
    assert_eq!(total_fund(&conn, d("2025-03-01")).unwrap(), dec!(1458));

    run(&mut conn, &["ledger", "list", "--contributor", "Asha", "--json"]).unwrap();
    run(&mut conn, &["balance", "--as-of", "2025-03-01", "--jsonl"]).unwrap();
    run(&mut conn, &["balance", "--contributor", "Asha", "--timeline"]).unwrap();
    run(&mut conn, &["summary", "--as-of", "2025-03-01"]).unwrap();
    run(&mut conn, &["trade", "list", "--contributor", "Bilal"]).unwrap();
    run(&mut conn, &["contributor", "show", "--name", "Asha", "--json"]).unwrap();
    run(&mut conn, &["doctor"]).unwrap();
    assert!(doctor::find_issues(&conn).unwrap().is_empty());

    // Reopening keeps everything
    drop(conn);
    let conn = db::open_at(&path).unwrap();
    assert_eq!(total_fund(&conn, d("2025-03-01")).unwrap(), dec!(1458));
}

#[test]
fn bad_input_is_reported_not_written() {
    let dir = tempdir().unwrap();
    let mut conn = db::open_at(&dir.path().join("fund.sqlite")).unwrap();
    seeded(&mut conn);

    assert!(run(&mut conn, &["deposit", "--contributor", "Nobody", "--date", "2025-01-01", "--amount", "5"]).is_err());
    assert!(run(&mut conn, &["deposit", "--contributor", "Asha", "--date", "01/02/2025", "--amount", "5"]).is_err());
    assert!(run(&mut conn, &["deposit", "--contributor", "Asha", "--date", "2025-01-02", "--amount", "ten"]).is_err());
    assert!(run(&mut conn, &["trade", "record", "--date", "2024-12-01", "--asset", "NIFTY", "--pnl", "50"]).is_err());
    assert!(run(&mut conn, &["trade", "record", "--date", "2025-01-05", "--asset", "NIFTY", "--side", "sideways", "--quantity", "1", "--entry", "1", "--exit", "2"]).is_err());
    assert!(run(&mut conn, &["contributor", "add", "--name", "Asha"]).is_err());
    assert!(run(&mut conn, &["settings", "show"]).is_err());
    assert_eq!(total_fund(&conn, d("2025-12-31")).unwrap(), dec!(1000));
}

#[test]
fn trade_edit_rebooks_from_the_command_line() {
    let dir = tempdir().unwrap();
    let mut conn = db::open_at(&dir.path().join("fund.sqlite")).unwrap();
    seeded(&mut conn);

    run(&mut conn, &["trade", "record", "--date", "2025-01-10", "--asset", "GOLD", "--side", "long", "--quantity", "2", "--entry", "100", "--exit", "150"]).unwrap();
    // 100 gross, 70 after commission
    assert_eq!(total_fund(&conn, d("2025-01-10")).unwrap(), dec!(1070));

    let trade_id: i64 = conn
        .query_row("SELECT id FROM trades", [], |r| r.get(0))
        .unwrap();
    run(&mut conn, &["trade", "edit", "--id", &trade_id.to_string(), "--exit", "250"]).unwrap();
    // 300 gross, 210 after commission
    assert_eq!(total_fund(&conn, d("2025-01-10")).unwrap(), dec!(1210));
    assert!(doctor::find_issues(&conn).unwrap().is_empty());
}

#[test]
fn doctor_flags_tampered_entries() {
    let dir = tempdir().unwrap();
    let mut conn = db::open_at(&dir.path().join("fund.sqlite")).unwrap();
    seeded(&mut conn);
    run(&mut conn, &["trade", "record", "--date", "2025-01-10", "--asset", "NIFTY", "--pnl", "1000"]).unwrap();
    assert!(doctor::find_issues(&conn).unwrap().is_empty());

    let entry: i64 = conn
        .query_row(
            "SELECT id FROM ledger_entries WHERE kind='trade' ORDER BY id LIMIT 1",
            [],
            |r| r.get(0),
        )
        .unwrap();
    run(&mut conn, &["ledger", "edit", "--id", &entry.to_string(), "--amount", "1"]).unwrap();
    let issues = doctor::find_issues(&conn).unwrap();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0][0], "trade_shares_mismatch");

    conn.execute("UPDATE ledger_entries SET trade_id=NULL WHERE id=?1", [entry])
        .unwrap();
    let kinds: Vec<String> = doctor::find_issues(&conn)
        .unwrap()
        .into_iter()
        .map(|r| r[0].clone())
        .collect();
    assert!(kinds.contains(&"unlinked_trade_entry".to_string()));

    run(&mut conn, &["ledger", "rm", "--id", &entry.to_string()]).unwrap();
    run(&mut conn, &["contributor", "rm", "--name", "Bilal"]).unwrap();
    assert!(id_for_contributor(&conn, "Bilal").is_err());
}

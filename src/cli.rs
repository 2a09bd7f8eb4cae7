// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{crate_version, Arg, ArgAction, Command};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print as JSON lines"),
    )
}

fn opt(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).help(help)
}

fn req(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).required(true).help(help)
}

fn id_arg() -> Arg {
    Arg::new("id")
        .long("id")
        .required(true)
        .value_parser(clap::value_parser!(i64))
}

fn trade_detail_args(cmd: Command) -> Command {
    cmd.arg(opt("side", "long|short"))
        .arg(opt("quantity", "Executed quantity"))
        .arg(opt("entry", "Entry price"))
        .arg(opt("exit", "Exit price"))
        .arg(opt("instrument", "Instrument, e.g. FUT/OPT/EQ"))
        .arg(opt("broker", "Broker name"))
        .arg(opt("ref", "Broker trade reference"))
        .arg(opt("strategy", "Strategy label"))
        .arg(opt("tags", "Comma separated tags"))
}

pub fn build_cli() -> Command {
    Command::new("fundledger")
        .version(crate_version!())
        .about("Pooled-capital ledger with proportional trade and withdrawal allocation")
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .help("Database file (default: $FUNDLEDGER_DB or the platform data dir)"),
        )
        .subcommand(Command::new("init").about("Create the database if needed"))
        .subcommand(
            Command::new("contributor")
                .about("Manage contributors")
                .subcommand(
                    Command::new("add")
                        .arg(req("name", "Display name (unique)"))
                        .arg(
                            Arg::new("category")
                                .long("category")
                                .default_value("external")
                                .help("e.g. internal|external"),
                        )
                        .arg(opt("login", "Login identity to bind"))
                        .arg(opt("deposit", "Initial deposit amount"))
                        .arg(opt("date", "Initial deposit date YYYY-MM-DD").requires("deposit")),
                )
                .subcommand(json_flags(Command::new("list")))
                .subcommand(json_flags(Command::new("show").arg(req("name", "Contributor"))))
                .subcommand(
                    Command::new("edit")
                        .arg(req("name", "Current name"))
                        .arg(opt("new-name", "New display name"))
                        .arg(opt("category", "New category")),
                )
                .subcommand(
                    Command::new("link")
                        .arg(req("name", "Contributor"))
                        .arg(req("login", "Login identity")),
                )
                .subcommand(Command::new("rm").arg(req("name", "Contributor"))),
        )
        .subcommand(
            Command::new("deposit")
                .about("Book a deposit for one contributor")
                .arg(req("contributor", "Contributor name"))
                .arg(req("date", "YYYY-MM-DD"))
                .arg(req("amount", "Amount > 0"))
                .arg(opt("comment", "Free text")),
        )
        .subcommand(
            Command::new("trade")
                .about("Record and review fund trades")
                .subcommand(trade_detail_args(
                    Command::new("record")
                        .arg(req("date", "YYYY-MM-DD"))
                        .arg(req("asset", "Asset traded"))
                        .arg(opt("pnl", "Gross P&L (or give side/quantity/entry/exit)"))
                        .arg(
                            Arg::new("charges")
                                .long("charges")
                                .default_value("0")
                                .help("Transaction costs >= 0"),
                        )
                        .arg(opt("comment", "Free text")),
                ))
                .subcommand(json_flags(
                    Command::new("list").arg(opt("contributor", "Only trades booked to this contributor")),
                ))
                .subcommand(trade_detail_args(
                    Command::new("edit")
                        .arg(id_arg())
                        .arg(opt("date", "YYYY-MM-DD"))
                        .arg(opt("asset", "Asset traded"))
                        .arg(opt("pnl", "Gross P&L"))
                        .arg(opt("charges", "Transaction costs >= 0"))
                        .arg(opt("comment", "Free text")),
                )),
        )
        .subcommand(
            Command::new("withdraw")
                .about("Withdraw from the whole fund, split across all contributors")
                .arg(req("date", "YYYY-MM-DD"))
                .arg(req("amount", "Amount > 0"))
                .arg(opt("comment", "Free text")),
        )
        .subcommand(
            Command::new("request")
                .about("Contributor withdrawal requests")
                .subcommand(
                    Command::new("submit")
                        .arg(req("contributor", "Contributor name"))
                        .arg(req("date", "YYYY-MM-DD"))
                        .arg(req("amount", "Amount > 0"))
                        .arg(opt("comment", "Free text")),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .arg(opt("contributor", "Only this contributor's requests"))
                        .arg(
                            Arg::new("all")
                                .long("all")
                                .action(ArgAction::SetTrue)
                                .help("Include resolved requests"),
                        ),
                ))
                .subcommand(
                    Command::new("approve")
                        .arg(id_arg())
                        .arg(opt("date", "Approval date YYYY-MM-DD (default: today)"))
                        .arg(opt("note", "Admin comment"))
                        .arg(opt("by", "Approving admin")),
                )
                .subcommand(
                    Command::new("reject")
                        .arg(id_arg())
                        .arg(opt("date", "Rejection date YYYY-MM-DD (default: today)"))
                        .arg(opt("note", "Admin comment"))
                        .arg(opt("by", "Rejecting admin")),
                ),
        )
        .subcommand(
            Command::new("ledger")
                .about("Inspect and correct ledger entries")
                .subcommand(json_flags(
                    Command::new("list")
                        .arg(opt("contributor", "Contributor name"))
                        .arg(opt("as-of", "Cutoff date YYYY-MM-DD")),
                ))
                .subcommand(
                    Command::new("edit")
                        .arg(id_arg())
                        .arg(opt("date", "YYYY-MM-DD"))
                        .arg(opt("kind", "deposit|trade|withdrawal"))
                        .arg(opt("amount", "Signed amount"))
                        .arg(opt("asset", "Asset label"))
                        .arg(opt("charges", "Allocated charges >= 0"))
                        .arg(opt("comment", "Free text")),
                )
                .subcommand(Command::new("rm").arg(id_arg())),
        )
        .subcommand(json_flags(
            Command::new("balance")
                .about("Eligible balance of a contributor, or the whole fund")
                .arg(opt("contributor", "Contributor name"))
                .arg(opt("as-of", "Cutoff date YYYY-MM-DD (default: today)"))
                .arg(
                    Arg::new("timeline")
                        .long("timeline")
                        .action(ArgAction::SetTrue)
                        .help("Show the running balance at every entry date"),
                ),
        ))
        .subcommand(json_flags(
            Command::new("summary")
                .about("Per-contributor statements and fund breakdown")
                .arg(opt("contributor", "Contributor name"))
                .arg(opt("as-of", "Cutoff date YYYY-MM-DD (default: today)")),
        ))
        .subcommand(Command::new("doctor").about("Check ledger consistency"))
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use fundledger::{cli, commands, db};

fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let mut conn = db::open_or_init(matches.get_one::<String>("db").map(|s| s.as_str()))?;

    match matches.subcommand() {
        Some(("init", _)) => {
            let path = db::db_path(matches.get_one::<String>("db").map(|s| s.as_str()))?;
            println!("Database initialized at {}", path.display());
        }
        Some(("contributor", sub)) => commands::contributors::handle(&mut conn, sub)?,
        Some(("deposit", sub)) => commands::deposits::handle(&conn, sub)?,
        Some(("trade", sub)) => commands::trades::handle(&mut conn, sub)?,
        Some(("withdraw", sub)) => commands::withdrawals::handle(&mut conn, sub)?,
        Some(("request", sub)) => commands::requests::handle(&mut conn, sub)?,
        Some(("ledger", sub)) => commands::ledger::handle(&conn, sub)?,
        Some(("balance", sub)) => commands::balance::handle(&conn, sub)?,
        Some(("summary", sub)) => commands::summary::handle(&conn, sub)?,
        Some(("doctor", _)) => commands::doctor::handle(&conn)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}

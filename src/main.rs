// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use finsync::{cli, commands, keys, store};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("finsync=info")),
        )
        .with_target(false)
        .init();

    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let store = store::Store::open_default()?;
    keys::adopt_legacy(&store)?;

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Store initialized at {}", store::db_path()?.display());
        }
        Some(("expense", sub)) => commands::expenses::handle(&store, sub)?,
        Some(("budget", sub)) => commands::budget::handle(&store, sub)?,
        Some(("trade", sub)) => commands::trades::handle(&store, sub)?,
        Some(("wealth", sub)) => commands::wealth::handle(&store, sub)?,
        Some(("settle", sub)) => commands::settle::handle(&store, sub)?,
        Some(("watch", sub)) => commands::watch::handle(&store, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&store, sub)?,
        Some(("backup", sub)) => commands::backup::handle(&store, sub)?,
        Some(("scan", sub)) => commands::scan::handle(&store, sub)?,
        Some(("doctor", _)) => commands::doctor::handle(&store)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}

// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::backup;
use crate::store::Store;
use anyhow::{Context, Result};

pub fn handle(store: &Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("export", sub)) => export(store, sub),
        Some(("restore", sub)) => restore(store, sub),
        _ => Ok(()),
    }
}

fn export(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let out = sub.get_one::<String>("out").unwrap();
    let envelope = backup::export(store)?;
    std::fs::write(out, serde_json::to_string_pretty(&envelope)?)
        .with_context(|| format!("Write backup '{}'", out))?;
    println!("Backed up {} datasets to {}", envelope.data.len(), out);
    Ok(())
}

fn restore(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let path = sub.get_one::<String>("in").unwrap();
    let text =
        std::fs::read_to_string(path).with_context(|| format!("Read backup '{}'", path))?;
    let count = backup::restore(store, &text)?;
    println!("Restored {} datasets from {}", count, path);
    Ok(())
}

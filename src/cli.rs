// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command};

fn month_arg() -> Arg {
    Arg::new("month")
        .long("month")
        .short('m')
        .value_name("YYYY-MM")
        .help("Month partition (defaults to the current month)")
}

fn json_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print as JSON lines"),
    )
}

fn row_args(cmd: Command) -> Command {
    cmd.arg(month_arg())
        .arg(Arg::new("name").long("name").value_name("NAME"))
        .arg(Arg::new("amount").long("amount").value_name("AMOUNT"))
}

pub fn build_cli() -> Command {
    Command::new("finsync")
        .about("Local-first personal finance: expenses, trades, wealth and a live monthly settlement")
        .version(clap::crate_version!())
        .subcommand(Command::new("init").about("Initialize the store"))
        .subcommand(
            Command::new("expense")
                .about("Expense ledger")
                .subcommand_required(true)
                .subcommand(
                    Command::new("add")
                        .about("Record an expense")
                        .arg(
                            Arg::new("date")
                                .long("date")
                                .value_name("YYYY-MM-DD")
                                .help("Defaults to today"),
                        )
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(Arg::new("category").long("category").required(true))
                        .arg(Arg::new("label").long("label")),
                )
                .subcommand(json_args(
                    Command::new("list").about("List expenses").arg(month_arg()),
                ))
                .subcommand(
                    Command::new("edit")
                        .about("Edit an expense row")
                        .arg(Arg::new("id").required(true))
                        .arg(Arg::new("date").long("date").value_name("YYYY-MM-DD"))
                        .arg(Arg::new("amount").long("amount"))
                        .arg(Arg::new("category").long("category"))
                        .arg(Arg::new("label").long("label")),
                )
                .subcommand(
                    Command::new("del")
                        .about("Delete an expense row")
                        .arg(Arg::new("id").required(true)),
                ),
        )
        .subcommand(
            Command::new("budget")
                .about("Groceries budget config")
                .subcommand_required(true)
                .subcommand(
                    Command::new("set")
                        .about("Set the monthly groceries budget")
                        .arg(Arg::new("amount").required(true)),
                )
                .subcommand(
                    Command::new("override")
                        .about("Add a spent-to-date override (e.g. pre-app receipts)")
                        .arg(Arg::new("spent").long("spent").value_name("AMOUNT"))
                        .arg(
                            Arg::new("clear")
                                .long("clear")
                                .action(ArgAction::SetTrue)
                                .help("Drop the override"),
                        ),
                )
                .subcommand(json_args(Command::new("show").about("Show budget config"))),
        )
        .subcommand(
            Command::new("trade")
                .about("Trades ledger")
                .subcommand_required(true)
                .subcommand(
                    Command::new("add")
                        .about("Record a trade P&L")
                        .arg(
                            Arg::new("date")
                                .long("date")
                                .value_name("YYYY-MM-DD")
                                .help("Defaults to today"),
                        )
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(
                            Arg::new("pnl")
                                .long("pnl")
                                .required(true)
                                .allow_hyphen_values(true)
                                .help("Signed P&L"),
                        ),
                )
                .subcommand(json_args(
                    Command::new("list").about("List trades").arg(month_arg()),
                ))
                .subcommand(
                    Command::new("edit")
                        .about("Edit a trade row")
                        .arg(Arg::new("id").required(true))
                        .arg(Arg::new("date").long("date").value_name("YYYY-MM-DD"))
                        .arg(Arg::new("name").long("name"))
                        .arg(Arg::new("pnl").long("pnl").allow_hyphen_values(true)),
                )
                .subcommand(
                    Command::new("del")
                        .about("Delete a trade row")
                        .arg(Arg::new("id").required(true)),
                ),
        )
        .subcommand(
            Command::new("wealth")
                .about("Wealth snapshots")
                .subcommand_required(true)
                .subcommand(
                    Command::new("add")
                        .about("Record a wealth snapshot")
                        .arg(
                            Arg::new("date")
                                .long("date")
                                .value_name("YYYY-MM-DD")
                                .help("Defaults to today"),
                        )
                        .arg(
                            Arg::new("amount")
                                .long("amount")
                                .required(true)
                                .allow_hyphen_values(true),
                        ),
                )
                .subcommand(json_args(Command::new("list").about("List snapshots"))),
        )
        .subcommand(
            Command::new("settle")
                .about("Monthly settlement: incomes, fixed costs, net projection")
                .subcommand_required(true)
                .subcommand(json_args(
                    Command::new("show")
                        .about("Show the month's net projection")
                        .arg(month_arg()),
                ))
                .subcommand(
                    Command::new("income")
                        .about("Income rows")
                        .subcommand_required(true)
                        .subcommand(row_args(Command::new("add").about("Add an income row")))
                        .subcommand(row_args(
                            Command::new("set")
                                .about("Update an income row")
                                .arg(Arg::new("id").required(true)),
                        ))
                        .subcommand(
                            Command::new("del")
                                .about("Delete an income row")
                                .arg(Arg::new("id").required(true))
                                .arg(month_arg()),
                        ),
                )
                .subcommand(
                    Command::new("fixed")
                        .about("Fixed-cost rows")
                        .subcommand_required(true)
                        .subcommand(row_args(Command::new("add").about("Add a fixed cost")))
                        .subcommand(row_args(
                            Command::new("set")
                                .about("Update a fixed cost")
                                .arg(Arg::new("id").required(true)),
                        ))
                        .subcommand(
                            Command::new("del")
                                .about("Delete a fixed cost")
                                .arg(Arg::new("id").required(true))
                                .arg(month_arg()),
                        ),
                )
                .subcommand(
                    Command::new("planned")
                        .about("Set the manually planned extra amount")
                        .arg(month_arg())
                        .arg(Arg::new("amount").required(true).allow_hyphen_values(true)),
                )
                .subcommand(
                    Command::new("override")
                        .about("Replace automatic spend figures until cleared")
                        .arg(month_arg())
                        .arg(Arg::new("total-spent").long("total-spent").value_name("AMOUNT"))
                        .arg(Arg::new("groceries").long("groceries").value_name("AMOUNT"))
                        .arg(
                            Arg::new("clear")
                                .long("clear")
                                .action(ArgAction::SetTrue)
                                .help("Drop both overrides"),
                        ),
                )
                .subcommand(
                    Command::new("autoplan")
                        .about("Include the groceries budget rest in net")
                        .arg(month_arg())
                        .arg(Arg::new("state").required(true).value_parser(["on", "off"])),
                )
                .subcommand(
                    Command::new("trades")
                        .about("Include the month's trade P&L in income")
                        .arg(month_arg())
                        .arg(Arg::new("state").required(true).value_parser(["on", "off"])),
                )
                .subcommand(
                    Command::new("matcher")
                        .about("How ledger categories are recognized as groceries")
                        .subcommand_required(true)
                        .subcommand(
                            Command::new("exact")
                                .about("Case-sensitive exact tag")
                                .arg(Arg::new("tag").required(true)),
                        )
                        .subcommand(
                            Command::new("fuzzy")
                                .about("Case-insensitive substring synonyms")
                                .arg(Arg::new("synonyms").required(true).num_args(1..)),
                        ),
                )
                .subcommand(
                    Command::new("recalc")
                        .about("Copy the current automatic figures into the overrides")
                        .arg(month_arg()),
                ),
        )
        .subcommand(
            Command::new("watch")
                .about("Live view: reprint the projection whenever a dataset changes")
                .arg(month_arg())
                .arg(
                    Arg::new("background")
                        .long("background")
                        .action(ArgAction::SetTrue)
                        .help("Poll at the slow background cadence"),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Export ledger rows")
                .subcommand_required(true)
                .subcommand(
                    Command::new("expenses")
                        .arg(
                            Arg::new("format")
                                .long("format")
                                .default_value("csv")
                                .value_parser(["csv", "json"]),
                        )
                        .arg(Arg::new("out").long("out").required(true)),
                )
                .subcommand(
                    Command::new("trades")
                        .arg(
                            Arg::new("format")
                                .long("format")
                                .default_value("csv")
                                .value_parser(["csv", "json"]),
                        )
                        .arg(Arg::new("out").long("out").required(true)),
                ),
        )
        .subcommand(
            Command::new("backup")
                .about("Whole-store backup envelope")
                .subcommand_required(true)
                .subcommand(
                    Command::new("export")
                        .about("Write all datasets to a backup file")
                        .arg(Arg::new("out").long("out").required(true)),
                )
                .subcommand(
                    Command::new("restore")
                        .about("Restore datasets from a backup file")
                        .arg(Arg::new("in").long("in").required(true)),
                ),
        )
        .subcommand(json_args(
            Command::new("scan")
                .about("Extract amounts and a label from recognized receipt text")
                .arg(Arg::new("file").required(true))
                .arg(
                    Arg::new("add")
                        .long("add")
                        .action(ArgAction::SetTrue)
                        .help("Record the largest candidate as an expense"),
                )
                .arg(
                    Arg::new("category")
                        .long("category")
                        .default_value("Groceries"),
                ),
        ))
        .subcommand(Command::new("doctor").about("Report store health issues"))
}

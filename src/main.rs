use anyhow::Result;
use clap::{Parser, Subcommand};

use ledgerview::cmd;
use ledgerview::config::Config;
use ledgerview::filespec::FileSpec;

#[derive(Debug, Parser)]
/// Read-only views of a double-entry ledger exported as JSON.
struct Command {
    /// RON file with presentation settings (locale, placeholder text, page
    /// size).
    #[arg(long = "config", global = true)]
    config: Option<FileSpec>,
    #[command(subcommand)]
    subcmd: SubCommand,
}

#[derive(Debug, Subcommand)]
enum SubCommand {
    #[command(name = "accounts")]
    /// Shows the chart of accounts as an indented tree with balances.
    Accounts(cmd::accounts::Command),
    #[command(name = "transactions")]
    /// Shows a page of transactions, newest first, at most two splits each.
    Transactions(cmd::transactions::Command),
    #[command(name = "net-worth")]
    /// Sums asset and liability balances.
    NetWorth(cmd::net_worth::Command),
    #[command(name = "income-expense")]
    /// Totals income and expenses per calendar month.
    IncomeExpense(cmd::income_expense::Command),
    #[command(name = "categories")]
    /// Totals each income and expense account over a date range.
    Categories(cmd::categories::Command),
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cmd = Command::parse();
    let config = Config::load(cmd.config.as_ref())?;
    use SubCommand::*;
    match cmd.subcmd {
        Accounts(cmd) => cmd.run(&config),
        Transactions(cmd) => cmd.run(&config),
        NetWorth(cmd) => cmd.run(&config),
        IncomeExpense(cmd) => cmd.run(&config),
        Categories(cmd) => cmd.run(&config),
    }
}

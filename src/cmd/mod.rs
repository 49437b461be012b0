//! Command line subcommands.

use anyhow::{bail, Result};
use clap::Args;

use crate::currency::CurrencyFormatter;
use crate::filespec::FileSpec;
use crate::quality::Issues;
use crate::source::Snapshot;

pub mod accounts;
pub mod categories;
pub mod income_expense;
pub mod net_worth;
pub mod transactions;

/// Where to read ledger data from.
#[derive(Debug, Args)]
pub struct SourceArgs {
    /// A JSON ledger snapshot with `accounts` and `transactions` keys. "-"
    /// reads from stdin.
    #[arg(short = 's', long = "snapshot", conflicts_with_all = ["accounts", "transactions"])]
    snapshot: Option<FileSpec>,
    /// A JSON accounts response (flat list or nested tree).
    #[arg(long = "accounts")]
    accounts: Option<FileSpec>,
    /// A JSON transactions response (list or paginated envelope).
    #[arg(long = "transactions")]
    transactions: Option<FileSpec>,
}

impl SourceArgs {
    pub fn open(&self) -> Result<Snapshot> {
        match &self.snapshot {
            Some(spec) => Snapshot::from_filespec(spec),
            None if self.accounts.is_none() && self.transactions.is_none() => {
                bail!("no input given, use --snapshot or --accounts/--transactions")
            }
            None => Snapshot::from_filespecs(self.accounts.as_ref(), self.transactions.as_ref()),
        }
    }
}

/// Summarizes the data issues met while producing the output. Each one has
/// already been logged individually.
fn report(issues: &Issues, formatter: &CurrencyFormatter) {
    let count = issues.len() + formatter.cache().unsupported_codes().len();
    if count > 0 {
        log::warn!("{} data issue(s) found, affected values are flagged or zeroed", count);
    }
}

use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;

use crate::cmd::{report, SourceArgs};
use crate::config::Config;
use crate::currency::CurrencyFormatter;
use crate::filespec::{self, FileSpec};
use crate::filter::TransactionFilter;
use crate::quality::Issues;
use crate::render;
use crate::source::LedgerSource;
use crate::summary::CategoryBreakdown;
use crate::tree::AccountTree;

#[derive(Debug, Args)]
pub struct Command {
    #[command(flatten)]
    source: SourceArgs,
    /// Earliest post date (YYYY-MM-DD), inclusive.
    #[arg(long = "from")]
    from: NaiveDate,
    /// Latest post date (YYYY-MM-DD), inclusive.
    #[arg(long = "to")]
    to: NaiveDate,
    /// The file to write to. "-" writes to stdout.
    #[arg(short = 'o', long = "output", default_value = "-")]
    output: FileSpec,
}

impl Command {
    pub fn run(&self, config: &Config) -> Result<()> {
        let source = self.source.open()?;
        let mut issues = Issues::new();
        let tree = AccountTree::build(source.accounts(&mut issues)?, &mut issues);
        let filter = TransactionFilter {
            start_date: Some(self.from),
            end_date: Some(self.to),
            ..Default::default()
        };
        let trns = source.transactions(&filter, &mut issues)?;
        let breakdown = CategoryBreakdown::from_ledger(&tree, &trns, self.from, self.to)?;

        let formatter = CurrencyFormatter::new(config.locale.clone());
        filespec::write_file(
            &self.output,
            &render::category_breakdown(&breakdown, &formatter),
        )?;
        report(&issues, &formatter);
        Ok(())
    }
}

use anyhow::Result;
use clap::Args;

use crate::cmd::{report, SourceArgs};
use crate::config::Config;
use crate::currency::CurrencyFormatter;
use crate::filespec::{self, FileSpec};
use crate::quality::Issues;
use crate::render;
use crate::source::LedgerSource;
use crate::summary::NetWorth;
use crate::tree::AccountTree;

#[derive(Debug, Args)]
pub struct Command {
    #[command(flatten)]
    source: SourceArgs,
    /// The file to write to. "-" writes to stdout.
    #[arg(short = 'o', long = "output", default_value = "-")]
    output: FileSpec,
}

impl Command {
    pub fn run(&self, config: &Config) -> Result<()> {
        let source = self.source.open()?;
        let mut issues = Issues::new();
        let tree = AccountTree::build(source.accounts(&mut issues)?, &mut issues);
        let summary = NetWorth::from_tree(&tree)?;

        let formatter = CurrencyFormatter::new(config.locale.clone());
        filespec::write_file(&self.output, &render::net_worth(&summary, &formatter))?;
        report(&issues, &formatter);
        Ok(())
    }
}

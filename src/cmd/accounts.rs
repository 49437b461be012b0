use anyhow::Result;
use clap::Args;

use crate::account::AccountId;
use crate::cmd::{report, SourceArgs};
use crate::config::Config;
use crate::currency::CurrencyFormatter;
use crate::filespec::{self, FileSpec};
use crate::quality::Issues;
use crate::render;
use crate::source::LedgerSource;
use crate::tree::{AccountTree, ExpansionState};

#[derive(Debug, Args)]
pub struct Command {
    #[command(flatten)]
    source: SourceArgs,
    /// Include hidden accounts.
    #[arg(long = "show-hidden")]
    show_hidden: bool,
    /// Id of an account to show collapsed. May be repeated.
    #[arg(long = "collapse")]
    collapse: Vec<String>,
    /// The file to write to. "-" writes to stdout.
    #[arg(short = 'o', long = "output", default_value = "-")]
    output: FileSpec,
}

impl Command {
    pub fn run(&self, config: &Config) -> Result<()> {
        let source = self.source.open()?;
        let mut issues = Issues::new();
        let tree = AccountTree::build(source.accounts(&mut issues)?, &mut issues);

        let mut state = ExpansionState::new();
        state.show_hidden = self.show_hidden || config.show_hidden;
        for id in &self.collapse {
            let id = AccountId::from(id.as_str());
            if tree.find(&id).is_none() {
                log::warn!("--collapse: no account with id {}", id);
            }
            state.set_expanded(&id, false);
        }

        let formatter = CurrencyFormatter::new(config.locale.clone());
        let content = render::account_tree(&tree, &state, &formatter);
        filespec::write_file(&self.output, &content)?;
        report(&issues, &formatter);
        Ok(())
    }
}

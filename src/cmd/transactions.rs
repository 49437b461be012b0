use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;

use crate::account::AccountId;
use crate::cmd::{report, SourceArgs};
use crate::config::Config;
use crate::currency::CurrencyFormatter;
use crate::filespec::{self, FileSpec};
use crate::filter::TransactionFilter;
use crate::normalize::SplitNormalizer;
use crate::quality::Issues;
use crate::render;
use crate::source::LedgerSource;

#[derive(Debug, Args)]
pub struct Command {
    #[command(flatten)]
    source: SourceArgs,
    /// Only transactions with a split against this account id.
    #[arg(long = "account")]
    account: Option<String>,
    /// Earliest post date (YYYY-MM-DD), inclusive.
    #[arg(long = "from")]
    from: Option<NaiveDate>,
    /// Latest post date (YYYY-MM-DD), inclusive.
    #[arg(long = "to")]
    to: Option<NaiveDate>,
    /// Only transactions whose description contains this text, ignoring case.
    #[arg(long = "description")]
    description: Option<String>,
    /// Matching transactions to skip, newest first.
    #[arg(long = "offset", default_value_t = 0)]
    offset: usize,
    /// Transactions to show. Defaults to the configured page size.
    #[arg(long = "limit", conflicts_with = "all")]
    limit: Option<usize>,
    /// Show every matching transaction.
    #[arg(long = "all")]
    all: bool,
    /// The file to write to. "-" writes to stdout.
    #[arg(short = 'o', long = "output", default_value = "-")]
    output: FileSpec,
}

impl Command {
    fn filter(&self, config: &Config) -> TransactionFilter {
        TransactionFilter {
            account_id: self.account.as_deref().map(AccountId::from),
            start_date: self.from,
            end_date: self.to,
            description: self.description.clone(),
            offset: self.offset,
            limit: if self.all {
                None
            } else {
                Some(self.limit.unwrap_or(config.page_size))
            },
        }
    }

    pub fn run(&self, config: &Config) -> Result<()> {
        let source = self.source.open()?;
        let filter = self.filter(config);
        let mut issues = Issues::new();
        let page = source.transaction_page(&filter, &mut issues)?;

        let formatter = CurrencyFormatter::new(config.locale.clone());
        let normalizer = SplitNormalizer::new(&formatter)
            .with_placeholder(config.description_placeholder.as_str());
        let mut content = render::transaction_table(&page.transactions, &normalizer, &mut issues);
        content.push_str(&page_footer(
            filter.offset,
            page.transactions.len(),
            page.total,
        ));
        filespec::write_file(&self.output, &content)?;
        report(&issues, &formatter);
        Ok(())
    }
}

fn page_footer(offset: usize, shown: usize, total: usize) -> String {
    if shown == 0 {
        format!("no transactions shown ({} matching)\n", total)
    } else {
        format!(
            "transactions {}-{} of {}\n",
            offset + 1,
            offset + shown,
            total
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_case::test_case;

    #[test_case(0, 3, 3 => "transactions 1-3 of 3\n"; "everything")]
    #[test_case(50, 50, 120 => "transactions 51-100 of 120\n"; "middle_page")]
    #[test_case(200, 0, 120 => "no transactions shown (120 matching)\n"; "past_end")]
    fn footer(offset: usize, shown: usize, total: usize) -> String {
        page_footer(offset, shown, total)
    }
}

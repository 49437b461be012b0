use chrono::NaiveDate;

use crate::account::AccountId;
use crate::transaction::Transaction;

/// Selects a page of transactions.
///
/// All set criteria must match. Dates are inclusive and compared against the
/// post date. The description criterion is a case-insensitive substring.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TransactionFilter {
    pub account_id: Option<AccountId>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub offset: usize,
    pub limit: Option<usize>,
}

impl TransactionFilter {
    pub fn matches(&self, trn: &Transaction) -> bool {
        let day = trn.post_day();
        self.account_id.as_ref().map_or(true, |id| trn.touches(id))
            && self.start_date.map_or(true, |start| day >= start)
            && self.end_date.map_or(true, |end| day <= end)
            && self.description.as_ref().map_or(true, |needle| {
                trn.description
                    .as_ref()
                    .map_or(false, |d| d.to_lowercase().contains(&needle.to_lowercase()))
            })
    }

    /// Number of matching transactions, ignoring offset and limit.
    pub fn count(&self, trns: &[Transaction]) -> usize {
        trns.iter().filter(|trn| self.matches(trn)).count()
    }

    /// Returns the selected page, newest first: by post date, then enter
    /// date, both descending. Ties keep their input order.
    pub fn apply(&self, mut trns: Vec<Transaction>) -> Vec<Transaction> {
        trns.retain(|trn| self.matches(trn));
        trns.sort_by(|a, b| {
            b.post_date
                .cmp(&a.post_date)
                .then_with(|| b.enter_date.cmp(&a.enter_date))
        });
        let page = trns.into_iter().skip(self.offset);
        match self.limit {
            Some(limit) => page.take(limit).collect(),
            None => page.collect(),
        }
    }
}

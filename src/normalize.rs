//! Shapes transactions into table rows.
//!
//! Each transaction yields one row per split, for at most its first two
//! splits. The first row of a transaction carries the date and description
//! cells and spans the transaction's rows; the following row leaves them empty.

use chrono::NaiveDate;

use crate::amount::{BalanceStyle, RationalAmount};
use crate::currency::CurrencyFormatter;
use crate::quality::{Issue, Issues};
use crate::transaction::{Split, Transaction};

/// Rows emitted per transaction. Further splits are not shown.
pub const MAX_ROWS_PER_TRANSACTION: usize = 2;

pub const DEFAULT_DESCRIPTION_PLACEHOLDER: &str = "(No description)";

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DescriptionCell {
    pub text: String,
    /// Memo of the transaction's first split.
    pub memo: Option<String>,
    /// Check or reference number.
    pub number: Option<String>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DisplayRow {
    pub transaction_id: String,
    pub split_id: String,
    pub date_cell: Option<NaiveDate>,
    pub description_cell: Option<DescriptionCell>,
    pub account_label: String,
    pub account_type: Option<String>,
    /// The split's value, in the transaction's currency.
    pub amount: RationalAmount,
    pub formatted_amount: String,
    pub style: BalanceStyle,
    /// Rows covered by this row's date and description cells; 0 on rows whose
    /// cells are merged into the row above.
    pub row_span: usize,
}

impl DisplayRow {
    pub fn is_group_start(&self) -> bool {
        self.row_span > 0
    }
}

pub struct SplitNormalizer<'f> {
    formatter: &'f CurrencyFormatter,
    placeholder: String,
}

impl<'f> SplitNormalizer<'f> {
    pub fn new(formatter: &'f CurrencyFormatter) -> Self {
        Self {
            formatter,
            placeholder: DEFAULT_DESCRIPTION_PLACEHOLDER.to_string(),
        }
    }

    /// Sets the text shown for transactions without a description.
    pub fn with_placeholder<S: Into<String>>(mut self, placeholder: S) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn to_rows(&self, trn: &Transaction, issues: &mut Issues) -> Vec<DisplayRow> {
        if trn.splits.is_empty() {
            issues.record(Issue::EmptySplitSet {
                transaction: trn.id.clone(),
            });
            return Vec::new();
        }
        let shown = &trn.splits[..trn.splits.len().min(MAX_ROWS_PER_TRANSACTION)];
        shown
            .iter()
            .enumerate()
            .map(|(i, split)| {
                let (date_cell, description_cell, row_span) = if i == 0 {
                    (
                        Some(trn.post_day()),
                        Some(self.description_cell(trn, split)),
                        shown.len(),
                    )
                } else {
                    (None, None, 0)
                };
                DisplayRow {
                    transaction_id: trn.id.clone(),
                    split_id: split.id.clone(),
                    date_cell,
                    description_cell,
                    account_label: split.account_label().to_string(),
                    account_type: split
                        .account
                        .as_ref()
                        .map(|a| a.account_type.to_string()),
                    amount: split.value.clone(),
                    formatted_amount: self
                        .formatter
                        .format(&split.value, trn.currency_code.as_deref()),
                    style: split.value.style(),
                    row_span,
                }
            })
            .collect()
    }

    /// Rows for a page of transactions, in order.
    pub fn table_rows(&self, trns: &[Transaction], issues: &mut Issues) -> Vec<DisplayRow> {
        trns.iter()
            .flat_map(|trn| self.to_rows(trn, issues))
            .collect()
    }

    fn description_cell(&self, trn: &Transaction, first: &Split) -> DescriptionCell {
        DescriptionCell {
            text: non_empty(&trn.description).unwrap_or_else(|| self.placeholder.clone()),
            memo: non_empty(&first.memo),
            number: non_empty(&trn.number),
        }
    }
}

/// Number of splits of `trn` that `to_rows` leaves out.
pub fn omitted_splits(trn: &Transaction) -> usize {
    trn.splits.len().saturating_sub(MAX_ROWS_PER_TRANSACTION)
}

fn non_empty(s: &Option<String>) -> Option<String> {
    s.as_ref().filter(|s| !s.is_empty()).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::account::{AccountId, AccountType};
    use crate::testutil::{split, transaction};
    use crate::transaction::SplitAccount;

    fn joined(mut s: Split, name: &str, account_type: AccountType) -> Split {
        s.account = Some(SplitAccount {
            id: s.account_id.clone(),
            name: name.to_string(),
            account_type,
        });
        s
    }

    #[test]
    fn caps_at_two_rows() {
        let formatter = CurrencyFormatter::default();
        let mut trn = transaction(
            "t1",
            "2024-03-15",
            vec![
                joined(split("a", "acct-a", -3000), "Checking", AccountType::Bank),
                split("b", "acct-b", 2000),
                split("c", "acct-c", 1000),
            ],
        );
        trn.description = Some("Groceries".to_string());
        let mut issues = Issues::new();
        let rows = SplitNormalizer::new(&formatter).to_rows(&trn, &mut issues);
        assert!(issues.is_empty());
        assert_eq!(2, rows.len());
        assert_eq!(1, omitted_splits(&trn));

        assert_eq!(
            Some(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()),
            rows[0].date_cell
        );
        assert_eq!(
            Some(DescriptionCell {
                text: "Groceries".to_string(),
                memo: None,
                number: None,
            }),
            rows[0].description_cell
        );
        assert_eq!(2, rows[0].row_span);
        assert_eq!("Checking", rows[0].account_label);
        assert_eq!(Some("BANK".to_string()), rows[0].account_type);
        assert_eq!("-$30.00", rows[0].formatted_amount);
        assert_eq!(BalanceStyle::Negative, rows[0].style);

        assert_eq!(None, rows[1].date_cell);
        assert_eq!(None, rows[1].description_cell);
        assert_eq!(0, rows[1].row_span);
        assert!(!rows[1].is_group_start());
        assert_eq!("acct-b", rows[1].account_label);
        assert_eq!(None, rows[1].account_type);
        assert_eq!("$20.00", rows[1].formatted_amount);
        assert_eq!(BalanceStyle::Positive, rows[1].style);
    }

    #[test]
    fn shows_value_not_quantity() {
        let formatter = CurrencyFormatter::default();
        let mut foreign = split("b", "acct-eur", 1100);
        foreign.quantity = RationalAmount::new(1000, 100).unwrap();
        let trn = transaction("t1", "2024-01-02", vec![split("a", "acct-usd", -1100), foreign]);
        let rows = SplitNormalizer::new(&formatter).to_rows(&trn, &mut Issues::new());
        assert_eq!(RationalAmount::new(11, 1).unwrap(), rows[1].amount);
        assert_eq!("$11.00", rows[1].formatted_amount);
    }

    #[test]
    fn uses_transaction_currency() {
        let formatter = CurrencyFormatter::default();
        let mut trn = transaction("t1", "2024-01-02", vec![split("a", "x", 150000)]);
        trn.currency_code = Some("JPY".to_string());
        let rows = SplitNormalizer::new(&formatter).to_rows(&trn, &mut Issues::new());
        assert_eq!("¥1,500", rows[0].formatted_amount);

        trn.currency_code = None;
        let rows = SplitNormalizer::new(&formatter).to_rows(&trn, &mut Issues::new());
        assert_eq!("1500.00", rows[0].formatted_amount);
    }

    #[test]
    fn single_split_spans_one_row() {
        let formatter = CurrencyFormatter::default();
        let trn = transaction("t1", "2024-01-02", vec![split("a", "x", 0)]);
        let rows = SplitNormalizer::new(&formatter).to_rows(&trn, &mut Issues::new());
        assert_eq!(1, rows.len());
        assert_eq!(1, rows[0].row_span);
        assert_eq!(BalanceStyle::Positive, rows[0].style);
        assert_eq!(0, omitted_splits(&trn));
    }

    #[test]
    fn empty_split_set() {
        let formatter = CurrencyFormatter::default();
        let trn = transaction("t-empty", "2024-01-02", vec![]);
        let mut issues = Issues::new();
        let rows = SplitNormalizer::new(&formatter).to_rows(&trn, &mut issues);
        assert!(rows.is_empty());
        assert_eq!(
            vec![Issue::EmptySplitSet {
                transaction: "t-empty".to_string()
            }],
            issues.into_vec()
        );
    }

    #[test]
    fn description_placeholder_memo_and_number() {
        let formatter = CurrencyFormatter::default();
        let mut first = split("a", "x", -500);
        first.memo = Some("lunch".to_string());
        let mut second = split("b", "y", 500);
        second.memo = Some("ignored".to_string());
        let mut trn = transaction("t1", "2024-01-02", vec![first, second]);
        trn.description = Some(String::new());
        trn.number = Some("1042".to_string());

        let rows = SplitNormalizer::new(&formatter).to_rows(&trn, &mut Issues::new());
        assert_eq!(
            Some(DescriptionCell {
                text: "(No description)".to_string(),
                memo: Some("lunch".to_string()),
                number: Some("1042".to_string()),
            }),
            rows[0].description_cell
        );
        assert_eq!("-$5.00", rows[0].formatted_amount);

        let rows = SplitNormalizer::new(&formatter)
            .with_placeholder("-")
            .to_rows(&trn, &mut Issues::new());
        assert_eq!("-", rows[0].description_cell.as_ref().unwrap().text);
    }

    #[test]
    fn table_rows_concatenate() {
        let formatter = CurrencyFormatter::default();
        let trns = vec![
            transaction("t1", "2024-01-02", vec![split("a", "x", -1), split("b", "y", 1)]),
            transaction("t2", "2024-01-03", vec![]),
            transaction("t3", "2024-01-04", vec![split("c", "x", 7)]),
        ];
        let mut issues = Issues::new();
        let rows = SplitNormalizer::new(&formatter).table_rows(&trns, &mut issues);
        let ids: Vec<(&str, usize)> = rows
            .iter()
            .map(|r| (r.split_id.as_str(), r.row_span))
            .collect();
        assert_eq!(vec![("a", 2), ("b", 0), ("c", 1)], ids);
        assert_eq!(1, issues.len());
        assert!(trns[0].touches(&AccountId::from("y")));
    }
}

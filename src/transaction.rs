use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};

use crate::account::{AccountId, AccountType};
use crate::amount::RationalAmount;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReconcileState {
    /// `n`
    New,
    /// `c`
    Cleared,
    /// `y`
    Reconciled,
    /// `f`
    Frozen,
    /// `v`
    Voided,
}

impl ReconcileState {
    /// Parses the single-letter state. Unknown letters read as `New`.
    pub fn from_flag(flag: &str) -> Self {
        use ReconcileState::*;
        match flag {
            "c" => Cleared,
            "y" => Reconciled,
            "f" => Frozen,
            "v" => Voided,
            _ => New,
        }
    }

    pub fn as_flag(self) -> &'static str {
        use ReconcileState::*;
        match self {
            New => "n",
            Cleared => "c",
            Reconciled => "y",
            Frozen => "f",
            Voided => "v",
        }
    }
}

impl fmt::Display for ReconcileState {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        f.write_str(self.as_flag())
    }
}

/// The account fields joined onto a split by the data source.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SplitAccount {
    pub id: AccountId,
    pub name: String,
    pub account_type: AccountType,
}

/// One leg of a transaction.
///
/// `value` is in the transaction's currency, `quantity` in the account's own
/// commodity.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Split {
    pub id: String,
    pub transaction_id: String,
    pub account_id: AccountId,
    pub memo: Option<String>,
    pub action: Option<String>,
    pub value: RationalAmount,
    pub quantity: RationalAmount,
    pub reconcile_state: ReconcileState,
    pub account: Option<SplitAccount>,
}

impl Split {
    /// Label for display: the joined account name, or the raw account id.
    pub fn account_label(&self) -> &str {
        self.account
            .as_ref()
            .map(|a| a.name.as_str())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| self.account_id.as_str())
    }
}

/// A read-only transaction projection.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Transaction {
    pub id: String,
    pub currency_code: Option<String>,
    pub number: Option<String>,
    pub post_date: DateTime<Utc>,
    pub enter_date: DateTime<Utc>,
    pub description: Option<String>,
    pub splits: Vec<Split>,
}

impl Transaction {
    pub fn post_day(&self) -> NaiveDate {
        self.post_date.date_naive()
    }

    /// Returns true if any split is against `account`.
    pub fn touches(&self, account: &AccountId) -> bool {
        self.splits.iter().any(|s| &s.account_id == account)
    }

    /// Exact sum of all split values. A balanced transaction sums to zero.
    pub fn value_total(&self) -> Result<RationalAmount, crate::amount::AmountError> {
        self.splits
            .iter()
            .try_fold(RationalAmount::zero(), |acc, s| acc.checked_add(&s.value))
    }
}

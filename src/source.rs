//! Where ledger data comes from.

use anyhow::{Context, Result};
use serde_derive::Deserialize;

use crate::account::{Account, AccountId};
use crate::amount::RationalAmount;
use crate::filespec::{read_json_file, FileSpec};
use crate::filter::TransactionFilter;
use crate::quality::Issues;
use crate::transaction::Transaction;
use crate::wire::{AccountPayload, TransactionPayload, TransactionsPayload};

/// One page of transactions and the number matching before paging.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransactionPage {
    pub transactions: Vec<Transaction>,
    pub total: usize,
}

/// Supplies accounts and transactions. Conversion problems are recorded in
/// `issues`; only failures to obtain the data at all are errors.
pub trait LedgerSource {
    fn accounts(&self, issues: &mut Issues) -> Result<Vec<Account>>;

    /// The page of transactions selected by `filter`, with the match count.
    fn transaction_page(
        &self,
        filter: &TransactionFilter,
        issues: &mut Issues,
    ) -> Result<TransactionPage>;

    /// The page of transactions selected by `filter`.
    fn transactions(
        &self,
        filter: &TransactionFilter,
        issues: &mut Issues,
    ) -> Result<Vec<Transaction>> {
        Ok(self.transaction_page(filter, issues)?.transactions)
    }

    /// Balance of a single account, or `None` if there is no such account.
    fn account_balance(
        &self,
        id: &AccountId,
        issues: &mut Issues,
    ) -> Result<Option<RationalAmount>> {
        Ok(find_account(&self.accounts(issues)?, id).map(|a| a.balance.clone()))
    }
}

fn find_account<'a>(accounts: &'a [Account], id: &AccountId) -> Option<&'a Account> {
    accounts.iter().find_map(|account| {
        if &account.id == id {
            Some(account)
        } else {
            find_account(&account.children, id)
        }
    })
}

/// A ledger held in memory, as exported by the ledger API.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct Snapshot {
    #[serde(default)]
    pub accounts: Vec<AccountPayload>,
    #[serde(default)]
    pub transactions: Vec<TransactionPayload>,
}

impl Snapshot {
    /// Parses a single document with `accounts` and `transactions` keys.
    pub fn from_json_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).context("parsing ledger snapshot")
    }

    pub fn from_filespec(file_spec: &FileSpec) -> Result<Self> {
        read_json_file(file_spec)
    }

    /// Reads an accounts response and a transactions response (either a bare
    /// array or a paginated envelope). Either may be left out.
    pub fn from_filespecs(
        accounts: Option<&FileSpec>,
        transactions: Option<&FileSpec>,
    ) -> Result<Self> {
        let accounts: Vec<AccountPayload> = match accounts {
            Some(spec) => read_json_file(spec)?,
            None => Vec::new(),
        };
        let transactions = match transactions {
            Some(spec) => read_json_file::<TransactionsPayload>(spec)?.into_vec(),
            None => Vec::new(),
        };
        Ok(Self {
            accounts,
            transactions,
        })
    }

    fn all_transactions(&self, issues: &mut Issues) -> Vec<Transaction> {
        self.transactions
            .iter()
            .cloned()
            .map(|payload| payload.into_transaction(issues))
            .collect()
    }
}

impl LedgerSource for Snapshot {
    fn accounts(&self, issues: &mut Issues) -> Result<Vec<Account>> {
        Ok(self
            .accounts
            .iter()
            .cloned()
            .map(|payload| payload.into_account(issues))
            .collect())
    }

    fn transaction_page(
        &self,
        filter: &TransactionFilter,
        issues: &mut Issues,
    ) -> Result<TransactionPage> {
        let all = self.all_transactions(issues);
        let total = filter.count(&all);
        Ok(TransactionPage {
            transactions: filter.apply(all),
            total,
        })
    }
}

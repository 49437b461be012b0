//! Payload shapes delivered by the ledger API, and their conversion into
//! domain types.
//!
//! Numeric fields arrive as a `{*_num, *_denom}` pair plus a decimal-string
//! convenience field. The pair is authoritative; the string is only read when
//! the pair is missing. Absent amounts are zero. Amounts that cannot be read
//! also become zero and are recorded as `Issue::MalformedAmount`.

use chrono::{DateTime, Utc};
use serde_derive::{Deserialize, Serialize};

use crate::account::{Account, AccountId, AccountType};
use crate::amount::{AmountError, RationalAmount, DEFAULT_PRECISION};
use crate::currency::commodity_info;
use crate::quality::{Issue, Issues};
use crate::transaction::{ReconcileState, Split, SplitAccount, Transaction};

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct AccountPayload {
    pub guid: String,
    pub name: String,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub placeholder: bool,
    #[serde(default)]
    pub parent_guid: Option<String>,
    #[serde(default)]
    pub balance: Option<String>,
    #[serde(default)]
    pub balance_num: Option<i64>,
    #[serde(default)]
    pub balance_denom: Option<i64>,
    #[serde(default)]
    pub commodity_mnemonic: Option<String>,
    #[serde(default)]
    pub children: Vec<AccountPayload>,
}

impl AccountPayload {
    pub fn into_account(self, issues: &mut Issues) -> Account {
        let commodity_code = self.commodity_mnemonic.filter(|c| !c.is_empty());
        let balance = read_amount(
            self.balance_num,
            self.balance_denom,
            self.balance.as_deref(),
            precision_for(commodity_code.as_deref()),
            || format!("balance of account {}", self.guid),
            issues,
        );
        Account {
            id: AccountId(self.guid),
            name: self.name,
            account_type: self.account_type,
            code: self.code.filter(|c| !c.is_empty()),
            description: self.description,
            hidden: self.hidden,
            placeholder: self.placeholder,
            parent_id: self.parent_guid.map(AccountId),
            balance,
            commodity_code,
            children: self
                .children
                .into_iter()
                .map(|child| child.into_account(issues))
                .collect(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct AccountSummaryPayload {
    pub guid: String,
    pub name: String,
    #[serde(rename = "type")]
    pub account_type: AccountType,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SplitPayload {
    pub guid: String,
    #[serde(default)]
    pub tx_guid: String,
    pub account_guid: String,
    #[serde(default)]
    pub memo: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub reconcile_state: String,
    #[serde(default)]
    pub value_num: Option<i64>,
    #[serde(default)]
    pub value_denom: Option<i64>,
    #[serde(default)]
    pub quantity_num: Option<i64>,
    #[serde(default)]
    pub quantity_denom: Option<i64>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub quantity: Option<String>,
    #[serde(default)]
    pub account: Option<AccountSummaryPayload>,
}

impl SplitPayload {
    /// `value_precision` is the display precision of the transaction's
    /// currency.
    pub fn into_split(self, value_precision: u32, issues: &mut Issues) -> Split {
        let guid = &self.guid;
        let value = read_amount(
            self.value_num,
            self.value_denom,
            self.value.as_deref(),
            value_precision,
            || format!("value of split {}", guid),
            issues,
        );
        let quantity = read_amount(
            self.quantity_num,
            self.quantity_denom,
            self.quantity.as_deref(),
            DEFAULT_PRECISION,
            || format!("quantity of split {}", guid),
            issues,
        );
        Split {
            id: self.guid,
            transaction_id: self.tx_guid,
            account_id: AccountId(self.account_guid),
            memo: self.memo,
            action: self.action,
            value,
            quantity,
            reconcile_state: ReconcileState::from_flag(&self.reconcile_state),
            account: self.account.map(|a| SplitAccount {
                id: AccountId(a.guid),
                name: a.name,
                account_type: a.account_type,
            }),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct TransactionPayload {
    pub guid: String,
    #[serde(default)]
    pub currency_guid: Option<String>,
    #[serde(default)]
    pub currency_mnemonic: Option<String>,
    #[serde(default)]
    pub num: Option<String>,
    pub post_date: DateTime<Utc>,
    pub enter_date: DateTime<Utc>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub splits: Vec<SplitPayload>,
}

impl TransactionPayload {
    pub fn into_transaction(self, issues: &mut Issues) -> Transaction {
        let currency_code = self.currency_mnemonic.filter(|c| !c.is_empty());
        let precision = precision_for(currency_code.as_deref());
        Transaction {
            id: self.guid,
            currency_code,
            number: self.num,
            post_date: self.post_date,
            enter_date: self.enter_date,
            description: self.description,
            splits: self
                .splits
                .into_iter()
                .map(|s| s.into_split(precision, issues))
                .collect(),
        }
    }
}

/// A transactions response: either a bare array or a paginated envelope.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum TransactionsPayload {
    List(Vec<TransactionPayload>),
    Page {
        transactions: Vec<TransactionPayload>,
        #[serde(default)]
        total: Option<i64>,
        #[serde(default)]
        limit: Option<i64>,
        #[serde(default)]
        offset: Option<i64>,
    },
}

impl TransactionsPayload {
    pub fn into_vec(self) -> Vec<TransactionPayload> {
        match self {
            TransactionsPayload::List(trns) => trns,
            TransactionsPayload::Page { transactions, .. } => transactions,
        }
    }
}

/// Display precision of a commodity's decimal view.
fn precision_for(code: Option<&str>) -> u32 {
    code.and_then(commodity_info)
        .map(|info| info.minor_units)
        .unwrap_or(DEFAULT_PRECISION)
}

fn read_amount<F>(
    num: Option<i64>,
    denom: Option<i64>,
    decimal: Option<&str>,
    precision: u32,
    context: F,
    issues: &mut Issues,
) -> RationalAmount
where
    F: FnOnce() -> String,
{
    let result = match (num, denom, decimal) {
        (Some(num), Some(denom), _) => RationalAmount::with_precision(num, denom, precision),
        (_, _, Some(s)) => RationalAmount::from_decimal_str(s).and_then(|a| {
            RationalAmount::with_precision(a.numerator(), a.denominator(), precision)
        }),
        (Some(_), None, None) => Err(AmountError::MissingDenominator),
        (None, Some(_), None) => Err(AmountError::MissingNumerator),
        (None, None, None) => RationalAmount::with_precision(0, 1, precision),
    };
    result.unwrap_or_else(|e| {
        issues.record(Issue::MalformedAmount {
            context: context(),
            reason: e.to_string(),
        });
        RationalAmount::zero()
    })
}

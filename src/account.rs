use std::fmt;

use serde_derive::{Deserialize, Serialize};

use crate::amount::RationalAmount;

/// Opaque account identifier (a GUID in practice).
#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct AccountId(pub String);

impl AccountId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for AccountId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(from = "String", into = "String")]
pub enum AccountType {
    Root,
    Asset,
    Bank,
    Cash,
    Credit,
    Liability,
    Stock,
    Mutual,
    Currency,
    Income,
    Expense,
    Equity,
    Receivable,
    Payable,
    /// Any type name not in the list above, kept verbatim.
    Other(String),
}

impl AccountType {
    pub fn as_str(&self) -> &str {
        use AccountType::*;
        match self {
            Root => "ROOT",
            Asset => "ASSET",
            Bank => "BANK",
            Cash => "CASH",
            Credit => "CREDIT",
            Liability => "LIABILITY",
            Stock => "STOCK",
            Mutual => "MUTUAL",
            Currency => "CURRENCY",
            Income => "INCOME",
            Expense => "EXPENSE",
            Equity => "EQUITY",
            Receivable => "RECEIVABLE",
            Payable => "PAYABLE",
            Other(s) => s,
        }
    }

    /// Returns true if the account increases with debits.
    pub fn is_debit_account(&self) -> bool {
        use AccountType::*;
        matches!(
            self,
            Asset | Bank | Cash | Stock | Mutual | Receivable | Expense
        )
    }

    /// Account types counted as assets in a net-worth summary.
    pub fn is_net_worth_asset(&self) -> bool {
        use AccountType::*;
        matches!(self, Bank | Cash | Asset | Stock | Mutual)
    }

    /// Account types counted as liabilities in a net-worth summary.
    pub fn is_net_worth_liability(&self) -> bool {
        use AccountType::*;
        matches!(self, Liability | Credit | Payable)
    }
}

impl From<String> for AccountType {
    fn from(s: String) -> Self {
        use AccountType::*;
        match s.as_str() {
            "ROOT" => Root,
            "ASSET" => Asset,
            "BANK" => Bank,
            "CASH" => Cash,
            "CREDIT" => Credit,
            "LIABILITY" => Liability,
            "STOCK" => Stock,
            "MUTUAL" => Mutual,
            "CURRENCY" => Currency,
            "INCOME" => Income,
            "EXPENSE" => Expense,
            "EQUITY" => Equity,
            "RECEIVABLE" => Receivable,
            "PAYABLE" => Payable,
            _ => Other(s),
        }
    }
}

impl From<AccountType> for String {
    fn from(t: AccountType) -> Self {
        match t {
            AccountType::Other(s) => s,
            t => t.as_str().to_string(),
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        f.write_str(self.as_str())
    }
}

/// An account in the chart of accounts.
///
/// `children` is only populated when the account comes from an already-nested
/// payload or from `AccountTree::into_nested`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub account_type: AccountType,
    pub code: Option<String>,
    pub description: Option<String>,
    pub hidden: bool,
    pub placeholder: bool,
    pub parent_id: Option<AccountId>,
    pub balance: RationalAmount,
    pub commodity_code: Option<String>,
    pub children: Vec<Account>,
}

impl Account {
    /// Creates a visible, non-placeholder account with a zero balance.
    pub fn new<I: Into<AccountId>, S: Into<String>>(
        id: I,
        name: S,
        account_type: AccountType,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            account_type,
            code: None,
            description: None,
            hidden: false,
            placeholder: false,
            parent_id: None,
            balance: RationalAmount::zero(),
            commodity_code: None,
            children: Vec::new(),
        }
    }

    pub fn with_parent<I: Into<AccountId>>(mut self, parent_id: I) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_balance(mut self, balance: RationalAmount) -> Self {
        self.balance = balance;
        self
    }

    pub fn with_commodity<S: Into<String>>(mut self, code: S) -> Self {
        self.commodity_code = Some(code.into());
        self
    }

    pub fn with_child(mut self, child: Account) -> Self {
        self.children.push(child);
        self
    }

    /// The parent id, with an empty id treated as absent.
    pub fn parent(&self) -> Option<&AccountId> {
        self.parent_id.as_ref().filter(|id| !id.0.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_case::test_case;

    #[test_case("BANK" => AccountType::Bank; "known")]
    #[test_case("TRADING" => AccountType::Other("TRADING".to_string()); "unknown")]
    fn account_type_from_string(s: &str) -> AccountType {
        let t = AccountType::from(s.to_string());
        assert_eq!(s, t.as_str());
        t
    }

    #[test_case(AccountType::Asset => true)]
    #[test_case(AccountType::Bank => true)]
    #[test_case(AccountType::Expense => true)]
    #[test_case(AccountType::Receivable => true)]
    #[test_case(AccountType::Liability => false)]
    #[test_case(AccountType::Income => false)]
    #[test_case(AccountType::Equity => false)]
    #[test_case(AccountType::Other("TRADING".to_string()) => false)]
    fn is_debit_account(t: AccountType) -> bool {
        t.is_debit_account()
    }

    #[test]
    fn empty_parent_is_root() {
        let account = Account::new("a", "A", AccountType::Asset).with_parent("");
        assert_eq!(None, account.parent());
        let account = Account::new("a", "A", AccountType::Asset).with_parent("p");
        assert_eq!(Some(&AccountId::from("p")), account.parent());
    }
}

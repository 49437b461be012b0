//! Summaries over the chart of accounts: net worth, and income against
//! expenses over a date range.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};

use crate::account::{Account, AccountId, AccountType};
use crate::amount::{AmountError, RationalAmount};
use crate::transaction::Transaction;
use crate::tree::AccountTree;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NetWorthItem {
    pub account_id: AccountId,
    pub name: String,
    pub account_type: AccountType,
    pub balance: RationalAmount,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NetWorth {
    pub assets: Vec<NetWorthItem>,
    /// Balances are absolute values.
    pub liabilities: Vec<NetWorthItem>,
    pub total_assets: RationalAmount,
    pub total_liabilities: RationalAmount,
    pub net_worth: RationalAmount,
    /// Commodity of the first ROOT account, if any.
    pub currency_code: Option<String>,
}

impl NetWorth {
    /// Sums each account's own balance, in tree order. Placeholder accounts
    /// and zero balances are skipped.
    pub fn from_tree(tree: &AccountTree) -> Result<Self, AmountError> {
        let mut assets = Vec::new();
        let mut liabilities = Vec::new();
        let mut total_assets = RationalAmount::zero();
        let mut total_liabilities = RationalAmount::zero();

        for idx in tree.walk() {
            let account = tree.get(idx).account();
            if account.placeholder || account.balance.is_zero() {
                continue;
            }
            let item = |balance: RationalAmount| NetWorthItem {
                account_id: account.id.clone(),
                name: account.name.clone(),
                account_type: account.account_type.clone(),
                balance,
            };
            if account.account_type.is_net_worth_asset() {
                total_assets = total_assets.checked_add(&account.balance)?;
                assets.push(item(account.balance.clone()));
            } else if account.account_type.is_net_worth_liability() {
                let balance = account.balance.abs()?;
                total_liabilities = total_liabilities.checked_add(&balance)?;
                liabilities.push(item(balance));
            }
        }

        let net_worth = total_assets.checked_add(&total_liabilities.checked_neg()?)?;
        Ok(Self {
            assets,
            liabilities,
            total_assets,
            total_liabilities,
            net_worth,
            currency_code: root_currency(tree),
        })
    }
}

/// Commodity of the first ROOT account that has one.
fn root_currency(tree: &AccountTree) -> Option<String> {
    tree.walk()
        .into_iter()
        .map(|idx| tree.get(idx).account())
        .filter(|account| account.account_type == AccountType::Root)
        .find_map(|account| account.commodity_code.clone())
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Flow {
    Income,
    Expense,
}

/// INCOME and EXPENSE accounts in tree order.
fn flow_accounts(tree: &AccountTree) -> Vec<(Flow, &Account)> {
    tree.walk()
        .into_iter()
        .map(|idx| tree.get(idx).account())
        .filter_map(|account| match account.account_type {
            AccountType::Income => Some((Flow::Income, account)),
            AccountType::Expense => Some((Flow::Expense, account)),
            _ => None,
        })
        .collect()
}

/// Income and expense of one calendar month.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PeriodTotals {
    /// `YYYY-MM`
    pub period: String,
    pub income: RationalAmount,
    pub expense: RationalAmount,
    /// `income - expense`
    pub net: RationalAmount,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IncomeExpense {
    pub periods: Vec<PeriodTotals>,
    pub total_income: RationalAmount,
    pub total_expense: RationalAmount,
    pub net_total: RationalAmount,
    /// Commodity of the first ROOT account, if any.
    pub currency_code: Option<String>,
}

impl IncomeExpense {
    /// Totals per calendar month, from the month of `start` through the month
    /// of `end`. Whole months are counted even when `start` or `end` falls
    /// mid-month. Every split against an INCOME or EXPENSE account adds its
    /// absolute value to that side; other splits are ignored.
    pub fn from_ledger(
        tree: &AccountTree,
        trns: &[Transaction],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Self, AmountError> {
        let mut months = Vec::new();
        let (mut year, mut month) = (start.year(), start.month());
        while (year, month) <= (end.year(), end.month()) {
            months.push((year, month));
            if month == 12 {
                year += 1;
                month = 1;
            } else {
                month += 1;
            }
        }

        let mut flows = HashMap::new();
        for (flow, account) in flow_accounts(tree) {
            flows.entry(&account.id).or_insert(flow);
        }

        let mut sums = vec![(RationalAmount::zero(), RationalAmount::zero()); months.len()];
        for trn in trns {
            let day = trn.post_day();
            let slot = match months.binary_search(&(day.year(), day.month())) {
                Ok(slot) => slot,
                Err(_) => continue,
            };
            let (income, expense) = &mut sums[slot];
            for split in &trn.splits {
                match flows.get(&split.account_id) {
                    Some(Flow::Income) => *income = income.checked_add(&split.value.abs()?)?,
                    Some(Flow::Expense) => *expense = expense.checked_add(&split.value.abs()?)?,
                    None => {}
                }
            }
        }

        let mut periods = Vec::with_capacity(months.len());
        let mut total_income = RationalAmount::zero();
        let mut total_expense = RationalAmount::zero();
        for ((year, month), (income, expense)) in months.into_iter().zip(sums) {
            total_income = total_income.checked_add(&income)?;
            total_expense = total_expense.checked_add(&expense)?;
            periods.push(PeriodTotals {
                period: format!("{:04}-{:02}", year, month),
                net: income.checked_add(&expense.checked_neg()?)?,
                income,
                expense,
            });
        }
        let net_total = total_income.checked_add(&total_expense.checked_neg()?)?;
        Ok(Self {
            periods,
            total_income,
            total_expense,
            net_total,
            currency_code: root_currency(tree),
        })
    }
}

/// One INCOME or EXPENSE account's share of a date range.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CategoryItem {
    pub account_id: AccountId,
    pub name: String,
    /// Sum of absolute split values.
    pub amount: RationalAmount,
    /// Number of splits counted.
    pub count: usize,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CategoryBreakdown {
    pub income: Vec<CategoryItem>,
    pub expense: Vec<CategoryItem>,
    /// Commodity of the first ROOT account, if any.
    pub currency_code: Option<String>,
}

impl CategoryBreakdown {
    /// Per-account totals of the splits posted from `start` to `end`, both
    /// inclusive. Accounts without splits in the range are left out. Each
    /// side is ordered by amount, largest first, ties in tree order.
    pub fn from_ledger(
        tree: &AccountTree,
        trns: &[Transaction],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Self, AmountError> {
        let mut items = Vec::new();
        let mut positions = HashMap::new();
        for (flow, account) in flow_accounts(tree) {
            positions.entry(&account.id).or_insert(items.len());
            items.push((
                flow,
                CategoryItem {
                    account_id: account.id.clone(),
                    name: account.name.clone(),
                    amount: RationalAmount::zero(),
                    count: 0,
                },
            ));
        }

        for trn in trns {
            let day = trn.post_day();
            if day < start || day > end {
                continue;
            }
            for split in &trn.splits {
                if let Some(&pos) = positions.get(&split.account_id) {
                    let item = &mut items[pos].1;
                    item.amount = item.amount.checked_add(&split.value.abs()?)?;
                    item.count += 1;
                }
            }
        }

        let mut income = Vec::new();
        let mut expense = Vec::new();
        for (flow, item) in items.into_iter().filter(|(_, item)| item.count > 0) {
            match flow {
                Flow::Income => income.push(item),
                Flow::Expense => expense.push(item),
            }
        }
        income.sort_by(|a, b| b.amount.cmp(&a.amount));
        expense.sort_by(|a, b| b.amount.cmp(&a.amount));
        Ok(Self {
            income,
            expense,
            currency_code: root_currency(tree),
        })
    }
}

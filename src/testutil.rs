use std::io::Write;

use chrono::{NaiveDate, TimeZone, Utc};
use goldenfile::Mint;

use crate::account::{Account, AccountType};
use crate::amount::RationalAmount;
use crate::quality::Issues;
use crate::transaction::{ReconcileState, Split, Transaction};
use crate::tree::AccountTree;

/// An asset account named after its id.
pub fn account(id: &str, parent: Option<&str>) -> Account {
    let account = Account::new(id, id.to_uppercase(), AccountType::Asset);
    match parent {
        Some(p) => account.with_parent(p),
        None => account,
    }
}

/// A split whose value and quantity are both `cents / 100`.
pub fn split(id: &str, account_id: &str, cents: i64) -> Split {
    let amount = RationalAmount::new(cents, 100).expect("valid amount");
    Split {
        id: id.to_string(),
        transaction_id: String::new(),
        account_id: account_id.into(),
        memo: None,
        action: None,
        value: amount.clone(),
        quantity: amount,
        reconcile_state: ReconcileState::New,
        account: None,
    }
}

/// A USD transaction posted and entered at midnight UTC on `date`
/// (`YYYY-MM-DD`).
pub fn transaction(id: &str, date: &str, splits: Vec<Split>) -> Transaction {
    let day: NaiveDate = date.parse().expect("test date did not parse");
    let at = Utc.from_utc_datetime(&day.and_hms_opt(0, 0, 0).expect("midnight"));
    Transaction {
        id: id.to_string(),
        currency_code: Some("USD".to_string()),
        number: None,
        post_date: at,
        enter_date: at,
        description: None,
        splits: splits
            .into_iter()
            .map(|mut s| {
                s.transaction_id = id.to_string();
                s
            })
            .collect(),
    }
}

/// A USD ledger with salary, food and rent flows between December 2023 and
/// March 2024.
pub fn flow_ledger() -> (AccountTree, Vec<Transaction>) {
    let accounts = vec![
        Account::new("root", "Root", AccountType::Root).with_commodity("USD"),
        Account::new("checking", "Checking", AccountType::Bank).with_parent("root"),
        Account::new("salary", "Salary", AccountType::Income).with_parent("root"),
        Account::new("gifts", "Gifts", AccountType::Income).with_parent("root"),
        Account::new("food", "Food", AccountType::Expense).with_parent("root"),
        Account::new("rent", "Rent", AccountType::Expense).with_parent("root"),
    ];
    let tree = AccountTree::build(accounts, &mut Issues::new());
    let spend = |id: &str, date: &str, account: &str, cents: i64| {
        transaction(
            id,
            date,
            vec![
                split(&format!("{}-a", id), "checking", -cents),
                split(&format!("{}-b", id), account, cents),
            ],
        )
    };
    let trns = vec![
        spend("t1", "2023-12-31", "food", 9900),
        spend("t2", "2024-01-05", "salary", -300000),
        spend("t3", "2024-01-10", "food", 4550),
        spend("t4", "2024-02-01", "rent", 120000),
        spend("t5", "2024-02-15", "food", 2000),
        // A refund still counts towards the expense side.
        spend("t6", "2024-02-20", "food", -500),
        spend("t7", "2024-03-03", "salary", -300000),
    ];
    (tree, trns)
}

pub fn dedent(s: &str) -> String {
    textwrap::dedent(s).trim_start().to_string()
}

/// Checks `content` against the golden file `testdata/render/<name>`.
pub fn golden_render(name: &str, content: &str) {
    let mut mint = Mint::new("testdata/render");
    let differ = Box::new(goldenfile::differs::text_diff);
    let mut out = mint
        .new_goldenfile_with_differ(name, differ)
        .expect("new goldenfile");
    out.write_all(content.as_bytes()).expect("write output");
}

#[macro_export]
macro_rules! assert_text_eq {
    ($want:expr, $got:expr, $($context_arg:expr),*) => {
        let want_str: &str = &$want;
        let got_str: &str = &$got;
        if want_str != got_str {
            eprintln!($($context_arg,)*);
            text_diff::assert_diff(want_str, got_str, "\n", 0);
        }
    };
    ($want:expr, $got:expr) => {
        let want_str: &str = &$want;
        let got_str: &str = &$got;
        if want_str != got_str {
            text_diff::assert_diff(want_str, got_str, "\n", 0);
        }
    };
}

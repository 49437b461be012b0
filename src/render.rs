//! Plain-text views of the derived presentation data.

use crate::amount::RationalAmount;
use crate::currency::CurrencyFormatter;
use crate::normalize::{omitted_splits, DisplayRow, SplitNormalizer};
use crate::quality::Issues;
use crate::summary::{CategoryBreakdown, CategoryItem, IncomeExpense, NetWorth, NetWorthItem};
use crate::transaction::Transaction;
use crate::tree::{AccountTree, ExpansionState, Toggle};

const TYPE_WIDTH: usize = 10;
const AMOUNT_WIDTH: usize = 14;
const DATE_WIDTH: usize = 10;
const DESCRIPTION_WIDTH: usize = 30;
const ACCOUNT_WIDTH: usize = 24;
const LABEL_WIDTH: usize = 30;
const PERIOD_WIDTH: usize = 7;
const COUNT_WIDTH: usize = 5;

/// One line per visible account: indented name with its expand marker, type,
/// own balance in the account's commodity, and a note for accounts whose
/// parent reference was dropped.
pub fn account_tree(
    tree: &AccountTree,
    state: &ExpansionState,
    formatter: &CurrencyFormatter,
) -> String {
    let rows = tree.visible_rows(state);
    let labels: Vec<String> = rows
        .iter()
        .map(|row| {
            let account = tree.get(row.index).account();
            let marker = match row.toggle {
                Toggle::Expanded => "▼ ",
                Toggle::Collapsed => "▶ ",
                Toggle::Leaf => "  ",
            };
            let mut label = format!("{}{}{}", "  ".repeat(row.depth), marker, account.name);
            if let Some(code) = &account.code {
                label.push_str(&format!(" ({})", code));
            }
            label
        })
        .collect();
    let width = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);

    let mut out = String::new();
    for (row, label) in rows.iter().zip(labels) {
        let node = tree.get(row.index);
        let account = node.account();
        let balance = formatter.format(&account.balance, account.commodity_code.as_deref());
        let mut line = format!(
            "{:<width$}  {:<type_width$}  {:>amount_width$}",
            label,
            account.account_type.as_str(),
            balance,
            width = width,
            type_width = TYPE_WIDTH,
            amount_width = AMOUNT_WIDTH,
        );
        if let Some(kind) = node.flag() {
            line.push_str(&format!("  [{}]", kind));
        }
        push_line(&mut out, &line);
    }
    out
}

/// A table of transactions as normalized by `normalizer`. Transactions with
/// splits beyond the displayed ones get a note saying how many were left out.
pub fn transaction_table(
    trns: &[Transaction],
    normalizer: &SplitNormalizer,
    issues: &mut Issues,
) -> String {
    let mut out = String::new();
    push_line(
        &mut out,
        &table_line("Date", "Description", "Account", "Amount"),
    );
    push_line(
        &mut out,
        &table_line(
            &"-".repeat(DATE_WIDTH),
            &"-".repeat(DESCRIPTION_WIDTH),
            &"-".repeat(ACCOUNT_WIDTH),
            &"-".repeat(AMOUNT_WIDTH),
        ),
    );
    for trn in trns {
        for row in normalizer.to_rows(trn, issues) {
            push_line(&mut out, &display_row_line(&row));
        }
        let omitted = omitted_splits(trn);
        if omitted > 0 {
            let note = format!(
                "(+{} more split{})",
                omitted,
                if omitted == 1 { "" } else { "s" }
            );
            push_line(&mut out, &table_line("", "", &note, ""));
        }
    }
    out
}

fn display_row_line(row: &DisplayRow) -> String {
    let date = row
        .date_cell
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default();
    let description = row
        .description_cell
        .as_ref()
        .map(|cell| {
            let number = cell.number.as_ref().map(|n| format!("#{}", n));
            let memo = cell.memo.as_ref().map(|m| format!("({})", m));
            itertools::join(
                std::iter::once(cell.text.clone())
                    .chain(number)
                    .chain(memo),
                " ",
            )
        })
        .unwrap_or_default();
    table_line(
        &date,
        &truncate(&description, DESCRIPTION_WIDTH),
        &truncate(&row.account_label, ACCOUNT_WIDTH),
        &row.formatted_amount,
    )
}

fn table_line(date: &str, description: &str, account: &str, amount: &str) -> String {
    format!(
        "{:<date_width$}  {:<description_width$}  {:<account_width$}  {:>amount_width$}",
        date,
        description,
        account,
        amount,
        date_width = DATE_WIDTH,
        description_width = DESCRIPTION_WIDTH,
        account_width = ACCOUNT_WIDTH,
        amount_width = AMOUNT_WIDTH,
    )
}

/// Assets and liabilities with their totals and the resulting net worth, in
/// the currency of the root account.
pub fn net_worth(summary: &NetWorth, formatter: &CurrencyFormatter) -> String {
    let code = summary.currency_code.as_deref();
    let amount_line = |label: &str, amount: &RationalAmount| {
        format!(
            "{:<label_width$}  {:>amount_width$}",
            label,
            formatter.format(amount, code),
            label_width = LABEL_WIDTH,
            amount_width = AMOUNT_WIDTH,
        )
    };
    let section = |out: &mut String, title: &str, items: &[NetWorthItem], total: &RationalAmount| {
        push_line(out, title);
        for item in items {
            push_line(
                out,
                &amount_line(
                    &format!("  {}", truncate(&item.name, LABEL_WIDTH - 2)),
                    &item.balance,
                ),
            );
        }
        push_line(out, &amount_line(&format!("Total {}", title.to_lowercase()), total));
    };

    let mut out = String::new();
    section(
        &mut out,
        "Assets",
        &summary.assets,
        &summary.total_assets,
    );
    section(
        &mut out,
        "Liabilities",
        &summary.liabilities,
        &summary.total_liabilities,
    );
    push_line(&mut out, &amount_line("Net worth", &summary.net_worth));
    out
}

/// Income, expense and net per month, followed by the totals.
pub fn income_expense(report: &IncomeExpense, formatter: &CurrencyFormatter) -> String {
    let code = report.currency_code.as_deref();
    let line = |period: &str, income: &str, expense: &str, net: &str| {
        format!(
            "{:<period_width$}  {:>amount_width$}  {:>amount_width$}  {:>amount_width$}",
            period,
            income,
            expense,
            net,
            period_width = PERIOD_WIDTH,
            amount_width = AMOUNT_WIDTH,
        )
    };
    let amounts_line = |period: &str,
                        income: &RationalAmount,
                        expense: &RationalAmount,
                        net: &RationalAmount| {
        line(
            period,
            &formatter.format(income, code),
            &formatter.format(expense, code),
            &formatter.format(net, code),
        )
    };
    let rule = "-".repeat(AMOUNT_WIDTH);
    let separator = line(&"-".repeat(PERIOD_WIDTH), &rule, &rule, &rule);

    let mut out = String::new();
    push_line(&mut out, &line("Period", "Income", "Expenses", "Net"));
    push_line(&mut out, &separator);
    for p in &report.periods {
        push_line(
            &mut out,
            &amounts_line(&p.period, &p.income, &p.expense, &p.net),
        );
    }
    push_line(&mut out, &separator);
    push_line(
        &mut out,
        &amounts_line(
            "Total",
            &report.total_income,
            &report.total_expense,
            &report.net_total,
        ),
    );
    out
}

/// Per-account income and expense totals with the number of splits behind
/// each.
pub fn category_breakdown(breakdown: &CategoryBreakdown, formatter: &CurrencyFormatter) -> String {
    let code = breakdown.currency_code.as_deref();
    let section = |out: &mut String, title: &str, items: &[CategoryItem]| {
        push_line(out, title);
        if items.is_empty() {
            push_line(out, "  (none)");
        }
        for item in items {
            push_line(
                out,
                &format!(
                    "{:<label_width$}  {:>amount_width$}  {:>count_width$}",
                    format!("  {}", truncate(&item.name, LABEL_WIDTH - 2)),
                    formatter.format(&item.amount, code),
                    item.count,
                    label_width = LABEL_WIDTH,
                    amount_width = AMOUNT_WIDTH,
                    count_width = COUNT_WIDTH,
                ),
            );
        }
    };

    let mut out = String::new();
    section(&mut out, "Income", &breakdown.income);
    section(&mut out, "Expenses", &breakdown.expense);
    out
}

/// Shortens `s` to at most `width` characters, marking the cut with `…`.
fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let kept: String = s.chars().take(width.saturating_sub(1)).collect();
    format!("{}…", kept.trim_end())
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line.trim_end());
    out.push('\n');
}

//! Data-quality issues found while deriving views from fetched ledger data.
//!
//! None of these are fatal: each operation that detects one recovers locally
//! (zero amount, fallback formatting, demoted account, omitted rows) and
//! records the issue so that the view can flag it.

use std::fmt;

use thiserror::Error;

use crate::account::AccountId;

/// Why an account's parent reference could not be followed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReferenceKind {
    /// The parent id is not present in the input set.
    Orphan,
    /// The parent id is the account's own id.
    SelfReference,
    /// Following parent ids leads back to the account.
    Cycle,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        use ReferenceKind::*;
        f.write_str(match self {
            Orphan => "unknown parent",
            SelfReference => "self-referential parent",
            Cycle => "cyclic parent chain",
        })
    }
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Issue {
    #[error("malformed amount in {context}: {reason}")]
    MalformedAmount { context: String, reason: String },
    #[error("unsupported currency code {code:?}, using plain decimal formatting")]
    UnsupportedCurrencyCode { code: String },
    #[error("account {account} has {kind} {parent}, treating it as a root")]
    OrphanOrCyclicAccountReference {
        account: AccountId,
        parent: AccountId,
        kind: ReferenceKind,
    },
    #[error("transaction {transaction} has no splits")]
    EmptySplitSet { transaction: String },
}

/// Caller-owned collector of `Issue`s.
#[derive(Debug, Default)]
pub struct Issues(Vec<Issue>);

impl Issues {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Stores `issue` and emits it as a warning.
    pub fn record(&mut self, issue: Issue) {
        log::warn!("{}", issue);
        self.0.push(issue);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Issue> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<Issue> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_display() {
        let issue = Issue::OrphanOrCyclicAccountReference {
            account: AccountId::from("a"),
            parent: AccountId::from("b"),
            kind: ReferenceKind::Orphan,
        };
        assert_eq!(
            "account a has unknown parent b, treating it as a root",
            issue.to_string()
        );
    }

    #[test]
    fn records_in_order() {
        let mut issues = Issues::new();
        assert!(issues.is_empty());
        issues.record(Issue::EmptySplitSet {
            transaction: "t1".to_string(),
        });
        issues.record(Issue::UnsupportedCurrencyCode {
            code: "ZZZ".to_string(),
        });
        assert_eq!(2, issues.len());
        assert_eq!(
            vec![
                Issue::EmptySplitSet {
                    transaction: "t1".to_string()
                },
                Issue::UnsupportedCurrencyCode {
                    code: "ZZZ".to_string()
                },
            ],
            issues.into_vec()
        );
    }
}

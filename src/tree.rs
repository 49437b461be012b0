//! Account hierarchy assembled from a flat (or already nested) account list.
//!
//! Accounts are held in an arena and linked by indices. Expand/collapse state
//! for views is kept separately in `ExpansionState`.

use std::collections::{HashMap, HashSet};

use typed_generational_arena::{StandardArena, StandardIndex};

use crate::account::{Account, AccountId};
use crate::amount::{AmountError, RationalAmount};
use crate::quality::{Issue, Issues, ReferenceKind};

const BAD_NODE_INDEX: &str = "internal error: used invalid tree::Index";

pub type Arena = StandardArena<Node>;
pub type Index = StandardIndex<Node>;

pub struct Node {
    account: Account,
    parent: Option<Index>,
    children: Vec<Index>,
    depth: usize,
    flag: Option<ReferenceKind>,
}

impl Node {
    /// The account, with its `children` field left empty.
    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn parent(&self) -> Option<Index> {
        self.parent
    }

    pub fn children(&self) -> &[Index] {
        &self.children
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Distance from the root; roots are at depth 0.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Set when the account's parent reference was dropped during assembly.
    pub fn flag(&self) -> Option<ReferenceKind> {
        self.flag
    }
}

pub struct AccountTree {
    arena: Arena,
    roots: Vec<Index>,
    by_id: HashMap<AccountId, Index>,
    len: usize,
    prebuilt: bool,
}

impl AccountTree {
    /// Builds the hierarchy.
    ///
    /// If any input account already carries children, the input is taken as
    /// pre-built and its nesting is kept as-is. Otherwise accounts are linked
    /// through `parent_id`; children keep their input order. Accounts whose
    /// parent is unknown, themselves, or part of a cycle become roots and are
    /// recorded in `issues`.
    pub fn build(accounts: Vec<Account>, issues: &mut Issues) -> Self {
        if accounts.iter().any(|a| !a.children.is_empty()) {
            log::debug!("account list is pre-nested, keeping its structure");
            Self::from_nested(accounts)
        } else {
            Self::assemble(accounts, issues)
        }
    }

    fn empty(prebuilt: bool) -> Self {
        Self {
            arena: Arena::new(),
            roots: Vec::new(),
            by_id: HashMap::new(),
            len: 0,
            prebuilt,
        }
    }

    fn assemble(accounts: Vec<Account>, issues: &mut Issues) -> Self {
        let mut position_by_id = HashMap::<&AccountId, usize>::with_capacity(accounts.len());
        for (i, account) in accounts.iter().enumerate() {
            position_by_id.entry(&account.id).or_insert(i);
        }

        let mut flags: Vec<Option<ReferenceKind>> = vec![None; accounts.len()];
        let mut parents: Vec<Option<usize>> = accounts
            .iter()
            .enumerate()
            .map(|(i, account)| {
                let parent_id = account.parent()?;
                if parent_id == &account.id {
                    flags[i] = Some(ReferenceKind::SelfReference);
                    return None;
                }
                let parent = position_by_id.get(parent_id).copied();
                if parent.is_none() {
                    flags[i] = Some(ReferenceKind::Orphan);
                }
                parent
            })
            .collect();
        drop(position_by_id);

        // Break cycles by demoting the first account of each cycle reached in
        // input order. Each walk visits at most `accounts.len()` nodes.
        for i in 0..accounts.len() {
            let mut visited = HashSet::new();
            let mut cur = parents[i];
            while let Some(j) = cur {
                if j == i {
                    parents[i] = None;
                    flags[i] = Some(ReferenceKind::Cycle);
                    break;
                }
                if !visited.insert(j) {
                    break;
                }
                cur = parents[j];
            }
        }

        for (account, flag) in accounts.iter().zip(&flags) {
            if let (Some(kind), Some(parent)) = (flag, &account.parent_id) {
                issues.record(Issue::OrphanOrCyclicAccountReference {
                    account: account.id.clone(),
                    parent: parent.clone(),
                    kind: *kind,
                });
            }
        }

        let mut tree = Self::empty(false);
        let indices: Vec<Index> = accounts
            .into_iter()
            .zip(flags)
            .map(|(account, flag)| tree.insert(account, flag))
            .collect();
        for (i, parent) in parents.iter().enumerate() {
            match parent {
                None => tree.roots.push(indices[i]),
                Some(p) => {
                    let parent_idx = indices[*p];
                    tree.node_mut(indices[i]).parent = Some(parent_idx);
                    tree.node_mut(parent_idx).children.push(indices[i]);
                }
            }
        }
        tree.assign_depths();
        log::debug!(
            "assembled {} accounts into {} roots",
            tree.len(),
            tree.roots.len()
        );
        tree
    }

    fn from_nested(accounts: Vec<Account>) -> Self {
        let mut tree = Self::empty(true);
        let mut pending: Vec<(Account, Option<Index>, usize)> =
            accounts.into_iter().rev().map(|a| (a, None, 0)).collect();
        while let Some((mut account, parent, depth)) = pending.pop() {
            let children = std::mem::take(&mut account.children);
            let idx = tree.insert(account, None);
            let node = tree.node_mut(idx);
            node.parent = parent;
            node.depth = depth;
            match parent {
                Some(p) => tree.node_mut(p).children.push(idx),
                None => tree.roots.push(idx),
            }
            pending.extend(
                children
                    .into_iter()
                    .rev()
                    .map(|child| (child, Some(idx), depth + 1)),
            );
        }
        tree
    }

    fn insert(&mut self, account: Account, flag: Option<ReferenceKind>) -> Index {
        let id = account.id.clone();
        let idx = self.arena.insert(Node {
            account,
            parent: None,
            children: Vec::new(),
            depth: 0,
            flag,
        });
        self.by_id.entry(id).or_insert(idx);
        self.len += 1;
        idx
    }

    fn assign_depths(&mut self) {
        let mut stack: Vec<(Index, usize)> = self.roots.iter().map(|&idx| (idx, 0)).collect();
        while let Some((idx, depth)) = stack.pop() {
            let node = self.node_mut(idx);
            node.depth = depth;
            stack.extend(node.children.iter().map(|&child| (child, depth + 1)));
        }
    }

    pub fn get(&self, idx: Index) -> &Node {
        self.arena.get(idx).expect(BAD_NODE_INDEX)
    }

    fn node_mut(&mut self, idx: Index) -> &mut Node {
        self.arena.get_mut(idx).expect(BAD_NODE_INDEX)
    }

    pub fn roots(&self) -> &[Index] {
        &self.roots
    }

    pub fn find(&self, id: &AccountId) -> Option<Index> {
        self.by_id.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when the input was already nested and was not reassembled.
    pub fn is_prebuilt(&self) -> bool {
        self.prebuilt
    }

    /// All nodes, depth-first, children in order.
    pub fn walk(&self) -> Vec<Index> {
        self.walk_from(&self.roots, |_| true)
    }

    fn walk_from<F>(&self, starts: &[Index], mut descend: F) -> Vec<Index>
    where
        F: FnMut(&Node) -> bool,
    {
        let mut out = Vec::with_capacity(self.len());
        let mut stack: Vec<Index> = starts.iter().rev().copied().collect();
        while let Some(idx) = stack.pop() {
            out.push(idx);
            let node = self.get(idx);
            if descend(node) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    /// Rows to display under `state`: depth-first, skipping the descendants
    /// of collapsed accounts and, unless shown, hidden accounts with their
    /// subtrees.
    pub fn visible_rows(&self, state: &ExpansionState) -> Vec<TreeRow> {
        let mut rows = Vec::new();
        let mut stack: Vec<Index> = self.roots.iter().rev().copied().collect();
        while let Some(idx) = stack.pop() {
            let node = self.get(idx);
            if node.account.hidden && !state.show_hidden {
                continue;
            }
            let toggle = state.toggle_for(node);
            if toggle == Toggle::Expanded {
                stack.extend(node.children.iter().rev().copied());
            }
            rows.push(TreeRow {
                index: idx,
                depth: node.depth,
                toggle,
            });
        }
        rows
    }

    /// Exact sum of the balances of `idx` and all its descendants.
    pub fn subtree_balance(&self, idx: Index) -> Result<RationalAmount, AmountError> {
        self.walk_from(&[idx], |_| true)
            .into_iter()
            .try_fold(RationalAmount::zero(), |acc, i| {
                acc.checked_add(&self.get(i).account.balance)
            })
    }

    /// Accounts whose parent reference was dropped during assembly.
    pub fn flagged(&self) -> impl Iterator<Item = (Index, ReferenceKind)> + '_ {
        self.walk()
            .into_iter()
            .filter_map(move |idx| self.get(idx).flag.map(|kind| (idx, kind)))
    }

    /// Converts back into owned accounts with `children` populated.
    pub fn into_nested(mut self) -> Vec<Account> {
        let mut out = Vec::with_capacity(self.roots.len());
        for root in std::mem::take(&mut self.roots) {
            let mut stack = vec![NestFrame::open(&mut self.arena, root)];
            while let Some(frame) = stack.last_mut() {
                if let Some(child) = frame.pending.next() {
                    let child = NestFrame::open(&mut self.arena, child);
                    stack.push(child);
                    continue;
                }
                if let Some(done) = stack.pop() {
                    match stack.last_mut() {
                        Some(parent) => parent.account.children.push(done.account),
                        None => out.push(done.account),
                    }
                }
            }
        }
        out
    }
}

/// An account taken out of the arena whose children are still to be moved.
struct NestFrame {
    account: Account,
    pending: std::vec::IntoIter<Index>,
}

impl NestFrame {
    fn open(arena: &mut Arena, idx: Index) -> Self {
        let node = arena.remove(idx).expect(BAD_NODE_INDEX);
        Self {
            account: node.account,
            pending: node.children.into_iter(),
        }
    }
}

/// What a view shows in front of an account name.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Toggle {
    Expanded,
    Collapsed,
    /// No children: a fixed-width placeholder keeps siblings aligned.
    Leaf,
}

#[derive(Clone, Copy)]
pub struct TreeRow {
    pub index: Index,
    pub depth: usize,
    pub toggle: Toggle,
}

/// Per-account expand/collapse state, keyed by account id. Accounts start
/// expanded.
#[derive(Clone, Debug)]
pub struct ExpansionState {
    collapsed: HashMap<AccountId, bool>,
    pub show_hidden: bool,
}

impl Default for ExpansionState {
    fn default() -> Self {
        Self {
            collapsed: HashMap::new(),
            show_hidden: true,
        }
    }
}

impl ExpansionState {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn is_expanded(&self, id: &AccountId) -> bool {
        !self.collapsed.get(id).copied().unwrap_or(false)
    }

    pub fn set_expanded(&mut self, id: &AccountId, expanded: bool) {
        self.collapsed.insert(id.clone(), !expanded);
    }

    /// Flips the state of the account at `idx`. Accounts without children
    /// are not interactive; returns whether anything changed.
    pub fn toggle(&mut self, tree: &AccountTree, idx: Index) -> bool {
        let node = tree.get(idx);
        if !node.has_children() {
            return false;
        }
        let id = &node.account.id;
        let expanded = self.is_expanded(id);
        self.set_expanded(id, !expanded);
        true
    }

    fn toggle_for(&self, node: &Node) -> Toggle {
        if !node.has_children() {
            Toggle::Leaf
        } else if self.is_expanded(&node.account.id) {
            Toggle::Expanded
        } else {
            Toggle::Collapsed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::account::AccountType;
    use crate::testutil::account;

    fn ids(tree: &AccountTree, idxs: &[Index]) -> Vec<String> {
        idxs.iter()
            .map(|&idx| tree.get(idx).account().id.to_string())
            .collect()
    }

    fn build(accounts: Vec<Account>) -> (AccountTree, Issues) {
        let mut issues = Issues::new();
        let tree = AccountTree::build(accounts, &mut issues);
        (tree, issues)
    }

    #[test]
    fn builds_chain() {
        let (tree, issues) = build(vec![
            account("1", None),
            account("2", Some("1")),
            account("3", Some("2")),
        ]);
        assert!(issues.is_empty());
        assert!(!tree.is_prebuilt());
        assert_eq!(vec!["1"], ids(&tree, tree.roots()));
        let one = tree.get(tree.roots()[0]);
        assert_eq!(vec!["2"], ids(&tree, one.children()));
        let two = tree.get(one.children()[0]);
        assert_eq!(vec!["3"], ids(&tree, two.children()));
        let three = tree.get(two.children()[0]);
        assert!(three.children().is_empty());
        assert_eq!(2, three.depth());
        assert!(three.parent() == Some(one.children()[0]));
    }

    #[test]
    fn self_parent_is_demoted() {
        let (tree, issues) = build(vec![account("5", Some("5"))]);
        assert_eq!(vec!["5"], ids(&tree, tree.roots()));
        let node = tree.get(tree.roots()[0]);
        assert!(node.children().is_empty());
        assert_eq!(Some(ReferenceKind::SelfReference), node.flag());
        assert_eq!(
            vec![Issue::OrphanOrCyclicAccountReference {
                account: AccountId::from("5"),
                parent: AccountId::from("5"),
                kind: ReferenceKind::SelfReference,
            }],
            issues.into_vec()
        );
    }

    #[test]
    fn cycle_demotes_first_member() {
        let (tree, issues) = build(vec![
            account("x", Some("a")),
            account("a", Some("b")),
            account("b", Some("a")),
        ]);
        assert_eq!(vec!["a"], ids(&tree, tree.roots()));
        let a = tree.get(tree.roots()[0]);
        assert_eq!(vec!["x", "b"], ids(&tree, a.children()));
        assert_eq!(Some(ReferenceKind::Cycle), a.flag());
        assert_eq!(1, issues.len());
        assert_eq!(3, tree.walk().len());
    }

    #[test]
    fn orphan_becomes_root() {
        let (tree, issues) = build(vec![account("a", None), account("b", Some("missing"))]);
        assert_eq!(vec!["a", "b"], ids(&tree, tree.roots()));
        let flagged: Vec<(String, ReferenceKind)> = tree
            .flagged()
            .map(|(idx, kind)| (tree.get(idx).account().id.to_string(), kind))
            .collect();
        assert_eq!(vec![("b".to_string(), ReferenceKind::Orphan)], flagged);
        assert_eq!(1, issues.len());
    }

    #[test]
    fn empty_parent_is_root_without_issue() {
        let (tree, issues) = build(vec![account("a", Some(""))]);
        assert_eq!(vec!["a"], ids(&tree, tree.roots()));
        assert!(issues.is_empty());
    }

    #[test]
    fn children_keep_input_order() {
        let (tree, _) = build(vec![
            account("zeta", Some("root")),
            account("root", None),
            account("alpha", Some("root")),
            account("mid", Some("root")),
        ]);
        let root = tree.get(tree.roots()[0]);
        assert_eq!(vec!["zeta", "alpha", "mid"], ids(&tree, root.children()));
        assert_eq!(
            vec!["root", "zeta", "alpha", "mid"],
            ids(&tree, &tree.walk())
        );
    }

    #[test]
    fn long_chain_completes() {
        let n = 2000;
        let mut accounts = vec![account("0", Some(&(n - 1).to_string()))];
        for i in 1..n {
            accounts.push(account(&i.to_string(), Some(&(i - 1).to_string())));
        }
        let (tree, issues) = build(accounts);
        assert_eq!(1, issues.len());
        assert_eq!(vec!["0"], ids(&tree, tree.roots()));
        let rows = tree.visible_rows(&ExpansionState::new());
        assert_eq!(n, rows.len());
        assert_eq!(n - 1, rows[n - 1].depth);
    }

    #[test]
    fn prebuilt_input_is_kept() {
        let nested = vec![
            account("assets", None).with_child(
                account("bank", Some("assets")).with_child(account("checking", Some("bank"))),
            ),
            // Parent id disagrees with the nesting; nesting wins.
            account("income", None).with_child(account("salary", Some("assets"))),
        ];
        let (tree, issues) = build(nested.clone());
        assert!(issues.is_empty());
        assert!(tree.is_prebuilt());
        assert_eq!(5, tree.len());
        assert_eq!(nested, tree.into_nested());
    }

    #[test]
    fn deep_nesting_round_trips() {
        let n = 3000;
        let mut nested = account(&(n - 1).to_string(), Some(&(n - 2).to_string()));
        for i in (1..n - 1).rev() {
            nested = account(&i.to_string(), Some(&(i - 1).to_string())).with_child(nested);
        }
        nested = account("0", None).with_child(nested);

        let (tree, issues) = build(vec![nested]);
        assert!(issues.is_empty());
        assert!(tree.is_prebuilt());
        assert_eq!(n, tree.len());
        let last = tree.find(&AccountId::from((n - 1).to_string())).unwrap();
        assert_eq!(n - 1, tree.get(last).depth());

        let mut accounts = tree.into_nested();
        let mut depth = 0;
        while let Some(account) = accounts.pop() {
            assert_eq!(depth.to_string(), account.id.0);
            accounts = account.children;
            depth += 1;
        }
        assert_eq!(n, depth);
    }

    #[test]
    fn into_nested_after_assembly() {
        let (tree, _) = build(vec![account("b", Some("a")), account("a", None)]);
        let nested = tree.into_nested();
        assert_eq!(
            vec![account("a", None).with_child(account("b", Some("a")))],
            nested
        );
    }

    #[test]
    fn visible_rows_and_toggle() {
        let (tree, _) = build(vec![
            account("a", None),
            account("a1", Some("a")),
            account("a1x", Some("a1")),
            account("b", None),
        ]);
        let mut state = ExpansionState::new();
        let summarize = |rows: Vec<TreeRow>| -> Vec<(String, usize, Toggle)> {
            rows.into_iter()
                .map(|r| (tree.get(r.index).account().id.to_string(), r.depth, r.toggle))
                .collect()
        };
        assert_eq!(
            vec![
                ("a".to_string(), 0, Toggle::Expanded),
                ("a1".to_string(), 1, Toggle::Expanded),
                ("a1x".to_string(), 2, Toggle::Leaf),
                ("b".to_string(), 0, Toggle::Leaf),
            ],
            summarize(tree.visible_rows(&state))
        );

        let a1 = tree.find(&AccountId::from("a1")).unwrap();
        assert!(state.toggle(&tree, a1));
        assert_eq!(
            vec![
                ("a".to_string(), 0, Toggle::Expanded),
                ("a1".to_string(), 1, Toggle::Collapsed),
                ("b".to_string(), 0, Toggle::Leaf),
            ],
            summarize(tree.visible_rows(&state))
        );

        let b = tree.find(&AccountId::from("b")).unwrap();
        assert!(!state.toggle(&tree, b));
        assert!(state.is_expanded(&AccountId::from("b")));

        assert!(state.toggle(&tree, a1));
        assert_eq!(4, tree.visible_rows(&state).len());
    }

    #[test]
    fn hidden_accounts() {
        let mut hidden = account("h", Some("a"));
        hidden.hidden = true;
        let (tree, _) = build(vec![account("a", None), hidden, account("hx", Some("h"))]);
        let mut state = ExpansionState::new();
        assert_eq!(3, tree.visible_rows(&state).len());
        state.show_hidden = false;
        let rows = tree.visible_rows(&state);
        assert_eq!(1, rows.len());
        assert_eq!(Toggle::Expanded, rows[0].toggle);
    }

    #[test]
    fn subtree_balance() {
        let amount = |n| RationalAmount::new(n, 100).unwrap();
        let (tree, _) = build(vec![
            account("a", None).with_balance(amount(100)),
            account("a1", Some("a")).with_balance(amount(-250)),
            account("a2", Some("a")).with_balance(RationalAmount::new(1, 3).unwrap()),
            account("b", None).with_balance(amount(999)),
        ]);
        let a = tree.find(&AccountId::from("a")).unwrap();
        let total = tree.subtree_balance(a).unwrap();
        assert_eq!(RationalAmount::new(-7, 6).unwrap(), total);
        assert_eq!("-1.17", total.as_decimal_str());
        let a1 = tree.find(&AccountId::from("a1")).unwrap();
        assert_eq!(amount(-250), tree.subtree_balance(a1).unwrap());
    }

    #[test]
    fn duplicate_ids_first_owns_lookup() {
        let (tree, _) = build(vec![
            account("a", None),
            Account::new("a", "Second A", AccountType::Asset),
            account("c", Some("a")),
        ]);
        assert_eq!(3, tree.len());
        let first = tree.roots()[0];
        assert!(tree.find(&AccountId::from("a")) == Some(first));
        assert_eq!(vec!["c"], ids(&tree, tree.get(first).children()));
    }
}

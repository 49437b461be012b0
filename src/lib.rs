//! Read-only presentation of a double-entry ledger: exact amounts, currency
//! formatting, the account hierarchy, and transaction tables.

#[cfg(test)]
mod testutil;

pub mod account;
pub mod amount;
pub mod cmd;
pub mod config;
pub mod currency;
pub mod filespec;
pub mod filter;
pub mod normalize;
pub mod quality;
pub mod render;
pub mod source;
pub mod summary;
pub mod transaction;
pub mod tree;
pub mod wire;

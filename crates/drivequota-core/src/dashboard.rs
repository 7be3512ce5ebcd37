//! Per-account quota listing plus the aggregate total.

use std::fmt::Display;

use crate::account::LinkedAccount;
use crate::aggregate::{aggregate, AggregateQuota};
use crate::quota::QuotaResult;

/// The quota outcome for one linked account.
///
/// Exactly one of [`quota`](Self::quota) and [`error`](Self::error) is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountQuota {
    /// The account the quota was fetched for.
    pub account: LinkedAccount,
    /// The fetched quota, or the error message to show instead.
    pub outcome: Result<QuotaResult, String>,
}

impl AccountQuota {
    /// Creates an item from a fetch result, keeping only the error message.
    pub fn from_outcome<E: Display>(
        account: LinkedAccount,
        result: Result<QuotaResult, E>,
    ) -> Self {
        Self {
            account,
            outcome: result.map_err(|e| e.to_string()),
        }
    }

    /// Returns the quota, if the fetch succeeded.
    pub fn quota(&self) -> Option<&QuotaResult> {
        self.outcome.as_ref().ok()
    }

    /// Returns the error message, if the fetch failed.
    pub fn error(&self) -> Option<&str> {
        self.outcome.as_ref().err().map(String::as_str)
    }
}

/// Everything a dashboard view renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dashboard {
    /// One entry per linked account, in listing order.
    pub items: Vec<AccountQuota>,
    /// Totals over the accounts that could be fetched.
    pub total: AggregateQuota,
}

impl Dashboard {
    /// Builds a dashboard and computes its total.
    pub fn new(items: Vec<AccountQuota>) -> Self {
        let total = aggregate(items.iter().map(|item| &item.outcome));
        Self { items, total }
    }

    /// Returns true if no account is linked.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the items whose fetch failed.
    pub fn failures(&self) -> impl Iterator<Item = &AccountQuota> {
        self.items.iter().filter(|item| item.outcome.is_err())
    }
}

// ABOUTME: Column reconciliation between a development table and a production snapshot
// ABOUTME: Computes common columns in development order plus both one-sided differences

use serde::Serialize;
use std::collections::{BTreeSet, HashSet};

/// Result of comparing a development column list with a production column set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnReconciliation {
    /// Columns present on both sides, in development ordinal order
    pub common: Vec<String>,
    /// Columns only in development, in development ordinal order
    pub dev_only: Vec<String>,
    /// Columns only in production, in the snapshot set's (sorted) order
    pub prod_only: Vec<String>,
}

impl ColumnReconciliation {
    pub fn has_common_columns(&self) -> bool {
        !self.common.is_empty()
    }

    /// True when development and production carry exactly the same columns
    pub fn is_exact_match(&self) -> bool {
        self.dev_only.is_empty() && self.prod_only.is_empty()
    }
}

/// Reconcile development columns against the production snapshot
///
/// Walks `dev` in order and keeps each name that `prod` contains. Names are
/// compared by exact string equality.
///
/// # Examples
///
/// ```
/// # use pg_column_export::export::reconcile;
/// # use std::collections::BTreeSet;
/// let dev: Vec<String> = ["id", "name", "secret_col", "year"]
///     .iter()
///     .map(|s| s.to_string())
///     .collect();
/// let prod: BTreeSet<String> = ["id", "name", "year", "title"]
///     .iter()
///     .map(|s| s.to_string())
///     .collect();
///
/// let result = reconcile(&dev, &prod);
/// assert_eq!(result.common, vec!["id", "name", "year"]);
/// assert_eq!(result.dev_only, vec!["secret_col"]);
/// assert_eq!(result.prod_only, vec!["title"]);
/// ```
pub fn reconcile(dev: &[String], prod: &BTreeSet<String>) -> ColumnReconciliation {
    let (common, dev_only): (Vec<String>, Vec<String>) =
        dev.iter().cloned().partition(|c| prod.contains(c));

    let dev_set: HashSet<&str> = dev.iter().map(String::as_str).collect();
    let prod_only = prod
        .iter()
        .filter(|c| !dev_set.contains(c.as_str()))
        .cloned()
        .collect();

    ColumnReconciliation {
        common,
        dev_only,
        prod_only,
    }
}

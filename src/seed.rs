//! Default ledger loaded once at process start.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::info;

use crate::model::{NewTransaction, Transaction};
use crate::store::{LedgerStore, StoreError};

/// The user the default ledger belongs to.
pub const DEFAULT_ACTOR: &str = "500";

/// payer, points, timestamp; in insertion order
const DEFAULT_TRANSACTIONS: [(&str, i64, &str); 8] = [
    ("TEST", 200, "2024-05-02T14:00:00Z"),
    ("TEST", -200, "2024-05-02T14:00:00Z"),
    ("TEST", 100, "2024-06-02T14:00:00Z"),
    ("SHOPIFY", 1_000, "2024-07-02T14:00:00Z"),
    ("EBAY", 200, "2024-06-30T11:00:00Z"),
    ("SHOPIFY", -200, "2024-06-30T15:00:00Z"),
    ("AMAZON", 10_000, "2024-07-01T14:00:00Z"),
    ("SHOPIFY", 300, "2024-06-30T10:00:00Z"),
];

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("default transaction {index}: invalid timestamp '{value}': {source}")]
    Timestamp {
        index: usize,
        value: &'static str,
        source: chrono::ParseError,
    },

    #[error("default transactions rejected by the store: {0}")]
    Store(#[from] StoreError),
}

/// Append the default user's transactions to `store`.
///
/// The user's points counter is credited by the same appends, so it starts out
/// equal to the user's total balance.
pub async fn load_defaults(store: &LedgerStore) -> Result<Vec<Transaction>, SeedError> {
    let entries = DEFAULT_TRANSACTIONS
        .iter()
        .enumerate()
        .map(|(index, &(payer, points, value))| {
            let timestamp = DateTime::parse_from_rfc3339(value)
                .map_err(|source| SeedError::Timestamp {
                    index,
                    value,
                    source,
                })?
                .with_timezone(&Utc);
            Ok(NewTransaction::new(payer, points).at(timestamp))
        })
        .collect::<Result<Vec<_>, SeedError>>()?;

    let ledger = store.ledger(DEFAULT_ACTOR).await;
    let mut ledger = ledger.write().await;
    let seeded: Vec<_> = entries
        .into_iter()
        .map(|entry| store.insert(&mut ledger, entry))
        .collect::<Result<_, _>>()?;

    info!(
        actor = DEFAULT_ACTOR,
        transactions = seeded.len(),
        total = %ledger.account().total_points(),
        "default ledger loaded"
    );
    Ok(seeded)
}

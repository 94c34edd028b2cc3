//! Process-wide transaction store.
//!
//! Transactions are partitioned by owner. Each owner's entries live in an
//! [`OwnerLedger`] behind its own lock, so work on one user never blocks another
//! and a spend can hold one owner's ledger exclusively from balance check to
//! commit. Nothing is ever removed.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::Points;
use crate::ledger::ActorAccount;
use crate::model::{ActorId, NewTransaction, Transaction, TxId};

/// Error raised by the store itself, independent of any business rule.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("crediting {points} would overflow the {total} points counter of {owner}")]
    CounterOverflow {
        owner: ActorId,
        total: Points,
        points: Points,
    },

    #[error("debiting {points} would overflow the {total} points counter of {owner}")]
    CounterUnderflow {
        owner: ActorId,
        total: Points,
        points: Points,
    },
}

/// One owner's transactions in insertion order, plus their points counter.
#[derive(Debug)]
pub struct OwnerLedger {
    account: ActorAccount,
    transactions: Vec<Transaction>,
    index: HashMap<TxId, usize>,
}

impl OwnerLedger {
    pub fn new(owner: impl Into<ActorId>) -> Self {
        Self {
            account: ActorAccount::new(owner),
            transactions: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn owner(&self) -> &str {
        self.account.actor()
    }

    pub fn account(&self) -> &ActorAccount {
        &self.account
    }

    /// Transactions in insertion order. Zero-point entries are skipped.
    pub fn list(&self) -> impl Iterator<Item = &Transaction> + '_ {
        self.transactions.iter().filter(|tx| !tx.points().is_zero())
    }

    /// Same set as [`list`](Self::list), ascending by timestamp.
    /// Equal timestamps keep insertion order.
    pub fn list_ordered_by_time(&self) -> Vec<&Transaction> {
        let mut ordered: Vec<&Transaction> = self.list().collect();
        ordered.sort_by_key(|tx| tx.timestamp());
        ordered
    }

    /// Zero-point entries are not found, like in [`list`](Self::list).
    pub fn get(&self, id: TxId) -> Option<&Transaction> {
        self.index
            .get(&id)
            .map(|&pos| &self.transactions[pos])
            .filter(|tx| !tx.points().is_zero())
    }

    /// Apply `f` to one transaction in place.
    pub fn mutate<R>(&mut self, id: TxId, f: impl FnOnce(&mut Transaction) -> R) -> Option<R> {
        let pos = *self.index.get(&id)?;
        Some(f(&mut self.transactions[pos]))
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    fn push(&mut self, id: TxId, new: NewTransaction) -> &Transaction {
        let tx = Transaction::new(id, self.account.actor().to_string(), new);
        self.index.insert(id, self.transactions.len());
        self.transactions.push(tx);
        &self.transactions[self.transactions.len() - 1]
    }

    fn credit_account(&mut self, points: Points) -> Result<(), StoreError> {
        let total = self.account.total_points();
        match self.account.credit(points) {
            Some(_) => Ok(()),
            None => Err(StoreError::CounterOverflow {
                owner: self.owner().to_string(),
                total,
                points,
            }),
        }
    }

    pub(crate) fn debit_account(&mut self, points: Points) -> Result<(), StoreError> {
        let total = self.account.total_points();
        match self.account.debit(points) {
            Some(_) => Ok(()),
            None => Err(StoreError::CounterUnderflow {
                owner: self.owner().to_string(),
                total,
                points,
            }),
        }
    }
}

/// Shared handle to one owner's ledger.
pub type SharedLedger = Arc<RwLock<OwnerLedger>>;

/// The ledger of every user in the process.
#[derive(Debug, Default)]
pub struct LedgerStore {
    owners: RwLock<HashMap<ActorId, SharedLedger>>,
    last_id: AtomicU64,
}

impl LedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the ledger of `owner`, creating an empty one on first use.
    pub async fn ledger(&self, owner: &str) -> SharedLedger {
        if let Some(ledger) = self.existing(owner).await {
            return ledger;
        }
        let mut owners = self.owners.write().await;
        owners
            .entry(owner.to_string())
            .or_insert_with(|| Arc::new(RwLock::new(OwnerLedger::new(owner))))
            .clone()
    }

    /// Return the ledger of `owner` if anything was ever recorded for them.
    pub async fn existing(&self, owner: &str) -> Option<SharedLedger> {
        self.owners.read().await.get(owner).cloned()
    }

    /// Append to a ledger the caller already holds exclusively.
    ///
    /// Credits the owner's counter and assigns the next id; the timestamp
    /// defaults to now. The points sign is not validated here. Nothing is
    /// appended if the counter would overflow.
    pub fn insert(
        &self,
        ledger: &mut OwnerLedger,
        new: NewTransaction,
    ) -> Result<Transaction, StoreError> {
        ledger.credit_account(new.points)?;
        let id = self.last_id.fetch_add(1, Ordering::Relaxed) + 1;
        Ok(ledger.push(id, new).clone())
    }

    pub async fn append(
        &self,
        owner: &str,
        new: NewTransaction,
    ) -> Result<Transaction, StoreError> {
        let ledger = self.ledger(owner).await;
        let mut ledger = ledger.write().await;
        self.insert(&mut ledger, new)
    }

    /// Snapshot of `owner`'s transactions in insertion order.
    pub async fn list(&self, owner: &str) -> Vec<Transaction> {
        match self.existing(owner).await {
            Some(ledger) => ledger.read().await.list().cloned().collect(),
            None => Vec::new(),
        }
    }

    /// Snapshot of `owner`'s transactions ordered by timestamp.
    pub async fn list_ordered_by_time(&self, owner: &str) -> Vec<Transaction> {
        match self.existing(owner).await {
            Some(ledger) => ledger
                .read()
                .await
                .list_ordered_by_time()
                .into_iter()
                .cloned()
                .collect(),
            None => Vec::new(),
        }
    }

    pub async fn get(&self, owner: &str, id: TxId) -> Option<Transaction> {
        let ledger = self.existing(owner).await?;
        let ledger = ledger.read().await;
        ledger.get(id).cloned()
    }

    pub async fn mutate<R>(
        &self,
        owner: &str,
        id: TxId,
        f: impl FnOnce(&mut Transaction) -> R,
    ) -> Option<R> {
        let ledger = self.existing(owner).await?;
        let mut ledger = ledger.write().await;
        ledger.mutate(id, f)
    }
}

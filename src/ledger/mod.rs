//! Ledger service.
//!
//! The facade the boundary layer talks to. Every operation resolves the acting
//! user through a [`Session`] first and fails before touching the store when
//! nobody is logged in. Deposits and spends hold the actor's ledger
//! exclusively for the whole check-then-write sequence; reads take a shared
//! lock and return copies.
//! Also supports an async stream of batch commands.

use tokio_stream::{Stream, StreamExt};
use tracing::info;

use crate::Points;
use crate::balance;
use crate::model::{ActorId, Command, Deduction, NewTransaction, PayerBalance, Transaction, TxId};
use crate::spend;
use crate::store::{LedgerStore, OwnerLedger};

mod account;
pub use account::ActorAccount;

mod error;
pub use error::{DepositError, ErrorKind, LedgerError, Operation, SpendError};

mod session;
pub use session::{Anonymous, Authenticated, Session};

/// Result of applying one [`Command`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Deposited(Transaction),
    Spent(Vec<Deduction>),
}

/// The points ledger of every user in the process.
#[derive(Debug, Default)]
pub struct LedgerService {
    store: LedgerStore,
}

/// Public API
impl LedgerService {
    pub fn new() -> Self {
        Self::with_store(LedgerStore::new())
    }

    pub fn with_store(store: LedgerStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &LedgerStore {
        &self.store
    }

    /// Record points contributed by a payer for the acting user.
    ///
    /// Negative points record a manual adjustment and are accepted as long as
    /// the payer keeps a non-negative balance.
    pub async fn record_deposit<S: Session + ?Sized>(
        &self,
        session: &S,
        deposit: NewTransaction,
    ) -> Result<Transaction, LedgerError> {
        let actor = authenticate(session, Operation::Deposit)?;
        let payer = deposit.payer.clone();
        let points = deposit.points;

        let result = self.deposit(&actor, deposit).await;
        match &result {
            Ok(tx) => info!(
                actor = %actor,
                tx = tx.id(),
                payer = %payer,
                points = %points,
                "deposit applied"
            ),
            Err(e) => info!(
                actor = %actor,
                payer = %payer,
                points = %points,
                reason = %e,
                "deposit skipped"
            ),
        }
        Ok(result?)
    }

    /// The acting user's transactions in insertion order.
    pub async fn list_transactions<S: Session + ?Sized>(
        &self,
        session: &S,
    ) -> Result<Vec<Transaction>, LedgerError> {
        let actor = authenticate(session, Operation::ListTransactions)?;
        Ok(self.store.list(&actor).await)
    }

    /// One of the acting user's transactions. Other users' ids are not found.
    pub async fn get_transaction<S: Session + ?Sized>(
        &self,
        session: &S,
        id: TxId,
    ) -> Result<Transaction, LedgerError> {
        let actor = authenticate(session, Operation::GetTransaction)?;
        self.store
            .get(&actor, id)
            .await
            .ok_or(LedgerError::NotFound(id))
    }

    /// Spend points oldest-first across the acting user's payers.
    pub async fn spend_points<S: Session + ?Sized>(
        &self,
        session: &S,
        points: Points,
    ) -> Result<Vec<Deduction>, LedgerError> {
        let actor = authenticate(session, Operation::Spend)?;

        // an unknown actor has nothing to spend; don't register them for it
        let result = match self.store.existing(&actor).await {
            Some(ledger) => {
                let mut ledger = ledger.write().await;
                spend::spend(&mut ledger, points)
            }
            None => spend::spend(&mut OwnerLedger::new(actor.as_str()), points),
        };

        match &result {
            Ok(deductions) => info!(
                actor = %actor,
                points = %points,
                payers = deductions.len(),
                "spend applied"
            ),
            Err(e) => info!(actor = %actor, points = %points, reason = %e, "spend skipped"),
        }
        Ok(result?)
    }

    /// Net points per payer for the acting user.
    pub async fn get_balances<S: Session + ?Sized>(
        &self,
        session: &S,
    ) -> Result<Vec<PayerBalance>, LedgerError> {
        let actor = authenticate(session, Operation::Balances)?;
        Ok(match self.store.existing(&actor).await {
            Some(ledger) => balance::payer_balances(&*ledger.read().await),
            None => Vec::new(),
        })
    }

    /// Sum of the acting user's payer balances.
    pub async fn total_balance<S: Session + ?Sized>(
        &self,
        session: &S,
    ) -> Result<Points, LedgerError> {
        let actor = authenticate(session, Operation::Balances)?;
        Ok(match self.store.existing(&actor).await {
            Some(ledger) => balance::total_balance(&*ledger.read().await),
            None => Points::ZERO,
        })
    }

    /// The acting user's running points counter.
    pub async fn account<S: Session + ?Sized>(
        &self,
        session: &S,
    ) -> Result<ActorAccount, LedgerError> {
        let actor = authenticate(session, Operation::Account)?;
        Ok(match self.store.existing(&actor).await {
            Some(ledger) => ledger.read().await.account().clone(),
            None => ActorAccount::new(actor),
        })
    }

    /// Apply a single batch command for the acting user.
    pub async fn apply<S: Session + ?Sized>(
        &self,
        session: &S,
        command: Command,
    ) -> Result<Outcome, LedgerError> {
        match command {
            Command::Deposit(deposit) => self
                .record_deposit(session, deposit)
                .await
                .map(Outcome::Deposited),
            Command::Spend { points } => self
                .spend_points(session, points)
                .await
                .map(Outcome::Spent),
        }
    }

    /// Run the given command stream for the acting user.
    pub async fn run<S: Session + ?Sized>(
        &self,
        session: &S,
        mut stream: impl Stream<Item = Command> + Unpin,
    ) {
        while let Some(command) = stream.next().await {
            // a rejected command must not stop the batch; it is already logged
            let _ = self.apply(session, command).await;
        }
    }
}

/// Private API
impl LedgerService {
    /// Validate and append a deposit:
    /// - Ensure the payer is named and the points are non-zero
    /// - Ensure a negative adjustment leaves the payer non-negative
    /// - Append and credit the counter under the same lock; the store refuses
    ///   an overflowing counter
    async fn deposit(
        &self,
        actor: &str,
        deposit: NewTransaction,
    ) -> Result<Transaction, DepositError> {
        if deposit.payer.trim().is_empty() {
            return Err(DepositError::EmptyPayer);
        }
        if deposit.points.is_zero() {
            return Err(DepositError::ZeroPoints);
        }

        let shared = if deposit.points.is_negative() {
            self.store.existing(actor).await
        } else {
            Some(self.store.ledger(actor).await)
        };
        let Some(shared) = shared else {
            return Err(DepositError::PayerOverdrawn {
                payer: deposit.payer,
                balance: Points::ZERO,
                adjustment: deposit.points,
            });
        };
        let mut ledger = shared.write().await;

        if deposit.points.is_negative() {
            let balance = balance::payer_balance(&ledger, &deposit.payer);
            if balance.checked_add(deposit.points).is_none_or(Points::is_negative) {
                return Err(DepositError::PayerOverdrawn {
                    payer: deposit.payer,
                    balance,
                    adjustment: deposit.points,
                });
            }
        }

        Ok(self.store.insert(&mut ledger, deposit)?)
    }
}

/// Resolve the acting user or refuse the operation.
fn authenticate<S: Session + ?Sized>(session: &S, op: Operation) -> Result<ActorId, LedgerError> {
    session
        .current_actor()
        .ok_or(LedgerError::Unauthenticated(op))
}

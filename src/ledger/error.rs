//! Error types for ledger operations.

use std::fmt;
use thiserror::Error;

use crate::Points;
use crate::model::{ActorId, Payer, TxId};
use crate::store::StoreError;

/// The ledger operation being performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Deposit,
    ListTransactions,
    GetTransaction,
    Spend,
    Balances,
    Account,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let action = match self {
            Operation::Deposit => "create transactions",
            Operation::ListTransactions => "view transactions",
            Operation::GetTransaction => "view a transaction",
            Operation::Spend => "spend points",
            Operation::Balances => "view balances",
            Operation::Account => "view the account",
        };
        f.write_str(action)
    }
}

/// Coarse failure category for the boundary layer.
///
/// None of them are transient; retrying the same request against the same
/// state fails the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Unauthenticated,
    InvalidRequest,
    InsufficientPoints,
    NotFound,
}

/// Top-level error returned by [`LedgerService`](super::LedgerService).
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("user must be logged in to {0}")]
    Unauthenticated(Operation),

    #[error("transaction {0} not found")]
    NotFound(TxId),

    #[error("deposit failed: {0}")]
    Deposit(#[from] DepositError),

    #[error("spend failed: {0}")]
    Spend(#[from] SpendError),
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::Unauthenticated(_) => ErrorKind::Unauthenticated,
            LedgerError::NotFound(_) => ErrorKind::NotFound,
            LedgerError::Deposit(e) => e.kind(),
            LedgerError::Spend(e) => e.kind(),
        }
    }
}

/// Error during deposit processing.
#[derive(Debug, Error)]
pub enum DepositError {
    #[error("payer must not be empty")]
    EmptyPayer,

    #[error("points must be non-zero")]
    ZeroPoints,

    #[error(transparent)]
    Counter(#[from] StoreError),

    #[error("adjustment of {adjustment} exceeds the {balance} points held for payer {payer}")]
    PayerOverdrawn {
        payer: Payer,
        balance: Points,
        adjustment: Points,
    },
}

impl DepositError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DepositError::PayerOverdrawn { .. } => ErrorKind::InsufficientPoints,
            DepositError::EmptyPayer | DepositError::ZeroPoints | DepositError::Counter(_) => {
                ErrorKind::InvalidRequest
            }
        }
    }
}

/// Error during spend processing.
#[derive(Debug, Error)]
pub enum SpendError {
    #[error("points to spend must be positive, got {0}")]
    InvalidAmount(Points),

    #[error("insufficient points for {actor}: available {available}, requested {requested}")]
    InsufficientPoints {
        actor: ActorId,
        available: Points,
        requested: Points,
    },

    #[error("insufficient spendable points for {actor}: {missing} points could not be covered")]
    Shortfall { actor: ActorId, missing: Points },

    #[error(transparent)]
    Counter(#[from] StoreError),
}

impl SpendError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SpendError::InvalidAmount(_) | SpendError::Counter(_) => ErrorKind::InvalidRequest,
            SpendError::InsufficientPoints { .. } | SpendError::Shortfall { .. } => {
                ErrorKind::InsufficientPoints
            }
        }
    }
}

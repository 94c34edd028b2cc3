//! Core domain types for the points ledger.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::Points;

/// Identifier of the user a transaction belongs to.
pub type ActorId = String;

/// Transaction identifier, unique for the lifetime of a store.
pub type TxId = u64;

/// Label of the source that contributed points.
pub type Payer = String;

/// A ledger entry.
///
/// `points` never changes once recorded. Positive entries are consumed in place
/// by spends through `remaining`; once nothing is left they become inert.
/// Negative entries are never consumed and never become inert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    id: TxId,
    owner: ActorId,
    payer: Payer,
    points: Points,
    remaining: Points,
    inert: bool,
    timestamp: DateTime<Utc>,
}

impl Transaction {
    pub(crate) fn new(id: TxId, owner: ActorId, new: NewTransaction) -> Self {
        let remaining = new.points.max(Points::ZERO);
        Self {
            id,
            owner,
            payer: new.payer,
            points: new.points,
            remaining,
            inert: false,
            timestamp: new.timestamp.unwrap_or_else(Utc::now),
        }
    }

    pub fn id(&self) -> TxId {
        self.id
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn payer(&self) -> &str {
        &self.payer
    }

    pub fn points(&self) -> Points {
        self.points
    }

    /// Unspent part of a positive entry; always zero for negative entries.
    pub fn remaining(&self) -> Points {
        self.remaining
    }

    pub fn is_inert(&self) -> bool {
        self.inert
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// What this entry currently adds to its payer's balance.
    pub fn contribution(&self) -> Points {
        if self.inert {
            Points::ZERO
        } else if self.points.is_positive() {
            self.remaining
        } else {
            self.points
        }
    }

    /// Whether the spend walk may draw from this entry.
    pub fn is_spendable(&self) -> bool {
        !self.inert && self.remaining.is_positive()
    }

    /// Draw `points` from the unspent part, clamped to what is left.
    pub(crate) fn consume(&mut self, points: Points) -> Points {
        let taken = points.min(self.remaining).max(Points::ZERO);
        self.remaining -= taken;
        if self.points.is_positive() && self.remaining.is_zero() {
            self.inert = true;
        }
        taken
    }
}

/// Input for [`LedgerStore::append`](crate::store::LedgerStore::append).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub payer: Payer,
    pub points: Points,
    /// Stamped with the current time when absent.
    pub timestamp: Option<DateTime<Utc>>,
}

impl NewTransaction {
    pub fn new(payer: impl Into<Payer>, points: impl Into<Points>) -> Self {
        Self {
            payer: payer.into(),
            points: points.into(),
            timestamp: None,
        }
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// A batch command accepted by [`LedgerService::apply`](crate::LedgerService::apply).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Record points contributed (or, when negative, taken back) by a payer.
    Deposit(NewTransaction),
    /// Spend points oldest-first across payers.
    Spend { points: Points },
}

/// Net points held for one payer; serializes as a `payer,points` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayerBalance {
    pub payer: Payer,
    pub points: Points,
}

/// Points taken from one payer by a spend; `points` is negative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deduction {
    pub payer: Payer,
    pub points: Points,
}

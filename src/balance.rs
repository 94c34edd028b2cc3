//! Balance views derived from an owner's ledger.
//!
//! Nothing here is cached: every call folds the current transactions again.
//! Payers appear in the order they are first seen when walking the ledger by
//! timestamp, and a payer stays listed with 0 once everything it contributed
//! has been spent.

use std::collections::HashMap;

use crate::Points;
use crate::model::{PayerBalance, Transaction};
use crate::store::OwnerLedger;

/// Net points per payer for the owner of `ledger`.
pub fn payer_balances(ledger: &OwnerLedger) -> Vec<PayerBalance> {
    net_by_payer(ledger.list_ordered_by_time())
}

/// Net points held by one payer; 0 for a payer never seen.
pub fn payer_balance(ledger: &OwnerLedger, payer: &str) -> Points {
    ledger
        .list()
        .filter(|tx| tx.payer() == payer)
        .map(Transaction::contribution)
        .sum()
}

/// Sum of every payer's net points.
pub fn total_balance(ledger: &OwnerLedger) -> Points {
    ledger.list().map(Transaction::contribution).sum()
}

/// Fold transactions into per-payer nets, keeping first-seen payer order.
pub fn net_by_payer<'a>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
) -> Vec<PayerBalance> {
    let mut balances: Vec<PayerBalance> = Vec::new();
    let mut position: HashMap<&str, usize> = HashMap::new();

    for tx in transactions {
        if tx.points().is_zero() {
            continue;
        }
        let pos = *position.entry(tx.payer()).or_insert_with(|| {
            balances.push(PayerBalance {
                payer: tx.payer().to_string(),
                points: Points::ZERO,
            });
            balances.len() - 1
        });
        balances[pos].points += tx.contribution();
    }

    balances
}

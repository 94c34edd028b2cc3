//! Oldest-first spending across payers.
//!
//! A spend runs against an [`OwnerLedger`] the caller holds exclusively. It is
//! planned in full before anything is written: the walk only records which
//! transactions to draw from, and the draws are committed once the plan covers
//! the whole request. A failed spend therefore leaves the ledger untouched.

use std::collections::HashMap;

use crate::Points;
use crate::balance;
use crate::ledger::SpendError;
use crate::model::{Deduction, TxId};
use crate::store::OwnerLedger;

/// Spend `amount` points from the owner of `ledger`.
///
/// Returns one deduction per payer touched, in the order the walk first drew
/// from them, each with negative points.
pub fn spend(ledger: &mut OwnerLedger, amount: Points) -> Result<Vec<Deduction>, SpendError> {
    if !amount.is_positive() {
        return Err(SpendError::InvalidAmount(amount));
    }

    let available = balance::total_balance(ledger);
    if available < amount {
        return Err(SpendError::InsufficientPoints {
            actor: ledger.owner().to_string(),
            available,
            requested: amount,
        });
    }

    let plan = plan(ledger, amount)?;
    ledger.debit_account(amount)?;
    Ok(commit(ledger, plan))
}

/// Draws chosen by the walk, not yet applied.
#[derive(Debug, Default)]
struct Plan {
    draws: Vec<(TxId, Points)>,
    per_payer: Vec<Deduction>,
    position: HashMap<String, usize>,
}

impl Plan {
    fn draw(&mut self, id: TxId, payer: &str, points: Points) {
        self.draws.push((id, points));
        match self.position.get(payer) {
            Some(&pos) => self.per_payer[pos].points += points,
            None => {
                self.position.insert(payer.to_string(), self.per_payer.len());
                self.per_payer.push(Deduction {
                    payer: payer.to_string(),
                    points,
                });
            }
        }
    }
}

/// Walk spendable transactions by timestamp, never taking more from a payer
/// than its net balance.
fn plan(ledger: &OwnerLedger, amount: Points) -> Result<Plan, SpendError> {
    let mut headroom: HashMap<String, Points> = balance::payer_balances(ledger)
        .into_iter()
        .map(|b| (b.payer, b.points))
        .collect();

    let mut plan = Plan::default();
    let mut needed = amount;

    for tx in ledger.list_ordered_by_time() {
        if needed.is_zero() {
            break;
        }
        if !tx.is_spendable() {
            continue;
        }
        let Some(room) = headroom.get_mut(tx.payer()) else {
            continue;
        };
        if !room.is_positive() {
            continue;
        }

        let take = tx.remaining().min(needed).min(*room);
        *room -= take;
        needed -= take;
        plan.draw(tx.id(), tx.payer(), take);
    }

    if needed.is_positive() {
        return Err(SpendError::Shortfall {
            actor: ledger.owner().to_string(),
            missing: needed,
        });
    }

    Ok(plan)
}

fn commit(ledger: &mut OwnerLedger, plan: Plan) -> Vec<Deduction> {
    for (id, take) in plan.draws {
        let taken = ledger.mutate(id, |tx| tx.consume(take));
        debug_assert_eq!(taken, Some(take));
    }

    plan.per_payer
        .into_iter()
        .map(|d| Deduction {
            payer: d.payer,
            points: -d.points,
        })
        .collect()
}

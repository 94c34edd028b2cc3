use crate::{ActorId, Points};

/// A user's running points counter.
///
/// Kept in lockstep with the ledger: every append credits it and every spend
/// debits it inside the owner's critical section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorAccount {
    actor: ActorId,
    total_points: Points,
}

impl ActorAccount {
    pub fn new(actor: impl Into<ActorId>) -> Self {
        Self {
            actor: actor.into(),
            total_points: Points::ZERO,
        }
    }

    pub fn actor(&self) -> &str {
        &self.actor
    }

    pub fn total_points(&self) -> Points {
        self.total_points
    }

    /// Add `points`; `None` on overflow, leaving the counter unchanged.
    pub(crate) fn credit(&mut self, points: Points) -> Option<Points> {
        self.total_points = self.total_points.checked_add(points)?;
        Some(self.total_points)
    }

    pub(crate) fn debit(&mut self, points: Points) -> Option<Points> {
        self.total_points = self.total_points.checked_sub(points)?;
        Some(self.total_points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_account_is_empty() {
        let account = ActorAccount::new("500");
        assert_eq!(account.actor(), "500");
        assert_eq!(account.total_points(), Points::ZERO);
    }

    #[test]
    fn credit_and_debit_move_the_total() {
        let mut account = ActorAccount::new("500");
        account.credit(Points::new(300));
        account.credit(Points::new(-100));
        assert_eq!(account.debit(Points::new(50)), Some(Points::new(150)));
        assert_eq!(account.total_points(), Points::new(150));
    }

    #[test]
    fn overflow_leaves_the_total_unchanged() {
        let mut account = ActorAccount::new("500");
        account.credit(Points::new(i64::MAX));
        assert_eq!(account.credit(Points::new(1)), None);
        assert_eq!(account.total_points(), Points::new(i64::MAX));

        let mut account = ActorAccount::new("500");
        account.credit(Points::new(-10));
        assert_eq!(account.debit(Points::new(i64::MAX)), None);
        assert_eq!(account.total_points(), Points::new(-10));
    }
}

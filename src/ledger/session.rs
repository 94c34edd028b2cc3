use crate::model::ActorId;

/// Resolves who is making the current request.
///
/// The ledger asks once per operation and refuses to touch any data when no
/// actor comes back.
pub trait Session {
    fn current_actor(&self) -> Option<ActorId>;
}

/// A session already resolved to an actor by the boundary layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authenticated(ActorId);

impl Authenticated {
    pub fn new(actor: impl Into<ActorId>) -> Self {
        Self(actor.into())
    }

    pub fn actor(&self) -> &str {
        &self.0
    }
}

impl Session for Authenticated {
    fn current_actor(&self) -> Option<ActorId> {
        Some(self.0.clone())
    }
}

/// A request nobody is logged in for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Anonymous;

impl Session for Anonymous {
    fn current_actor(&self) -> Option<ActorId> {
        None
    }
}

impl Session for Option<ActorId> {
    fn current_actor(&self) -> Option<ActorId> {
        self.clone()
    }
}

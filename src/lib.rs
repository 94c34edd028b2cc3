pub mod balance;
pub mod config;
pub mod csv;
pub mod ledger;
pub mod model;
pub mod points;
pub mod seed;
pub mod spend;
pub mod store;

pub use ledger::{LedgerError, LedgerService};
pub use model::{ActorId, Command, Deduction, NewTransaction, PayerBalance, Transaction, TxId};
pub use points::Points;

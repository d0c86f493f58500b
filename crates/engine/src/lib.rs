//! Petty-cash reconciliation engine.
//!
//! The wallet can only move through transactions, and only one transaction
//! may be open at a time: it must be fully split across categories and locked
//! before the next movement is admitted.

pub use admin::AdminCode;
pub use categories::{Category, CategoryNode, CategoryOption};
pub use classification::{Classification, TOLERANCE, classifiable_total};
pub use commands::{
    ForceUnlockCmd, MovementCmd, MovementDirection, OpenTransactionCmd, SplitInput,
};
pub use error::EngineError;
pub use fee::fee_for;
pub use gate::{Access, LockGate};
pub use money::Amount;
pub use ops::{
    BalanceCheck, CategoryStat, Engine, EngineBuilder, Health, HistoryEntry, LockReceipt,
    OpenTransactionDetail, OpenedTransaction, SplitView, SplitsAdded, SyncReceipt,
    SystemStatus, TransactionSummary,
};
pub use splits::Split;
pub use transactions::{Transaction, TransactionSource, TransactionStatus};
pub use unlock_audit::UnlockAudit;
pub use wallets::Wallet;

mod admin;
pub mod categories;
mod classification;
mod commands;
mod error;
pub mod fee;
pub mod gate;
mod money;
mod ops;
pub mod splits;
mod store;
pub mod system_state;
pub mod transactions;
pub mod unlock_audit;
pub mod wallets;

type ResultEngine<T> = Result<T, EngineError>;

//! Wallet ledger and transaction processing engine.
//!
//! Registered users hold a single wallet each and move money through typed
//! transactions: deposit, withdrawal, transfer, merchant payment, refund.
//! The [`Engine`] validates the involved parties, computes fees, records a
//! `Pending` [`Transaction`], and applies balance changes atomically when
//! the transaction is processed.

pub use commands::{
    DepositCmd, PaymentCmd, RefundCmd, RegisterUserCmd, TransferCmd, WithdrawalCmd,
};
pub use error::EngineError;
pub use fees::FeePolicy;
pub use money::MoneyCents;
pub use notify::{LogNotifier, NotificationSink};
pub use ops::{Engine, EngineBuilder, TransactionListFilter};
pub use transactions::{Transaction, TransactionKind, TransactionStatus};
pub use users::User;
pub use wallets::Wallet;

mod commands;
mod error;
mod fees;
mod money;
mod notify;
mod ops;
mod transactions;
mod users;
mod wallets;

type ResultEngine<T> = Result<T, EngineError>;

//! Notification contract.
//!
//! The engine raises fire-and-forget events after the triggering state
//! change is durable. Delivery (push, e-mail, webhook, ...) is a separate
//! concern; the default sink just logs through `tracing`.

use crate::{MoneyCents, Transaction, Wallet};

/// Sink for engine events.
///
/// Implementations must not block: the engine calls these synchronously
/// right after committing the state change they describe.
pub trait NotificationSink: Send + Sync {
    fn transaction_created(&self, tx: &Transaction);
    fn transaction_completed(&self, tx: &Transaction);
    fn transaction_failed(&self, tx: &Transaction, reason: &str);
    fn transaction_cancelled(&self, tx: &Transaction, reason: &str);
    /// A successful debit left the balance under `threshold_minor`.
    fn low_balance(&self, wallet: &Wallet, threshold_minor: i64);
    fn wallet_blocked(&self, wallet: &Wallet);
    fn wallet_unblocked(&self, wallet: &Wallet);
}

/// Default sink: structured log lines, one per event.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

impl NotificationSink for LogNotifier {
    fn transaction_created(&self, tx: &Transaction) {
        tracing::info!(
            transaction_id = %tx.id,
            kind = tx.kind.as_str(),
            sender_id = %tx.sender_id,
            amount = %MoneyCents::new(tx.amount_minor),
            "transaction created"
        );
    }

    fn transaction_completed(&self, tx: &Transaction) {
        tracing::info!(
            transaction_id = %tx.id,
            kind = tx.kind.as_str(),
            amount = %MoneyCents::new(tx.amount_minor),
            fee = %MoneyCents::new(tx.fee_minor),
            "transaction completed"
        );
    }

    fn transaction_failed(&self, tx: &Transaction, reason: &str) {
        tracing::warn!(
            transaction_id = %tx.id,
            kind = tx.kind.as_str(),
            amount = %MoneyCents::new(tx.amount_minor),
            reason,
            "transaction failed"
        );
    }

    fn transaction_cancelled(&self, tx: &Transaction, reason: &str) {
        tracing::info!(
            transaction_id = %tx.id,
            kind = tx.kind.as_str(),
            reason,
            "transaction cancelled"
        );
    }

    fn low_balance(&self, wallet: &Wallet, threshold_minor: i64) {
        tracing::warn!(
            wallet_id = %wallet.id,
            user_id = %wallet.user_id,
            balance = %MoneyCents::new(wallet.balance_minor),
            threshold = %MoneyCents::new(threshold_minor),
            "wallet balance under threshold"
        );
    }

    fn wallet_blocked(&self, wallet: &Wallet) {
        tracing::info!(wallet_id = %wallet.id, user_id = %wallet.user_id, "wallet blocked");
    }

    fn wallet_unblocked(&self, wallet: &Wallet) {
        tracing::info!(wallet_id = %wallet.id, user_id = %wallet.user_id, "wallet unblocked");
    }
}

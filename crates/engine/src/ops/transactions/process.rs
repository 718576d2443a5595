//! Settlement: applying a `Pending` transaction's balance changes.
//!
//! All wallet mutations of one `process` call happen inside a single
//! database transaction, so a transfer either debits and credits together
//! or not at all. The per-wallet guards are held across the whole
//! check-and-apply sequence (see `Engine::lock_wallets`), which rules out
//! two concurrent debits both passing a momentarily-true balance check.

use sea_orm::{TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, Transaction, TransactionKind, Wallet, transactions, wallets,
};

use super::super::{Engine, with_tx};

impl Engine {
    /// Applies a `Pending` transaction and transitions it to `Completed`.
    ///
    /// On a rule violation (insufficient funds, blocked wallet, missing
    /// wallet) the balance changes are rolled back, the transaction is
    /// marked `Failed` with the reason recorded, and the error is returned;
    /// nothing is retried. Calling `process` on a transaction that is no
    /// longer `Pending` fails with `InvalidState` and touches nothing.
    pub async fn process(&self, transaction_id: Uuid) -> ResultEngine<Transaction> {
        let snapshot = self.transaction(transaction_id).await?;
        if !snapshot.status.is_pending() {
            return Err(EngineError::InvalidState(format!(
                "transaction is {}, not pending",
                snapshot.status.as_str()
            )));
        }

        let mut owners = vec![snapshot.sender_id];
        if let Some(receiver_id) = snapshot.receiver_id {
            owners.push(receiver_id);
        }
        let _guards = self.lock_wallets(owners).await;

        let attempt = with_tx!(self, |db_tx| {
            let model = self.require_transaction(&db_tx, transaction_id).await?;
            let mut tx = Transaction::try_from(model)?;
            // The snapshot check above is only a fast path: the state may
            // have changed before the guards were acquired.
            if !tx.status.is_pending() {
                return Err(EngineError::InvalidState(format!(
                    "transaction is {}, not pending",
                    tx.status.as_str()
                )));
            }

            let debited = self.apply_balance_changes(&db_tx, &tx).await?;
            tx.complete()?;
            transactions::ActiveModel::from(&tx).update(&db_tx).await?;
            Ok((tx, debited))
        });

        match attempt {
            Ok((tx, debited)) => {
                self.notifier().transaction_completed(&tx);
                let threshold = self.low_balance_threshold_minor();
                for wallet in &debited {
                    if wallet.balance_minor < threshold {
                        self.notifier().low_balance(wallet, threshold);
                    }
                }
                Ok(tx)
            }
            Err(err @ (EngineError::InvalidState(_) | EngineError::Database(_))) => Err(err),
            Err(err) => {
                let reason = err.to_string();
                if let Some(failed) = self.mark_failed(transaction_id, &reason).await? {
                    self.notifier().transaction_failed(&failed, &reason);
                }
                Err(err)
            }
        }
    }

    /// Cancels a `Pending` transaction before any balance change happened.
    ///
    /// No wallet mutation has occurred at this point, so there is nothing
    /// to undo.
    pub async fn cancel(&self, transaction_id: Uuid, reason: &str) -> ResultEngine<Transaction> {
        let tx = with_tx!(self, |db_tx| {
            let model = self.require_transaction(&db_tx, transaction_id).await?;
            let mut tx = Transaction::try_from(model)?;
            tx.cancel(reason)?;
            transactions::ActiveModel::from(&tx).update(&db_tx).await?;
            Ok(tx)
        })?;

        self.notifier().transaction_cancelled(&tx, reason);
        Ok(tx)
    }

    /// Performs the balance changes for `tx` inside `db_tx`, re-validating
    /// funds and blocked flags at the moment of application.
    ///
    /// Returns the post-change snapshots of the wallets that were debited,
    /// for the low-balance event.
    async fn apply_balance_changes(
        &self,
        db_tx: &sea_orm::DatabaseTransaction,
        tx: &Transaction,
    ) -> ResultEngine<Vec<Wallet>> {
        match tx.kind {
            TransactionKind::Deposit => {
                let mut wallet =
                    Wallet::try_from(self.require_wallet_by_owner(db_tx, tx.sender_id).await?)?;
                wallet.credit(tx.amount_minor)?;
                wallets::ActiveModel::from(&wallet).update(db_tx).await?;
                Ok(Vec::new())
            }
            TransactionKind::Withdrawal => {
                let mut wallet =
                    Wallet::try_from(self.require_wallet_by_owner(db_tx, tx.sender_id).await?)?;
                wallet.debit(tx.total_debit_minor()?)?;
                wallets::ActiveModel::from(&wallet).update(db_tx).await?;
                Ok(vec![wallet])
            }
            TransactionKind::Transfer | TransactionKind::Payment => {
                let receiver_id = tx.receiver_id.ok_or_else(|| {
                    EngineError::BusinessRule(format!(
                        "receiver is required for {}",
                        tx.kind.as_str()
                    ))
                })?;
                let mut sender =
                    Wallet::try_from(self.require_wallet_by_owner(db_tx, tx.sender_id).await?)?;
                let mut receiver =
                    Wallet::try_from(self.require_wallet_by_owner(db_tx, receiver_id).await?)?;

                // The sender covers principal + fee; the receiver gets the
                // principal only. The difference stays with the platform.
                sender.debit(tx.total_debit_minor()?)?;
                receiver.credit(tx.amount_minor)?;

                wallets::ActiveModel::from(&sender).update(db_tx).await?;
                wallets::ActiveModel::from(&receiver).update(db_tx).await?;
                Ok(vec![sender])
            }
            TransactionKind::Refund => {
                let receiver_id = tx.receiver_id.ok_or_else(|| {
                    EngineError::BusinessRule("receiver is required for refund".to_string())
                })?;
                let mut merchant =
                    Wallet::try_from(self.require_wallet_by_owner(db_tx, tx.sender_id).await?)?;
                let mut payer =
                    Wallet::try_from(self.require_wallet_by_owner(db_tx, receiver_id).await?)?;

                merchant.debit(tx.amount_minor)?;
                payer.credit(tx.amount_minor)?;

                wallets::ActiveModel::from(&merchant).update(db_tx).await?;
                wallets::ActiveModel::from(&payer).update(db_tx).await?;
                Ok(vec![merchant])
            }
        }
    }

    /// Records a processing failure in its own small transaction, after the
    /// aborted mutation attempt rolled back.
    ///
    /// Returns `None` when the transaction reached a terminal state in the
    /// meantime; terminal states are never overwritten.
    async fn mark_failed(
        &self,
        transaction_id: Uuid,
        reason: &str,
    ) -> ResultEngine<Option<Transaction>> {
        with_tx!(self, |db_tx| {
            let model = self.require_transaction(&db_tx, transaction_id).await?;
            let mut tx = Transaction::try_from(model)?;
            if !tx.status.is_pending() {
                return Ok(None);
            }
            tx.fail(reason)?;
            transactions::ActiveModel::from(&tx).update(&db_tx).await?;
            Ok(Some(tx))
        })
    }
}

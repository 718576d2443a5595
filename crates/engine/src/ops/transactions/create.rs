//! Transaction creation.
//!
//! Every `create_*` operation validates the involved users and wallets,
//! computes the fee, and persists a `Pending` transaction. Nothing here
//! moves money: balances only change in `process`.

use sea_orm::{TransactionTrait, prelude::*};

use crate::{
    DepositCmd, EngineError, PaymentCmd, RefundCmd, ResultEngine, Transaction, TransactionKind,
    TransferCmd, Wallet, WithdrawalCmd, transactions,
};

use super::super::{Engine, with_tx};

impl Engine {
    /// Creates a `Pending` deposit for `cmd.user_id`.
    ///
    /// Deposits add money, so there is no funds check; the wallet must still
    /// be unblocked and the user active.
    pub async fn create_deposit(&self, cmd: DepositCmd) -> ResultEngine<Transaction> {
        let tx = with_tx!(self, |db_tx| {
            self.require_active_user(&db_tx, cmd.user_id).await?;
            let wallet = Wallet::try_from(self.require_wallet_by_owner(&db_tx, cmd.user_id).await?)?;
            if wallet.blocked {
                return Err(EngineError::WalletBlocked(wallet.id.to_string()));
            }

            let mut tx = Transaction::new(
                cmd.user_id,
                None,
                cmd.amount_minor,
                TransactionKind::Deposit,
                cmd.description,
            )?;
            let fee = self
                .fee_policy()
                .fee_minor(tx.kind, tx.amount_minor, cmd.risk_score)?;
            tx.apply_fee(fee)?;

            transactions::ActiveModel::from(&tx).insert(&db_tx).await?;
            Ok(tx)
        })?;

        self.notifier().transaction_created(&tx);
        Ok(tx)
    }

    /// Creates a `Pending` withdrawal for `cmd.user_id`.
    ///
    /// The wallet must cover principal **plus fee**, since both leave it at
    /// processing time.
    pub async fn create_withdrawal(&self, cmd: WithdrawalCmd) -> ResultEngine<Transaction> {
        let tx = with_tx!(self, |db_tx| {
            self.require_active_user(&db_tx, cmd.user_id).await?;
            let wallet = Wallet::try_from(self.require_wallet_by_owner(&db_tx, cmd.user_id).await?)?;

            let mut tx = Transaction::new(
                cmd.user_id,
                None,
                cmd.amount_minor,
                TransactionKind::Withdrawal,
                cmd.description,
            )?;
            let fee = self
                .fee_policy()
                .fee_minor(tx.kind, tx.amount_minor, cmd.risk_score)?;
            tx.apply_fee(fee)?;

            self.check_can_withdraw(&wallet, tx.total_debit_minor()?)?;

            transactions::ActiveModel::from(&tx).insert(&db_tx).await?;
            Ok(tx)
        })?;

        self.notifier().transaction_created(&tx);
        Ok(tx)
    }

    /// Creates a `Pending` transfer between two users.
    pub async fn create_transfer(&self, cmd: TransferCmd) -> ResultEngine<Transaction> {
        self.create_two_party(
            TransactionKind::Transfer,
            cmd.sender_id,
            cmd.receiver_id,
            cmd.amount_minor,
            cmd.description,
            cmd.risk_score,
        )
        .await
    }

    /// Creates a `Pending` merchant payment. Same shape as a transfer, with
    /// payer/merchant roles.
    pub async fn create_payment(&self, cmd: PaymentCmd) -> ResultEngine<Transaction> {
        self.create_two_party(
            TransactionKind::Payment,
            cmd.payer_id,
            cmd.merchant_id,
            cmd.amount_minor,
            cmd.description,
            cmd.risk_score,
        )
        .await
    }

    async fn create_two_party(
        &self,
        kind: TransactionKind,
        sender_id: uuid::Uuid,
        receiver_id: uuid::Uuid,
        amount_minor: i64,
        description: String,
        risk_score: Option<f64>,
    ) -> ResultEngine<Transaction> {
        if sender_id == receiver_id {
            return Err(EngineError::BusinessRule(
                "sender and receiver cannot be the same".to_string(),
            ));
        }

        let tx = with_tx!(self, |db_tx| {
            self.require_active_user(&db_tx, sender_id).await?;
            self.require_active_user(&db_tx, receiver_id).await?;

            let sender_wallet =
                Wallet::try_from(self.require_wallet_by_owner(&db_tx, sender_id).await?)?;
            let receiver_wallet =
                Wallet::try_from(self.require_wallet_by_owner(&db_tx, receiver_id).await?)?;

            let mut tx = Transaction::new(
                sender_id,
                Some(receiver_id),
                amount_minor,
                kind,
                description,
            )?;
            let fee = self
                .fee_policy()
                .fee_minor(tx.kind, tx.amount_minor, risk_score)?;
            tx.apply_fee(fee)?;

            self.check_can_withdraw(&sender_wallet, tx.total_debit_minor()?)?;
            if receiver_wallet.blocked {
                return Err(EngineError::WalletBlocked(format!(
                    "receiver wallet {}",
                    receiver_wallet.id
                )));
            }

            transactions::ActiveModel::from(&tx).insert(&db_tx).await?;
            Ok(tx)
        })?;

        self.notifier().transaction_created(&tx);
        Ok(tx)
    }

    /// Creates the `Pending` refund for a completed payment.
    ///
    /// Sender and receiver swap roles relative to the original, and only
    /// the original principal moves back: the payment's fee stays with the
    /// platform.
    pub async fn create_refund(&self, cmd: RefundCmd) -> ResultEngine<Transaction> {
        let tx = with_tx!(self, |db_tx| {
            let original_model = self
                .require_transaction(&db_tx, cmd.original_transaction_id)
                .await?;
            let original = Transaction::try_from(original_model)?;

            let mut refund = Transaction::refund_of(&original, &cmd.reason)?;

            let merchant_wallet =
                Wallet::try_from(self.require_wallet_by_owner(&db_tx, refund.sender_id).await?)?;
            if merchant_wallet.blocked {
                return Err(EngineError::WalletBlocked(format!(
                    "merchant wallet {}",
                    merchant_wallet.id
                )));
            }
            if !merchant_wallet.can_withdraw(refund.amount_minor) {
                return Err(EngineError::InsufficientFunds(
                    "merchant has insufficient funds for refund".to_string(),
                ));
            }

            let fee = self
                .fee_policy()
                .fee_minor(refund.kind, refund.amount_minor, None)?;
            refund.apply_fee(fee)?;

            transactions::ActiveModel::from(&refund).insert(&db_tx).await?;
            Ok(refund)
        })?;

        self.notifier().transaction_created(&tx);
        Ok(tx)
    }

    pub(super) fn check_can_withdraw(
        &self,
        wallet: &Wallet,
        amount_minor: i64,
    ) -> ResultEngine<()> {
        if wallet.blocked {
            return Err(EngineError::WalletBlocked(wallet.id.to_string()));
        }
        if !wallet.can_withdraw(amount_minor) {
            return Err(EngineError::InsufficientFunds(format!(
                "wallet {}",
                wallet.id
            )));
        }
        Ok(())
    }
}

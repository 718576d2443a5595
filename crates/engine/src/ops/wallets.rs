//! Wallet administration and queries.
//!
//! Balance changes never happen here: they only go through transaction
//! processing. These operations cover the blocked flag and read-side
//! lookups.

use sea_orm::{TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{ResultEngine, Wallet, wallets};

use super::{Engine, with_tx};

impl Engine {
    /// Return the wallet owned by `user_id` (point-in-time snapshot).
    pub async fn wallet_for_user(&self, user_id: Uuid) -> ResultEngine<Wallet> {
        with_tx!(self, |db_tx| {
            let model = self.require_wallet_by_owner(&db_tx, user_id).await?;
            Ok(Wallet::try_from(model)?)
        })
    }

    /// Return the balance of `user_id`'s wallet, in cents.
    pub async fn balance(&self, user_id: Uuid) -> ResultEngine<i64> {
        Ok(self.wallet_for_user(user_id).await?.balance_minor)
    }

    /// Whether `user_id`'s wallet could cover a debit of `amount_minor`
    /// right now. Advisory only: `process` re-checks under the wallet lock.
    pub async fn has_sufficient_funds(
        &self,
        user_id: Uuid,
        amount_minor: i64,
    ) -> ResultEngine<bool> {
        Ok(self
            .wallet_for_user(user_id)
            .await?
            .can_withdraw(amount_minor))
    }

    /// Blocks or unblocks the wallet owned by `user_id`. Idempotent.
    ///
    /// Raises the matching wallet event after the change commits.
    pub async fn set_wallet_blocked(&self, user_id: Uuid, blocked: bool) -> ResultEngine<Wallet> {
        let _guards = self.lock_wallets(vec![user_id]).await;

        let wallet = with_tx!(self, |db_tx| {
            let model = self.require_wallet_by_owner(&db_tx, user_id).await?;
            let mut wallet = Wallet::try_from(model)?;
            if blocked {
                wallet.block();
            } else {
                wallet.unblock();
            }
            wallets::ActiveModel::from(&wallet).update(&db_tx).await?;
            Ok(wallet)
        })?;

        if blocked {
            self.notifier().wallet_blocked(&wallet);
        } else {
            self.notifier().wallet_unblocked(&wallet);
        }
        Ok(wallet)
    }
}

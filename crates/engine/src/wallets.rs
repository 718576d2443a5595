//! The module contains the `Wallet` struct and its implementation.

use chrono::{DateTime, Utc};

use sea_orm::entity::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// A wallet.
///
/// The balance holder of a registered party. Exactly one wallet exists per
/// party, created at onboarding with a zero balance. The balance never goes
/// negative and changes only through [`credit`] and [`debit`]; a blocked
/// wallet rejects both until unblocked.
///
/// [`credit`]: Wallet::credit
/// [`debit`]: Wallet::debit
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Wallet {
    /// Stable identifier for this wallet.
    pub id: Uuid,
    /// The owning party.
    pub user_id: Uuid,
    /// Balance in cents, always >= 0.
    pub balance_minor: i64,
    pub blocked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Wallet {
    /// Creates the zero-balance wallet for a newly registered party.
    pub fn new(user_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            balance_minor: 0,
            blocked: false,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    /// Pure predicate: can `amount_minor` be debited right now?
    ///
    /// Combines the blocked check and the sufficiency check, so callers can
    /// reject obviously doomed transactions before recording them.
    pub fn can_withdraw(&self, amount_minor: i64) -> bool {
        !self.blocked && amount_minor > 0 && self.balance_minor >= amount_minor
    }

    /// Increases the balance.
    pub fn credit(&mut self, amount_minor: i64) -> ResultEngine<()> {
        if amount_minor <= 0 {
            return Err(EngineError::InvalidAmount(
                "amount_minor must be > 0".to_string(),
            ));
        }
        if self.blocked {
            return Err(EngineError::WalletBlocked(self.id.to_string()));
        }
        self.balance_minor = self
            .balance_minor
            .checked_add(amount_minor)
            .ok_or_else(|| EngineError::InvalidAmount("amount too large".to_string()))?;
        self.updated_at = Some(Utc::now());
        Ok(())
    }

    /// Decreases the balance.
    pub fn debit(&mut self, amount_minor: i64) -> ResultEngine<()> {
        if amount_minor <= 0 {
            return Err(EngineError::InvalidAmount(
                "amount_minor must be > 0".to_string(),
            ));
        }
        if self.blocked {
            return Err(EngineError::WalletBlocked(self.id.to_string()));
        }
        if self.balance_minor < amount_minor {
            return Err(EngineError::InsufficientFunds(format!(
                "wallet {}",
                self.id
            )));
        }
        self.balance_minor -= amount_minor;
        self.updated_at = Some(Utc::now());
        Ok(())
    }

    /// Blocks the wallet. Idempotent.
    pub fn block(&mut self) {
        self.blocked = true;
        self.updated_at = Some(Utc::now());
    }

    /// Unblocks the wallet. Idempotent.
    pub fn unblock(&mut self) {
        self.blocked = false;
        self.updated_at = Some(Utc::now());
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "wallets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub balance_minor: i64,
    pub blocked: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Wallet> for ActiveModel {
    fn from(value: &Wallet) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            user_id: ActiveValue::Set(value.user_id.to_string()),
            balance_minor: ActiveValue::Set(value.balance_minor),
            blocked: ActiveValue::Set(value.blocked),
            created_at: ActiveValue::Set(value.created_at),
            updated_at: ActiveValue::Set(value.updated_at),
        }
    }
}

impl TryFrom<Model> for Wallet {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::InvalidId("invalid wallet id".to_string()))?,
            user_id: Uuid::parse_str(&model.user_id)
                .map_err(|_| EngineError::InvalidId("invalid user id".to_string()))?,
            balance_minor: model.balance_minor,
            blocked: model.blocked,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wallet() -> Wallet {
        Wallet::new(Uuid::new_v4())
    }

    #[test]
    fn new_wallet_starts_empty_and_unblocked() {
        let wallet = wallet();
        assert_eq!(wallet.balance_minor, 0);
        assert!(!wallet.blocked);
    }

    #[test]
    fn credit_and_debit_move_the_balance() {
        let mut wallet = wallet();
        wallet.credit(10_000).unwrap();
        assert_eq!(wallet.balance_minor, 10_000);
        wallet.debit(2_500).unwrap();
        assert_eq!(wallet.balance_minor, 7_500);
        assert!(wallet.updated_at.is_some());
    }

    #[test]
    fn debit_rejects_overdraft() {
        let mut wallet = wallet();
        wallet.credit(10_000).unwrap();
        let err = wallet.debit(15_000).unwrap_err();
        assert!(matches!(err, EngineError::InsufficientFunds(_)));
        assert_eq!(wallet.balance_minor, 10_000);
    }

    #[test]
    fn non_positive_amounts_are_rejected() {
        let mut wallet = wallet();
        assert!(wallet.credit(0).is_err());
        assert!(wallet.credit(-1).is_err());
        assert!(wallet.debit(0).is_err());
        assert!(wallet.debit(-1).is_err());
    }

    #[test]
    fn blocked_wallet_rejects_credit_and_debit() {
        let mut wallet = wallet();
        wallet.credit(1_000).unwrap();
        wallet.block();

        assert!(matches!(
            wallet.credit(100).unwrap_err(),
            EngineError::WalletBlocked(_)
        ));
        assert!(matches!(
            wallet.debit(100).unwrap_err(),
            EngineError::WalletBlocked(_)
        ));
        assert!(!wallet.can_withdraw(100));

        wallet.unblock();
        wallet.debit(100).unwrap();
        assert_eq!(wallet.balance_minor, 900);
    }

    #[test]
    fn block_and_unblock_are_idempotent() {
        let mut wallet = wallet();
        wallet.block();
        wallet.block();
        assert!(wallet.blocked);
        wallet.unblock();
        wallet.unblock();
        assert!(!wallet.blocked);
    }

    #[test]
    fn can_withdraw_combines_all_checks() {
        let mut wallet = wallet();
        wallet.credit(1_000).unwrap();
        assert!(wallet.can_withdraw(1_000));
        assert!(!wallet.can_withdraw(1_001));
        assert!(!wallet.can_withdraw(0));
        assert!(!wallet.can_withdraw(-5));
    }
}

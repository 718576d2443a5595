//! Transaction primitives.
//!
//! A `Transaction` records the intent to move money: a principal amount, an
//! engine-computed fee kept apart from it, the two parties involved, and a
//! status that moves from `Pending` to exactly one terminal state.
//!
//! The principal is what the receiver is owed; the fee is what the platform
//! retains. They are stored as separate fields so a transfer never credits
//! the receiver a fee-inflated amount.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
    Transfer,
    Payment,
    Refund,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Withdrawal => "withdrawal",
            Self::Transfer => "transfer",
            Self::Payment => "payment",
            Self::Refund => "refund",
        }
    }

    /// Whether this kind moves money between two parties.
    ///
    /// Deposits and withdrawals involve the sender's wallet only; everything
    /// else requires a receiver.
    pub fn requires_receiver(self) -> bool {
        matches!(self, Self::Transfer | Self::Payment | Self::Refund)
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "deposit" => Ok(Self::Deposit),
            "withdrawal" => Ok(Self::Withdrawal),
            "transfer" => Ok(Self::Transfer),
            "payment" => Ok(Self::Payment),
            "refund" => Ok(Self::Refund),
            other => Err(EngineError::InvalidState(format!(
                "invalid transaction kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
    Cancelled,
}

impl TransactionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn is_pending(self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Terminal states never transition again.
    pub fn is_terminal(self) -> bool {
        !self.is_pending()
    }
}

impl TryFrom<&str> for TransactionStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(EngineError::InvalidState(format!(
                "invalid transaction status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Option<Uuid>,
    /// Principal in cents, strictly positive.
    pub amount_minor: i64,
    /// Fee in cents, engine-computed, never folded into the principal.
    pub fee_minor: i64,
    pub kind: TransactionKind,
    pub status: TransactionStatus,
    pub description: String,
    pub created_at: DateTime<Utc>,
    /// Set when the transaction reaches a terminal state.
    pub completed_at: Option<DateTime<Utc>>,
    /// Reason recorded by `fail` or `cancel`.
    pub failure_reason: Option<String>,
    /// For refunds, the completed payment being reversed.
    pub refunded_transaction_id: Option<Uuid>,
}

impl Transaction {
    /// Creates a `Pending` transaction, establishing the full invariants:
    /// positive principal, receiver present exactly when the kind needs one,
    /// and distinct parties.
    pub fn new(
        sender_id: Uuid,
        receiver_id: Option<Uuid>,
        amount_minor: i64,
        kind: TransactionKind,
        description: String,
    ) -> ResultEngine<Self> {
        if amount_minor <= 0 {
            return Err(EngineError::InvalidAmount(
                "amount_minor must be > 0".to_string(),
            ));
        }
        if kind.requires_receiver() && receiver_id.is_none() {
            return Err(EngineError::BusinessRule(format!(
                "receiver is required for {}",
                kind.as_str()
            )));
        }
        if !kind.requires_receiver() && receiver_id.is_some() {
            return Err(EngineError::BusinessRule(format!(
                "receiver is not allowed for {}",
                kind.as_str()
            )));
        }
        if receiver_id == Some(sender_id) {
            return Err(EngineError::BusinessRule(
                "sender and receiver cannot be the same".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            sender_id,
            receiver_id,
            amount_minor,
            fee_minor: 0,
            kind,
            status: TransactionStatus::Pending,
            description,
            created_at: Utc::now(),
            completed_at: None,
            failure_reason: None,
            refunded_transaction_id: None,
        })
    }

    /// Creates the reversing transaction for a completed payment.
    ///
    /// The refund's sender is the payment's receiver (the merchant) and its
    /// receiver is the payment's sender (the payer); it carries the original
    /// principal. Fees are not refunded.
    pub fn refund_of(original: &Transaction, reason: &str) -> ResultEngine<Self> {
        if original.kind != TransactionKind::Payment {
            return Err(EngineError::BusinessRule(
                "can only refund payment transactions".to_string(),
            ));
        }
        if original.status != TransactionStatus::Completed {
            return Err(EngineError::BusinessRule(
                "can only refund completed transactions".to_string(),
            ));
        }
        let merchant_id = original.receiver_id.ok_or_else(|| {
            EngineError::BusinessRule("original payment has no receiver".to_string())
        })?;

        let description = format!("Refund for transaction {} - {reason}", original.id);
        let mut refund = Self::new(
            merchant_id,
            Some(original.sender_id),
            original.amount_minor,
            TransactionKind::Refund,
            description,
        )?;
        refund.refunded_transaction_id = Some(original.id);
        Ok(refund)
    }

    fn require_pending(&self) -> ResultEngine<()> {
        if !self.status.is_pending() {
            return Err(EngineError::InvalidState(format!(
                "transaction is {}, not pending",
                self.status.as_str()
            )));
        }
        Ok(())
    }

    /// Records the fee. Legal only while `Pending`.
    pub fn apply_fee(&mut self, fee_minor: i64) -> ResultEngine<()> {
        self.require_pending()?;
        if fee_minor < 0 {
            return Err(EngineError::InvalidAmount(
                "fee_minor must be >= 0".to_string(),
            ));
        }
        self.fee_minor = fee_minor;
        Ok(())
    }

    /// Principal plus fee: what the sender's wallet must cover.
    pub fn total_debit_minor(&self) -> ResultEngine<i64> {
        self.amount_minor
            .checked_add(self.fee_minor)
            .ok_or_else(|| EngineError::InvalidAmount("amount too large".to_string()))
    }

    /// Transitions `Pending` -> `Completed`.
    pub fn complete(&mut self) -> ResultEngine<()> {
        self.require_pending()?;
        self.status = TransactionStatus::Completed;
        self.completed_at = Some(Utc::now());
        Ok(())
    }

    /// Transitions `Pending` -> `Failed`, recording the reason.
    pub fn fail(&mut self, reason: &str) -> ResultEngine<()> {
        self.require_pending()?;
        self.status = TransactionStatus::Failed;
        self.failure_reason = Some(reason.to_string());
        self.completed_at = Some(Utc::now());
        Ok(())
    }

    /// Transitions `Pending` -> `Cancelled`, recording the reason.
    ///
    /// Cancellation aborts a transaction that has not been applied to any
    /// wallet, so there is nothing to undo.
    pub fn cancel(&mut self, reason: &str) -> ResultEngine<()> {
        self.require_pending()?;
        self.status = TransactionStatus::Cancelled;
        self.failure_reason = Some(reason.to_string());
        self.completed_at = Some(Utc::now());
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub sender_id: String,
    pub receiver_id: Option<String>,
    pub amount_minor: i64,
    pub fee_minor: i64,
    pub kind: String,
    pub status: String,
    pub description: String,
    pub created_at: DateTimeUtc,
    pub completed_at: Option<DateTimeUtc>,
    pub failure_reason: Option<String>,
    pub refunded_transaction_id: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::SenderId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Sender,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sender.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            sender_id: ActiveValue::Set(tx.sender_id.to_string()),
            receiver_id: ActiveValue::Set(tx.receiver_id.map(|id| id.to_string())),
            amount_minor: ActiveValue::Set(tx.amount_minor),
            fee_minor: ActiveValue::Set(tx.fee_minor),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            status: ActiveValue::Set(tx.status.as_str().to_string()),
            description: ActiveValue::Set(tx.description.clone()),
            created_at: ActiveValue::Set(tx.created_at),
            completed_at: ActiveValue::Set(tx.completed_at),
            failure_reason: ActiveValue::Set(tx.failure_reason.clone()),
            refunded_transaction_id: ActiveValue::Set(
                tx.refunded_transaction_id.map(|id| id.to_string()),
            ),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::InvalidId("invalid transaction id".to_string()))?,
            sender_id: Uuid::parse_str(&model.sender_id)
                .map_err(|_| EngineError::InvalidId("invalid sender id".to_string()))?,
            receiver_id: model
                .receiver_id
                .as_deref()
                .map(Uuid::parse_str)
                .transpose()
                .map_err(|_| EngineError::InvalidId("invalid receiver id".to_string()))?,
            amount_minor: model.amount_minor,
            fee_minor: model.fee_minor,
            kind: TransactionKind::try_from(model.kind.as_str())?,
            status: TransactionStatus::try_from(model.status.as_str())?,
            description: model.description,
            created_at: model.created_at,
            completed_at: model.completed_at,
            failure_reason: model.failure_reason,
            refunded_transaction_id: model
                .refunded_transaction_id
                .as_deref()
                .map(Uuid::parse_str)
                .transpose()
                .map_err(|_| EngineError::InvalidId("invalid refunded transaction id".to_string()))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transfer() -> Transaction {
        Transaction::new(
            Uuid::new_v4(),
            Some(Uuid::new_v4()),
            5000,
            TransactionKind::Transfer,
            "rent".to_string(),
        )
        .unwrap()
    }

    #[test]
    fn new_rejects_non_positive_amounts() {
        let err = Transaction::new(
            Uuid::new_v4(),
            None,
            0,
            TransactionKind::Deposit,
            String::new(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidAmount(_)));
    }

    #[test]
    fn new_requires_receiver_for_two_party_kinds() {
        for kind in [
            TransactionKind::Transfer,
            TransactionKind::Payment,
            TransactionKind::Refund,
        ] {
            let err =
                Transaction::new(Uuid::new_v4(), None, 100, kind, String::new()).unwrap_err();
            assert!(matches!(err, EngineError::BusinessRule(_)), "{kind:?}");
        }
    }

    #[test]
    fn new_forbids_receiver_for_single_party_kinds() {
        for kind in [TransactionKind::Deposit, TransactionKind::Withdrawal] {
            let err = Transaction::new(
                Uuid::new_v4(),
                Some(Uuid::new_v4()),
                100,
                kind,
                String::new(),
            )
            .unwrap_err();
            assert!(matches!(err, EngineError::BusinessRule(_)), "{kind:?}");
        }
    }

    #[test]
    fn new_rejects_self_transfer() {
        let id = Uuid::new_v4();
        let err = Transaction::new(
            id,
            Some(id),
            100,
            TransactionKind::Transfer,
            String::new(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::BusinessRule(_)));
    }

    #[test]
    fn complete_is_legal_only_from_pending() {
        let mut tx = transfer();
        tx.complete().unwrap();
        assert_eq!(tx.status, TransactionStatus::Completed);
        assert!(tx.completed_at.is_some());

        assert!(matches!(
            tx.complete().unwrap_err(),
            EngineError::InvalidState(_)
        ));
        assert!(matches!(
            tx.fail("late").unwrap_err(),
            EngineError::InvalidState(_)
        ));
        assert!(matches!(
            tx.cancel("late").unwrap_err(),
            EngineError::InvalidState(_)
        ));
    }

    #[test]
    fn fail_records_reason_and_is_terminal() {
        let mut tx = transfer();
        tx.fail("insufficient funds").unwrap();
        assert_eq!(tx.status, TransactionStatus::Failed);
        assert_eq!(tx.failure_reason.as_deref(), Some("insufficient funds"));
        assert!(tx.complete().is_err());
    }

    #[test]
    fn cancel_records_reason_and_is_terminal() {
        let mut tx = transfer();
        tx.cancel("user request").unwrap();
        assert_eq!(tx.status, TransactionStatus::Cancelled);
        assert_eq!(tx.failure_reason.as_deref(), Some("user request"));
        assert!(tx.cancel("again").is_err());
    }

    #[test]
    fn apply_fee_keeps_principal_untouched() {
        let mut tx = transfer();
        tx.apply_fee(250).unwrap();
        assert_eq!(tx.amount_minor, 5000);
        assert_eq!(tx.fee_minor, 250);
        assert_eq!(tx.total_debit_minor().unwrap(), 5250);

        tx.complete().unwrap();
        assert!(matches!(
            tx.apply_fee(100).unwrap_err(),
            EngineError::InvalidState(_)
        ));
    }

    #[test]
    fn apply_fee_rejects_negative_fees() {
        let mut tx = transfer();
        assert!(matches!(
            tx.apply_fee(-1).unwrap_err(),
            EngineError::InvalidAmount(_)
        ));
    }

    #[test]
    fn refund_of_reverses_parties_and_carries_principal() {
        let payer = Uuid::new_v4();
        let merchant = Uuid::new_v4();
        let mut payment = Transaction::new(
            payer,
            Some(merchant),
            8990,
            TransactionKind::Payment,
            "order 42".to_string(),
        )
        .unwrap();
        payment.apply_fee(90).unwrap();
        payment.complete().unwrap();

        let refund = Transaction::refund_of(&payment, "defective item").unwrap();
        assert_eq!(refund.sender_id, merchant);
        assert_eq!(refund.receiver_id, Some(payer));
        assert_eq!(refund.amount_minor, 8990);
        assert_eq!(refund.fee_minor, 0);
        assert_eq!(refund.refunded_transaction_id, Some(payment.id));
        assert_eq!(refund.status, TransactionStatus::Pending);
    }

    #[test]
    fn refund_of_rejects_non_payments_and_non_completed() {
        let mut transfer = transfer();
        transfer.complete().unwrap();
        assert!(matches!(
            Transaction::refund_of(&transfer, "no").unwrap_err(),
            EngineError::BusinessRule(_)
        ));

        let pending_payment = Transaction::new(
            Uuid::new_v4(),
            Some(Uuid::new_v4()),
            100,
            TransactionKind::Payment,
            String::new(),
        )
        .unwrap();
        assert!(matches!(
            Transaction::refund_of(&pending_payment, "no").unwrap_err(),
            EngineError::BusinessRule(_)
        ));
    }

    #[test]
    fn model_round_trip_preserves_fields() {
        let mut tx = transfer();
        tx.apply_fee(250).unwrap();
        let model_active = ActiveModel::from(&tx);
        let model = Model {
            id: model_active.id.unwrap(),
            sender_id: model_active.sender_id.unwrap(),
            receiver_id: model_active.receiver_id.unwrap(),
            amount_minor: model_active.amount_minor.unwrap(),
            fee_minor: model_active.fee_minor.unwrap(),
            kind: model_active.kind.unwrap(),
            status: model_active.status.unwrap(),
            description: model_active.description.unwrap(),
            created_at: model_active.created_at.unwrap(),
            completed_at: model_active.completed_at.unwrap(),
            failure_reason: model_active.failure_reason.unwrap(),
            refunded_transaction_id: model_active.refunded_transaction_id.unwrap(),
        };
        let back = Transaction::try_from(model).unwrap();
        assert_eq!(back, tx);
    }
}

//! Command structs for engine operations.
//!
//! These types group parameters for write operations, keeping call sites
//! readable and avoiding long argument lists.

use uuid::Uuid;

/// Register a new user and create their zero-balance wallet.
#[derive(Clone, Debug)]
pub struct RegisterUserCmd {
    pub name: String,
    pub email: String,
    pub document: String,
    pub phone_number: String,
}

impl RegisterUserCmd {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        document: impl Into<String>,
        phone_number: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            document: document.into(),
            phone_number: phone_number.into(),
        }
    }
}

/// Create a deposit transaction.
#[derive(Clone, Debug)]
pub struct DepositCmd {
    pub user_id: Uuid,
    pub amount_minor: i64,
    pub description: String,
    /// Risk score in `[0, 1]`, consumed by the risk-adjusted fee policy.
    pub risk_score: Option<f64>,
}

impl DepositCmd {
    #[must_use]
    pub fn new(user_id: Uuid, amount_minor: i64, description: impl Into<String>) -> Self {
        Self {
            user_id,
            amount_minor,
            description: description.into(),
            risk_score: None,
        }
    }

    #[must_use]
    pub fn risk_score(mut self, score: f64) -> Self {
        self.risk_score = Some(score);
        self
    }
}

/// Create a withdrawal transaction.
#[derive(Clone, Debug)]
pub struct WithdrawalCmd {
    pub user_id: Uuid,
    pub amount_minor: i64,
    pub description: String,
    pub risk_score: Option<f64>,
}

impl WithdrawalCmd {
    #[must_use]
    pub fn new(user_id: Uuid, amount_minor: i64, description: impl Into<String>) -> Self {
        Self {
            user_id,
            amount_minor,
            description: description.into(),
            risk_score: None,
        }
    }

    #[must_use]
    pub fn risk_score(mut self, score: f64) -> Self {
        self.risk_score = Some(score);
        self
    }
}

/// Create a transfer between two users.
#[derive(Clone, Debug)]
pub struct TransferCmd {
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub amount_minor: i64,
    pub description: String,
    pub risk_score: Option<f64>,
}

impl TransferCmd {
    #[must_use]
    pub fn new(
        sender_id: Uuid,
        receiver_id: Uuid,
        amount_minor: i64,
        description: impl Into<String>,
    ) -> Self {
        Self {
            sender_id,
            receiver_id,
            amount_minor,
            description: description.into(),
            risk_score: None,
        }
    }

    #[must_use]
    pub fn risk_score(mut self, score: f64) -> Self {
        self.risk_score = Some(score);
        self
    }
}

/// Create a merchant payment.
#[derive(Clone, Debug)]
pub struct PaymentCmd {
    pub payer_id: Uuid,
    pub merchant_id: Uuid,
    pub amount_minor: i64,
    pub description: String,
    pub risk_score: Option<f64>,
}

impl PaymentCmd {
    #[must_use]
    pub fn new(
        payer_id: Uuid,
        merchant_id: Uuid,
        amount_minor: i64,
        description: impl Into<String>,
    ) -> Self {
        Self {
            payer_id,
            merchant_id,
            amount_minor,
            description: description.into(),
            risk_score: None,
        }
    }

    #[must_use]
    pub fn risk_score(mut self, score: f64) -> Self {
        self.risk_score = Some(score);
        self
    }
}

/// Create the reversing transaction for a completed payment.
#[derive(Clone, Debug)]
pub struct RefundCmd {
    pub original_transaction_id: Uuid,
    pub reason: String,
}

impl RefundCmd {
    #[must_use]
    pub fn new(original_transaction_id: Uuid, reason: impl Into<String>) -> Self {
        Self {
            original_transaction_id,
            reason: reason.into(),
        }
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod user {
    use super::*;

    /// Request body for registering a user.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserNew {
        pub name: String,
        pub email: String,
        /// National identifier (CPF/CNPJ-style).
        pub document: String,
        pub phone_number: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub id: Uuid,
        pub name: String,
        pub email: String,
        pub document: String,
        pub phone_number: String,
        pub active: bool,
        pub created_at: DateTime<Utc>,
    }
}

pub mod wallet {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WalletView {
        pub id: Uuid,
        pub user_id: Uuid,
        /// Balance in cents.
        pub balance_minor: i64,
        pub blocked: bool,
        pub updated_at: Option<DateTime<Utc>>,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionKind {
        Deposit,
        Withdrawal,
        Transfer,
        Payment,
        Refund,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionStatus {
        Pending,
        Completed,
        Failed,
        Cancelled,
    }

    /// Request body for a deposit or withdrawal.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SingleParty {
        pub user_id: Uuid,
        /// Principal in cents, > 0.
        pub amount_minor: i64,
        pub description: Option<String>,
        /// Risk score in `[0, 1]`, consumed by the risk-adjusted fee policy.
        pub risk_score: Option<f64>,
    }

    /// Request body for a transfer or payment.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TwoParty {
        pub sender_id: Uuid,
        pub receiver_id: Uuid,
        /// Principal in cents, > 0.
        pub amount_minor: i64,
        pub description: Option<String>,
        pub risk_score: Option<f64>,
    }

    /// Request body for refunding a completed payment.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct RefundNew {
        pub original_transaction_id: Uuid,
        pub reason: String,
    }

    /// Request body for cancelling a pending transaction.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionCancel {
        pub reason: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        pub sender_id: Uuid,
        pub receiver_id: Option<Uuid>,
        /// Principal in cents.
        pub amount_minor: i64,
        /// Fee in cents, retained by the platform.
        pub fee_minor: i64,
        pub kind: TransactionKind,
        pub status: TransactionStatus,
        pub description: String,
        pub created_at: DateTime<Utc>,
        pub completed_at: Option<DateTime<Utc>>,
        pub failure_reason: Option<String>,
        pub refunded_transaction_id: Option<Uuid>,
    }

    /// Query parameters for the transaction list endpoint.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionList {
        /// Matches sender or receiver.
        pub user_id: Option<Uuid>,
        pub sender_id: Option<Uuid>,
        pub receiver_id: Option<Uuid>,
        pub status: Option<TransactionStatus>,
        pub kind: Option<TransactionKind>,
        pub from: Option<DateTime<Utc>>,
        pub to: Option<DateTime<Utc>>,
        pub limit: Option<u64>,
        /// Opaque pagination cursor (base64), from `next_cursor`.
        ///
        /// Newest → older pagination.
        pub cursor: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionListResponse {
        pub transactions: Vec<TransactionView>,
        /// Opaque cursor for fetching the next page (older items).
        pub next_cursor: Option<String>,
    }
}

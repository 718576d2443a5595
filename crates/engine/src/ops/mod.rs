use std::collections::HashMap;
use std::sync::Arc;

use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::{EngineError, FeePolicy, LogNotifier, NotificationSink, ResultEngine};

mod access;
mod transactions;
mod users;
mod wallets;

pub use transactions::TransactionListFilter;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result: $crate::ResultEngine<_> = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Default low-balance threshold: 10.00.
const DEFAULT_LOW_BALANCE_THRESHOLD_MINOR: i64 = 1_000;

pub struct Engine {
    database: DatabaseConnection,
    notifier: Arc<dyn NotificationSink>,
    fee_policy: FeePolicy,
    low_balance_threshold_minor: i64,
    /// One mutex per wallet owner, created lazily.
    ///
    /// `process` holds the guards for every involved wallet across the whole
    /// check-and-apply sequence, so two concurrent debits can never both
    /// pass a balance check that was true only momentarily.
    wallet_locks: tokio::sync::Mutex<HashMap<Uuid, Arc<tokio::sync::Mutex<()>>>>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("fee_policy", &self.fee_policy)
            .field(
                "low_balance_threshold_minor",
                &self.low_balance_threshold_minor,
            )
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub(crate) fn notifier(&self) -> &dyn NotificationSink {
        self.notifier.as_ref()
    }

    pub(crate) fn fee_policy(&self) -> FeePolicy {
        self.fee_policy
    }

    pub(crate) fn low_balance_threshold_minor(&self) -> i64 {
        self.low_balance_threshold_minor
    }

    /// Acquires the per-wallet guards for `owner_ids`, always in sorted
    /// order so two `process` calls touching the same pair of wallets can
    /// never deadlock against each other.
    pub(crate) async fn lock_wallets(
        &self,
        mut owner_ids: Vec<Uuid>,
    ) -> Vec<tokio::sync::OwnedMutexGuard<()>> {
        owner_ids.sort();
        owner_ids.dedup();

        let locks: Vec<Arc<tokio::sync::Mutex<()>>> = {
            let mut registry = self.wallet_locks.lock().await;
            owner_ids
                .iter()
                .map(|id| Arc::clone(registry.entry(*id).or_default()))
                .collect()
        };

        let mut guards = Vec::with_capacity(locks.len());
        for lock in locks {
            guards.push(lock.lock_owned().await);
        }
        guards
    }
}

fn normalize_required_text(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidAmount(format!(
            "{label} must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

/// The builder for `Engine`
pub struct EngineBuilder {
    database: DatabaseConnection,
    notifier: Arc<dyn NotificationSink>,
    fee_policy: FeePolicy,
    low_balance_threshold_minor: i64,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            database: DatabaseConnection::default(),
            notifier: Arc::new(LogNotifier),
            fee_policy: FeePolicy::default(),
            low_balance_threshold_minor: DEFAULT_LOW_BALANCE_THRESHOLD_MINOR,
        }
    }
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Replace the default log-only notification sink.
    pub fn notifier(mut self, notifier: Arc<dyn NotificationSink>) -> EngineBuilder {
        self.notifier = notifier;
        self
    }

    /// Select the fee policy for this deployment.
    pub fn fee_policy(mut self, policy: FeePolicy) -> EngineBuilder {
        self.fee_policy = policy;
        self
    }

    /// Balance under which a debit raises the low-balance event, in cents.
    pub fn low_balance_threshold(mut self, threshold_minor: i64) -> EngineBuilder {
        self.low_balance_threshold_minor = threshold_minor;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            notifier: self.notifier,
            fee_policy: self.fee_policy,
            low_balance_threshold_minor: self.low_balance_threshold_minor,
            wallet_locks: tokio::sync::Mutex::new(HashMap::new()),
        })
    }
}

//! The engine raises its events only after the matching state change is
//! durable; these tests watch them through a recording sink.

use std::sync::{Arc, Mutex};

use sea_orm::Database;

use engine::{
    DepositCmd, Engine, NotificationSink, RegisterUserCmd, Transaction, TransferCmd, Wallet,
    WithdrawalCmd,
};
use migration::MigratorTrait;
use uuid::Uuid;

#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<String>>,
}

impl RecordingSink {
    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }

    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl NotificationSink for RecordingSink {
    fn transaction_created(&self, tx: &Transaction) {
        self.push(format!("created:{}", tx.kind.as_str()));
    }

    fn transaction_completed(&self, tx: &Transaction) {
        self.push(format!("completed:{}", tx.kind.as_str()));
    }

    fn transaction_failed(&self, tx: &Transaction, reason: &str) {
        self.push(format!("failed:{}:{reason}", tx.kind.as_str()));
    }

    fn transaction_cancelled(&self, tx: &Transaction, reason: &str) {
        self.push(format!("cancelled:{}:{reason}", tx.kind.as_str()));
    }

    fn low_balance(&self, wallet: &Wallet, threshold_minor: i64) {
        self.push(format!(
            "low_balance:{}:{threshold_minor}",
            wallet.balance_minor
        ));
    }

    fn wallet_blocked(&self, wallet: &Wallet) {
        self.push(format!("blocked:{}", wallet.user_id));
    }

    fn wallet_unblocked(&self, wallet: &Wallet) {
        self.push(format!("unblocked:{}", wallet.user_id));
    }
}

async fn engine_with_sink() -> (Engine, Arc<RecordingSink>) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let sink = Arc::new(RecordingSink::default());
    let engine = Engine::builder()
        .database(db)
        .notifier(sink.clone())
        .low_balance_threshold(2_000)
        .build()
        .await
        .unwrap();
    (engine, sink)
}

async fn register(engine: &Engine, name: &str) -> Uuid {
    engine
        .register_user(RegisterUserCmd::new(
            name,
            format!("{name}@example.com"),
            format!("doc-{name}"),
            "",
        ))
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn lifecycle_events_fire_in_order() {
    let (engine, sink) = engine_with_sink().await;
    let alice = register(&engine, "alice").await;
    let bob = register(&engine, "bob").await;

    let deposit = engine
        .create_deposit(DepositCmd::new(alice, 10_000, "seed"))
        .await
        .unwrap();
    engine.process(deposit.id).await.unwrap();

    let cancelled = engine
        .create_transfer(TransferCmd::new(alice, bob, 1_000, "nope"))
        .await
        .unwrap();
    engine.cancel(cancelled.id, "typo").await.unwrap();

    let events = sink.events();
    assert_eq!(
        events,
        vec![
            "created:deposit",
            "completed:deposit",
            "created:transfer",
            "cancelled:transfer:typo",
        ]
    );
}

#[tokio::test]
async fn failed_settlement_raises_the_failure_event() {
    let (engine, sink) = engine_with_sink().await;
    let alice = register(&engine, "alice").await;

    let deposit = engine
        .create_deposit(DepositCmd::new(alice, 10_000, "seed"))
        .await
        .unwrap();
    engine.process(deposit.id).await.unwrap();

    let first = engine
        .create_withdrawal(WithdrawalCmd::new(alice, 6_000, "first"))
        .await
        .unwrap();
    let second = engine
        .create_withdrawal(WithdrawalCmd::new(alice, 6_000, "second"))
        .await
        .unwrap();
    engine.process(first.id).await.unwrap();
    engine.process(second.id).await.unwrap_err();

    let events = sink.events();
    assert!(events.iter().any(|e| e.starts_with("failed:withdrawal:")));
}

#[tokio::test]
async fn debit_below_threshold_raises_low_balance() {
    let (engine, sink) = engine_with_sink().await;
    let alice = register(&engine, "alice").await;

    let deposit = engine
        .create_deposit(DepositCmd::new(alice, 10_000, "seed"))
        .await
        .unwrap();
    engine.process(deposit.id).await.unwrap();

    // 82.00 + 3.82 fee leaves 14.18, under the 20.00 threshold.
    let withdrawal = engine
        .create_withdrawal(WithdrawalCmd::new(alice, 8_200, "almost everything"))
        .await
        .unwrap();
    engine.process(withdrawal.id).await.unwrap();

    let events = sink.events();
    assert!(events.iter().any(|e| e.starts_with("low_balance:")));
}

#[tokio::test]
async fn wallet_block_and_unblock_raise_events() {
    let (engine, sink) = engine_with_sink().await;
    let alice = register(&engine, "alice").await;

    engine.set_wallet_blocked(alice, true).await.unwrap();
    engine.set_wallet_blocked(alice, false).await.unwrap();

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert!(events[0].starts_with("blocked:"));
    assert!(events[1].starts_with("unblocked:"));
}

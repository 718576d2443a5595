//! Concurrency properties of settlement.
//!
//! These tests use a file-backed SQLite database so every pooled connection
//! sees the same data, and hammer one wallet from many tasks at once.

use std::sync::Arc;

use sea_orm::Database;

use engine::{
    DepositCmd, Engine, EngineError, RegisterUserCmd, TransactionStatus, TransferCmd,
    WithdrawalCmd,
};
use migration::MigratorTrait;
use uuid::Uuid;

async fn engine_with_file_db() -> (Arc<Engine>, std::path::PathBuf) {
    let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../target/test_dbs");
    std::fs::create_dir_all(&root).unwrap();

    let path = root.join(format!("engine_{}.db", Uuid::new_v4()));
    let url = format!("sqlite:{}?mode=rwc", path.display());

    let db = Database::connect(&url).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();

    (Arc::new(engine), path)
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

async fn fund(engine: &Engine, user_id: Uuid, amount_minor: i64) {
    let tx = engine
        .create_deposit(DepositCmd::new(user_id, amount_minor, "seed"))
        .await
        .unwrap();
    engine.process(tx.id).await.unwrap();
}

/// With balance B and N concurrent debit attempts of amount A each, the
/// number of successful debits must satisfy `successes * A <= B`: no
/// overdraft under concurrency.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_withdrawals_never_overdraw() {
    let (engine, _path) = engine_with_file_db().await;
    let alice = register(&engine, "alice").await;
    fund(&engine, alice, 10_000).await;

    // Each withdrawal of 30.00 costs 33.30 with the fee, so at most 3 of
    // the 8 can settle against a 100.00 balance. All 8 pass the
    // creation-time check because nothing has moved yet.
    let total_debit_each = 3_330;
    let mut pending = Vec::new();
    for i in 0..8 {
        let tx = engine
            .create_withdrawal(WithdrawalCmd::new(alice, 3_000, format!("attempt {i}")))
            .await
            .unwrap();
        pending.push(tx.id);
    }

    let mut handles = Vec::new();
    for id in pending.clone() {
        let engine = Arc::clone(&engine);
        handles.push(tokio::spawn(async move { engine.process(id).await }));
    }

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(EngineError::InsufficientFunds(_)) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert!(successes * total_debit_each <= 10_000);
    assert_eq!(
        engine.balance(alice).await.unwrap(),
        10_000 - successes * total_debit_each
    );

    // Every attempt reached a terminal state, one way or the other.
    for id in pending {
        let tx = engine.transaction(id).await.unwrap();
        assert!(matches!(
            tx.status,
            TransactionStatus::Completed | TransactionStatus::Failed
        ));
    }
}

/// Transfers in both directions between the same two wallets must not
/// deadlock: the per-wallet guards are always taken in sorted order.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn opposing_transfers_settle_without_deadlock() {
    let (engine, _path) = engine_with_file_db().await;
    let alice = register(&engine, "alice").await;
    let bob = register(&engine, "bob").await;
    fund(&engine, alice, 50_000).await;
    fund(&engine, bob, 50_000).await;

    let mut pending = Vec::new();
    for i in 0..4 {
        let a_to_b = engine
            .create_transfer(TransferCmd::new(alice, bob, 1_000, format!("a->b {i}")))
            .await
            .unwrap();
        let b_to_a = engine
            .create_transfer(TransferCmd::new(bob, alice, 1_000, format!("b->a {i}")))
            .await
            .unwrap();
        pending.push(a_to_b.id);
        pending.push(b_to_a.id);
    }

    let mut handles = Vec::new();
    for id in pending {
        let engine = Arc::clone(&engine);
        handles.push(tokio::spawn(async move { engine.process(id).await }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    // Four 10.00 transfers each way cancel out; each side paid 4 fees of
    // 2.10 (2.00 base + 1% of 10.00).
    assert_eq!(engine.balance(alice).await.unwrap(), 50_000 - 4 * 210);
    assert_eq!(engine.balance(bob).await.unwrap(), 50_000 - 4 * 210);

    // Money conservation: what left the wallets is exactly the fees.
    let total: i64 =
        engine.balance(alice).await.unwrap() + engine.balance(bob).await.unwrap();
    assert_eq!(total, 100_000 - 8 * 210);
}

pub use sea_orm_migration::prelude::*;

mod m20260112_090000_users;
mod m20260112_093000_wallets;
mod m20260113_110000_transactions;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260112_090000_users::Migration),
            Box::new(m20260112_093000_wallets::Migration),
            Box::new(m20260113_110000_transactions::Migration),
        ]
    }
}

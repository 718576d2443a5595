use std::error::Error;

use clap::{Args, Parser, Subcommand};
use engine::{Engine, MoneyCents, RegisterUserCmd};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "spicci_admin")]
#[command(about = "Admin utilities for Spicci (bootstrap users, manage wallets)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./spicci.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Wallet(Wallet),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    /// Register a user and create their zero-balance wallet.
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        document: String,
        #[arg(long, default_value = "")]
        phone: String,
    },
    /// Print a user looked up by id.
    Show {
        #[arg(long)]
        id: Uuid,
    },
    /// Re-enable a deactivated user.
    Activate {
        #[arg(long)]
        id: Uuid,
    },
    /// Deactivate a user: funds stay intact, new transactions are rejected.
    Deactivate {
        #[arg(long)]
        id: Uuid,
    },
}

#[derive(Args, Debug)]
struct Wallet {
    #[command(subcommand)]
    command: WalletCommand,
}

#[derive(Subcommand, Debug)]
enum WalletCommand {
    /// Print the wallet of a user.
    Show {
        #[arg(long)]
        user_id: Uuid,
    },
    /// Block the wallet of a user.
    Block {
        #[arg(long)]
        user_id: Uuid,
    },
    /// Unblock the wallet of a user.
    Unblock {
        #[arg(long)]
        user_id: Uuid,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::User(user) => match user.command {
            UserCommand::Register {
                name,
                email,
                document,
                phone,
            } => {
                let user = engine
                    .register_user(RegisterUserCmd::new(name, email, document, phone))
                    .await?;
                println!("registered user {} <{}>", user.id, user.email);
            }
            UserCommand::Show { id } => {
                let user = engine.user(id).await?;
                println!(
                    "{} | {} <{}> | document {} | {}",
                    user.id,
                    user.name,
                    user.email,
                    user.document,
                    if user.active { "active" } else { "inactive" }
                );
            }
            UserCommand::Activate { id } => {
                engine.set_user_active(id, true).await?;
                println!("user {id} activated");
            }
            UserCommand::Deactivate { id } => {
                engine.set_user_active(id, false).await?;
                println!("user {id} deactivated");
            }
        },
        Command::Wallet(wallet) => match wallet.command {
            WalletCommand::Show { user_id } => {
                let wallet = engine.wallet_for_user(user_id).await?;
                println!(
                    "wallet {} | balance {} | {}",
                    wallet.id,
                    MoneyCents::new(wallet.balance_minor),
                    if wallet.blocked { "blocked" } else { "open" }
                );
            }
            WalletCommand::Block { user_id } => {
                let wallet = engine.set_wallet_blocked(user_id, true).await?;
                println!("wallet {} blocked", wallet.id);
            }
            WalletCommand::Unblock { user_id } => {
                let wallet = engine.set_wallet_blocked(user_id, false).await?;
                println!("wallet {} unblocked", wallet.id);
            }
        },
    }

    Ok(())
}

async fn connect(url: &str) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

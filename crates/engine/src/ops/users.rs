//! User directory operations: registration, lookups, activation.

use sea_orm::{ActiveValue, QueryFilter, TransactionTrait, prelude::*, sea_query::Expr};
use uuid::Uuid;

use crate::{
    EngineError, RegisterUserCmd, ResultEngine, User, Wallet, users, wallets,
};

use super::{Engine, normalize_required_text, with_tx};

impl Engine {
    /// Registers a user and creates their zero-balance wallet, atomically.
    ///
    /// Email and document are unique across the directory; the email is
    /// stored lowercased.
    pub async fn register_user(&self, cmd: RegisterUserCmd) -> ResultEngine<User> {
        let name = normalize_required_text(&cmd.name, "name")?;
        let email = normalize_required_text(&cmd.email, "email")?.to_lowercase();
        let document = normalize_required_text(&cmd.document, "document")?;
        let phone_number = cmd.phone_number.trim().to_string();
        if !email.contains('@') {
            return Err(EngineError::InvalidAmount("invalid email".to_string()));
        }

        with_tx!(self, |db_tx| {
            if self.email_taken(&db_tx, &email).await? {
                return Err(EngineError::ExistingKey(email));
            }
            if self.document_taken(&db_tx, &document).await? {
                return Err(EngineError::ExistingKey(document));
            }

            let user = User::new(name, email, document, phone_number);
            users::ActiveModel::from(&user).insert(&db_tx).await?;

            let wallet = Wallet::new(user.id);
            wallets::ActiveModel::from(&wallet).insert(&db_tx).await?;

            Ok(user)
        })
    }

    /// Return a user by id.
    pub async fn user(&self, user_id: Uuid) -> ResultEngine<User> {
        with_tx!(self, |db_tx| {
            let model = self.require_user(&db_tx, user_id).await?;
            Ok(User::try_from(model)?)
        })
    }

    /// Return a user by e-mail (case-insensitive).
    pub async fn user_by_email(&self, email: &str) -> ResultEngine<User> {
        let email = email.trim().to_lowercase();
        with_tx!(self, |db_tx| {
            let model = users::Entity::find()
                .filter(users::Column::Email.eq(email.clone()))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;
            Ok(User::try_from(model)?)
        })
    }

    /// Return a user by document.
    pub async fn user_by_document(&self, document: &str) -> ResultEngine<User> {
        let document = document.trim().to_string();
        with_tx!(self, |db_tx| {
            let model = users::Entity::find()
                .filter(users::Column::Document.eq(document.clone()))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;
            Ok(User::try_from(model)?)
        })
    }

    pub async fn user_exists_by_email(&self, email: &str) -> ResultEngine<bool> {
        let email = email.trim().to_lowercase();
        with_tx!(self, |db_tx| { self.email_taken(&db_tx, &email).await })
    }

    pub async fn user_exists_by_document(&self, document: &str) -> ResultEngine<bool> {
        let document = document.trim();
        with_tx!(self, |db_tx| { self.document_taken(&db_tx, document).await })
    }

    /// Activates or deactivates a user.
    ///
    /// Deactivation does not touch the wallet: funds stay intact, but every
    /// transaction creation involving the user is rejected until
    /// reactivation.
    pub async fn set_user_active(&self, user_id: Uuid, active: bool) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            let model = users::ActiveModel {
                id: ActiveValue::Set(user_id.to_string()),
                active: ActiveValue::Set(active),
                updated_at: ActiveValue::Set(Some(chrono::Utc::now())),
                ..Default::default()
            };
            model.update(&db_tx).await?;
            Ok(())
        })
    }

    async fn email_taken(
        &self,
        db: &sea_orm::DatabaseTransaction,
        email: &str,
    ) -> ResultEngine<bool> {
        users::Entity::find()
            .filter(Expr::cust("LOWER(email)").eq(email.to_lowercase()))
            .one(db)
            .await
            .map(|model| model.is_some())
            .map_err(Into::into)
    }

    async fn document_taken(
        &self,
        db: &sea_orm::DatabaseTransaction,
        document: &str,
    ) -> ResultEngine<bool> {
        users::Entity::find()
            .filter(users::Column::Document.eq(document.to_string()))
            .one(db)
            .await
            .map(|model| model.is_some())
            .map_err(Into::into)
    }
}

//! Registered parties (users).
//!
//! A user is anyone who can hold a wallet: a person or a merchant. The
//! engine only cares about identity and the active flag; profile fields are
//! carried for the directory lookups.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::EngineError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// National identifier (CPF/CNPJ-style), unique per user.
    pub document: String,
    pub phone_number: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn new(name: String, email: String, document: String, phone_number: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            document,
            phone_number,
            active: true,
            created_at: Utc::now(),
            updated_at: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub email: String,
    pub document: String,
    pub phone_number: String,
    pub active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::wallets::Entity")]
    Wallet,
}

impl Related<super::wallets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wallet.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&User> for ActiveModel {
    fn from(value: &User) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            name: ActiveValue::Set(value.name.clone()),
            email: ActiveValue::Set(value.email.clone()),
            document: ActiveValue::Set(value.document.clone()),
            phone_number: ActiveValue::Set(value.phone_number.clone()),
            active: ActiveValue::Set(value.active),
            created_at: ActiveValue::Set(value.created_at),
            updated_at: ActiveValue::Set(value.updated_at),
        }
    }
}

impl TryFrom<Model> for User {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::InvalidId("invalid user id".to_string()))?,
            name: model.name,
            email: model.email,
            document: model.document,
            phone_number: model.phone_number,
            active: model.active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

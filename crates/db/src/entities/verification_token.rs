//! Email verification token entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A pending registration confirmation.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "verification_token")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Email address the token was issued for.
    #[sea_orm(indexed)]
    pub identifier: String,

    #[sea_orm(unique)]
    pub token: String,

    pub expires: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

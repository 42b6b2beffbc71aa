//! User entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Role of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum UserRole {
    #[sea_orm(string_value = "user")]
    #[default]
    User,
    #[sea_orm(string_value = "admin")]
    Admin,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Lower-cased email address
    #[sea_orm(unique)]
    pub email: String,

    #[sea_orm(unique)]
    pub nickname: String,

    #[serde(skip_serializing)]
    pub password_hash: String,

    pub role: UserRole,

    /// NULL until the registration email is confirmed
    #[sea_orm(nullable)]
    pub email_verified: Option<DateTimeWithTimeZone>,

    #[sea_orm(default_value = false)]
    pub two_factor_enabled: bool,

    /// Opt-in for cash-flow push reminders
    #[sea_orm(default_value = false)]
    pub notifications_enabled: bool,

    /// Access block set by an admin
    #[sea_orm(default_value = false)]
    pub suspended: bool,

    /// Non-null exactly when `suspended` is true
    #[sea_orm(column_type = "Text", nullable)]
    pub suspended_reason: Option<String>,

    /// Free text the user submits while suspended
    #[sea_orm(column_type = "Text", nullable)]
    pub suspended_appeal: Option<String>,

    /// Soft-delete request time; the grace window runs from here
    #[sea_orm(nullable)]
    pub deleted_at: Option<DateTimeWithTimeZone>,

    /// Set when a pending soft delete is cancelled, cleared once acknowledged
    #[sea_orm(nullable)]
    pub reactivated_at: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::post::Entity")]
    Posts,

    #[sea_orm(has_many = "super::inquiry::Entity")]
    Inquiries,

    #[sea_orm(has_many = "super::push_subscription::Entity")]
    PushSubscriptions,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Posts.def()
    }
}

impl Related<super::inquiry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Inquiries.def()
    }
}

impl Related<super::push_subscription::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PushSubscriptions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Whether the account holds the admin role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

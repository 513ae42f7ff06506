//! License entity - grants a user access to a plugin

use chrono::NaiveDateTime;
use json as serde_json;
use sea_orm::FromJsonQueryResult;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(
  Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum LicenseStatus {
  #[sea_orm(string_value = "active")]
  Active,
  #[sea_orm(string_value = "inactive")]
  Inactive,
  #[sea_orm(string_value = "expired")]
  Expired,
  #[sea_orm(string_value = "revoked")]
  Revoked,
}

impl LicenseStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Active => "active",
      Self::Inactive => "inactive",
      Self::Expired => "expired",
      Self::Revoked => "revoked",
    }
  }
}

/// Append-only list of activated domains, bounded by max_domains.
#[derive(
  Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult,
)]
pub struct ActivatedDomains(pub Vec<String>);

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "licenses")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub id: String,
  pub user_id: String,
  pub plugin_id: String,
  /// Nullable: the subscription may be cancelled without deleting the license
  pub subscription_id: Option<String>,
  #[sea_orm(unique)]
  pub license_key: String,
  pub max_domains: i32,
  #[sea_orm(column_type = "Json")]
  pub activated_domains: ActivatedDomains,
  pub status: LicenseStatus,
  pub expires_at: Option<NaiveDateTime>,
  pub created_at: NaiveDateTime,
  pub updated_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "super::user::Entity",
    from = "Column::UserId",
    to = "super::user::Column::Id"
  )]
  User,
  #[sea_orm(
    belongs_to = "super::plugin::Entity",
    from = "Column::PluginId",
    to = "super::plugin::Column::Id"
  )]
  Plugin,
  #[sea_orm(
    belongs_to = "super::subscription::Entity",
    from = "Column::SubscriptionId",
    to = "super::subscription::Column::Id"
  )]
  Subscription,
}

impl Related<super::user::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::User.def()
  }
}

impl Related<super::plugin::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Plugin.def()
  }
}

impl Related<super::subscription::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Subscription.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}

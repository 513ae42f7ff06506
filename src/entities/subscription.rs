//! Subscription entity - created by the entitlement processor on confirmed payment

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(
  Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum PlanType {
  #[sea_orm(string_value = "monthly")]
  Monthly,
  #[sea_orm(string_value = "yearly")]
  Yearly,
  #[sea_orm(string_value = "lifetime")]
  Lifetime,
}

impl PlanType {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Monthly => "monthly",
      Self::Yearly => "yearly",
      Self::Lifetime => "lifetime",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "monthly" => Some(Self::Monthly),
      "yearly" => Some(Self::Yearly),
      "lifetime" => Some(Self::Lifetime),
      _ => None,
    }
  }
}

#[derive(
  Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
  #[sea_orm(string_value = "active")]
  Active,
  #[sea_orm(string_value = "expired")]
  Expired,
  #[sea_orm(string_value = "cancelled")]
  Cancelled,
  #[sea_orm(string_value = "pending")]
  Pending,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "subscriptions")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub id: String,
  pub user_id: String,
  pub plugin_id: String,
  pub plan_type: PlanType,
  pub status: SubscriptionStatus,
  #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
  pub price: Decimal,
  pub start_date: NaiveDateTime,
  pub end_date: Option<NaiveDateTime>,
  pub auto_renew: bool,
  pub created_at: NaiveDateTime,
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
  #[sea_orm(has_many = "super::license::Entity")]
  Licenses,
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

impl Related<super::license::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Licenses.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}

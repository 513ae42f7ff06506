//! User entity - identity supplied by the external auth layer

use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub id: String,
  pub email: Option<String>,
  pub is_admin: bool,
  pub created_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(has_many = "super::subscription::Entity")]
  Subscriptions,
  #[sea_orm(has_many = "super::license::Entity")]
  Licenses,
  #[sea_orm(has_many = "super::coupon_usage::Entity")]
  CouponUsages,
}

impl Related<super::subscription::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Subscriptions.def()
  }
}

impl Related<super::license::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Licenses.def()
  }
}

impl Related<super::coupon_usage::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::CouponUsages.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}

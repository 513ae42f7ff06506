//! CouponUsage entity - immutable record of a confirmed redemption

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "coupon_usages")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub id: String,
  pub coupon_id: String,
  pub user_id: String,
  pub subscription_id: Option<String>,
  #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
  pub original_amount: Decimal,
  #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
  pub discount_amount: Decimal,
  #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
  pub final_amount: Decimal,
  pub used_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "super::coupon::Entity",
    from = "Column::CouponId",
    to = "super::coupon::Column::Id"
  )]
  Coupon,
  #[sea_orm(
    belongs_to = "super::user::Entity",
    from = "Column::UserId",
    to = "super::user::Column::Id"
  )]
  User,
  #[sea_orm(
    belongs_to = "super::subscription::Entity",
    from = "Column::SubscriptionId",
    to = "super::subscription::Column::Id"
  )]
  Subscription,
}

impl Related<super::coupon::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Coupon.def()
  }
}

impl Related<super::user::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::User.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}

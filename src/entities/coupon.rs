//! Coupon entity - discount codes with caps, limits and validity windows

use chrono::NaiveDateTime;
use json as serde_json;
use rust_decimal::Decimal;
use sea_orm::FromJsonQueryResult;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(
  Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
  #[sea_orm(string_value = "percentage")]
  Percentage,
  #[sea_orm(string_value = "fixed")]
  Fixed,
}

/// Plugin ids a coupon applies to; empty means all plugins.
#[derive(
  Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult,
)]
pub struct ApplicablePlugins(pub Vec<String>);

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "coupons")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub id: String,
  /// Stored normalized to uppercase
  #[sea_orm(unique)]
  pub code: String,
  pub name: String,
  pub description: Option<String>,
  pub discount_type: DiscountType,
  #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
  pub discount_value: Decimal,
  #[sea_orm(column_type = "Decimal(Some((10, 2)))", nullable)]
  pub minimum_amount: Option<Decimal>,
  #[sea_orm(column_type = "Decimal(Some((10, 2)))", nullable)]
  pub maximum_discount: Option<Decimal>,
  pub usage_limit: Option<i32>,
  /// Incremented only on confirmed redemption
  pub usage_count: i32,
  pub user_usage_limit: Option<i32>,
  pub is_active: bool,
  pub starts_at: Option<NaiveDateTime>,
  pub expires_at: Option<NaiveDateTime>,
  #[sea_orm(column_type = "Json", nullable)]
  pub applicable_plugins: Option<ApplicablePlugins>,
  pub created_at: NaiveDateTime,
  pub updated_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(has_many = "super::coupon_usage::Entity")]
  Usages,
}

impl Related<super::coupon_usage::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Usages.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}

//! Plugin entity - the catalog items being sold

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "plugins")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub id: String,
  pub name: String,
  #[sea_orm(unique)]
  pub slug: String,
  pub version: String,
  /// Lifetime price
  #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
  pub price: Decimal,
  #[sea_orm(column_type = "Decimal(Some((10, 2)))", nullable)]
  pub monthly_price: Option<Decimal>,
  #[sea_orm(column_type = "Decimal(Some((10, 2)))", nullable)]
  pub yearly_price: Option<Decimal>,
  pub is_active: bool,
  pub created_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(has_many = "super::subscription::Entity")]
  Subscriptions,
  #[sea_orm(has_many = "super::license::Entity")]
  Licenses,
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

impl ActiveModelBehavior for ActiveModel {}

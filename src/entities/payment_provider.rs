//! PaymentProvider entity - configured payment back-ends

use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(
  Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
  #[sea_orm(string_value = "stripe")]
  Stripe,
  #[sea_orm(string_value = "mercadopago")]
  MercadoPago,
  #[sea_orm(string_value = "hotmart")]
  Hotmart,
  #[sea_orm(string_value = "monetizze")]
  Monetizze,
  #[sea_orm(string_value = "yampi")]
  Yampi,
  #[sea_orm(string_value = "custom")]
  Custom,
}

impl ProviderType {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Stripe => "stripe",
      Self::MercadoPago => "mercadopago",
      Self::Hotmart => "hotmart",
      Self::Monetizze => "monetizze",
      Self::Yampi => "yampi",
      Self::Custom => "custom",
    }
  }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payment_providers")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub id: String,
  pub name: String,
  pub provider_type: ProviderType,
  pub display_name: String,
  pub is_active: bool,
  /// At most one provider is default; see ProviderService::set_default
  pub is_default: bool,
  /// Provider-specific config blob (keys, secrets, aliases)
  pub config: Json,
  pub webhook_url: Option<String>,
  pub created_at: NaiveDateTime,
  pub updated_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

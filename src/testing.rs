//! Shared test fixtures: in-memory database and seed rows

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
  ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, DbBackend,
  Schema, Set,
};
use uuid::Uuid;

use crate::entities::prelude::*;

pub async fn setup_test_db() -> DatabaseConnection {
  let db = Database::connect("sqlite::memory:").await.unwrap();
  let schema = Schema::new(DbBackend::Sqlite);

  for stmt in [
    schema.create_table_from_entity(crate::entities::user::Entity),
    schema.create_table_from_entity(crate::entities::plugin::Entity),
    schema.create_table_from_entity(crate::entities::subscription::Entity),
    schema.create_table_from_entity(crate::entities::license::Entity),
    schema.create_table_from_entity(crate::entities::payment_provider::Entity),
    schema.create_table_from_entity(crate::entities::coupon::Entity),
    schema.create_table_from_entity(crate::entities::coupon_usage::Entity),
    schema
      .create_table_from_entity(crate::entities::processed_webhook_event::Entity),
  ] {
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();
  }

  db
}

pub async fn seed_user(db: &DatabaseConnection, id: &str) -> UserModel {
  let user = UserActiveModel {
    id: Set(id.to_string()),
    email: Set(Some(format!("{id}@example.com"))),
    is_admin: Set(false),
    created_at: Set(Utc::now().naive_utc()),
  };
  user.insert(db).await.unwrap()
}

pub async fn seed_plugin(
  db: &DatabaseConnection,
  id: &str,
  monthly_price: Option<Decimal>,
  yearly_price: Option<Decimal>,
  price: Decimal,
) -> PluginModel {
  let plugin = PluginActiveModel {
    id: Set(id.to_string()),
    name: Set(format!("{id} plugin")),
    slug: Set(id.to_string()),
    version: Set("1.0.0".into()),
    price: Set(price),
    monthly_price: Set(monthly_price),
    yearly_price: Set(yearly_price),
    is_active: Set(true),
    created_at: Set(Utc::now().naive_utc()),
  };
  plugin.insert(db).await.unwrap()
}

pub async fn seed_coupon(db: &DatabaseConnection, code: &str) -> CouponModel {
  let now = Utc::now().naive_utc();
  let coupon = CouponActiveModel {
    id: Set(Uuid::new_v4().to_string()),
    code: Set(code.to_uppercase()),
    name: Set(format!("{code} coupon")),
    description: Set(None),
    discount_type: Set(DiscountType::Percentage),
    discount_value: Set(Decimal::new(2000, 2)),
    minimum_amount: Set(None),
    maximum_discount: Set(None),
    usage_limit: Set(None),
    usage_count: Set(0),
    user_usage_limit: Set(Some(1)),
    is_active: Set(true),
    starts_at: Set(None),
    expires_at: Set(None),
    applicable_plugins: Set(None),
    created_at: Set(now),
    updated_at: Set(now),
  };
  coupon.insert(db).await.unwrap()
}

pub async fn seed_provider(
  db: &DatabaseConnection,
  provider_type: ProviderType,
  config: json::Value,
  is_default: bool,
) -> PaymentProviderModel {
  let now = Utc::now().naive_utc();
  let name = provider_type.as_str().to_string();
  let provider = PaymentProviderActiveModel {
    id: Set(Uuid::new_v4().to_string()),
    name: Set(name.clone()),
    provider_type: Set(provider_type),
    display_name: Set(name),
    is_active: Set(true),
    is_default: Set(is_default),
    config: Set(config),
    webhook_url: Set(None),
    created_at: Set(now),
    updated_at: Set(now),
  };
  provider.insert(db).await.unwrap()
}

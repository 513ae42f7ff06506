//! Database migrations using SeaORM

use sea_orm_migration::prelude::*;

mod m20260601_000001_create_users;
mod m20260601_000002_create_plugins;
mod m20260601_000003_create_subscriptions;
mod m20260601_000004_create_licenses;
mod m20260601_000005_create_payment_providers;
mod m20260601_000006_create_coupons;
mod m20260601_000007_create_coupon_usages;
mod m20260601_000008_create_processed_webhook_events;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
  fn migrations() -> Vec<Box<dyn MigrationTrait>> {
    vec![
      Box::new(m20260601_000001_create_users::Migration),
      Box::new(m20260601_000002_create_plugins::Migration),
      Box::new(m20260601_000003_create_subscriptions::Migration),
      Box::new(m20260601_000004_create_licenses::Migration),
      Box::new(m20260601_000005_create_payment_providers::Migration),
      Box::new(m20260601_000006_create_coupons::Migration),
      Box::new(m20260601_000007_create_coupon_usages::Migration),
      Box::new(m20260601_000008_create_processed_webhook_events::Migration),
    ]
  }
}

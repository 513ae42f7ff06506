use sea_orm_migration::prelude::*;

use super::m20260601_000001_create_users::Users;
use super::m20260601_000003_create_subscriptions::Subscriptions;
use super::m20260601_000006_create_coupons::Coupons;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(CouponUsages::Table)
          .if_not_exists()
          .col(ColumnDef::new(CouponUsages::Id).string().not_null().primary_key())
          .col(ColumnDef::new(CouponUsages::CouponId).string().not_null())
          .col(ColumnDef::new(CouponUsages::UserId).string().not_null())
          .col(ColumnDef::new(CouponUsages::SubscriptionId).string().null())
          .col(
            ColumnDef::new(CouponUsages::OriginalAmount)
              .decimal_len(10, 2)
              .not_null(),
          )
          .col(
            ColumnDef::new(CouponUsages::DiscountAmount)
              .decimal_len(10, 2)
              .not_null(),
          )
          .col(
            ColumnDef::new(CouponUsages::FinalAmount)
              .decimal_len(10, 2)
              .not_null(),
          )
          .col(ColumnDef::new(CouponUsages::UsedAt).date_time().not_null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_coupon_usages_coupon")
              .from(CouponUsages::Table, CouponUsages::CouponId)
              .to(Coupons::Table, Coupons::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_coupon_usages_user")
              .from(CouponUsages::Table, CouponUsages::UserId)
              .to(Users::Table, Users::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_coupon_usages_subscription")
              .from(CouponUsages::Table, CouponUsages::SubscriptionId)
              .to(Subscriptions::Table, Subscriptions::Id)
              .on_delete(ForeignKeyAction::SetNull),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_coupon_usages_coupon_user")
          .table(CouponUsages::Table)
          .col(CouponUsages::CouponId)
          .col(CouponUsages::UserId)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(CouponUsages::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum CouponUsages {
  Table,
  Id,
  CouponId,
  UserId,
  SubscriptionId,
  OriginalAmount,
  DiscountAmount,
  FinalAmount,
  UsedAt,
}

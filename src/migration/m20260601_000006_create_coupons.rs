use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Coupons::Table)
          .if_not_exists()
          .col(ColumnDef::new(Coupons::Id).string().not_null().primary_key())
          .col(ColumnDef::new(Coupons::Code).string().not_null().unique_key())
          .col(ColumnDef::new(Coupons::Name).string().not_null())
          .col(ColumnDef::new(Coupons::Description).string().null())
          .col(ColumnDef::new(Coupons::DiscountType).string().not_null())
          .col(ColumnDef::new(Coupons::DiscountValue).decimal_len(10, 2).not_null())
          .col(ColumnDef::new(Coupons::MinimumAmount).decimal_len(10, 2).null())
          .col(ColumnDef::new(Coupons::MaximumDiscount).decimal_len(10, 2).null())
          .col(ColumnDef::new(Coupons::UsageLimit).integer().null())
          .col(ColumnDef::new(Coupons::UsageCount).integer().not_null().default(0))
          .col(
            ColumnDef::new(Coupons::UserUsageLimit)
              .integer()
              .null()
              .default(1),
          )
          .col(ColumnDef::new(Coupons::IsActive).boolean().not_null().default(true))
          .col(ColumnDef::new(Coupons::StartsAt).date_time().null())
          .col(ColumnDef::new(Coupons::ExpiresAt).date_time().null())
          .col(ColumnDef::new(Coupons::ApplicablePlugins).json().null())
          .col(ColumnDef::new(Coupons::CreatedAt).date_time().not_null())
          .col(ColumnDef::new(Coupons::UpdatedAt).date_time().not_null())
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(Coupons::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Coupons {
  Table,
  Id,
  Code,
  Name,
  Description,
  DiscountType,
  DiscountValue,
  MinimumAmount,
  MaximumDiscount,
  UsageLimit,
  UsageCount,
  UserUsageLimit,
  IsActive,
  StartsAt,
  ExpiresAt,
  ApplicablePlugins,
  CreatedAt,
  UpdatedAt,
}
